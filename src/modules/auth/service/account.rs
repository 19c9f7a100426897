use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone, Debug, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: String,
    pub contact_handle: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Rejected(String),
    Unavailable,
}

pub type Result<T> = std::result::Result<T, Error>;

#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn create_user(&self, account: NewAccount) -> Result<Account>;
}

#[derive(Deserialize, Default)]
struct ProviderError {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| "Account was rejected by the auth provider".to_string())
    }
}

pub struct HostedAccountProvider {
    client: Client,
    api_endpoint: String,
    service_key: String,
}

impl HostedAccountProvider {
    pub fn new(client: Client, api_endpoint: String, service_key: String) -> Self {
        Self {
            client,
            api_endpoint: api_endpoint.trim_end_matches('/').to_string(),
            service_key,
        }
    }
}

#[async_trait]
impl AccountProvider for HostedAccountProvider {
    async fn create_user(&self, account: NewAccount) -> Result<Account> {
        let res = self
            .client
            .post(format!("{}/admin/users", self.api_endpoint))
            .header("apikey", self.service_key.clone())
            .bearer_auth(self.service_key.clone())
            .json(&json!({
                "email": account.email,
                "password": account.password,
                "email_confirm": true,
                "user_metadata": {
                    "full_name": account.full_name,
                    "phone": account.phone,
                    "telegram_username": account.contact_handle,
                }
            }))
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to reach auth provider: {}", err);
                Error::Unavailable
            })?;

        let status = res.status();

        if status.is_client_error() {
            let reason = res
                .json::<ProviderError>()
                .await
                .unwrap_or_default()
                .into_message();
            tracing::warn!("Auth provider rejected account ({}): {}", status, reason);
            return Err(Error::Rejected(reason));
        }

        if !status.is_success() {
            tracing::error!("Auth provider failed with status {}", status);
            return Err(Error::Unavailable);
        }

        res.json::<Account>().await.map_err(|err| {
            tracing::error!("Failed to deserialize created account: {}", err);
            Error::Unavailable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::Value;
    use tokio::net::TcpListener;

    async fn spawn_provider(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}/auth/v1", addr)
    }

    fn new_account() -> NewAccount {
        NewAccount {
            email: "ali@example.com".to_string(),
            password: "hunter22".to_string(),
            full_name: Some("Ali Valiyev".to_string()),
            phone: "+998901234567".to_string(),
            contact_handle: "ali123".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_confirmed_user_with_metadata() {
        let router = Router::new().route(
            "/auth/v1/admin/users",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["apikey"], "service-key");
                assert_eq!(headers["authorization"], "Bearer service-key");
                assert_eq!(body["email_confirm"], true);
                (
                    StatusCode::OK,
                    Json(json!({
                        "id": "user-1",
                        "email": body["email"],
                        "user_metadata": body["user_metadata"],
                        "created_at": "2024-10-18T00:00:00Z"
                    })),
                )
            }),
        );
        let endpoint = spawn_provider(router).await;
        let provider =
            HostedAccountProvider::new(Client::new(), endpoint, "service-key".to_string());

        let account = provider.create_user(new_account()).await.unwrap();

        assert_eq!(account.id, "user-1");
        assert_eq!(account.email.as_deref(), Some("ali@example.com"));
        assert_eq!(account.user_metadata["phone"], "+998901234567");
        assert_eq!(account.user_metadata["telegram_username"], "ali123");
        assert_eq!(account.user_metadata["full_name"], "Ali Valiyev");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_with_provider_message() {
        let router = Router::new().route(
            "/auth/v1/admin/users",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "code": 422,
                        "error_code": "email_exists",
                        "msg": "A user with this email address has already been registered"
                    })),
                )
            }),
        );
        let endpoint = spawn_provider(router).await;
        let provider =
            HostedAccountProvider::new(Client::new(), endpoint, "service-key".to_string());

        assert_eq!(
            provider.create_user(new_account()).await,
            Err(Error::Rejected(
                "A user with this email address has already been registered".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        let router = Router::new().route(
            "/auth/v1/admin/users",
            post(|| async { StatusCode::BAD_GATEWAY }),
        );
        let endpoint = spawn_provider(router).await;
        let provider =
            HostedAccountProvider::new(Client::new(), endpoint, "service-key".to_string());

        assert_eq!(
            provider.create_user(new_account()).await,
            Err(Error::Unavailable)
        );
    }
}
