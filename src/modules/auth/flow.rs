use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSignup {
    pub full_name: String,
    pub phone: String,
    pub contact_handle: String,
    pub email: String,
    pub password: String,
}

impl PendingSignup {
    fn missing_field(&self) -> Option<&'static str> {
        [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("telegram username", &self.contact_handle),
            ("email", &self.email),
            ("password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignupState {
    CollectingContact { error: Option<String> },
    OtpSent { error: Option<String> },
    Verifying,
    SignedIn(Session),
    Failed(String),
}

impl SignupState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CollectingContact { .. } => "collecting_contact",
            Self::OtpSent { .. } => "otp_sent",
            Self::Verifying => "verifying",
            Self::SignedIn(_) => "signed_in",
            Self::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::CollectingContact { error } | Self::OtpSent { error } => error.as_deref(),
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayError(pub String);

#[derive(Debug, PartialEq, Eq)]
pub enum TransitionError {
    NotAllowed {
        action: &'static str,
        state: &'static str,
    },
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn send_otp(&self, phone: &str, contact_handle: &str) -> Result<(), GatewayError>;
    async fn verify_otp(&self, signup: &PendingSignup, code: &str) -> Result<(), GatewayError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;
}

fn is_code_shaped(code: &str) -> bool {
    Regex::new(r"^\d{6}$")
        .expect("Invalid code regex")
        .is_match(code)
}

pub struct SignupFlow<G> {
    gateway: G,
    state: SignupState,
    pending: Option<PendingSignup>,
}

impl<G: AuthGateway> SignupFlow<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: SignupState::CollectingContact { error: None },
            pending: None,
        }
    }

    pub fn state(&self) -> &SignupState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingSignup> {
        self.pending.as_ref()
    }

    fn not_allowed(&self, action: &'static str) -> TransitionError {
        TransitionError::NotAllowed {
            action,
            state: self.state.name(),
        }
    }

    pub async fn submit_contact(
        &mut self,
        signup: PendingSignup,
    ) -> Result<&SignupState, TransitionError> {
        if !matches!(self.state, SignupState::CollectingContact { .. }) {
            return Err(self.not_allowed("submit_contact"));
        }

        if let Some(field) = signup.missing_field() {
            self.state = SignupState::CollectingContact {
                error: Some(format!("{} is required", field)),
            };
            return Ok(&self.state);
        }

        self.state = match self
            .gateway
            .send_otp(signup.phone.trim(), signup.contact_handle.trim())
            .await
        {
            Ok(()) => SignupState::OtpSent { error: None },
            Err(GatewayError(message)) => SignupState::CollectingContact {
                error: Some(message),
            },
        };
        self.pending = Some(signup);

        Ok(&self.state)
    }

    pub fn go_back(&mut self) -> Result<&SignupState, TransitionError> {
        if !matches!(self.state, SignupState::OtpSent { .. }) {
            return Err(self.not_allowed("go_back"));
        }

        self.state = SignupState::CollectingContact { error: None };
        Ok(&self.state)
    }

    pub async fn submit_code(&mut self, code: &str) -> Result<&SignupState, TransitionError> {
        let pending = match (&self.state, &self.pending) {
            (SignupState::OtpSent { .. }, Some(pending)) => pending,
            _ => return Err(self.not_allowed("submit_code")),
        };

        let code = code.trim();
        if !is_code_shaped(code) {
            self.state = SignupState::OtpSent {
                error: Some("Enter the 6-digit code from Telegram".to_string()),
            };
            return Ok(&self.state);
        }

        self.state = SignupState::Verifying;

        if let Err(GatewayError(message)) = self.gateway.verify_otp(pending, code).await {
            self.state = SignupState::OtpSent {
                error: Some(message),
            };
            return Ok(&self.state);
        }

        // The account exists from here on, so a failed sign in cannot be
        // retried with the same code.
        let signed_in = self
            .gateway
            .sign_in(pending.email.trim(), &pending.password)
            .await;

        self.state = match signed_in {
            Ok(session) => {
                self.pending = None;
                SignupState::SignedIn(session)
            }
            Err(GatewayError(message)) => SignupState::Failed(format!(
                "Account created, but signing in failed: {}",
                message
            )),
        };

        Ok(&self.state)
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> &SignupState {
        if !matches!(self.state, SignupState::SignedIn(_)) {
            self.state = SignupState::Failed(reason.into());
        }
        &self.state
    }
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
}

async fn gateway_error(res: reqwest::Response) -> GatewayError {
    let status = res.status();
    let body = res.json::<ErrorBody>().await.unwrap_or_default();
    let message = body
        .error_description
        .or(body.msg)
        .or(body.error)
        .unwrap_or_else(|| format!("Request failed with status {}", status));
    GatewayError(message)
}

fn unreachable(err: reqwest::Error) -> GatewayError {
    tracing::warn!("Signup request failed: {}", err);
    GatewayError("Could not reach the server, please try again".to_string())
}

pub struct HttpGateway {
    client: Client,
    api_url: String,
    auth_url: String,
    anon_key: String,
}

impl HttpGateway {
    pub fn new(client: Client, api_url: &str, auth_url: &str, anon_key: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn send_otp(&self, phone: &str, contact_handle: &str) -> Result<(), GatewayError> {
        let res = self
            .client
            .post(format!("{}/send-otp", self.api_url))
            .header("apikey", self.anon_key.clone())
            .json(&json!({ "phone": phone, "telegram_username": contact_handle }))
            .send()
            .await
            .map_err(unreachable)?;

        match res.status().is_success() {
            true => Ok(()),
            false => Err(gateway_error(res).await),
        }
    }

    async fn verify_otp(&self, signup: &PendingSignup, code: &str) -> Result<(), GatewayError> {
        let res = self
            .client
            .post(format!("{}/verify-otp", self.api_url))
            .header("apikey", self.anon_key.clone())
            .json(&json!({
                "phone": signup.phone.trim(),
                "code": code,
                "email": signup.email.trim(),
                "password": signup.password,
                "full_name": signup.full_name.trim(),
                "telegram_username": signup.contact_handle.trim(),
            }))
            .send()
            .await
            .map_err(unreachable)?;

        match res.status().is_success() {
            true => Ok(()),
            false => Err(gateway_error(res).await),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let res = self
            .client
            .post(format!("{}/token?grant_type=password", self.auth_url))
            .header("apikey", self.anon_key.clone())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(unreachable)?;

        if !res.status().is_success() {
            return Err(gateway_error(res).await);
        }

        res.json::<Session>().await.map_err(unreachable)
    }
}
