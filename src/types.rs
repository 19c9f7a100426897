use crate::modules::{
    auth::{
        repository::{
            contact::{ContactRepository, PgContactRepository},
            otp::{OtpRepository, PgOtpRepository},
        },
        service::account::{AccountProvider, HostedAccountProvider},
    },
    notification::service::{telegram::TelegramMessenger, Messenger},
    order::repository::{OrderRepository, PgOrderRepository},
};
use crate::utils::database;
use apalis::cron::Schedule;
use async_trait::async_trait;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct OtpContext {
    pub validity_minutes: i64,
    pub supersede_previous: bool,
    pub purge_schedule: Schedule,
}

#[derive(Clone)]
pub struct TelegramContext {
    pub orders_chat_id: String,
    pub webhook_secret: Option<String>,
}

#[derive(Clone)]
pub struct RepositoryContext {
    pub otp: Arc<dyn OtpRepository>,
    pub contact: Arc<dyn ContactRepository>,
    pub order: Arc<dyn OrderRepository>,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub otp: OtpContext,
    pub telegram: TelegramContext,
    pub repository: RepositoryContext,
    pub messenger: Arc<dyn Messenger>,
    pub accounts: Arc<dyn AccountProvider>,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct OtpConfig {
    pub validity_minutes: i64,
    pub supersede_previous: bool,
    pub purge_schedule: Schedule,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_endpoint: String,
    pub orders_chat_id: String,
    pub webhook_secret: Option<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub api_endpoint: String,
    pub service_key: String,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub otp: OtpConfig,
    pub telegram: TelegramConfig,
    pub auth: AuthConfig,
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u32>()
            .expect("Invalid PORT number");
        let url = env::var("URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let otp_validity_minutes = env::var("OTP_VALIDITY_MINUTES")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<i64>()
            .expect("Invalid OTP_VALIDITY_MINUTES");
        if otp_validity_minutes <= 0 {
            panic!("OTP_VALIDITY_MINUTES must be positive");
        }
        let otp_supersede_previous = env::var("OTP_SUPERSEDE_PREVIOUS")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        let otp_purge_schedule = Schedule::from_str(
            &env::var("OTP_PURGE_SCHEDULE").unwrap_or_else(|_| "0 0 * * * *".to_string()),
        )
        .expect("Invalid OTP_PURGE_SCHEDULE");
        let telegram_bot_token =
            env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN not set");
        let telegram_api_endpoint = env::var("TELEGRAM_API_ENDPOINT")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());
        let telegram_orders_chat_id =
            env::var("TELEGRAM_ORDERS_CHAT_ID").expect("TELEGRAM_ORDERS_CHAT_ID not set");
        let telegram_webhook_secret = env::var("TELEGRAM_WEBHOOK_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty());
        let auth_api_endpoint = env::var("AUTH_API_ENDPOINT").expect("AUTH_API_ENDPOINT not set");
        let auth_service_key = env::var("AUTH_SERVICE_KEY").expect("AUTH_SERVICE_KEY not set");

        Self {
            database: DatabaseConfig { url: database_url },
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
            },
            otp: OtpConfig {
                validity_minutes: otp_validity_minutes,
                supersede_previous: otp_supersede_previous,
                purge_schedule: otp_purge_schedule,
            },
            telegram: TelegramConfig {
                bot_token: telegram_bot_token,
                api_endpoint: telegram_api_endpoint,
                orders_chat_id: telegram_orders_chat_id,
                webhook_secret: telegram_webhook_secret,
            },
            auth: AuthConfig {
                api_endpoint: auth_api_endpoint,
                service_key: auth_service_key,
            },
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(self.database.url.as_str()).await;
        database::migrate(db_conn.clone()).await;

        let http = reqwest::Client::new();

        Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
            },
            otp: OtpContext {
                validity_minutes: self.otp.validity_minutes,
                supersede_previous: self.otp.supersede_previous,
                purge_schedule: self.otp.purge_schedule,
            },
            telegram: TelegramContext {
                orders_chat_id: self.telegram.orders_chat_id,
                webhook_secret: self.telegram.webhook_secret,
            },
            repository: RepositoryContext {
                otp: Arc::new(PgOtpRepository::new(db_conn.pool.clone())),
                contact: Arc::new(PgContactRepository::new(db_conn.pool.clone())),
                order: Arc::new(PgOrderRepository::new(db_conn.pool.clone())),
            },
            messenger: Arc::new(TelegramMessenger::new(
                http.clone(),
                &self.telegram.api_endpoint,
                &self.telegram.bot_token,
            )),
            accounts: Arc::new(HostedAccountProvider::new(
                http,
                self.auth.api_endpoint,
                self.auth.service_key,
            )),
        }
    }
}
