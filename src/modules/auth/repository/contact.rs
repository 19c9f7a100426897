use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct TelegramContact {
    pub handle: String,
    pub chat_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').trim().to_lowercase()
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn upsert(&self, handle: &str, chat_id: i64) -> Result<TelegramContact>;
    async fn find_chat_id(&self, handle: &str) -> Result<Option<i64>>;
}

#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn upsert(&self, handle: &str, chat_id: i64) -> Result<TelegramContact> {
        sqlx::query_as::<_, TelegramContact>(
            "
            INSERT INTO telegram_contacts (handle, chat_id) VALUES ($1, $2)
            ON CONFLICT (handle) DO UPDATE SET
                chat_id = EXCLUDED.chat_id,
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(normalize_handle(handle))
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to upsert telegram contact: {}", err);
            Error::UnexpectedError
        })
    }

    async fn find_chat_id(&self, handle: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT chat_id FROM telegram_contacts WHERE handle = $1")
            .bind(normalize_handle(handle))
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Error occurred in find_chat_id: {}", err);
                Error::UnexpectedError
            })
    }
}
