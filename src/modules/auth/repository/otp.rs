use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::PgPool;
use ulid::Ulid;

#[derive(Serialize, Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct Otp {
    pub id: String,
    pub phone: String,
    pub contact_handle: String,
    #[serde(skip_serializing)]
    pub code: String,
    pub verified: bool,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Otp {
    pub fn is_claimable(&self, now: NaiveDateTime) -> bool {
        !self.verified && self.expires_at >= now
    }
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct CreateOtpPayload {
    pub phone: String,
    pub contact_handle: String,
    pub code: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn create(&self, payload: CreateOtpPayload) -> Result<Otp>;

    // Newest unverified, unexpired match. At most one caller can claim a record.
    async fn claim_latest(&self, phone: &str, code: &str, now: NaiveDateTime)
        -> Result<Option<Otp>>;

    async fn release(&self, id: &str) -> Result<()>;

    async fn discard(&self, id: &str) -> Result<()>;

    async fn invalidate_pending(
        &self,
        phone: &str,
        keep_id: &str,
        now: NaiveDateTime,
    ) -> Result<u64>;

    async fn purge_stale(&self, now: NaiveDateTime) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgOtpRepository {
    pool: PgPool,
}

impl PgOtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for PgOtpRepository {
    async fn create(&self, payload: CreateOtpPayload) -> Result<Otp> {
        sqlx::query_as::<_, Otp>(
            "
            INSERT INTO otps (id, phone, contact_handle, code, verified, created_at, expires_at)
            VALUES ($1, $2, $3, $4, FALSE, $5, $6)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.phone)
        .bind(payload.contact_handle)
        .bind(payload.code)
        .bind(payload.created_at)
        .bind(payload.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while creating otp: {}", err);
            Error::UnexpectedError
        })
    }

    async fn claim_latest(
        &self,
        phone: &str,
        code: &str,
        now: NaiveDateTime,
    ) -> Result<Option<Otp>> {
        sqlx::query_as::<_, Otp>(
            "
            UPDATE otps SET
                verified = TRUE,
                updated_at = NOW()
            WHERE
                id = (
                    SELECT id FROM otps
                    WHERE
                        phone = $1
                        AND code = $2
                        AND verified = FALSE
                        AND expires_at >= $3
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                AND verified = FALSE
            RETURNING *
            ",
        )
        .bind(phone)
        .bind(code)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while claiming otp: {}", err);
            Error::UnexpectedError
        })
    }

    async fn release(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE otps SET verified = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::error!("Failed to release otp {}: {}", id, err);
                Error::UnexpectedError
            })
    }

    async fn discard(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM otps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::error!("Failed to discard otp {}: {}", id, err);
                Error::UnexpectedError
            })
    }

    async fn invalidate_pending(
        &self,
        phone: &str,
        keep_id: &str,
        now: NaiveDateTime,
    ) -> Result<u64> {
        sqlx::query(
            "
            UPDATE otps SET
                expires_at = $2 - INTERVAL '1 second',
                updated_at = NOW()
            WHERE
                phone = $1
                AND id <> $3
                AND verified = FALSE
                AND expires_at >= $2
            ",
        )
        .bind(phone)
        .bind(now)
        .bind(keep_id)
        .execute(&self.pool)
        .await
        .map(|res| res.rows_affected())
        .map_err(|err| {
            tracing::error!("Failed to invalidate pending otps: {}", err);
            Error::UnexpectedError
        })
    }

    async fn purge_stale(&self, now: NaiveDateTime) -> Result<u64> {
        sqlx::query("DELETE FROM otps WHERE verified = TRUE OR expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected())
            .map_err(|err| {
                tracing::error!("Failed to purge stale otps: {}", err);
                Error::UnexpectedError
            })
    }
}
