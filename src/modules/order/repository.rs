use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use ulid::Ulid;

pub const NEW_ORDER_STATUS: &str = "NEW";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl OrderItem {
    pub fn subtotal(&self) -> BigDecimal {
        self.price.clone() * BigDecimal::from(self.quantity)
    }
}

pub fn total(items: &[OrderItem]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::from(0), |acc, item| acc + item.subtotal())
}

#[derive(Serialize, Clone, Debug, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Json<Vec<OrderItem>>,
    pub total_price: BigDecimal,
    pub user_id: Option<String>,
    pub status: String,
    pub telegram_notified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct CreateOrderPayload {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<OrderItem>,
    pub user_id: Option<String>,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, payload: CreateOrderPayload) -> Result<Order>;
    async fn mark_notified(&self, id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, payload: CreateOrderPayload) -> Result<Order> {
        let total_price = total(&payload.items);

        sqlx::query_as::<_, Order>(
            "
            INSERT INTO orders (
                id,
                customer_name,
                customer_phone,
                customer_address,
                items,
                total_price,
                user_id,
                status,
                telegram_notified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE)
            RETURNING *
            ",
        )
        .bind(Ulid::new().to_string())
        .bind(payload.customer_name)
        .bind(payload.customer_phone)
        .bind(payload.customer_address)
        .bind(Json(payload.items))
        .bind(total_price)
        .bind(payload.user_id)
        .bind(NEW_ORDER_STATUS)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while creating order: {}", err);
            Error::UnexpectedError
        })
    }

    async fn mark_notified(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE orders SET telegram_notified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|err| {
                tracing::error!("Failed to mark order {} as notified: {}", id, err);
                Error::UnexpectedError
            })
    }
}
