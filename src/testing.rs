use crate::{
    modules::{
        auth::{
            repository::{
                contact::{self, normalize_handle, ContactRepository, TelegramContact},
                otp::{self, CreateOtpPayload, Otp, OtpRepository},
            },
            service::account::{self, Account, AccountProvider, NewAccount},
        },
        notification::service::{self as notification, Messenger, OutgoingMessage},
        order::repository::{self as order, CreateOrderPayload, Order, OrderRepository},
    },
    types::{AppContext, AppEnvironment, Context, OtpContext, RepositoryContext, TelegramContext},
};
use apalis::cron::Schedule;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};
use tower::ServiceExt;
use ulid::Ulid;

pub const ORDERS_CHAT_ID: &str = "-1000000000001";
pub const WEBHOOK_SECRET: &str = "webhook-secret";

#[derive(Default)]
pub struct MemoryOtpRepository {
    records: Mutex<Vec<Otp>>,
}

impl MemoryOtpRepository {
    pub fn all(&self) -> Vec<Otp> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert(&self, otp: Otp) {
        self.records.lock().unwrap().push(otp);
    }

    pub fn record(&self, phone: &str, code: &str, created_at: NaiveDateTime, verified: bool) -> Otp {
        Otp {
            id: Ulid::new().to_string(),
            phone: phone.to_string(),
            contact_handle: "ali123".to_string(),
            code: code.to_string(),
            verified,
            expires_at: created_at + Duration::minutes(5),
            created_at,
            updated_at: None,
        }
    }
}

#[async_trait]
impl OtpRepository for MemoryOtpRepository {
    async fn create(&self, payload: CreateOtpPayload) -> otp::Result<Otp> {
        let otp = Otp {
            id: Ulid::new().to_string(),
            phone: payload.phone,
            contact_handle: payload.contact_handle,
            code: payload.code,
            verified: false,
            expires_at: payload.expires_at,
            created_at: payload.created_at,
            updated_at: None,
        };
        self.insert(otp.clone());
        Ok(otp)
    }

    async fn claim_latest(
        &self,
        phone: &str,
        code: &str,
        now: NaiveDateTime,
    ) -> otp::Result<Option<Otp>> {
        let mut records = self.records.lock().unwrap();
        let newest = records
            .iter_mut()
            .filter(|otp| otp.phone == phone && otp.code == code && otp.is_claimable(now))
            .max_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        Ok(newest.map(|otp| {
            otp.verified = true;
            otp.updated_at = Some(now);
            otp.clone()
        }))
    }

    async fn release(&self, id: &str) -> otp::Result<()> {
        for otp in self.records.lock().unwrap().iter_mut() {
            if otp.id == id {
                otp.verified = false;
            }
        }
        Ok(())
    }

    async fn discard(&self, id: &str) -> otp::Result<()> {
        self.records.lock().unwrap().retain(|otp| otp.id != id);
        Ok(())
    }

    async fn invalidate_pending(
        &self,
        phone: &str,
        keep_id: &str,
        now: NaiveDateTime,
    ) -> otp::Result<u64> {
        let mut touched = 0;
        for otp in self.records.lock().unwrap().iter_mut() {
            if otp.phone == phone && otp.id != keep_id && otp.is_claimable(now) {
                otp.expires_at = now - Duration::seconds(1);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn purge_stale(&self, now: NaiveDateTime) -> otp::Result<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|otp| !otp.verified && otp.expires_at >= now);
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryContactRepository {
    contacts: Mutex<HashMap<String, i64>>,
}

impl MemoryContactRepository {
    pub fn register(&self, handle: &str, chat_id: i64) {
        self.contacts
            .lock()
            .unwrap()
            .insert(normalize_handle(handle), chat_id);
    }

    pub fn chat_id(&self, handle: &str) -> Option<i64> {
        self.contacts.lock().unwrap().get(handle).copied()
    }
}

#[async_trait]
impl ContactRepository for MemoryContactRepository {
    async fn upsert(&self, handle: &str, chat_id: i64) -> contact::Result<TelegramContact> {
        self.register(handle, chat_id);
        Ok(TelegramContact {
            handle: normalize_handle(handle),
            chat_id,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        })
    }

    async fn find_chat_id(&self, handle: &str) -> contact::Result<Option<i64>> {
        Ok(self.chat_id(&normalize_handle(handle)))
    }
}

#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderRepository {
    pub fn all(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create(&self, payload: CreateOrderPayload) -> order::Result<Order> {
        let order = Order {
            id: Ulid::new().to_string(),
            customer_name: payload.customer_name,
            customer_phone: payload.customer_phone,
            customer_address: payload.customer_address,
            total_price: order::total(&payload.items),
            items: sqlx::types::Json(payload.items),
            user_id: payload.user_id,
            status: order::NEW_ORDER_STATUS.to_string(),
            telegram_notified: false,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn mark_notified(&self, id: &str) -> order::Result<()> {
        for order in self.orders.lock().unwrap().iter_mut() {
            if order.id == id {
                order.telegram_notified = true;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<OutgoingMessage>>,
    failing: AtomicBool,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_deliveries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn last_code_for(&self, chat_id: &str) -> Option<String> {
        let pattern = regex::Regex::new(r"\*(\d{6})\*").unwrap();
        self.sent()
            .iter()
            .rev()
            .filter(|message| message.chat_id == chat_id)
            .find_map(|message| pattern.captures(&message.text))
            .map(|captures| captures[1].to_string())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, message: OutgoingMessage) -> notification::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(notification::Error::NotSent);
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAccountProvider {
    created: Mutex<Vec<NewAccount>>,
    unavailable: AtomicBool,
}

impl FakeAccountProvider {
    pub fn created(&self) -> Vec<NewAccount> {
        self.created.lock().unwrap().clone()
    }

    pub fn go_down(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountProvider for FakeAccountProvider {
    async fn create_user(&self, new_account: NewAccount) -> account::Result<Account> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(account::Error::Unavailable);
        }

        let mut created = self.created.lock().unwrap();
        if created.iter().any(|a| a.email == new_account.email) {
            return Err(account::Error::Rejected(
                "A user with this email address has already been registered".to_string(),
            ));
        }

        let account = Account {
            id: format!("user-{}", created.len() + 1),
            email: Some(new_account.email.clone()),
            user_metadata: json!({
                "full_name": new_account.full_name,
                "phone": new_account.phone,
                "telegram_username": new_account.contact_handle,
            }),
            created_at: None,
        };
        created.push(new_account);
        Ok(account)
    }
}

pub struct TestHarness {
    pub otps: Arc<MemoryOtpRepository>,
    pub contacts: Arc<MemoryContactRepository>,
    pub orders: Arc<MemoryOrderRepository>,
    pub messenger: Arc<RecordingMessenger>,
    pub accounts: Arc<FakeAccountProvider>,
    ctx: Arc<Context>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_supersede(false)
    }

    pub fn with_supersede(supersede_previous: bool) -> Self {
        let otps = Arc::new(MemoryOtpRepository::default());
        let contacts = Arc::new(MemoryContactRepository::default());
        let orders = Arc::new(MemoryOrderRepository::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let accounts = Arc::new(FakeAccountProvider::default());

        let ctx = Arc::new(Context {
            app: AppContext {
                host: "127.0.0.1".to_string(),
                environment: AppEnvironment::Development,
                port: 8000,
                url: "http://127.0.0.1:8000".to_string(),
            },
            otp: OtpContext {
                validity_minutes: 5,
                supersede_previous,
                purge_schedule: Schedule::from_str("0 0 * * * *").unwrap(),
            },
            telegram: TelegramContext {
                orders_chat_id: ORDERS_CHAT_ID.to_string(),
                webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            },
            repository: RepositoryContext {
                otp: otps.clone(),
                contact: contacts.clone(),
                order: orders.clone(),
            },
            messenger: messenger.clone(),
            accounts: accounts.clone(),
        });

        Self {
            otps,
            contacts,
            orders,
            messenger,
            accounts,
            ctx,
        }
    }

    pub fn ctx(&self) -> Arc<Context> {
        self.ctx.clone()
    }

    pub fn router(&self) -> Router {
        crate::app::router(self.ctx())
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        send(self.router(), request).await
    }
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}
