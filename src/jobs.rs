use crate::{modules::auth::service, types::Context};
use apalis::{cron::CronStream, prelude::*, utils::TokioExecutor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PurgeTick(DateTime<Utc>);

impl Job for PurgeTick {
    const NAME: &'static str = "menwear_otp::PurgeTick";
}

impl From<DateTime<Utc>> for PurgeTick {
    fn from(t: DateTime<Utc>) -> Self {
        Self(t)
    }
}

pub async fn purge_stale_otps(ctx: Arc<Context>, tick: PurgeTick) {
    match service::otp::purge_stale(ctx).await {
        Ok(purged) => tracing::info!("Purged {} stale otps at {}", purged, tick.0),
        Err(_) => tracing::error!("Failed to purge stale otps at {}", tick.0),
    }
}

pub async fn monitor(ctx: Arc<Context>) -> Monitor<TokioExecutor> {
    let schedule = ctx.otp.purge_schedule.clone();

    let worker = WorkerBuilder::new("menwear_otp::jobs::purge_stale_otps")
        .stream(CronStream::new(schedule).into_stream())
        .build_fn(move |tick: PurgeTick| {
            let ctx = ctx.clone();
            async move {
                purge_stale_otps(ctx, tick).await;
                Ok::<(), apalis::prelude::Error>(())
            }
        });

    Monitor::<TokioExecutor>::new().register_with_count(1, worker)
}
