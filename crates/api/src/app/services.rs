//! Service wiring: one store, one event bus with every handler registered,
//! and the application services built on top of them.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use tradeerp_infra::handlers::register_all;
use tradeerp_infra::services::{
    AdminService, InvoicingService, PayablesService, ProjectService, PurchasingService,
    SalesService,
};
use tradeerp_infra::{
    ActivityFeed, AppConfig, Database, EventBus, InProcessProjectLocks, Queries,
};

/// Entries kept in memory for `GET /activity`.
const ACTIVITY_CAPACITY: usize = 256;

type Bus = Arc<EventBus>;

pub struct AppServices {
    pub config: AppConfig,
    pub admin: AdminService,
    pub projects: ProjectService<Bus, InProcessProjectLocks>,
    pub sales: SalesService<Bus>,
    pub purchasing: PurchasingService<Bus>,
    pub payables: PayablesService,
    pub invoicing: InvoicingService,
    pub queries: Queries,
    pub activity: Arc<ActivityFeed>,
}

impl AppServices {
    pub fn build(config: AppConfig) -> Self {
        let db = Arc::new(Database::new());
        let activity = Arc::new(ActivityFeed::new(ACTIVITY_CAPACITY));

        let mut bus = EventBus::new();
        register_all(&mut bus, &config, Arc::clone(&activity));
        let bus = Arc::new(bus);
        tracing::info!(?bus, "event bus ready");

        Self {
            admin: AdminService::new(Arc::clone(&db)),
            projects: ProjectService::new(
                Arc::clone(&db),
                Arc::clone(&bus),
                InProcessProjectLocks::new(),
            ),
            sales: SalesService::new(Arc::clone(&db), Arc::clone(&bus)),
            purchasing: PurchasingService::new(Arc::clone(&db), bus),
            payables: PayablesService::new(Arc::clone(&db)),
            invoicing: InvoicingService::new(Arc::clone(&db), &config),
            queries: Queries::new(db),
            activity,
            config,
        }
    }
}

/// Live feed of committed domain events as server-sent events.
///
/// A subscriber that falls behind skips the entries it missed.
pub fn activity_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.activity.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(entry) => {
            let data = serde_json::to_string(&entry).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default()
                .event(entry.event_type)
                .id(entry.sequence.to_string())
                .data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
