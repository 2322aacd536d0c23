use std::sync::Arc;

use crate::{auth::AuthManager, config::Config, mailer};
use bookloop_core::{
    automation::{AutomationService, AutomationServiceTrait},
    books::BookRepositoryTrait,
    followups::{FollowUpConfig, FollowUpService, FollowUpServiceTrait},
    messages::MessageRepositoryTrait,
    notifications::NotificationSender,
    orders::{OrderService, OrderServiceConfig, OrderServiceTrait},
    users::UserRepositoryTrait,
};
use bookloop_storage_sqlite::{
    automation_logs::AutomationLogRepository, books::BookRepository, db,
    messages::MessageRepository, orders::OrderRepository, users::UserRepository,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub struct AppState {
    pub order_service: Arc<dyn OrderServiceTrait>,
    pub follow_up_service: Arc<dyn FollowUpServiceTrait>,
    pub automation_service: Arc<dyn AutomationServiceTrait>,
    pub book_repository: Arc<dyn BookRepositoryTrait>,
    pub user_repository: Arc<dyn UserRepositoryTrait>,
    pub message_repository: Arc<dyn MessageRepositoryTrait>,
    pub auth: Option<Arc<AuthManager>>,
    pub cron_secret: Option<String>,
}

pub fn init_tracing() {
    let log_format = std::env::var("BL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with_sender(config, mailer::build_sender(config.smtp.as_ref())).await
}

/// Wires repositories and services around the given email transport.
pub async fn build_state_with_sender(
    config: &Config,
    sender: Arc<dyn NotificationSender>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let order_repository = Arc::new(OrderRepository::new(pool.clone(), writer.clone()));
    let book_repository = Arc::new(BookRepository::new(pool.clone(), writer.clone()));
    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let message_repository = Arc::new(MessageRepository::new(pool.clone(), writer.clone()));
    let log_repository = Arc::new(AutomationLogRepository::new(pool.clone(), writer.clone()));

    let automation_service: Arc<dyn AutomationServiceTrait> = Arc::new(
        AutomationService::new(log_repository, sender)
            .with_send_timeout(config.notification_timeout),
    );

    let follow_up_delay = chrono::Duration::try_seconds(config.follow_up_delay_secs)
        .ok_or_else(|| anyhow::anyhow!("Follow-up delay is out of range"))?;
    let follow_up_cooldown = chrono::Duration::try_seconds(config.follow_up_cooldown_secs)
        .ok_or_else(|| anyhow::anyhow!("Follow-up cooldown is out of range"))?;

    let order_service: Arc<dyn OrderServiceTrait> = Arc::new(
        OrderService::new(
            order_repository.clone(),
            book_repository.clone(),
            user_repository.clone(),
            message_repository.clone(),
            automation_service.clone(),
        )
        .with_config(OrderServiceConfig {
            follow_up_delay,
        }),
    );

    let follow_up_service: Arc<dyn FollowUpServiceTrait> = Arc::new(FollowUpService::new(
        order_repository,
        message_repository.clone(),
        FollowUpConfig {
            cooldown: follow_up_cooldown,
            app_base_url: config.app_base_url.trim_end_matches('/').to_string(),
        },
    ));

    let auth = match &config.auth {
        Some(auth_config) => Some(Arc::new(AuthManager::new(auth_config)?)),
        None => {
            tracing::warn!("Admin authentication is not configured; admin actions are disabled");
            None
        }
    };

    Ok(Arc::new(AppState {
        order_service,
        follow_up_service,
        automation_service,
        book_repository,
        user_repository,
        message_repository,
        auth,
        cron_secret: config.cron_secret.clone(),
    }))
}
