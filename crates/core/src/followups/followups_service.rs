use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_APP_BASE_URL, DEFAULT_FOLLOW_UP_COOLDOWN_SECS};
use crate::errors::{Error, Result, ValidationError};
use crate::messages::{MessageRepositoryTrait, NewMessage};
use crate::notifications::templates;
use crate::orders::OrderRepositoryTrait;
use crate::utils::{Clock, SystemClock};

#[derive(Debug, Clone)]
pub struct FollowUpConfig {
    /// Minimum time between two follow-ups for the same order.
    pub cooldown: Duration,
    /// Base URL of the web app, used for the confirm-delivery deep link.
    pub app_base_url: String,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::seconds(DEFAULT_FOLLOW_UP_COOLDOWN_SECS),
            app_base_url: DEFAULT_APP_BASE_URL.to_string(),
        }
    }
}

/// Outcome of one scheduler poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpReport {
    pub processed_count: usize,
    pub order_ids: Vec<i64>,
}

#[async_trait]
pub trait FollowUpServiceTrait: Send + Sync {
    /// Sends one follow-up to every due order and stamps it.
    ///
    /// Safe to call concurrently: an order is claimed by at most one poll per
    /// cooldown window.
    async fn run_due_follow_ups(&self) -> Result<FollowUpReport>;
}

pub struct FollowUpService {
    order_repository: Arc<dyn OrderRepositoryTrait>,
    message_repository: Arc<dyn MessageRepositoryTrait>,
    clock: Arc<dyn Clock>,
    config: FollowUpConfig,
}

impl FollowUpService {
    pub fn new(
        order_repository: Arc<dyn OrderRepositoryTrait>,
        message_repository: Arc<dyn MessageRepositoryTrait>,
        config: FollowUpConfig,
    ) -> Self {
        FollowUpService {
            order_repository,
            message_repository,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl FollowUpServiceTrait for FollowUpService {
    async fn run_due_follow_ups(&self) -> Result<FollowUpReport> {
        let now = self.clock.now_naive();
        let cooldown_cutoff = now.checked_sub_signed(self.config.cooldown).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "follow-up cooldown of {}s is out of range",
                self.config.cooldown.num_seconds()
            )))
        })?;

        // Selection and stamp are one write; whatever happens below, these
        // orders stay quiet until the cooldown elapses.
        let claimed = self
            .order_repository
            .claim_due_follow_ups(now, cooldown_cutoff)
            .await?;

        if claimed.is_empty() {
            debug!("No orders due for a follow-up");
            return Ok(FollowUpReport::default());
        }

        let mut order_ids = Vec::with_capacity(claimed.len());
        for order in &claimed {
            let link = templates::confirm_delivery_link(&self.config.app_base_url, order.id);
            let message = NewMessage::system(
                order.buyer_id,
                order.id,
                templates::follow_up_message(order.id, &link),
            );
            if let Err(e) = self.message_repository.create_message(message).await {
                warn!(
                    "Follow-up message for order {} could not be created: {}",
                    order.id, e
                );
            }
            order_ids.push(order.id);
        }

        info!("Sent follow-ups for {} order(s)", order_ids.len());
        Ok(FollowUpReport {
            processed_count: order_ids.len(),
            order_ids,
        })
    }
}
