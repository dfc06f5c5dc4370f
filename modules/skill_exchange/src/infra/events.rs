use tracing::info;

use crate::domain::events::SkillExchangeEvent;
use crate::domain::ports::EventPublisher;

/// Publishes domain events as structured log records under the
/// `skill_exchange::events` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl EventPublisher<SkillExchangeEvent> for TracingEventPublisher {
    fn publish(&self, event: &SkillExchangeEvent) {
        info!(target: "skill_exchange::events", event = event.name(), payload = ?event, "domain event");
    }
}
