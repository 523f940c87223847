//! `recorder`: keeps the event history and purges it on a schedule.
//!
//! The recorder subscribes to the event bus during setup. A background
//! loop appends every event to the shared [`EventHistory`], drops entries
//! older than `purge_keep_days` on each purge tick, and stops once
//! `homehub_stop` is seen or the bus closes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use homehub_app::component::{BoxError, ComponentDescriptor, DescriptorError};
use homehub_app::context::SetupContext;
use homehub_domain::error::ConfigError;
use homehub_domain::event::{Event, EventType};
use homehub_domain::time::{Timestamp, now};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::schema::{Section, invalid, typed};

pub const DOMAIN: &str = "recorder";

/// `[recorder]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecorderConfig {
    /// Days of history kept by each purge.
    #[serde(default = "default_purge_keep_days")]
    pub purge_keep_days: u32,
    /// Hours between purges.
    #[serde(default = "default_purge_interval_hours")]
    pub purge_interval_hours: u32,
    /// Database location, the recorder's own default when unset.
    #[serde(default)]
    pub db_url: Option<String>,
}

fn default_purge_keep_days() -> u32 {
    10
}

fn default_purge_interval_hours() -> u32 {
    24
}

impl RecorderConfig {
    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.purge_interval_hours) * 3600)
    }

    /// Oldest timestamp kept when purging at `at`.
    #[must_use]
    pub fn purge_cutoff(&self, at: Timestamp) -> Timestamp {
        at - chrono::TimeDelta::days(i64::from(self.purge_keep_days))
    }
}

/// Recorded events, oldest first. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct EventHistory {
    events: Arc<Mutex<VecDeque<Event>>>,
}

impl EventHistory {
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, event: Event) {
        self.lock().push_back(event);
    }

    /// Drop every event stamped before `cutoff`, returning how many went.
    pub fn purge_before(&self, cutoff: Timestamp) -> usize {
        let mut events = self.lock();
        let before = events.len();
        events.retain(|event| event.timestamp >= cutoff);
        before - events.len()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Section for RecorderConfig {
    fn validate(&self, domain: &str) -> Result<(), ConfigError> {
        if self.purge_keep_days == 0 {
            return Err(invalid(domain, "purge_keep_days", "must be at least 1"));
        }
        if self.purge_interval_hours == 0 {
            return Err(invalid(domain, "purge_interval_hours", "must be at least 1"));
        }
        Ok(())
    }
}

/// # Errors
///
/// Fails only if the descriptor is malformed.
pub fn component(history: EventHistory) -> Result<ComponentDescriptor, DescriptorError> {
    ComponentDescriptor::builder(DOMAIN)
        .config_schema(typed::<RecorderConfig>)
        .async_setup(move |ctx: SetupContext, config| {
            let history = history.clone();
            async move {
                let config: RecorderConfig = serde_json::from_value(config)?;
                let events = ctx.event_bus().subscribe();
                tracing::info!(
                    keep_days = config.purge_keep_days,
                    db_url = config.db_url.as_deref().unwrap_or("default"),
                    "recorder started"
                );
                tokio::spawn(record(events, history, config));
                Ok::<_, BoxError>(true)
            }
        })
        .build()
}

async fn record(mut events: Receiver<Event>, history: EventHistory, config: RecorderConfig) {
    let mut purge = tokio::time::interval(config.purge_interval());
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    let stop = event.event_type == EventType::HomehubStop;
                    history.record(event);
                    if stop {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "recorder fell behind, events lost");
                }
                Err(RecvError::Closed) => break,
            },
            _ = purge.tick() => {
                let removed = history.purge_before(config.purge_cutoff(now()));
                tracing::debug!(removed, kept = history.len(), "purged recorded events");
            }
        }
    }
    tracing::info!(recorded = history.len(), "recorder stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Result<serde_json::Value, ConfigError> {
        let component = component(EventHistory::default()).unwrap();
        let schema = component.config_schema().unwrap();
        schema(DOMAIN, value)
    }

    #[test]
    fn should_fill_defaults() {
        assert_eq!(
            schema(json!({})).unwrap(),
            json!({"purge_keep_days": 10, "purge_interval_hours": 24, "db_url": null})
        );
    }

    #[test]
    fn should_reject_zero_keep_days() {
        let err = schema(json!({"purge_keep_days": 0})).unwrap_err();
        assert!(matches!(err, ConfigError::Schema { ref key, .. } if key == "purge_keep_days"));
    }

    #[test]
    fn should_compute_purge_interval() {
        let config = RecorderConfig {
            purge_keep_days: 3,
            purge_interval_hours: 2,
            db_url: None,
        };
        assert_eq!(config.purge_interval(), Duration::from_secs(7200));
    }

    #[test]
    fn should_purge_events_older_than_cutoff() {
        let config = RecorderConfig {
            purge_keep_days: 10,
            purge_interval_hours: 24,
            db_url: None,
        };
        let history = EventHistory::default();
        let mut stale = Event::component_loaded("old");
        stale.timestamp = now() - chrono::TimeDelta::days(11);
        history.record(stale);
        history.record(Event::component_loaded("fresh"));

        assert_eq!(history.purge_before(config.purge_cutoff(now())), 1);
        let kept: Vec<_> = history
            .events()
            .iter()
            .filter_map(|event| event.component().map(str::to_string))
            .collect();
        assert_eq!(kept, vec!["fresh"]);
    }

    #[tokio::test]
    async fn should_record_bus_events_until_stop() {
        let history = EventHistory::default();
        let ctx = SetupContext::builder()
            .loader(Arc::new(
                homehub_app::registry::ComponentRegistry::with_components([component(
                    history.clone(),
                )
                .unwrap()])
                .unwrap(),
            ))
            .build()
            .unwrap();

        assert!(ctx.async_setup_component(DOMAIN, None).await);
        ctx.event_bus().fire(Event::component_loaded("light"));
        ctx.event_bus()
            .fire(Event::new(EventType::HomehubStop, json!({})));

        tokio::time::timeout(Duration::from_secs(1), async {
            while !history
                .events()
                .iter()
                .any(|event| event.event_type == EventType::HomehubStop)
            {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        ctx.event_bus().fire(Event::component_loaded("late"));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let components: Vec<_> = history
            .events()
            .iter()
            .filter_map(|event| event.component().map(str::to_string))
            .collect();
        assert!(components.contains(&"light".to_string()));
        assert!(!components.contains(&"late".to_string()));
    }
}
