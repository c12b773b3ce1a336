use super::types::BetEvent;
use tokio::sync::broadcast;

/// Room for bursts such as settlement of a busy fight.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BetEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish one event. Having no subscribers is not an error.
    pub fn publish(&self, event: BetEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        tracing::trace!(receivers, "Published bet event");
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = BetEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BetEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FightResult, FightStatus};
    use uuid::Uuid;

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.publish(BetEvent::FightStatusChanged {
            fight_id: Uuid::now_v7(),
            status: FightStatus::BettingOpen,
        });
    }

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let fight_id = Uuid::now_v7();

        bus.publish_all([
            BetEvent::FightStatusChanged {
                fight_id,
                status: FightStatus::BettingClosed,
            },
            BetEvent::FightSettled {
                fight_id,
                result: FightResult::Draw,
            },
        ]);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.fight_id(), Some(fight_id));
        assert!(!first.ends_fight());
        let second = rx.recv().await.unwrap();
        assert!(second.ends_fight());
    }

    #[tokio::test]
    async fn slow_subscribers_observe_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        let fight_id = Uuid::now_v7();
        for _ in 0..4 {
            bus.publish(BetEvent::BetCancelled {
                fight_id,
                bet_id: Uuid::now_v7(),
            });
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
    }
}
