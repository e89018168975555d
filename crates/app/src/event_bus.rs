//! In-process item-change bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use zonehub_domain::device::ItemValue;

/// A raw state change of one underlying item, as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChange {
    pub item: String,
    pub value: ItemValue,
}

impl ItemChange {
    #[must_use]
    pub fn new(item: impl Into<String>, value: ItemValue) -> Self {
        Self {
            item: item.into(),
            value,
        }
    }

    /// Parse an `"<item> <value>"` line. Returns `None` for blank lines.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (item, value) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        Some(Self::new(item, ItemValue::from(value)))
    }
}

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the change is simply dropped).
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<ItemChange>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to changes on this bus.
    ///
    /// Returns a receiver that will get all changes published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ItemChange> {
        self.sender.subscribe()
    }

    /// Publish a change to all current subscribers.
    pub fn publish(&self, change: ItemChange) {
        // Fails only when nobody listens.
        if self.sender.send(change).is_err() {
            tracing::trace!("item change published without subscriber");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_deliver_change_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ItemChange::new("office_motion", ItemValue::On));

        assert_eq!(rx1.recv().await.unwrap().item, "office_motion");
        assert_eq!(rx2.recv().await.unwrap().value, ItemValue::On);
    }

    #[tokio::test]
    async fn should_not_deliver_changes_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(ItemChange::new("early", ItemValue::On));

        let mut rx = bus.subscribe();
        bus.publish(ItemChange::new("later", ItemValue::Off));

        assert_eq!(rx.recv().await.unwrap().item, "later");
    }

    #[test]
    fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        bus.publish(ItemChange::new("office_motion", ItemValue::On));
    }

    #[test]
    fn should_parse_feed_lines() {
        assert_eq!(
            ItemChange::parse_line("  living_temperature 23.5 "),
            Some(ItemChange::new("living_temperature", ItemValue::Number(23.5)))
        );
        assert_eq!(
            ItemChange::parse_line("front_door OPEN"),
            Some(ItemChange::new("front_door", ItemValue::Open))
        );
        assert_eq!(
            ItemChange::parse_line("sensor"),
            Some(ItemChange::new("sensor", ItemValue::Undefined))
        );
        assert_eq!(ItemChange::parse_line("   "), None);
        assert_eq!(ItemChange::parse_line("# comment"), None);
    }
}
