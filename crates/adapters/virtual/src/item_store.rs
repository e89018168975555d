//! In-memory item store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use zonehub_app::event_bus::{InProcessEventBus, ItemChange};
use zonehub_app::ports::ItemGateway;
use zonehub_domain::device::ItemValue;

#[derive(Default)]
struct Store {
    values: HashMap<String, ItemValue>,
    commands: Vec<(String, ItemValue)>,
}

/// Item storage kept in memory.
///
/// Every value that actually changes is published on the bus (when one
/// is attached), so commands loop back as item changes the way a real
/// host reports them.
#[derive(Default)]
pub struct InMemoryItemStore {
    store: Mutex<Store>,
    bus: Option<InProcessEventBus>,
}

impl InMemoryItemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bus(bus: InProcessEventBus) -> Self {
        Self {
            store: Mutex::default(),
            bus: Some(bus),
        }
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value of `item`, if ever set.
    #[must_use]
    pub fn get(&self, item: &str) -> Option<ItemValue> {
        self.store().values.get(item).cloned()
    }

    /// Simulate a change coming from the host. Returns whether the value changed.
    pub fn set(&self, item: &str, value: ItemValue) -> bool {
        let changed = self.store().values.insert(item.to_string(), value.clone()).as_ref() != Some(&value);
        if changed {
            if let Some(bus) = &self.bus {
                bus.publish(ItemChange::new(item, value));
            }
        }
        changed
    }

    /// Every command received so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<(String, ItemValue)> {
        self.store().commands.clone()
    }
}

impl ItemGateway for InMemoryItemStore {
    fn send_command(&self, item: &str, value: &ItemValue) {
        tracing::debug!(item, %value, "command received");
        self.store().commands.push((item.to_string(), value.clone()));
        self.set(item, value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_record_commands_and_values() {
        let store = InMemoryItemStore::new();
        store.send_command("kitchen_light", &ItemValue::On);

        assert_eq!(store.get("kitchen_light"), Some(ItemValue::On));
        assert_eq!(
            store.commands(),
            vec![("kitchen_light".to_string(), ItemValue::On)]
        );
    }

    #[tokio::test]
    async fn should_publish_only_actual_changes() {
        let bus = InProcessEventBus::new(8);
        let mut rx = bus.subscribe();
        let store = InMemoryItemStore::with_bus(bus);

        assert!(store.set("front_door", ItemValue::Open));
        assert!(!store.set("front_door", ItemValue::Open));
        assert!(store.set("front_door", ItemValue::Closed));

        assert_eq!(rx.recv().await.unwrap().value, ItemValue::Open);
        assert_eq!(rx.recv().await.unwrap().value, ItemValue::Closed);
        assert!(rx.try_recv().is_err());
    }
}
