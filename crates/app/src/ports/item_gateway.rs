//! Item gateway port: outbound commands to the underlying device items.

use std::sync::Arc;

use zonehub_domain::device::ItemValue;

/// Sends commands to the item storage of the host runtime.
///
/// Commands are fire-and-forget: there is no acknowledgment contract.
/// Implementations log their own failures.
pub trait ItemGateway: Send + Sync {
    fn send_command(&self, item: &str, value: &ItemValue);
}

impl<T: ItemGateway + ?Sized> ItemGateway for Arc<T> {
    fn send_command(&self, item: &str, value: &ItemValue) {
        (**self).send_command(item, value);
    }
}
