//! Public API for the notification system
//!
//! External modules should import from here rather than directly from the
//! internal modules. There is no global notification service: each scan
//! supervisor owns its own [`NotificationManager`] and exposes it through
//! its `subscribe` method.

pub use crate::notifications::error::NotificationError;
pub use crate::notifications::event::{EventFilter, ScanEvent, ScanEventType};
pub use crate::notifications::manager::{EventReceiver, NotificationManager};
pub use crate::notifications::traits::{spawn_observer, ScanObserver};
