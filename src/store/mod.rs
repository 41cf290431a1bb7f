pub mod notification;
pub mod wish;

pub use notification::{Notification, NotificationKind, NotificationStore};
pub use wish::{PatchTargets, ToggleOutcome, WishEntry, WishStore, WishlistLoad};
