mod browse;
mod detail;
mod notifications;
mod prompt;
mod status_bar;
mod wishlist;

pub use browse::render_browse_view;
pub use detail::render_detail_view;
pub use notifications::render_notifications_view;
pub use prompt::render_prompt;
pub use status_bar::render_status_bar;
pub use wishlist::render_wishlist_view;
