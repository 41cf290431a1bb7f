//! In-memory notification feed, most-recent-first, capped at 100.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::Transport;

/// Entries beyond this are silently dropped, oldest first.
pub const MAX_NOTIFICATIONS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum NotificationKind {
    BidUpdate,
    AuctionEnding,
    TradeSuccess,
    #[default]
    Unknown,
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "BID_UPDATE" => NotificationKind::BidUpdate,
            "AUCTION_ENDING" => NotificationKind::AuctionEnding,
            "TRADE_SUCCESS" => NotificationKind::TradeSuccess,
            _ => NotificationKind::Unknown,
        }
    }
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::BidUpdate => "bid",
            NotificationKind::AuctionEnding => "ending",
            NotificationKind::TradeSuccess => "trade",
            NotificationKind::Unknown => "info",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub item_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    /// Local read flag, derived from `read_at` on bulk load; poll
    /// deliveries always arrive unread.
    #[serde(skip)]
    pub read: bool,
}

pub struct NotificationStore {
    transport: Arc<dyn Transport>,
    entries: Vec<Notification>,
}

impl NotificationStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Prepend a batch delivered by the polling channel. The channel does
    /// not dedup, so ids already present are skipped here.
    pub fn apply_batch(&mut self, batch: Vec<Notification>) {
        for mut notification in batch {
            if self.entries.iter().any(|n| n.id == notification.id) {
                continue;
            }
            notification.read = notification.read_at.is_some();
            self.entries.insert(0, notification);
        }
        self.entries.truncate(MAX_NOTIFICATIONS);
    }

    /// Bulk load from the server, replacing the local feed.
    pub async fn load(&mut self) {
        match self.transport.get("/notification", &[]).await {
            Ok(payload) => {
                let mut entries = Vec::new();
                for row in crate::api::unwrap_array(payload) {
                    match serde_json::from_value::<Notification>(row) {
                        Ok(mut notification) => {
                            notification.read = notification.read_at.is_some();
                            entries.push(notification);
                        }
                        Err(e) => tracing::warn!("skipping malformed notification: {e}"),
                    }
                }
                entries.truncate(MAX_NOTIFICATIONS);
                self.entries = entries;
            }
            Err(e) => {
                tracing::warn!("failed to load notifications: {e}");
                self.entries.clear();
            }
        }
    }

    pub fn mark_read(&mut self, id: i64) {
        if let Some(notification) = self.entries.iter_mut().find(|n| n.id == id) {
            notification.read = true;
        }
    }

    pub fn mark_all_read(&mut self) {
        for notification in &mut self.entries {
            notification.read = true;
        }
    }

    /// Mirror a read flip to the server; the local flip happens only once
    /// the server accepted it.
    pub async fn mark_read_synced(&mut self, id: i64) {
        match self.transport.patch(&format!("/notification/{id}"), &[]).await {
            Ok(_) => self.mark_read(id),
            Err(e) => tracing::debug!("mark-read not persisted for {id}: {e}"),
        }
    }

    pub async fn mark_all_read_synced(&mut self) {
        match self.transport.patch("/notification/read-all", &[]).await {
            Ok(_) => self.mark_all_read(),
            Err(e) => tracing::debug!("mark-all-read not persisted: {e}"),
        }
    }
}
