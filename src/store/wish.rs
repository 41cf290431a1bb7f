//! The wishlist reconciliation store.
//!
//! Owns the authoritative list of items the current user has wished and,
//! after every toggle, patches each visible copy of the item's wish status
//! and count in place (browse results, featured lists, the open detail
//! record) so the UI stays consistent without a refetch. The display
//! collections stay owned by their views; this store only gets the
//! references handed to it per call and overwrites exactly two fields.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{self, ApiError, Transport};
use crate::service::{ListingDetail, ListingItem};

/// One user↔item wish relationship. Display fields are a best-effort copy
/// taken from whichever list the item was first seen in; the server-owned
/// truth is `item_id`, `wish_id`, `wished`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WishEntry {
    pub item_id: i64,
    pub wish_id: Option<i64>,
    pub wished: bool,
    pub title: String,
    pub price: i64,
    pub thumbnail: Option<String>,
    pub wish_count: i64,
}

impl From<&ListingItem> for WishEntry {
    fn from(item: &ListingItem) -> Self {
        Self {
            item_id: item.item_id,
            wish_id: None,
            wished: item.wished,
            title: item.title.clone(),
            price: item.display_price(),
            thumbnail: item.thumbnail.clone(),
            wish_count: item.wish_count,
        }
    }
}

impl From<&ListingDetail> for WishEntry {
    fn from(detail: &ListingDetail) -> Self {
        Self {
            item_id: detail.item_id,
            wish_id: None,
            wished: detail.wished,
            title: detail.title.clone(),
            price: detail.display_price(),
            thumbnail: detail.thumbnail.clone(),
            wish_count: detail.wish_count,
        }
    }
}

/// Mutable references to every collection that may display the toggled
/// item. The store locates matching records by `item_id` and patches them
/// in place; collections without a match are left alone, and nothing is
/// ever inserted into them.
#[derive(Default)]
pub struct PatchTargets<'a> {
    pub detail: Option<&'a mut ListingDetail>,
    pub primary: Option<&'a mut Vec<ListingItem>>,
    pub secondary: Vec<&'a mut Vec<ListingItem>>,
}

#[derive(Debug, Clone, Default)]
pub struct ToggleOutcome {
    pub succeeded: bool,
    pub wished: bool,
    pub wish_id: Option<i64>,
    pub wish_count: Option<i64>,
    pub message: Option<String>,
}

impl ToggleOutcome {
    fn failed(message: String) -> Self {
        Self {
            succeeded: false,
            message: Some(message),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WishlistLoad {
    pub succeeded: bool,
    pub requires_auth: bool,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WishToggleResponse {
    wished: bool,
    wish_id: Option<i64>,
    wish_count: Option<i64>,
}

pub struct WishStore {
    transport: Arc<dyn Transport>,
    entries: Vec<WishEntry>,
}

impl WishStore {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[WishEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_wished(&self, item_id: i64) -> bool {
        self.entries.iter().any(|e| e.item_id == item_id)
    }

    /// Toggle the wish state for `item_id`.
    ///
    /// `known_state` must carry the last-known server truth; when absent it
    /// is recovered from a loaded detail record matching the item, or the
    /// call fails without touching anything. No collection is mutated until
    /// the server has answered success; a failed toggle leaves every
    /// target exactly as it was.
    pub async fn toggle(
        &mut self,
        item_id: i64,
        known_state: Option<bool>,
        mut targets: PatchTargets<'_>,
    ) -> ToggleOutcome {
        let known = known_state.or_else(|| {
            targets
                .detail
                .as_deref()
                .filter(|d| d.item_id == item_id)
                .map(|d| d.wished)
        });
        let Some(currently_wished) = known else {
            return ToggleOutcome::failed("current wish state could not be determined".to_string());
        };

        let query = [("itemId", item_id.to_string())];
        if currently_wished {
            match self.transport.delete("/wish", &query).await {
                Ok(payload) => {
                    let response = decode_toggle(payload);
                    self.entries.retain(|e| e.item_id != item_id);
                    patch_targets(&mut targets, item_id, response.wished, response.wish_count);
                    ToggleOutcome {
                        succeeded: true,
                        wished: response.wished,
                        wish_id: None,
                        wish_count: response.wish_count,
                        message: None,
                    }
                }
                Err(err) => ToggleOutcome::failed(unwish_error_message(&err)),
            }
        } else {
            match self.transport.post("/wish", &query, None).await {
                Ok(payload) => {
                    let response = decode_toggle(payload);
                    self.upsert(item_id, &response, &targets);
                    patch_targets(&mut targets, item_id, response.wished, response.wish_count);
                    ToggleOutcome {
                        succeeded: true,
                        wished: response.wished,
                        wish_id: response.wish_id,
                        wish_count: response.wish_count,
                        message: None,
                    }
                }
                Err(err) => ToggleOutcome::failed(wish_error_message(&err)),
            }
        }
    }

    /// Replace the authoritative list with the server-side wishlist.
    ///
    /// A 401 is reported separately so callers can route to sign-in; the
    /// local list is cleared on every failure rather than leaving stale
    /// authenticated data visible.
    pub async fn load(&mut self) -> WishlistLoad {
        match self.transport.get("/user/me/wish", &[]).await {
            Ok(payload) => {
                let mut entries = Vec::new();
                for row in api::unwrap_array(payload) {
                    match serde_json::from_value::<WishEntry>(row) {
                        Ok(entry) => entries.push(entry),
                        Err(e) => tracing::warn!("skipping malformed wishlist entry: {e}"),
                    }
                }
                self.entries = entries;
                WishlistLoad {
                    succeeded: true,
                    requires_auth: false,
                    message: None,
                }
            }
            Err(err) => {
                self.entries.clear();
                if err.status() == Some(401) {
                    WishlistLoad {
                        succeeded: false,
                        requires_auth: true,
                        message: Some("sign in to view your wishlist".to_string()),
                    }
                } else {
                    WishlistLoad {
                        succeeded: false,
                        requires_auth: false,
                        message: Some(
                            err.server_message()
                                .unwrap_or("failed to load wishlist")
                                .to_string(),
                        ),
                    }
                }
            }
        }
    }

    /// Insert or update the authoritative entry after a successful wish.
    /// Display fields come from the first matching record found: detail,
    /// then the primary list, then any secondary list. With no source in
    /// sight a minimal stub is stored so counts still line up.
    fn upsert(&mut self, item_id: i64, response: &WishToggleResponse, targets: &PatchTargets<'_>) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.item_id == item_id) {
            existing.wished = response.wished;
            if response.wish_id.is_some() {
                existing.wish_id = response.wish_id;
            }
            if let Some(count) = response.wish_count {
                existing.wish_count = count;
            }
            return;
        }

        let mut entry = source_entry(targets, item_id).unwrap_or(WishEntry {
            item_id,
            ..Default::default()
        });
        entry.wished = response.wished;
        entry.wish_id = response.wish_id;
        if let Some(count) = response.wish_count {
            entry.wish_count = count;
        }
        self.entries.push(entry);
    }
}

fn decode_toggle(payload: Value) -> WishToggleResponse {
    api::decode(payload).unwrap_or_default()
}

fn source_entry(targets: &PatchTargets<'_>, item_id: i64) -> Option<WishEntry> {
    if let Some(detail) = targets.detail.as_deref() {
        if detail.item_id == item_id {
            return Some(WishEntry::from(detail));
        }
    }
    if let Some(primary) = targets.primary.as_deref() {
        if let Some(item) = primary.iter().find(|i| i.item_id == item_id) {
            return Some(WishEntry::from(item));
        }
    }
    for list in &targets.secondary {
        if let Some(item) = list.iter().find(|i| i.item_id == item_id) {
            return Some(WishEntry::from(item));
        }
    }
    None
}

fn patch_targets(
    targets: &mut PatchTargets<'_>,
    item_id: i64,
    wished: bool,
    wish_count: Option<i64>,
) {
    if let Some(detail) = targets.detail.as_deref_mut() {
        if detail.item_id == item_id {
            detail.wished = wished;
            if let Some(count) = wish_count {
                detail.wish_count = count;
            }
        }
    }
    if let Some(primary) = targets.primary.as_deref_mut() {
        patch_list(primary, item_id, wished, wish_count);
    }
    for list in &mut targets.secondary {
        patch_list(list.as_mut_slice(), item_id, wished, wish_count);
    }
}

fn patch_list(list: &mut [ListingItem], item_id: i64, wished: bool, wish_count: Option<i64>) {
    if let Some(item) = list.iter_mut().find(|i| i.item_id == item_id) {
        item.wished = wished;
        if let Some(count) = wish_count {
            item.wish_count = count;
        }
    }
}

fn unwish_error_message(err: &ApiError) -> String {
    if let Some(message) = err.server_message() {
        return message.to_string();
    }
    match err.status() {
        Some(404) => "item not found".to_string(),
        Some(500) => "un-wish operation failed".to_string(),
        Some(_) => "failed to remove wish".to_string(),
        None => "network error while removing wish".to_string(),
    }
}

fn wish_error_message(err: &ApiError) -> String {
    if let Some(message) = err.server_message() {
        return message.to_string();
    }
    match err.status() {
        Some(403) => "cannot wish your own item".to_string(),
        Some(404) => "item not found".to_string(),
        Some(409) => "already wished".to_string(),
        Some(500) => "wish operation failed".to_string(),
        Some(_) => "failed to add wish".to_string(),
        None => "network error while adding wish".to_string(),
    }
}
