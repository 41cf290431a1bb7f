pub mod goods;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auction lifecycle states as reported by the backend. Values the client
/// does not know yet parse as `Unknown` instead of failing the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum AuctionStatus {
    Wait,
    Proceeding,
    Completed,
    Stopped,
    #[default]
    Unknown,
}

impl From<String> for AuctionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "WAIT" => AuctionStatus::Wait,
            "PROCEEDING" => AuctionStatus::Proceeding,
            "COMPLETED" => AuctionStatus::Completed,
            "STOPPED" => AuctionStatus::Stopped,
            _ => AuctionStatus::Unknown,
        }
    }
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AuctionStatus::Wait => "waiting",
            AuctionStatus::Proceeding => "live",
            AuctionStatus::Completed => "ended",
            AuctionStatus::Stopped => "stopped",
            AuctionStatus::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// One listing row as it appears in any UI-facing list (browse results,
/// featured lists). Owned by whichever view fetched it; the wish store only
/// ever patches `wished` and `wish_count` in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingItem {
    pub item_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub start_price: i64,
    pub current_bid: Option<i64>,
    pub auction_status: AuctionStatus,
    pub thumbnail: Option<String>,
    pub wished: bool,
    pub wish_count: i64,
}

/// Full listing record for the detail view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDetail {
    pub item_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub seller_id: Option<i64>,
    pub seller_nickname: Option<String>,
    pub start_price: i64,
    pub current_bid: Option<i64>,
    pub auction_status: AuctionStatus,
    pub auction_end_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
    pub wished: bool,
    pub wish_count: i64,
}

impl ListingItem {
    /// Price to show in lists: the start price until a bid exists (or the
    /// auction never ran), the current bid afterwards.
    pub fn display_price(&self) -> i64 {
        display_price(self.current_bid, self.start_price, self.auction_status)
    }
}

impl ListingDetail {
    pub fn display_price(&self) -> i64 {
        display_price(self.current_bid, self.start_price, self.auction_status)
    }
}

fn display_price(current_bid: Option<i64>, start_price: i64, status: AuctionStatus) -> i64 {
    match current_bid {
        None if matches!(status, AuctionStatus::Wait | AuctionStatus::Stopped) => start_price,
        Some(bid) if bid > 0 => bid,
        _ => start_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listing_item_parses_wire_names() {
        let item: ListingItem = serde_json::from_value(json!({
            "itemId": 42,
            "title": "Tin robot",
            "startPrice": 1000,
            "currentBid": 1500,
            "auctionStatus": "PROCEEDING",
            "wished": true,
            "wishCount": 3
        }))
        .unwrap();

        assert_eq!(item.item_id, 42);
        assert_eq!(item.auction_status, AuctionStatus::Proceeding);
        assert!(item.wished);
        assert_eq!(item.wish_count, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let item: ListingItem = serde_json::from_value(json!({ "itemId": 1 })).unwrap();
        assert!(!item.wished);
        assert_eq!(item.wish_count, 0);
        assert_eq!(item.auction_status, AuctionStatus::Unknown);
    }

    #[test]
    fn unknown_status_does_not_fail_parsing() {
        let item: ListingItem =
            serde_json::from_value(json!({ "itemId": 1, "auctionStatus": "PAUSED" })).unwrap();
        assert_eq!(item.auction_status, AuctionStatus::Unknown);
    }

    #[test]
    fn display_price_rules() {
        let mut item = ListingItem {
            start_price: 500,
            auction_status: AuctionStatus::Wait,
            ..Default::default()
        };
        assert_eq!(item.display_price(), 500);

        item.auction_status = AuctionStatus::Proceeding;
        item.current_bid = Some(900);
        assert_eq!(item.display_price(), 900);

        item.current_bid = None;
        assert_eq!(item.display_price(), 500);
    }
}
