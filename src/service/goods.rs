//! Listing catalog and bidding operations.
//!
//! Bid validation runs client-side before any request goes out; the server
//! still owns correctness and re-checks everything.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{self, ApiError, ApiResult, Transport};
use crate::format::format_price;

use super::{AuctionStatus, ListingDetail, ListingItem};

/// Hard trade limit enforced on bids, in gold.
pub const MAX_BID_AMOUNT: i64 = 5_000_000;

#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidCheck {
    pub valid: bool,
    pub message: Option<String>,
}

impl BidCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            valid: false,
            message: Some(message),
        }
    }
}

/// Outcome of a bid attempt, already mapped to a user-facing message.
#[derive(Debug, Clone, Default)]
pub struct BidOutcome {
    pub succeeded: bool,
    pub current_bid: Option<i64>,
    pub message: Option<String>,
}

/// Validate a bid amount before submitting it.
///
/// The first bid on a waiting auction may equal the start price; every
/// later bid must exceed the current one.
pub fn validate_bid(
    amount: i64,
    current_bid: Option<i64>,
    start_price: i64,
    status: AuctionStatus,
) -> BidCheck {
    if amount <= 0 {
        return BidCheck::rejected("enter a valid amount".to_string());
    }

    let is_first_bid = status == AuctionStatus::Wait && current_bid.is_none();
    if is_first_bid {
        if amount < start_price {
            return BidCheck::rejected(format!(
                "bid at least the starting price ({})",
                format_price(start_price)
            ));
        }
    } else {
        let min_bid = current_bid.unwrap_or(start_price);
        if amount <= min_bid {
            return BidCheck::rejected(format!(
                "bid more than the current bid ({})",
                format_price(min_bid)
            ));
        }
    }

    if amount > MAX_BID_AMOUNT {
        return BidCheck::rejected(format!(
            "bids cannot exceed the trade limit ({})",
            format_price(MAX_BID_AMOUNT)
        ));
    }

    BidCheck::ok()
}

fn bid_error_message(err: &ApiError) -> String {
    if let Some(message) = err.server_message() {
        return message.to_string();
    }
    match err.status() {
        None => "network error, try again shortly".to_string(),
        Some(400) => "invalid bid request".to_string(),
        Some(403) => "sellers cannot bid on their own items".to_string(),
        Some(404) => "item not found or auction already ended".to_string(),
        Some(500) => "server error, try again shortly".to_string(),
        Some(_) => "bid could not be processed".to_string(),
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct BidResponse {
    current_bid: Option<i64>,
    bid_amount: Option<i64>,
}

pub struct GoodsService {
    transport: Arc<dyn Transport>,
}

impl GoodsService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch a page of listings. The list endpoint wraps its rows as
    /// `{ items: [...] }`; older deployments return the bare array.
    pub async fn list(&self, filter: &ListingFilter) -> ApiResult<Vec<ListingItem>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(category) = &filter.category {
            query.push(("category", category.clone()));
        }
        if let Some(keyword) = &filter.keyword {
            query.push(("keyword", keyword.clone()));
        }
        if let Some(page) = filter.page {
            query.push(("page", page.to_string()));
        }

        let payload = self.transport.get("/goods/list", &query).await?;
        let rows = match payload {
            Value::Object(mut map) => api::unwrap_array(map.remove("items").unwrap_or(Value::Null)),
            other => api::unwrap_array(other),
        };

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<ListingItem>(row) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("skipping malformed listing row: {e}"),
            }
        }
        Ok(items)
    }

    pub async fn detail(&self, item_id: i64) -> ApiResult<ListingDetail> {
        let payload = self
            .transport
            .get("/goods", &[("itemId", item_id.to_string())])
            .await?;
        api::decode(payload)
    }

    pub async fn delete(&self, item_id: i64) -> ApiResult<()> {
        self.transport
            .delete("/goods", &[("itemId", item_id.to_string())])
            .await?;
        Ok(())
    }

    pub async fn place_bid(&self, item_id: i64, amount: i64) -> BidOutcome {
        let body = json!({ "itemId": item_id, "bidAmount": amount });
        match self.transport.post("/bid", &[], Some(body)).await {
            Ok(payload) => {
                let response: BidResponse = match api::decode(payload) {
                    Ok(r) => r,
                    Err(_) => BidResponse::default(),
                };
                BidOutcome {
                    succeeded: true,
                    current_bid: response.current_bid.or(response.bid_amount).or(Some(amount)),
                    message: None,
                }
            }
            Err(err) => BidOutcome {
                succeeded: false,
                current_bid: None,
                message: Some(bid_error_message(&err)),
            },
        }
    }

    /// Seller-side early termination of a live auction.
    pub async fn stop_auction(&self, item_id: i64) -> ApiResult<()> {
        self.transport
            .put("/bid/stop-auction", &[("itemId", item_id.to_string())], None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use serde_json::json;

    #[test]
    fn first_bid_may_equal_start_price() {
        let check = validate_bid(1000, None, 1000, AuctionStatus::Wait);
        assert!(check.valid);
    }

    #[test]
    fn first_bid_below_start_price_rejected() {
        let check = validate_bid(999, None, 1000, AuctionStatus::Wait);
        assert!(!check.valid);
        assert!(check.message.unwrap().contains("starting price"));
    }

    #[test]
    fn later_bid_must_exceed_current() {
        let check = validate_bid(1500, Some(1500), 1000, AuctionStatus::Proceeding);
        assert!(!check.valid);

        let check = validate_bid(1501, Some(1500), 1000, AuctionStatus::Proceeding);
        assert!(check.valid);
    }

    #[test]
    fn zero_and_negative_amounts_rejected() {
        assert!(!validate_bid(0, None, 1000, AuctionStatus::Wait).valid);
        assert!(!validate_bid(-50, None, 1000, AuctionStatus::Wait).valid);
    }

    #[test]
    fn trade_limit_enforced() {
        let check = validate_bid(
            MAX_BID_AMOUNT + 1,
            Some(MAX_BID_AMOUNT - 1),
            1000,
            AuctionStatus::Proceeding,
        );
        assert!(!check.valid);
        assert!(check.message.unwrap().contains("trade limit"));
    }

    #[tokio::test]
    async fn list_accepts_items_wrapper_and_bare_array() {
        let fake = FakeTransport::new();
        let service = GoodsService::new(fake.clone());

        fake.push_ok(json!({ "items": [{ "itemId": 1 }, { "itemId": 2 }] }));
        let items = service.list(&ListingFilter::default()).await.unwrap();
        assert_eq!(items.len(), 2);

        fake.push_ok(json!([{ "itemId": 3 }]));
        let items = service.list(&ListingFilter::default()).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_id, 3);
    }

    #[tokio::test]
    async fn list_skips_malformed_rows() {
        let fake = FakeTransport::new();
        let service = GoodsService::new(fake.clone());

        fake.push_ok(json!([{ "itemId": 1 }, { "itemId": "not-a-number" }]));
        let items = service.list(&ListingFilter::default()).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn bid_maps_status_codes_to_messages() {
        let fake = FakeTransport::new();
        let service = GoodsService::new(fake.clone());

        fake.push_status(403, None);
        let outcome = service.place_bid(1, 2000).await;
        assert!(!outcome.succeeded);
        assert_eq!(
            outcome.message.as_deref(),
            Some("sellers cannot bid on their own items")
        );

        fake.push_status(400, Some("bid increments of 100 required"));
        let outcome = service.place_bid(1, 2001).await;
        assert_eq!(
            outcome.message.as_deref(),
            Some("bid increments of 100 required")
        );

        fake.push_err(ApiError::Network("connection refused".into()));
        let outcome = service.place_bid(1, 2100).await;
        assert_eq!(
            outcome.message.as_deref(),
            Some("network error, try again shortly")
        );
    }

    #[tokio::test]
    async fn successful_bid_reports_new_current_bid() {
        let fake = FakeTransport::new();
        let service = GoodsService::new(fake.clone());

        fake.push_ok(json!({ "currentBid": 2500 }));
        let outcome = service.place_bid(7, 2500).await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.current_bid, Some(2500));

        let calls = fake.calls();
        assert_eq!(calls[0].path, "/bid");
        assert_eq!(
            calls[0].body,
            Some(json!({ "itemId": 7, "bidAmount": 2500 }))
        );
    }

    #[tokio::test]
    async fn delete_and_stop_hit_the_expected_endpoints() {
        let fake = FakeTransport::new();
        let service = GoodsService::new(fake.clone());

        fake.push_ok(json!(null));
        service.delete(9).await.unwrap();

        fake.push_ok(json!(null));
        service.stop_auction(9).await.unwrap();

        let calls = fake.calls();
        assert_eq!(calls[0].path, "/goods");
        assert_eq!(calls[0].method, reqwest::Method::DELETE);
        assert_eq!(calls[1].path, "/bid/stop-auction");
        assert_eq!(calls[1].method, reqwest::Method::PUT);
        assert_eq!(calls[1].query, vec![("itemId".to_string(), "9".to_string())]);
    }
}
