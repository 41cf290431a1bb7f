pub mod state;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::api::{ApiClient, Transport};
use crate::auth::{AuthStore, CredentialStore};
use crate::config::Config;
use crate::pagination::Pagination;
use crate::poll::NotificationPoller;
use crate::service::goods::{validate_bid, GoodsService, ListingFilter};
use crate::service::{ListingDetail, ListingItem};
use crate::store::{Notification, NotificationStore, PatchTargets, WishStore};

pub use state::{Prompt, StatusMessage, ViewMode};

/// How many listings the featured rail shows.
const FEATURED_COUNT: usize = 5;

const DEBUG_LOG_CAPACITY: usize = 50;

pub struct App {
    // View state
    pub view_mode: ViewMode,
    pub prompt: Option<Prompt>,
    pub status_message: Option<StatusMessage>,

    // Display collections. The wish store patches these in place after a
    // toggle; they are owned here, never by the store.
    pub listings: Vec<ListingItem>,
    pub featured: Vec<ListingItem>,
    pub current_detail: Option<ListingDetail>,

    // Selections
    pub selected_listing: usize,
    pub selected_wish: usize,
    pub selected_notification: usize,
    pub pagination: Pagination,
    pub filter: ListingFilter,

    // Stores and services
    pub goods: GoodsService,
    pub wish: WishStore,
    pub auth: AuthStore,
    pub notifications: NotificationStore,

    // Polling channel feeding the notification store through a channel,
    // drained from the main loop.
    poller: NotificationPoller,
    notification_rx: mpsc::UnboundedReceiver<Vec<Notification>>,

    pub debug_log: VecDeque<String>,
    pub show_debug: bool,

    pub config: Config,
}

impl App {
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;

        let transport: Arc<dyn Transport> = Arc::new(ApiClient::new(
            &config.api.base_url,
            Duration::from_millis(config.api.timeout_ms),
        )?);

        let credentials = CredentialStore::open_default().ok();
        let mut auth = AuthStore::new(transport.clone(), credentials);

        let goods = GoodsService::new(transport.clone());
        let mut wish = WishStore::new(transport.clone());
        let mut notifications = NotificationStore::new(transport.clone());
        let mut poller = NotificationPoller::new(
            transport.clone(),
            Duration::from_millis(config.notifications.poll_interval_ms),
        );

        let mut debug_log = VecDeque::new();
        debug_log.push_back(format!("Connecting to {}", config.api.base_url));

        if auth.check().await {
            if let Some(user) = auth.user() {
                debug_log.push_back(format!("Signed in as {}", user.nickname));
            }
            wish.load().await;
            notifications.load().await;
        } else {
            debug_log.push_back("No active session".to_string());
        }

        let (tx, notification_rx) = mpsc::unbounded_channel();
        poller.start(move |batch| {
            let _ = tx.send(batch);
        });

        let mut app = Self {
            view_mode: ViewMode::Browse,
            prompt: None,
            status_message: None,
            listings: Vec::new(),
            featured: Vec::new(),
            current_detail: None,
            selected_listing: 0,
            selected_wish: 0,
            selected_notification: 0,
            pagination: Pagination::new(config.ui.page_size),
            filter: ListingFilter::default(),
            goods,
            wish,
            auth,
            notifications,
            poller,
            notification_rx,
            debug_log,
            show_debug: false,
            config,
        };

        app.load_listings().await;
        Ok(app)
    }

    pub fn add_debug(&mut self, message: String) {
        self.debug_log.push_back(message);
        while self.debug_log.len() > DEBUG_LOG_CAPACITY {
            self.debug_log.pop_front();
        }
    }

    pub fn set_status(&mut self, message: StatusMessage) {
        self.status_message = Some(message);
    }

    /// Drain batches delivered by the polling channel since the last tick.
    pub fn drain_notifications(&mut self) {
        while let Ok(batch) = self.notification_rx.try_recv() {
            let count = batch.len();
            self.notifications.apply_batch(batch);
            self.add_debug(format!("{count} new notification(s)"));
        }
        let max = self.notifications.entries().len().saturating_sub(1);
        if self.selected_notification > max {
            self.selected_notification = max;
        }
    }

    pub async fn load_listings(&mut self) {
        match self.goods.list(&self.filter).await {
            Ok(items) => {
                // The featured rail is a second display collection holding
                // its own copies of the hottest rows; a wish toggle must
                // patch both.
                let mut by_wishes = items.clone();
                by_wishes.sort_by(|a, b| b.wish_count.cmp(&a.wish_count));
                self.featured = by_wishes.into_iter().take(FEATURED_COUNT).collect();

                self.pagination.set_total_items(items.len());
                self.listings = items;
                if self.selected_listing >= self.listings.len() {
                    self.selected_listing = self.listings.len().saturating_sub(1);
                }
            }
            Err(e) => {
                self.set_status(StatusMessage::error(
                    e.server_message().unwrap_or("failed to load listings"),
                ));
                self.add_debug(format!("listing load failed: {e}"));
            }
        }
    }

    pub async fn open_selected_detail(&mut self) {
        let Some(item) = self.listings.get(self.selected_listing) else {
            return;
        };
        match self.goods.detail(item.item_id).await {
            Ok(detail) => {
                self.current_detail = Some(detail);
                self.view_mode = ViewMode::Detail;
            }
            Err(e) => {
                self.set_status(StatusMessage::error(
                    e.server_message().unwrap_or("failed to load listing"),
                ));
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.current_detail = None;
        self.view_mode = ViewMode::Browse;
    }

    /// Wish-toggle the item under the cursor in the current view.
    ///
    /// The last-known state comes from the record the user is looking at;
    /// in the detail view the store recovers it from the detail record
    /// itself. Every live display collection is handed over for patching.
    pub async fn toggle_wish_under_cursor(&mut self) {
        let (item_id, known_state) = match self.view_mode {
            ViewMode::Browse => match self.listings.get(self.selected_listing) {
                Some(item) => (item.item_id, Some(item.wished)),
                None => return,
            },
            ViewMode::Detail => match &self.current_detail {
                Some(detail) => (detail.item_id, None),
                None => return,
            },
            ViewMode::Wishlist => match self.wish.entries().get(self.selected_wish) {
                Some(entry) => (entry.item_id, Some(true)),
                None => return,
            },
            ViewMode::Notifications => return,
        };

        let outcome = self
            .wish
            .toggle(
                item_id,
                known_state,
                PatchTargets {
                    detail: self.current_detail.as_mut(),
                    primary: Some(&mut self.listings),
                    secondary: vec![&mut self.featured],
                },
            )
            .await;

        if outcome.succeeded {
            let verb = if outcome.wished { "added to" } else { "removed from" };
            self.set_status(StatusMessage::info(format!("{verb} wishlist")));
            let max = self.wish.count().saturating_sub(1);
            if self.selected_wish > max {
                self.selected_wish = max;
            }
        } else if let Some(message) = outcome.message {
            self.set_status(StatusMessage::error(message));
        }
    }

    pub async fn refresh_wishlist(&mut self) {
        let load = self.wish.load().await;
        if load.requires_auth {
            self.set_status(StatusMessage::error(
                load.message.unwrap_or_else(|| "sign in first".to_string()),
            ));
        } else if let Some(message) = load.message {
            self.set_status(StatusMessage::error(message));
        }
        self.selected_wish = 0;
    }

    pub async fn mark_selected_notification_read(&mut self) {
        let id = match self.notifications.entries().get(self.selected_notification) {
            Some(n) if !n.read => n.id,
            _ => return,
        };
        self.notifications.mark_read_synced(id).await;
    }

    pub async fn mark_all_notifications_read(&mut self) {
        self.notifications.mark_all_read_synced().await;
    }

    /// Validate and submit the bid typed into the prompt.
    pub async fn submit_bid(&mut self, input: &str) {
        let Some(detail) = &self.current_detail else {
            return;
        };
        let Ok(amount) = input.trim().replace(',', "").parse::<i64>() else {
            self.set_status(StatusMessage::error("enter a valid amount"));
            return;
        };

        let check = validate_bid(
            amount,
            detail.current_bid,
            detail.start_price,
            detail.auction_status,
        );
        if !check.valid {
            if let Some(message) = check.message {
                self.set_status(StatusMessage::error(message));
            }
            return;
        }

        let item_id = detail.item_id;
        let outcome = self.goods.place_bid(item_id, amount).await;
        if outcome.succeeded {
            // Reflect the new bid locally without a refetch.
            if let Some(detail) = self.current_detail.as_mut() {
                if detail.item_id == item_id {
                    detail.current_bid = outcome.current_bid.or(Some(amount));
                }
            }
            if let Some(row) = self.listings.iter_mut().find(|i| i.item_id == item_id) {
                row.current_bid = outcome.current_bid.or(Some(amount));
            }
            self.set_status(StatusMessage::info("bid placed"));
            self.prompt = None;
        } else if let Some(message) = outcome.message {
            self.set_status(StatusMessage::error(message));
        }
    }

    pub async fn submit_login(&mut self, email: &str, password: &str) {
        let outcome = self.auth.login(email, password).await;
        if outcome.succeeded {
            let nickname = self
                .auth
                .user()
                .map(|u| u.nickname.clone())
                .unwrap_or_default();
            self.set_status(StatusMessage::info(format!("signed in as {nickname}")));
            self.prompt = None;
            self.wish.load().await;
            self.notifications.load().await;
        } else if let Some(message) = outcome.message {
            self.set_status(StatusMessage::error(message));
        }
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.set_status(StatusMessage::info("signed out"));
    }

    /// Shut down background work before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.poller.stop();
    }
}
