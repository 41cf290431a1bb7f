//! Fixed-interval pull loop standing in for a server push channel.
//!
//! The loop requests `/notification/stream` once per cycle and hands any
//! non-empty batch to the callback. Every failure (network, non-2xx,
//! malformed body) is swallowed and the loop keeps going at the same
//! cadence. There is no backoff, so a down server gets hit once per
//! interval for as long as the loop runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::Transport;
use crate::store::Notification;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

const STREAM_PATH: &str = "/notification/stream";

/// Owns the poll loop lifecycle. At most one loop is ever active:
/// `start` stops the previous loop before spawning the next, and each
/// spawned loop watches its own stop flag so a stale loop can never
/// reschedule after it has been replaced or stopped.
pub struct NotificationPoller {
    transport: Arc<dyn Transport>,
    interval: Duration,
    stopped: Option<Arc<AtomicBool>>,
    handle: Option<JoinHandle<()>>,
}

impl NotificationPoller {
    pub fn new(transport: Arc<dyn Transport>, interval: Duration) -> Self {
        Self {
            transport,
            interval,
            stopped: None,
            handle: None,
        }
    }

    /// Start polling, replacing any loop already running.
    ///
    /// The first request goes out immediately; each following request is
    /// scheduled one interval after the previous cycle settles, success or
    /// failure, so cycles never overlap.
    pub fn start<F>(&mut self, mut on_batch: F)
    where
        F: FnMut(Vec<Notification>) + Send + 'static,
    {
        self.stop();

        let stopped = Arc::new(AtomicBool::new(false));
        self.stopped = Some(stopped.clone());

        let transport = self.transport.clone();
        let interval = self.interval;
        self.handle = Some(tokio::spawn(async move {
            loop {
                if stopped.load(Ordering::SeqCst) {
                    break;
                }

                match transport.get(STREAM_PATH, &[]).await {
                    Ok(payload) => match serde_json::from_value::<Vec<Notification>>(payload) {
                        Ok(batch) if !batch.is_empty() => on_batch(batch),
                        Ok(_) => {}
                        Err(e) => tracing::debug!("notification stream sent a malformed batch: {e}"),
                    },
                    Err(e) => tracing::debug!("notification poll failed: {e}"),
                }

                // Re-check before rescheduling: a stop during the in-flight
                // request must end the loop here.
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        }));
    }

    /// Cancel the next scheduled request. An in-flight request runs to
    /// completion (its callback may still fire) but will not reschedule.
    pub fn stop(&mut self) {
        if let Some(flag) = self.stopped.take() {
            flag.store(true, Ordering::SeqCst);
        }
        // The task exits on its own once it observes the flag.
        self.handle = None;
    }

    pub fn is_running(&self) -> bool {
        self.stopped.is_some()
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::api::ApiError;
    use serde_json::json;
    use std::sync::Mutex;

    fn collector() -> (Arc<Mutex<Vec<Vec<Notification>>>>, impl FnMut(Vec<Notification>) + Send) {
        let batches: Arc<Mutex<Vec<Vec<Notification>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = batches.clone();
        (batches, move |batch| sink.lock().unwrap().push(batch))
    }

    #[tokio::test(start_paused = true)]
    async fn polls_once_per_interval() {
        let fake = FakeTransport::new();
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);
        poller.start(|_| {});

        // Immediate request at t=0, then one per 1000ms.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        poller.stop();

        assert_eq!(fake.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_leaves_one_active_loop() {
        let fake = FakeTransport::new();
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);
        poller.start(|_| {});
        poller.start(|_| {});

        tokio::time::sleep(Duration::from_millis(3500)).await;
        poller.stop();

        // One loop's worth of requests, not two.
        assert_eq!(fake.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_requests() {
        let fake = FakeTransport::new();
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);
        poller.start(|_| {});

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let before = fake.call_count();
        assert_eq!(before, 3);

        poller.stop();
        assert!(!poller.is_running());

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(fake.call_count(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_batches_do_not_invoke_callback() {
        let fake = FakeTransport::new();
        let (batches, sink) = collector();
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);

        // Cycle 1: empty. Cycle 2: one entry. Later cycles fall back to
        // the fake's empty default.
        fake.push_ok(json!([]));
        fake.push_ok(json!([{ "id": 1, "type": "BID_UPDATE", "message": "outbid" }]));

        poller.start(sink);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        poller.stop();

        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_swallowed_and_polling_continues() {
        let fake = FakeTransport::new();
        let (batches, sink) = collector();
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);

        fake.push_err(ApiError::Network("connection refused".into()));
        fake.push_status(500, None);
        fake.push_ok(json!({ "not": "an array" }));
        fake.push_ok(json!([{ "id": 7, "type": "TRADE_SUCCESS", "message": "sold" }]));

        poller.start(sink);
        tokio::time::sleep(Duration::from_millis(4500)).await;
        poller.stop();

        // All five cycles ran despite three failures in a row.
        assert_eq!(fake.call_count(), 5);
        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].id, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn next_cycle_is_scheduled_from_settlement_not_start() {
        let fake = FakeTransport::new();
        fake.set_delay(Duration::from_millis(700));
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);
        poller.start(|_| {});

        // Requests settle 700ms after they start, so the cadence is
        // 1700ms: starts at t=0, 1700, 3400, not 0, 1000, 2000, 3000.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        poller.stop();

        assert_eq!(fake.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_works() {
        let fake = FakeTransport::new();
        let mut poller = NotificationPoller::new(fake.clone(), DEFAULT_POLL_INTERVAL);

        poller.start(|_| {});
        tokio::time::sleep(Duration::from_millis(1500)).await;
        poller.stop();
        let after_first_run = fake.call_count();
        assert_eq!(after_first_run, 2);

        poller.start(|_| {});
        assert!(poller.is_running());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        poller.stop();

        assert_eq!(fake.call_count(), after_first_run + 2);
    }
}
