//! Background refresh loop.
//!
//! The loop alternates between two states: idle (waiting out the interval)
//! and polling (running one round). The next wait starts only once the
//! previous round has fully completed, so at most one round is ever in
//! flight and a slow round simply pushes the schedule back.

use crate::feed::fetcher::FeedFetcher;
use crate::feed::poller::Poller;
use crate::util::catch_task_panic;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

enum RefreshMessage {
    /// Skip the rest of the current wait and poll immediately.
    PollNow,
}

/// Handle to a running refresh loop.
///
/// Dropping the handle also stops the loop.
pub struct RefreshHandle {
    shutdown_tx: watch::Sender<bool>,
    command_tx: mpsc::Sender<RefreshMessage>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Requests an immediate round. Requests arriving while a round is in
    /// flight are folded into that round.
    pub fn poll_now(&self) {
        if self.command_tx.try_send(RefreshMessage::PollNow).is_err() {
            tracing::debug!("Poll request already pending");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits for it to exit. A round in flight is
    /// abandoned before its merge step, so no partial merge is applied.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Refresh loop ended abnormally");
        }
    }
}

/// Spawns the refresh loop on the current tokio runtime.
///
/// The first round starts one `interval` after spawning.
pub fn spawn_refresh_loop<F: FeedFetcher>(poller: Poller<F>, interval: Duration) -> RefreshHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let (command_tx, mut command_rx) = mpsc::channel(1);

    let task = tokio::spawn(async move {
        tracing::info!(interval_ms = interval.as_millis() as u64, "Refresh loop started");
        let mut round: u64 = 0;

        loop {
            // Idle
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                cmd = command_rx.recv() => match cmd {
                    Some(RefreshMessage::PollNow) => tracing::debug!("Immediate poll requested"),
                    None => break,
                },
                _ = shutdown_rx.changed() => break,
            }

            // Polling
            round += 1;
            tokio::select! {
                result = catch_task_panic(poller.poll_round()) => {
                    if let Err(panic_msg) = result {
                        tracing::error!(round, error = %panic_msg, "Refresh round panicked");
                    }
                }
                _ = shutdown_rx.changed() => break,
            }

            // Requests made during the round were satisfied by it
            while command_rx.try_recv().is_ok() {}
        }

        tracing::info!(rounds = round, "Refresh loop stopped");
    });

    RefreshHandle {
        shutdown_tx,
        command_tx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::testing::{rss, Scripted, ScriptedFetcher};
    use crate::state::{SharedStore, Store};
    use std::sync::Arc;

    const FEED1: &str = "https://example.com/feed1";
    const INTERVAL: Duration = Duration::from_secs(5);

    async fn poller_with_feed(fetcher: Arc<ScriptedFetcher>) -> Poller<ScriptedFetcher> {
        fetcher.set(FEED1, Scripted::Body(rss("A", &["P1"])));
        let poller = Poller::new(SharedStore::new(Store::new()), fetcher, &Config::default());
        poller.add_feed(FEED1).await.unwrap();
        poller
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_follow_interval() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let poller = poller_with_feed(Arc::clone(&fetcher)).await;
        assert_eq!(fetcher.calls(), 1); // add_feed

        let handle = spawn_refresh_loop(poller, INTERVAL);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(fetcher.calls(), 1);

        tokio::time::sleep(Duration::from_millis(7_000)).await;
        assert_eq!(fetcher.calls(), 3); // rounds at 5s and 10s

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_round_waits_for_slow_round() {
        let fetch_time = Duration::from_secs(8);
        let fetcher = Arc::new(ScriptedFetcher::with_delay(fetch_time));
        let poller = poller_with_feed(Arc::clone(&fetcher)).await;

        let handle = spawn_refresh_loop(poller, INTERVAL);
        tokio::time::sleep(Duration::from_secs(60)).await;
        handle.shutdown().await;

        let starts = fetcher.starts();
        // Skip the add_feed call; rounds never overlap
        let rounds = &starts[1..];
        assert!(rounds.len() >= 2);
        for pair in rounds.windows(2) {
            assert!(pair[1] - pair[0] >= INTERVAL + fetch_time);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_rounds() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let poller = poller_with_feed(Arc::clone(&fetcher)).await;

        let handle = spawn_refresh_loop(poller, INTERVAL);
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        handle.shutdown().await;
        let calls = fetcher.calls();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_round_is_prompt() {
        let fetcher = Arc::new(ScriptedFetcher::with_delay(Duration::from_secs(3)));
        let poller = poller_with_feed(Arc::clone(&fetcher)).await;
        let store = poller.store().clone();
        fetcher.set(FEED1, Scripted::Body(rss("A", &["P1", "P2"])));

        let handle = spawn_refresh_loop(poller, INTERVAL);
        // Round starts at 5s and would merge at 8s
        tokio::time::sleep(Duration::from_secs(6)).await;
        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        store.read(|state| assert_eq!(state.posts().len(), 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_now_skips_wait() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let poller = poller_with_feed(Arc::clone(&fetcher)).await;

        let handle = spawn_refresh_loop(poller, Duration::from_secs(60));
        handle.poll_now();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.calls(), 2);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_loop() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let poller = poller_with_feed(Arc::clone(&fetcher)).await;

        drop(spawn_refresh_loop(poller, INTERVAL));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(fetcher.calls(), 1);
    }
}
