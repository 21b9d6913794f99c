//! Fixed-interval polling with latest-only delivery.
//!
//! Each fetch runs as its own task and is tagged with a generation number.
//! Fetches may finish in any order; [`LatestOnly`] drops a response whose
//! generation is older than one already published, so a slow stale answer
//! never overwrites a newer one. At most [`MAX_IN_FLIGHT`] fetches run at
//! once; starting another aborts the oldest, whose answer would be stale
//! anyway, so a node that never replies cannot pile up requests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ballot_types::{Address, ProposalId, ResultRow};
use tokio::sync::{watch, Notify};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::handle::ReadHandle;
use crate::queries::{fetch_has_voted, fetch_results};

/// Fetches allowed to run concurrently per poller.
pub const MAX_IN_FLIGHT: usize = 2;

/// Accepts strictly increasing generations only.
#[derive(Debug, Default)]
pub struct LatestOnly {
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a response from `generation` may be published.
    pub fn accept(&self, generation: u64) -> bool {
        let previous = self.accepted.fetch_max(generation, Ordering::SeqCst);
        let fresh = generation > previous;
        if !fresh {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        fresh
    }

    /// Number of stale responses discarded so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A background re-fetch loop. Dropping it cancels the loop and every fetch
/// still in flight.
pub struct Poller<T> {
    rx: watch::Receiver<Option<T>>,
    refresh: Arc<Notify>,
    gate: Arc<LatestOnly>,
    task: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Fetch immediately, then every `interval` and on each [`Poller::refresh`].
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let refresh = Arc::new(Notify::new());
        let gate = Arc::new(LatestOnly::new());
        let task = tokio::spawn(run(
            interval,
            fetch,
            tx,
            Arc::clone(&refresh),
            Arc::clone(&gate),
        ));
        Self {
            rx,
            refresh,
            gate,
            task,
        }
    }

    /// Trigger an extra fetch now, e.g. after the caller submitted a write.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// The most recently published value.
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published value. `None` once the loop has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    pub fn stale_dropped(&self) -> u64 {
        self.gate.dropped()
    }

    pub fn stop(self) {
        // Drop aborts the task.
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T, F, Fut>(
    interval: Duration,
    fetch: F,
    tx: watch::Sender<Option<T>>,
    refresh: Arc<Notify>,
    gate: Arc<LatestOnly>,
) where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let tx = Arc::new(tx);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight = JoinSet::new();
    let mut running: VecDeque<(u64, AbortHandle)> = VecDeque::new();
    let mut generation = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => continue,
        }

        running.retain(|(_, handle)| !handle.is_finished());
        while running.len() >= MAX_IN_FLIGHT {
            if let Some((stale, handle)) = running.pop_front() {
                trace!(generation = stale, "aborting slow poll fetch");
                handle.abort();
            }
        }

        generation += 1;
        let this_generation = generation;
        let fut = fetch();
        let tx = Arc::clone(&tx);
        let gate = Arc::clone(&gate);
        let handle = in_flight.spawn(async move {
            let value = fut.await;
            if gate.accept(this_generation) {
                tx.send_replace(Some(value));
            } else {
                trace!(generation = this_generation, "dropping stale poll response");
            }
        });
        running.push_back((this_generation, handle));
    }
}

/// Poll a proposal's results.
pub fn watch_results(read: ReadHandle, id: ProposalId, interval: Duration) -> Poller<Vec<ResultRow>> {
    Poller::spawn(interval, move || {
        let read = read.clone();
        async move { fetch_results(&read, id).await }
    })
}

/// Poll whether `voter` has voted on a proposal.
pub fn watch_has_voted(
    read: ReadHandle,
    id: ProposalId,
    voter: Address,
    interval: Duration,
) -> Poller<bool> {
    Poller::spawn(interval, move || {
        let read = read.clone();
        let voter = voter.clone();
        async move { fetch_has_voted(&read, id, &voter).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_rejects_older_and_equal_generations() {
        let gate = LatestOnly::new();
        assert!(gate.accept(2));
        assert!(!gate.accept(1));
        assert!(!gate.accept(2));
        assert!(gate.accept(3));
        assert_eq!(gate.dropped(), 2);
    }

    #[tokio::test]
    async fn slow_stale_fetch_never_overwrites_newer_value() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let mut poller = Poller::spawn(Duration::from_secs(3600), move || {
            let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call == 1 {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                call
            }
        });

        // Let the first (slow) fetch start, then ask for a fresh one.
        tokio::time::sleep(Duration::from_millis(20)).await;
        poller.refresh();

        assert_eq!(poller.changed().await, Some(2));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(poller.latest(), Some(2));
        assert_eq!(poller.stale_dropped(), 1);
    }

    /// Counts fetches alive right now; decremented when a fetch is dropped.
    struct Alive(Arc<AtomicU64>);

    impl Drop for Alive {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn hung_fetches_do_not_accumulate() {
        let alive = Arc::new(AtomicU64::new(0));
        let started = Arc::new(AtomicU64::new(0));
        let (alive_in, started_in) = (Arc::clone(&alive), Arc::clone(&started));
        let poller = Poller::spawn(Duration::from_millis(5), move || {
            let alive = Arc::clone(&alive_in);
            started_in.fetch_add(1, Ordering::SeqCst);
            async move {
                alive.fetch_add(1, Ordering::SeqCst);
                let _alive = Alive(alive);
                std::future::pending::<u8>().await
            }
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(started.load(Ordering::SeqCst) > 10, "the loop kept ticking");
        // One aborted fetch may not have been dropped yet.
        let now_alive = alive.load(Ordering::SeqCst);
        assert!(now_alive <= MAX_IN_FLIGHT as u64 + 1, "{now_alive} fetches alive");
        poller.stop();
    }

    #[tokio::test]
    async fn stop_cancels_the_loop() {
        let poller = Poller::spawn(Duration::from_millis(10), || async { 1u8 });
        let mut rx = poller.subscribe();
        poller.stop();
        // The sender is dropped with the task, so the channel closes.
        tokio::time::timeout(Duration::from_secs(1), async {
            while rx.changed().await.is_ok() {}
        })
        .await
        .unwrap();
    }
}
