//! Single-flight execution
//!
//! [`SingleFlight::run`] executes an operation at most once at a time. The
//! first caller becomes the leader and drives the operation; callers arriving
//! while it is in flight become followers and receive a clone of the leader's
//! outcome. Once the outcome is published the slot is empty again, so the next
//! caller starts a fresh flight.
//!
//! The slot is guarded by a synchronous mutex that is never held across an
//! `.await`: deciding leader vs follower and claiming the slot is one critical
//! section. If the leader's future is dropped before finishing, the slot is
//! released and followers observe [`Abandoned`] instead of waiting forever.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use tokio::sync::watch;

/// The leader was dropped before publishing an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

impl fmt::Display for Abandoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("in-flight operation was abandoned")
    }
}

impl std::error::Error for Abandoned {}

/// How a caller took part in a flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Ran the operation
    Leader,
    /// Received the leader's outcome
    Follower,
}

type Slot<T> = Arc<Mutex<Option<watch::Receiver<Option<T>>>>>;

/// Shared slot that lets at most one operation run at a time; clones share it
pub struct SingleFlight<T> {
    slot: Slot<T>,
}

impl<T> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.is_in_flight())
            .finish()
    }
}

enum Ticket<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

/// Empties the slot when the leader finishes or is dropped
struct ReleaseOnDrop<'a, T> {
    slot: &'a Slot<T>,
}

impl<T> Drop for ReleaseOnDrop<'_, T> {
    fn drop(&mut self) {
        self.slot.lock().take();
    }
}

impl<T> SingleFlight<T> {
    /// An idle slot
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a leader is running
    pub fn is_in_flight(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync,
{
    /// Run `op`, or join the flight already running
    pub async fn run<F, Fut>(&self, op: F) -> Result<T, Abandoned>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.run_with_role(op).await.map(|(value, _)| value)
    }

    /// Like [`run`](Self::run), also reporting whether this caller led
    pub async fn run_with_role<F, Fut>(&self, op: F) -> Result<(T, Role), Abandoned>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(receiver) => Ticket::Follower(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    *slot = Some(receiver);
                    Ticket::Leader(sender)
                }
            }
        };

        match ticket {
            Ticket::Leader(sender) => {
                debug!("[SingleFlight] leading new flight");
                let release = ReleaseOnDrop { slot: &self.slot };
                let value = op().await;
                // Later callers must start a new flight rather than join this one
                drop(release);
                sender.send_replace(Some(value.clone()));
                Ok((value, Role::Leader))
            }
            Ticket::Follower(mut receiver) => {
                debug!("[SingleFlight] joining flight in progress");
                let published = receiver
                    .wait_for(Option::is_some)
                    .await
                    .map_err(|_| Abandoned)?;
                let value = (*published).clone().ok_or(Abandoned)?;
                Ok((value, Role::Follower))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn concurrent_callers_share_one_execution() {
        let flight = SingleFlight::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = flight.clone();
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                flight
                    .run_with_role(|| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        42
                    })
                    .await
            }));
        }

        // Let every task reach the flight before releasing the leader
        while !flight.is_in_flight() {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.notify_waiters();

        let mut leaders = 0;
        for handle in handles {
            let (value, role) = handle.await.unwrap().unwrap();
            assert_eq!(value, 42);
            if role == Role::Leader {
                leaders += 1;
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(leaders, 1);
        assert!(!flight.is_in_flight());
    }

    #[test]
    fn debug_output_needs_no_bounds_on_value() {
        let flight = SingleFlight::<std::cell::Cell<u8>>::new();
        assert_eq!(format!("{flight:?}"), "SingleFlight { in_flight: false }");
    }

    #[tokio::test]
    async fn sequential_calls_start_fresh_flights() {
        let flight = SingleFlight::<usize>::new();
        let calls = AtomicUsize::new(0);

        for expected in 1..=3 {
            let value = flight
                .run(|| async { calls.fetch_add(1, Ordering::SeqCst) + 1 })
                .await
                .unwrap();
            assert_eq!(value, expected);
        }
    }

    #[tokio::test]
    async fn dropped_leader_releases_followers() {
        let flight = SingleFlight::<u32>::new();

        let leader = {
            let flight = flight.clone();
            tokio::spawn(async move {
                flight
                    .run(|| std::future::pending::<u32>())
                    .await
            })
        };
        while !flight.is_in_flight() {
            tokio::task::yield_now().await;
        }

        let follower = {
            let flight = flight.clone();
            tokio::spawn(async move { flight.run(|| async { 7 }).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        leader.abort();
        assert_eq!(follower.await.unwrap(), Err(Abandoned));
        assert!(!flight.is_in_flight());

        // The slot is usable again
        assert_eq!(flight.run(|| async { 9 }).await, Ok(9));
    }
}
