//! # Rental Gate
//!
//! Mutual-exclusion discipline for one shared duplex stream. Two access
//! modes exist and they exclude each other:
//!
//! - **Operations**: ordinary sends that may run concurrently with each
//!   other but never overlap an active rental.
//! - **Rental**: sole use of the stream for one request/response exchange;
//!   at most one rental at a time, and only when no operation is in flight.
//!
//! The implementation is two counters behind one mutex with a notifier for
//! wakeups. Waiters re-check both counters after every wakeup, so spurious
//! notifications are harmless, and permits release on drop, so cancellation
//! while waiting (or anywhere else) never leaves a counter incremented.
//! There is no busy-spinning: a blocked acquirer parks on the notifier until
//! a release fires.

use std::sync::Mutex;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct GateState {
    operations: usize,
    rentals: usize,
}

/// Gatekeeper for one shared stream. See the module docs for the two modes.
#[derive(Debug, Default)]
pub struct RentalGate {
    state: Mutex<GateState>,
    released: Notify,
}

impl RentalGate {
    /// Create an open gate: no operations, no rental.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire an operation permit without waiting, if the gate allows it.
    pub fn try_operation(&self) -> Option<OperationPermit<'_>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.rentals == 0 {
            state.operations += 1;
            Some(OperationPermit { gate: self })
        } else {
            None
        }
    }

    /// Acquire an operation permit, waiting until no rental is held.
    pub async fn operation(&self) -> OperationPermit<'_> {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            // Register for the wakeup before the check: a release between
            // the failed check and the await would otherwise be lost.
            released.as_mut().enable();
            if let Some(permit) = self.try_operation() {
                return permit;
            }
            released.await;
        }
    }

    /// Acquire the exclusive rental without waiting, if the stream is idle.
    pub fn try_rent(&self) -> Option<RentalPermit<'_>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.rentals == 0 && state.operations == 0 {
            state.rentals += 1;
            Some(RentalPermit { gate: self })
        } else {
            None
        }
    }

    /// Acquire the exclusive rental, waiting until no operation is in flight
    /// and no other rental is held.
    pub async fn rent(&self) -> RentalPermit<'_> {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();
            if let Some(permit) = self.try_rent() {
                return permit;
            }
            released.await;
        }
    }

    fn release_operation(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            debug_assert!(state.operations > 0);
            state.operations -= 1;
        }
        self.released.notify_waiters();
    }

    fn release_rental(&self) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            debug_assert_eq!(state.rentals, 1);
            state.rentals -= 1;
        }
        self.released.notify_waiters();
    }

    #[cfg(test)]
    fn counters(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.operations, state.rentals)
    }
}

/// Permission to run one concurrent operation. Released on drop.
#[derive(Debug)]
pub struct OperationPermit<'a> {
    gate: &'a RentalGate,
}

impl Drop for OperationPermit<'_> {
    fn drop(&mut self) {
        self.gate.release_operation();
    }
}

/// Sole ownership of the stream for one exchange. Released on drop.
#[derive(Debug)]
pub struct RentalPermit<'a> {
    gate: &'a RentalGate,
}

impl Drop for RentalPermit<'_> {
    fn drop(&mut self) {
        self.gate.release_rental();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn operations_run_concurrently() {
        let gate = RentalGate::new();
        let a = gate.operation().await;
        let b = gate.operation().await;
        assert_eq!(gate.counters(), (2, 0));
        drop(a);
        drop(b);
        assert_eq!(gate.counters(), (0, 0));
    }

    #[tokio::test]
    async fn rental_excludes_operations() {
        let gate = RentalGate::new();
        let rental = gate.rent().await;
        assert!(gate.try_operation().is_none());
        assert!(gate.try_rent().is_none());
        drop(rental);
        assert!(gate.try_operation().is_some());
    }

    #[tokio::test]
    async fn operation_excludes_rental() {
        let gate = RentalGate::new();
        let op = gate.operation().await;
        assert!(gate.try_rent().is_none());
        drop(op);
        assert!(gate.try_rent().is_some());
    }

    #[tokio::test]
    async fn rental_waits_for_operation_to_finish() {
        let gate = Arc::new(RentalGate::new());
        let op = gate.operation().await;

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _rental = gate.rent().await;
            })
        };

        // the rental seeker must still be parked
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(op);
        waiter.await.unwrap();
        assert_eq!(gate.counters(), (0, 0));
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_counters_clean() {
        let gate = Arc::new(RentalGate::new());
        let rental = gate.rent().await;

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _op = gate.operation().await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        waiter.abort();
        let _ = waiter.await;

        drop(rental);
        assert_eq!(gate.counters(), (0, 0));

        // gate still works after the cancellation
        let _op = gate.operation().await;
        assert_eq!(gate.counters(), (1, 0));
    }

    #[tokio::test]
    async fn release_wakes_multiple_operation_waiters() {
        let gate = Arc::new(RentalGate::new());
        let rental = gate.rent().await;

        let mut waiters = Vec::new();
        for _ in 0..8 {
            let gate = gate.clone();
            waiters.push(tokio::spawn(async move {
                let _op = gate.operation().await;
            }));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(rental);

        for waiter in waiters {
            waiter.await.unwrap();
        }
        assert_eq!(gate.counters(), (0, 0));
    }
}
