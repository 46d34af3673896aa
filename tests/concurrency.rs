//! Concurrency tests for the shared-stream rental discipline.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chat_protocol::transport::RentalGate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn operations_and_rentals_never_overlap_under_load() {
    let gate = Arc::new(RentalGate::new());
    let operations_active = Arc::new(AtomicUsize::new(0));
    let rentals_active = Arc::new(AtomicUsize::new(0));

    let mut tasks = JoinSet::new();

    for _ in 0..64 {
        let gate = gate.clone();
        let operations_active = operations_active.clone();
        let rentals_active = rentals_active.clone();
        tasks.spawn(async move {
            for _ in 0..200 {
                let _permit = gate.operation().await;
                operations_active.fetch_add(1, Ordering::SeqCst);
                assert_eq!(rentals_active.load(Ordering::SeqCst), 0);
                tokio::task::yield_now().await;
                assert_eq!(rentals_active.load(Ordering::SeqCst), 0);
                operations_active.fetch_sub(1, Ordering::SeqCst);
            }
        });
    }

    for _ in 0..8 {
        let gate = gate.clone();
        let operations_active = operations_active.clone();
        let rentals_active = rentals_active.clone();
        tasks.spawn(async move {
            for _ in 0..50 {
                let _rental = gate.rent().await;
                rentals_active.fetch_add(1, Ordering::SeqCst);
                assert_eq!(operations_active.load(Ordering::SeqCst), 0);
                tokio::task::yield_now().await;
                assert_eq!(operations_active.load(Ordering::SeqCst), 0);
                assert_eq!(rentals_active.load(Ordering::SeqCst), 1);
                rentals_active.fetch_sub(1, Ordering::SeqCst);
            }
        });
    }

    // every operation and every rental seeker completes: no deadlock, no
    // starvation with a finite workload
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rental_seeker_eventually_granted_against_operation_stream() {
    let gate = Arc::new(RentalGate::new());

    let mut operations = JoinSet::new();
    for _ in 0..32 {
        let gate = gate.clone();
        operations.spawn(async move {
            let _permit = gate.operation().await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        });
    }

    let rental_gate = gate.clone();
    let rental = tokio::spawn(async move {
        let _rental = rental_gate.rent().await;
    });

    tokio::time::timeout(Duration::from_secs(5), rental)
        .await
        .expect("rental seeker starved")
        .unwrap();

    while let Some(result) = operations.join_next().await {
        result.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_seekers_do_not_wedge_the_gate() {
    let gate = Arc::new(RentalGate::new());
    let rental = gate.rent().await;

    // park a crowd of seekers, then cancel half of them
    let mut seekers = Vec::new();
    for _ in 0..16 {
        let gate = gate.clone();
        seekers.push(tokio::spawn(async move {
            let _permit = gate.operation().await;
        }));
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
    for seeker in seekers.iter().step_by(2) {
        seeker.abort();
    }

    drop(rental);

    for seeker in seekers {
        // aborted seekers report cancellation; survivors complete
        let _ = seeker.await;
    }

    // the gate is balanced again: the rental can be taken immediately
    assert!(gate.try_rent().is_some());
}
