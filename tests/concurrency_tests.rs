//! Concurrent access to a shared cached enforcer

mod common;

use common::{basic_enforcer, strs};
use decision_cache::CachedEnforcer;
use futures::future::join_all;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_identical_requests() {
    let cached = Arc::new(CachedEnforcer::new(basic_enforcer()));

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let cached = cached.clone();
            tokio::spawn(async move {
                cached
                    .enforce(&strs(&["alice", "data1", "read"]))
                    .await
                    .unwrap()
            })
        })
        .collect();

    for result in join_all(handles).await {
        assert!(result.unwrap());
    }

    // Concurrent misses may each reach the engine, but only one entry exists
    assert_eq!(cached.cached_entries().await.unwrap(), 1);
    let calls = cached.enforcer().calls();
    assert!(calls >= 1 && calls <= 64);

    let stats = cached.stats();
    assert_eq!(stats.hits + stats.misses, 64);
    assert_eq!(stats.misses as usize, calls);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_distinct_requests_no_lost_updates() {
    let cached = Arc::new(CachedEnforcer::new(basic_enforcer()));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let cached = cached.clone();
            tokio::spawn(async move {
                for j in 0..10 {
                    let subject = format!("user_{}_{}", i, j);
                    let allowed = cached
                        .enforce(&strs(&[subject.as_str(), "data1", "read"]))
                        .await
                        .unwrap();
                    assert!(!allowed);
                }
            })
        })
        .collect();

    for result in join_all(handles).await {
        result.unwrap();
    }

    assert_eq!(cached.cached_entries().await.unwrap(), 100);
    assert_eq!(cached.enforcer().calls(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_enforce_while_toggling_and_invalidating() {
    let cached = Arc::new(CachedEnforcer::new(basic_enforcer()));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let cached = cached.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let allowed = cached
                        .enforce(&strs(&["alice", "data1", "read"]))
                        .await
                        .unwrap();
                    assert!(allowed);
                    let denied = cached
                        .enforce(&strs(&["bob", "data1", "read"]))
                        .await
                        .unwrap();
                    assert!(!denied);
                }
            })
        })
        .collect();

    let mutator = {
        let cached = cached.clone();
        tokio::spawn(async move {
            for i in 0..50 {
                cached.enable_cache(i % 3 != 0);
                if i % 5 == 0 {
                    cached.invalidate_cache().await.unwrap();
                }
                if i % 7 == 0 {
                    cached.load_policy().await.unwrap();
                }
                tokio::task::yield_now().await;
            }
            cached.enable_cache(true);
        })
    };

    for result in join_all(readers).await {
        result.unwrap();
    }
    mutator.await.unwrap();

    assert!(cached.cached_entries().await.unwrap() <= 2);
    assert_eq!(cached.stats().total_requests(), 800);
}
