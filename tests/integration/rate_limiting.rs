//! Integration tests for request pacing

use gitget::downloader::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_sequential_acquires_are_spaced() {
    let interval = Duration::from_millis(1000);
    let limiter = RateLimiter::new(interval);
    let n = 6u32;

    let started = Instant::now();
    for _ in 0..n {
        limiter.acquire().await;
    }
    let elapsed = started.elapsed();

    assert!(elapsed >= interval * (n - 1));
    assert!(elapsed < interval * (n - 1) + Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_get_distinct_slots() {
    let interval = Duration::from_millis(500);
    let limiter = Arc::new(RateLimiter::new(interval));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move {
                limiter.acquire().await;
                Instant::now()
            })
        })
        .collect();

    let mut starts = Vec::new();
    for handle in handles {
        starts.push(handle.await.unwrap());
    }
    starts.sort();

    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= interval, "requests started too close together");
    }
}

#[tokio::test(start_paused = true)]
async fn test_shared_limiter_paces_across_handles() {
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(1)));
    let other = limiter.clone();

    assert_eq!(limiter.acquire().await, Duration::ZERO);
    assert_eq!(other.acquire().await, Duration::from_secs(1));
}
