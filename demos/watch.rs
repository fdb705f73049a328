//! Watches two components: one healthy, one that drops its connection and
//! reconnects on recovery. Run with:
//!
//! ```text
//! RUST_LOG=recoverable=debug cargo run --example watch
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use recoverable::{Config, HealthState, Recoverable, RecoverableManager};
use tracing_subscriber::EnvFilter;

struct Cache;

#[async_trait]
impl Recoverable for Cache {
    fn id(&self) -> &str {
        "cache"
    }

    async fn status(&self) -> HealthState {
        HealthState::Healthy
    }

    async fn recover(&self) -> bool {
        true
    }
}

/// Fails its first reconnect, succeeds on the second.
struct Upstream {
    connected: AtomicBool,
    attempts: AtomicU32,
}

#[async_trait]
impl Recoverable for Upstream {
    fn id(&self) -> &str {
        "upstream"
    }

    async fn status(&self) -> HealthState {
        if self.connected.load(Ordering::SeqCst) {
            HealthState::Healthy
        } else {
            HealthState::Failed
        }
    }

    async fn recover(&self) -> bool {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let ok = attempt >= 2;
        self.connected.store(ok, Ordering::SeqCst);
        ok
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recoverable=debug")),
        )
        .init();

    let cfg = Config {
        poll_interval: Duration::from_millis(500),
        ..Config::default()
    };
    let manager = RecoverableManager::builder(cfg).with_logging().build();

    let upstream = Arc::new(Upstream {
        connected: AtomicBool::new(true),
        attempts: AtomicU32::new(0),
    });
    manager.register(Arc::new(Cache)).await;
    manager.register(upstream.clone()).await;
    manager.register(Arc::new(Cache)).await;

    manager.start_watching().await;

    tokio::time::sleep(Duration::from_millis(700)).await;
    upstream.connected.store(false, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(2)).await;
    println!("{}", manager.status().await);
    manager.shutdown().await;
}
