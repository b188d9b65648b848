use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::{Mutex, Notify};
use tokio::time::Duration;
use tracing::{info, warn};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ShutdownCoordinator {
    notify: Arc<Notify>,
    shutting_down: AtomicBool,
    inner: Mutex<Option<ShutdownInner>>,
}

struct ShutdownInner {
    db_pool: Option<postgres_models::connection::Pool>,
}

impl ShutdownCoordinator {
    /// `db_pool` is drained on shutdown; pass `None` for the in-memory
    /// backend.
    pub fn new(db_pool: Option<postgres_models::connection::Pool>) -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            shutting_down: AtomicBool::new(false),
            inner: Mutex::new(Some(ShutdownInner { db_pool })),
        }
    }

    pub async fn wait_for_shutdown(&self) {
        let notified = self.notify.notified();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Relaxed)
    }

    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Relaxed);
        info!("Initiating graceful shutdown sequence");

        let inner = match self.inner.lock().await.take() {
            Some(inner) => inner,
            None => {
                warn!("Shutdown already called");
                return;
            }
        };

        self.notify.notify_waiters();

        if let Some(pool) = inner.db_pool {
            match tokio::time::timeout(
                SHUTDOWN_TIMEOUT,
                postgres_models::connection::shutdown_pool_with_timeout(
                    pool.into(),
                    SHUTDOWN_TIMEOUT,
                ),
            )
            .await
            {
                Ok(()) => info!("Database pool shutdown completed"),
                Err(_) => warn!("Database pool shutdown timed out"),
            }
        }

        info!("Graceful shutdown sequence complete");
    }
}

pub async fn listen_for_shutdown_signals() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_flips_flag_and_wakes_waiters() {
        let coordinator = Arc::new(ShutdownCoordinator::new(None));
        assert!(!coordinator.is_shutting_down());

        let waiter = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.wait_for_shutdown().await }
        });
        tokio::task::yield_now().await;

        coordinator.shutdown().await;
        assert!(coordinator.is_shutting_down());

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_after_shutdown() {
        let coordinator = ShutdownCoordinator::new(None);
        coordinator.shutdown().await;
        coordinator.shutdown().await;

        tokio::time::timeout(
            Duration::from_secs(1),
            coordinator.wait_for_shutdown(),
        )
        .await
        .expect("already shut down");
    }
}
