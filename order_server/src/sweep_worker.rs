use chrono::Duration;
use log::*;
use order_engine::{events::EventProducers, LifecycleApi, SqliteOrderStore};
use tokio::task::JoinHandle;

/// Starts the auto-approval sweep worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
pub fn start_sweep_worker(db: SqliteOrderStore, producers: EventProducers, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = interval.to_std().unwrap_or_else(|_| std::time::Duration::from_secs(3600));
        let mut timer = tokio::time::interval(period);
        let api = LifecycleApi::new(db, producers);
        info!("🕰️ Auto-approval sweep worker started");
        loop {
            timer.tick().await;
            info!("🕰️ Running auto-approval sweep");
            match api.sweep_overdue_approvals().await {
                Ok(result) => {
                    info!("🕰️ {} orders auto-completed", result.count());
                    debug!("🕰️ Auto-completed order ids: {:?}", result.processed);
                },
                Err(e) => {
                    error!("🕰️ Error running auto-approval sweep: {e}");
                },
            }
        }
    })
}
