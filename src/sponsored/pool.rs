use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task};
use tokio_util::sync::CancellationToken;

use super::{SponsoredItem, SponsoredSource};

/// Loads `pool_size` items after `initial_delay`, then every `refresh_period`,
/// publishing each completed result. A failed load publishes an empty pool.
pub fn spawn_pool_refresher(
    source: Arc<dyn SponsoredSource>,
    pool_size: usize,
    initial_delay: Duration,
    refresh_period: Duration,
    cancellation_token: CancellationToken,
) -> watch::Receiver<Vec<SponsoredItem>> {
    let (pool_tx, pool_rx) = watch::channel(Vec::new());

    task::spawn(async move {
        let mut delay = initial_delay;

        loop {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    log::info!("Sponsored pool refresher shutting down");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    let pool = load_pool(source.as_ref(), pool_size).await;
                    if pool_tx.send(pool).is_err() {
                        log::debug!("Sponsored pool receiver dropped, stopping refresher");
                        break;
                    }
                    delay = refresh_period;
                }
            }
        }
    });

    pool_rx
}

async fn load_pool(source: &dyn SponsoredSource, pool_size: usize) -> Vec<SponsoredItem> {
    match source.load_sponsored_items(pool_size).await {
        Ok(items) => {
            log::info!("Sponsored pool refreshed. [item_count = {}]", items.len());
            items
        }
        Err(error) => {
            log::warn!("Failed to load sponsored items. [error = {:#}]", error);
            Vec::new()
        }
    }
}
