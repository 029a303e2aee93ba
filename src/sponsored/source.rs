use std::sync::Arc;

use async_trait::async_trait;

use super::SponsoredItem;
use crate::appsettings::SponsoredSettings;

#[async_trait]
pub trait SponsoredSource: Send + Sync {
    async fn load_sponsored_items(&self, count: usize) -> anyhow::Result<Vec<SponsoredItem>>;
}

/// Serves the items listed in settings, cycling through them to fill `count`.
pub struct ConfiguredSponsoredSource {
    items: Vec<SponsoredItem>,
}

impl ConfiguredSponsoredSource {
    pub fn new(items: Vec<SponsoredItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl SponsoredSource for ConfiguredSponsoredSource {
    async fn load_sponsored_items(&self, count: usize) -> anyhow::Result<Vec<SponsoredItem>> {
        Ok(self.items.iter().cycle().take(count).cloned().collect())
    }
}

/// No sponsored capability on this host. Always yields an empty pool.
pub struct UnavailableSponsoredSource;

#[async_trait]
impl SponsoredSource for UnavailableSponsoredSource {
    async fn load_sponsored_items(&self, _count: usize) -> anyhow::Result<Vec<SponsoredItem>> {
        Ok(Vec::new())
    }
}

pub fn select_source(settings: &SponsoredSettings) -> Arc<dyn SponsoredSource> {
    if settings.enabled && !settings.items.is_empty() {
        log::info!(
            "Using configured sponsored items. [item_count = {}]",
            settings.items.len()
        );
        Arc::new(ConfiguredSponsoredSource::new(settings.items.clone()))
    } else {
        log::info!("Sponsored items unavailable on this host");
        Arc::new(UnavailableSponsoredSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> SponsoredItem {
        SponsoredItem {
            id: id.to_owned(),
            headline: id.to_uppercase(),
            body: String::new(),
            image_ref: None,
            call_to_action: "Open".to_owned(),
            advertiser_name: "Advertiser".to_owned(),
        }
    }

    fn settings(enabled: bool, items: Vec<SponsoredItem>) -> SponsoredSettings {
        SponsoredSettings {
            enabled,
            pool_size: 4,
            refresh_secs: 60,
            initial_delay_ms: 0,
            items,
        }
    }

    #[tokio::test]
    async fn configured_source_cycles_to_requested_count() {
        let source = ConfiguredSponsoredSource::new(vec![item("a"), item("b")]);

        let loaded = source.load_sponsored_items(5).await.unwrap();

        let ids = loaded.iter().map(|i| i.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "a", "b", "a"]);
    }

    #[tokio::test]
    async fn selection_falls_back_to_unavailable() {
        let disabled = select_source(&settings(false, vec![item("a")]));
        let empty = select_source(&settings(true, Vec::new()));
        let configured = select_source(&settings(true, vec![item("a")]));

        assert!(disabled.load_sponsored_items(3).await.unwrap().is_empty());
        assert!(empty.load_sponsored_items(3).await.unwrap().is_empty());
        assert_eq!(configured.load_sponsored_items(3).await.unwrap().len(), 3);
    }
}
