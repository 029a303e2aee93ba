mod pool;
mod source;

pub use pool::spawn_pool_refresher;
pub use source::{
    ConfiguredSponsoredSource, SponsoredSource, UnavailableSponsoredSource, select_source,
};

use serde::{Deserialize, Serialize};

use crate::profile::Language;

pub const PLACEHOLDER_PROVIDER: &str = "Sponsored";

/// Opaque display record. Only `id` matters to the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsoredItem {
    pub id: String,
    pub headline: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub call_to_action: String,
    pub advertiser_name: String,
}

/// Stand-in pool used when a load fails or comes back empty.
pub fn placeholder_pool(count: usize, language: Language) -> Vec<SponsoredItem> {
    let headline = match language {
        Language::Ko => "테스트 광고",
        _ => "Test Ad",
    };

    (0..count)
        .map(|index| SponsoredItem {
            id: format!("placeholder-ad-{}", index),
            headline: headline.to_owned(),
            body: String::new(),
            image_ref: None,
            call_to_action: String::new(),
            advertiser_name: PLACEHOLDER_PROVIDER.to_owned(),
        })
        .collect()
}

/// `items`, or a localized placeholder pool of `count` when nothing loaded.
pub fn or_placeholders(items: Vec<SponsoredItem>, count: usize, language: Language) -> Vec<SponsoredItem> {
    if items.is_empty() {
        placeholder_pool(count, language)
    } else {
        items
    }
}

/// Whether every item in a non-empty pool is a placeholder.
pub fn is_placeholder_pool(items: &[SponsoredItem]) -> bool {
    !items.is_empty() && items.iter().all(|item| item.advertiser_name == PLACEHOLDER_PROVIDER)
}
