use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{model::MY_LOCATION_LABEL, storage::KeyValueStore};

/// Storage key holding the serialized list.
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Distinct display labels, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Build from stored entries, dropping anything that breaks the list invariants.
    pub fn from_entries<I: IntoIterator<Item = String>>(entries: I) -> Self {
        let mut list = Self::default();
        for entry in entries {
            if list.0.len() == MAX_RECENT_SEARCHES {
                break;
            }
            if is_recordable(&entry) && !list.0.contains(&entry) {
                list.0.push(entry);
            }
        }
        list
    }

    /// Move `label` to the front, trimming to capacity.
    ///
    /// Returns `false` if the label is not eligible (blank or the device label).
    pub fn record(&mut self, label: &str) -> bool {
        if !is_recordable(label) {
            return false;
        }

        self.0.retain(|existing| existing != label);
        self.0.insert(0, label.to_string());
        self.0.truncate(MAX_RECENT_SEARCHES);
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read the list from storage. Any failure yields an empty list.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("Failed to load history: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load(store: &dyn KeyValueStore) -> Result<Self> {
        let Some(saved) = store.get_item(RECENT_SEARCHES_KEY)? else {
            return Ok(Self::default());
        };

        let entries: Vec<String> =
            serde_json::from_str(&saved).context("Failed to parse saved recent searches")?;

        Ok(Self::from_entries(entries))
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(&self.0).context("Failed to serialize recent searches")?;
        store.set_item(RECENT_SEARCHES_KEY, &json)
    }
}

fn is_recordable(label: &str) -> bool {
    !label.trim().is_empty() && label != MY_LOCATION_LABEL
}
