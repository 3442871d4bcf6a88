//! Read-through cache over spot listings
//!
//! Entries are keyed by filter and dropped wholesale by every spot
//! mutation; there is no TTL. A fill only lands if no invalidation ran
//! while its read was in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::domain::{DomainResult, RepositoryProvider, Spot, SpotClass, SpotStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SpotFilter {
    pub class: Option<SpotClass>,
    /// `None` means AVAILABLE
    pub status: Option<SpotStatus>,
}

impl SpotFilter {
    pub fn available() -> Self {
        Self::default()
    }

    pub fn class(class: SpotClass) -> Self {
        Self {
            class: Some(class),
            status: None,
        }
    }

    pub fn with_status(mut self, status: SpotStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn matches(&self, spot: &Spot) -> bool {
        spot.status == self.status.unwrap_or(SpotStatus::Available)
            && self.class.map_or(true, |c| spot.class == c)
    }
}

pub struct AvailabilityCache {
    repos: Arc<dyn RepositoryProvider>,
    entries: DashMap<SpotFilter, Arc<Vec<Spot>>>,
    generation: AtomicU64,
}

impl AvailabilityCache {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn available_spots(&self, filter: SpotFilter) -> DomainResult<Arc<Vec<Spot>>> {
        if let Some(hit) = self.entries.get(&filter) {
            debug!(?filter, "Availability cache hit");
            return Ok(hit.clone());
        }

        let generation = self.generation.load(Ordering::Acquire);
        let spots: Vec<Spot> = self
            .repos
            .spots()
            .find_all()
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        let spots = Arc::new(spots);
        match self.entries.entry(filter) {
            // The generation is re-read under the shard lock that
            // `invalidate` must also take to clear this key.
            Entry::Vacant(slot) if self.generation.load(Ordering::Acquire) == generation => {
                slot.insert(spots.clone());
                debug!(?filter, count = spots.len(), "Availability cache filled");
            }
            _ => debug!(?filter, "Listing changed during read; not cached"),
        }
        Ok(spots)
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
