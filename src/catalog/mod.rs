//! Exercise catalog access - filters, backends and the paged fetcher

pub mod http;
pub mod memory;

pub use http::{HttpCatalog, HttpCatalogConfig};
pub use memory::InMemoryCatalog;

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::exercises::{BODY_ONLY, ExerciseCandidate};
use crate::profile::Proficiency;

/// Results per catalog page
pub const PAGE_SIZE: usize = 10;

/// Default bound on a single page request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a query is narrowed to: one muscle group or one workout type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Muscle(String),
    Type(String),
}

/// Catalog filter built from the user's profile and today's rotation slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub equipment: Option<String>,
    pub difficulty: Option<Proficiency>,
    pub target: Target,
}

impl CatalogQuery {
    /// Users without gym access only get body-weight exercises
    pub fn for_user(gym_access: bool, proficiency: Option<Proficiency>, target: Target) -> Self {
        Self {
            equipment: (!gym_access).then(|| BODY_ONLY.to_string()),
            difficulty: proficiency,
            target,
        }
    }

    pub fn matches(&self, candidate: &ExerciseCandidate) -> bool {
        if let Some(equipment) = &self.equipment
            && candidate.equipment != *equipment
        {
            return false;
        }
        if let Some(difficulty) = self.difficulty
            && candidate.difficulty != difficulty.as_str()
        {
            return false;
        }
        match &self.target {
            Target::Muscle(muscle) => candidate.muscle == *muscle,
            Target::Type(kind) => candidate.kind == *kind,
        }
    }
}

/// Source of exercise candidates, queried one page at a time
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Page starting at `offset`; an empty page means the data is exhausted
    async fn query(
        &self,
        query: &CatalogQuery,
        offset: usize,
    ) -> Result<Vec<ExerciseCandidate>, CatalogError>;
}

/// Best-effort paged retrieval over a [`Catalog`]
pub struct CatalogFetcher<C> {
    catalog: C,
    page_size: usize,
    timeout: Duration,
}

impl<C: Catalog> CatalogFetcher<C> {
    pub fn new(catalog: C, timeout: Duration) -> Self {
        Self {
            catalog,
            page_size: PAGE_SIZE,
            timeout,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Collect distinct candidates until `requested_count * page_size` are
    /// gathered or the catalog runs dry.
    ///
    /// A failed or timed out page ends the fetch; whatever was gathered so far
    /// is returned.
    pub async fn fetch(&self, query: &CatalogQuery, requested_count: usize) -> Vec<ExerciseCandidate> {
        let threshold = requested_count.saturating_mul(self.page_size);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut page = 0;

        while candidates.len() < threshold {
            let offset = page * self.page_size;
            page += 1;

            let result = match tokio::time::timeout(self.timeout, self.catalog.query(query, offset)).await {
                Ok(result) => result,
                Err(_) => Err(CatalogError::Timeout),
            };

            let batch = match result {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("Catalog fetch failed for {:?} at offset {}: {}", query.target, offset, e);
                    break;
                }
            };
            if batch.is_empty() {
                break;
            }

            let before = candidates.len();
            for candidate in batch {
                if seen.insert(candidate.name.clone()) {
                    candidates.push(candidate);
                }
            }
            // a page of repeats means the catalog ignores the offset
            if candidates.len() == before {
                break;
            }
        }

        debug!(
            "Fetched {} candidates for {:?} in {} pages",
            candidates.len(),
            query.target,
            page
        );
        candidates
    }
}
