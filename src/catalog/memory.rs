//! Fixed in-process catalog, paged like the remote one

use std::cell::Cell;

use super::{Catalog, CatalogQuery, PAGE_SIZE};
use crate::error::CatalogError;
use crate::exercises::ExerciseCandidate;

pub struct InMemoryCatalog {
    exercises: Vec<ExerciseCandidate>,
    page_size: usize,
    queries: Cell<usize>,
}

impl InMemoryCatalog {
    pub fn new(exercises: Vec<ExerciseCandidate>) -> Self {
        Self {
            exercises,
            page_size: PAGE_SIZE,
            queries: Cell::new(0),
        }
    }

    /// Load a JSON array in the remote catalog's format
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Number of page requests served so far
    pub fn queries(&self) -> usize {
        self.queries.get()
    }
}

impl Catalog for InMemoryCatalog {
    async fn query(
        &self,
        query: &CatalogQuery,
        offset: usize,
    ) -> Result<Vec<ExerciseCandidate>, CatalogError> {
        self.queries.set(self.queries.get() + 1);
        Ok(self
            .exercises
            .iter()
            .filter(|e| query.matches(e))
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect())
    }
}
