//! HTTP client for the API Ninjas exercise catalog

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::{Catalog, CatalogQuery, DEFAULT_TIMEOUT, Target};
use crate::error::CatalogError;
use crate::exercises::ExerciseCandidate;

/// Catalog endpoint configuration
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for HttpCatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.api-ninjas.com/v1/exercises".to_owned(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct HttpCatalog {
    config: HttpCatalogConfig,
    client: Client,
}

impl HttpCatalog {
    pub fn new(config: HttpCatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

/// Query string pairs for one page
fn query_params(query: &CatalogQuery, offset: usize) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(equipment) = &query.equipment {
        params.push(("equipment", equipment.clone()));
    }
    if let Some(difficulty) = query.difficulty {
        params.push(("difficulty", difficulty.as_str().to_string()));
    }
    match &query.target {
        Target::Muscle(muscle) => params.push(("muscle", muscle.clone())),
        Target::Type(kind) => params.push(("type", kind.clone())),
    }
    params.push(("offset", offset.to_string()));
    params
}

impl Catalog for HttpCatalog {
    async fn query(
        &self,
        query: &CatalogQuery,
        offset: usize,
    ) -> Result<Vec<ExerciseCandidate>, CatalogError> {
        let params = query_params(query, offset);
        debug!("GET {} {:?}", self.config.base_url, params);

        let response = self
            .client
            .get(&self.config.base_url)
            .header("X-Api-Key", &self.config.api_key)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
