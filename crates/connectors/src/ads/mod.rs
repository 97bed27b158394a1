//! ADS connector for pulling publication citation counts
//!
//! One lookup per publication: search the bibliographic API for the record
//! and read its current citation count. The response is a single document
//! in the common case, but the search endpoint is shaped as a paginated
//! result set (`numFound`/`start`/`docs`), so the lookup is driven through
//! the paginator with a numeric-offset cursor.

use serde::Deserialize;
use tracing::{debug, warn};

use tally_model::{CitationSnapshot, PubId};

use crate::clock::{Clock, SystemClock};
use crate::config::AdsConnectorConfig;
use crate::error::ConnectorError;
use crate::http::{build_client, classify_status, rate_limit_from_headers};
use crate::pagination::{Cursor, Page, PageFetcher, Paginator, PaginatorConfig};
use crate::traits::CitationSource;

/// ADS citation connector
pub struct Ads<C: Clock = SystemClock> {
    token: String,
    api_url: String,
    client: reqwest::Client,
    paginator: PaginatorConfig,
    page_size: u32,
    clock: C,
}

impl Ads {
    /// Create a connector with the given configuration and bearer token
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails
    pub fn new(
        config: &AdsConnectorConfig,
        token: impl Into<String>,
    ) -> Result<Self, ConnectorError> {
        Self::with_clock(config, token, SystemClock)
    }
}

impl<C: Clock> Ads<C> {
    /// Create a connector with an explicit clock (tests)
    pub fn with_clock(
        config: &AdsConnectorConfig,
        token: impl Into<String>,
        clock: C,
    ) -> Result<Self, ConnectorError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self {
            token: token.into(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            paginator: config.paginator_config(),
            page_size: config.page_size,
            clock,
        })
    }
}

impl<C: Clock> CitationSource for Ads<C> {
    async fn fetch_citations(
        &self,
        publication: &PubId,
    ) -> Result<CitationSnapshot, ConnectorError> {
        if publication.as_str().trim().is_empty() {
            return Err(ConnectorError::InvalidEntity("empty bibcode".into()));
        }

        let pager = SearchPager {
            ads: self,
            publication,
        };
        let mut paginator = Paginator::with_clock(pager, self.paginator.clone(), &self.clock);
        let docs = paginator.collect_all().await?;

        if docs.len() > 1 {
            warn!(
                publication = %publication,
                matches = docs.len(),
                "bibcode matched more than one record, using the first"
            );
        }
        let count = docs
            .iter()
            .find_map(|d| d.citation_count)
            .ok_or_else(|| ConnectorError::NotFound(publication.to_string()))?;

        let snapshot = CitationSnapshot::new(self.clock.now().date_naive(), count);
        debug!(publication = %publication, count, "fetched citation count");
        Ok(snapshot)
    }
}

struct SearchPager<'a, C: Clock> {
    ads: &'a Ads<C>,
    publication: &'a PubId,
}

impl<C: Clock> PageFetcher for SearchPager<'_, C> {
    type Item = AdsDoc;

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<AdsDoc>, ConnectorError> {
        let start: u64 = match cursor {
            Some(c) => c.as_str().parse().map_err(|_| {
                ConnectorError::InvalidEntity(format!("bad offset cursor '{}'", c))
            })?,
            None => 0,
        };

        let response = self
            .ads
            .client
            .get(format!("{}/search/query", self.ads.api_url))
            .bearer_auth(&self.ads.token)
            .query(&[
                ("q", format!("identifier:\"{}\"", self.publication)),
                ("fl", "bibcode,citation_count".to_string()),
                ("rows", self.ads.page_size.to_string()),
                ("start", start.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_status(response, self.publication.as_str()));
        }

        let rate_limit = rate_limit_from_headers(response.headers());
        let body: SearchResponse = response.json().await?;
        let result = body.response;

        Ok(Page {
            next_cursor: next_offset(start, result.docs.len(), result.num_found),
            items: result.docs,
            rate_limit,
        })
    }
}

/// Continuation offset, or `None` once all matching documents are consumed
fn next_offset(start: u64, page_len: usize, num_found: u64) -> Option<Cursor> {
    if page_len == 0 {
        return None;
    }
    let consumed = start + page_len as u64;
    if consumed < num_found {
        Some(Cursor::new(consumed.to_string()))
    } else {
        None
    }
}

// --- API response types ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    response: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "numFound")]
    num_found: u64,
    #[serde(default)]
    docs: Vec<AdsDoc>,
}

/// One matching bibliographic record
#[derive(Debug, Deserialize)]
struct AdsDoc {
    #[allow(dead_code)]
    bibcode: Option<String>,
    citation_count: Option<u64>,
}
