//! Sequential result paging over an abstract page fetcher
//!
//! Transport (HTTP, auth, retries) lives behind `PageFetcher`. Pages are
//! requested one at a time because each next offset depends on the totals
//! reported by the previous page.

use super::pager::{
    dimension_count_from_uri, merge_page, next_limit, next_offset, query_values,
    replace_limit_and_offset_in_uri, DEFAULT_LIMIT,
};
use super::result::{ExecutionResult, ResultData, ResultHeaderItem};
use crate::error::{ChartError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Source of result pages addressed by uri (with `limit`/`offset` set)
///
/// `Ok(None)` means the backend answered "no content" (HTTP 204).
pub trait PageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<Option<ExecutionResult>>>;
}

/// Pages through an execution result
pub struct ResultPager<'a, F: PageFetcher> {
    fetcher: &'a F,
    limit: usize,
}

impl<'a, F: PageFetcher> ResultPager<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        ResultPager {
            fetcher,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Override the initial per-dimension page size
    pub fn with_limit(self, limit: usize) -> Self {
        ResultPager {
            limit: limit.max(1),
            ..self
        }
    }

    /// Fetch exactly one page.
    ///
    /// # Arguments
    /// * `uri` - Execution result uri; must carry `dimensions=N`
    /// * `limit` - Page size per dimension
    /// * `offset` - Page start per dimension
    pub async fn get_partial_execution_result(
        &self,
        uri: &str,
        limit: &[usize],
        offset: &[usize],
    ) -> Result<Option<ExecutionResult>> {
        dimension_count_from_uri(uri)?;
        self.fetch_page(uri, limit, offset).await
    }

    /// Fetch all pages and merge them into one result.
    ///
    /// Returns `None` when the first page has no content.
    pub async fn get_execution_result(&self, uri: &str) -> Result<Option<ExecutionResult>> {
        let dimensions = dimension_count_from_uri(uri)?;
        let mut limit = vec![self.limit; dimensions];
        let mut offset = vec![0; dimensions];
        let mut merged: Option<ExecutionResult> = None;

        loop {
            let Some(page) = self.fetch_page(uri, &limit, &offset).await? else {
                return Ok(None);
            };
            if page.paging.total.len() != dimensions {
                return Err(ChartError::InvalidDimensionality(page.paging.total.len()));
            }

            let next = next_offset(&limit, &page.paging.offset, &page.paging.total)?;
            let limit_after = next
                .as_ref()
                .map(|next| next_limit(&limit, next, &page.paging.total))
                .transpose()?;

            merged = Some(match merged {
                Some(previous) => merge_page(previous, &page)?,
                None => page,
            });

            match (next, limit_after) {
                (Some(next), Some(next_limit)) => {
                    offset = next;
                    limit = next_limit;
                }
                _ => break,
            }
        }

        Ok(merged)
    }

    async fn fetch_page(
        &self,
        uri: &str,
        limit: &[usize],
        offset: &[usize],
    ) -> Result<Option<ExecutionResult>> {
        let page_uri = replace_limit_and_offset_in_uri(uri, limit, offset);
        tracing::debug!("Fetching page {}", page_uri);
        let page = self.fetcher.fetch(&page_uri).await?;
        if page.is_none() {
            tracing::debug!("No content at {}", page_uri);
        }
        Ok(page)
    }
}

/// Serves pages cut out of a complete, already computed result
#[derive(Debug, Clone)]
pub struct InMemoryResultSource {
    full: ExecutionResult,
}

impl InMemoryResultSource {
    pub fn new(full: ExecutionResult) -> Self {
        InMemoryResultSource { full }
    }

    fn dimension_total(&self, dimension: usize) -> usize {
        match (&self.full.data, dimension) {
            (ResultData::OneDim(values), 0) => values.len(),
            (ResultData::TwoDim(rows), 0) => rows.len(),
            (ResultData::TwoDim(rows), _) => rows.first().map_or(0, Vec::len),
            (ResultData::OneDim(_), _) => 0,
        }
    }

    /// Slice the page described by `limit`/`offset` out of the full result
    pub fn page(&self, limit: &[usize], offset: &[usize]) -> Result<Option<ExecutionResult>> {
        let dimensions = limit.len();
        let stored = match &self.full.data {
            ResultData::OneDim(_) => 1,
            ResultData::TwoDim(_) => 2,
        };
        if dimensions != offset.len() || dimensions != stored {
            return Err(ChartError::InvalidDimensionality(dimensions));
        }
        let total: Vec<usize> = (0..dimensions).map(|d| self.dimension_total(d)).collect();
        if total.iter().any(|&t| t == 0) {
            return Ok(None);
        }

        let range = |d: usize| {
            let start = offset[d].min(total[d]);
            start..(offset[d] + limit[d]).min(total[d])
        };

        let data = match &self.full.data {
            ResultData::OneDim(values) => ResultData::OneDim(values[range(0)].to_vec()),
            ResultData::TwoDim(rows) => ResultData::TwoDim(
                rows[range(0)]
                    .iter()
                    .map(|row| row[range(1)].to_vec())
                    .collect(),
            ),
        };

        let header_items: Vec<Vec<Vec<ResultHeaderItem>>> = self
            .full
            .header_items
            .iter()
            .enumerate()
            .map(|(d, headers)| {
                let r = if d < dimensions { range(d) } else { 0..0 };
                headers
                    .iter()
                    .map(|items| items[r.start.min(items.len())..r.end.min(items.len())].to_vec())
                    .collect()
            })
            .collect();

        let count = (0..dimensions).map(|d| range(d).len()).collect();
        Ok(Some(ExecutionResult {
            data,
            header_items,
            paging: super::result::Paging {
                count,
                offset: offset.to_vec(),
                total,
            },
        }))
    }
}

impl PageFetcher for InMemoryResultSource {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<Option<ExecutionResult>>> {
        async move {
            let dimensions = dimension_count_from_uri(uri)?;
            let limit = query_values(uri, "limit")?.unwrap_or_else(|| vec![DEFAULT_LIMIT; dimensions]);
            let offset = query_values(uri, "offset")?.unwrap_or_else(|| vec![0; dimensions]);
            self.page(&limit, &offset)
        }
        .boxed()
    }
}
