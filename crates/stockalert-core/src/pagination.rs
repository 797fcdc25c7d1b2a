//! Lazy traversal of `GET /alerts`.
//!
//! Pages are fetched on demand with `limit`/`offset`. The offset advances by
//! the number of items each page actually returned, and traversal stops on
//! the first short or empty page, on `has_more: false`, or once
//! `page >= totalPages`.

use std::collections::VecDeque;

use crate::domain::{Alert, ListAlertsParams};
use crate::error::Result;
use crate::resources::Alerts;

/// Largest page the API serves.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Async cursor over every alert matching a filter.
///
/// After an error is yielded the pager is exhausted; call
/// [`Alerts::iterate`] again to start over from offset 0.
pub struct AlertPager {
    alerts: Alerts,
    filter: ListAlertsParams,
    page_size: u32,
    offset: u64,
    buffer: VecDeque<Alert>,
    pages_fetched: u32,
    finished: bool,
}

impl AlertPager {
    pub(crate) fn new(alerts: Alerts, params: ListAlertsParams) -> Self {
        let page_size = params.limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let filter = ListAlertsParams {
            limit: None,
            offset: None,
            ..params
        };

        Self {
            alerts,
            filter,
            page_size,
            offset: 0,
            buffer: VecDeque::new(),
            pages_fetched: 0,
            finished: false,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Next alert, fetching another page when the current one is drained.
    pub async fn next(&mut self) -> Option<Result<Alert>> {
        loop {
            if let Some(alert) = self.buffer.pop_front() {
                return Some(Ok(alert));
            }
            if self.finished {
                return None;
            }
            if let Err(error) = self.fetch_page().await {
                self.finished = true;
                return Some(Err(error));
            }
        }
    }

    /// Drains the pager, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();
        while let Some(alert) = self.next().await {
            alerts.push(alert?);
        }
        Ok(alerts)
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let params = self
            .filter
            .clone()
            .limit(self.page_size)
            .offset(self.offset);

        let page = self.alerts.list(&params).await?;
        self.pages_fetched += 1;
        self.finished = page.is_last(self.page_size as usize);
        self.offset += page.len() as u64;

        tracing::debug!(
            offset = self.offset,
            items = page.len(),
            last = self.finished,
            "fetched alert page"
        );

        self.buffer.extend(page.items);
        Ok(())
    }
}
