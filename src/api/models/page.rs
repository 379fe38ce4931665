//! Offset pagination shared by every listing endpoint.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

use super::{EventDto, IncidentDto, ListDto, UserDto};

fn default_page_size() -> usize {
    10
}

/// Paging query parameters. Without `enablePagination` the whole result is returned.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Zero-based page index (default: 0)
    #[serde(default)]
    #[param(default = 0)]
    pub page: usize,
    /// Page size (default: 10)
    #[serde(default = "default_page_size")]
    #[param(default = 10)]
    pub size: usize,
    /// Whether to page the result (default: false)
    #[serde(default)]
    #[param(default = false)]
    pub enable_pagination: bool,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
            enable_pagination: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidPageRequest {
    #[error("Page size must be greater than zero")]
    ZeroSize,
    #[error("Page {page} of size {size} is out of range")]
    OutOfRange { page: usize, size: usize },
}

impl PaginationParams {
    /// The requested window, or `None` when pagination is disabled.
    ///
    /// The window end must fit in an `i64` so it can be bound as a SQL
    /// `LIMIT`/`OFFSET`.
    pub fn page_request(&self) -> Result<Option<PageRequest>, InvalidPageRequest> {
        if !self.enable_pagination {
            return Ok(None);
        }
        if self.size == 0 {
            return Err(InvalidPageRequest::ZeroSize);
        }
        let end = self
            .page
            .checked_add(1)
            .and_then(|pages| pages.checked_mul(self.size))
            .filter(|end| i64::try_from(*end).is_ok());
        if end.is_none() {
            return Err(InvalidPageRequest::OutOfRange {
                page: self.page,
                size: self.size,
            });
        }
        Ok(Some(PageRequest {
            page: self.page,
            size: self.size,
        }))
    }
}

/// A window over an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(
    EventPage = Page<EventDto>,
    UserPage = Page<UserDto>,
    ListPage = Page<ListDto>,
    IncidentPage = Page<IncidentDto>
)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    /// Build a page from already-windowed content and the full result count.
    pub fn new(content: Vec<T>, total_elements: usize, request: Option<PageRequest>) -> Self {
        let (number, size, total_pages) = match request {
            Some(r) => (r.page, r.size, total_elements.div_ceil(r.size)),
            None => (0, total_elements, usize::from(total_elements > 0)),
        };
        let number_of_elements = content.len();
        Self {
            empty: content.is_empty(),
            content,
            number,
            size,
            total_elements,
            total_pages,
            number_of_elements,
            first: number == 0,
            last: number.saturating_add(1) >= total_pages,
        }
    }

    /// Window a complete, ordered result.
    pub fn paginate(items: Vec<T>, request: Option<PageRequest>) -> Self {
        let total = items.len();
        let content = match request {
            Some(r) => items.into_iter().skip(r.offset()).take(r.size).collect(),
            None => items,
        };
        Self::new(content, total, request)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number_of_elements: self.number_of_elements,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }
}
