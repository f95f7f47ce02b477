//! Page requests and the paginated list envelope.

use data_loader::UserId;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while validating a recommendation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A request for one page of recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub user_id: UserId,
    /// 1-based page number
    pub page_number: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Page number and page size must both be at least 1
    pub fn new(
        user_id: impl Into<UserId>,
        page_number: usize,
        page_size: usize,
    ) -> Result<Self, RequestError> {
        if page_number == 0 {
            return Err(RequestError::InvalidArgument(
                "page number must be at least 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(RequestError::InvalidArgument(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            user_id: user_id.into(),
            page_number,
            page_size,
        })
    }
}

/// One page of a ranked result plus the size of the whole result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_number: usize,
    pub page_size: usize,
}

impl<T> PagedList<T> {
    /// Cut page `page_number` (1-based) out of an already ranked list
    pub fn from_ranked(ranked: Vec<T>, page_number: usize, page_size: usize) -> Self {
        let total_count = ranked.len();
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);
        let items = ranked.into_iter().skip(offset).take(page_size).collect();
        Self {
            items,
            total_count,
            page_number,
            page_size,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.total_pages()
    }
}
