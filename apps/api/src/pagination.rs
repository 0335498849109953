use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// `LIMIT`/`OFFSET` window handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

/// One window of rows plus the total row count across all windows.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
}

/// Paginated list response: `next` and `previous` are page numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl PageParams {
    pub fn number(&self) -> Result<u32, AppError> {
        match self.page {
            None => Ok(1),
            Some(0) => Err(AppError::NotFound("Invalid page.".to_string())),
            Some(n) => Ok(n),
        }
    }

    pub fn request(&self, page_size: u32) -> Result<PageRequest, AppError> {
        let number = self.number()?;
        Ok(PageRequest {
            limit: i64::from(page_size),
            offset: i64::from(number - 1) * i64::from(page_size),
        })
    }

    /// Wraps a store result; a page past the end (other than page 1) is a 404.
    pub fn into_page<T>(&self, paged: Paged<T>, page_size: u32) -> Result<Page<T>, AppError> {
        let number = self.number()?;
        let size = i64::from(page_size);
        let last = ((paged.total + size - 1) / size).max(1);
        if i64::from(number) > last {
            return Err(AppError::NotFound("Invalid page.".to_string()));
        }
        Ok(Page {
            count: paged.total,
            next: (i64::from(number) < last).then(|| number + 1),
            previous: (number > 1).then(|| number - 1),
            results: paged.items,
        })
    }
}

/// Slices an in-memory collection the way `LIMIT`/`OFFSET` would.
#[cfg(test)]
pub fn slice_page<T: Clone>(all: &[T], page: PageRequest) -> Paged<T> {
    let start = (page.offset.max(0) as usize).min(all.len());
    let end = (start + page.limit.max(0) as usize).min(all.len());
    Paged {
        items: all[start..end].to_vec(),
        total: all.len() as i64,
    }
}
