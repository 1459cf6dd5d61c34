use serde::{Deserialize, Serialize};

/// Zero-based page index and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    /// Build from optional query values; no size means no pagination
    pub fn from_params(page: Option<u64>, size: Option<u64>) -> Option<Self> {
        size.map(|size| Self {
            page: page.unwrap_or(0),
            size: size.max(1),
        })
    }

    /// Rows to skip; saturates for page indexes past the end
    pub fn offset(&self) -> usize {
        usize::try_from(self.page.saturating_mul(self.size)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: PageRequest) -> Self {
        Self {
            content,
            total_elements,
            page: request.page,
            size: request.size,
            total_pages: total_elements.div_ceil(request.size),
        }
    }

    /// Whole result set as a single page
    pub fn unpaged(content: Vec<T>) -> Self {
        let total = content.len() as u64;
        Self {
            content,
            total_elements: total,
            page: 0,
            size: total,
            total_pages: 1,
        }
    }

    /// Slice an in-memory result set
    pub fn slice(all: Vec<T>, request: Option<PageRequest>) -> Self {
        match request {
            None => Self::unpaged(all),
            Some(request) => {
                let total = all.len() as u64;
                let content = all
                    .into_iter()
                    .skip(request.offset())
                    .take(request.size as usize)
                    .collect();
                Self::new(content, total, request)
            }
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
        }
    }
}
