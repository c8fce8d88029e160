//! Pagination parameters for list operations.

use serde::Deserialize;

const MAX_PAGE_SIZE: u32 = 100;

/// A 1-indexed page request, mapped deterministically to LIMIT/OFFSET.
/// Pages beyond the available range yield empty result sets, not errors.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl Page {
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE) as i64
    }

    pub fn offset(&self) -> i64 {
        let page = self.page.max(1) as i64;
        (page - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        let page = Page {
            page: 1,
            page_size: 10,
        };
        assert_eq!(page.limit(), 10);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn third_page_of_ten_skips_twenty() {
        let page = Page {
            page: 3,
            page_size: 10,
        };
        assert_eq!(page.offset(), 20);
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let page = Page {
            page: 0,
            page_size: 10,
        };
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_size_is_clamped() {
        let page = Page {
            page: 1,
            page_size: 10_000,
        };
        assert_eq!(page.limit(), 100);

        let page = Page {
            page: 2,
            page_size: 0,
        };
        assert_eq!(page.limit(), 1);
        assert_eq!(page.offset(), 1);
    }
}
