use serde::Serialize;
use utoipa::ToSchema;

/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 5)]
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// `page` is 1-based and assumed already clamped to >= 1.
    pub fn new(page: u64, per_page: u64, total: i64) -> Self {
        let total_rows = total.max(0) as u64;
        let total_pages = if per_page == 0 {
            0
        } else {
            total_rows.div_ceil(per_page)
        };

        PageMeta {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_set() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn partial_last_page_counts_as_a_page() {
        let meta = PageMeta::new(1, 10, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next);
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let meta = PageMeta::new(2, 10, 25);
        assert!(meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.offset(), 10);
    }

    #[test]
    fn last_page_has_no_next() {
        let meta = PageMeta::new(3, 10, 25);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }
}
