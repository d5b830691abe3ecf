//! Offset/limit page arithmetic.

/// Position of a list within its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

impl Pagination {
    pub fn new(offset: u64, limit: u64, total: u64) -> Self {
        Self {
            offset,
            limit: limit.max(1),
            total,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }

    /// Offset of the next page, if there is one.
    pub fn next_offset(&self) -> Option<u64> {
        self.has_next().then(|| self.offset.saturating_add(self.limit))
    }

    /// Offset of the previous page, if there is one.
    pub fn previous_offset(&self) -> Option<u64> {
        self.has_previous()
            .then(|| self.offset.saturating_sub(self.limit))
    }

    /// 1-based page number.
    pub fn current_page(&self) -> u64 {
        self.offset / self.limit + 1
    }

    /// Number of pages, never less than one.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit).max(1)
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page(), self.total_pages())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_many() {
        let p = Pagination::new(0, 6, 7);
        assert!(!p.has_previous());
        assert!(p.has_next());
        assert_eq!(p.next_offset(), Some(6));
        assert_eq!(p.label(), "Page 1 of 2");
    }

    #[test]
    fn test_last_page_disables_next() {
        let p = Pagination::new(6, 6, 7);
        assert!(p.has_previous());
        assert!(!p.has_next());
        assert_eq!(p.previous_offset(), Some(0));
        assert_eq!(p.label(), "Page 2 of 2");
    }

    #[test]
    fn test_exact_multiple_has_no_extra_page() {
        let p = Pagination::new(10, 10, 20);
        assert!(!p.has_next());
        assert_eq!(p.total_pages(), 2);
    }

    #[test]
    fn test_empty_result_is_one_page() {
        let p = Pagination::new(0, 10, 0);
        assert!(!p.has_next());
        assert!(!p.has_previous());
        assert_eq!(p.label(), "Page 1 of 1");
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let p = Pagination::new(3, 0, 5);
        assert_eq!(p.limit, 1);
        assert_eq!(p.current_page(), 4);
    }

    #[test]
    fn test_offset_near_max_does_not_overflow() {
        let p = Pagination::new(u64::MAX - 3, 10, u64::MAX);
        assert!(!p.has_next());
        assert_eq!(p.next_offset(), None);
        assert!(p.has_previous());
    }
}
