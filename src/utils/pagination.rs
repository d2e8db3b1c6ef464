/// Offset pagination resolved from optional query parameters.
/// Page numbers are 1-based; out-of-range input is clamped rather than
/// rejected so stale links still resolve to something sensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: i64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: Option<u64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        Pagination { page, limit }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit as u64
    }

    /// Ceiling of total / limit; zero rows means zero pages.
    pub fn total_pages(&self, total: u64) -> u64 {
        let limit = self.limit as u64;
        (total + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_params_missing() {
        let p = Pagination::new(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, Pagination::DEFAULT_LIMIT);
        assert_eq!(p.skip(), 0);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 1 });
        assert_eq!(
            Pagination::new(Some(3), Some(1000)),
            Pagination { page: 3, limit: Pagination::MAX_LIMIT }
        );
    }

    #[test]
    fn test_skip_offsets_by_whole_pages() {
        assert_eq!(Pagination::new(Some(1), Some(10)).skip(), 0);
        assert_eq!(Pagination::new(Some(2), Some(10)).skip(), 10);
        assert_eq!(Pagination::new(Some(5), Some(25)).skip(), 100);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(Some(1), Some(5));
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(5), 1);
        assert_eq!(p.total_pages(6), 2);
        assert_eq!(p.total_pages(10), 2);
        assert_eq!(p.total_pages(11), 3);
    }
}
