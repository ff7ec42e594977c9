use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// Page size used when neither the caller nor the configuration supplies one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    /// Build pagination parameters from raw caller input.
    ///
    /// Values arrive as signed integers because the host UI may hand over
    /// zero or negative numbers; both are programming errors and are rejected
    /// rather than defaulted.
    pub fn try_new(page: i64, page_size: i64) -> DomainResult<Self> {
        if page_size <= 0 {
            return Err(DomainError::invalid_argument(format!(
                "page_size must be a positive integer, got {}",
                page_size
            )));
        }
        if page <= 0 {
            return Err(DomainError::invalid_argument(format!(
                "page must be a positive integer, got {}",
                page
            )));
        }
        let page = u32::try_from(page)
            .map_err(|_| DomainError::invalid_argument(format!("page {} is too large", page)))?;
        let page_size = u32::try_from(page_size).map_err(|_| {
            DomainError::invalid_argument(format!("page_size {} is too large", page_size))
        })?;
        Ok(Self { page, page_size })
    }

    /// Index of the first item on the requested page
    pub fn offset(&self) -> usize {
        (self.page as usize).saturating_sub(1).saturating_mul(self.page_size as usize)
    }

    /// Number of pages needed for `total` items; zero when there are none
    pub fn total_pages(&self, total: usize) -> u64 {
        let size = self.page_size as u64;
        if size == 0 {
            return 0;
        }
        (total as u64 + size - 1) / size
    }
}

/// One page of an ordered result set plus the counts needed to render
/// "X of Y" summaries and pagination controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Items left after filtering, before slicing
    pub total_matching: u64,
    /// Size of the unfiltered input
    pub total_all: u64,
    /// Page the caller asked for, echoed unchanged
    pub page: u32,
    /// Requested page clamped to `[1, max(1, total_pages)]`
    pub effective_page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T: Clone> PaginatedResult<T> {
    /// Slice an already filtered and ordered sequence.
    ///
    /// A page past the end yields an empty `items` list; `page` still reports
    /// the caller's value so stale pagination state can be detected through
    /// `effective_page`.
    pub fn from_ordered(ordered: &[&T], total_all: usize, params: PaginationParams) -> Self {
        let total_matching = ordered.len();
        let total_pages = params.total_pages(total_matching);

        let start = params.offset();
        let items = if start >= total_matching {
            Vec::new()
        } else {
            let end = start
                .saturating_add(params.page_size as usize)
                .min(total_matching);
            ordered[start..end].iter().map(|item| (*item).clone()).collect()
        };

        let effective_page = (params.page as u64).min(total_pages.max(1)) as u32;

        Self {
            items,
            total_matching: total_matching as u64,
            total_all: total_all as u64,
            page: params.page,
            effective_page,
            page_size: params.page_size,
            total_pages,
        }
    }
}

impl<T> PaginatedResult<T> {
    /// True when the requested page lies outside the available pages
    pub fn is_page_out_of_range(&self) -> bool {
        self.page != self.effective_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_non_positive_values() {
        assert!(matches!(
            PaginationParams::try_new(1, 0),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            PaginationParams::try_new(1, -5),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(matches!(
            PaginationParams::try_new(0, 20),
            Err(DomainError::InvalidArgument(_))
        ));
        assert_eq!(
            PaginationParams::try_new(3, 10).unwrap(),
            PaginationParams { page: 3, page_size: 10 }
        );
    }

    #[test]
    fn test_total_pages() {
        let params = PaginationParams { page: 1, page_size: 20 };
        assert_eq!(params.total_pages(0), 0);
        assert_eq!(params.total_pages(1), 1);
        assert_eq!(params.total_pages(20), 1);
        assert_eq!(params.total_pages(21), 2);
    }

    #[test]
    fn test_last_partial_page() {
        let values: Vec<u32> = (1..=5).collect();
        let refs: Vec<&u32> = values.iter().collect();
        let result = PaginatedResult::from_ordered(&refs, 9, PaginationParams { page: 3, page_size: 2 });
        assert_eq!(result.items, vec![5]);
        assert_eq!(result.total_matching, 5);
        assert_eq!(result.total_all, 9);
        assert_eq!(result.total_pages, 3);
        assert!(!result.is_page_out_of_range());
    }

    #[test]
    fn test_out_of_range_page_is_empty_and_reports_clamped_page() {
        let values: Vec<u32> = (1..=5).collect();
        let refs: Vec<&u32> = values.iter().collect();
        let result = PaginatedResult::from_ordered(&refs, 5, PaginationParams { page: 7, page_size: 2 });
        assert!(result.items.is_empty());
        assert_eq!(result.page, 7);
        assert_eq!(result.effective_page, 3);
        assert_eq!(result.total_matching, 5);
        assert!(result.is_page_out_of_range());
    }

    #[test]
    fn test_empty_input_has_zero_pages() {
        let refs: Vec<&u32> = Vec::new();
        let result = PaginatedResult::from_ordered(&refs, 0, PaginationParams::default());
        assert!(result.items.is_empty());
        assert_eq!(result.total_pages, 0);
        assert_eq!(result.effective_page, 1);
        assert!(!result.is_page_out_of_range());
    }
}
