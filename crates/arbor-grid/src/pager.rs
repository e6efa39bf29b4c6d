//! Paging over the current view.
//!
//! A [`Pager`] is a thin window calculator layered on
//! [`DataSource::range`](crate::DataSource::range): it holds a page size and
//! a current page number (1-based) and translates them into inclusive view
//! offsets. It keeps no copy of the data, so a page fetched after a filter
//! or sort change reflects the new view.

use crate::record::Record;
use crate::source::{DataSource, RangeSlice};

/// 1-based page window over a data source's current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
}

impl Pager {
    /// Creates a pager. A zero `page_size` is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Records per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page most recently navigated to (1-based).
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Changes the page size. A zero size is raised to 1; the current page
    /// is reset to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Number of pages covering the source's current view.
    ///
    /// Never less than 1: an empty view still has one (empty) page, so
    /// navigation always has a valid target.
    pub fn page_count(&self, source: &DataSource) -> usize {
        source.view().len().div_ceil(self.page_size).max(1)
    }

    /// Navigates to `page`, clamped into `[1, page_count]`, and returns that
    /// page's window of the view.
    pub fn go_to_page(&mut self, page: usize, source: &DataSource) -> RangeSlice {
        let page = page.clamp(1, self.page_count(source));
        self.current_page = page;

        let start = (page - 1) * self.page_size;
        let stop = start + self.page_size - 1;
        source.range(start, stop)
    }

    /// Navigates to the first page.
    pub fn first_page(&mut self, source: &DataSource) -> RangeSlice {
        self.go_to_page(1, source)
    }

    /// Navigates to the last page.
    pub fn last_page(&mut self, source: &DataSource) -> RangeSlice {
        self.go_to_page(self.page_count(source), source)
    }

    /// Advances one page; saturates at the last page.
    pub fn next_page(&mut self, source: &DataSource) -> RangeSlice {
        self.go_to_page(self.current_page + 1, source)
    }

    /// Steps back one page; saturates at the first page.
    pub fn previous_page(&mut self, source: &DataSource) -> RangeSlice {
        self.go_to_page(self.current_page.saturating_sub(1), source)
    }

    /// The records of the current page, flattened to view order.
    ///
    /// Convenience for callers that do not care about grouping; grouped
    /// windows are flattened depth-first.
    pub fn current_records(&mut self, source: &DataSource) -> Vec<Record> {
        match self.go_to_page(self.current_page, source) {
            RangeSlice::Rows(rows) => rows,
            RangeSlice::Groups(nodes) => nodes
                .iter()
                .flat_map(|n| n.leaf_records().into_iter().cloned().collect::<Vec<_>>())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with(count: usize) -> DataSource {
        DataSource::with_data(
            (0..count)
                .map(|n| Record::with_fields([("n", (n as i64).into())]))
                .collect(),
        )
    }

    fn first_int(slice: &RangeSlice) -> i64 {
        slice.as_rows().unwrap()[0]
            .field_or_null("n")
            .as_int()
            .unwrap()
    }

    #[test]
    fn test_page_count_rounds_up() {
        let pager = Pager::new(200);
        assert_eq!(pager.page_count(&source_with(205)), 2);
        assert_eq!(pager.page_count(&source_with(200)), 1);
        assert_eq!(pager.page_count(&source_with(401)), 3);
    }

    #[test]
    fn test_empty_view_has_one_page() {
        let mut pager = Pager::new(10);
        let source = source_with(0);
        assert_eq!(pager.page_count(&source), 1);
        assert!(pager.go_to_page(1, &source).is_empty());
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_pages_cover_view_without_overlap() {
        let source = source_with(205);
        let mut pager = Pager::new(200);

        let page1 = pager.go_to_page(1, &source);
        let page2 = pager.go_to_page(2, &source);
        assert_eq!(page1.len(), 200);
        assert_eq!(page2.len(), 5);
        assert_eq!(first_int(&page1), 0);
        assert_eq!(first_int(&page2), 200);
    }

    #[test]
    fn test_out_of_range_page_clamps() {
        let source = source_with(30);
        let mut pager = Pager::new(10);

        pager.go_to_page(99, &source);
        assert_eq!(pager.current_page(), 3);
        pager.go_to_page(0, &source);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_navigation_saturates() {
        let source = source_with(25);
        let mut pager = Pager::new(10);

        pager.last_page(&source);
        assert_eq!(pager.current_page(), 3);
        pager.next_page(&source);
        assert_eq!(pager.current_page(), 3);

        pager.first_page(&source);
        pager.previous_page(&source);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_zero_page_size_raised_to_one() {
        let pager = Pager::new(0);
        assert_eq!(pager.page_size(), 1);
        assert_eq!(pager.page_count(&source_with(3)), 3);
    }

    #[test]
    fn test_set_page_size_resets_to_first_page() {
        let source = source_with(40);
        let mut pager = Pager::new(10);
        pager.go_to_page(4, &source);

        pager.set_page_size(20);
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.page_count(&source), 2);
    }
}
