//! Client-side pagination over an already-loaded list.

/// Pager strip width in page numbers.
const PAGE_WINDOW: usize = 5;

/// Cursor over a list rendered one page at a time. The current page is
/// 1-based and always stays within `1..=total_pages`, including after the
/// underlying list shrinks.
#[derive(Debug, Clone)]
pub struct Pagination {
    page_size: usize,
    current_page: usize,
    total_items: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            total_items: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// Index range of the current page, for slicing the backing list.
    pub fn page_bounds(&self) -> (usize, usize) {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_items);
        (start.min(self.total_items), end)
    }

    /// Record a new list length, clamping the current page back into range.
    pub fn set_total_items(&mut self, total: usize) {
        self.total_items = total;
        if self.current_page > self.total_pages() {
            self.current_page = self.total_pages();
        }
    }

    /// Jump to a page; out-of-range requests are ignored.
    pub fn go_to(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
        }
    }

    pub fn next(&mut self) {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Up to five page numbers around the current page, shifted inward at
    /// either end, for rendering a pager strip.
    pub fn page_window(&self) -> Vec<usize> {
        let total = self.total_pages();
        let start = self
            .current_page
            .saturating_sub(PAGE_WINDOW / 2)
            .max(1)
            .min(total.saturating_sub(PAGE_WINDOW - 1).max(1));
        let end = (start + PAGE_WINDOW - 1).min(total);
        (start..=end).collect()
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self) {
        self.current_page = self.total_pages();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_one_page() {
        let mut p = Pagination::new(5);
        p.set_total_items(0);
        assert_eq!(p.total_pages(), 1);
        assert_eq!(p.page_bounds(), (0, 0));
    }

    #[test]
    fn bounds_cover_partial_last_page() {
        let mut p = Pagination::new(5);
        p.set_total_items(12);
        assert_eq!(p.total_pages(), 3);

        p.last();
        assert_eq!(p.current_page(), 3);
        assert_eq!(p.page_bounds(), (10, 12));
    }

    #[test]
    fn out_of_range_jump_ignored() {
        let mut p = Pagination::new(5);
        p.set_total_items(12);
        p.go_to(7);
        assert_eq!(p.current_page(), 1);
        p.go_to(0);
        assert_eq!(p.current_page(), 1);
        p.go_to(2);
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn shrinking_list_clamps_current_page() {
        let mut p = Pagination::new(5);
        p.set_total_items(20);
        p.last();
        assert_eq!(p.current_page(), 4);

        p.set_total_items(6);
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn next_prev_stop_at_edges() {
        let mut p = Pagination::new(5);
        p.set_total_items(8);

        p.prev();
        assert_eq!(p.current_page(), 1);
        p.next();
        assert_eq!(p.current_page(), 2);
        p.next();
        assert_eq!(p.current_page(), 2);
    }

    #[test]
    fn window_centers_on_current_page() {
        let mut p = Pagination::new(5);
        p.set_total_items(50); // 10 pages

        assert_eq!(p.page_window(), vec![1, 2, 3, 4, 5]);

        p.go_to(6);
        assert_eq!(p.page_window(), vec![4, 5, 6, 7, 8]);

        p.last();
        assert_eq!(p.page_window(), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn window_shrinks_with_few_pages() {
        let mut p = Pagination::new(5);
        p.set_total_items(12); // 3 pages
        assert_eq!(p.page_window(), vec![1, 2, 3]);

        p.set_total_items(0);
        assert_eq!(p.page_window(), vec![1]);
    }
}
