//! Fixed-size, clamped paging over an ordered list.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PaginationError {
    #[error("page size must be > 0")]
    ZeroPageSize,
}

/// Read-only pager. Navigation clamps at both ends and never wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator<T> {
    items: Vec<T>,
    page_index: usize,
    page_size: usize,
}

impl<T> Paginator<T> {
    /// # Errors
    ///
    /// Returns `PaginationError::ZeroPageSize` if `page_size` is zero.
    pub fn new(items: Vec<T>, page_size: usize) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            items,
            page_index: 0,
            page_size,
        })
    }

    /// `ceil(len / page_size)`; zero for an empty list.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Offset of the first item on the current page.
    #[must_use]
    pub fn page_start(&self) -> usize {
        (self.page_index * self.page_size).min(self.items.len())
    }

    /// Items `[i*P, min((i+1)*P, len))` of the current page.
    #[must_use]
    pub fn page(&self) -> &[T] {
        let start = self.page_start();
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages()
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    /// Move forward one page. Returns `false` (and does nothing) on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page. Returns `false` (and does nothing) on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.has_prev() {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn splits_into_ceil_pages() {
        let mut pager = Paginator::new(numbered(23), 10).unwrap();
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.page(), &numbered(10)[..]);

        assert!(pager.next_page());
        assert!(pager.next_page());
        assert_eq!(pager.page_index(), 2);
        assert_eq!(pager.page(), &[20, 21, 22]);
        assert_eq!(pager.page_start(), 20);

        assert!(!pager.next_page());
        assert_eq!(pager.page_index(), 2);
        assert_eq!(pager.page().len(), 3);
    }

    #[test]
    fn prev_is_clamped_at_zero() {
        let mut pager = Paginator::new(numbered(5), 2).unwrap();
        assert!(!pager.prev_page());
        assert_eq!(pager.page_index(), 0);
        assert!(!pager.has_prev());
        assert!(pager.has_next());
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let pager = Paginator::new(numbered(20), 10).unwrap();
        assert_eq!(pager.total_pages(), 2);
    }

    #[test]
    fn empty_list_has_no_pages() {
        let mut pager = Paginator::new(Vec::<u8>::new(), 10).unwrap();
        assert_eq!(pager.total_pages(), 0);
        assert!(pager.page().is_empty());
        assert!(!pager.next_page());
        assert!(!pager.prev_page());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            Paginator::new(numbered(3), 0).unwrap_err(),
            PaginationError::ZeroPageSize
        );
    }
}
