//! Fixed-size page slicing over an already-ordered sequence.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
  Some(n) => n,
  None => unreachable!(),
};

// ─── Page number ─────────────────────────────────────────────────────────────

/// A 1-based page number as requested by a client.
///
/// Requests never fail on a bad page number: anything absent, non-numeric or
/// below 1 becomes page 1, and [`paginate`] clamps numbers past the end to the
/// last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageNumber(u32);

impl PageNumber {
  pub const FIRST: Self = Self(1);

  pub fn new(n: i64) -> Self {
    if n < 1 {
      return Self::FIRST;
    }
    Self(u32::try_from(n).unwrap_or(u32::MAX))
  }

  /// Parse the raw `?page=` value of a request.
  pub fn parse(raw: Option<&str>) -> Self {
    raw
      .and_then(|s| s.trim().parse::<i64>().ok())
      .map(Self::new)
      .unwrap_or(Self::FIRST)
  }

  pub fn get(self) -> u32 { self.0 }
}

impl Default for PageNumber {
  fn default() -> Self { Self::FIRST }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// A bounded slice of a feed plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  /// The page actually served, after clamping.
  pub number:      u32,
  pub has_next:    bool,
  pub has_prev:    bool,
  pub total_items: usize,
  /// Never 0: an empty sequence still has one (empty) page.
  pub total_pages: u32,
}

impl<T> Page<T> {
  /// The single page of an empty feed.
  pub fn empty() -> Self {
    Self {
      items:       Vec::new(),
      number:      1,
      has_next:    false,
      has_prev:    false,
      total_items: 0,
      total_pages: 1,
    }
  }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

/// Where a requested page falls in a feed of known length.
///
/// Page numbers past the end are clamped to the last page, and an empty feed
/// still has one (empty) page. Stores use `offset` and `limit` to fetch only
/// the rows of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  pub number:      u32,
  pub total_pages: u32,
  pub total_items: usize,
  pub offset:      usize,
  pub limit:       usize,
}

impl PageWindow {
  pub fn locate(total_items: usize, page_size: NonZeroUsize, page: PageNumber) -> Self {
    let size = page_size.get();
    let total_pages = total_items.div_ceil(size).max(1);
    let number = (page.get() as usize).clamp(1, total_pages);

    Self {
      number: number as u32,
      total_pages: total_pages as u32,
      total_items,
      offset: (number - 1) * size,
      limit: size,
    }
  }

  /// Wrap the items fetched for this window into a [`Page`].
  pub fn fill<T>(self, items: Vec<T>) -> Page<T> {
    Page {
      items,
      number: self.number,
      has_next: self.number < self.total_pages,
      has_prev: self.number > 1,
      total_items: self.total_items,
      total_pages: self.total_pages,
    }
  }
}

/// Slice `items` into pages of `page_size` and return the requested one.
///
/// `items` must already be in the feed's canonical order.
pub fn paginate<T>(
  items: Vec<T>,
  page_size: NonZeroUsize,
  page: PageNumber,
) -> Page<T> {
  let window = PageWindow::locate(items.len(), page_size, page);
  let items = items
    .into_iter()
    .skip(window.offset)
    .take(window.limit)
    .collect();
  window.fill(items)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn size(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

  #[test]
  fn first_page_of_eleven() {
    let page = paginate((0..11).collect::<Vec<i32>>(), size(10), PageNumber::FIRST);
    assert_eq!(page.items, (0..10).collect::<Vec<_>>());
    assert_eq!(page.number, 1);
    assert!(page.has_next);
    assert!(!page.has_prev);
    assert_eq!(page.total_items, 11);
    assert_eq!(page.total_pages, 2);
  }

  #[test]
  fn second_page_of_eleven() {
    let page = paginate((0..11).collect::<Vec<i32>>(), size(10), PageNumber::new(2));
    assert_eq!(page.items, vec![10]);
    assert!(!page.has_next);
    assert!(page.has_prev);
  }

  #[test]
  fn past_the_end_clamps_to_last_page() {
    for len in [1usize, 5, 10, 11, 29, 30] {
      let items: Vec<usize> = (0..len).collect();
      let last_number = PageNumber::new(len.div_ceil(10) as i64);
      let last = paginate(items.clone(), size(10), last_number);
      let beyond = paginate(items, size(10), PageNumber::new(1_000));
      assert_eq!(beyond, last, "len = {len}");
    }
  }

  #[test]
  fn empty_sequence_is_one_empty_page() {
    let page = paginate(Vec::<u8>::new(), size(10), PageNumber::new(3));
    assert_eq!(page, Page::empty());
    assert!(!page.has_next);
  }

  #[test]
  fn exact_multiple_has_no_trailing_page() {
    let page = paginate((0..20).collect::<Vec<_>>(), size(10), PageNumber::new(2));
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.len(), 10);
    assert!(!page.has_next);
  }

  #[test]
  fn window_offsets_follow_clamped_number() {
    let second = PageWindow::locate(11, size(10), PageNumber::new(2));
    assert_eq!((second.offset, second.limit), (10, 10));

    let beyond = PageWindow::locate(11, size(10), PageNumber::new(50));
    assert_eq!(beyond, second);

    let empty = PageWindow::locate(0, size(10), PageNumber::new(4));
    assert_eq!(empty.fill(Vec::<u8>::new()), Page::empty());
  }

  #[test]
  fn page_number_parsing() {
    assert_eq!(PageNumber::parse(None), PageNumber::FIRST);
    assert_eq!(PageNumber::parse(Some("")), PageNumber::FIRST);
    assert_eq!(PageNumber::parse(Some("abc")), PageNumber::FIRST);
    assert_eq!(PageNumber::parse(Some("0")), PageNumber::FIRST);
    assert_eq!(PageNumber::parse(Some("-4")), PageNumber::FIRST);
    assert_eq!(PageNumber::parse(Some("3")).get(), 3);
    assert_eq!(PageNumber::parse(Some(" 7 ")).get(), 7);
    assert_eq!(PageNumber::parse(Some("99999999999")).get(), u32::MAX);
  }
}
