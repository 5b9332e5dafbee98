// ── Pagination & selection ──

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::model::ConnectionId;

/// Requested page window. `current_page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_size: usize,
    pub current_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

impl PageRequest {
    pub fn new(page_size: usize, current_page: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: current_page.max(1),
        }
    }

    /// `current_page` pulled into `[1, total_pages]` for `total_items`.
    pub fn clamped(self, total_items: usize) -> usize {
        self.current_page
            .clamp(1, total_pages(total_items, self.page_size))
    }
}

/// One page of a sorted list, with 1-based inclusive display bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// `0` when the list is empty.
    pub range_start: usize,
    /// `0` when the list is empty.
    pub range_end: usize,
}

impl<T> Page<'_, T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}

/// `max(1, ceil(len / size))`; a zero size counts as one.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Slice out one page. Never fails: out-of-range pages are clamped.
pub fn paginate<T>(items: &[T], page_size: usize, current_page: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let total_pages = total_pages(items.len(), size);
    let current_page = current_page.clamp(1, total_pages);

    let start = (current_page - 1) * size;
    let end = (start + size).min(items.len());
    let slice = items.get(start..end).unwrap_or_default();

    let (range_start, range_end) = if slice.is_empty() {
        (0, 0)
    } else {
        (start + 1, end)
    };

    Page {
        items: slice,
        current_page,
        total_pages,
        total_items: items.len(),
        range_start,
        range_end,
    }
}

// ── Selection ───────────────────────────────────────────────────────

/// Selected connection ids in selection order. Survives paging; pruned to
/// the filtered set on every recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<ConnectionId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership. Returns `true` if `id` is now selected.
    pub fn toggle(&mut self, id: &ConnectionId) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn insert(&mut self, id: ConnectionId) {
        self.ids.insert(id);
    }

    /// Select-all / deselect-all for one page. If every id on the page is
    /// already selected they are all removed; otherwise they are all added,
    /// keeping selections on other pages. Returns `true` if the page ends
    /// up selected.
    pub fn toggle_page<'a>(&mut self, page_ids: impl IntoIterator<Item = &'a ConnectionId>) -> bool {
        let page_ids: Vec<&ConnectionId> = page_ids.into_iter().collect();
        if page_ids.is_empty() {
            return false;
        }
        if page_ids.iter().all(|id| self.ids.contains(*id)) {
            for id in page_ids {
                self.ids.shift_remove(id);
            }
            false
        } else {
            for id in page_ids {
                self.ids.insert(id.clone());
            }
            true
        }
    }

    /// Drop ids outside `keep`. Returns how many were removed.
    pub fn prune<'a>(&mut self, keep: impl IntoIterator<Item = &'a ConnectionId>) -> usize {
        let keep: HashSet<&ConnectionId> = keep.into_iter().collect();
        let before = self.ids.len();
        self.ids.retain(|id| keep.contains(id));
        before - self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.ids.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(raw: &[&str]) -> Vec<ConnectionId> {
        raw.iter().map(|s| ConnectionId::from(*s)).collect()
    }

    #[test]
    fn empty_list_has_one_page_and_zero_range() {
        let page = paginate::<u32>(&[], 10, 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert_eq!((page.range_start, page.range_end), (0, 0));
        assert!(page.items.is_empty());
    }

    #[test]
    fn last_page_is_partial() {
        let items: Vec<u32> = (1..=23).collect();
        let page = paginate(&items, 10, 3);
        assert_eq!(page.items, &[21, 22, 23]);
        assert_eq!((page.range_start, page.range_end), (21, 23));
        assert!(!page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, 2, 99).current_page, 3);
        assert_eq!(paginate(&items, 2, 0).current_page, 1);
    }

    #[test]
    fn zero_page_size_counts_as_one() {
        let items = [7, 8, 9];
        let page = paginate(&items, 0, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, &[8]);
    }

    #[test]
    fn toggle_page_merges_then_clears() {
        let mut sel = Selection::new();
        let other = ConnectionId::from("x");
        sel.toggle(&other);

        let page = ids(&["a", "b"]);
        assert!(sel.toggle_page(&page));
        assert_eq!(sel.len(), 3);

        assert!(!sel.toggle_page(&page));
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![&other]);
    }

    #[test]
    fn toggle_page_with_partial_selection_selects_all() {
        let mut sel = Selection::new();
        let page = ids(&["a", "b", "c"]);
        sel.toggle(&page[1]);
        assert!(sel.toggle_page(&page));
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn prune_keeps_only_surviving_ids() {
        let mut sel = Selection::new();
        for id in ids(&["a", "b", "c"]) {
            sel.insert(id);
        }
        let removed = sel.prune(&ids(&["b", "c", "d"]));
        assert_eq!(removed, 1);
        assert!(!sel.contains("a"));
        assert!(sel.contains("b"));
    }
}
