//! Sorted interval index.
//!
//! Entries are kept sorted by start offset alongside a prefix maximum of end
//! offsets, so a point query is a binary search followed by a backward scan
//! that stops as soon as no earlier entry can reach the query point.
//! Query complexity: O(log n + k).

use mcfunction_toolchain_diagnostics::Span;

/// Anything covering a half-open character range.
pub trait Spanned {
    /// Characters covered.
    fn span(&self) -> Span;
}

impl Spanned for crate::actions::SubAction {
    fn span(&self) -> Span {
        self.span
    }
}

/// Immutable point-query index over spanned items.
#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    /// Items sorted by `span().start` (stable for equal starts).
    items: Vec<T>,
    /// `prefix_max_end[i] = max(items[0..=i].end)`
    prefix_max_end: Vec<usize>,
}

impl<T: Spanned> IntervalIndex<T> {
    /// Build the index, taking ownership of `items`.
    pub fn new(mut items: Vec<T>) -> Self {
        items.sort_by_key(|i| i.span().start);
        let mut max_end = 0;
        let prefix_max_end = items
            .iter()
            .map(|i| {
                max_end = max_end.max(i.span().end);
                max_end
            })
            .collect();
        Self {
            items,
            prefix_max_end,
        }
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, sorted by start.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items whose span contains `pos`, in descending start order.
    pub fn query_point(&self, pos: usize) -> Vec<&T> {
        let idx = self.items.partition_point(|i| i.span().start <= pos);
        let mut out = Vec::new();
        for i in (0..idx).rev() {
            if self.prefix_max_end[i] <= pos {
                break;
            }
            let item = &self.items[i];
            if item.span().contains(pos) {
                out.push(item);
            }
        }
        out
    }
}

impl<T: Spanned> Default for IntervalIndex<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
