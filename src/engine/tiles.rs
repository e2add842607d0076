//! Tiled list model
//!
//! The filtered collection is repeated `TILE_COUNT` times so the spin can travel
//! many rows without visibly wrapping. Each row remembers which item it shows.

use crate::consts::{MAX_VISIBLE_ROWS, MIN_VISIBLE_ROWS, TILE_COUNT};

/// How a list is laid out for its item count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLayout {
    /// Nothing selectable: a single disabled hint row
    Placeholder,
    /// One item shown once, selected without spinning
    Single,
    /// `count * TILE_COUNT` rows
    Tiled { count: usize },
}

impl ListLayout {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => ListLayout::Placeholder,
            1 => ListLayout::Single,
            count => ListLayout::Tiled { count },
        }
    }
}

/// A rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    /// Index into the filtered collection; `None` for the placeholder
    pub original_index: Option<usize>,
    pub highlighted: bool,
}

/// Rows for one scrollable list
#[derive(Debug, Clone)]
pub struct TiledList {
    layout: ListLayout,
    item_count: usize,
    row_height: f32,
    rows: Vec<Row>,
}

impl TiledList {
    pub fn build(item_count: usize, row_height: f32) -> Self {
        let layout = ListLayout::for_count(item_count);
        let rows = match layout {
            ListLayout::Placeholder => vec![Row {
                original_index: None,
                highlighted: false,
            }],
            ListLayout::Single => vec![Row {
                original_index: Some(0),
                highlighted: false,
            }],
            ListLayout::Tiled { count } => (0..count * TILE_COUNT)
                .map(|i| Row {
                    original_index: Some(i % count),
                    highlighted: false,
                })
                .collect(),
        };
        Self {
            layout,
            item_count,
            row_height,
            rows,
        }
    }

    /// Empty list showing the placeholder row
    pub fn placeholder(row_height: f32) -> Self {
        Self::build(0, row_height)
    }

    pub fn layout(&self) -> ListLayout {
        self.layout
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of tiled rows (`item_count * TILE_COUNT`), as used by the spin wrap
    pub fn tiled_item_count(&self) -> usize {
        self.item_count * TILE_COUNT
    }

    /// Only tiled lists can spin
    pub fn is_spinnable(&self) -> bool {
        matches!(self.layout, ListLayout::Tiled { .. })
    }

    /// Rows visible in the viewport: always between 3 and 5
    pub fn visible_rows(&self) -> usize {
        visible_rows(self.item_count)
    }

    pub fn viewport_height(&self) -> f32 {
        self.visible_rows() as f32 * self.row_height
    }

    pub fn content_height(&self) -> f32 {
        self.rows.len() as f32 * self.row_height
    }

    /// Highlight every tile copy of `index`, clearing any previous highlight
    pub fn highlight(&mut self, index: usize) {
        for row in &mut self.rows {
            row.highlighted = row.original_index == Some(index);
        }
    }

    pub fn clear_highlight(&mut self) {
        for row in &mut self.rows {
            row.highlighted = false;
        }
    }

    /// Original index currently highlighted, if any
    pub fn highlighted_index(&self) -> Option<usize> {
        self.rows
            .iter()
            .find(|r| r.highlighted)
            .and_then(|r| r.original_index)
    }

    pub fn highlighted_count(&self) -> usize {
        self.rows.iter().filter(|r| r.highlighted).count()
    }
}

/// Viewport rows for a collection of `item_count` items
pub fn visible_rows(item_count: usize) -> usize {
    item_count.clamp(MIN_VISIBLE_ROWS, MAX_VISIBLE_ROWS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ROW_HEIGHT;
    use proptest::prelude::*;

    #[test]
    fn test_empty_list_is_placeholder() {
        let list = TiledList::build(0, ROW_HEIGHT);
        assert_eq!(list.layout(), ListLayout::Placeholder);
        assert_eq!(list.rows().len(), 1);
        assert_eq!(list.rows()[0].original_index, None);
        assert!(!list.is_spinnable());
        assert_eq!(list.viewport_height(), 3.0 * ROW_HEIGHT);
    }

    #[test]
    fn test_single_item_not_tiled() {
        let list = TiledList::build(1, ROW_HEIGHT);
        assert_eq!(list.layout(), ListLayout::Single);
        assert_eq!(list.rows().len(), 1);
        assert!(!list.is_spinnable());
    }

    #[test]
    fn test_tiled_rows_carry_original_index() {
        let list = TiledList::build(3, ROW_HEIGHT);
        assert_eq!(list.rows().len(), 30);
        assert_eq!(list.tiled_item_count(), 30);
        let indices: Vec<_> = list.rows()[..7].iter().map(|r| r.original_index).collect();
        assert_eq!(
            indices,
            [Some(0), Some(1), Some(2), Some(0), Some(1), Some(2), Some(0)]
        );
        assert_eq!(list.content_height(), 30.0 * ROW_HEIGHT);
    }

    #[test]
    fn test_visible_rows_clamped() {
        assert_eq!(visible_rows(0), 3);
        assert_eq!(visible_rows(2), 3);
        assert_eq!(visible_rows(4), 4);
        assert_eq!(visible_rows(12), 5);
    }

    #[test]
    fn test_highlight_replaces_previous() {
        let mut list = TiledList::build(4, ROW_HEIGHT);
        list.highlight(1);
        list.highlight(3);
        assert_eq!(list.highlighted_index(), Some(3));
        assert_eq!(list.highlighted_count(), 10);
        list.clear_highlight();
        assert_eq!(list.highlighted_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_highlight_marks_every_tile_copy(count in 2usize..30, pick in 0usize..30) {
            let winner = pick % count;
            let mut list = TiledList::build(count, ROW_HEIGHT);
            list.highlight(winner);

            prop_assert_eq!(list.highlighted_count(), TILE_COUNT);
            for row in list.rows() {
                prop_assert_eq!(row.highlighted, row.original_index == Some(winner));
            }
        }
    }
}
