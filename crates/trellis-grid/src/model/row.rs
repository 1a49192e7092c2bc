//! Derived rows.
//!
//! A [`Row`] is one horizontal slice of the grid: an ordered sequence of
//! cells (always exactly one per active column), the record index it was
//! derived from, its cached vertical extent, and its selection flag. Rows
//! are rebuilt only when the data source reference or the column-key set
//! changes; everything else mutates cells in place.

use trellis_core::geometry::Rect;

use crate::model::cell::Cell;

/// A single derived row.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: Vec<Cell>,
    /// Index of the record this row was derived from. Zero for the header.
    source_index: usize,
    is_header: bool,
    /// Per-row selection. The overall tri-state is derived, never stored.
    checked: bool,
    /// Cached vertical extent in content coordinates, set during layout.
    extent: Rect,
}

impl Row {
    /// Create a body row derived from the record at `source_index`.
    pub fn body(source_index: usize, cells: Vec<Cell>) -> Self {
        Self {
            cells,
            source_index,
            is_header: false,
            checked: false,
            extent: Rect::ZERO,
        }
    }

    /// Create the synthetic header row.
    pub fn header(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            source_index: 0,
            is_header: true,
            checked: false,
            extent: Rect::ZERO,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn cell_mut(&mut self, column: usize) -> Option<&mut Cell> {
        self.cells.get_mut(column)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn is_header(&self) -> bool {
        self.is_header
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub(crate) fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn extent(&self) -> Rect {
        self.extent
    }

    pub(crate) fn set_extent(&mut self, extent: Rect) {
        self.extent = extent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_indexing_is_bounds_checked() {
        let row = Row::body(0, vec![Cell::from("a"), Cell::from("b")]);
        assert_eq!(row.cell_count(), 2);
        assert!(row.cell(1).is_some());
        assert!(row.cell(2).is_none());
    }

    #[test]
    fn test_header_flag() {
        let header = Row::header(vec![Cell::from("Name")]);
        assert!(header.is_header());
        assert!(!Row::body(0, vec![]).is_header());
    }
}
