//! In-place edit session state.
//!
//! At most one (row, column) pair is in edit mode. The engine never renders
//! an editor; it computes the anchor translation an external editor popup
//! applies to the cell's content-space rectangle and hands the session over
//! through a signal.

use trellis_core::geometry::{Point, Rect};

use crate::view::layout::{Band, GridLayout};

/// The active edit session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditSession {
    /// Display index of the row under edit.
    pub row: usize,
    /// Column index of the cell under edit.
    pub column: usize,
    /// Anchor translation for the external editor.
    pub anchor: Rect,
}

/// Payload emitted to the editor popup collaborator on entering edit mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditRequest {
    pub row: usize,
    pub column: usize,
    pub anchor: Rect,
    /// Scroll offsets at the moment the session opened.
    pub scroll: Point,
}

/// Compute the editor anchor for a cell.
///
/// The horizontal origin depends on the column's band: zero for fixed-left,
/// the viewport width minus the fixed-right band width for fixed-right, and
/// the negated horizontal scroll offset for the middle band. The vertical
/// origin is always the negated vertical scroll offset. The anchor's size is
/// the cell's size.
pub fn anchor(layout: &GridLayout, display_row: usize, column: usize, scroll: Point) -> Option<Rect> {
    let col = layout.column(column)?;
    let cell = layout.cell_rect(display_row, column, scroll)?;
    let x = match col.band {
        Band::FixedLeft => 0.0,
        Band::FixedRight => layout.viewport().width - layout.fixed_right_width(),
        Band::Middle => -scroll.x,
    };
    Some(Rect::new(x, -scroll.y, cell.width(), cell.height()))
}
