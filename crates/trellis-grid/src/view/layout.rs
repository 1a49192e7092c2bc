//! Width resolution, fixed-band partition, and virtualization geometry.
//!
//! [`resolve`] turns the current columns, rows, and viewport into a
//! [`GridLayout`]: one resolved width and band per column plus the content
//! extent. The layout then answers geometry queries against the live scroll
//! offsets: row and cell rectangles in viewport coordinates, and the window
//! of rows/columns actually worth drawing.
//!
//! Virtualization here means skipping draw calls only. Every derived row
//! stays in the row array; the layout merely reports which display positions
//! intersect the viewport.

use std::ops::Range;

use trellis_core::geometry::{Point, Rect, Size};

use crate::model::column::{Column, ColumnKind, ColumnWidth, FixedBand};
use crate::model::row::Row;
use crate::view::metrics::{FontSpec, TextMeasurer};

/// How underflow slack is distributed when resolved widths total less than
/// the viewport width. Every policy converges the total to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthPolicy {
    /// Distribute slack over auto-fit columns proportionally to their
    /// measured widths (over all columns when none is auto-fit).
    #[default]
    Proportional,
    /// Give all slack to the last column.
    LastColumn,
}

/// Fixed knobs of the layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Horizontal cell padding applied to each side of measured content.
    pub gap: f32,
    /// Edge length of checkbox/radio/switch glyphs.
    pub check_size: f32,
    /// Body row height.
    pub row_height: f32,
    /// Header row height.
    pub header_height: f32,
    /// Whether the synthetic header row is shown.
    pub show_header: bool,
    /// Font used for auto-fit measurement.
    pub font: FontSpec,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            gap: 12.0,
            check_size: 16.0,
            row_height: 40.0,
            header_height: 40.0,
            show_header: true,
            font: FontSpec::default(),
        }
    }
}

/// Which band a column landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    FixedLeft,
    Middle,
    FixedRight,
}

/// One column's resolved geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Index into the table's column array.
    pub index: usize,
    /// Horizontal origin in content coordinates.
    pub x: f32,
    pub width: f32,
    pub band: Band,
    /// Viewport-space origin for pinned columns; middle columns derive
    /// theirs from the scroll offset instead.
    pub pinned_x: Option<f32>,
}

/// The resolved grid geometry for one (columns, rows, viewport) state.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    columns: Vec<ColumnLayout>,
    viewport: Size,
    content: Size,
    header_height: f32,
    row_height: f32,
    show_header: bool,
    body_count: usize,
    fixed_left_width: f32,
    fixed_right_width: f32,
}

impl GridLayout {
    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnLayout> {
        self.columns.get(index)
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Total content extent published to the scrollbar.
    pub fn content(&self) -> Size {
        self.content
    }

    pub fn show_header(&self) -> bool {
        self.show_header
    }

    /// Header height, zero when the header is hidden.
    pub fn header_height(&self) -> f32 {
        if self.show_header { self.header_height } else { 0.0 }
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Number of display rows, header included when shown.
    pub fn display_count(&self) -> usize {
        self.body_count + usize::from(self.show_header)
    }

    pub fn body_count(&self) -> usize {
        self.body_count
    }

    pub fn fixed_left_width(&self) -> f32 {
        self.fixed_left_width
    }

    pub fn fixed_right_width(&self) -> f32 {
        self.fixed_right_width
    }

    /// Display index of the first body row.
    pub fn body_offset(&self) -> usize {
        usize::from(self.show_header)
    }

    /// A row's vertical origin in content coordinates.
    ///
    /// Content y zero is the top of the first body row; the pinned header
    /// lives above the scrolled content.
    pub fn row_top(&self, display_index: usize) -> f32 {
        if self.show_header && display_index == 0 {
            return 0.0;
        }
        (display_index - self.body_offset()) as f32 * self.row_height
    }

    /// A row's rectangle in viewport coordinates.
    ///
    /// The header row is pinned to the top; body rows scroll under it.
    pub fn row_rect(&self, display_index: usize, scroll_y: f32) -> Rect {
        if self.show_header && display_index == 0 {
            return Rect::new(0.0, 0.0, self.viewport.width, self.header_height);
        }
        let y = self.header_height() + self.row_top(display_index) - scroll_y;
        Rect::new(0.0, y, self.content.width, self.row_height)
    }

    /// A cell's rectangle in viewport coordinates.
    ///
    /// Pinned columns ignore the horizontal offset; the middle band shifts
    /// by `scroll.x`.
    pub fn cell_rect(&self, display_index: usize, column: usize, scroll: Point) -> Option<Rect> {
        let col = self.columns.get(column)?;
        if display_index >= self.display_count() {
            return None;
        }
        let row = self.row_rect(display_index, scroll.y);
        let x = match col.pinned_x {
            Some(pinned) => pinned,
            None => col.x - scroll.x,
        };
        Some(Rect::new(x, row.top(), col.width, row.height()))
    }

    /// Display indices of body rows intersecting the viewport.
    ///
    /// The header, when shown, is always drawn and is not part of the range.
    pub fn visible_body_rows(&self, scroll_y: f32) -> Range<usize> {
        if self.body_count == 0 || self.row_height <= 0.0 {
            let offset = self.body_offset();
            return offset..offset;
        }
        let body_viewport = (self.viewport.height - self.header_height()).max(0.0);
        let first = (scroll_y / self.row_height).floor().max(0.0) as usize;
        let last = (((scroll_y + body_viewport) / self.row_height).ceil() as usize)
            .min(self.body_count);
        let offset = self.body_offset();
        (offset + first.min(last))..(offset + last)
    }

    /// Indices of columns whose rectangle intersects the viewport.
    ///
    /// Pinned columns are always visible.
    pub fn visible_columns(&self, scroll_x: f32) -> Vec<usize> {
        self.columns
            .iter()
            .filter(|col| {
                let x = match col.pinned_x {
                    Some(pinned) => pinned,
                    None => col.x - scroll_x,
                };
                x < self.viewport.width && x + col.width > 0.0
            })
            .map(|col| col.index)
            .collect()
    }
}

/// Resolve column widths and band geometry.
///
/// Resolution order: absolute widths directly; auto-fit from the maximum
/// measured content width (bounded by the column's max width); percentages
/// against the viewport width remaining after the other two; then underflow
/// slack per `policy` so the total never falls short of the viewport.
pub fn resolve(
    columns: &[Column],
    rows: &[Row],
    measurer: &dyn TextMeasurer,
    params: &LayoutParams,
    viewport: Size,
    policy: WidthPolicy,
) -> GridLayout {
    let body_count = rows.iter().filter(|r| !r.is_header()).count();
    let mut widths = vec![0.0f32; columns.len()];
    let mut is_auto = vec![false; columns.len()];

    // Absolute and auto-fit passes.
    let mut fixed_total = 0.0f32;
    for (i, column) in columns.iter().enumerate() {
        match column.width() {
            ColumnWidth::Absolute(w) => {
                widths[i] = w;
                fixed_total += w;
            }
            ColumnWidth::Auto => {
                let w = auto_fit_width(column, i, rows, measurer, params);
                widths[i] = w;
                is_auto[i] = true;
                fixed_total += w;
            }
            ColumnWidth::Percent(_) => {}
        }
    }

    // Percent pass: share of what absolute + auto left over.
    let available = (viewport.width - fixed_total).max(0.0);
    for (i, column) in columns.iter().enumerate() {
        if let ColumnWidth::Percent(p) = column.width() {
            let mut w = available * p / 100.0;
            if let Some(max) = column.max_width() {
                w = w.min(max);
            }
            widths[i] = w;
        }
    }

    // Underflow: distribute slack so the grid always fills the viewport.
    let total: f32 = widths.iter().sum();
    if !columns.is_empty() && total < viewport.width {
        let slack = viewport.width - total;
        match policy {
            WidthPolicy::Proportional => {
                let targets: Vec<usize> = if is_auto.iter().any(|&a| a) {
                    (0..columns.len()).filter(|&i| is_auto[i]).collect()
                } else {
                    (0..columns.len()).collect()
                };
                let base: f32 = targets.iter().map(|&i| widths[i]).sum();
                if base > 0.0 {
                    for &i in &targets {
                        widths[i] += slack * widths[i] / base;
                    }
                } else {
                    let share = slack / targets.len() as f32;
                    for &i in &targets {
                        widths[i] += share;
                    }
                }
            }
            WidthPolicy::LastColumn => {
                if let Some(last) = widths.last_mut() {
                    *last += slack;
                }
            }
        }
    }

    // Band partition and positions. Content x runs over declaration order;
    // pinned columns additionally get a viewport-space origin.
    let fixed_left_width: f32 = band_width(columns, &widths, FixedBand::Left);
    let fixed_right_width: f32 = band_width(columns, &widths, FixedBand::Right);

    let mut layouts = Vec::with_capacity(columns.len());
    let mut x = 0.0f32;
    let mut left_x = 0.0f32;
    let mut right_x = viewport.width - fixed_right_width;
    for (i, column) in columns.iter().enumerate() {
        let (band, pinned_x) = match column.fixed() {
            Some(FixedBand::Left) => {
                let pinned = left_x;
                left_x += widths[i];
                (Band::FixedLeft, Some(pinned))
            }
            Some(FixedBand::Right) => {
                let pinned = right_x;
                right_x += widths[i];
                (Band::FixedRight, Some(pinned))
            }
            None => (Band::Middle, None),
        };
        layouts.push(ColumnLayout {
            index: i,
            x,
            width: widths[i],
            band,
            pinned_x,
        });
        x += widths[i];
    }

    let header_height = if params.show_header {
        params.header_height
    } else {
        0.0
    };
    let content = Size::new(
        x.max(viewport.width),
        header_height + body_count as f32 * params.row_height,
    );
    tracing::debug!(
        target: "trellis_grid::layout",
        columns = columns.len(),
        body_rows = body_count,
        content_width = content.width,
        content_height = content.height,
        "resolved layout"
    );

    GridLayout {
        columns: layouts,
        viewport,
        content,
        header_height: params.header_height,
        row_height: params.row_height,
        show_header: params.show_header,
        body_count,
        fixed_left_width,
        fixed_right_width,
    }
}

fn band_width(columns: &[Column], widths: &[f32], band: FixedBand) -> f32 {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.fixed() == Some(band))
        .map(|(i, _)| widths[i])
        .sum()
}

/// Maximum measured content width for an auto-fit column.
fn auto_fit_width(
    column: &Column,
    index: usize,
    rows: &[Row],
    measurer: &dyn TextMeasurer,
    params: &LayoutParams,
) -> f32 {
    let pad = params.gap * 2.0;
    let mut width = match column.kind() {
        // Interactive glyph columns size to the glyph, not to text.
        ColumnKind::Check | ColumnKind::Radio | ColumnKind::Switch => params.check_size + pad,
        ColumnKind::Plain => {
            let mut max = measurer.measure(column.title(), &params.font).width + pad;
            for row in rows.iter().filter(|r| !r.is_header()) {
                if let Some(text) = row.cell(index).and_then(|c| c.display_text()) {
                    let measured = measurer.measure(&text, &params.font).width + pad;
                    max = max.max(measured);
                }
            }
            max
        }
    };
    if let Some(max_width) = column.max_width() {
        width = width.min(max_width);
    }
    width
}
