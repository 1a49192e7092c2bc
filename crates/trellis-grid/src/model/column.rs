//! Column and header declarations.
//!
//! A [`Column`] describes one vertical slice of the grid: which record field
//! it pulls its cells from, how it is titled and aligned, how its width is
//! resolved, whether it is pinned to a viewport edge, and whether it
//! participates in sorting. Specialized header kinds (checkbox, radio,
//! switch) share the same shape and add interactive semantics on top.
//!
//! # Example
//!
//! ```
//! use trellis_grid::model::column::{Column, ColumnWidth, FixedBand};
//!
//! let name = Column::new("name", "Name")
//!     .with_width(ColumnWidth::Auto)
//!     .with_sortable(true);
//! let actions = Column::new("actions", "")
//!     .with_width(ColumnWidth::Absolute(96.0))
//!     .with_fixed(FixedBand::Right);
//! ```

use std::str::FromStr;

/// Horizontal alignment of cell content within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// How a column's width is resolved.
///
/// Absolute widths are taken directly; percent widths are resolved against
/// the viewport width remaining after absolute and auto-fit columns;
/// auto-fit columns take the maximum measured content width across all rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColumnWidth {
    /// Maximum measured content width across all rows.
    #[default]
    Auto,
    /// A fixed width in logical pixels.
    Absolute(f32),
    /// A percentage (0-100) of the remaining viewport width.
    Percent(f32),
}

/// Error returned when a width spec string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWidthError(String);

impl std::fmt::Display for ParseWidthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid width spec: {:?}", self.0)
    }
}

impl std::error::Error for ParseWidthError {}

impl FromStr for ColumnWidth {
    type Err = ParseWidthError;

    /// Parse the width grammar used by declarative column setups:
    /// `"auto"`, `"120"`, or `"30%"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        if let Some(percent) = s.strip_suffix('%') {
            return percent
                .trim()
                .parse::<f32>()
                .map(Self::Percent)
                .map_err(|_| ParseWidthError(s.to_string()));
        }
        s.parse::<f32>()
            .map(Self::Absolute)
            .map_err(|_| ParseWidthError(s.to_string()))
    }
}

/// Which viewport edge a column is pinned to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedBand {
    /// Flush to the left edge, exempt from horizontal scroll.
    Left,
    /// Flush to the right edge, exempt from horizontal scroll.
    Right,
}

/// A column's sort direction.
///
/// Toggling walks the three-way cycle `None -> Ascending -> Descending -> None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortState {
    /// The next state in the three-way cycle.
    pub fn cycled(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }
}

/// Specialized column kinds carrying interactive header semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    /// A plain data column.
    #[default]
    Plain,
    /// A checkbox column; its header hosts the overall tri-state checkbox.
    Check,
    /// A radio-selection column (at most one row selected).
    Radio,
    /// A switch column (per-row on/off toggle).
    Switch,
}

/// A single column declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    key: String,
    title: String,
    kind: ColumnKind,
    align: ColumnAlign,
    /// Header-only alignment override; falls back to `align` when unset.
    header_align: Option<ColumnAlign>,
    width: ColumnWidth,
    max_width: Option<f32>,
    ellipsis: bool,
    line_break: bool,
    fixed: Option<FixedBand>,
    sortable: bool,
    sort_state: SortState,
    /// Stable position within the header set, assigned at table attachment.
    index: usize,
}

impl Column {
    /// Create a plain column bound to a record field key.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind: ColumnKind::Plain,
            align: ColumnAlign::default(),
            header_align: None,
            width: ColumnWidth::default(),
            max_width: None,
            ellipsis: false,
            line_break: false,
            fixed: None,
            sortable: false,
            sort_state: SortState::None,
            index: 0,
        }
    }

    /// Create a checkbox column. Its header cell hosts the overall checkbox.
    pub fn check(key: impl Into<String>) -> Self {
        Self {
            kind: ColumnKind::Check,
            ..Self::new(key, "")
        }
    }

    /// Create a radio-selection column.
    pub fn radio(key: impl Into<String>) -> Self {
        Self {
            kind: ColumnKind::Radio,
            ..Self::new(key, "")
        }
    }

    /// Create a switch column.
    pub fn switch(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: ColumnKind::Switch,
            ..Self::new(key, title)
        }
    }

    pub fn with_align(mut self, align: ColumnAlign) -> Self {
        self.align = align;
        self
    }

    pub fn with_header_align(mut self, align: ColumnAlign) -> Self {
        self.header_align = Some(align);
        self
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    pub fn with_max_width(mut self, max_width: f32) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_ellipsis(mut self, ellipsis: bool) -> Self {
        self.ellipsis = ellipsis;
        self
    }

    pub fn with_line_break(mut self, line_break: bool) -> Self {
        self.line_break = line_break;
        self
    }

    pub fn with_fixed(mut self, band: FixedBand) -> Self {
        self.fixed = Some(band);
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn align(&self) -> ColumnAlign {
        self.align
    }

    /// Alignment used for the header cell.
    pub fn header_align(&self) -> ColumnAlign {
        self.header_align.unwrap_or(self.align)
    }

    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    pub fn max_width(&self) -> Option<f32> {
        self.max_width
    }

    pub fn ellipsis(&self) -> bool {
        self.ellipsis
    }

    pub fn line_break(&self) -> bool {
        self.line_break
    }

    pub fn fixed(&self) -> Option<FixedBand> {
        self.fixed
    }

    pub fn sortable(&self) -> bool {
        self.sortable
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    pub(crate) fn set_sort_state(&mut self, state: SortState) {
        self.sort_state = state;
    }

    /// Stable position within the attached header set.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }
}

/// Header identity: the ordered concatenation of column keys.
///
/// Row derivation is keyed on this string. A column change that leaves it
/// intact (width or flag edits) re-runs width resolution only; a change to
/// the concatenation forces full row re-derivation.
pub fn header_identity(columns: &[Column]) -> String {
    let mut identity = String::new();
    for column in columns {
        identity.push_str(column.key());
        // Separator keeps ["ab", "c"] distinct from ["a", "bc"].
        identity.push('\u{1f}');
    }
    identity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_parsing() {
        assert_eq!("auto".parse::<ColumnWidth>().unwrap(), ColumnWidth::Auto);
        assert_eq!("Auto".parse::<ColumnWidth>().unwrap(), ColumnWidth::Auto);
        assert_eq!(
            "120".parse::<ColumnWidth>().unwrap(),
            ColumnWidth::Absolute(120.0)
        );
        assert_eq!(
            " 30% ".parse::<ColumnWidth>().unwrap(),
            ColumnWidth::Percent(30.0)
        );
        assert!("wide".parse::<ColumnWidth>().is_err());
        assert!("%".parse::<ColumnWidth>().is_err());
    }

    #[test]
    fn test_sort_cycle() {
        let mut state = SortState::None;
        state = state.cycled();
        assert_eq!(state, SortState::Ascending);
        state = state.cycled();
        assert_eq!(state, SortState::Descending);
        state = state.cycled();
        assert_eq!(state, SortState::None);
    }

    #[test]
    fn test_header_identity_separates_keys() {
        let a = [Column::new("ab", ""), Column::new("c", "")];
        let b = [Column::new("a", ""), Column::new("bc", "")];
        assert_ne!(header_identity(&a), header_identity(&b));

        let c = [Column::new("ab", "Other").with_sortable(true), Column::new("c", "")];
        assert_eq!(header_identity(&a), header_identity(&c));
    }

    #[test]
    fn test_header_align_fallback() {
        let col = Column::new("x", "X").with_align(ColumnAlign::Right);
        assert_eq!(col.header_align(), ColumnAlign::Right);

        let col = col.with_header_align(ColumnAlign::Center);
        assert_eq!(col.header_align(), ColumnAlign::Center);
        assert_eq!(col.align(), ColumnAlign::Right);
    }
}
