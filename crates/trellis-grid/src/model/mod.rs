//! Data model: columns, cells, rows, sources, and selection state.

pub mod cell;
pub mod column;
pub mod row;
pub mod selection;
pub mod source;

pub use cell::{BadgeCell, BadgeState, Cell, ImageCell, LinkCell, ProgressCell, TagCell, TextCell, Tone};
pub use column::{Column, ColumnAlign, ColumnKind, ColumnWidth, FixedBand, SortState};
pub use row::Row;
pub use selection::CheckState;
pub use source::{DataSource, Record, RecordSet};
