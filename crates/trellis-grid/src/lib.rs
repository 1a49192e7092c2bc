//! Headless data-grid engine.
//!
//! `trellis-grid` implements the state model behind a desktop table widget
//! without rendering anything: columns and width resolution, derived rows
//! over a pluggable [`DataSource`](model::DataSource), tri-state selection,
//! sorting, draw-window virtualization with pinned columns, in-place edit
//! sessions, and clipboard export. The host owns painting, fonts, and input;
//! it talks to the engine through the [`Table`](view::Table) aggregate and
//! the collaborator traits ([`TextMeasurer`](view::TextMeasurer),
//! [`ScrollBar`](view::ScrollBar), [`Clipboard`](view::Clipboard)).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use trellis_grid::model::{Column, Record, RecordSet};
//! use trellis_grid::view::{FixedAdvanceMeasurer, MemoryClipboard, SharedScrollState, Table};
//! use trellis_core::geometry::Size;
//!
//! let mut table = Table::new(
//!     Arc::new(FixedAdvanceMeasurer::default()),
//!     Arc::new(SharedScrollState::new()),
//!     Arc::new(MemoryClipboard::new()),
//! );
//! table.set_viewport(Size::new(640.0, 480.0));
//! table.set_columns(vec![
//!     Column::new("name", "Name").with_sortable(true),
//!     Column::new("role", "Role"),
//! ]);
//! table.set_data_source(Arc::new(
//!     RecordSet::new()
//!         .with_record(Record::new().with("name", "Ada").with("role", "Engineer")),
//! ));
//! assert_eq!(table.body_count(), 1);
//! ```

pub mod error;
pub mod model;
pub mod sort;
pub mod view;

pub use error::{GridError, Result};
pub use model::{Cell, CheckState, Column, DataSource, Row};
pub use view::{Table, TextMeasurer};
