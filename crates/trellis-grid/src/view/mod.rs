//! Presentation-side state: layout, scrolling, editing, and the table
//! aggregate that ties the model to the host widget.

pub mod clipboard;
pub mod edit;
pub mod layout;
pub mod metrics;
pub mod scroll;
pub mod table;

pub use clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
pub use edit::{EditRequest, EditSession};
pub use layout::{Band, ColumnLayout, GridLayout, LayoutParams, WidthPolicy, resolve};
pub use metrics::{FixedAdvanceMeasurer, FontSpec, TextMeasurer};
pub use scroll::{ScrollBar, SharedScrollState};
pub use table::{CellChange, SortChange, Table};
