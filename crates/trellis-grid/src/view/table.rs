//! The table aggregate root.
//!
//! [`Table`] owns the column array, the derived row array, sort and
//! selection state, the edit session, and the animation channels, and wires
//! them to the external collaborators (measurer, scrollbar, clipboard). Rows
//! are a memoized projection of (data source x columns x sort state):
//! re-derivation happens only when the data source reference or the
//! column-key concatenation changes, everything else mutates in place and
//! invalidates the smallest thing that still repaints correctly.
//!
//! All model mutation happens synchronously on the caller's (UI) thread.
//! The only asynchronous activity is the animation ticks, which touch
//! nothing but their progress scalars and the repaint signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use trellis_core::animation::AnimationChannel;
use trellis_core::geometry::{Point, Size};
use trellis_core::scheduler::SharedTaskScheduler;
use trellis_core::signal::Signal;

use crate::error::{GridError, Result};
use crate::model::cell::{Cell, attr_affects_width};
use crate::model::column::{Column, SortState, header_identity};
use crate::model::row::Row;
use crate::model::selection::{CheckState, overall_state};
use crate::model::source::DataSource;
use crate::sort::sorted_order;
use crate::view::clipboard::Clipboard;
use crate::view::edit::{self, EditRequest, EditSession};
use crate::view::layout::{GridLayout, LayoutParams, WidthPolicy, resolve};
use crate::view::metrics::TextMeasurer;
use crate::view::scroll::ScrollBar;

/// One recorded cell mutation, in derived-row coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    /// Index into the derived row array (0 is the header row).
    pub row: usize,
    pub column: usize,
    pub attr: &'static str,
}

/// A sort-state transition on one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortChange {
    pub column: usize,
    pub state: SortState,
}

/// Collects cell change notifications raised through the hooks the table
/// installs on every derived cell.
struct ChangeSink {
    pending: Mutex<Vec<CellChange>>,
    width_dirty: AtomicBool,
    repaint: Arc<Signal<()>>,
}

impl ChangeSink {
    fn record(&self, row: usize, column: usize, attr: &'static str) {
        self.pending.lock().push(CellChange { row, column, attr });
        if attr_affects_width(attr) {
            self.width_dirty.store(true, Ordering::SeqCst);
        }
        self.repaint.emit(());
    }
}

/// The data-grid engine behind one table widget instance.
pub struct Table {
    columns: Vec<Column>,
    identity: String,
    source: Option<Arc<dyn DataSource>>,
    /// Derived rows in source order; index 0 is always the synthetic header.
    rows: Vec<Row>,
    /// Display order of body rows as indices into `rows`; `None` is source
    /// order.
    display_order: Option<Vec<usize>>,
    sort_column: Option<usize>,

    params: LayoutParams,
    policy: WidthPolicy,
    viewport: Size,
    layout: GridLayout,
    layout_dirty: bool,

    measurer: Arc<dyn TextMeasurer>,
    scrollbar: Arc<dyn ScrollBar>,
    clipboard: Arc<dyn Clipboard>,

    edit: Option<EditSession>,
    overall: CheckState,
    changes: Arc<ChangeSink>,

    repaint: Arc<Signal<()>>,
    overall_check_changed: Signal<CheckState>,
    edit_requested: Signal<EditRequest>,
    sort_changed: Signal<SortChange>,

    scheduler: Arc<SharedTaskScheduler>,
    check_channel: AnimationChannel,
    hover_channel: AnimationChannel,
    check_progress: Arc<Mutex<f32>>,
    hover_intensity: Arc<Mutex<i32>>,

    disposed: bool,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("sort_column", &self.sort_column)
            .field("overall", &self.overall)
            .field("edit", &self.edit)
            .finish()
    }
}

impl Table {
    /// Create a table wired to its external collaborators.
    pub fn new(
        measurer: Arc<dyn TextMeasurer>,
        scrollbar: Arc<dyn ScrollBar>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let repaint = Arc::new(Signal::new());
        let changes = Arc::new(ChangeSink {
            pending: Mutex::new(Vec::new()),
            width_dirty: AtomicBool::new(false),
            repaint: repaint.clone(),
        });
        let scheduler = Arc::new(SharedTaskScheduler::new());
        let params = LayoutParams::default();
        let viewport = Size::ZERO;
        let rows = vec![Row::header(Vec::new())];
        let layout = resolve(
            &[],
            &rows,
            &NullMeasurer,
            &params,
            viewport,
            WidthPolicy::default(),
        );
        Self {
            columns: Vec::new(),
            identity: String::new(),
            source: None,
            rows,
            display_order: None,
            sort_column: None,
            params,
            policy: WidthPolicy::default(),
            viewport,
            layout,
            layout_dirty: true,
            measurer,
            scrollbar,
            clipboard,
            edit: None,
            overall: CheckState::Unchecked,
            changes,
            repaint,
            overall_check_changed: Signal::new(),
            edit_requested: Signal::new(),
            sort_changed: Signal::new(),
            check_channel: AnimationChannel::new(scheduler.clone()),
            hover_channel: AnimationChannel::new(scheduler.clone()),
            scheduler,
            check_progress: Arc::new(Mutex::new(0.0)),
            hover_intensity: Arc::new(Mutex::new(0)),
            disposed: false,
        }
    }

    pub fn with_params(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self.layout_dirty = true;
        self
    }

    pub fn with_width_policy(mut self, policy: WidthPolicy) -> Self {
        self.policy = policy;
        self.layout_dirty = true;
        self
    }

    // ===== Signals =====

    /// Repaint requests; one per logical visual change.
    pub fn on_repaint(&self) -> &Signal<()> {
        &self.repaint
    }

    /// Overall (header) checkbox state transitions.
    pub fn on_overall_check_changed(&self) -> &Signal<CheckState> {
        &self.overall_check_changed
    }

    /// Edit-session hand-off to the editor popup collaborator.
    pub fn on_edit_requested(&self) -> &Signal<EditRequest> {
        &self.edit_requested
    }

    /// Sort-state transitions.
    pub fn on_sort_changed(&self) -> &Signal<SortChange> {
        &self.sort_changed
    }

    /// The scheduler the host must pump to drive animations.
    pub fn scheduler(&self) -> Arc<SharedTaskScheduler> {
        self.scheduler.clone()
    }

    // ===== Columns and data =====

    /// Replace the column set.
    ///
    /// Rows are re-derived only when the ordered key concatenation changes;
    /// width/flag-only edits re-run width resolution and keep every derived
    /// row (and its selection and cell state) intact. Any active edit
    /// session is closed either way.
    pub fn set_columns(&mut self, mut columns: Vec<Column>) {
        for (i, column) in columns.iter_mut().enumerate() {
            column.set_index(i);
        }
        let identity = header_identity(&columns);
        let rederive = identity != self.identity;

        self.close_edit_internal();

        if rederive {
            tracing::debug!(
                target: "trellis_grid::table",
                columns = columns.len(),
                "column keys changed, re-deriving rows"
            );
            self.columns = columns;
            self.identity = identity;
            self.sort_column = None;
            self.display_order = None;
            self.derive_rows();
        } else {
            // Carry the active sort onto the equivalent new column.
            if let Some(sorted) = self.sort_column {
                let state = self
                    .columns
                    .get(sorted)
                    .map(|c| c.sort_state())
                    .unwrap_or_default();
                match columns.get_mut(sorted) {
                    Some(column) if column.sortable() => column.set_sort_state(state),
                    _ => {
                        self.sort_column = None;
                        self.display_order = None;
                    }
                }
            }
            self.columns = columns;
            self.rebuild_header_row();
        }

        self.layout_dirty = true;
        self.repaint.emit(());
    }

    /// Assign the data source.
    ///
    /// Passing the same reference again is a no-op; a new reference
    /// re-derives all rows, closes any edit session, and re-applies the
    /// active sort to the fresh rows.
    pub fn set_data_source(&mut self, source: Arc<dyn DataSource>) {
        if let Some(current) = &self.source {
            if Arc::ptr_eq(current, &source) {
                return;
            }
        }
        tracing::debug!(
            target: "trellis_grid::table",
            records = source.len(),
            "data source changed, re-deriving rows"
        );
        self.source = Some(source);
        self.close_edit_internal();
        self.derive_rows();
        self.layout_dirty = true;
        self.repaint.emit(());
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rebuild the derived row array from the current source and columns.
    fn derive_rows(&mut self) {
        // Header inference: only when no columns were supplied and data
        // is present.
        if self.columns.is_empty() {
            if let Some(source) = &self.source {
                let inferred: Vec<Column> = source
                    .field_keys()
                    .into_iter()
                    .map(|key| Column::new(key.clone(), key))
                    .collect();
                if !inferred.is_empty() {
                    self.columns = inferred;
                    for (i, column) in self.columns.iter_mut().enumerate() {
                        column.set_index(i);
                    }
                    self.identity = header_identity(&self.columns);
                }
            }
        }

        let mut rows = Vec::with_capacity(self.source.as_ref().map_or(1, |s| s.len() + 1));
        rows.push(Self::header_row_for(&self.columns));

        if let Some(source) = &self.source {
            for record in 0..source.len() {
                let row_index = rows.len();
                let mut cells: Vec<Cell> = self
                    .columns
                    .iter()
                    .map(|column| {
                        source
                            .cell(record, column.key())
                            .unwrap_or_else(Cell::empty)
                    })
                    .collect();
                for (column, cell) in cells.iter_mut().enumerate() {
                    let sink = self.changes.clone();
                    cell.set_hook(Arc::new(move |attr| sink.record(row_index, column, attr)));
                }
                let row = Row::body(record, cells);
                debug_assert_eq!(
                    row.cell_count(),
                    self.columns.len(),
                    "derived row cell count must match column count"
                );
                rows.push(row);
            }
        }

        self.rows = rows;
        self.apply_sort();
        self.refresh_overall();
    }

    fn header_row_for(columns: &[Column]) -> Row {
        Row::header(columns.iter().map(|c| Cell::from(c.title())).collect())
    }

    fn rebuild_header_row(&mut self) {
        self.rows[0] = Self::header_row_for(&self.columns);
    }

    // ===== Row access =====

    /// Number of display rows: body rows plus the header when shown.
    pub fn row_count(&self) -> usize {
        self.body_count() + usize::from(self.params.show_header)
    }

    /// Number of body (data) rows.
    pub fn body_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn show_header(&self) -> bool {
        self.params.show_header
    }

    pub fn set_show_header(&mut self, show: bool) {
        if self.params.show_header == show {
            return;
        }
        self.params.show_header = show;
        self.layout_dirty = true;
        self.repaint.emit(());
    }

    /// The synthetic header row.
    pub fn header_row(&self) -> &Row {
        &self.rows[0]
    }

    /// Index into `rows` for a body position in the current display order.
    fn rows_index_for_body(&self, body: usize) -> Option<usize> {
        if body >= self.body_count() {
            return None;
        }
        Some(match &self.display_order {
            Some(order) => order[body],
            None => body + 1,
        })
    }

    /// The body row at a display position (0 is the topmost body row).
    pub fn body_row(&self, body: usize) -> Option<&Row> {
        self.rows.get(self.rows_index_for_body(body)?)
    }

    /// The row at a display index, header included when shown.
    pub fn display_row(&self, display: usize) -> Option<&Row> {
        if self.params.show_header {
            if display == 0 {
                return self.rows.first();
            }
            self.body_row(display - 1)
        } else {
            self.body_row(display)
        }
    }

    pub fn cell(&self, body: usize, column: usize) -> Option<&Cell> {
        self.body_row(body)?.cell(column)
    }

    /// Mutable cell access; mutations notify through the installed hook.
    pub fn cell_mut(&mut self, body: usize, column: usize) -> Option<&mut Cell> {
        let index = self.rows_index_for_body(body)?;
        self.rows.get_mut(index)?.cell_mut(column)
    }

    /// Drain the cell changes recorded since the last call.
    pub fn take_changes(&self) -> Vec<CellChange> {
        std::mem::take(&mut *self.changes.pending.lock())
    }

    // ===== Layout =====

    pub fn set_viewport(&mut self, viewport: Size) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.layout_dirty = true;
        self.repaint.emit(());
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn set_params(&mut self, params: LayoutParams) {
        if self.params == params {
            return;
        }
        self.params = params;
        self.layout_dirty = true;
        self.repaint.emit(());
    }

    /// The current layout, recomputing it first if anything invalidated it.
    ///
    /// Width-affecting cell changes recorded since the last layout trigger a
    /// fresh width-resolution pass here.
    pub fn layout(&mut self) -> &GridLayout {
        self.ensure_layout();
        &self.layout
    }

    /// Current scroll offsets, read from the scrollbar collaborator.
    pub fn scroll_offset(&self) -> Point {
        Point::new(self.scrollbar.value_x(), self.scrollbar.value_y())
    }

    fn ensure_layout(&mut self) {
        let width_dirty = self.changes.width_dirty.swap(false, Ordering::SeqCst);
        if !(self.layout_dirty || width_dirty) {
            return;
        }
        self.layout = resolve(
            &self.columns,
            &self.rows,
            self.measurer.as_ref(),
            &self.params,
            self.viewport,
            self.policy,
        );
        self.cache_row_extents();
        self.scrollbar
            .set_content_extent(self.layout.content(), self.viewport);
        self.layout_dirty = false;
    }

    /// Stamp each row's content-space extent from the fresh layout.
    fn cache_row_extents(&mut self) {
        let width = self.layout.content().width;
        let header_height = self.layout.header_height();
        let row_height = self.layout.row_height();

        let mapping: Vec<(usize, usize)> = (0..self.body_count())
            .filter_map(|body| self.rows_index_for_body(body).map(|idx| (body, idx)))
            .collect();

        self.rows[0].set_extent(trellis_core::geometry::Rect::new(
            0.0,
            0.0,
            width,
            header_height,
        ));
        for (body, idx) in mapping {
            self.rows[idx].set_extent(trellis_core::geometry::Rect::new(
                0.0,
                header_height + body as f32 * row_height,
                width,
                row_height,
            ));
        }
    }

    // ===== Selection =====

    /// The derived overall (header) checkbox state.
    pub fn overall_check(&self) -> CheckState {
        self.overall
    }

    pub fn row_checked(&self, body: usize) -> Result<bool> {
        self.body_row(body)
            .map(Row::checked)
            .ok_or(GridError::InvalidRow(body))
    }

    /// Set one body row's check flag and propagate to the overall state.
    ///
    /// Propagation is synchronous: the overall signal (and its animation)
    /// fires before this returns.
    pub fn set_row_checked(&mut self, body: usize, checked: bool) -> Result<()> {
        let index = self
            .rows_index_for_body(body)
            .ok_or(GridError::InvalidRow(body))?;
        if self.rows[index].checked() == checked {
            return Ok(());
        }
        self.rows[index].set_checked(checked);
        self.refresh_overall();
        self.repaint.emit(());
        Ok(())
    }

    /// Bulk write from the overall checkbox: set every body row.
    ///
    /// The derived state collapses to the written boolean, never
    /// indeterminate.
    pub fn set_all_checked(&mut self, checked: bool) {
        let mut changed = false;
        for row in self.rows.iter_mut().filter(|r| !r.is_header()) {
            if row.checked() != checked {
                row.set_checked(checked);
                changed = true;
            }
        }
        let overall_changed = self.refresh_overall();
        if changed || overall_changed {
            self.repaint.emit(());
        }
    }

    /// Recompute the derived overall state; on a transition, notify and run
    /// the check animation. Returns whether it changed.
    fn refresh_overall(&mut self) -> bool {
        let state = overall_state(&self.rows);
        if state == self.overall {
            return false;
        }
        self.overall = state;
        self.overall_check_changed.emit(state);

        let rising = state != CheckState::Unchecked;
        let tick_repaint = self.repaint.clone();
        let finish_repaint = self.repaint.clone();
        self.check_channel.animate_toggle(
            self.check_progress.clone(),
            rising,
            move || tick_repaint.emit(()),
            move || finish_repaint.emit(()),
        );
        true
    }

    /// Current check-mark animation progress in `[0, 1]`, for drawing the
    /// header checkbox.
    pub fn check_progress(&self) -> f32 {
        *self.check_progress.lock()
    }

    // ===== Hover =====

    /// Drive the hover-emphasis fade toward lit (`true`) or unlit.
    pub fn set_hovered(&self, hovered: bool) {
        let repaint = self.repaint.clone();
        self.hover_channel
            .animate_intensity(self.hover_intensity.clone(), hovered, move || {
                repaint.emit(());
            });
    }

    /// Current hover emphasis in `[0, 255]`.
    pub fn hover_intensity(&self) -> i32 {
        *self.hover_intensity.lock()
    }

    // ===== Sort =====

    /// Walk the column's three-way sort cycle and re-order the display.
    ///
    /// Only one column sorts at a time; activating one resets the rest.
    /// Returns the column's new state.
    pub fn toggle_sort(&mut self, column: usize) -> Result<SortState> {
        let target = self
            .columns
            .get(column)
            .ok_or(GridError::InvalidColumn(column))?;
        if !target.sortable() {
            return Err(GridError::NotSortable(column));
        }

        let state = target.sort_state().cycled();
        for other in &mut self.columns {
            other.set_sort_state(SortState::None);
        }
        self.columns[column].set_sort_state(state);
        self.sort_column = (state != SortState::None).then_some(column);

        self.close_edit_internal();
        self.apply_sort();

        tracing::debug!(target: "trellis_grid::table", column, ?state, "sort toggled");
        self.sort_changed.emit(SortChange { column, state });
        self.repaint.emit(());
        Ok(state)
    }

    /// The actively sorted column and its direction, if any.
    pub fn active_sort(&self) -> Option<(usize, SortState)> {
        self.sort_column
            .and_then(|c| self.columns.get(c).map(|col| (c, col.sort_state())))
    }

    /// Recompute the display order from the active sort.
    ///
    /// Always sorts from source order, so returning to
    /// [`SortState::None`] restores the original order exactly.
    fn apply_sort(&mut self) {
        self.display_order = match self.active_sort() {
            Some((column, SortState::Ascending)) => {
                Some(sorted_order(&self.rows, column, true))
            }
            Some((column, SortState::Descending)) => {
                Some(sorted_order(&self.rows, column, false))
            }
            _ => None,
        };
    }

    // ===== Scrolling =====

    /// Scroll so the given body row's top aligns with the body viewport.
    pub fn scroll_line(&mut self, body: usize) -> Result<()> {
        if body >= self.body_count() {
            return Err(GridError::InvalidRow(body));
        }
        self.ensure_layout();
        let target = body as f32 * self.layout.row_height();
        let max = (self.layout.content().height - self.viewport.height).max(0.0);
        self.scrollbar.set_value_y(target.min(max));
        self.repaint.emit(());
        Ok(())
    }

    // ===== Clipboard =====

    /// Copy one body row as a tab-separated string.
    ///
    /// Cells without a text representation contribute an empty field. An
    /// invalid index fails before the clipboard is touched.
    pub fn copy_row(&self, body: usize) -> Result<()> {
        let row = self.body_row(body).ok_or(GridError::InvalidRow(body))?;
        let line = row
            .cells()
            .iter()
            .map(|c| c.display_text().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\t");
        self.clipboard.set_text(&line)
    }

    /// Copy one cell's text.
    ///
    /// Fails without touching the clipboard when the cell has no text
    /// representation (images).
    pub fn copy_cell(&self, body: usize, column: usize) -> Result<()> {
        let row = self.body_row(body).ok_or(GridError::InvalidRow(body))?;
        if column >= self.columns.len() {
            return Err(GridError::InvalidColumn(column));
        }
        let text = row
            .cell(column)
            .and_then(Cell::display_text)
            .ok_or(GridError::NoCellText)?;
        self.clipboard.set_text(&text)
    }

    // ===== Edit mode =====

    /// Enter edit mode on (body row, column).
    ///
    /// Closes any active session first, then computes the anchor from the
    /// column's band and the current scroll offsets and hands the session to
    /// the editor collaborator.
    pub fn enter_edit(&mut self, body: usize, column: usize) -> Result<()> {
        if column >= self.columns.len() {
            return Err(GridError::InvalidColumn(column));
        }
        if body >= self.body_count() {
            return Err(GridError::InvalidRow(body));
        }
        self.close_edit_internal();
        self.ensure_layout();

        let scroll = self.scroll_offset();
        let display = body + self.layout.body_offset();
        let anchor = edit::anchor(&self.layout, display, column, scroll)
            .ok_or(GridError::InvalidRow(body))?;

        self.edit = Some(EditSession {
            row: body,
            column,
            anchor,
        });
        self.edit_requested.emit(EditRequest {
            row: body,
            column,
            anchor,
            scroll,
        });
        self.repaint.emit(());
        Ok(())
    }

    /// Close the active edit session, if any. Idempotent.
    pub fn close_edit(&mut self) {
        if self.close_edit_internal() {
            self.repaint.emit(());
        }
    }

    fn close_edit_internal(&mut self) -> bool {
        self.edit.take().is_some()
    }

    pub fn edit_session(&self) -> Option<EditSession> {
        self.edit
    }

    // ===== Teardown =====

    /// Cancel all in-flight animation, close the edit session, and detach.
    ///
    /// Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.check_channel.cancel();
        self.hover_channel.cancel();
        self.close_edit_internal();
        // Detach the cells so copies handed out earlier stop notifying.
        for row in &mut self.rows {
            for column in 0..row.cell_count() {
                if let Some(cell) = row.cell_mut(column) {
                    cell.clear_hook();
                }
            }
        }
        tracing::debug!(target: "trellis_grid::table", "table disposed");
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Measurer used only for the pre-assignment empty layout.
struct NullMeasurer;

impl TextMeasurer for NullMeasurer {
    fn measure(&self, _text: &str, _font: &crate::view::metrics::FontSpec) -> Size {
        Size::ZERO
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::model::cell::{ImageCell, ProgressCell, attr};
    use crate::model::column::{ColumnWidth, FixedBand};
    use crate::model::source::{Record, RecordSet};
    use crate::view::clipboard::MemoryClipboard;
    use crate::view::metrics::FixedAdvanceMeasurer;
    use crate::view::scroll::SharedScrollState;

    struct Fixture {
        table: Table,
        clipboard: Arc<MemoryClipboard>,
        scrollbar: Arc<SharedScrollState>,
    }

    fn fixture() -> Fixture {
        let clipboard = Arc::new(MemoryClipboard::new());
        let scrollbar = Arc::new(SharedScrollState::new());
        let mut table = Table::new(
            Arc::new(FixedAdvanceMeasurer {
                advance: 10.0,
                line_height: 20.0,
            }),
            scrollbar.clone(),
            clipboard.clone(),
        );
        table.set_viewport(Size::new(400.0, 300.0));
        Fixture {
            table,
            clipboard,
            scrollbar,
        }
    }

    fn people() -> Arc<RecordSet> {
        Arc::new(
            RecordSet::new()
                .with_record(Record::new().with("name", "Al").with("age", "30"))
                .with_record(Record::new().with("name", "Bo").with("age", "25")),
        )
    }

    fn name_age_columns() -> Vec<Column> {
        vec![
            Column::new("name", "Name").with_sortable(true),
            Column::new("age", "Age").with_sortable(true),
        ]
    }

    fn body_text(table: &Table, body: usize, column: usize) -> String {
        table
            .cell(body, column)
            .and_then(Cell::display_text)
            .unwrap_or_default()
    }

    #[test]
    fn test_row_derivation_counts() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        assert_eq!(f.table.row_count(), 3);
        assert_eq!(f.table.body_count(), 2);
        for body in 0..2 {
            assert_eq!(f.table.body_row(body).unwrap().cell_count(), 2);
        }
        assert_eq!(f.table.header_row().cell_count(), 2);
    }

    #[test]
    fn test_missing_field_yields_empty_text_cell() {
        let mut f = fixture();
        f.table.set_columns(vec![
            Column::new("name", "Name"),
            Column::new("city", "City"),
        ]);
        f.table.set_data_source(people());

        assert_eq!(body_text(&f.table, 0, 1), "");
        assert!(matches!(f.table.cell(0, 1), Some(Cell::Text(_))));
    }

    #[test]
    fn test_same_key_column_replacement_keeps_rows() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        // Mutate derived state that a re-derivation would wipe out.
        f.table.set_row_checked(1, true).unwrap();
        if let Some(Cell::Text(cell)) = f.table.cell_mut(0, 0) {
            cell.set_text("edited");
        }

        // Same keys, different widths and titles: layout-only change.
        f.table.set_columns(vec![
            Column::new("name", "Full name").with_width(ColumnWidth::Absolute(200.0)),
            Column::new("age", "Age").with_width(ColumnWidth::Absolute(100.0)),
        ]);

        assert_eq!(body_text(&f.table, 0, 0), "edited");
        assert!(f.table.row_checked(1).unwrap());

        // Different keys: full re-derivation.
        f.table
            .set_columns(vec![Column::new("age", "Age"), Column::new("name", "Name")]);
        assert_eq!(body_text(&f.table, 0, 0), "30");
        assert!(!f.table.row_checked(1).unwrap());
    }

    #[test]
    fn test_header_inferred_from_source_when_columns_absent() {
        let mut f = fixture();
        f.table.set_data_source(people());

        assert_eq!(f.table.columns().len(), 2);
        assert_eq!(f.table.columns()[0].key(), "name");
        assert_eq!(f.table.columns()[1].key(), "age");
        assert_eq!(f.table.body_count(), 2);
    }

    #[test]
    fn test_empty_source_keeps_header_row() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(Arc::new(RecordSet::new()));

        assert_eq!(f.table.row_count(), 1);
        assert_eq!(f.table.body_count(), 0);

        f.table.set_show_header(false);
        assert_eq!(f.table.row_count(), 0);
    }

    #[test]
    fn test_same_source_reference_is_noop() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        let source = people();
        f.table.set_data_source(source.clone());

        f.table.set_row_checked(0, true).unwrap();
        f.table.set_data_source(source);
        // No re-derivation: the check survived.
        assert!(f.table.row_checked(0).unwrap());
    }

    #[test]
    fn test_overall_check_property() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(Arc::new(
            (0..5)
                .map(|i| Record::new().with("name", format!("p{i}")))
                .collect::<RecordSet>(),
        ));

        f.table.set_all_checked(true);
        assert_eq!(f.table.overall_check(), CheckState::Checked);
        for body in 0..5 {
            assert!(f.table.row_checked(body).unwrap());
        }

        f.table.set_row_checked(2, false).unwrap();
        assert_eq!(f.table.overall_check(), CheckState::PartiallyChecked);

        f.table.set_row_checked(2, true).unwrap();
        assert_eq!(f.table.overall_check(), CheckState::Checked);

        f.table.set_all_checked(false);
        assert_eq!(f.table.overall_check(), CheckState::Unchecked);
    }

    #[test]
    fn test_overall_signal_fires_synchronously() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        f.table.on_overall_check_changed().connect(move |&state| {
            seen_clone.lock().push(state);
        });

        f.table.set_row_checked(0, true).unwrap();
        f.table.set_row_checked(1, true).unwrap();
        f.table.set_all_checked(false);

        assert_eq!(
            *seen.lock(),
            vec![
                CheckState::PartiallyChecked,
                CheckState::Checked,
                CheckState::Unchecked
            ]
        );
    }

    #[test]
    fn test_sort_cycle_scenario() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        // Ascending by age: Bo (25) first.
        assert_eq!(f.table.toggle_sort(1).unwrap(), SortState::Ascending);
        assert_eq!(body_text(&f.table, 0, 0), "Bo");
        assert_eq!(body_text(&f.table, 1, 0), "Al");

        // Descending: Al first.
        assert_eq!(f.table.toggle_sort(1).unwrap(), SortState::Descending);
        assert_eq!(body_text(&f.table, 0, 0), "Al");

        // Back to none: original source order.
        assert_eq!(f.table.toggle_sort(1).unwrap(), SortState::None);
        assert_eq!(body_text(&f.table, 0, 0), "Al");
        assert_eq!(body_text(&f.table, 1, 0), "Bo");
        assert!(f.table.active_sort().is_none());
    }

    #[test]
    fn test_sort_exclusivity() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        f.table.toggle_sort(1).unwrap();
        f.table.toggle_sort(0).unwrap();

        assert_eq!(f.table.active_sort(), Some((0, SortState::Ascending)));
        assert_eq!(f.table.columns()[1].sort_state(), SortState::None);
    }

    #[test]
    fn test_sort_rejects_unsortable_and_invalid() {
        let mut f = fixture();
        f.table
            .set_columns(vec![Column::new("name", "Name"), Column::new("age", "Age").with_sortable(true)]);
        f.table.set_data_source(people());

        assert_eq!(f.table.toggle_sort(0), Err(GridError::NotSortable(0)));
        assert_eq!(f.table.toggle_sort(7), Err(GridError::InvalidColumn(7)));
    }

    #[test]
    fn test_copy_row_tab_separated() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        f.table.copy_row(1).unwrap();
        assert_eq!(f.clipboard.text().as_deref(), Some("Bo\t25"));
    }

    #[test]
    fn test_copy_invalid_row_leaves_clipboard_untouched() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(Arc::new(
            (0..3)
                .map(|i| Record::new().with("name", format!("p{i}")))
                .collect::<RecordSet>(),
        ));

        assert_eq!(f.table.copy_row(10), Err(GridError::InvalidRow(10)));
        assert!(f.clipboard.text().is_none());
    }

    #[test]
    fn test_copy_cell_variants() {
        let mut f = fixture();
        f.table.set_columns(vec![
            Column::new("done", "Done"),
            Column::new("pic", "Pic"),
        ]);
        f.table.set_data_source(Arc::new(RecordSet::new().with_record(
            Record::new()
                .with("done", ProgressCell::new(0.42))
                .with("pic", ImageCell::new("a.png")),
        )));

        f.table.copy_cell(0, 0).unwrap();
        assert_eq!(f.clipboard.text().as_deref(), Some("42%"));

        assert_eq!(f.table.copy_cell(0, 1), Err(GridError::NoCellText));
        // Failed copy left the previous content alone.
        assert_eq!(f.clipboard.text().as_deref(), Some("42%"));
    }

    #[test]
    fn test_edit_anchor_by_band() {
        let mut f = fixture();
        f.table.set_columns(vec![
            Column::new("pin", "P")
                .with_width(ColumnWidth::Absolute(60.0))
                .with_fixed(FixedBand::Left),
            Column::new("name", "Name").with_width(ColumnWidth::Absolute(500.0)),
        ]);
        f.table.set_data_source(people());
        f.table.layout();
        f.scrollbar.set_value_x(40.0);

        f.table.enter_edit(0, 0).unwrap();
        assert_eq!(f.table.edit_session().unwrap().anchor.left(), 0.0);

        f.table.enter_edit(0, 1).unwrap();
        assert_eq!(f.table.edit_session().unwrap().anchor.left(), -40.0);
    }

    #[test]
    fn test_edit_closes_on_sort_and_reload() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        f.table.enter_edit(0, 0).unwrap();
        assert!(f.table.edit_session().is_some());
        f.table.toggle_sort(1).unwrap();
        assert!(f.table.edit_session().is_none());

        f.table.enter_edit(0, 0).unwrap();
        f.table.set_columns(vec![Column::new("name", "Name")]);
        assert!(f.table.edit_session().is_none());

        f.table.enter_edit(0, 0).unwrap();
        f.table.set_data_source(people());
        assert!(f.table.edit_session().is_none());

        assert_eq!(f.table.enter_edit(9, 0), Err(GridError::InvalidRow(9)));
        f.table.close_edit();
        f.table.close_edit(); // idempotent
    }

    #[test]
    fn test_edit_request_carries_scroll() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());
        f.table.layout();

        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        f.table.on_edit_requested().connect(move |req| {
            *seen_clone.lock() = Some(*req);
        });

        f.table.enter_edit(1, 1).unwrap();
        let req: EditRequest = seen.lock().unwrap();
        assert_eq!(req.row, 1);
        assert_eq!(req.column, 1);
        assert_eq!(req.scroll, Point::ZERO);
    }

    #[test]
    fn test_cell_mutation_notifies_and_invalidates_width() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        let repaints = Arc::new(AtomicUsize::new(0));
        let repaints_clone = repaints.clone();
        f.table.on_repaint().connect(move |_| {
            repaints_clone.fetch_add(1, Ordering::SeqCst);
        });

        let before = f.table.layout().column(0).unwrap().width;

        if let Some(Cell::Text(cell)) = f.table.cell_mut(0, 0) {
            cell.set_text("a considerably longer name");
        }
        assert_eq!(repaints.load(Ordering::SeqCst), 1);

        let changes = f.table.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].attr, attr::TEXT);
        assert_eq!(changes[0].column, 0);

        // Width-affecting change re-runs width resolution.
        let after = f.table.layout().column(0).unwrap().width;
        assert!(after > before, "{after} should exceed {before}");

        // No-op write: no notification, no repaint.
        if let Some(Cell::Text(cell)) = f.table.cell_mut(0, 0) {
            cell.set_text("a considerably longer name");
        }
        assert_eq!(repaints.load(Ordering::SeqCst), 1);
        assert!(f.table.take_changes().is_empty());
    }

    #[test]
    fn test_scroll_line_clamps_and_validates() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(Arc::new(
            (0..50)
                .map(|i| Record::new().with("name", format!("p{i}")))
                .collect::<RecordSet>(),
        ));
        f.table.layout();

        f.table.scroll_line(10).unwrap();
        assert_eq!(f.scrollbar.value_y(), 400.0);

        // Near the end: clamped to the maximum offset.
        f.table.scroll_line(49).unwrap();
        let max = f.table.layout().content().height - 300.0;
        assert_eq!(f.scrollbar.value_y(), max);

        assert_eq!(f.table.scroll_line(50), Err(GridError::InvalidRow(50)));
    }

    #[test]
    fn test_dispose_cancels_animations() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        let scheduler = f.table.scheduler();
        f.table.set_all_checked(true);
        f.table.set_hovered(true);
        assert_eq!(scheduler.active_count(), 2);

        f.table.dispose();
        f.table.dispose(); // idempotent
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_check_animation_runs_to_completion() {
        let mut f = fixture();
        f.table.set_columns(name_age_columns());
        f.table.set_data_source(people());

        f.table.set_all_checked(true);
        assert_eq!(f.table.check_progress(), 0.0);

        let scheduler = f.table.scheduler();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        while scheduler.active_count() > 0 && std::time::Instant::now() < deadline {
            scheduler.process_ready();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        assert_eq!(f.table.check_progress(), 1.0);
    }

    #[test]
    fn test_structural_changes_are_logged() {
        struct BufferWriter(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for BufferWriter {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || BufferWriter(sink.clone()))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut f = fixture();
            f.table.set_columns(name_age_columns());
            f.table.set_data_source(people());
            f.table.toggle_sort(0).unwrap();
        });

        let output = String::from_utf8(buffer.lock().clone()).unwrap();
        assert!(output.contains("re-deriving rows"), "{output:?}");
        assert!(output.contains("sort toggled"), "{output:?}");
    }
}
