//! Sort engine.
//!
//! Sorting never reorders the row array itself; it produces an ordering of
//! body-row indices that the table applies as its display order. The sort is
//! stable over the rows' derivation (source) order, so cycling a column back
//! to [`SortState::None`](crate::model::column::SortState::None) restores the
//! original order exactly and equal keys never swap.

use std::cmp::Ordering;

use crate::model::cell::Cell;
use crate::model::row::Row;

/// A cell's value under its natural ordering.
///
/// Progress cells order numerically; every other variant orders
/// lexicographically on its display text (an image cell contributes the
/// empty string).
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
}

impl SortValue {
    /// Total ordering: numbers compare numerically, everything else
    /// compares as text, and a number orders before text.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Extract a cell's sort value.
pub fn sort_value(cell: &Cell) -> SortValue {
    match cell {
        Cell::Progress(p) => SortValue::Number(f64::from(p.value())),
        other => SortValue::Text(other.display_text().unwrap_or_default()),
    }
}

/// Compute the display order of body rows sorted by `column`.
///
/// `rows` is the full derived row array (header included); the result holds
/// indices into it, body rows only, stable over their current order. A row
/// missing the column contributes an empty text key.
pub fn sorted_order(rows: &[Row], column: usize, ascending: bool) -> Vec<usize> {
    let mut keyed: Vec<(usize, SortValue)> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.is_header())
        .map(|(index, row)| {
            let value = row
                .cell(column)
                .map(sort_value)
                .unwrap_or(SortValue::Text(String::new()));
            (index, value)
        })
        .collect();

    keyed.sort_by(|(_, a), (_, b)| {
        let ord = a.compare(b);
        if ascending { ord } else { ord.reverse() }
    });
    tracing::debug!(
        target: "trellis_grid::sort",
        column,
        ascending,
        rows = keyed.len(),
        "computed sort order"
    );

    keyed.into_iter().map(|(index, _)| index).collect()
}
