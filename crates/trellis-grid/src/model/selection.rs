//! Tri-state selection derivation.
//!
//! Each body row carries a plain boolean check flag; the header checkbox's
//! tri-state is derived from all of them and never stored independently.

use crate::model::row::Row;

/// The state of a tri-state checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    /// Fully unchecked.
    #[default]
    Unchecked,
    /// Fully checked.
    Checked,
    /// Some but not all rows are checked. Valid only for the derived
    /// overall state, never for a single row.
    PartiallyChecked,
}

/// Derive the overall header state from the body rows.
///
/// Checked iff every body row is checked, Unchecked iff none is (including
/// the empty table), PartiallyChecked otherwise.
pub fn overall_state(rows: &[Row]) -> CheckState {
    let mut any = false;
    let mut all = true;
    for row in rows.iter().filter(|r| !r.is_header()) {
        if row.checked() {
            any = true;
        } else {
            all = false;
        }
    }
    match (any, all) {
        (false, _) => CheckState::Unchecked,
        (true, true) => CheckState::Checked,
        (true, false) => CheckState::PartiallyChecked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell::Cell;

    fn rows(checked: &[bool]) -> Vec<Row> {
        let mut out = vec![Row::header(vec![Cell::from("h")])];
        for (i, &c) in checked.iter().enumerate() {
            let mut row = Row::body(i, vec![Cell::from("x")]);
            row.set_checked(c);
            out.push(row);
        }
        out
    }

    #[test]
    fn test_overall_derivation() {
        assert_eq!(overall_state(&rows(&[])), CheckState::Unchecked);
        assert_eq!(overall_state(&rows(&[false, false])), CheckState::Unchecked);
        assert_eq!(overall_state(&rows(&[true, true])), CheckState::Checked);
        assert_eq!(
            overall_state(&rows(&[true, false])),
            CheckState::PartiallyChecked
        );
    }

    #[test]
    fn test_header_row_is_ignored() {
        // All body rows checked; the unchecked header must not demote the
        // overall state.
        let all_checked = rows(&[true, true, true]);
        assert_eq!(overall_state(&all_checked), CheckState::Checked);
    }
}
