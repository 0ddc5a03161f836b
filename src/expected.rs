//! Expected counts under the independence hypothesis.
//!
//! For row totals Rᵢ, column totals Cⱼ and grand total N:
//!
//! ```text
//! Eᵢⱼ = Rᵢ · Cⱼ / N
//! ```
//!
//! Row and column sums of the expected table reproduce the observed
//! marginals. Values are kept unrounded; rounding is a presentation concern.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::table::{ContingencyTable, Table};

/// Expected counts, same shape and labels as the observed table.
pub type ExpectedTable = Table<f64>;

/// Derive the expected-count table from observed counts.
///
/// # Errors
///
/// Returns [`Error::NoData`] when the grand total is zero.
///
/// # Example
///
/// ```
/// use contingency::{expected, Table};
/// use ndarray::array;
///
/// let observed = Table::new(
///     vec!["a".into(), "b".into()],
///     vec!["x".into(), "y".into()],
///     array![[2u64, 0], [0, 1]],
/// )
/// .unwrap();
///
/// let table = expected::derive(&observed).unwrap();
/// assert!((table.get(0, 0).unwrap() - 4.0 / 3.0).abs() < 1e-12);
/// ```
pub fn derive(observed: &ContingencyTable) -> Result<ExpectedTable> {
    let marginals = observed.annotate();
    let grand_total = *marginals.grand_total();
    if grand_total == 0 {
        return Err(Error::NoData);
    }

    let n = grand_total as f64;
    let row_totals = marginals.row_totals();
    let column_totals = marginals.column_totals();

    let cells = Array2::from_shape_fn(observed.shape(), |(i, j)| {
        row_totals[i] as f64 * column_totals[j] as f64 / n
    });

    log::debug!("derived expected counts for {:?} table, N = {grand_total}", observed.shape());

    Table::new(
        observed.row_labels().to_vec(),
        observed.column_labels().to_vec(),
        cells,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labelled(cells: Array2<u64>) -> ContingencyTable {
        let rows = (0..cells.nrows()).map(|i| format!("r{i}")).collect();
        let columns = (0..cells.ncols()).map(|j| format!("c{j}")).collect();
        Table::new(rows, columns, cells).unwrap()
    }

    #[test]
    fn test_scenario_expected_value() {
        // Jóvenes/Terror = 2, Adultos/Drama = 1
        let observed = labelled(array![[2, 0, 0], [0, 0, 1], [0, 0, 0]]);
        let expected = derive(&observed).unwrap();

        assert!((expected.get(0, 0).unwrap() - 4.0 / 3.0).abs() < 1e-12);
        assert!((expected.get(1, 2).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((expected.get(0, 2).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        // Empty row yields zero expectations
        assert_eq!(expected.get(2, 1), Some(&0.0));
    }

    #[test]
    fn test_marginals_match_observed() {
        let observed = labelled(array![[12, 7, 3], [5, 9, 14], [8, 2, 6], [1, 0, 4]]);
        let expected = derive(&observed).unwrap().annotate();
        let observed = observed.annotate();

        for (e, &o) in expected.row_totals().iter().zip(observed.row_totals()) {
            assert!((e - o as f64).abs() < 1e-9);
        }
        for (e, &o) in expected.column_totals().iter().zip(observed.column_totals()) {
            assert!((e - o as f64).abs() < 1e-9);
        }
        assert!((expected.grand_total() - *observed.grand_total() as f64).abs() < 1e-9);
    }

    #[test]
    fn test_labels_are_preserved() {
        let observed = labelled(array![[1, 2], [3, 4]]);
        let expected = derive(&observed).unwrap();
        assert!(observed.ensure_aligned(&expected).is_ok());
    }

    #[test]
    fn test_zero_grand_total_is_no_data() {
        let observed = labelled(Array2::zeros((3, 3)));
        assert_eq!(derive(&observed), Err(Error::NoData));
    }
}
