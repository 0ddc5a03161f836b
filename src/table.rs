//! Labelled two-way tables and their marginal annotation.
//!
//! - [`Table`]: a labelled `rows × columns` grid backed by [`ndarray::Array2`]
//! - [`AnnotatedTable`]: a table plus its "Total" column, "Total" row and
//!   grand total
//! - [`ContingencyTable`]: observed counts, built from classified cells
//!
//! Row and column order always follows the declaration order of the
//! [`CategoryScheme`], never the order in which data was seen.

use std::fmt;
use std::ops::Add;

use ndarray::Array2;

use crate::category::CategoryScheme;
use crate::classify::{Cell, Record};
use crate::error::{Error, Result};

/// Label used for the marginal row and column.
pub const TOTAL_LABEL: &str = "Total";

/// Observed counts indexed by (row category, column category).
pub type ContingencyTable = Table<u64>;

/// A labelled two-way table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table<T> {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    cells: Array2<T>,
}

impl<T> Table<T> {
    /// Create a table from labels and a matching cell grid.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the grid is not `row_labels × column_labels`.
    pub fn new(
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        cells: Array2<T>,
    ) -> Result<Self> {
        let expected = (row_labels.len(), column_labels.len());
        if cells.dim() != expected {
            return Err(Error::ShapeMismatch {
                expected: format!("{}x{}", expected.0, expected.1),
                actual: format!("{}x{}", cells.nrows(), cells.ncols()),
            });
        }
        Ok(Self {
            row_labels,
            column_labels,
            cells,
        })
    }

    /// Row labels in declaration order.
    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Column labels in declaration order.
    #[must_use]
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// The underlying cell grid.
    #[must_use]
    pub fn cells(&self) -> &Array2<T> {
        &self.cells
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Cell at `(row, column)`.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        self.cells.get((row, column))
    }

    /// Cell addressed by its category names.
    #[must_use]
    pub fn get_by_label(&self, row: &str, column: &str) -> Option<&T> {
        let r = self.row_labels.iter().position(|l| l == row)?;
        let c = self.column_labels.iter().position(|l| l == column)?;
        self.get(r, c)
    }

    /// Check that `other` has the same labels, in the same order.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` describing the first difference.
    pub fn ensure_aligned<U>(&self, other: &Table<U>) -> Result<()> {
        if self.shape() != other.shape() {
            let (r, c) = self.shape();
            let (or, oc) = other.shape();
            return Err(Error::ShapeMismatch {
                expected: format!("{r}x{c}"),
                actual: format!("{or}x{oc}"),
            });
        }
        if self.row_labels != other.row_labels {
            return Err(Error::ShapeMismatch {
                expected: format!("rows {:?}", self.row_labels),
                actual: format!("rows {:?}", other.row_labels),
            });
        }
        if self.column_labels != other.column_labels {
            return Err(Error::ShapeMismatch {
                expected: format!("columns {:?}", self.column_labels),
                actual: format!("columns {:?}", other.column_labels),
            });
        }
        Ok(())
    }

    /// Build a new table of the same labels by applying `f` to every cell.
    #[must_use]
    pub fn map<U, F>(&self, f: F) -> Table<U>
    where
        F: FnMut(&T) -> U,
    {
        Table {
            row_labels: self.row_labels.clone(),
            column_labels: self.column_labels.clone(),
            cells: self.cells.map(f),
        }
    }
}

impl<T> Table<T>
where
    T: Copy + Default + Add<Output = T>,
{
    /// Add the "Total" column, "Total" row and grand total.
    ///
    /// Totals are recomputed from this table's own cells.
    #[must_use]
    pub fn annotate(&self) -> AnnotatedTable<T> {
        let row_totals: Vec<T> = self
            .cells
            .rows()
            .into_iter()
            .map(|row| row.iter().fold(T::default(), |acc, &v| acc + v))
            .collect();
        let column_totals: Vec<T> = self
            .cells
            .columns()
            .into_iter()
            .map(|column| column.iter().fold(T::default(), |acc, &v| acc + v))
            .collect();
        let grand_total = self.cells.iter().fold(T::default(), |acc, &v| acc + v);

        AnnotatedTable {
            table: self.clone(),
            row_totals,
            column_totals,
            grand_total,
        }
    }
}

impl Table<u64> {
    /// Count classified cells into a table shaped by `scheme`.
    ///
    /// Every declared `(row, column)` starts at zero, so unobserved
    /// combinations are present. Cells outside the scheme are dropped.
    #[must_use]
    pub fn from_cells<I>(scheme: &CategoryScheme, cells: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut counts = Array2::<u64>::zeros(scheme.shape());
        let mut dropped = 0usize;

        for cell in cells {
            match counts.get_mut((cell.row, cell.column)) {
                Some(count) => *count += 1,
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::warn!(
                "dropped {dropped} cells outside the {:?} scheme shape",
                scheme.shape()
            );
        }

        Self {
            row_labels: scheme.rows().names(),
            column_labels: scheme.columns().names(),
            cells: counts,
        }
    }
}

impl Table<f64> {
    /// Round every cell to `decimals` digits, for presentation.
    #[must_use]
    pub fn rounded(&self, decimals: u32) -> Self {
        self.map(|&v| round_to(v, decimals))
    }
}

/// Classify `records` with `scheme` and count them.
///
/// Unrecognized records are dropped. An empty or fully unrecognized input
/// yields an all-zero table.
///
/// # Example
///
/// ```
/// use contingency::{tabulate, Record, SchemeBuilder};
///
/// let scheme = SchemeBuilder::new()
///     .row_category("A")
///     .row_category("B")
///     .column_category("X", ["X"])
///     .column_category("Y", ["Y"])
///     .build()
///     .unwrap();
///
/// let records = [Record::new("A", "X"), Record::new("A", "X"), Record::new("C", "Y")];
/// let observed = tabulate(&scheme, &records);
///
/// assert_eq!(observed.get_by_label("A", "X"), Some(&2));
/// assert_eq!(observed.get_by_label("B", "Y"), Some(&0));
/// ```
#[must_use]
pub fn tabulate<'a, I>(scheme: &CategoryScheme, records: I) -> ContingencyTable
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = 0usize;
    let cells: Vec<Cell> = records
        .into_iter()
        .inspect(|_| seen += 1)
        .filter_map(|record| scheme.classify_record(record))
        .collect();

    log::debug!(
        "classified {} of {} records ({} dropped)",
        cells.len(),
        seen,
        seen - cells.len()
    );

    Table::from_cells(scheme, cells)
}

/// A table annotated with its marginal totals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotatedTable<T> {
    table: Table<T>,
    row_totals: Vec<T>,
    column_totals: Vec<T>,
    grand_total: T,
}

impl<T> AnnotatedTable<T> {
    /// The table without totals.
    #[must_use]
    pub fn table(&self) -> &Table<T> {
        &self.table
    }

    /// The "Total" column: one sum per row.
    #[must_use]
    pub fn row_totals(&self) -> &[T] {
        &self.row_totals
    }

    /// The "Total" row: one sum per column.
    #[must_use]
    pub fn column_totals(&self) -> &[T] {
        &self.column_totals
    }

    /// Sum of all cells, the corner of the "Total" row and column.
    #[must_use]
    pub fn grand_total(&self) -> &T {
        &self.grand_total
    }
}

impl<T: Copy> AnnotatedTable<T> {
    /// The full grid including the "Total" row and column, row-major.
    #[must_use]
    pub fn to_grid(&self) -> Vec<Vec<T>> {
        let mut grid: Vec<Vec<T>> = self
            .table
            .cells
            .rows()
            .into_iter()
            .zip(&self.row_totals)
            .map(|(row, &total)| row.iter().copied().chain(std::iter::once(total)).collect())
            .collect();
        grid.push(
            self.column_totals
                .iter()
                .copied()
                .chain(std::iter::once(self.grand_total))
                .collect(),
        );
        grid
    }
}

impl<T: Default + PartialEq> AnnotatedTable<T> {
    /// True when the grand total is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grand_total == T::default()
    }
}

impl AnnotatedTable<f64> {
    /// Round every cell and total to `decimals` digits, for presentation.
    ///
    /// Totals are rounded independently rather than recomputed from rounded
    /// cells.
    #[must_use]
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            table: self.table.rounded(decimals),
            row_totals: self.row_totals.iter().map(|&v| round_to(v, decimals)).collect(),
            column_totals: self
                .column_totals
                .iter()
                .map(|&v| round_to(v, decimals))
                .collect(),
            grand_total: round_to(self.grand_total, decimals),
        }
    }
}

/// Render as an aligned text grid. A precision (`{:.2}`) applies to every
/// value.
impl<T: fmt::Display + Copy> fmt::Display for AnnotatedTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision();
        let render = |v: &T| match precision {
            Some(p) => format!("{v:.p$}"),
            None => v.to_string(),
        };

        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.table.column_labels.iter().cloned());
        header.push(TOTAL_LABEL.to_string());

        let mut lines: Vec<Vec<String>> = vec![header];
        let labels = self
            .table
            .row_labels
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(TOTAL_LABEL));
        for (label, row) in labels.zip(self.to_grid()) {
            let mut line = vec![label.to_string()];
            line.extend(row.iter().map(&render));
            lines.push(line);
        }

        let columns = lines[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|c| lines.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
            .collect();

        for line in &lines {
            let mut out = String::new();
            for (c, value) in line.iter().enumerate() {
                let pad = widths[c] - value.chars().count();
                if c == 0 {
                    out.push_str(value);
                    out.push_str(&" ".repeat(pad));
                } else {
                    out.push_str("  ");
                    out.push_str(&" ".repeat(pad));
                    out.push_str(value);
                }
            }
            writeln!(f, "{}", out.trim_end())?;
        }
        Ok(())
    }
}

/// Round half away from zero to `decimals` digits.
///
/// Returns `value` unchanged when the scale factor is not representable.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let Ok(exponent) = i32::try_from(decimals) else {
        return value;
    };
    let factor = 10f64.powi(exponent);
    if !factor.is_finite() {
        return value;
    }
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemeBuilder;
    use ndarray::array;

    fn scheme() -> CategoryScheme {
        SchemeBuilder::new()
            .row_category("Jóvenes")
            .row_category("Adultos")
            .row_category("Adultos mayores")
            .column_category("Terror", ["Terror"])
            .column_category("Comedia", ["Comedia"])
            .column_category("Drama", ["Drama"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_from_cells_zero_fills_declared_cells() {
        let scheme = scheme();
        let table = ContingencyTable::from_cells(
            &scheme,
            vec![Cell { row: 0, column: 0 }, Cell { row: 0, column: 0 }],
        );
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.get(0, 0), Some(&2));
        assert_eq!(table.cells().iter().sum::<u64>(), 2);
        assert_eq!(table.row_labels(), scheme.rows().names().as_slice());
    }

    #[test]
    fn test_from_cells_drops_out_of_range() {
        let scheme = scheme();
        let table = ContingencyTable::from_cells(
            &scheme,
            vec![Cell { row: 5, column: 0 }, Cell { row: 1, column: 2 }],
        );
        assert_eq!(table.cells().iter().sum::<u64>(), 1);
        assert_eq!(table.get_by_label("Adultos", "Drama"), Some(&1));
    }

    #[test]
    fn test_tabulate_scenario() {
        let scheme = scheme();
        let records = vec![
            Record::new("Jóvenes", "Terror"),
            Record::new("Jóvenes", "Terror"),
            Record::new("Adultos", "Drama"),
            Record::new("Adultos", "Documental"),
        ];
        let table = tabulate(&scheme, &records);

        assert_eq!(table.get_by_label("Jóvenes", "Terror"), Some(&2));
        assert_eq!(table.get_by_label("Adultos", "Drama"), Some(&1));
        assert_eq!(table.cells().iter().filter(|&&v| v == 0).count(), 7);
    }

    #[test]
    fn test_annotate_marginals() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into(), "z".into()],
            array![[1u64, 2, 3], [4, 5, 6]],
        )
        .unwrap();
        let annotated = table.annotate();

        assert_eq!(annotated.row_totals(), [6, 15]);
        assert_eq!(annotated.column_totals(), [5, 7, 9]);
        assert_eq!(*annotated.grand_total(), 21);
        assert_eq!(
            annotated.row_totals().iter().sum::<u64>(),
            *annotated.grand_total()
        );
        assert_eq!(
            annotated.column_totals().iter().sum::<u64>(),
            *annotated.grand_total()
        );

        let grid = annotated.to_grid();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![1, 2, 3, 6]);
        assert_eq!(grid[2], vec![5, 7, 9, 21]);
    }

    #[test]
    fn test_empty_table_is_detectable() {
        let table = tabulate(&scheme(), std::iter::empty::<&Record>());
        let annotated = table.annotate();
        assert!(annotated.is_empty());
        assert_eq!(*annotated.grand_total(), 0);
        assert_eq!(annotated.row_totals(), [0, 0, 0]);
    }

    #[test]
    fn test_new_rejects_bad_shape() {
        let result = Table::new(vec!["a".into()], vec!["x".into()], array![[1u64, 2]]);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_ensure_aligned() {
        let a = Table::new(
            vec!["a".into(), "b".into()],
            vec!["x".into()],
            array![[1u64], [2]],
        )
        .unwrap();
        let b = a.map(|&v| v as f64);
        assert!(a.ensure_aligned(&b).is_ok());

        let swapped = Table::new(
            vec!["b".into(), "a".into()],
            vec!["x".into()],
            array![[2.0], [1.0]],
        )
        .unwrap();
        assert!(a.ensure_aligned(&swapped).is_err());
    }

    #[test]
    fn test_rounded() {
        let table = Table::new(
            vec!["a".into()],
            vec!["x".into(), "y".into()],
            array![[1.333_333, 0.666_667]],
        )
        .unwrap();
        let annotated = table.annotate().rounded(2);
        assert_eq!(annotated.table().get(0, 0), Some(&1.33));
        assert_eq!(annotated.table().get(0, 1), Some(&0.67));
        assert_eq!(*annotated.grand_total(), 2.0);
    }

    #[test]
    fn test_round_to_excessive_decimals() {
        assert_eq!(round_to(0.0, 400), 0.0);
        assert_eq!(round_to(1.25, 400), 1.25);
        assert_eq!(round_to(4.0 / 3.0, u32::MAX), 4.0 / 3.0);
        assert_eq!(round_to(4.0 / 3.0, 2), 1.33);
    }

    #[test]
    fn test_display() {
        let table = Table::new(
            vec!["Jóvenes".into(), "Adultos".into()],
            vec!["Terror".into(), "Drama".into()],
            array![[2u64, 0], [0, 1]],
        )
        .unwrap();
        let text = table.annotate().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("Total"));
        assert!(lines[1].starts_with("Jóvenes"));
        assert!(lines[3].starts_with("Total"));
        assert!(lines[3].ends_with('3'));

        let expected = table.map(|&v| v as f64 / 3.0).annotate();
        let text = format!("{expected:.2}");
        assert!(text.contains("0.67"));
        assert!(text.contains("1.00"));
    }
}
