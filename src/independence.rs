//! Chi-square contributions, statistic, degrees of freedom and decision.
//!
//! Each cell contributes (O - E)² / E. A cell with E = 0 contributes 0; for
//! an expected table derived from the observed marginals this only happens
//! when O = 0 as well. A cell with O > 0 and E = 0 means the two tables do
//! not describe the same data, so it is recorded as a [`CellWarning`].
//!
//! The p-value depends on an optional [`ChiSquareTail`] engine. When no
//! engine is available the statistic and degrees of freedom are still
//! reported and the p-value is marked [`PValue::Unavailable`].

use std::fmt;

use crate::category::Axis;
use crate::error::{Error, Result};
use crate::expected::ExpectedTable;
use crate::table::{AnnotatedTable, ContingencyTable, Table};

/// Significance level used when none is configured.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Per-cell chi-square contributions.
pub type ContributionTable = Table<f64>;

/// Upper-tail probability of the chi-square distribution.
///
/// Implementors compute P(X ≥ `statistic`) for X ~ χ²(`degrees_of_freedom`).
pub trait ChiSquareTail {
    /// Evaluate the survival function.
    ///
    /// # Errors
    ///
    /// Returns an error if the distribution cannot be evaluated.
    fn upper_tail(&self, statistic: f64, degrees_of_freedom: usize) -> Result<f64>;
}

/// The built-in engine, if the `pvalue` feature is enabled.
#[must_use]
pub fn builtin_engine() -> Option<&'static dyn ChiSquareTail> {
    #[cfg(feature = "pvalue")]
    {
        Some(&crate::distribution::IncompleteGamma)
    }
    #[cfg(not(feature = "pvalue"))]
    {
        None
    }
}

/// A cell with observations but zero expected count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellWarning {
    /// Row label.
    pub row: String,
    /// Column label.
    pub column: String,
    /// Observed count in the cell.
    pub observed: u64,
}

impl fmt::Display for CellWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell ({}, {}) has {} observations but an expected count of 0",
            self.row, self.column, self.observed
        )
    }
}

/// Contribution table plus any inconsistencies found while computing it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contributions {
    table: ContributionTable,
    warnings: Vec<CellWarning>,
}

impl Contributions {
    /// The per-cell contributions.
    #[must_use]
    pub fn table(&self) -> &ContributionTable {
        &self.table
    }

    /// Cells with O > 0 and E = 0.
    #[must_use]
    pub fn warnings(&self) -> &[CellWarning] {
        &self.warnings
    }

    /// The chi-square statistic: the sum of all cell contributions.
    #[must_use]
    pub fn statistic(&self) -> f64 {
        self.table.cells().sum()
    }

    /// Contributions with row, column and grand totals.
    #[must_use]
    pub fn annotate(&self) -> AnnotatedTable<f64> {
        self.table.annotate()
    }

    pub(crate) fn into_parts(self) -> (ContributionTable, Vec<CellWarning>) {
        (self.table, self.warnings)
    }
}

/// Compute (O - E)² / E for every cell.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the tables differ in shape or labels.
pub fn contributions(
    observed: &ContingencyTable,
    expected: &ExpectedTable,
) -> Result<Contributions> {
    observed.ensure_aligned(expected)?;

    let mut warnings = Vec::new();
    for ((i, j), &e) in expected.cells().indexed_iter() {
        let o = observed.cells()[(i, j)];
        if e == 0.0 && o > 0 {
            let warning = CellWarning {
                row: observed.row_labels()[i].clone(),
                column: observed.column_labels()[j].clone(),
                observed: o,
            };
            log::warn!("{warning}; its contribution is counted as 0");
            warnings.push(warning);
        }
    }

    let cells = ndarray::Zip::from(observed.cells())
        .and(expected.cells())
        .map_collect(|&o, &e| cell_contribution(o, e));

    Ok(Contributions {
        table: Table::new(
            observed.row_labels().to_vec(),
            observed.column_labels().to_vec(),
            cells,
        )?,
        warnings,
    })
}

fn cell_contribution(observed: u64, expected: f64) -> f64 {
    if expected == 0.0 {
        return 0.0;
    }
    let diff = observed as f64 - expected;
    diff * diff / expected
}

/// Degrees of freedom of a `rows × columns` test: (r - 1)(c - 1).
///
/// # Errors
///
/// Returns `InsufficientCategories` if either dimension is below 2.
///
/// ```
/// use contingency::degrees_of_freedom;
///
/// assert_eq!(degrees_of_freedom(3, 3).unwrap(), 4);
/// assert!(degrees_of_freedom(1, 3).is_err());
/// ```
pub fn degrees_of_freedom(rows: usize, columns: usize) -> Result<usize> {
    if rows < 2 {
        return Err(Error::InsufficientCategories {
            axis: Axis::Rows,
            count: rows,
        });
    }
    if columns < 2 {
        return Err(Error::InsufficientCategories {
            axis: Axis::Columns,
            count: columns,
        });
    }
    Ok((rows - 1) * (columns - 1))
}

/// Why a p-value could not be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unavailable {
    /// The table had no observations; the statistic is undefined.
    NoData,
    /// No chi-square tail engine is available.
    EngineMissing,
    /// The engine failed to evaluate the distribution.
    EngineFailed(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data"),
            Self::EngineMissing => f.write_str("no chi-square engine available"),
            Self::EngineFailed(message) => write!(f, "engine failed: {message}"),
        }
    }
}

/// A p-value, or the reason it is missing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PValue {
    /// Computed probability in [0, 1].
    Computed(f64),
    /// Not computed.
    Unavailable(Unavailable),
}

impl PValue {
    /// The probability, if computed.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Computed(p) => Some(*p),
            Self::Unavailable(_) => None,
        }
    }

    /// True if the p-value was computed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

/// Compute the p-value of `statistic` with `engine`.
///
/// Engine absence or failure is reported in the returned value, never as an
/// error.
#[must_use]
pub fn p_value(
    statistic: f64,
    degrees_of_freedom: usize,
    engine: Option<&dyn ChiSquareTail>,
) -> PValue {
    let Some(engine) = engine else {
        log::debug!("no chi-square engine available, p-value not computed");
        return PValue::Unavailable(Unavailable::EngineMissing);
    };

    match engine.upper_tail(statistic, degrees_of_freedom) {
        Ok(p) if (0.0..=1.0).contains(&p) => PValue::Computed(p),
        Ok(p) => {
            log::warn!("chi-square engine returned {p}, outside [0, 1]");
            PValue::Unavailable(Unavailable::EngineFailed(format!(
                "probability {p} outside [0, 1]"
            )))
        }
        Err(err) => {
            log::warn!("p-value not computed: {err}");
            PValue::Unavailable(Unavailable::EngineFailed(err.to_string()))
        }
    }
}

/// Outcome of the test at a significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// p < alpha: the variables are associated.
    Reject,
    /// p >= alpha: no evidence of association.
    FailToReject,
    /// No p-value.
    Undetermined,
}

impl Decision {
    /// Decide at significance level `alpha`.
    #[must_use]
    pub fn at(p_value: &PValue, alpha: f64) -> Self {
        match p_value.value() {
            Some(p) if p < alpha => Self::Reject,
            Some(_) => Self::FailToReject,
            None => Self::Undetermined,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject independence"),
            Self::FailToReject => f.write_str("fail to reject independence"),
            Self::Undetermined => f.write_str("undetermined"),
        }
    }
}

/// Summary of a chi-square test of independence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    /// The statistic, `None` when undefined (no data).
    pub statistic: Option<f64>,
    /// (rows - 1)(columns - 1).
    pub degrees_of_freedom: usize,
    /// The p-value or why it is missing.
    pub p_value: PValue,
    /// Decision at `significance_level`.
    pub decision: Decision,
    /// Significance level the decision was taken at.
    pub significance_level: f64,
}

impl TestResult {
    /// Evaluate a computed statistic.
    #[must_use]
    pub fn evaluate(
        statistic: f64,
        degrees_of_freedom: usize,
        significance_level: f64,
        engine: Option<&dyn ChiSquareTail>,
    ) -> Self {
        let p_value = p_value(statistic, degrees_of_freedom, engine);
        let decision = Decision::at(&p_value, significance_level);
        Self {
            statistic: Some(statistic),
            degrees_of_freedom,
            p_value,
            decision,
            significance_level,
        }
    }

    /// The result for a table without observations.
    #[must_use]
    pub fn undefined(degrees_of_freedom: usize, significance_level: f64) -> Self {
        Self {
            statistic: None,
            degrees_of_freedom,
            p_value: PValue::Unavailable(Unavailable::NoData),
            decision: Decision::Undetermined,
            significance_level,
        }
    }
}
