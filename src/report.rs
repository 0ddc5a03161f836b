//! Result assembly and presentation.
//!
//! A [`ChiSquareReport`] bundles the observed, expected and contribution
//! tables (each with totals) and the [`TestResult`]. It holds unrounded
//! values; [`RoundingPolicy`] is applied only by the presentation helpers
//! ([`ChiSquareReport::sheets`] and the `Display` impl).
//!
//! Persisting a report is delegated to a [`ReportSink`]. A failing sink
//! never invalidates the report it was given.

use std::fmt;

use crate::config::RoundingPolicy;
use crate::error::{Error, Result};
use crate::independence::{CellWarning, PValue, TestResult};
use crate::table::{round_to, AnnotatedTable, TOTAL_LABEL};

/// Sheet name of the observed table.
pub const OBSERVED_SHEET: &str = "observed_with_totals";
/// Sheet name of the expected table.
pub const EXPECTED_SHEET: &str = "expected_with_totals";
/// Sheet name of the contribution table.
pub const CONTRIBUTIONS_SHEET: &str = "contributions_with_totals";
/// Sheet name of the summary record.
pub const SUMMARY_SHEET: &str = "summary";

/// Complete, immutable result of a chi-square analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChiSquareReport {
    observed: AnnotatedTable<u64>,
    expected: Option<AnnotatedTable<f64>>,
    contributions: Option<AnnotatedTable<f64>>,
    result: TestResult,
    warnings: Vec<CellWarning>,
    rounding: RoundingPolicy,
}

/// Package annotated tables and the test result into a report.
///
/// `expected` and `contributions` are `None` when the statistic is
/// undefined (no data).
#[must_use]
pub fn assemble(
    observed: AnnotatedTable<u64>,
    expected: Option<AnnotatedTable<f64>>,
    contributions: Option<AnnotatedTable<f64>>,
    result: TestResult,
    warnings: Vec<CellWarning>,
    rounding: RoundingPolicy,
) -> ChiSquareReport {
    ChiSquareReport {
        observed,
        expected,
        contributions,
        result,
        warnings,
        rounding,
    }
}

impl ChiSquareReport {
    /// Observed counts with totals.
    #[must_use]
    pub fn observed(&self) -> &AnnotatedTable<u64> {
        &self.observed
    }

    /// Unrounded expected counts with totals.
    #[must_use]
    pub fn expected(&self) -> Option<&AnnotatedTable<f64>> {
        self.expected.as_ref()
    }

    /// Unrounded contributions with totals.
    #[must_use]
    pub fn contributions(&self) -> Option<&AnnotatedTable<f64>> {
        self.contributions.as_ref()
    }

    /// The test summary.
    #[must_use]
    pub fn result(&self) -> &TestResult {
        &self.result
    }

    /// Cells flagged while computing contributions.
    #[must_use]
    pub fn warnings(&self) -> &[CellWarning] {
        &self.warnings
    }

    /// The presentation rounding policy.
    #[must_use]
    pub fn rounding(&self) -> RoundingPolicy {
        self.rounding
    }

    /// Expected counts rounded for presentation.
    #[must_use]
    pub fn expected_rounded(&self) -> Option<AnnotatedTable<f64>> {
        self.expected
            .as_ref()
            .map(|t| t.rounded(self.rounding.expected_decimals))
    }

    /// Contributions rounded for presentation.
    #[must_use]
    pub fn contributions_rounded(&self) -> Option<AnnotatedTable<f64>> {
        self.contributions
            .as_ref()
            .map(|t| t.rounded(self.rounding.contribution_decimals))
    }

    /// The report as named sheets for a tabular document.
    ///
    /// Tables that are undefined become a sheet with a single not-available
    /// cell, so the document layout does not depend on the data.
    #[must_use]
    pub fn sheets(&self) -> Vec<Sheet> {
        let observed = table_sheet(OBSERVED_SHEET, &self.observed, |&v| {
            SheetValue::Integer(v)
        });
        let expected = match self.expected_rounded() {
            Some(t) => table_sheet(EXPECTED_SHEET, &t, |&v| SheetValue::Real(v)),
            None => Sheet::not_available(EXPECTED_SHEET),
        };
        let contributions = match self.contributions_rounded() {
            Some(t) => table_sheet(CONTRIBUTIONS_SHEET, &t, |&v| SheetValue::Real(v)),
            None => Sheet::not_available(CONTRIBUTIONS_SHEET),
        };

        let summary = Sheet {
            name: SUMMARY_SHEET.to_string(),
            rows: vec![
                vec![
                    SheetValue::Text("chi2".into()),
                    SheetValue::Text("df".into()),
                    SheetValue::Text("p_value".into()),
                ],
                vec![
                    self.result
                        .statistic
                        .map_or(SheetValue::NotAvailable, SheetValue::Real),
                    SheetValue::Integer(self.result.degrees_of_freedom as u64),
                    self.result
                        .p_value
                        .value()
                        .map_or(SheetValue::NotAvailable, SheetValue::Real),
                ],
            ],
        };

        vec![observed, expected, contributions, summary]
    }
}

fn table_sheet<T, F>(name: &str, table: &AnnotatedTable<T>, value: F) -> Sheet
where
    T: Copy,
    F: Fn(&T) -> SheetValue,
{
    let mut header = vec![SheetValue::Text(String::new())];
    header.extend(
        table
            .table()
            .column_labels()
            .iter()
            .map(|l| SheetValue::Text(l.clone())),
    );
    header.push(SheetValue::Text(TOTAL_LABEL.to_string()));

    let labels = table
        .table()
        .row_labels()
        .iter()
        .cloned()
        .chain(std::iter::once(TOTAL_LABEL.to_string()));

    let mut rows = vec![header];
    for (label, grid_row) in labels.zip(table.to_grid()) {
        let mut row = vec![SheetValue::Text(label)];
        row.extend(grid_row.iter().map(&value));
        rows.push(row);
    }

    Sheet {
        name: name.to_string(),
        rows,
    }
}

/// A value in a [`Sheet`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetValue {
    /// A label.
    Text(String),
    /// An exact count.
    Integer(u64),
    /// A real value, already rounded.
    Real(f64),
    /// A value that could not be computed.
    NotAvailable,
}

impl fmt::Display for SheetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::NotAvailable => f.write_str("NA"),
        }
    }
}

/// A named grid of values, first row being the header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sheet {
    /// Sheet name.
    pub name: String,
    /// Rows, header first.
    pub rows: Vec<Vec<SheetValue>>,
}

impl Sheet {
    fn not_available(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: vec![vec![SheetValue::NotAvailable]],
        }
    }
}

/// Consumer that persists a report, e.g. as a multi-sheet workbook.
pub trait ReportSink {
    /// Persist `report`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report could not be written.
    fn write_report(&mut self, report: &ChiSquareReport) -> Result<()>;
}

/// Hand `report` to `sink`.
///
/// A failure is logged and returned as [`Error::Persistence`]; the caller
/// keeps the report and may retry.
///
/// # Errors
///
/// Returns `Persistence` if the sink fails.
pub fn publish<S: ReportSink + ?Sized>(report: &ChiSquareReport, sink: &mut S) -> Result<()> {
    sink.write_report(report).map_err(|err| {
        log::warn!("report not persisted: {err}");
        match err {
            Error::Persistence { .. } => err,
            other => Error::persistence(other.to_string()),
        }
    })
}

impl fmt::Display for ChiSquareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounding = self.rounding;

        writeln!(f, "--- Observed counts with totals ---")?;
        write!(f, "{}", self.observed)?;

        writeln!(f, "\n--- Expected counts under independence with totals ---")?;
        match &self.expected {
            Some(t) => write!(f, "{:.*}", rounding.expected_decimals as usize, t)?,
            None => writeln!(f, "unavailable: no data")?,
        }

        writeln!(f, "\n--- Contributions (O - E)^2 / E with totals ---")?;
        match &self.contributions {
            Some(t) => write!(f, "{:.*}", rounding.contribution_decimals as usize, t)?,
            None => writeln!(f, "unavailable: no data")?,
        }

        writeln!(f, "\n--- Chi-square summary ---")?;
        match self.result.statistic {
            Some(stat) => writeln!(
                f,
                "chi2 = {:.*}",
                rounding.statistic_decimals as usize,
                round_to(stat, rounding.statistic_decimals)
            )?,
            None => writeln!(f, "chi2 = undefined")?,
        }
        writeln!(f, "df = {}", self.result.degrees_of_freedom)?;
        match &self.result.p_value {
            PValue::Computed(p) => {
                writeln!(f, "p-value = {:.*}", rounding.p_value_decimals as usize, p)?;
            }
            PValue::Unavailable(reason) => writeln!(f, "p-value = unavailable ({reason})")?,
        }
        writeln!(
            f,
            "decision at alpha = {}: {}",
            self.result.significance_level, self.result.decision
        )?;

        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::independence::{Decision, Unavailable};
    use crate::table::Table;
    use ndarray::array;

    fn observed() -> AnnotatedTable<u64> {
        Table::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            array![[2u64, 0], [0, 1]],
        )
        .unwrap()
        .annotate()
    }

    fn complete_report() -> ChiSquareReport {
        let obs = observed();
        let expected = Table::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            array![[4.0 / 3.0, 2.0 / 3.0], [2.0 / 3.0, 1.0 / 3.0]],
        )
        .unwrap()
        .annotate();
        let contributions = Table::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            array![[1.0 / 3.0, 2.0 / 3.0], [2.0 / 3.0, 4.0 / 3.0]],
        )
        .unwrap()
        .annotate();
        let result = TestResult {
            statistic: Some(3.0),
            degrees_of_freedom: 1,
            p_value: PValue::Computed(0.083_264_516),
            decision: Decision::FailToReject,
            significance_level: 0.05,
        };
        assemble(
            obs,
            Some(expected),
            Some(contributions),
            result,
            Vec::new(),
            RoundingPolicy::default(),
        )
    }

    fn empty_report() -> ChiSquareReport {
        let obs = Table::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            array![[0u64, 0], [0, 0]],
        )
        .unwrap()
        .annotate();
        assemble(
            obs,
            None,
            None,
            TestResult::undefined(1, 0.05),
            Vec::new(),
            RoundingPolicy::default(),
        )
    }

    struct Memory(Vec<Vec<Sheet>>);

    impl ReportSink for Memory {
        fn write_report(&mut self, report: &ChiSquareReport) -> Result<()> {
            self.0.push(report.sheets());
            Ok(())
        }
    }

    struct Locked;

    impl ReportSink for Locked {
        fn write_report(&mut self, _report: &ChiSquareReport) -> Result<()> {
            Err(Error::persistence("resultados.xlsx is open in another program"))
        }
    }

    #[test]
    fn test_rounding_is_presentation_only() {
        let report = complete_report();
        let raw = report.expected().unwrap().table().get(0, 0).copied().unwrap();
        assert!((raw - 4.0 / 3.0).abs() < 1e-15);

        let rounded = report.expected_rounded().unwrap();
        assert_eq!(rounded.table().get(0, 0), Some(&1.33));
        let rounded = report.contributions_rounded().unwrap();
        assert_eq!(rounded.table().get(0, 0), Some(&0.3333));

        // The report itself keeps full precision
        let raw = report.contributions().unwrap().table().get(0, 0).copied().unwrap();
        assert!((raw - 1.0 / 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_sheets_layout() {
        let sheets = complete_report().sheets();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [OBSERVED_SHEET, EXPECTED_SHEET, CONTRIBUTIONS_SHEET, SUMMARY_SHEET]
        );

        let observed = &sheets[0];
        assert_eq!(observed.rows.len(), 4);
        assert_eq!(observed.rows[0][3], SheetValue::Text("Total".into()));
        assert_eq!(observed.rows[3][3], SheetValue::Integer(3));

        let expected = &sheets[1];
        assert_eq!(expected.rows[1][1], SheetValue::Real(1.33));

        let summary = &sheets[3];
        assert_eq!(summary.rows[1][0], SheetValue::Real(3.0));
        assert_eq!(summary.rows[1][1], SheetValue::Integer(1));
        assert_eq!(summary.rows[1][2], SheetValue::Real(0.083_264_516));
    }

    #[test]
    fn test_sheets_for_undefined_result() {
        let sheets = empty_report().sheets();
        assert_eq!(sheets.len(), 4);
        assert_eq!(sheets[1].rows, vec![vec![SheetValue::NotAvailable]]);
        assert_eq!(sheets[3].rows[1][0], SheetValue::NotAvailable);
        assert_eq!(sheets[3].rows[1][2], SheetValue::NotAvailable);
        assert_eq!(sheets[3].rows[1][2].to_string(), "NA");
    }

    #[test]
    fn test_display() {
        let text = complete_report().to_string();
        assert!(text.contains("--- Observed counts with totals ---"));
        assert!(text.contains("1.33"));
        assert!(text.contains("0.3333"));
        assert!(text.contains("chi2 = 3.0000"));
        assert!(text.contains("p-value = 0.083265"));
        assert!(text.contains("fail to reject independence"));

        let text = empty_report().to_string();
        assert!(text.contains("chi2 = undefined"));
        assert!(text.contains(&format!(
            "p-value = unavailable ({})",
            Unavailable::NoData
        )));
        assert!(text.contains("undetermined"));
    }

    #[test]
    fn test_publish() {
        let report = complete_report();
        let mut sink = Memory(Vec::new());
        publish(&report, &mut sink).unwrap();
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0], report.sheets());
    }

    #[test]
    fn test_publish_failure_keeps_report() {
        let report = complete_report();
        let before = report.clone();

        let err = publish(&report, &mut Locked).unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        assert!(err.to_string().contains("resultados.xlsx"));
        assert_eq!(report, before);

        // Retrying with a working sink still succeeds
        let mut sink = Memory(Vec::new());
        assert!(publish(&report, &mut sink).is_ok());
    }
}
