//! The complete classify → tabulate → expected → contributions → report
//! pipeline.

use crate::category::CategoryScheme;
use crate::classify::Record;
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::expected;
use crate::independence::{self, builtin_engine, ChiSquareTail, TestResult};
use crate::report::{self, ChiSquareReport};
use crate::table::{tabulate, ContingencyTable};

/// Run a chi-square test of independence over raw records.
///
/// Uses the built-in p-value engine when the `pvalue` feature is enabled.
/// An input with no recognized records is not an error: the report carries
/// the observed (all-zero) table and an undefined statistic.
///
/// # Errors
///
/// Returns an error if `config` is invalid.
///
/// # Example
///
/// ```
/// use contingency::{analyze, catalogue, AnalysisConfig, Record};
///
/// let scheme = catalogue::get_by_name("age-genre").unwrap();
/// let records = [
///     Record::new("Jóvenes", "Terror"),
///     Record::new("Jóvenes", "Terror"),
///     Record::new("Adultos", "Drama"),
/// ];
///
/// let report = analyze(&scheme, &records, &AnalysisConfig::default()).unwrap();
/// assert_eq!(report.result().degrees_of_freedom, 4);
/// assert!(report.result().statistic.unwrap() > 0.0);
/// ```
pub fn analyze<'a, I>(
    scheme: &CategoryScheme,
    records: I,
    config: &AnalysisConfig,
) -> Result<ChiSquareReport>
where
    I: IntoIterator<Item = &'a Record>,
{
    analyze_with(scheme, records, config, builtin_engine())
}

/// Like [`analyze`], with an explicit p-value engine (or none).
///
/// # Errors
///
/// Returns an error if `config` is invalid.
pub fn analyze_with<'a, I>(
    scheme: &CategoryScheme,
    records: I,
    config: &AnalysisConfig,
    engine: Option<&dyn ChiSquareTail>,
) -> Result<ChiSquareReport>
where
    I: IntoIterator<Item = &'a Record>,
{
    let observed = tabulate(scheme, records);
    analyze_table(&observed, config, engine)
}

/// Run the test on an already tabulated observed table.
///
/// # Errors
///
/// Returns an error if:
/// - `config` is invalid
/// - the table has fewer than two rows or columns
pub fn analyze_table(
    observed: &ContingencyTable,
    config: &AnalysisConfig,
    engine: Option<&dyn ChiSquareTail>,
) -> Result<ChiSquareReport> {
    config.validate()?;
    let (rows, columns) = observed.shape();
    let df = independence::degrees_of_freedom(rows, columns)?;
    let alpha = config.significance_level;

    let expected = match expected::derive(observed) {
        Ok(table) => table,
        Err(Error::NoData) => {
            log::debug!("no classified records, chi-square statistic is undefined");
            return Ok(report::assemble(
                observed.annotate(),
                None,
                None,
                TestResult::undefined(df, alpha),
                Vec::new(),
                config.rounding,
            ));
        }
        Err(err) => return Err(err),
    };

    let contributions = independence::contributions(observed, &expected)?;
    let statistic = contributions.statistic();
    let result = TestResult::evaluate(statistic, df, alpha, engine);
    log::debug!(
        "chi2 = {statistic}, df = {df}, p = {:?}, decision = {}",
        result.p_value.value(),
        result.decision
    );

    let (contribution_table, warnings) = contributions.into_parts();

    Ok(report::assemble(
        observed.annotate(),
        Some(expected.annotate()),
        Some(contribution_table.annotate()),
        result,
        warnings,
        config.rounding,
    ))
}
