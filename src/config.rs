//! Analysis configuration.

use crate::error::{Error, Result};
use crate::independence::DEFAULT_SIGNIFICANCE_LEVEL;

/// Largest digit count a [`RoundingPolicy`] accepts; an `f64` carries no
/// more significant decimal digits than this.
pub const MAX_DECIMALS: u32 = 15;

/// Decimal digits used when presenting each table.
///
/// Rounding is applied only to presented values; the values used to compute
/// the statistic are never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundingPolicy {
    /// Digits for the expected table (default: 2).
    pub expected_decimals: u32,
    /// Digits for the contribution table (default: 4).
    pub contribution_decimals: u32,
    /// Digits for the statistic in text output (default: 4).
    pub statistic_decimals: u32,
    /// Digits for the p-value in text output (default: 6).
    pub p_value_decimals: u32,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            expected_decimals: 2,
            contribution_decimals: 4,
            statistic_decimals: 4,
            p_value_decimals: 6,
        }
    }
}

/// Configuration for a chi-square analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    /// Significance level alpha (default: 0.05).
    pub significance_level: f64,
    /// Presentation rounding.
    pub rounding: RoundingPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            rounding: RoundingPolicy::default(),
        }
    }
}

impl RoundingPolicy {
    /// Check that every digit count is at most [`MAX_DECIMALS`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("expected_decimals", self.expected_decimals),
            ("contribution_decimals", self.contribution_decimals),
            ("statistic_decimals", self.statistic_decimals),
            ("p_value_decimals", self.p_value_decimals),
        ];
        for (field, decimals) in fields {
            if decimals > MAX_DECIMALS {
                return Err(Error::invalid_config(format!(
                    "{field} must be at most {MAX_DECIMALS}, got {decimals}"
                )));
            }
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Check that the significance level lies strictly between 0 and 1 and
    /// that the rounding policy is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` otherwise.
    pub fn validate(&self) -> Result<()> {
        let alpha = self.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(Error::invalid_config(format!(
                "significance level must lie in (0, 1), got {alpha}"
            )));
        }
        self.rounding.validate()
    }
}
