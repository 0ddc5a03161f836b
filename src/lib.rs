//! # Contingency
//!
//! Chi-square test of independence between two categorical survey
//! variables, such as age group and favorite genre.
//!
//! ## Overview
//!
//! Given raw records and a declared [`CategoryScheme`], the library:
//! - Classifies each record into a `(row, column)` cell, dropping unknown labels
//! - Builds the observed [`ContingencyTable`] with every declared cell present
//! - Derives expected counts under independence, Eᵢⱼ = Rᵢ·Cⱼ/N
//! - Computes per-cell contributions (O - E)²/E and the statistic
//! - Reports degrees of freedom, a p-value and a decision at alpha = 0.05
//!
//! The result is a [`ChiSquareReport`] holding all three tables with totals,
//! ready to be printed or handed to a [`ReportSink`].
//!
//! ## Quick Start
//!
//! ```rust
//! use contingency::{analyze, AnalysisConfig, Record, SchemeBuilder};
//!
//! let scheme = SchemeBuilder::new()
//!     .row_field("Grupo de edad")
//!     .column_field("Género favorito")
//!     .row_category("Jóvenes")
//!     .row_category("Adultos")
//!     .column_category("Terror", ["Terror"])
//!     .column_category("Drama", ["Drama"])
//!     .build()
//!     .unwrap();
//!
//! let records = vec![
//!     Record::new("Jóvenes", "Terror"),
//!     Record::new("Jóvenes", "Terror"),
//!     Record::new("Adultos", "Drama"),
//!     Record::new("Adultos", "Terror"),
//! ];
//!
//! let report = analyze(&scheme, &records, &AnalysisConfig::default()).unwrap();
//! assert_eq!(report.result().degrees_of_freedom, 1);
//! println!("{report}");
//! ```
//!
//! ## Degenerate Inputs
//!
//! - No recognized records: the report carries an all-zero observed table,
//!   no expected or contribution table, and an undefined statistic.
//! - Fewer than two categories on an axis, or a label accepted by two
//!   categories: rejected when the scheme is built.
//!
//! ## Features
//!
//! - `pvalue` (default): Built-in chi-square survival function. Without it,
//!   p-values are reported as unavailable and the decision is undetermined.
//! - `serde`: Enable serialization/deserialization of schemes, configuration
//!   and reports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod analysis;
pub mod catalogue;
pub mod category;
pub mod classify;
pub mod config;
#[cfg(feature = "pvalue")]
pub mod distribution;
pub mod error;
pub mod expected;
pub mod independence;
pub mod report;
pub mod table;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analysis::{analyze, analyze_table, analyze_with};
    pub use crate::category::{Axis, Category, CategoryScheme, CategorySet, SchemeBuilder};
    pub use crate::classify::{Cell, Record};
    pub use crate::config::{AnalysisConfig, RoundingPolicy};
    pub use crate::error::{Error, Result};
    pub use crate::expected::ExpectedTable;
    pub use crate::independence::{
        builtin_engine, degrees_of_freedom, ChiSquareTail, Contributions, Decision, PValue,
        TestResult, Unavailable,
    };
    pub use crate::report::{publish, ChiSquareReport, ReportSink, Sheet, SheetValue};
    pub use crate::table::{tabulate, AnnotatedTable, ContingencyTable, Table};

    #[cfg(feature = "pvalue")]
    pub use crate::distribution::{chi_square_sf, IncompleteGamma};
}

// Re-export commonly used items at crate root
pub use analysis::{analyze, analyze_table, analyze_with};
pub use category::{Axis, Category, CategoryScheme, SchemeBuilder};
pub use classify::{Cell, Record};
pub use config::{AnalysisConfig, RoundingPolicy};
pub use error::{Error, Result};
pub use independence::{degrees_of_freedom, ChiSquareTail, Decision, PValue, TestResult};
pub use report::{publish, ChiSquareReport, ReportSink};
pub use table::{tabulate, AnnotatedTable, ContingencyTable, Table};
