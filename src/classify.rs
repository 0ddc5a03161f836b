//! Record classification.
//!
//! Maps raw survey records onto the cells of a [`CategoryScheme`]. Records
//! whose row value is not a declared row label, or whose column value matches
//! no column category, are dropped rather than treated as errors.

use crate::category::CategoryScheme;

/// A classified `(row, column)` position, as indices into the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Row category index.
    pub row: usize,
    /// Column category index.
    pub column: usize,
}

/// A raw input record: one row-group value and one free-text column value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Raw row-group value (e.g. an age group).
    pub row: String,
    /// Raw column value (e.g. a favorite genre).
    pub column: String,
}

impl Record {
    /// Create a record from its two raw values.
    #[must_use]
    pub fn new(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            column: column.into(),
        }
    }

    /// Build a record from named fields, e.g. one spreadsheet row keyed by
    /// its header.
    ///
    /// Field names are trimmed before lookup. Returns `None` if either field
    /// is missing.
    ///
    /// ```
    /// use contingency::Record;
    ///
    /// let fields = [("Grupo de edad ", "Adultos"), (" Género favorito", "Drama")];
    /// let record = Record::from_fields(fields, "Grupo de edad", "Género favorito").unwrap();
    /// assert_eq!(record, Record::new("Adultos", "Drama"));
    /// ```
    pub fn from_fields<I, K, V>(fields: I, row_field: &str, column_field: &str) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let row_field = row_field.trim();
        let column_field = column_field.trim();
        let mut row = None;
        let mut column = None;

        for (name, value) in fields {
            let name = name.as_ref().trim();
            if row.is_none() && name == row_field {
                row = Some(value.into());
            } else if column.is_none() && name == column_field {
                column = Some(value.into());
            }
        }

        Some(Self {
            row: row?,
            column: column?,
        })
    }
}

impl CategoryScheme {
    /// Classify a raw `(row, column)` value pair.
    ///
    /// Both values are trimmed and compared by exact equality with the
    /// accepted labels. Returns `None` if either value is unrecognized.
    #[must_use]
    pub fn classify(&self, row_value: &str, column_value: &str) -> Option<Cell> {
        let row = self.rows().position(row_value)?;
        let column = self.columns().position(column_value)?;
        Some(Cell { row, column })
    }

    /// Classify a [`Record`].
    #[must_use]
    pub fn classify_record(&self, record: &Record) -> Option<Cell> {
        self.classify(&record.row, &record.column)
    }

    /// Build a [`Record`] from named fields using this scheme's field names.
    pub fn record_from_fields<I, K, V>(&self, fields: I) -> Option<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Record::from_fields(fields, self.row_field(), self.column_field())
    }
}
