//! Category sets and the scheme that declares both axes of a table.
//!
//! A [`CategoryScheme`] fixes, before any record is read, which row and
//! column categories exist, in which order they appear, and which raw labels
//! each category accepts. Every table built from the scheme has exactly this
//! shape, whatever combinations the data actually contains.
//!
//! # Example
//!
//! ```
//! use contingency::SchemeBuilder;
//!
//! let scheme = SchemeBuilder::new()
//!     .row_field("Grupo de edad")
//!     .column_field("Género favorito")
//!     .row_category("Jóvenes")
//!     .row_category("Adultos")
//!     .column_category("Terror", ["Terror", "Horror"])
//!     .column_category("Comedia", ["Comedia"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(scheme.shape(), (2, 2));
//! assert_eq!(scheme.columns().position("Horror"), Some(0));
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// One of the two dimensions of a contingency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Row categories (e.g. age groups).
    Rows,
    /// Column categories (e.g. genres).
    Columns,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows => f.write_str("row"),
            Self::Columns => f.write_str("column"),
        }
    }
}

/// A named category and the raw labels that map to it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category {
    name: String,
    labels: Vec<String>,
}

impl Category {
    /// Create a category that accepts only its own name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            labels: vec![name.clone()],
            name,
        }
    }

    /// Create a category that accepts each of `labels` (many-to-one).
    #[must_use]
    pub fn with_labels<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// The category name, used as the table label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw labels accepted by this category.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// An ordered, validated set of categories for one axis.
///
/// Lookup is exact string equality on trimmed labels. A label belongs to at
/// most one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    axis: Axis,
    categories: Vec<Category>,
    lookup: HashMap<String, usize>,
}

impl CategorySet {
    /// Validate `categories` and build the label lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - fewer than two categories are declared
    /// - a category name is blank or declared twice
    /// - a category accepts no labels, or a label is blank
    /// - a raw label is accepted by more than one category
    pub fn new(axis: Axis, categories: Vec<Category>) -> Result<Self> {
        if categories.len() < 2 {
            return Err(Error::InsufficientCategories {
                axis,
                count: categories.len(),
            });
        }

        let mut normalized: Vec<Category> = Vec::with_capacity(categories.len());
        let mut lookup: HashMap<String, usize> = HashMap::new();

        for (idx, category) in categories.into_iter().enumerate() {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::invalid_config(format!(
                    "{} category {} has a blank name",
                    axis,
                    idx + 1
                )));
            }
            if normalized.iter().any(|c| c.name == name) {
                return Err(Error::invalid_config(format!(
                    "{axis} category {name:?} is declared twice"
                )));
            }
            if category.labels.is_empty() {
                return Err(Error::invalid_config(format!(
                    "{axis} category {name:?} accepts no labels"
                )));
            }

            let mut labels = Vec::with_capacity(category.labels.len());
            for raw in category.labels {
                let label = raw.trim().to_string();
                if label.is_empty() {
                    return Err(Error::invalid_config(format!(
                        "{axis} category {name:?} has a blank label"
                    )));
                }
                match lookup.get(&label) {
                    // Repeating a label inside the same category is harmless.
                    Some(&owner) if owner == idx => continue,
                    Some(&owner) => {
                        return Err(Error::DuplicateLabel {
                            label,
                            axis,
                            first: normalized[owner].name.clone(),
                            second: name,
                        });
                    }
                    None => {
                        lookup.insert(label.clone(), idx);
                        labels.push(label);
                    }
                }
            }

            normalized.push(Category { name, labels });
        }

        Ok(Self {
            axis,
            categories: normalized,
            lookup,
        })
    }

    /// The axis this set describes.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always false for a validated set; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category at `index`, in declaration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Iterate over the categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Category names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// Index of the category accepting `raw`, after trimming.
    #[must_use]
    pub fn position(&self, raw: &str) -> Option<usize> {
        self.lookup.get(raw.trim()).copied()
    }
}

/// The declared row and column category sets plus the record field names
/// they are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "SchemeDefinition", into = "SchemeDefinition")
)]
pub struct CategoryScheme {
    row_field: String,
    column_field: String,
    rows: CategorySet,
    columns: CategorySet,
}

impl CategoryScheme {
    /// Name of the record field holding the row category.
    #[must_use]
    pub fn row_field(&self) -> &str {
        &self.row_field
    }

    /// Name of the record field holding the column category.
    #[must_use]
    pub fn column_field(&self) -> &str {
        &self.column_field
    }

    /// Row categories.
    #[must_use]
    pub fn rows(&self) -> &CategorySet {
        &self.rows
    }

    /// Column categories.
    #[must_use]
    pub fn columns(&self) -> &CategorySet {
        &self.columns
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }
}

/// Unvalidated, serializable form of a [`CategoryScheme`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemeDefinition {
    /// Record field holding the row category.
    pub row_field: String,
    /// Record field holding the column category.
    pub column_field: String,
    /// Row categories in display order.
    pub rows: Vec<Category>,
    /// Column categories in display order.
    pub columns: Vec<Category>,
}

impl TryFrom<SchemeDefinition> for CategoryScheme {
    type Error = Error;

    fn try_from(definition: SchemeDefinition) -> Result<Self> {
        let row_field = definition.row_field.trim().to_string();
        let column_field = definition.column_field.trim().to_string();
        if row_field.is_empty() || column_field.is_empty() {
            return Err(Error::invalid_config("record field names must not be blank"));
        }
        if row_field == column_field {
            return Err(Error::invalid_config(format!(
                "row and column are both read from field {row_field:?}"
            )));
        }

        Ok(Self {
            row_field,
            column_field,
            rows: CategorySet::new(Axis::Rows, definition.rows)?,
            columns: CategorySet::new(Axis::Columns, definition.columns)?,
        })
    }
}

impl From<CategoryScheme> for SchemeDefinition {
    fn from(scheme: CategoryScheme) -> Self {
        Self {
            row_field: scheme.row_field,
            column_field: scheme.column_field,
            rows: scheme.rows.categories,
            columns: scheme.columns.categories,
        }
    }
}

/// Builder for [`CategoryScheme`].
///
/// Validation happens once, in [`SchemeBuilder::build`], so a misconfigured
/// scheme is rejected before any record is classified.
#[derive(Debug, Clone)]
pub struct SchemeBuilder {
    row_field: String,
    column_field: String,
    rows: Vec<Category>,
    columns: Vec<Category>,
}

impl Default for SchemeBuilder {
    fn default() -> Self {
        Self {
            row_field: "row".to_string(),
            column_field: "column".to_string(),
            rows: Vec::new(),
            columns: Vec::new(),
        }
    }
}

impl SchemeBuilder {
    /// Create a new builder with default field names `row` and `column`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record field holding the row category.
    #[must_use]
    pub fn row_field(mut self, field: impl Into<String>) -> Self {
        self.row_field = field.into();
        self
    }

    /// Set the record field holding the column category.
    #[must_use]
    pub fn column_field(mut self, field: impl Into<String>) -> Self {
        self.column_field = field.into();
        self
    }

    /// Append a row category that accepts its own name.
    #[must_use]
    pub fn row_category(mut self, name: impl Into<String>) -> Self {
        self.rows.push(Category::new(name));
        self
    }

    /// Append a row category with an explicit accepted-label set.
    #[must_use]
    pub fn row_category_with_labels<I, S>(mut self, name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(Category::with_labels(name, labels));
        self
    }

    /// Append a column category with its accepted-label set.
    #[must_use]
    pub fn column_category<I, S>(mut self, name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.push(Category::with_labels(name, labels));
        self
    }

    /// Validate and build the scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if either axis is invalid (see [`CategorySet::new`]),
    /// or if the field names are blank or identical.
    pub fn build(self) -> Result<CategoryScheme> {
        CategoryScheme::try_from(SchemeDefinition {
            row_field: self.row_field,
            column_field: self.column_field,
            rows: self.rows,
            columns: self.columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres() -> SchemeBuilder {
        SchemeBuilder::new()
            .row_category("Jóvenes")
            .row_category("Adultos")
            .row_category("Adultos mayores")
            .column_category("Terror", ["Terror"])
            .column_category("Comedia", ["Comedia"])
            .column_category("Drama", ["Drama"])
    }

    #[test]
    fn test_build_preserves_declaration_order() {
        let scheme = genres().build().unwrap();
        assert_eq!(scheme.shape(), (3, 3));
        assert_eq!(
            scheme.rows().names(),
            vec!["Jóvenes", "Adultos", "Adultos mayores"]
        );
        assert_eq!(scheme.columns().names(), vec!["Terror", "Comedia", "Drama"]);
        assert_eq!(scheme.columns().axis(), Axis::Columns);
    }

    #[test]
    fn test_many_to_one_labels() {
        let scheme = genres()
            .column_category("Ciencia ficción", ["Ciencia ficción", "Sci-Fi", " SF "])
            .build()
            .unwrap();
        assert_eq!(scheme.columns().position("Sci-Fi"), Some(3));
        assert_eq!(scheme.columns().position("SF"), Some(3));
        assert_eq!(scheme.columns().get(3).unwrap().labels().len(), 3);
    }

    #[test]
    fn test_label_in_two_categories_is_rejected() {
        let err = genres()
            .column_category("Suspenso", ["Suspenso", "Terror"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateLabel {
                label: "Terror".into(),
                axis: Axis::Columns,
                first: "Terror".into(),
                second: "Suspenso".into(),
            }
        );
    }

    #[test]
    fn test_label_repeated_within_category_is_accepted() {
        let scheme = genres()
            .column_category("Acción", ["Acción", "Acción "])
            .build()
            .unwrap();
        assert_eq!(scheme.columns().get(3).unwrap().labels(), ["Acción"]);
    }

    #[test]
    fn test_insufficient_categories() {
        let err = SchemeBuilder::new()
            .row_category("Jóvenes")
            .column_category("Terror", ["Terror"])
            .column_category("Drama", ["Drama"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientCategories {
                axis: Axis::Rows,
                count: 1
            }
        );

        let err = SchemeBuilder::new()
            .row_category("Jóvenes")
            .row_category("Adultos")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientCategories {
                axis: Axis::Columns,
                count: 0
            }
        ));
    }

    #[test]
    fn test_invalid_categories() {
        // Empty label set
        let err = genres()
            .column_category("Acción", Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        // Blank label
        let err = genres().column_category("Acción", ["  "]).build().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));

        // Duplicate name
        let err = genres().row_category("Adultos").build().unwrap_err();
        assert!(err.to_string().contains("declared twice"));

        // Same field for both axes
        let err = genres()
            .row_field("Grupo")
            .column_field(" Grupo ")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_position_trims_input() {
        let scheme = genres().build().unwrap();
        assert_eq!(scheme.rows().position("  Adultos mayores "), Some(2));
        assert_eq!(scheme.rows().position("adultos"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "row_field": "Grupo de edad",
            "column_field": "Género favorito",
            "rows": [
                {"name": "Jóvenes", "labels": ["Jóvenes"]},
                {"name": "Adultos", "labels": ["Adultos"]}
            ],
            "columns": [
                {"name": "Terror", "labels": ["Terror"]},
                {"name": "Drama", "labels": ["Drama", "Terror"]}
            ]
        }"#;
        let result: std::result::Result<CategoryScheme, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let scheme = genres().build().unwrap();
        let encoded = serde_json::to_string(&scheme).unwrap();
        let decoded: CategoryScheme = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, scheme);
    }
}
