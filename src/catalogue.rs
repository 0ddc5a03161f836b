//! Catalogue of named category schemes.
//!
//! Provides ready-made schemes for common survey layouts, so callers can
//! reference them by name instead of declaring every category.

use crate::category::{CategoryScheme, SchemeBuilder};
use crate::error::{Error, Result};

/// Retrieve a category scheme by name.
///
/// Supported schemes:
/// - **age-genre**: age group (`Adultos`, `Adultos mayores`, `Jóvenes`)
///   × favorite genre (`Terror`, `Comedia`, `Drama`), read from the fields
///   `Grupo de edad` and `Género favorito`
///
/// Names are case-insensitive; `_` and `-` are interchangeable.
///
/// # Errors
///
/// Returns `InvalidConfig` for an unknown name.
///
/// # Example
///
/// ```
/// use contingency::catalogue::get_by_name;
///
/// let scheme = get_by_name("age-genre").unwrap();
/// assert_eq!(scheme.shape(), (3, 3));
/// assert_eq!(scheme.row_field(), "Grupo de edad");
/// ```
pub fn get_by_name(name: &str) -> Result<CategoryScheme> {
    match name.trim().to_lowercase().replace('_', "-").as_str() {
        "age-genre" => age_genre(),
        _ => Err(Error::invalid_config(format!(
            "unknown category scheme: {name}"
        ))),
    }
}

/// List all available scheme names.
#[must_use]
pub fn list_schemes() -> Vec<&'static str> {
    vec!["age-genre"]
}

fn age_genre() -> Result<CategoryScheme> {
    SchemeBuilder::new()
        .row_field("Grupo de edad")
        .column_field("Género favorito")
        .row_category("Adultos")
        .row_category("Adultos mayores")
        .row_category("Jóvenes")
        .column_category("Terror", ["Terror"])
        .column_category("Comedia", ["Comedia"])
        .column_category("Drama", ["Drama"])
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_age_genre() {
        let scheme = get_by_name("age-genre").unwrap();
        assert_eq!(scheme.shape(), (3, 3));
        assert_eq!(
            scheme.rows().names(),
            vec!["Adultos", "Adultos mayores", "Jóvenes"]
        );
        assert_eq!(scheme.columns().names(), vec!["Terror", "Comedia", "Drama"]);
        assert_eq!(scheme.column_field(), "Género favorito");
    }

    #[test]
    fn test_name_normalization() {
        assert!(get_by_name("AGE_GENRE").is_ok());
        assert!(get_by_name(" Age-Genre ").is_ok());
    }

    #[test]
    fn test_every_listed_scheme_builds() {
        for name in list_schemes() {
            assert!(get_by_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_unknown() {
        assert!(matches!(
            get_by_name("income-region"),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
