//! Catalog Validation Helpers
//!
//! Small, pure checks applied to request input before it reaches the record
//! store.

use super::errors::CatalogError;
use super::models::Product;

/// Fails unless `value` is a non-negative identifier.
pub fn require_non_negative(field: &str, value: i64) -> Result<i64, CatalogError> {
    if value < 0 {
        return Err(CatalogError::InvalidArgument(format!(
            "{field} must be greater than or equal to 0"
        )));
    }
    Ok(value)
}

/// Returns the single character of `letter`.
///
/// Counts Unicode scalar values, so `"é"` is accepted while `"ab"` and `""`
/// are not.
pub fn single_letter(letter: &str) -> Result<char, CatalogError> {
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CatalogError::InvalidArgument(
            "letter must be exactly one character".to_string(),
        )),
    }
}

/// Checks a product submitted for creation.
///
/// Price and quantity are stored as given: negative values are accepted.
pub fn validate_new_product(product: &Product) -> Result<(), CatalogError> {
    require_non_negative("id", product.id)?;
    if product.name.trim().is_empty() {
        return Err(CatalogError::InvalidArgument("name must not be empty".to_string()));
    }
    Ok(())
}
