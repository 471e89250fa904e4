//! Precondition checks
//!
//! Every container operation validates its arguments up front and fails
//! with a distinguishable error kind instead of continuing in a bad state:
//!
//! - index outside the live range → [`CollectionError::IndexOutOfBounds`]
//! - operation invalid for the current state → [`CollectionError::IllegalState`]
//! - bad construction parameters → [`CollectionError::InvalidArgument`]
//!
//! Null references cannot occur: containers own `T` values directly.

use thiserror::Error;

/// Errors raised by container operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollectionError {
    #[error("{desc}: index {index} out of bounds for size {size}")]
    IndexOutOfBounds {
        desc: &'static str,
        index: usize,
        size: usize,
    },

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Ensure `index` is in `[0, size)`.
///
/// # Example
/// ```
/// use cuckoo_collections::preconditions::check_element_index;
///
/// assert!(check_element_index(2, 3, "index").is_ok());
/// assert!(check_element_index(3, 3, "index").is_err());
/// ```
pub fn check_element_index(
    index: usize,
    size: usize,
    desc: &'static str,
) -> Result<usize, CollectionError> {
    if index >= size {
        return Err(CollectionError::IndexOutOfBounds { desc, index, size });
    }
    Ok(index)
}

/// Ensure `index` is in `[0, size]` (a valid insertion/end position).
pub fn check_position_index(
    index: usize,
    size: usize,
    desc: &'static str,
) -> Result<usize, CollectionError> {
    if index > size {
        return Err(CollectionError::IndexOutOfBounds { desc, index, size });
    }
    Ok(index)
}

/// Ensure a state condition holds.
pub fn check_state(condition: bool, message: &str) -> Result<(), CollectionError> {
    if !condition {
        return Err(CollectionError::IllegalState(message.to_string()));
    }
    Ok(())
}

/// Ensure an argument expression holds.
pub fn check_expression(
    condition: bool,
    message: impl Into<String>,
) -> Result<(), CollectionError> {
    if !condition {
        return Err(CollectionError::InvalidArgument(message.into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_index_bounds() {
        assert_eq!(check_element_index(0, 1, "index"), Ok(0));
        assert_eq!(
            check_element_index(1, 1, "index"),
            Err(CollectionError::IndexOutOfBounds {
                desc: "index",
                index: 1,
                size: 1
            })
        );
        assert!(check_element_index(0, 0, "index").is_err());
    }

    #[test]
    fn test_position_index_allows_end() {
        assert_eq!(check_position_index(3, 3, "insert"), Ok(3));
        assert!(check_position_index(4, 3, "insert").is_err());
    }

    #[test]
    fn test_state_and_expression_kinds_are_distinct() {
        let state = check_state(false, "empty").unwrap_err();
        let arg = check_expression(false, "bad").unwrap_err();

        assert!(matches!(state, CollectionError::IllegalState(ref m) if m == "empty"));
        assert!(matches!(arg, CollectionError::InvalidArgument(ref m) if m == "bad"));
        assert_eq!(state.to_string(), "illegal state: empty");
    }
}
