//! Name types for the coin shop.
//!
//! Users and products are both keyed by human-readable names. These newtypes
//! validate the name once at the boundary so the rest of the code can rely on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a username or product name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// A validated username.
///
/// Usernames are the primary key of the `users` table and the `sub` claim of
/// issued tokens.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Return the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated product name (the `{item}` path segment of a purchase).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    /// Return the product name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors from parsing a name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The name is empty.
    #[error("name is empty")]
    Empty,

    /// The name exceeds [`MAX_NAME_LEN`] characters.
    #[error("name exceeds {MAX_NAME_LEN} characters")]
    TooLong,

    /// The name starts or ends with whitespace.
    #[error("name has leading or trailing whitespace")]
    SurroundingWhitespace,
}

fn validate(s: &str) -> Result<(), NameError> {
    if s.is_empty() {
        return Err(NameError::Empty);
    }
    if s.chars().count() > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if s.trim() != s {
        return Err(NameError::SurroundingWhitespace);
    }
    Ok(())
}

macro_rules! name_impls {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = NameError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl TryFrom<String> for $ty {
            type Error = NameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$ty> for String {
            fn from(name: $ty) -> Self {
                name.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({})"), self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_impls!(Username);
name_impls!(ProductName);
