//! Email address type.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing an [`EmailAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailAddressError {
    /// The input is empty after trimming.
    #[error("email cannot be empty")]
    Empty,
    /// The input is longer than the SMTP path limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not have exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MalformedAt,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty or has no dot.
    #[error("email domain must be a dotted host name")]
    InvalidDomain,
    /// The input contains whitespace or control characters.
    #[error("email cannot contain whitespace")]
    Whitespace,
}

/// A recipient email address.
///
/// Surrounding whitespace is trimmed and the domain is lowercased, so two
/// spellings of the same mailbox compare equal. The local part keeps its case.
///
/// ```
/// use sareine_core::EmailAddress;
///
/// let email = EmailAddress::parse("  Priya@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "Priya@example.com");
///
/// assert!(EmailAddress::parse("").is_err());
/// assert!(EmailAddress::parse("no-at-symbol").is_err());
/// assert!(EmailAddress::parse("user@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Maximum length of an address (RFC 5321 path limit).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalise an address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailAddressError`] describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, EmailAddressError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(EmailAddressError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailAddressError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(EmailAddressError::Whitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailAddressError::MalformedAt)?;
        if domain.contains('@') {
            return Err(EmailAddressError::MalformedAt);
        }
        if local.is_empty() {
            return Err(EmailAddressError::EmptyLocalPart);
        }
        if domain.is_empty()
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(EmailAddressError::InvalidDomain);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the address and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the domain part (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, d)| d)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for EmailAddress {
    type Err = EmailAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_domain_only() {
        let email = EmailAddress::parse("Meera.Iyer@GMAIL.com").unwrap();
        assert_eq!(email.as_str(), "Meera.Iyer@gmail.com");
        assert_eq!(email.domain(), "gmail.com");
    }

    #[test]
    fn test_parse_rejects_double_at() {
        assert_eq!(
            EmailAddress::parse("a@b@c.com"),
            Err(EmailAddressError::MalformedAt)
        );
    }

    #[test]
    fn test_parse_rejects_inner_whitespace() {
        assert_eq!(
            EmailAddress::parse("first last@example.com"),
            Err(EmailAddressError::Whitespace)
        );
    }

    #[test]
    fn test_parse_rejects_bad_domains() {
        for input in ["user@", "user@localhost", "user@.com", "user@example."] {
            assert_eq!(
                EmailAddress::parse(input),
                Err(EmailAddressError::InvalidDomain),
                "{input}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            EmailAddress::parse(&long),
            Err(EmailAddressError::TooLong { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: EmailAddress = serde_json::from_str("\"ops@sareine.in\"").unwrap();
        assert_eq!(ok.as_str(), "ops@sareine.in");

        let err = serde_json::from_str::<EmailAddress>("\"nope\"");
        assert!(err.is_err());
    }
}
