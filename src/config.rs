use std::fmt;
use std::num::{IntErrorKind, NonZeroUsize};
use std::str::FromStr;

use crate::error::{CacheError, Result};

/// Construction parameters for a bounded cache.
///
/// The textual form is a single positive integer, the capacity, optionally
/// surrounded by whitespace:
///
/// ```rust
/// use bounded_lru::CacheConfig;
///
/// let config: CacheConfig = " 128 ".parse().unwrap();
/// assert_eq!(config.capacity(), 128);
/// assert!("0".parse::<CacheConfig>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    capacity: NonZeroUsize,
}

impl CacheConfig {
    /// Creates a configuration for `capacity` entries, rejecting zero.
    pub fn new(capacity: usize) -> Result<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::from)
            .ok_or_else(|| CacheError::invalid(capacity.to_string(), "capacity must be positive"))
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl FromStr for CacheConfig {
    type Err = CacheError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CacheError::invalid(input, "capacity is missing"));
        }

        let value = trimmed.parse::<usize>().map_err(|err| {
            let reason = match err.kind() {
                IntErrorKind::PosOverflow => "capacity is too large",
                // Unsigned parsing rejects any sign, so look again for a negative number
                _ => match trimmed.parse::<isize>() {
                    Ok(_) => "capacity must be positive",
                    Err(err) if *err.kind() == IntErrorKind::NegOverflow => {
                        "capacity must be positive"
                    }
                    Err(_) => "capacity is not an integer",
                },
            };
            CacheError::invalid(input, reason)
        })?;

        NonZeroUsize::new(value)
            .map(Self::from)
            .ok_or_else(|| CacheError::invalid(input, "capacity must be positive"))
    }
}

impl From<NonZeroUsize> for CacheConfig {
    fn from(capacity: NonZeroUsize) -> Self {
        Self { capacity }
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason_of(input: &str) -> &'static str {
        match input.parse::<CacheConfig>() {
            Err(CacheError::InvalidConfiguration { reason, .. }) => reason,
            Ok(config) => panic!("{:?} unexpectedly parsed as {:?}", input, config),
        }
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!("1".parse::<CacheConfig>().unwrap().capacity(), 1);
        assert_eq!("\t4096\n".parse::<CacheConfig>().unwrap().capacity(), 4096);
        assert_eq!("+7".parse::<CacheConfig>().unwrap().capacity(), 7);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(reason_of(""), "capacity is missing");
        assert_eq!(reason_of("   "), "capacity is missing");
        assert_eq!(reason_of("0"), "capacity must be positive");
        assert_eq!(reason_of("-3"), "capacity must be positive");
        assert_eq!(reason_of("ten"), "capacity is not an integer");
        assert_eq!(reason_of("1.5"), "capacity is not an integer");
        assert_eq!(reason_of("-0"), "capacity must be positive");
        assert_eq!(reason_of("-"), "capacity is not an integer");
        assert_eq!(reason_of("12ab"), "capacity is not an integer");
    }

    #[test]
    fn test_parse_overflow() {
        assert_eq!(reason_of("99999999999999999999999"), "capacity is too large");
        let past_max = format!("{}0", usize::MAX);
        assert_eq!(reason_of(&past_max), "capacity is too large");
        assert_eq!(reason_of("-99999999999999999999999"), "capacity must be positive");
        assert_eq!(
            usize::MAX.to_string().parse::<CacheConfig>().unwrap().capacity(),
            usize::MAX
        );
    }

    #[test]
    fn test_error_keeps_input() {
        let err = "abc".parse::<CacheConfig>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid cache configuration \"abc\": capacity is not an integer"
        );
    }

    #[test]
    fn test_new() {
        assert_eq!(CacheConfig::new(3).unwrap().capacity(), 3);
        assert!(CacheConfig::new(0).is_err());
        assert_eq!(CacheConfig::new(12).unwrap().to_string(), "12");
    }
}
