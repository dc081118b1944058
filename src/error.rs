//! Error type shared by the f64 and decimal evaluation paths.

/// Error type for invalid inputs to the manifestation functions.
///
/// Every variant is raised before any computation starts; no function in
/// this crate returns a clamped or partial value for a rejected input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ManifestationError {
    /// An argument lies outside the mathematical domain of the function.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A decimal literal could not be parsed.
    #[error("cannot parse decimal `{input}`: {reason}")]
    Parse { input: String, reason: &'static str },
}

impl ManifestationError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl std::fmt::Display,
        reason: &'static str,
    ) -> Self {
        ManifestationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Returns `true` for [`ManifestationError::InvalidParameter`].
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, ManifestationError::InvalidParameter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_parameter() {
        let err = ManifestationError::invalid("p", 1.5, "must be in [0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid parameter `p` = 1.5: must be in [0, 1]"
        );
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_display_parse() {
        let err = ManifestationError::Parse {
            input: "1e".into(),
            reason: "missing exponent digits",
        };
        assert_eq!(
            err.to_string(),
            "cannot parse decimal `1e`: missing exponent digits"
        );
        assert!(!err.is_invalid_parameter());
    }
}
