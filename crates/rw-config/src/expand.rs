//! `${VAR}` expansion in configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references.
///
/// An unset variable without a default is an error naming `field`. Bare `$VAR`
/// is left alone, so values without `${` are returned as-is.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(UnsetVar(name.to_owned())),
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        })
}

/// Name of a variable that is not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("docs", "docs.source_dir").unwrap(), "docs");
        assert_eq!(expand_env("$HOME/docs", "docs.source_dir").unwrap(), "$HOME/docs");
    }

    #[test]
    fn test_expands_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("RW_EXPAND_TEST_ROOT", "/srv/site");
        }
        let result = expand_env("${RW_EXPAND_TEST_ROOT}/docs", "docs.source_dir").unwrap();
        assert_eq!(result, "/srv/site/docs");
        unsafe {
            std::env::remove_var("RW_EXPAND_TEST_ROOT");
        }
    }

    #[test]
    fn test_default_for_unset_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RW_EXPAND_TEST_UNSET");
        }
        let result = expand_env("${RW_EXPAND_TEST_UNSET:-content}", "docs.source_dir").unwrap();
        assert_eq!(result, "content");
    }

    #[test]
    fn test_unset_var_error_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RW_EXPAND_TEST_MISSING");
        }
        let err = expand_env("${RW_EXPAND_TEST_MISSING}", "docs.source_dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in docs.source_dir: ${RW_EXPAND_TEST_MISSING} not set"
        );
    }
}
