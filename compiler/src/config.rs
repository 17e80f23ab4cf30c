use serde::{Deserialize, Serialize};

use crate::error::IdlError;

/// Settings for package construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Namespace option that overrides a package's display name.
    pub name_option:         String,
    /// Namespace option that sets a package's import path.
    pub import_option:       String,
    /// Display name of the implicit root namespace.
    pub default_name:        String,
    /// Import base used when no scope sets `import_option`.
    pub default_import_path: String,
    /// Leading segment of every mangled identifier.
    pub mangle_prefix:       String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            name_option:         "package".to_owned(),
            import_option:       "import".to_owned(),
            default_name:        "rpc".to_owned(),
            default_import_path: String::new(),
            mangle_prefix:       "rpc".to_owned(),
        }
    }
}

impl BuildConfig {
    /// Reads a config from JSON. Missing fields take their default.
    pub fn from_json(text: &str) -> Result<Self, IdlError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BuildConfig::from_json(r#"{ "default_name": "api" }"#).unwrap();
        assert_eq!(config.default_name, "api");
        assert_eq!(config.name_option, "package");
        assert_eq!(config.mangle_prefix, "rpc");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = BuildConfig::from_json("{").unwrap_err();
        assert!(matches!(err, IdlError::Json(_)));
    }
}
