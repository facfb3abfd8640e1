//! Engine options
//!
//! Options are fixed when a root class is created and inherited by every
//! class extended from it. They can be loaded from TOML:
//!
//! ```toml
//! base_lookup = "lenient"
//! root_name = "Widget"
//! ```

use serde::{Deserialize, Serialize};

use crate::{EngineError, EngineResult};

/// How a base view resolves a name its ancestor table does not define
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseLookup {
    /// Fail with `MissingBaseMember`
    #[default]
    Strict,
    /// Resolve to `undefined`; calls become no-ops
    Lenient,
}

/// Options shared by every class of one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Base view lookup policy
    pub base_lookup: BaseLookup,

    /// Name reported by the root class (default: "Fiber")
    pub root_name: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            base_lookup: BaseLookup::Strict,
            root_name: default_root_name(),
        }
    }
}

fn default_root_name() -> String {
    "Fiber".to_string()
}

impl EngineOptions {
    /// Strict base lookup (the default)
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient base lookup
    pub fn lenient() -> Self {
        Self {
            base_lookup: BaseLookup::Lenient,
            ..Default::default()
        }
    }

    /// Set the root class name
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Parse options from TOML
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let options: EngineOptions =
            toml::from_str(content).map_err(|e| EngineError::Options(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Serialize options to TOML
    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Options(e.to_string()))
    }

    /// Validate option values
    pub fn validate(&self) -> EngineResult<()> {
        if self.root_name.trim().is_empty() {
            return Err(EngineError::Options(
                "root_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.base_lookup, BaseLookup::Strict);
        assert_eq!(options.root_name, "Fiber");
    }

    #[test]
    fn test_parse_toml() {
        let options = EngineOptions::from_toml_str(
            r#"
            base_lookup = "lenient"
            root_name = "Widget"
            "#,
        )
        .unwrap();
        assert_eq!(options.base_lookup, BaseLookup::Lenient);
        assert_eq!(options.root_name, "Widget");
    }

    #[test]
    fn test_parse_partial_toml_uses_defaults() {
        let options = EngineOptions::from_toml_str("base_lookup = \"lenient\"").unwrap();
        assert_eq!(options.root_name, "Fiber");
        assert_eq!(EngineOptions::from_toml_str("").unwrap(), EngineOptions::default());
    }

    #[test]
    fn test_parse_rejects_unknown_policy() {
        let err = EngineOptions::from_toml_str("base_lookup = \"loose\"").unwrap_err();
        assert!(matches!(err, EngineError::Options(_)));
    }

    #[test]
    fn test_parse_rejects_empty_root_name() {
        let err = EngineOptions::from_toml_str("root_name = \"  \"").unwrap_err();
        assert_eq!(
            err,
            EngineError::Options("root_name cannot be empty".to_string())
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let options = EngineOptions::lenient().with_root_name("Base");
        let text = options.to_toml_string().unwrap();
        assert_eq!(EngineOptions::from_toml_str(&text).unwrap(), options);
    }
}
