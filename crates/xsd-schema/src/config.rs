//! Parser configuration

use serde::Deserialize;

/// Largest document accepted by default (16 MiB)
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for the [`Parser`](crate::Parser)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Check documents against the embedded schema-of-schemas before extraction
    pub validate_structure: bool,
    /// Maximum size in bytes of text handed to `parse_str`/`parse_path`
    pub max_document_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validate_structure: true,
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
        }
    }
}

impl ParserConfig {
    /// Load a configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert!(config.validate_structure);
        assert_eq!(config.max_document_size, 16 * 1024 * 1024);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ParserConfig::from_yaml("validate_structure: false").unwrap();
        assert!(!config.validate_structure);
        assert_eq!(config.max_document_size, DEFAULT_MAX_DOCUMENT_SIZE);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_keys() {
        assert!(ParserConfig::from_yaml("validate: false").is_err());
    }
}
