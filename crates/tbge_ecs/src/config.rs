//! # ECS Configuration
//!
//! Capacity limits chosen once per coordinator. They bound the entity id
//! space and the number of component types, and cannot be changed after the
//! [`Coordinator`](crate::Coordinator) is built.
//!
//! Limits can be written inline or loaded from TOML:
//!
//! ```toml
//! max_entities = 50000
//! max_component_types = 128
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::MAX_COMPONENT_TYPES;
use crate::error::{EcsError, EcsResult};

/// Default maximum number of simultaneously allocated entity ids.
pub const DEFAULT_MAX_ENTITIES: u32 = 50_000;

/// Capacity limits of one ECS instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Upper bound on entity ids. Ids are minted from `0..max_entities`.
    pub max_entities: u32,
    /// Upper bound on registered component types. At most
    /// [`MAX_COMPONENT_TYPES`], the width of a [`Signature`](crate::Signature).
    pub max_component_types: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_component_types: MAX_COMPONENT_TYPES,
        }
    }
}

impl EcsConfig {
    /// Sets the maximum entity count.
    #[must_use]
    pub const fn with_max_entities(mut self, max_entities: u32) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Sets the maximum component type count.
    #[must_use]
    pub const fn with_max_component_types(mut self, max_component_types: usize) -> Self {
        self.max_component_types = max_component_types;
        self
    }

    /// Checks that both limits are usable.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if a limit is zero or the component
    /// type limit exceeds the signature width.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".to_string(),
            ));
        }
        if self.max_component_types == 0 {
            return Err(EcsError::InvalidConfig(
                "max_component_types must be greater than zero".to_string(),
            ));
        }
        if self.max_component_types > MAX_COMPONENT_TYPES {
            return Err(EcsError::InvalidConfig(format!(
                "max_component_types is {} but signatures hold at most {MAX_COMPONENT_TYPES} bits",
                self.max_component_types
            )));
        }
        Ok(())
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on malformed TOML, unknown keys or
    /// values rejected by [`EcsConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or its
    /// contents are rejected by [`EcsConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EcsError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EcsConfig::default();
        assert_eq!(config.max_entities, DEFAULT_MAX_ENTITIES);
        assert_eq!(config.max_component_types, MAX_COMPONENT_TYPES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = EcsConfig::from_toml_str("max_entities = 12\n").unwrap();
        assert_eq!(config.max_entities, 12);
        assert_eq!(config.max_component_types, MAX_COMPONENT_TYPES);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(matches!(
            EcsConfig::from_toml_str("max_entities = 0"),
            Err(EcsError::InvalidConfig(_))
        ));
        assert!(matches!(
            EcsConfig::from_toml_str("max_component_types = 100000"),
            Err(EcsError::InvalidConfig(_))
        ));
        assert!(matches!(
            EcsConfig::from_toml_str("max_systems = 3"),
            Err(EcsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let path = std::env::temp_dir().join("tbge_ecs_config_that_does_not_exist.toml");
        assert!(matches!(
            EcsConfig::from_toml_file(&path),
            Err(EcsError::InvalidConfig(_))
        ));
    }
}
