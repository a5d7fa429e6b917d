//! # ECS Error Types
//!
//! Every failure the ECS can detect. Most of them never reach the caller:
//! recoverable misuse is logged and absorbed at the point of detection. The
//! variants below are what the `try_*` entry points hand back, and what the
//! panicking entry points print before aborting the call.

use thiserror::Error;

use crate::ecs::{ComponentTypeId, Entity};

/// Errors that can occur inside the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// No free entity id is left below the configured maximum.
    #[error("too many entities were created: the maximum is {max}")]
    EntityLimitReached {
        /// Configured maximum entity count.
        max: u32,
    },

    /// The entity id was never allocated, was already destroyed, or lies
    /// outside the configured range.
    #[error("entity {entity} is not alive")]
    EntityNotAlive {
        /// The offending entity.
        entity: Entity,
    },

    /// No further component type can be registered.
    #[error("too many component types were registered: the maximum is {max}")]
    ComponentTypeLimitReached {
        /// Configured maximum component type count.
        max: usize,
    },

    /// The component type was used before being registered.
    #[error("component type {name} has not been registered")]
    ComponentNotRegistered {
        /// Rust type name of the component.
        name: &'static str,
    },

    /// The entity holds no component of the requested type.
    #[error("retrieving non-existent component {name} (type id {type_id}) from entity {entity}")]
    ComponentMissing {
        /// The entity that was queried.
        entity: Entity,
        /// The registered id of the component type.
        type_id: ComponentTypeId,
        /// Rust type name of the component.
        name: &'static str,
    },

    /// A system's membership had to change while a guard from its handle
    /// was still held.
    #[error("system {name} is borrowed while the ECS updates its members")]
    SystemBorrowed {
        /// Rust type name of the system.
        name: &'static str,
    },

    /// Invalid configuration values or file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Reports a contract violation and aborts the current call.
///
/// The error is emitted to the installed `tracing` subscriber first so the
/// diagnostic survives even when the panic message is swallowed.
#[track_caller]
pub(crate) fn fatal(error: &EcsError) -> ! {
    tracing::error!(fatal = true, error = %error, "ECS contract violation");
    panic!("{error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EcsError::EntityLimitReached { max: 10 };
        assert_eq!(err.to_string(), "too many entities were created: the maximum is 10");

        let err = EcsError::ComponentMissing {
            entity: Entity::from_raw(4),
            type_id: 2,
            name: "Health",
        };
        assert!(err.to_string().starts_with("retrieving non-existent component Health"));

        let err = EcsError::SystemBorrowed { name: "Movement" };
        assert_eq!(
            err.to_string(),
            "system Movement is borrowed while the ECS updates its members"
        );
    }

    #[test]
    #[should_panic(expected = "entity 7 is not alive")]
    fn test_fatal_panics_with_display_text() {
        fatal(&EcsError::EntityNotAlive {
            entity: Entity::from_raw(7),
        });
    }
}
