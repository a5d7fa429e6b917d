//! # TBGE ECS
//!
//! Entity Component System runtime for the text-based game engine:
//! - Recyclable integer entity ids with per-entity component signatures
//! - Packed, gap-free storage per component type
//! - Systems that automatically track every entity carrying the components
//!   they require
//!
//! ## Architecture Rules
//!
//! 1. **One entry point** - Application code talks to a [`Coordinator`] only
//! 2. **Derived membership** - System entity sets change only through
//!    signature updates, never by hand
//! 3. **Single-threaded** - Every call runs to completion; callers that share
//!    a coordinator across threads serialize access themselves
//!
//! ## Diagnostics
//!
//! Misuse is reported through `tracing`. Recoverable mistakes log at WARN,
//! out-of-range entity access logs at ERROR and is ignored, and contract
//! violations log at ERROR with `fatal = true` before panicking. Every
//! panicking call has a `try_*` twin returning [`EcsError`].
//!
//! ## Example
//!
//! ```rust
//! use tbge_ecs::{Coordinator, EcsConfig};
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: i32, y: i32 }
//!
//! let mut ecs = Coordinator::with_config(EcsConfig::default().with_max_entities(1_000))?;
//! ecs.register_component_type::<Position>();
//!
//! let player = ecs.create_entity();
//! ecs.add_component(player, Position { x: 0, y: 0 });
//! ecs.get_component_mut::<Position>(player).x += 1;
//! assert_eq!(ecs.get_component::<Position>(player), &Position { x: 1, y: 0 });
//! # Ok::<(), tbge_ecs::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::EcsConfig;
pub use ecs::{
    Component, ComponentArray, ComponentManager, ComponentTypeId, Coordinator, Entity,
    EntityManager, ErasedComponentArray, Signature, System, SystemHandle, SystemManager,
    MAX_COMPONENT_TYPES,
};
pub use error::{EcsError, EcsResult};
