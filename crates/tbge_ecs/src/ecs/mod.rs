//! # Entity Component System
//!
//! Entities are recyclable integer ids, components are arbitrary data types
//! stored in packed per-type arrays, and systems track the entities whose
//! signature covers the components they require.
//!
//! ## Layering
//!
//! - [`EntityManager`]: id allocation and per-entity signatures
//! - [`ComponentArray`]: packed storage for one component type
//! - [`ComponentManager`]: type registry and dispatch over arrays
//! - [`SystemManager`]: system registry and membership bookkeeping
//! - [`Coordinator`]: the façade that keeps the other four consistent

mod component;
mod component_manager;
mod coordinator;
mod entity;
mod entity_manager;
mod signature;
mod storage;
mod system;
mod system_manager;

pub use component::Component;
pub use component_manager::ComponentManager;
pub use coordinator::Coordinator;
pub use entity::Entity;
pub use entity_manager::EntityManager;
pub use signature::{ComponentTypeId, Signature, MAX_COMPONENT_TYPES};
pub use storage::{ComponentArray, ErasedComponentArray};
pub use system::{System, SystemHandle};
pub use system_manager::SystemManager;
