//! # ECS Coordinator
//!
//! The single entry point for application code. It owns the three managers
//! and sequences every call that touches more than one of them:
//!
//! ```text
//! add_component / remove_component:
//!   components ──► entity signature ──► system membership
//!
//! destroy_entity:
//!   components ──► system membership ──► entity id released
//! ```
//!
//! Component storage is always updated before systems are notified, and an
//! entity id only returns to the free pool after every hook has run.

use std::any::type_name;

use super::component::Component;
use super::component_manager::ComponentManager;
use super::entity::Entity;
use super::entity_manager::EntityManager;
use super::signature::{ComponentTypeId, Signature};
use super::storage::ComponentArray;
use super::system::{System, SystemHandle};
use super::system_manager::SystemManager;
use crate::config::EcsConfig;
use crate::error::EcsResult;

/// Owns all entities, components and systems of one ECS instance.
///
/// Construct one per game and pass it to whatever needs it; there is no
/// global instance.
///
/// # Example
///
/// ```rust
/// use tbge_ecs::{Coordinator, Signature, System};
///
/// struct Position(f32);
/// struct Velocity(f32);
///
/// #[derive(Default)]
/// struct Movement;
/// impl System for Movement {}
///
/// let mut ecs = Coordinator::new();
/// let position = ecs.register_component_type::<Position>();
/// let velocity = ecs.register_component_type::<Velocity>();
///
/// let movement = ecs.register_system::<Movement>();
/// ecs.set_system_signature::<Movement>(Signature::from_ids([position, velocity]));
///
/// let entity = ecs.create_entity();
/// ecs.add_component(entity, Position(0.0));
/// assert!(!movement.has_entity(entity));
/// ecs.add_component(entity, Velocity(1.0));
/// assert!(movement.has_entity(entity));
/// ```
pub struct Coordinator {
    config: EcsConfig,
    entities: EntityManager,
    components: ComponentManager,
    systems: SystemManager,
}

impl Coordinator {
    /// Creates a coordinator with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(EcsConfig::default())
    }

    /// Creates a coordinator with custom limits.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig) if
    /// the limits are rejected by [`EcsConfig::validate`].
    pub fn with_config(config: EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: EcsConfig) -> Self {
        tracing::debug!(
            max_entities = config.max_entities,
            max_component_types = config.max_component_types,
            "creating ECS coordinator"
        );
        Self {
            config,
            entities: EntityManager::new(config.max_entities),
            components: ComponentManager::new(config.max_component_types),
            systems: SystemManager::new(),
        }
    }

    /// Returns the limits this coordinator was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }

    /// Read access to the entity manager, for diagnostics.
    #[inline]
    #[must_use]
    pub const fn entity_manager(&self) -> &EntityManager {
        &self.entities
    }

    /// Read access to the component manager, for diagnostics.
    #[inline]
    #[must_use]
    pub const fn component_manager(&self) -> &ComponentManager {
        &self.components
    }

    /// Read access to the system manager, for diagnostics.
    #[inline]
    #[must_use]
    pub const fn system_manager(&self) -> &SystemManager {
        &self.systems
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with an empty signature.
    ///
    /// # Panics
    ///
    /// Panics if the configured maximum entity count is reached.
    #[track_caller]
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create_entity();
        self.entity_created(entity);
        entity
    }

    /// Creates an entity with an empty signature.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityLimitReached`](crate::EcsError::EntityLimitReached)
    /// if the configured maximum entity count is reached.
    pub fn try_create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.try_create_entity()?;
        self.entity_created(entity);
        Ok(entity)
    }

    /// Systems requiring nothing pick up the entity straight away.
    fn entity_created(&self, entity: Entity) {
        self.systems
            .entity_signature_changed(entity, Signature::EMPTY, &self.components);
    }

    /// Destroys an entity and everything attached to it.
    ///
    /// Its components are dropped, every system it belonged to is notified,
    /// and only then is the id released for reuse. Destroying an entity that
    /// is not alive logs an error and changes nothing.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.has_entity(entity) {
            tracing::error!(%entity, "attempted to destroy an entity that is not alive");
            return false;
        }
        self.components.entity_destroyed(entity);
        self.systems.entity_destroyed(entity, &self.components);
        self.entities.destroy_entity(entity)
    }

    /// Returns `true` if `entity` is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.has_entity(entity)
    }

    /// Number of alive entities.
    #[inline]
    #[must_use]
    pub const fn living_entity_count(&self) -> u32 {
        self.entities.living_count()
    }

    /// Returns the component signature of a live entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    #[track_caller]
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Signature {
        self.entities.signature(entity)
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers a component type and returns its id.
    ///
    /// Registering a type twice logs a warning and returns the existing id.
    ///
    /// # Panics
    ///
    /// Panics if the configured maximum component type count is reached.
    #[track_caller]
    pub fn register_component_type<C: Component>(&mut self) -> ComponentTypeId {
        self.components.register_component_type::<C>()
    }

    /// Registers a component type and returns its id.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`EcsError::ComponentTypeLimitReached`](crate::EcsError::ComponentTypeLimitReached)
    /// if the configured maximum component type count is reached.
    pub fn try_register_component_type<C: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        self.components.try_register_component_type::<C>()
    }

    /// Returns the id of a registered component type.
    ///
    /// # Panics
    ///
    /// Panics if `C` was never registered.
    #[track_caller]
    #[must_use]
    pub fn component_type_id<C: Component>(&self) -> ComponentTypeId {
        self.components.component_type_id::<C>()
    }

    /// Returns the id of a registered component type.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`EcsError::ComponentNotRegistered`](crate::EcsError::ComponentNotRegistered)
    /// if `C` was never registered.
    pub fn try_component_type_id<C: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.components.try_component_type_id::<C>()
    }

    /// Attaches `component` to `entity` and updates system membership.
    ///
    /// An unregistered type is registered with a warning. A duplicate is
    /// rejected with a warning and the existing value is kept. On an entity
    /// that is not alive this logs an error and does nothing.
    ///
    /// # Returns
    ///
    /// `true` if the component was stored.
    ///
    /// # Panics
    ///
    /// Panics if implicit registration exceeds the component type limit.
    #[track_caller]
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> bool {
        if !self.entities.has_entity(entity) {
            tracing::error!(
                %entity,
                component = type_name::<C>(),
                "attempted to add a component to an entity that is not alive"
            );
            return false;
        }
        if !self.components.add_component(entity, component) {
            return false;
        }

        let id = self.components.component_type_id::<C>();
        let mut signature = self.entities.signature(entity);
        signature.set(id);
        self.signature_changed(entity, signature);
        true
    }

    /// Detaches the `C` of `entity` and updates system membership.
    ///
    /// An unregistered type is registered with a warning. Removing an absent
    /// component logs a warning. On an entity that is not alive this logs an
    /// error and does nothing.
    ///
    /// # Returns
    ///
    /// The removed component, if there was one.
    ///
    /// # Panics
    ///
    /// Panics if implicit registration exceeds the component type limit.
    #[track_caller]
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Option<C> {
        if !self.entities.has_entity(entity) {
            tracing::error!(
                %entity,
                component = type_name::<C>(),
                "attempted to remove a component from an entity that is not alive"
            );
            return None;
        }
        let removed = self.components.remove_component::<C>(entity)?;

        let id = self.components.component_type_id::<C>();
        let mut signature = self.entities.signature(entity);
        signature.clear(id);
        self.signature_changed(entity, signature);
        Some(removed)
    }

    fn signature_changed(&mut self, entity: Entity, signature: Signature) {
        self.entities.set_signature(entity, signature);
        self.systems
            .entity_signature_changed(entity, signature, &self.components);
    }

    /// Returns `true` if `entity` has a `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components.has_component::<C>(entity)
    }

    /// Returns the `C` of `entity`.
    ///
    /// # Panics
    ///
    /// Panics when retrieving a non-existent component.
    #[track_caller]
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: Entity) -> &C {
        self.components.get_component::<C>(entity)
    }

    /// Returns the `C` of `entity` mutably.
    ///
    /// # Panics
    ///
    /// Panics when retrieving a non-existent component.
    #[track_caller]
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> &mut C {
        self.components.get_component_mut::<C>(entity)
    }

    /// Returns the `C` of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotRegistered`](crate::EcsError::ComponentNotRegistered) or
    /// [`EcsError::ComponentMissing`](crate::EcsError::ComponentMissing).
    pub fn try_get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.components.try_get_component::<C>(entity)
    }

    /// Returns the `C` of `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotRegistered`](crate::EcsError::ComponentNotRegistered) or
    /// [`EcsError::ComponentMissing`](crate::EcsError::ComponentMissing).
    pub fn try_get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.components.try_get_component_mut::<C>(entity)
    }

    /// Returns the packed array of `C`, if registered.
    #[must_use]
    pub fn component_array<C: Component>(&self) -> Option<&ComponentArray<C>> {
        self.components.component_array::<C>()
    }

    /// Returns the packed array of `C` mutably, if registered.
    ///
    /// Only payloads are reachable this way; membership cannot change.
    pub fn component_slice_mut<C: Component>(&mut self) -> Option<&mut [C]> {
        self.components
            .component_array_mut::<C>()
            .map(ComponentArray::as_mut_slice)
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a default-constructed system.
    ///
    /// Registering a type twice logs a warning and returns the existing
    /// instance. A new system matches nothing until its signature is set.
    pub fn register_system<T: System + Default>(&mut self) -> SystemHandle<T> {
        self.systems.register_system::<T>()
    }

    /// Registers a pre-built system instance.
    pub fn register_system_with<T: System>(&mut self, system: T) -> SystemHandle<T> {
        self.systems.register_system_with(system)
    }

    /// Returns the registered instance of `T`.
    #[must_use]
    pub fn get_system<T: System>(&self) -> Option<SystemHandle<T>> {
        self.systems.get_system::<T>()
    }

    /// Sets the signature entities need to match `T`.
    ///
    /// Every live entity is re-evaluated against it. On an unregistered
    /// system this logs an error and does nothing.
    ///
    /// # Returns
    ///
    /// `true` if the signature was applied.
    pub fn set_system_signature<T: System>(&mut self, signature: Signature) -> bool {
        if !self.systems.set_signature::<T>(signature) {
            return false;
        }
        self.systems
            .refresh_system::<T>(self.entities.iter_living(), &self.components);
        true
    }

    /// Returns the signature required by `T`, if registered and configured.
    #[must_use]
    pub fn system_signature<T: System>(&self) -> Option<Signature> {
        self.systems.signature_of::<T>()
    }

    /// Returns `true` if the signature of `entity` covers the one required
    /// by `T`.
    ///
    /// Dead entities, unregistered systems and systems without a signature
    /// yield `false`.
    #[must_use]
    pub fn entity_matches_system<T: System>(&self, entity: Entity) -> bool {
        let Ok(signature) = self.entities.try_signature(entity) else {
            return false;
        };
        self.systems
            .signature_of::<T>()
            .is_some_and(|required| signature.contains_all(&required))
    }

    /// Checks that the signature of a live entity agrees with the component
    /// arrays: bit `k` is set iff the entity holds the type with id `k`.
    ///
    /// Intended for tests and debug assertions.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    #[track_caller]
    #[must_use]
    pub fn is_consistent(&self, entity: Entity) -> bool {
        let signature = self.entities.signature(entity);
        (0..self.components.registered_count())
            .filter_map(|index| ComponentTypeId::try_from(index).ok())
            .all(|id| signature.has(id) == self.components.holds_by_id(id, entity))
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}
