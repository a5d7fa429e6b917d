//! # Component Manager
//!
//! Registry of component types and dispatcher over their arrays.
//!
//! Each registered type gets the next free [`ComponentTypeId`] and one
//! [`ComponentArray`]. Arrays of unrelated types share one table behind
//! [`ErasedComponentArray`]; typed calls recover the concrete array through a
//! checked downcast keyed by the type's `TypeId`.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use super::component::Component;
use super::entity::Entity;
use super::signature::{ComponentTypeId, MAX_COMPONENT_TYPES};
use super::storage::{ComponentArray, ErasedComponentArray};
use crate::error::{fatal, EcsError, EcsResult};

/// Owns one component array per registered type.
pub struct ComponentManager {
    /// Rust type → assigned id.
    type_ids: HashMap<TypeId, ComponentTypeId>,
    /// Arrays indexed by component type id.
    arrays: Vec<Box<dyn ErasedComponentArray>>,
    /// Upper bound on registered types.
    max_component_types: usize,
}

impl ComponentManager {
    /// Creates a manager accepting up to `max_component_types` types.
    ///
    /// The limit is clamped to the signature width.
    #[must_use]
    pub fn new(max_component_types: usize) -> Self {
        Self {
            type_ids: HashMap::new(),
            arrays: Vec::new(),
            max_component_types: max_component_types.min(MAX_COMPONENT_TYPES),
        }
    }

    /// Returns the configured maximum type count.
    #[inline]
    #[must_use]
    pub const fn max_component_types(&self) -> usize {
        self.max_component_types
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.arrays.len()
    }

    /// Returns `true` if `C` has been registered.
    #[inline]
    #[must_use]
    pub fn is_registered<C: Component>(&self) -> bool {
        self.type_ids.contains_key(&TypeId::of::<C>())
    }

    /// Rust type name of the component registered under `id`.
    #[must_use]
    pub fn component_type_name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.arrays
            .get(usize::from(id))
            .map(|array| array.component_name())
    }

    /// Registers `C` and creates its array.
    ///
    /// Registering an already known type logs a warning and returns its
    /// existing id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentTypeLimitReached`] if the configured
    /// maximum type count is already registered.
    pub fn try_register_component_type<C: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        if let Some(&id) = self.type_ids.get(&TypeId::of::<C>()) {
            tracing::warn!(
                component = type_name::<C>(),
                type_id = id,
                "registering component type more than once; operation ignored"
            );
            return Ok(id);
        }
        self.register_new::<C>()
    }

    /// Registers `C` and creates its array.
    ///
    /// # Panics
    ///
    /// Panics if the configured maximum type count is already registered.
    #[track_caller]
    pub fn register_component_type<C: Component>(&mut self) -> ComponentTypeId {
        match self.try_register_component_type::<C>() {
            Ok(id) => id,
            Err(e) => fatal(&e),
        }
    }

    fn register_new<C: Component>(&mut self) -> EcsResult<ComponentTypeId> {
        let next = self.arrays.len();
        let id = match ComponentTypeId::try_from(next) {
            Ok(id) if next < self.max_component_types => id,
            _ => {
                return Err(EcsError::ComponentTypeLimitReached {
                    max: self.max_component_types,
                })
            }
        };

        self.type_ids.insert(TypeId::of::<C>(), id);
        self.arrays.push(Box::new(ComponentArray::<C>::new()));
        tracing::debug!(component = type_name::<C>(), type_id = id, "registered component type");
        Ok(id)
    }

    /// Registers `C` on first use, warning that registration was implicit.
    #[track_caller]
    fn ensure_registered<C: Component>(&mut self) -> ComponentTypeId {
        if let Some(&id) = self.type_ids.get(&TypeId::of::<C>()) {
            return id;
        }
        tracing::warn!(
            component = type_name::<C>(),
            "component type used before registration; registering it now"
        );
        match self.register_new::<C>() {
            Ok(id) => id,
            Err(e) => fatal(&e),
        }
    }

    /// Returns the id assigned to `C`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotRegistered`] if `C` was never registered.
    pub fn try_component_type_id<C: Component>(&self) -> EcsResult<ComponentTypeId> {
        self.type_ids
            .get(&TypeId::of::<C>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered {
                name: type_name::<C>(),
            })
    }

    /// Returns the id assigned to `C`.
    ///
    /// # Panics
    ///
    /// Panics if `C` was never registered.
    #[track_caller]
    #[must_use]
    pub fn component_type_id<C: Component>(&self) -> ComponentTypeId {
        match self.try_component_type_id::<C>() {
            Ok(id) => id,
            Err(e) => fatal(&e),
        }
    }

    /// Returns `true` if the array registered under `id` holds `entity`.
    #[must_use]
    pub fn holds_by_id(&self, id: ComponentTypeId, entity: Entity) -> bool {
        self.arrays
            .get(usize::from(id))
            .is_some_and(|array| array.contains(entity))
    }

    /// Returns the array of `C`, if registered.
    #[must_use]
    pub fn component_array<C: Component>(&self) -> Option<&ComponentArray<C>> {
        let id = *self.type_ids.get(&TypeId::of::<C>())?;
        self.arrays[usize::from(id)]
            .as_any()
            .downcast_ref::<ComponentArray<C>>()
    }

    /// Returns the array of `C` mutably, if registered.
    pub fn component_array_mut<C: Component>(&mut self) -> Option<&mut ComponentArray<C>> {
        let id = *self.type_ids.get(&TypeId::of::<C>())?;
        self.arrays[usize::from(id)]
            .as_any_mut()
            .downcast_mut::<ComponentArray<C>>()
    }

    /// Array of a type that is known to be registered.
    fn array_mut_by_id<C: Component>(&mut self, id: ComponentTypeId) -> &mut ComponentArray<C> {
        match self.arrays[usize::from(id)]
            .as_any_mut()
            .downcast_mut::<ComponentArray<C>>()
        {
            Some(array) => array,
            // The id came from `type_ids`, which only maps a TypeId to the
            // array created for that same type.
            None => unreachable!("component array {id} does not hold {}", type_name::<C>()),
        }
    }

    /// Attaches `component` to `entity`.
    ///
    /// An unregistered `C` is registered with a warning. If the entity
    /// already has a `C`, a warning is logged and the existing value is kept.
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
        let id = self.ensure_registered::<C>();
        let inserted = self.array_mut_by_id::<C>(id).insert_data(entity, component);
        if !inserted {
            tracing::warn!(
                %entity,
                component = type_name::<C>(),
                "entity already has this component; existing value kept"
            );
        }
        inserted
    }

    /// Detaches the `C` of `entity`.
    ///
    /// An unregistered `C` is registered with a warning. Removing a component
    /// the entity does not have logs a warning.
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
        let id = self.ensure_registered::<C>();
        let removed = self.array_mut_by_id::<C>(id).remove_data(entity);
        if removed.is_none() {
            tracing::warn!(
                %entity,
                component = type_name::<C>(),
                "removing a component the entity does not have"
            );
        }
        removed
    }

    /// Returns `true` if `entity` has a `C`. Unregistered types yield `false`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.component_array::<C>()
            .is_some_and(|array| array.has_data(entity))
    }

    fn missing<C: Component>(&self, entity: Entity) -> EcsError {
        match self.try_component_type_id::<C>() {
            Ok(type_id) => EcsError::ComponentMissing {
                entity,
                type_id,
                name: type_name::<C>(),
            },
            Err(e) => e,
        }
    }

    /// Returns the `C` of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotRegistered`] or
    /// [`EcsError::ComponentMissing`].
    pub fn try_get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.component_array::<C>()
            .and_then(|array| array.get_data(entity))
            .ok_or_else(|| self.missing::<C>(entity))
    }

    /// Returns the `C` of `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotRegistered`] or
    /// [`EcsError::ComponentMissing`].
    pub fn try_get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let type_id = self.try_component_type_id::<C>()?;
        match self.array_mut_by_id::<C>(type_id).get_data_mut(entity) {
            Some(component) => Ok(component),
            None => Err(EcsError::ComponentMissing {
                entity,
                type_id,
                name: type_name::<C>(),
            }),
        }
    }

    /// Returns the `C` of `entity`.
    ///
    /// # Panics
    ///
    /// Panics when retrieving a non-existent component.
    #[track_caller]
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: Entity) -> &C {
        match self.try_get_component::<C>(entity) {
            Ok(component) => component,
            Err(e) => fatal(&e),
        }
    }

    /// Returns the `C` of `entity` mutably.
    ///
    /// # Panics
    ///
    /// Panics when retrieving a non-existent component.
    #[track_caller]
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> &mut C {
        match self.try_get_component_mut::<C>(entity) {
            Ok(component) => component,
            Err(e) => fatal(&e),
        }
    }

    /// Drops every component of a destroyed entity.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for array in &mut self.arrays {
            array.entity_destroyed(entity);
        }
    }
}

impl Default for ComponentManager {
    fn default() -> Self {
        Self::new(MAX_COMPONENT_TYPES)
    }
}
