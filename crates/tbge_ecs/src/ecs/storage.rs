//! # Component Storage
//!
//! Packed storage for one component type (a sparse set):
//!
//! ```text
//! dense:          [A, C, D]        <- payloads, no gaps
//! index→entity:   [1, 3, 4]
//! entity→index:   {1: 0, 3: 1, 4: 2}
//!
//! remove(1): move last (D) into slot 0, patch maps, pop
//! dense:          [D, C]
//! index→entity:   [4, 3]
//! entity→index:   {4: 0, 3: 1}
//! ```
//!
//! - Insert, remove and lookup are O(1)
//! - Iteration walks one contiguous slice

use std::any::{type_name, Any};
use std::collections::HashMap;

use super::component::Component;
use super::entity::Entity;

/// Type-erased view of a [`ComponentArray`].
///
/// The component manager keeps every array behind this trait so arrays of
/// unrelated types can live in one table. Typed access goes through
/// [`as_any`](Self::as_any) and a checked downcast.
pub trait ErasedComponentArray: Any + Send + Sync {
    /// Drops the destroyed entity's component, if it has one.
    fn entity_destroyed(&mut self, entity: Entity);

    /// Returns `true` if the entity has a component in this array.
    fn contains(&self, entity: Entity) -> bool;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Returns `true` if no component is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rust type name of the stored component.
    fn component_name(&self) -> &'static str;

    /// Immutable reference for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable reference for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust
/// use tbge_ecs::{ComponentArray, Entity};
///
/// let mut health: ComponentArray<u32> = ComponentArray::new();
/// health.insert_data(Entity::from_raw(3), 100);
/// assert_eq!(health.get_data(Entity::from_raw(3)), Some(&100));
/// ```
pub struct ComponentArray<C: Component> {
    /// The packed payloads.
    dense: Vec<C>,
    /// Owner of each dense slot; parallel to `dense`.
    index_to_entity: Vec<Entity>,
    /// Dense slot of each owning entity.
    entity_to_index: HashMap<Entity, usize>,
}

impl<C: Component> ComponentArray<C> {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            index_to_entity: Vec::new(),
            entity_to_index: HashMap::new(),
        }
    }

    /// Creates an empty array with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            index_to_entity: Vec::with_capacity(capacity),
            entity_to_index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if no component is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Appends a component for `entity`.
    ///
    /// An entity holds at most one component per type. If it already has
    /// one, the stored value is kept and `component` is dropped.
    ///
    /// # Returns
    ///
    /// `true` if the component was inserted, `false` if the entity already
    /// had one.
    pub fn insert_data(&mut self, entity: Entity, component: C) -> bool {
        if self.entity_to_index.contains_key(&entity) {
            return false;
        }

        let index = self.dense.len();
        self.dense.push(component);
        self.index_to_entity.push(entity);
        self.entity_to_index.insert(entity, index);
        true
    }

    /// Removes the component of `entity`, keeping the array packed.
    ///
    /// The last component is moved into the freed slot.
    ///
    /// # Returns
    ///
    /// The removed component, or `None` if the entity had none.
    pub fn remove_data(&mut self, entity: Entity) -> Option<C> {
        let index = self.entity_to_index.remove(&entity)?;

        let removed = self.dense.swap_remove(index);
        self.index_to_entity.swap_remove(index);

        // Patch the moved element, unless the removed slot was the last one.
        if let Some(&moved) = self.index_to_entity.get(index) {
            self.entity_to_index.insert(moved, index);
        }

        Some(removed)
    }

    /// Returns the component of `entity`.
    #[inline]
    #[must_use]
    pub fn get_data(&self, entity: Entity) -> Option<&C> {
        let index = *self.entity_to_index.get(&entity)?;
        self.dense.get(index)
    }

    /// Returns the component of `entity` mutably.
    #[inline]
    pub fn get_data_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let index = *self.entity_to_index.get(&entity)?;
        self.dense.get_mut(index)
    }

    /// Returns `true` if `entity` has a component here.
    #[inline]
    #[must_use]
    pub fn has_data(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Drops the component of a destroyed entity. No-op if it had none.
    #[inline]
    pub fn entity_destroyed(&mut self, entity: Entity) {
        self.remove_data(entity);
    }

    /// Returns the owner of dense slot `index`.
    #[inline]
    #[must_use]
    pub fn entity_of(&self, index: usize) -> Option<Entity> {
        self.index_to_entity.get(index).copied()
    }

    /// Returns the packed payloads.
    ///
    /// Slot `i` belongs to `self.entities()[i]`.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.dense
    }

    /// Returns the packed payloads mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.dense
    }

    /// Returns the owning entities in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.index_to_entity
    }

    /// Iterates over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.index_to_entity.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.index_to_entity
            .iter()
            .copied()
            .zip(self.dense.iter_mut())
    }

    /// Removes every component.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.index_to_entity.clear();
        self.entity_to_index.clear();
    }
}

impl<C: Component> Default for ComponentArray<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> ErasedComponentArray for ComponentArray<C> {
    fn entity_destroyed(&mut self, entity: Entity) {
        ComponentArray::entity_destroyed(self, entity);
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has_data(entity)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Health(u32);

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    /// Every slot's owner maps back to that slot, and vice versa.
    fn assert_maps_inverse<C: Component>(array: &ComponentArray<C>) {
        assert_eq!(array.dense.len(), array.index_to_entity.len());
        assert_eq!(array.dense.len(), array.entity_to_index.len());
        for (index, entity) in array.index_to_entity.iter().enumerate() {
            assert_eq!(array.entity_to_index[entity], index);
        }
    }

    #[test]
    fn test_insert_get() {
        let mut array = ComponentArray::new();
        assert!(array.insert_data(e(50), Health(10)));

        assert_eq!(array.get_data(e(50)), Some(&Health(10)));
        assert!(array.has_data(e(50)));
        assert!(!array.has_data(e(49)));
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_keeps_first() {
        let mut array = ComponentArray::new();
        assert!(array.insert_data(e(1), Health(1)));
        assert!(!array.insert_data(e(1), Health(2)));

        assert_eq!(array.get_data(e(1)), Some(&Health(1)));
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn test_remove_middle_stays_packed() {
        let mut array = ComponentArray::new();
        array.insert_data(e(1), Health(1));
        array.insert_data(e(2), Health(2));
        array.insert_data(e(3), Health(3));

        assert_eq!(array.remove_data(e(2)), Some(Health(2)));

        assert_eq!(array.len(), 2);
        assert!(array.get_data(e(2)).is_none());
        let mut owners = array.entities().to_vec();
        owners.sort();
        assert_eq!(owners, vec![e(1), e(3)]);
        assert_eq!(array.get_data(e(3)), Some(&Health(3)));
        assert_maps_inverse(&array);
    }

    #[test]
    fn test_remove_last_and_only() {
        let mut array = ComponentArray::new();
        array.insert_data(e(1), Health(1));
        array.insert_data(e(2), Health(2));

        assert_eq!(array.remove_data(e(2)), Some(Health(2)));
        assert_maps_inverse(&array);
        assert_eq!(array.remove_data(e(1)), Some(Health(1)));
        assert!(array.is_empty());
        assert_maps_inverse(&array);
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let mut array: ComponentArray<Health> = ComponentArray::new();
        assert_eq!(array.remove_data(e(9)), None);
        array.entity_destroyed(e(9));
        assert!(array.is_empty());
    }

    #[test]
    fn test_iter_mut_updates_in_place() {
        let mut array = ComponentArray::with_capacity(4);
        for id in 0..4 {
            array.insert_data(e(id), Health(id));
        }
        for (_, health) in array.iter_mut() {
            health.0 += 100;
        }
        assert_eq!(array.get_data(e(3)), Some(&Health(103)));
        assert!(array.iter().all(|(entity, health)| health.0 == entity.id() + 100));
    }

    #[test]
    fn test_erased_downcast() {
        let mut array = ComponentArray::new();
        array.insert_data(e(7), Health(70));

        let erased: Box<dyn ErasedComponentArray> = Box::new(array);
        assert!(erased.contains(e(7)));
        assert!(erased.component_name().ends_with("Health"));

        let typed = erased
            .as_any()
            .downcast_ref::<ComponentArray<Health>>()
            .unwrap();
        assert_eq!(typed.get_data(e(7)), Some(&Health(70)));
        assert!(erased.as_any().downcast_ref::<ComponentArray<u8>>().is_none());
    }
}
