//! # Systems
//!
//! A system is application logic plus the set of entities it currently
//! matches. The set is derived: the ECS adds and removes entities as their
//! signatures change, and application code can only read it.
//!
//! ```text
//! SystemHandle<T> ──► Arc<RwLock<SystemCell<T>>>
//!                                 ├── entities: BTreeSet<Entity>   (ECS-owned)
//!                                 └── system:   T                  (app-owned)
//! ```
//!
//! ## Locking
//!
//! The payload lives behind a `parking_lot::RwLock` so the manager and any
//! number of handles can share it. The ECS write-locks a system while
//! notifying it, so a guard obtained from [`SystemHandle::read`],
//! [`SystemHandle::write`] or held inside [`SystemHandle::with`] must be
//! released before calling back into the [`Coordinator`](crate::Coordinator).
//! A membership change that finds the lock taken is a contract violation and
//! panics with [`EcsError::SystemBorrowed`] instead of blocking.

use std::any::type_name;
use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use super::component_manager::ComponentManager;
use super::entity::Entity;
use crate::error::{fatal, EcsError};

/// Behaviour attached to a registered system.
///
/// Both hooks default to doing nothing. They run after the membership set
/// has been updated and receive read access to every component, so an
/// `on_entity_added` hook always finds the entity's components in place.
///
/// # Example
///
/// ```rust
/// use tbge_ecs::{ComponentManager, Entity, System};
///
/// #[derive(Default)]
/// struct Spawned {
///     count: usize,
/// }
///
/// impl System for Spawned {
///     fn on_entity_added(&mut self, _entity: Entity, _components: &ComponentManager) {
///         self.count += 1;
///     }
/// }
/// ```
pub trait System: Send + Sync + 'static {
    /// Called once when `entity` starts matching this system.
    fn on_entity_added(&mut self, entity: Entity, components: &ComponentManager) {
        let _ = (entity, components);
    }

    /// Called once when `entity` stops matching or is destroyed.
    fn on_entity_removed(&mut self, entity: Entity, components: &ComponentManager) {
        let _ = (entity, components);
    }
}

/// A system payload together with its membership set.
pub(crate) struct SystemCell<T> {
    entities: BTreeSet<Entity>,
    system: T,
}

/// Membership operations the manager runs without knowing `T`.
pub(crate) trait ErasedSystem: Send + Sync {
    /// Adds `entity` and fires the added hook if it was absent.
    fn insert_entity(&self, entity: Entity, components: &ComponentManager) -> bool;

    /// Removes `entity` and fires the removed hook if it was present.
    fn remove_entity(&self, entity: Entity, components: &ComponentManager) -> bool;
}

/// Write-locks a system for a membership update.
///
/// The coordinator is driven from one thread, so a taken lock means the
/// caller still holds a guard from a handle.
#[track_caller]
fn lock_for_update<T: System>(
    lock: &RwLock<SystemCell<T>>,
) -> RwLockWriteGuard<'_, SystemCell<T>> {
    match lock.try_write() {
        Some(cell) => cell,
        None => fatal(&EcsError::SystemBorrowed {
            name: type_name::<T>(),
        }),
    }
}

impl<T: System> ErasedSystem for RwLock<SystemCell<T>> {
    fn insert_entity(&self, entity: Entity, components: &ComponentManager) -> bool {
        let mut cell = lock_for_update(self);
        if !cell.entities.insert(entity) {
            return false;
        }
        cell.system.on_entity_added(entity, components);
        true
    }

    fn remove_entity(&self, entity: Entity, components: &ComponentManager) -> bool {
        let mut cell = lock_for_update(self);
        if !cell.entities.remove(&entity) {
            return false;
        }
        cell.system.on_entity_removed(entity, components);
        true
    }
}

/// Shared handle to a registered system.
///
/// Cloning is cheap; every clone refers to the same instance.
pub struct SystemHandle<T: System> {
    cell: Arc<RwLock<SystemCell<T>>>,
}

impl<T: System> SystemHandle<T> {
    pub(crate) fn new(system: T) -> Self {
        Self {
            cell: Arc::new(RwLock::new(SystemCell {
                entities: BTreeSet::new(),
                system,
            })),
        }
    }

    pub(crate) fn from_cell(cell: Arc<RwLock<SystemCell<T>>>) -> Self {
        Self { cell }
    }

    pub(crate) fn erased(&self) -> Arc<dyn ErasedSystem> {
        self.cell.clone()
    }

    pub(crate) fn cell(&self) -> &Arc<RwLock<SystemCell<T>>> {
        &self.cell
    }

    /// Snapshot of the matching entities in ascending id order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.cell.read().entities.iter().copied().collect()
    }

    /// Returns `true` if `entity` currently matches this system.
    #[must_use]
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.cell.read().entities.contains(&entity)
    }

    /// Number of matching entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cell.read().entities.len()
    }

    /// Returns `true` if no entity matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.read().entities.is_empty()
    }

    /// Calls `f` with the payload and the membership set.
    ///
    /// Avoids copying the set when a system update needs both.
    pub fn with<R>(&self, f: impl FnOnce(&T, &BTreeSet<Entity>) -> R) -> R {
        let cell = self.cell.read();
        f(&cell.system, &cell.entities)
    }

    /// Calls `f` with the payload mutably and the membership set read-only.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T, &BTreeSet<Entity>) -> R) -> R {
        let mut cell = self.cell.write();
        let SystemCell { entities, system } = &mut *cell;
        f(system, entities)
    }

    /// Locks the payload for reading.
    #[must_use]
    pub fn read(&self) -> MappedRwLockReadGuard<'_, T> {
        RwLockReadGuard::map(self.cell.read(), |cell| &cell.system)
    }

    /// Locks the payload for writing.
    #[must_use]
    pub fn write(&self) -> MappedRwLockWriteGuard<'_, T> {
        RwLockWriteGuard::map(self.cell.write(), |cell| &mut cell.system)
    }

    /// Returns `true` if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: System> Clone for SystemHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        added: Vec<Entity>,
        removed: Vec<Entity>,
    }

    impl System for Recorder {
        fn on_entity_added(&mut self, entity: Entity, _components: &ComponentManager) {
            self.added.push(entity);
        }

        fn on_entity_removed(&mut self, entity: Entity, _components: &ComponentManager) {
            self.removed.push(entity);
        }
    }

    #[test]
    fn test_hooks_fire_once_per_transition() {
        let components = ComponentManager::default();
        let handle = SystemHandle::new(Recorder::default());
        let erased = handle.erased();
        let e = Entity::from_raw(4);

        assert!(erased.insert_entity(e, &components));
        assert!(!erased.insert_entity(e, &components));
        assert!(handle.has_entity(e));

        assert!(erased.remove_entity(e, &components));
        assert!(!erased.remove_entity(e, &components));
        assert!(!handle.has_entity(e));

        let recorder = handle.read();
        assert_eq!(recorder.added, vec![e]);
        assert_eq!(recorder.removed, vec![e]);
    }

    #[test]
    #[should_panic(expected = "is borrowed while the ECS updates its members")]
    fn test_update_under_read_guard_is_fatal() {
        let components = ComponentManager::default();
        let handle = SystemHandle::new(Recorder::default());
        let _guard = handle.read();
        handle.erased().insert_entity(Entity::from_raw(1), &components);
    }

    #[test]
    fn test_update_after_guard_released() {
        let components = ComponentManager::default();
        let handle = SystemHandle::new(Recorder::default());
        let seen = handle.with(|recorder, _| recorder.added.len());
        assert_eq!(seen, 0);
        assert!(handle.erased().insert_entity(Entity::from_raw(1), &components));
    }

    #[test]
    fn test_entities_sorted() {
        let components = ComponentManager::default();
        let handle = SystemHandle::new(Recorder::default());
        for id in [5, 1, 3] {
            handle.erased().insert_entity(Entity::from_raw(id), &components);
        }
        assert_eq!(
            handle.entities(),
            vec![Entity::from_raw(1), Entity::from_raw(3), Entity::from_raw(5)]
        );
        assert_eq!(handle.len(), 3);
        assert_eq!(handle.with(|_, entities| entities.len()), 3);
    }

    #[test]
    fn test_clones_share_instance() {
        let handle = SystemHandle::new(Recorder::default());
        let other = handle.clone();
        other.write().added.push(Entity::from_raw(9));

        assert!(handle.ptr_eq(&other));
        assert_eq!(handle.read().added.len(), 1);
        assert!(handle.is_empty());
    }
}
