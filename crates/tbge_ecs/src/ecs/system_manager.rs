//! # System Manager
//!
//! Registry of systems, their required signatures and their membership.
//!
//! Membership is kept in sync incrementally: every time an entity's signature
//! changes, each system tests
//!
//! ```text
//! (entity_signature & required) == required
//! ```
//!
//! and the entity moves between `absent` and `member` accordingly. Applying
//! the same signature twice is a no-op, so hooks fire once per transition.
//! Systems are visited in registration order.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::component_manager::ComponentManager;
use super::entity::Entity;
use super::signature::Signature;
use super::system::{ErasedSystem, System, SystemCell, SystemHandle};

/// Registration record of one system type.
struct SystemEntry {
    name: &'static str,
    /// Required signature; `None` until configured, matching nothing.
    signature: Option<Signature>,
    erased: Arc<dyn ErasedSystem>,
    /// The same cell as `erased`, kept for typed handle recovery.
    typed: Arc<dyn Any + Send + Sync>,
}

impl SystemEntry {
    fn matches(&self, entity_signature: &Signature) -> bool {
        self.signature
            .is_some_and(|required| entity_signature.contains_all(&required))
    }

    fn reevaluate(&self, entity: Entity, signature: &Signature, components: &ComponentManager) {
        if self.matches(signature) {
            self.erased.insert_entity(entity, components);
        } else {
            self.erased.remove_entity(entity, components);
        }
    }
}

/// Owns every registered system and its membership set.
#[derive(Default)]
pub struct SystemManager {
    /// Rust type → position in `systems`.
    index: HashMap<TypeId, usize>,
    /// Systems in registration order.
    systems: Vec<SystemEntry>,
}

impl SystemManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns `true` if `T` has been registered.
    #[inline]
    #[must_use]
    pub fn is_registered<T: System>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Registers a default-constructed `T`.
    ///
    /// Registering an already known type logs a warning and returns the
    /// existing instance.
    pub fn register_system<T: System + Default>(&mut self) -> SystemHandle<T> {
        if let Some(existing) = self.existing::<T>() {
            return existing;
        }
        self.insert(T::default())
    }

    /// Registers a pre-built instance of `T`.
    ///
    /// If `T` is already registered, `system` is dropped, a warning is logged
    /// and the existing instance is returned.
    pub fn register_system_with<T: System>(&mut self, system: T) -> SystemHandle<T> {
        if let Some(existing) = self.existing::<T>() {
            return existing;
        }
        self.insert(system)
    }

    fn existing<T: System>(&self) -> Option<SystemHandle<T>> {
        let handle = self.get_system::<T>()?;
        tracing::warn!(
            system = type_name::<T>(),
            "registering system more than once; returning the existing instance"
        );
        Some(handle)
    }

    fn insert<T: System>(&mut self, system: T) -> SystemHandle<T> {
        let handle = SystemHandle::new(system);
        let typed: Arc<dyn Any + Send + Sync> = handle.cell().clone();
        self.index.insert(TypeId::of::<T>(), self.systems.len());
        self.systems.push(SystemEntry {
            name: type_name::<T>(),
            signature: None,
            erased: handle.erased(),
            typed,
        });
        tracing::debug!(system = type_name::<T>(), "registered system");
        handle
    }

    fn entry<T: System>(&self) -> Option<&SystemEntry> {
        let position = *self.index.get(&TypeId::of::<T>())?;
        self.systems.get(position)
    }

    /// Returns the registered instance of `T`.
    #[must_use]
    pub fn get_system<T: System>(&self) -> Option<SystemHandle<T>> {
        let entry = self.entry::<T>()?;
        Arc::clone(&entry.typed)
            .downcast::<RwLock<SystemCell<T>>>()
            .ok()
            .map(SystemHandle::from_cell)
    }

    /// Sets the signature an entity needs to match `T`.
    ///
    /// On an unregistered system this logs an error and stores nothing.
    /// Existing members are not re-evaluated here; see
    /// [`SystemManager::refresh_system`].
    ///
    /// # Returns
    ///
    /// `true` if the signature was stored.
    pub fn set_signature<T: System>(&mut self, signature: Signature) -> bool {
        let Some(&position) = self.index.get(&TypeId::of::<T>()) else {
            tracing::error!(
                system = type_name::<T>(),
                %signature,
                "setting the signature of an unregistered system; operation ignored"
            );
            return false;
        };
        self.systems[position].signature = Some(signature);
        true
    }

    /// Returns the required signature of `T`, if registered and configured.
    #[must_use]
    pub fn signature_of<T: System>(&self) -> Option<Signature> {
        self.entry::<T>()?.signature
    }

    /// Re-evaluates `T` against every given entity.
    ///
    /// Used after the signature of `T` changes so that entities which already
    /// existed join or leave it.
    pub fn refresh_system<T: System>(
        &self,
        living: impl IntoIterator<Item = (Entity, Signature)>,
        components: &ComponentManager,
    ) {
        let Some(entry) = self.entry::<T>() else {
            return;
        };
        for (entity, signature) in living {
            entry.reevaluate(entity, &signature, components);
        }
    }

    /// Removes a destroyed entity from every system that holds it.
    pub fn entity_destroyed(&self, entity: Entity, components: &ComponentManager) {
        for system in &self.systems {
            system.erased.remove_entity(entity, components);
        }
    }

    /// Moves `entity` in or out of every system according to its new
    /// signature.
    pub fn entity_signature_changed(
        &self,
        entity: Entity,
        signature: Signature,
        components: &ComponentManager,
    ) {
        for system in &self.systems {
            system.reevaluate(entity, &signature, components);
        }
    }

    /// Iterates over registered system type names with their signatures.
    pub fn iter_signatures(&self) -> impl Iterator<Item = (&'static str, Option<Signature>)> + '_ {
        self.systems.iter().map(|entry| (entry.name, entry.signature))
    }
}
