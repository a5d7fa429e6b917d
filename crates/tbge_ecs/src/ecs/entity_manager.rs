//! # Entity Management
//!
//! Hands out entity ids, recycles them after destruction and stores each
//! entity's component signature.
//!
//! Recycled ids are reused first-in first-out. Fresh ids are only minted
//! when the recycle queue is empty, so a destroyed id comes back before the
//! id space grows.

use std::collections::VecDeque;

use super::entity::Entity;
use super::signature::Signature;
use crate::error::{fatal, EcsError, EcsResult};

/// Allocates entity ids and owns their signatures.
pub struct EntityManager {
    /// Destroyed ids waiting for reuse.
    available: VecDeque<Entity>,
    /// Signature per minted id. Index is the entity id.
    signatures: Vec<Signature>,
    /// Liveness per minted id.
    alive: Vec<bool>,
    /// Number of currently alive entities.
    living_count: u32,
    /// Upper bound on minted ids.
    max_entities: u32,
}

impl EntityManager {
    /// Creates a manager that mints ids in `0..max_entities`.
    ///
    /// Nothing is pre-allocated; per-entity tables grow as ids are minted.
    #[must_use]
    pub fn new(max_entities: u32) -> Self {
        Self {
            available: VecDeque::new(),
            signatures: Vec::new(),
            alive: Vec::new(),
            living_count: 0,
            max_entities,
        }
    }

    /// Returns the configured maximum entity count.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn living_count(&self) -> u32 {
        self.living_count
    }

    /// Returns how many distinct ids have been minted so far.
    ///
    /// This is also the next fresh id.
    #[inline]
    #[must_use]
    pub fn minted_count(&self) -> u32 {
        // Never exceeds max_entities, which is a u32.
        u32::try_from(self.signatures.len()).unwrap_or(u32::MAX)
    }

    /// Allocates an entity id, preferring recycled ids.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityLimitReached`] if every id below the
    /// configured maximum is in use.
    pub fn try_create_entity(&mut self) -> EcsResult<Entity> {
        let entity = if let Some(recycled) = self.available.pop_front() {
            recycled
        } else {
            let next = self.minted_count();
            if next >= self.max_entities {
                return Err(EcsError::EntityLimitReached {
                    max: self.max_entities,
                });
            }
            self.signatures.push(Signature::EMPTY);
            self.alive.push(false);
            Entity::from_raw(next)
        };

        self.alive[entity.index()] = true;
        self.living_count += 1;
        Ok(entity)
    }

    /// Allocates an entity id, preferring recycled ids.
    ///
    /// # Panics
    ///
    /// Panics if every id below the configured maximum is in use.
    #[track_caller]
    pub fn create_entity(&mut self) -> Entity {
        match self.try_create_entity() {
            Ok(entity) => entity,
            Err(e) => fatal(&e),
        }
    }

    /// Destroys an entity: clears its signature and queues its id for reuse.
    ///
    /// Destroying an id that is not alive logs an error and changes nothing.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.has_entity(entity) {
            tracing::error!(
                %entity,
                max_entities = self.max_entities,
                "attempted to destroy an entity that is not alive"
            );
            return false;
        }

        let idx = entity.index();
        self.signatures[idx].reset();
        self.alive[idx] = false;
        self.available.push_back(entity);
        self.living_count -= 1;
        true
    }

    /// Returns `true` if `entity` is currently alive.
    #[inline]
    #[must_use]
    pub fn has_entity(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Replaces the signature of a live entity.
    ///
    /// On an entity that is not alive this logs an error and changes nothing.
    ///
    /// # Returns
    ///
    /// `true` if the signature was stored.
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> bool {
        if !self.has_entity(entity) {
            tracing::error!(
                %entity,
                "attempted to set the signature of an entity that is not alive"
            );
            return false;
        }
        self.signatures[entity.index()] = signature;
        true
    }

    /// Returns the signature of a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotAlive`] if the entity is not alive.
    pub fn try_signature(&self, entity: Entity) -> EcsResult<Signature> {
        if self.has_entity(entity) {
            Ok(self.signatures[entity.index()])
        } else {
            Err(EcsError::EntityNotAlive { entity })
        }
    }

    /// Returns the signature of a live entity.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    #[track_caller]
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Signature {
        match self.try_signature(entity) {
            Ok(signature) => signature,
            Err(e) => fatal(&e),
        }
    }

    /// Iterates over alive entities and their signatures in id order.
    pub fn iter_living(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.alive
            .iter()
            .zip(self.signatures.iter())
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .filter_map(|(idx, (_, signature))| {
                u32::try_from(idx)
                    .ok()
                    .map(|id| (Entity::from_raw(id), *signature))
            })
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_ENTITIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_creation() {
        let manager = EntityManager::new(1000);
        assert_eq!(manager.max_entities(), 1000);
        assert_eq!(manager.living_count(), 0);
        assert_eq!(manager.minted_count(), 0);
    }

    #[test]
    fn test_create_destroy() {
        let mut manager = EntityManager::new(100);

        let e1 = manager.create_entity();
        let e2 = manager.create_entity();
        assert_eq!(e1, Entity::from_raw(0));
        assert_eq!(e2, Entity::from_raw(1));
        assert_eq!(manager.living_count(), 2);

        assert!(manager.destroy_entity(e1));
        assert!(!manager.has_entity(e1));
        assert_eq!(manager.living_count(), 1);

        // Recycled before minting
        let e3 = manager.create_entity();
        assert_eq!(e3, e1);
        assert_eq!(manager.minted_count(), 2);
    }

    #[test]
    fn test_recycle_order_is_fifo() {
        let mut manager = EntityManager::new(10);
        let ids: Vec<_> = (0..4).map(|_| manager.create_entity()).collect();

        manager.destroy_entity(ids[2]);
        manager.destroy_entity(ids[0]);

        assert_eq!(manager.create_entity(), ids[2]);
        assert_eq!(manager.create_entity(), ids[0]);
        assert_eq!(manager.create_entity(), Entity::from_raw(4));
    }

    #[test]
    fn test_destroy_resets_signature() {
        let mut manager = EntityManager::new(10);
        let e = manager.create_entity();
        assert!(manager.set_signature(e, Signature::from_ids([0, 2])));
        assert_eq!(manager.signature(e), Signature::from_ids([0, 2]));

        manager.destroy_entity(e);
        let again = manager.create_entity();
        assert_eq!(again, e);
        assert!(manager.signature(again).is_empty());
    }

    #[test]
    fn test_invalid_entity_is_noop() {
        let mut manager = EntityManager::new(10);
        let e = manager.create_entity();

        assert!(!manager.destroy_entity(Entity::from_raw(5)));
        assert!(!manager.destroy_entity(Entity::from_raw(500)));
        assert!(!manager.set_signature(Entity::from_raw(5), Signature::from_ids([1])));
        assert_eq!(manager.living_count(), 1);

        assert!(manager.destroy_entity(e));
        // Double destroy must not queue the id twice.
        assert!(!manager.destroy_entity(e));
        let a = manager.create_entity();
        let b = manager.create_entity();
        assert_ne!(a, b);
    }

    #[test]
    fn test_entity_limit() {
        let mut manager = EntityManager::new(2);
        manager.create_entity();
        manager.create_entity();
        assert_eq!(
            manager.try_create_entity(),
            Err(EcsError::EntityLimitReached { max: 2 })
        );
    }

    #[test]
    #[should_panic(expected = "too many entities")]
    fn test_entity_limit_is_fatal() {
        let mut manager = EntityManager::new(1);
        manager.create_entity();
        let _ = manager.create_entity();
    }

    #[test]
    #[should_panic(expected = "is not alive")]
    fn test_signature_of_dead_entity_is_fatal() {
        let manager = EntityManager::new(4);
        let _ = manager.signature(Entity::from_raw(0));
    }

    #[test]
    fn test_iter_living() {
        let mut manager = EntityManager::new(10);
        let a = manager.create_entity();
        let b = manager.create_entity();
        let c = manager.create_entity();
        manager.set_signature(c, Signature::from_ids([3]));
        manager.destroy_entity(b);

        let living: Vec<_> = manager.iter_living().collect();
        assert_eq!(
            living,
            vec![(a, Signature::EMPTY), (c, Signature::from_ids([3]))]
        );
    }
}
