//! Specialized collection types

use slotmap::{DefaultKey, SlotMap};

/// Key into an [`EntityStore`]; carries a generation so stale keys never resolve
pub type EntityKey = DefaultKey;

/// Generational arena of entities
///
/// Removal frees the slot for reuse and bumps its generation, so keys held
/// past removal return `None` instead of aliasing the new occupant.
pub struct EntityStore<T> {
    entries: SlotMap<EntityKey, T>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: SlotMap::new(),
        }
    }

    /// Store `value`, returning its key
    pub fn insert(&mut self, value: T) -> EntityKey {
        self.entries.insert(value)
    }

    /// Remove and return the entity behind `key`
    pub fn remove(&mut self, key: EntityKey) -> Option<T> {
        self.entries.remove(key)
    }

    /// Borrow the entity behind `key`
    pub fn get(&self, key: EntityKey) -> Option<&T> {
        self.entries.get(key)
    }

    /// Mutably borrow the entity behind `key`
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entity is live
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate live entities with their keys
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &T)> {
        self.entries.iter()
    }
}
