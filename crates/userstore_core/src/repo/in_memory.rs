//! In-memory repository backend.
//!
//! # Responsibility
//! - Hold records in insertion order for tests, demos and local runs.
//!
//! # Invariants
//! - `next_id` starts at 1 and only moves forward; deleted ids are never reused.
//! - Lookups are linear scans; this backend is not meant for large collections.

use crate::model::{Entity, EntityId};
use crate::repo::{RepoResult, Repository};
use log::debug;

/// Vec-backed repository with a monotonic id counter.
///
/// Not synchronized. Mutating methods take `&mut self`; sharing one instance
/// across threads or tasks requires an external lock.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<E: Entity> {
    entities: Vec<E>,
    next_id: EntityId,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn take_next_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn find_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn list(&self) -> RepoResult<Vec<E>> {
        Ok(self.entities.clone())
    }

    fn get(&self, id: EntityId) -> RepoResult<Option<E>> {
        Ok(self.entities.iter().find(|entity| entity.id() == id).cloned())
    }

    fn create(&mut self, payload: &E::Create) -> RepoResult<E> {
        let id = self.take_next_id();
        let entity = E::from_create(id, payload);
        self.entities.push(entity.clone());
        debug!("event=repo_create module=repo backend=local status=ok id={id}");
        Ok(entity)
    }

    fn update(&mut self, id: EntityId, payload: &E::Update) -> RepoResult<Option<E>> {
        let Some(entity) = self.find_mut(id) else {
            debug!("event=repo_update module=repo backend=local status=not_found id={id}");
            return Ok(None);
        };
        entity.replace(payload);
        Ok(Some(entity.clone()))
    }

    fn patch(&mut self, id: EntityId, payload: &E::Update) -> RepoResult<Option<E>> {
        let Some(entity) = self.find_mut(id) else {
            debug!("event=repo_patch module=repo backend=local status=not_found id={id}");
            return Ok(None);
        };
        entity.merge(payload);
        Ok(Some(entity.clone()))
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<bool> {
        match self.entities.iter().position(|entity| entity.id() == id) {
            Some(index) => {
                self.entities.remove(index);
                debug!("event=repo_delete module=repo backend=local status=ok id={id}");
                Ok(true)
            }
            None => {
                debug!("event=repo_delete module=repo backend=local status=not_found id={id}");
                Ok(false)
            }
        }
    }
}
