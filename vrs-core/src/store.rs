//! Pluggable object store for enref/deref.

use std::collections::HashMap;

use crate::models::VrsObject;

/// A mapping from `ga4gh:...` computed identifiers to inlined objects.
///
/// Keys are content-derived, so concurrent writers of the same object
/// produce identical values; `put` of equal content under the same id is
/// idempotent and collisions may resolve last-writer-wins.
pub trait ObjectStore {
    fn put(&mut self, id: String, obj: VrsObject);
    fn get(&self, id: &str) -> Option<&VrsObject>;
    fn iter(&self) -> Box<dyn Iterator<Item = (&String, &VrsObject)> + '_>;

    fn len(&self) -> usize {
        self.iter().count()
    }

    fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A plain in-memory object store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<String, VrsObject>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&mut self, id: String, obj: VrsObject) {
        self.objects.insert(id, obj);
    }

    fn get(&self, id: &str) -> Option<&VrsObject> {
        self.objects.get(id)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&String, &VrsObject)> + '_> {
        Box::new(self.objects.iter())
    }

    fn len(&self) -> usize {
        self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SequenceLocation, SequenceReference};

    #[test]
    fn put_get_iter() {
        let mut store = MemoryObjectStore::new();
        assert!(store.is_empty());

        let loc = SequenceLocation::new(
            SequenceReference::new("SQ.aUiQCzCPZ2d0csHbMSbh2NzInhonSXwI"),
            10u64,
            11u64,
        );
        store.put("ga4gh:SL.x".to_string(), loc.clone().into());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("ga4gh:SL.x"),
            Some(&VrsObject::SequenceLocation(loc))
        );
        assert!(store.get("ga4gh:SL.y").is_none());
        assert_eq!(store.iter().count(), 1);
    }

    #[test]
    fn put_is_idempotent_for_equal_content() {
        let mut store = MemoryObjectStore::new();
        let loc = SequenceLocation::new(
            SequenceReference::new("SQ.aUiQCzCPZ2d0csHbMSbh2NzInhonSXwI"),
            10u64,
            11u64,
        );
        store.put("ga4gh:SL.x".to_string(), loc.clone().into());
        store.put("ga4gh:SL.x".to_string(), loc.into());
        assert_eq!(store.len(), 1);
    }
}
