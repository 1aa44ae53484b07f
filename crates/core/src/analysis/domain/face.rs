use std::sync::{Arc, Mutex, PoisonError};

use crate::analysis::domain::face_attributes::FaceAttributes;
use crate::shared::observable::{EventSource, Subscription};

/// A mutation of a face's detected-object collection.
#[derive(Clone)]
pub enum CollectionChange {
    Added(Arc<FaceAttributes>),
    Removed(Arc<FaceAttributes>),
    Reset,
}

impl std::fmt::Debug for CollectionChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionChange::Added(_) => write!(f, "Added"),
            CollectionChange::Removed(_) => write!(f, "Removed"),
            CollectionChange::Reset => write!(f, "Reset"),
        }
    }
}

/// One detected face, owning an ordered collection of attribute records.
///
/// The analysis engine appends a record once its checks produce output and
/// may drop or reset the collection at any time, from any thread. Collection
/// events are emitted after the collection lock is released, so listeners
/// may read the collection reentrantly.
pub struct Face {
    objects: Mutex<Vec<Arc<FaceAttributes>>>,
    collection_changed: EventSource<CollectionChange>,
}

impl Face {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(Vec::new()),
            collection_changed: EventSource::new(),
        }
    }

    /// Snapshot of the current record collection, in insertion order.
    pub fn objects(&self) -> Vec<Arc<FaceAttributes>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn first_object(&self) -> Option<Arc<FaceAttributes>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, record: Arc<FaceAttributes>) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        self.collection_changed.emit(&CollectionChange::Added(record));
    }

    /// Removes `record` (pointer identity). Returns `false` if absent.
    pub fn remove(&self, record: &Arc<FaceAttributes>) -> bool {
        let removed = {
            let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
            match objects.iter().position(|r| Arc::ptr_eq(r, record)) {
                Some(index) => {
                    objects.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.collection_changed
                .emit(&CollectionChange::Removed(record.clone()));
        }
        removed
    }

    /// Empties the collection and emits a single `Reset`.
    pub fn clear(&self) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.collection_changed.emit(&CollectionChange::Reset);
    }

    /// Registers a collection listener; the returned guard unsubscribes on
    /// drop and holds only a weak reference to the face.
    pub fn on_collection_changed(
        self: &Arc<Self>,
        listener: impl Fn(&CollectionChange) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.collection_changed.subscribe(listener);
        let weak = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(face) = weak.upgrade() {
                face.collection_changed.unsubscribe(id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.collection_changed.listener_count()
    }
}

impl Default for Face {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_push_emits_added_with_record() {
        let face = Arc::new(Face::new());
        let record = Arc::new(FaceAttributes::new());
        let added = Arc::new(AtomicUsize::new(0));
        let a = added.clone();
        let expected = record.clone();
        let _sub = face.on_collection_changed(move |change| {
            if let CollectionChange::Added(r) = change {
                assert!(Arc::ptr_eq(r, &expected));
                a.fetch_add(1, Ordering::SeqCst);
            }
        });

        face.push(record);
        assert_eq!(added.load(Ordering::SeqCst), 1);
        assert_eq!(face.len(), 1);
    }

    #[test]
    fn test_remove_by_identity() {
        let face = Arc::new(Face::new());
        let first = Arc::new(FaceAttributes::new());
        let second = Arc::new(FaceAttributes::new());
        face.push(first.clone());
        face.push(second.clone());

        assert!(face.remove(&first));
        assert!(!face.remove(&first));
        let remaining = face.objects();
        assert_eq!(remaining.len(), 1);
        assert!(Arc::ptr_eq(&remaining[0], &second));
    }

    #[test]
    fn test_remove_absent_record_is_silent() {
        let face = Arc::new(Face::new());
        let stranger = Arc::new(FaceAttributes::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let _sub = face.on_collection_changed(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!face.remove(&stranger));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear_emits_reset() {
        let face = Arc::new(Face::new());
        face.push(Arc::new(FaceAttributes::new()));
        let resets = Arc::new(AtomicUsize::new(0));
        let r = resets.clone();
        let _sub = face.on_collection_changed(move |change| {
            if matches!(change, CollectionChange::Reset) {
                r.fetch_add(1, Ordering::SeqCst);
            }
        });

        face.clear();
        assert!(face.is_empty());
        assert_eq!(resets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_object_is_insertion_order() {
        let face = Arc::new(Face::new());
        let first = Arc::new(FaceAttributes::new());
        face.push(first.clone());
        face.push(Arc::new(FaceAttributes::new()));

        let head = face.first_object().unwrap();
        assert!(Arc::ptr_eq(&head, &first));
    }

    #[test]
    fn test_subscription_drop_detaches_listener() {
        let face = Arc::new(Face::new());
        let sub = face.on_collection_changed(|_| {});
        assert_eq!(face.listener_count(), 1);
        drop(sub);
        assert_eq!(face.listener_count(), 0);
    }
}
