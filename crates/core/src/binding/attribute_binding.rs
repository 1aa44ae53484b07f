use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crossbeam_channel::{Receiver, Sender};

use crate::analysis::domain::face::{CollectionChange, Face};
use crate::analysis::domain::face_attributes::{
    AttributeField, AttributesSnapshot, FaceAttributes,
};
use crate::shared::observable::Subscription;

/// Reaction queued by an SDK-side callback, applied later on the UI thread.
enum BindingEvent {
    Collection {
        face: Weak<Face>,
        change: CollectionChange,
    },
    WarningsChanged {
        record: Weak<FaceAttributes>,
    },
}

/// Tracks the "current" face and its first attribute record, keeping a
/// display in sync as the detection graph mutates underneath it.
///
/// Two subscription levels cascade: the face's collection events decide
/// which record is tracked, and the tracked record's warning-bitmask
/// changes request a display refresh. Callbacks run on whatever thread the
/// analysis engine mutates from, so they never touch binding state
/// directly: they enqueue a [`BindingEvent`] which [`pump`](Self::pump)
/// applies on the owner's (UI) thread. Events whose originating face or
/// record is no longer the tracked one are dropped on the floor, as are
/// events arriving after [`close`](Self::close).
pub struct AttributeBinding {
    face: Option<Arc<Face>>,
    face_sub: Option<Subscription>,
    attributes: Option<Arc<FaceAttributes>>,
    attributes_sub: Option<Subscription>,
    tx: Sender<BindingEvent>,
    rx: Receiver<BindingEvent>,
    alive: Arc<AtomicBool>,
}

impl AttributeBinding {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            face: None,
            face_sub: None,
            attributes: None,
            attributes_sub: None,
            tx,
            rx,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn face(&self) -> Option<Arc<Face>> {
        self.face.clone()
    }

    /// The attribute record currently observed, if any.
    pub fn attributes(&self) -> Option<Arc<FaceAttributes>> {
        self.attributes.clone()
    }

    /// Snapshot of the tracked record, ready for indicator evaluation.
    pub fn snapshot(&self) -> Option<AttributesSnapshot> {
        self.attributes.as_ref().map(|record| record.snapshot())
    }

    /// Replaces the tracked face. Returns `true` when the display must
    /// refresh: a no-op (pointer-identical face, or a closed binding)
    /// returns `false`.
    ///
    /// On change the old face and record are unsubscribed first, then the
    /// new face's collection is scanned synchronously for its first record.
    pub fn set_face(&mut self, face: Option<Arc<Face>>) -> bool {
        if !self.alive.load(Ordering::Relaxed) {
            return false;
        }
        let unchanged = match (&self.face, &face) {
            (None, None) => true,
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            _ => false,
        };
        if unchanged {
            return false;
        }

        self.detach_record();
        self.face_sub = None;
        self.face = face;

        if let Some(face) = self.face.clone() {
            let tx = self.tx.clone();
            let alive = self.alive.clone();
            let weak = Arc::downgrade(&face);
            self.face_sub = Some(face.on_collection_changed(move |change| {
                if alive.load(Ordering::Relaxed) {
                    let _ = tx.send(BindingEvent::Collection {
                        face: weak.clone(),
                        change: change.clone(),
                    });
                }
            }));

            if let Some(first) = face.first_object() {
                self.attach_record(first);
            }
        }
        true
    }

    /// Applies every queued reaction. Must be called from the thread that
    /// owns the display. Returns `true` when the display must refresh.
    pub fn pump(&mut self) -> bool {
        if !self.alive.load(Ordering::Relaxed) {
            return false;
        }

        let pending: Vec<BindingEvent> = self.rx.try_iter().collect();
        let mut refresh = false;
        for event in pending {
            match event {
                BindingEvent::Collection { face, change } => {
                    let from_current = match (&self.face, face.upgrade()) {
                        (Some(current), Some(sender)) => Arc::ptr_eq(current, &sender),
                        _ => false,
                    };
                    if !from_current {
                        continue;
                    }
                    match change {
                        CollectionChange::Added(record) => {
                            log::debug!("binding: retargeting to newly added record");
                            self.detach_record();
                            self.attach_record(record);
                        }
                        CollectionChange::Removed(_) | CollectionChange::Reset => {
                            log::debug!("binding: tracked record collection cleared");
                            self.detach_record();
                        }
                    }
                    refresh = true;
                }
                BindingEvent::WarningsChanged { record } => {
                    let is_current = match (&self.attributes, record.upgrade()) {
                        (Some(current), Some(sender)) => Arc::ptr_eq(current, &sender),
                        _ => false,
                    };
                    if is_current {
                        refresh = true;
                    }
                }
            }
        }
        refresh
    }

    /// Tears the binding down: both subscription levels are released and
    /// late callbacks or `pump` calls become no-ops. Idempotent.
    pub fn close(&mut self) {
        self.alive.store(false, Ordering::Relaxed);
        self.detach_record();
        self.face_sub = None;
        self.face = None;
    }

    fn attach_record(&mut self, record: Arc<FaceAttributes>) {
        let tx = self.tx.clone();
        let alive = self.alive.clone();
        let weak = Arc::downgrade(&record);
        self.attributes_sub = Some(record.on_changed(move |field| {
            if *field == AttributeField::Warnings && alive.load(Ordering::Relaxed) {
                let _ = tx.send(BindingEvent::WarningsChanged {
                    record: weak.clone(),
                });
            }
        }));
        self.attributes = Some(record);
    }

    fn detach_record(&mut self) {
        self.attributes_sub = None;
        self.attributes = None;
    }
}

impl Default for AttributeBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AttributeBinding {
    fn drop(&mut self) {
        self.close();
    }
}
