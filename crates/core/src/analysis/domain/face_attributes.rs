use std::sync::{Arc, Mutex, PoisonError};

use crate::analysis::domain::icao_warnings::IcaoWarnings;
use crate::shared::observable::{EventSource, Subscription};

/// Byte value meaning "not applicable / indeterminate" for confidence and
/// quality fields. Any value above 100 carries the same meaning.
pub const NOT_APPLICABLE: u8 = 255;

/// Identifies which field of a [`FaceAttributes`] record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeField {
    Warnings,
    ExpressionConfidence,
    DarkGlassesConfidence,
    BlinkConfidence,
    MouthOpenConfidence,
    Sharpness,
    Saturation,
    GrayscaleDensity,
    BackgroundUniformity,
}

/// Immutable copy of every field of an attribute record, read under one lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributesSnapshot {
    pub warnings: IcaoWarnings,
    pub expression_confidence: u8,
    pub dark_glasses_confidence: u8,
    pub blink_confidence: u8,
    pub mouth_open_confidence: u8,
    pub sharpness: u8,
    pub saturation: u8,
    pub grayscale_density: u8,
    pub background_uniformity: u8,
}

impl Default for AttributesSnapshot {
    fn default() -> Self {
        Self {
            warnings: IcaoWarnings::NONE,
            expression_confidence: NOT_APPLICABLE,
            dark_glasses_confidence: NOT_APPLICABLE,
            blink_confidence: NOT_APPLICABLE,
            mouth_open_confidence: NOT_APPLICABLE,
            sharpness: NOT_APPLICABLE,
            saturation: NOT_APPLICABLE,
            grayscale_density: NOT_APPLICABLE,
            background_uniformity: NOT_APPLICABLE,
        }
    }
}

/// One detected-object record of a [`Face`](crate::analysis::domain::face::Face):
/// the warning bitmask plus the per-check confidence and quality bytes.
///
/// The analysis engine mutates records in place, possibly from a non-UI
/// thread; every setter that changes a value emits a field-keyed change
/// notification after releasing the state lock.
pub struct FaceAttributes {
    state: Mutex<AttributesSnapshot>,
    changed: EventSource<AttributeField>,
}

impl FaceAttributes {
    pub fn new() -> Self {
        Self::with_snapshot(AttributesSnapshot::default())
    }

    pub fn with_snapshot(snapshot: AttributesSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            changed: EventSource::new(),
        }
    }

    pub fn snapshot(&self) -> AttributesSnapshot {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn warnings(&self) -> IcaoWarnings {
        self.snapshot().warnings
    }

    pub fn set_warnings(&self, warnings: IcaoWarnings) {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.warnings == warnings {
                false
            } else {
                state.warnings = warnings;
                true
            }
        };
        if changed {
            self.changed.emit(&AttributeField::Warnings);
        }
    }

    pub fn set_expression_confidence(&self, value: u8) {
        self.set_byte(AttributeField::ExpressionConfidence, value);
    }

    pub fn set_dark_glasses_confidence(&self, value: u8) {
        self.set_byte(AttributeField::DarkGlassesConfidence, value);
    }

    pub fn set_blink_confidence(&self, value: u8) {
        self.set_byte(AttributeField::BlinkConfidence, value);
    }

    pub fn set_mouth_open_confidence(&self, value: u8) {
        self.set_byte(AttributeField::MouthOpenConfidence, value);
    }

    pub fn set_sharpness(&self, value: u8) {
        self.set_byte(AttributeField::Sharpness, value);
    }

    pub fn set_saturation(&self, value: u8) {
        self.set_byte(AttributeField::Saturation, value);
    }

    pub fn set_grayscale_density(&self, value: u8) {
        self.set_byte(AttributeField::GrayscaleDensity, value);
    }

    pub fn set_background_uniformity(&self, value: u8) {
        self.set_byte(AttributeField::BackgroundUniformity, value);
    }

    /// Overwrites every field at once, emitting one notification per field
    /// that actually changed. The warning bitmask is emitted last so a
    /// listener reacting to it observes the fully-updated record.
    pub fn apply(&self, target: &AttributesSnapshot) {
        fn byte_field(dirty: &mut Vec<AttributeField>, field: AttributeField, slot: &mut u8, value: u8) {
            if *slot != value {
                *slot = value;
                dirty.push(field);
            }
        }

        let mut dirty: Vec<AttributeField> = Vec::new();
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            byte_field(
                &mut dirty,
                AttributeField::ExpressionConfidence,
                &mut state.expression_confidence,
                target.expression_confidence,
            );
            byte_field(
                &mut dirty,
                AttributeField::DarkGlassesConfidence,
                &mut state.dark_glasses_confidence,
                target.dark_glasses_confidence,
            );
            byte_field(
                &mut dirty,
                AttributeField::BlinkConfidence,
                &mut state.blink_confidence,
                target.blink_confidence,
            );
            byte_field(
                &mut dirty,
                AttributeField::MouthOpenConfidence,
                &mut state.mouth_open_confidence,
                target.mouth_open_confidence,
            );
            byte_field(
                &mut dirty,
                AttributeField::Sharpness,
                &mut state.sharpness,
                target.sharpness,
            );
            byte_field(
                &mut dirty,
                AttributeField::Saturation,
                &mut state.saturation,
                target.saturation,
            );
            byte_field(
                &mut dirty,
                AttributeField::GrayscaleDensity,
                &mut state.grayscale_density,
                target.grayscale_density,
            );
            byte_field(
                &mut dirty,
                AttributeField::BackgroundUniformity,
                &mut state.background_uniformity,
                target.background_uniformity,
            );
            if state.warnings != target.warnings {
                state.warnings = target.warnings;
                dirty.push(AttributeField::Warnings);
            }
        }
        for field in dirty {
            self.changed.emit(&field);
        }
    }

    /// Registers a change listener; the returned guard unsubscribes on drop.
    ///
    /// The guard holds only a weak reference to the record, so it never
    /// extends the record's lifetime.
    pub fn on_changed(
        self: &Arc<Self>,
        listener: impl Fn(&AttributeField) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.changed.subscribe(listener);
        let weak = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(record) = weak.upgrade() {
                record.changed.unsubscribe(id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.changed.listener_count()
    }

    fn set_byte(&self, field: AttributeField, value: u8) {
        let changed = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = match field {
                AttributeField::ExpressionConfidence => &mut state.expression_confidence,
                AttributeField::DarkGlassesConfidence => &mut state.dark_glasses_confidence,
                AttributeField::BlinkConfidence => &mut state.blink_confidence,
                AttributeField::MouthOpenConfidence => &mut state.mouth_open_confidence,
                AttributeField::Sharpness => &mut state.sharpness,
                AttributeField::Saturation => &mut state.saturation,
                AttributeField::GrayscaleDensity => &mut state.grayscale_density,
                AttributeField::BackgroundUniformity => &mut state.background_uniformity,
                AttributeField::Warnings => unreachable!("warnings use set_warnings"),
            };
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        };
        if changed {
            self.changed.emit(&field);
        }
    }
}

impl Default for FaceAttributes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_snapshot_is_indeterminate() {
        let record = FaceAttributes::new();
        let snapshot = record.snapshot();
        assert_eq!(snapshot.warnings, IcaoWarnings::NONE);
        assert_eq!(snapshot.sharpness, NOT_APPLICABLE);
        assert_eq!(snapshot.blink_confidence, NOT_APPLICABLE);
    }

    #[test]
    fn test_setter_emits_only_on_change() {
        let record = Arc::new(FaceAttributes::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let _sub = record.on_changed(move |field| {
            assert_eq!(*field, AttributeField::Sharpness);
            h.fetch_add(1, Ordering::SeqCst);
        });

        record.set_sharpness(80);
        record.set_sharpness(80);
        record.set_sharpness(81);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_set_warnings_keys_event_by_field() {
        let record = Arc::new(FaceAttributes::new());
        let warnings_hits = Arc::new(AtomicUsize::new(0));
        let h = warnings_hits.clone();
        let _sub = record.on_changed(move |field| {
            if *field == AttributeField::Warnings {
                h.fetch_add(1, Ordering::SeqCst);
            }
        });

        record.set_blink_confidence(40);
        record.set_warnings(IcaoWarnings::BLINK);
        assert_eq!(warnings_hits.load(Ordering::SeqCst), 1);
        assert_eq!(record.warnings(), IcaoWarnings::BLINK);
    }

    #[test]
    fn test_apply_emits_warnings_last() {
        let record = Arc::new(FaceAttributes::new());
        let order = Arc::new(Mutex::new(Vec::new()));
        let o = order.clone();
        let _sub = record.on_changed(move |field| {
            o.lock().unwrap().push(*field);
        });

        record.apply(&AttributesSnapshot {
            warnings: IcaoWarnings::BLINK,
            blink_confidence: 55,
            ..AttributesSnapshot::default()
        });

        let seen = order.lock().unwrap();
        assert_eq!(
            *seen,
            vec![AttributeField::BlinkConfidence, AttributeField::Warnings]
        );
    }

    #[test]
    fn test_apply_identical_snapshot_is_silent() {
        let record = Arc::new(FaceAttributes::new());
        let snapshot = record.snapshot();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let _sub = record.on_changed(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        record.apply(&snapshot);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_drop_detaches_listener() {
        let record = Arc::new(FaceAttributes::new());
        let sub = record.on_changed(|_| {});
        assert_eq!(record.listener_count(), 1);
        drop(sub);
        assert_eq!(record.listener_count(), 0);
    }
}
