use crate::analysis::domain::face_attributes::AttributesSnapshot;
use crate::analysis::domain::icao_warnings::IcaoWarnings;

/// The fixed set of compliance indicators shown by the view, in display
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    FaceDetected,
    Expression,
    DarkGlasses,
    Blink,
    MouthOpen,
    Roll,
    Yaw,
    Pitch,
    TooNear,
    TooFar,
    TooNorth,
    TooSouth,
    TooEast,
    TooWest,
    Sharpness,
    GrayscaleDensity,
    Saturation,
    BackgroundUniformity,
}

impl Indicator {
    pub fn name(self) -> &'static str {
        match self {
            Indicator::FaceDetected => "Face Detected",
            Indicator::Expression => "Expression",
            Indicator::DarkGlasses => "Dark Glasses",
            Indicator::Blink => "Blink",
            Indicator::MouthOpen => "Mouth Open",
            Indicator::Roll => "Roll",
            Indicator::Yaw => "Yaw",
            Indicator::Pitch => "Pitch",
            Indicator::TooNear => "Too Near",
            Indicator::TooFar => "Too Far",
            Indicator::TooNorth => "Too North",
            Indicator::TooSouth => "Too South",
            Indicator::TooEast => "Too East",
            Indicator::TooWest => "Too West",
            Indicator::Sharpness => "Sharpness",
            Indicator::GrayscaleDensity => "Grayscale Density",
            Indicator::Saturation => "Saturation",
            Indicator::BackgroundUniformity => "Background Uniformity",
        }
    }
}

type ByteAccessor = fn(&AttributesSnapshot) -> u8;

/// How one indicator derives its state from an attribute record.
pub enum IndicatorRule {
    /// The "face detected" indicator; its state is decided solely by the
    /// FACE_NOT_DETECTED flag.
    Detection,
    /// Flag gated by a confidence byte: warning only while the confidence is
    /// meaningful (≤ 100), indeterminate otherwise.
    ConfidenceGated {
        flag: IcaoWarnings,
        confidence: ByteAccessor,
    },
    /// Warning whenever any of the listed flags is present.
    FlagAny(&'static [IcaoWarnings]),
    /// Flag-only coloring plus a `"<Name>: <value>"` text readout.
    QualityMetric {
        flag: IcaoWarnings,
        value: ByteAccessor,
    },
}

pub struct IndicatorSpec {
    pub indicator: Indicator,
    pub rule: IndicatorRule,
}

/// Declarative mapping from indicator to gating rule, iterated by the
/// evaluator in display order.
pub const INDICATORS: &[IndicatorSpec] = &[
    IndicatorSpec {
        indicator: Indicator::FaceDetected,
        rule: IndicatorRule::Detection,
    },
    IndicatorSpec {
        indicator: Indicator::Expression,
        rule: IndicatorRule::ConfidenceGated {
            flag: IcaoWarnings::EXPRESSION,
            confidence: |s| s.expression_confidence,
        },
    },
    IndicatorSpec {
        indicator: Indicator::DarkGlasses,
        rule: IndicatorRule::ConfidenceGated {
            flag: IcaoWarnings::DARK_GLASSES,
            confidence: |s| s.dark_glasses_confidence,
        },
    },
    IndicatorSpec {
        indicator: Indicator::Blink,
        rule: IndicatorRule::ConfidenceGated {
            flag: IcaoWarnings::BLINK,
            confidence: |s| s.blink_confidence,
        },
    },
    IndicatorSpec {
        indicator: Indicator::MouthOpen,
        rule: IndicatorRule::ConfidenceGated {
            flag: IcaoWarnings::MOUTH_OPEN,
            confidence: |s| s.mouth_open_confidence,
        },
    },
    IndicatorSpec {
        indicator: Indicator::Roll,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::ROLL_LEFT, IcaoWarnings::ROLL_RIGHT]),
    },
    IndicatorSpec {
        indicator: Indicator::Yaw,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::YAW_LEFT, IcaoWarnings::YAW_RIGHT]),
    },
    IndicatorSpec {
        indicator: Indicator::Pitch,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::PITCH_UP, IcaoWarnings::PITCH_DOWN]),
    },
    IndicatorSpec {
        indicator: Indicator::TooNear,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::TOO_NEAR]),
    },
    IndicatorSpec {
        indicator: Indicator::TooFar,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::TOO_FAR]),
    },
    IndicatorSpec {
        indicator: Indicator::TooNorth,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::TOO_NORTH]),
    },
    IndicatorSpec {
        indicator: Indicator::TooSouth,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::TOO_SOUTH]),
    },
    IndicatorSpec {
        indicator: Indicator::TooEast,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::TOO_EAST]),
    },
    IndicatorSpec {
        indicator: Indicator::TooWest,
        rule: IndicatorRule::FlagAny(&[IcaoWarnings::TOO_WEST]),
    },
    IndicatorSpec {
        indicator: Indicator::Sharpness,
        rule: IndicatorRule::QualityMetric {
            flag: IcaoWarnings::SHARPNESS,
            value: |s| s.sharpness,
        },
    },
    IndicatorSpec {
        indicator: Indicator::GrayscaleDensity,
        rule: IndicatorRule::QualityMetric {
            flag: IcaoWarnings::GRAYSCALE_DENSITY,
            value: |s| s.grayscale_density,
        },
    },
    IndicatorSpec {
        indicator: Indicator::Saturation,
        rule: IndicatorRule::QualityMetric {
            flag: IcaoWarnings::SATURATION,
            value: |s| s.saturation,
        },
    },
    IndicatorSpec {
        indicator: Indicator::BackgroundUniformity,
        rule: IndicatorRule::QualityMetric {
            flag: IcaoWarnings::BACKGROUND_UNIFORMITY,
            value: |s| s.background_uniformity,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_covers_each_indicator_once() {
        let mut seen = HashSet::new();
        for entry in INDICATORS {
            assert!(seen.insert(entry.indicator), "duplicate: {:?}", entry.indicator);
        }
        assert_eq!(seen.len(), 18);
    }

    #[test]
    fn test_face_detected_is_first() {
        assert_eq!(INDICATORS[0].indicator, Indicator::FaceDetected);
        assert!(matches!(INDICATORS[0].rule, IndicatorRule::Detection));
    }

    #[test]
    fn test_pose_indicators_gate_on_both_directions() {
        for entry in INDICATORS {
            if let (Indicator::Roll | Indicator::Yaw | Indicator::Pitch, IndicatorRule::FlagAny(flags)) =
                (entry.indicator, &entry.rule)
            {
                assert_eq!(flags.len(), 2, "{:?}", entry.indicator);
            }
        }
    }
}
