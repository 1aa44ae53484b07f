use crate::analysis::domain::face_attributes::AttributesSnapshot;
use crate::analysis::domain::icao_warnings::IcaoWarnings;
use crate::display::indicator::{Indicator, IndicatorRule, INDICATORS};

/// Severity rendered for one indicator. The GUI maps these to its three
/// configurable colors (defaults: green, red, orange).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningLevel {
    NoWarning,
    Warning,
    Indeterminate,
}

/// One evaluated indicator: what to label it and how severe it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorState {
    pub indicator: Indicator,
    pub level: WarningLevel,
    pub text: String,
}

/// Evaluates the full indicator table against an attribute snapshot.
///
/// With no record at all, everything is indeterminate ("nothing detected
/// yet"). With the FACE_NOT_DETECTED flag set, every indicator except
/// "face detected" is indeterminate and "face detected" warns. Otherwise
/// each indicator follows its table rule. Quality metrics always carry a
/// `"<Name>: <value>"` readout, with `N/A` standing in for any byte above
/// 100 and for the no-record state.
pub fn evaluate(snapshot: Option<&AttributesSnapshot>) -> Vec<IndicatorState> {
    let Some(snapshot) = snapshot else {
        return INDICATORS
            .iter()
            .map(|entry| IndicatorState {
                indicator: entry.indicator,
                level: WarningLevel::Indeterminate,
                text: idle_text(entry.indicator, &entry.rule),
            })
            .collect();
    };

    let warnings = snapshot.warnings;
    let face_missing = warnings.contains(IcaoWarnings::FACE_NOT_DETECTED);

    INDICATORS
        .iter()
        .map(|entry| {
            let level = if face_missing {
                match entry.rule {
                    IndicatorRule::Detection => WarningLevel::Warning,
                    _ => WarningLevel::Indeterminate,
                }
            } else {
                rule_level(&entry.rule, snapshot)
            };
            IndicatorState {
                indicator: entry.indicator,
                level,
                text: rule_text(entry.indicator, &entry.rule, snapshot),
            }
        })
        .collect()
}

fn rule_level(rule: &IndicatorRule, snapshot: &AttributesSnapshot) -> WarningLevel {
    let warnings = snapshot.warnings;
    match rule {
        IndicatorRule::Detection => WarningLevel::NoWarning,
        IndicatorRule::ConfidenceGated { flag, confidence } => {
            if !warnings.contains(*flag) {
                WarningLevel::NoWarning
            } else if confidence(snapshot) <= 100 {
                WarningLevel::Warning
            } else {
                WarningLevel::Indeterminate
            }
        }
        IndicatorRule::FlagAny(flags) => flag_any_level(warnings, flags),
        IndicatorRule::QualityMetric { flag, .. } => flag_any_level(warnings, &[*flag]),
    }
}

fn flag_any_level(warnings: IcaoWarnings, flags: &[IcaoWarnings]) -> WarningLevel {
    if flags.iter().any(|flag| warnings.contains(*flag)) {
        WarningLevel::Warning
    } else {
        WarningLevel::NoWarning
    }
}

fn rule_text(indicator: Indicator, rule: &IndicatorRule, snapshot: &AttributesSnapshot) -> String {
    match rule {
        IndicatorRule::QualityMetric { value, .. } => {
            metric_text(indicator.name(), Some(value(snapshot)))
        }
        _ => indicator.name().to_string(),
    }
}

fn idle_text(indicator: Indicator, rule: &IndicatorRule) -> String {
    match rule {
        IndicatorRule::QualityMetric { .. } => metric_text(indicator.name(), None),
        _ => indicator.name().to_string(),
    }
}

/// `"<Name>: <value>"`, with `N/A` for a missing or out-of-range byte.
fn metric_text(name: &str, value: Option<u8>) -> String {
    match value {
        Some(v) if v <= 100 => format!("{name}: {v}"),
        _ => format!("{name}: N/A"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn state_of(states: &[IndicatorState], indicator: Indicator) -> &IndicatorState {
        states
            .iter()
            .find(|s| s.indicator == indicator)
            .unwrap_or_else(|| panic!("missing indicator {indicator:?}"))
    }

    #[test]
    fn test_no_record_renders_everything_indeterminate() {
        let states = evaluate(None);
        assert_eq!(states.len(), 18);
        for state in &states {
            assert_eq!(state.level, WarningLevel::Indeterminate, "{:?}", state.indicator);
        }
        assert_eq!(
            state_of(&states, Indicator::Sharpness).text,
            "Sharpness: N/A"
        );
        assert_eq!(state_of(&states, Indicator::Blink).text, "Blink");
    }

    #[test]
    fn test_face_not_detected_overrides_all_other_flags() {
        // Every other flag set too; the override must win regardless.
        let mut warnings = IcaoWarnings::FACE_NOT_DETECTED;
        for (_, flag) in IcaoWarnings::NAMED {
            warnings.insert(*flag);
        }
        let snapshot = AttributesSnapshot {
            warnings,
            ..AttributesSnapshot::default()
        };

        let states = evaluate(Some(&snapshot));
        for state in &states {
            if state.indicator == Indicator::FaceDetected {
                assert_eq!(state.level, WarningLevel::Warning);
            } else {
                assert_eq!(state.level, WarningLevel::Indeterminate, "{:?}", state.indicator);
            }
        }
    }

    #[test]
    fn test_face_present_renders_detection_green() {
        let snapshot = AttributesSnapshot::default();
        let states = evaluate(Some(&snapshot));
        assert_eq!(
            state_of(&states, Indicator::FaceDetected).level,
            WarningLevel::NoWarning
        );
    }

    #[rstest]
    #[case::expression(Indicator::Expression, IcaoWarnings::EXPRESSION)]
    #[case::dark_glasses(Indicator::DarkGlasses, IcaoWarnings::DARK_GLASSES)]
    #[case::blink(Indicator::Blink, IcaoWarnings::BLINK)]
    #[case::mouth_open(Indicator::MouthOpen, IcaoWarnings::MOUTH_OPEN)]
    fn test_confidence_gated_flag_absent_ignores_confidence(
        #[case] indicator: Indicator,
        #[case] _flag: IcaoWarnings,
        #[values(0, 55, 100, 101, 255)] confidence: u8,
    ) {
        let snapshot = AttributesSnapshot {
            warnings: IcaoWarnings::NONE,
            expression_confidence: confidence,
            dark_glasses_confidence: confidence,
            blink_confidence: confidence,
            mouth_open_confidence: confidence,
            ..AttributesSnapshot::default()
        };
        let states = evaluate(Some(&snapshot));
        assert_eq!(state_of(&states, indicator).level, WarningLevel::NoWarning);
    }

    #[rstest]
    #[case::floor(0, WarningLevel::Warning)]
    #[case::mid(57, WarningLevel::Warning)]
    #[case::boundary(100, WarningLevel::Warning)]
    #[case::just_over(101, WarningLevel::Indeterminate)]
    #[case::max(255, WarningLevel::Indeterminate)]
    fn test_confidence_gated_flag_present_splits_on_100(
        #[case] confidence: u8,
        #[case] expected: WarningLevel,
    ) {
        let snapshot = AttributesSnapshot {
            warnings: IcaoWarnings::BLINK,
            blink_confidence: confidence,
            ..AttributesSnapshot::default()
        };
        let states = evaluate(Some(&snapshot));
        assert_eq!(state_of(&states, Indicator::Blink).level, expected);
    }

    #[rstest]
    #[case::roll_left(Indicator::Roll, IcaoWarnings::ROLL_LEFT)]
    #[case::roll_right(Indicator::Roll, IcaoWarnings::ROLL_RIGHT)]
    #[case::yaw_left(Indicator::Yaw, IcaoWarnings::YAW_LEFT)]
    #[case::yaw_right(Indicator::Yaw, IcaoWarnings::YAW_RIGHT)]
    #[case::pitch_up(Indicator::Pitch, IcaoWarnings::PITCH_UP)]
    #[case::pitch_down(Indicator::Pitch, IcaoWarnings::PITCH_DOWN)]
    #[case::too_near(Indicator::TooNear, IcaoWarnings::TOO_NEAR)]
    #[case::too_far(Indicator::TooFar, IcaoWarnings::TOO_FAR)]
    #[case::too_north(Indicator::TooNorth, IcaoWarnings::TOO_NORTH)]
    #[case::too_south(Indicator::TooSouth, IcaoWarnings::TOO_SOUTH)]
    #[case::too_east(Indicator::TooEast, IcaoWarnings::TOO_EAST)]
    #[case::too_west(Indicator::TooWest, IcaoWarnings::TOO_WEST)]
    fn test_flag_only_indicators(#[case] indicator: Indicator, #[case] flag: IcaoWarnings) {
        let clear = evaluate(Some(&AttributesSnapshot::default()));
        assert_eq!(state_of(&clear, indicator).level, WarningLevel::NoWarning);

        let flagged = evaluate(Some(&AttributesSnapshot {
            warnings: flag,
            ..AttributesSnapshot::default()
        }));
        assert_eq!(state_of(&flagged, indicator).level, WarningLevel::Warning);
    }

    #[rstest]
    #[case::in_range(72, "Sharpness: 72", WarningLevel::Warning)]
    #[case::boundary(100, "Sharpness: 100", WarningLevel::Warning)]
    #[case::out_of_range(101, "Sharpness: N/A", WarningLevel::Warning)]
    #[case::na(255, "Sharpness: N/A", WarningLevel::Warning)]
    fn test_quality_metric_text_and_level(
        #[case] value: u8,
        #[case] expected_text: &str,
        #[case] expected_level: WarningLevel,
    ) {
        let snapshot = AttributesSnapshot {
            warnings: IcaoWarnings::SHARPNESS,
            sharpness: value,
            ..AttributesSnapshot::default()
        };
        let states = evaluate(Some(&snapshot));
        let state = state_of(&states, Indicator::Sharpness);
        assert_eq!(state.text, expected_text);
        assert_eq!(state.level, expected_level);
    }

    #[test]
    fn test_quality_metric_without_flag_shows_value_in_green() {
        let snapshot = AttributesSnapshot {
            background_uniformity: 88,
            ..AttributesSnapshot::default()
        };
        let states = evaluate(Some(&snapshot));
        let state = state_of(&states, Indicator::BackgroundUniformity);
        assert_eq!(state.level, WarningLevel::NoWarning);
        assert_eq!(state.text, "Background Uniformity: 88");
    }

    #[test]
    fn test_quality_text_rendered_even_when_face_missing() {
        let snapshot = AttributesSnapshot {
            warnings: IcaoWarnings::FACE_NOT_DETECTED,
            saturation: 40,
            ..AttributesSnapshot::default()
        };
        let states = evaluate(Some(&snapshot));
        assert_eq!(state_of(&states, Indicator::Saturation).text, "Saturation: 40");
    }

    #[test]
    fn test_states_follow_table_order() {
        let states = evaluate(None);
        let table: Vec<Indicator> = INDICATORS.iter().map(|s| s.indicator).collect();
        let evaluated: Vec<Indicator> = states.iter().map(|s| s.indicator).collect();
        assert_eq!(evaluated, table);
    }
}
