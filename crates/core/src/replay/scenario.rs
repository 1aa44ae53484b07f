use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::analysis::domain::face::Face;
use crate::analysis::domain::face_attributes::{
    AttributesSnapshot, FaceAttributes, NOT_APPLICABLE,
};
use crate::analysis::domain::icao_warnings::IcaoWarnings;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scenario has no steps")]
    Empty,
    #[error("step {step}: unknown warning flag `{flag}`")]
    UnknownFlag { step: usize, flag: String },
}

/// A deterministic stand-in for the live analysis engine: a sequence of
/// timed attribute states replayed against a [`Face`] graph.
///
/// Scenario files are JSON; flag names follow [`IcaoWarnings::NAMED`].
/// Omitted byte fields default to the not-applicable value and omitted
/// `hold_ms` to one second.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

/// One resolved scenario step.
#[derive(Debug, Clone)]
pub struct Step {
    pub label: String,
    pub hold_ms: u64,
    /// When set, the step empties the face's record collection instead of
    /// mutating a record ("nothing detected").
    pub detached: bool,
    pub attributes: AttributesSnapshot,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    steps: Vec<StepFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepFile {
    #[serde(default)]
    label: Option<String>,
    #[serde(default = "default_hold_ms")]
    hold_ms: u64,
    #[serde(default)]
    detached: bool,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default = "na")]
    expression_confidence: u8,
    #[serde(default = "na")]
    dark_glasses_confidence: u8,
    #[serde(default = "na")]
    blink_confidence: u8,
    #[serde(default = "na")]
    mouth_open_confidence: u8,
    #[serde(default = "na")]
    sharpness: u8,
    #[serde(default = "na")]
    saturation: u8,
    #[serde(default = "na")]
    grayscale_density: u8,
    #[serde(default = "na")]
    background_uniformity: u8,
}

fn default_hold_ms() -> u64 {
    1000
}

fn na() -> u8 {
    NOT_APPLICABLE
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = serde_json::from_str(json)?;
        if file.steps.is_empty() {
            return Err(ScenarioError::Empty);
        }

        let mut steps = Vec::with_capacity(file.steps.len());
        for (index, step) in file.steps.into_iter().enumerate() {
            let mut warnings = IcaoWarnings::NONE;
            for name in &step.warnings {
                let flag =
                    IcaoWarnings::from_name(name).ok_or_else(|| ScenarioError::UnknownFlag {
                        step: index,
                        flag: name.clone(),
                    })?;
                warnings.insert(flag);
            }
            steps.push(Step {
                label: step.label.unwrap_or_else(|| format!("step {}", index + 1)),
                hold_ms: step.hold_ms,
                detached: step.detached,
                attributes: AttributesSnapshot {
                    warnings,
                    expression_confidence: step.expression_confidence,
                    dark_glasses_confidence: step.dark_glasses_confidence,
                    blink_confidence: step.blink_confidence,
                    mouth_open_confidence: step.mouth_open_confidence,
                    sharpness: step.sharpness,
                    saturation: step.saturation,
                    grayscale_density: step.grayscale_density,
                    background_uniformity: step.background_uniformity,
                },
            });
        }
        log::debug!("loaded scenario with {} steps", steps.len());
        Ok(Self { steps })
    }

    /// Built-in walkthrough covering the interesting indicator states,
    /// used when no scenario file is configured.
    pub fn demo() -> Self {
        let clean = AttributesSnapshot {
            warnings: IcaoWarnings::NONE,
            expression_confidence: 8,
            dark_glasses_confidence: 4,
            blink_confidence: 11,
            mouth_open_confidence: 6,
            sharpness: 91,
            saturation: 84,
            grayscale_density: 77,
            background_uniformity: 88,
        };
        let step = |label: &str, hold_ms, detached, attributes| Step {
            label: label.to_string(),
            hold_ms,
            detached,
            attributes,
        };
        Self {
            steps: vec![
                step(
                    "waiting for capture",
                    1200,
                    true,
                    AttributesSnapshot::default(),
                ),
                step(
                    "no face in frame",
                    1500,
                    false,
                    AttributesSnapshot {
                        warnings: IcaoWarnings::FACE_NOT_DETECTED,
                        ..AttributesSnapshot::default()
                    },
                ),
                step("compliant portrait", 2000, false, clean),
                step(
                    "dark glasses and blink",
                    2000,
                    false,
                    AttributesSnapshot {
                        warnings: IcaoWarnings::DARK_GLASSES | IcaoWarnings::BLINK,
                        dark_glasses_confidence: 74,
                        blink_confidence: 63,
                        ..clean
                    },
                ),
                step(
                    "head tilted, too far away",
                    2000,
                    false,
                    AttributesSnapshot {
                        warnings: IcaoWarnings::ROLL_LEFT
                            | IcaoWarnings::TOO_FAR
                            | IcaoWarnings::TOO_SOUTH,
                        ..clean
                    },
                ),
                step(
                    "soft focus, busy background",
                    2000,
                    false,
                    AttributesSnapshot {
                        warnings: IcaoWarnings::SHARPNESS | IcaoWarnings::BACKGROUND_UNIFORMITY,
                        sharpness: 34,
                        background_uniformity: 41,
                        ..clean
                    },
                ),
                step(
                    "expression flagged, confidence unavailable",
                    2000,
                    false,
                    AttributesSnapshot {
                        warnings: IcaoWarnings::EXPRESSION,
                        expression_confidence: NOT_APPLICABLE,
                        ..clean
                    },
                ),
                step("back to compliant", 1500, false, clean),
            ],
        }
    }
}

/// Applies scenario steps to a face graph the way the analysis engine
/// would: the first non-detached step attaches a record, later steps
/// mutate it in place, and detached steps reset the collection.
pub struct ScenarioPlayer {
    face: Arc<Face>,
    record: Option<Arc<FaceAttributes>>,
}

impl ScenarioPlayer {
    pub fn new(face: Arc<Face>) -> Self {
        Self { face, record: None }
    }

    pub fn apply(&mut self, step: &Step) {
        if step.detached {
            if self.record.take().is_some() {
                self.face.clear();
            }
            return;
        }
        match &self.record {
            Some(record) => record.apply(&step.attributes),
            None => {
                let record = Arc::new(FaceAttributes::with_snapshot(step.attributes));
                self.face.push(record.clone());
                self.record = Some(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::attribute_binding::AttributeBinding;

    #[test]
    fn test_parse_full_step() {
        let scenario = Scenario::from_json(
            r#"{
                "steps": [
                    {
                        "label": "glasses",
                        "hold_ms": 250,
                        "warnings": ["dark-glasses", "too-far"],
                        "dark_glasses_confidence": 80,
                        "sharpness": 55
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(scenario.steps.len(), 1);
        let step = &scenario.steps[0];
        assert_eq!(step.label, "glasses");
        assert_eq!(step.hold_ms, 250);
        assert!(!step.detached);
        assert_eq!(
            step.attributes.warnings,
            IcaoWarnings::DARK_GLASSES | IcaoWarnings::TOO_FAR
        );
        assert_eq!(step.attributes.dark_glasses_confidence, 80);
        assert_eq!(step.attributes.sharpness, 55);
        assert_eq!(step.attributes.blink_confidence, NOT_APPLICABLE);
    }

    #[test]
    fn test_parse_defaults() {
        let scenario = Scenario::from_json(r#"{"steps": [{}]}"#).unwrap();
        let step = &scenario.steps[0];
        assert_eq!(step.label, "step 1");
        assert_eq!(step.hold_ms, 1000);
        assert_eq!(step.attributes, AttributesSnapshot::default());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let result = Scenario::from_json(r#"{"steps": [{"warnings": ["sunburn"]}]}"#);
        match result {
            Err(ScenarioError::UnknownFlag { step, flag }) => {
                assert_eq!(step, 0);
                assert_eq!(flag, "sunburn");
            }
            other => panic!("expected UnknownFlag, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_scenario_is_rejected() {
        assert!(matches!(
            Scenario::from_json(r#"{"steps": []}"#),
            Err(ScenarioError::Empty)
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            Scenario::from_json(r#"{"steps": [{"sharpnes": 10}]}"#),
            Err(ScenarioError::Parse(_))
        ));
    }

    #[test]
    fn test_demo_scenario_exercises_all_three_levels() {
        let demo = Scenario::demo();
        assert!(demo.steps.iter().any(|s| s.detached));
        assert!(demo
            .steps
            .iter()
            .any(|s| s.attributes.warnings.contains(IcaoWarnings::FACE_NOT_DETECTED)));
        assert!(demo
            .steps
            .iter()
            .any(|s| !s.detached && s.attributes.warnings.is_empty()));
    }

    #[test]
    fn test_player_attaches_once_and_mutates_in_place() {
        let face = Arc::new(Face::new());
        let mut player = ScenarioPlayer::new(face.clone());
        let demo = Scenario::demo();

        player.apply(&demo.steps[1]);
        assert_eq!(face.len(), 1);
        let record = face.first_object().unwrap();

        player.apply(&demo.steps[2]);
        assert_eq!(face.len(), 1);
        let same = face.first_object().unwrap();
        assert!(Arc::ptr_eq(&record, &same));
        assert!(record.warnings().is_empty());
    }

    #[test]
    fn test_player_detached_step_resets_collection() {
        let face = Arc::new(Face::new());
        let mut player = ScenarioPlayer::new(face.clone());
        let demo = Scenario::demo();

        player.apply(&demo.steps[2]);
        assert_eq!(face.len(), 1);

        player.apply(&demo.steps[0]);
        assert!(face.is_empty());

        // Re-applying a detached step must not emit another reset.
        player.apply(&demo.steps[0]);
        assert!(face.is_empty());
    }

    #[test]
    fn test_player_drives_binding_end_to_end() {
        let face = Arc::new(Face::new());
        let mut binding = AttributeBinding::new();
        binding.set_face(Some(face.clone()));

        let mut player = ScenarioPlayer::new(face);
        let demo = Scenario::demo();

        player.apply(&demo.steps[1]);
        assert!(binding.pump());
        let snapshot = binding.snapshot().unwrap();
        assert!(snapshot.warnings.contains(IcaoWarnings::FACE_NOT_DETECTED));

        player.apply(&demo.steps[2]);
        assert!(binding.pump());
        let snapshot = binding.snapshot().unwrap();
        assert!(snapshot.warnings.is_empty());

        player.apply(&demo.steps[0]);
        assert!(binding.pump());
        assert!(binding.snapshot().is_none());
    }
}
