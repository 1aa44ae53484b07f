use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use icaowatch_core::analysis::domain::face::Face;
use icaowatch_core::binding::attribute_binding::AttributeBinding;
use icaowatch_core::display::evaluator::{evaluate, IndicatorState, WarningLevel};
use icaowatch_core::replay::scenario::{Scenario, ScenarioPlayer};

/// Replay an ICAO compliance scenario and print per-step indicator states.
#[derive(Parser)]
#[command(name = "icaowatch")]
struct Cli {
    /// Scenario JSON file (omit to replay the built-in demo).
    scenario: Option<PathBuf>,

    /// Emit one JSON object per step instead of a table.
    #[arg(long)]
    json: bool,

    /// Only print steps that contain at least one warning.
    #[arg(long)]
    warnings_only: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let scenario = match &cli.scenario {
        Some(path) => match Scenario::load(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => Scenario::demo(),
    };
    log::info!("replaying {} steps", scenario.steps.len());

    let face = Arc::new(Face::new());
    let mut binding = AttributeBinding::new();
    binding.set_face(Some(face.clone()));
    let mut player = ScenarioPlayer::new(face);

    for step in &scenario.steps {
        player.apply(step);
        binding.pump();
        let states = evaluate(binding.snapshot().as_ref());

        if cli.warnings_only && !states.iter().any(|s| s.level == WarningLevel::Warning) {
            continue;
        }
        if cli.json {
            print_json(&step.label, &states);
        } else {
            print_table(&step.label, &states);
        }
    }

    binding.close();
}

fn print_table(label: &str, states: &[IndicatorState]) {
    println!("== {label} ==");
    for state in states {
        println!("  {:<28} {}", state.text, level_str(state.level));
    }
    println!();
}

fn print_json(label: &str, states: &[IndicatorState]) {
    let indicators: Vec<serde_json::Value> = states
        .iter()
        .map(|state| {
            serde_json::json!({
                "name": state.indicator.name(),
                "text": state.text,
                "level": level_str(state.level),
            })
        })
        .collect();
    let line = serde_json::json!({
        "step": label,
        "indicators": indicators,
    });
    println!("{line}");
}

fn level_str(level: WarningLevel) -> &'static str {
    match level {
        WarningLevel::NoWarning => "ok",
        WarningLevel::Warning => "warning",
        WarningLevel::Indeterminate => "indeterminate",
    }
}
