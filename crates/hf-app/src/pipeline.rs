//! End-to-end analysis run.
//!
//! Stages: model builder, then the uncompensated and compensated branches,
//! which share nothing but the immutable plant model and run on the rayon
//! pool. Report order is fixed by the [`AnalysisReport`] fields, not by which
//! branch finishes first.
//!
//! A degenerate compensator design (target pole on a pole or zero of the
//! augmented loop) does not abort the run: the open-loop block is still
//! reported and the compensated block carries the reason instead.

use hf_project::{AnalysisConfig, AnalysisDef, CompensatorDef};
use tracing::{info_span, warn};

use crate::closed_loop::{ClosedLoopAnalysis, analyze_closed_loop};
use crate::compensator::CompensatedSystem;
use crate::error::{AppError, AppResult};
use crate::model::{PlantModel, PlantParameters};
use crate::open_loop::{OpenLoopAnalysis, analyze_open_loop};

/// Outcome of the compensator design and closed-loop analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Compensation {
    Designed {
        system: CompensatedSystem,
        closed_loop: ClosedLoopAnalysis,
    },
    /// No finite PI gain exists for the requested target pole.
    Degenerate {
        zero: f64,
        target_pole: (f64, f64),
        reason: String,
    },
}

impl Compensation {
    pub fn designed(&self) -> Option<(&CompensatedSystem, &ClosedLoopAnalysis)> {
        match self {
            Self::Designed {
                system,
                closed_loop,
            } => Some((system, closed_loop)),
            Self::Degenerate { .. } => None,
        }
    }

    fn run(model: &PlantModel, def: &CompensatorDef, settings: &AnalysisDef) -> AppResult<Self> {
        let outcome = CompensatedSystem::build(model, def).and_then(|system| {
            let closed_loop = analyze_closed_loop(&system, settings)?;
            Ok(Self::Designed {
                system,
                closed_loop,
            })
        });
        match outcome {
            Err(AppError::Degenerate(reason)) => {
                warn!(%reason, "compensator design is degenerate");
                Ok(Self::Degenerate {
                    zero: def.compensator_zero,
                    target_pole: (def.target_pole.re, def.target_pole.im),
                    reason,
                })
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub name: String,
    pub settings: AnalysisDef,
    pub model: PlantModel,
    pub open_loop: OpenLoopAnalysis,
    pub compensation: Compensation,
}

pub fn run_analysis(config: &AnalysisConfig) -> AppResult<AnalysisReport> {
    hf_project::validate_config(config)
        .map_err(|e| AppError::InvalidConfiguration(e.to_string()))?;

    let span = info_span!("analysis", name = %config.name);
    let _guard = span.enter();

    let model = PlantModel::build(&PlantParameters::from(&config.plant))?;
    let settings = &config.analysis;

    let (open_loop, compensation) = rayon::join(
        || analyze_open_loop(&model, settings),
        || Compensation::run(&model, &config.compensator, settings),
    );

    Ok(AnalysisReport {
        name: config.name.clone(),
        settings: settings.clone(),
        model,
        open_loop: open_loop?,
        compensation: compensation?,
    })
}
