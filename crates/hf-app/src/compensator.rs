//! PI compensator placement on the root locus.

use hf_lti::{Complex, PiDesign, TransferFunction, design_pi};
use hf_project::CompensatorDef;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::model::PlantModel;

/// Largest tolerated distance (degrees) between the augmented loop angle at
/// the target pole and +/-180 deg before a warning is logged.
pub const ANGLE_WARN_DEG: f64 = 1.0;

/// Compensated loop built around a [`PiDesign`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompensatedSystem {
    pub design: PiDesign,
    /// `PI * G`
    pub forward: TransferFunction,
    /// `PI * G * H`
    pub open_loop: TransferFunction,
    /// `PI G / (1 + PI G H)`
    pub closed_loop: TransferFunction,
}

impl CompensatedSystem {
    pub fn build(model: &PlantModel, def: &CompensatorDef) -> AppResult<Self> {
        let design = design_pi(
            &model.open_loop,
            def.compensator_zero,
            Complex::new(def.target_pole.re, def.target_pole.im),
        )?;

        if design.locus.angle_error_deg() > ANGLE_WARN_DEG {
            let target = design.target();
            warn!(
                angle_deg = design.locus.angle_deg,
                target_re = target.re,
                target_im = target.im,
                "target pole is not on the root locus; the closed loop will not have a pole there"
            );
        }
        info!(kp = design.gain, zero = design.zero, "PI compensator designed");

        let forward = &design.compensator * &model.forward;
        let open_loop = &forward * &model.feedback;
        let closed_loop = forward.feedback(&model.feedback)?;

        Ok(Self {
            design,
            forward,
            open_loop,
            closed_loop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::PlantParameters;
    use hf_project::TargetPoleDef;

    #[test]
    fn default_design_gain() {
        let model = PlantModel::build(&PlantParameters::default()).unwrap();
        let comp = CompensatedSystem::build(&model, &CompensatorDef::default()).unwrap();
        assert!((comp.design.gain - 1.278409).abs() < 1e-5);
        assert!(comp.open_loop.dc_gain().is_infinite());
        assert_eq!(comp.closed_loop.order(), 4);
    }

    #[test]
    fn complex_target_is_off_the_locus() {
        let model = PlantModel::build(&PlantParameters::default()).unwrap();
        let def = CompensatorDef {
            target_pole: TargetPoleDef { re: -0.05, im: 0.05 },
            ..CompensatorDef::default()
        };
        let comp = CompensatedSystem::build(&model, &def).unwrap();
        assert_eq!(comp.design.target(), Complex::new(-0.05, 0.05));
        assert!(comp.design.locus.angle_error_deg() > ANGLE_WARN_DEG);

        let on_locus = CompensatedSystem::build(&model, &CompensatorDef::default()).unwrap();
        assert!(on_locus.design.locus.angle_error_deg().abs() < 1e-6);
    }

    #[test]
    fn target_on_open_loop_pole_is_degenerate() {
        let model = PlantModel::build(&PlantParameters::default()).unwrap();
        let def = CompensatorDef {
            compensator_zero: 0.01,
            target_pole: TargetPoleDef { re: -0.2, im: 0.0 },
        };
        assert!(matches!(
            CompensatedSystem::build(&model, &def),
            Err(AppError::Degenerate(_))
        ));
    }
}
