use rand::distributions::Distribution;
use rand::{Rng, RngCore};
use rand_distr::Normal;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub enum StepDist {
    /// Zero-mean Gaussian built by `gaussian`; a zero standard deviation
    /// always yields a zero step.
    Gaussian(Normal<f64>),
    /// +1 or -1 with equal probability.
    UnitStep,
}

impl StepDist {
    pub fn gaussian(sd: f64) -> Result<Self> {
        if !sd.is_finite() || sd < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "proposal standard deviation must be finite and non-negative, got {}",
                sd
            )));
        }
        let dist = Normal::new(0.0, sd).map_err(|e| {
            Error::InvalidConfig(format!("bad proposal standard deviation {}: {}", sd, e))
        })?;
        Ok(StepDist::Gaussian(dist))
    }

    pub fn draw(&self, rng: &mut dyn RngCore) -> f64 {
        match self {
            StepDist::Gaussian(dist) => dist.sample(rng),
            StepDist::UnitStep => {
                let r: f64 = rng.gen();
                if r > 0.5 { 1.0 } else { -1.0 }
            }
        }
    }

    /// Draw rounded to the nearest integer, for integer-valued parameters.
    pub fn draw_step(&self, rng: &mut dyn RngCore) -> i64 {
        self.draw(rng).round() as i64
    }
}

/// Metropolis test for a symmetric proposal.
///
/// Always consumes one uniform draw. Accepts when the candidate score is
/// finite and `u <= exp(new_ll - old_ll)`. A NaN current score therefore
/// rejects every candidate; a negative-infinite one accepts any finite one.
pub fn metropolis_accept(old_ll: f64, new_ll: f64, rng: &mut dyn RngCore) -> bool {
    let u: f64 = rng.gen();
    if !new_ll.is_finite() {
        return false;
    }
    u <= (new_ll - old_ll).exp()
}
