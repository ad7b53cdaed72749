use rand::seq::SliceRandom;
use rand::RngCore;

use crate::error::{Error, Result};
use crate::params::{CaseId, Parameters};

pub trait AncestorSampler {
    /// Returns a case infected strictly before `case`, chosen uniformly.
    fn pick(&self, params: &Parameters, case: CaseId, rng: &mut dyn RngCore) -> Result<CaseId>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UniformAncestor;

impl AncestorSampler for UniformAncestor {
    fn pick(&self, params: &Parameters, case: CaseId, rng: &mut dyn RngCore) -> Result<CaseId> {
        let pool = params.earlier_cases(case);
        pool.choose(rng).copied().ok_or(Error::EmptyAncestorPool { case })
    }
}
