use crate::params::{CaseId, Parameters};

/// Which cases' contributions a likelihood evaluation should sum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scope<'a> {
    All,
    Cases(&'a [CaseId]),
}

/// Log-likelihood oracle consulted by the moves.
///
/// Implementations receive snapshots holding provisional values and should
/// score implausible ones (e.g. a mutation rate outside [0, 1]) with a very
/// low or negative-infinite value. Any non-finite score for a candidate state
/// is treated as a rejection.
pub trait Likelihood<D: ?Sized> {
    fn genetic(&self, data: &D, params: &Parameters, scope: Scope<'_>) -> f64;

    fn timing(&self, data: &D, params: &Parameters, scope: Scope<'_>) -> f64;

    /// Genetic, timing and every other term of the model together.
    fn composite(&self, data: &D, params: &Parameters, scope: Scope<'_>) -> f64;
}
