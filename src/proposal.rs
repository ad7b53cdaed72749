use std::boxed::Box;
use std::collections::BTreeMap;

use log::{debug, trace};
use rand::RngCore;

use crate::ancestor::{AncestorSampler, UniformAncestor};
use crate::cfg::{self, Recompute};
use crate::data::CaseData;
use crate::error::{Error, Result};
use crate::likelihood::{Likelihood, Scope};
use crate::params::{CaseId, Parameters};
use crate::util::{metropolis_accept, StepDist};
use crate::Damage;

/// Moves applied once each, in insertion order, per sweep.
pub struct Schedule<D: ?Sized, L: ?Sized> {
    moves: Vec<Box<dyn Move<D, L>>>,
}

impl<D, L> Schedule<D, L>
where
    D: CaseData + ?Sized,
    L: Likelihood<D> + ?Sized,
{
    pub fn empty() -> Self {
        Self { moves: vec![] }
    }

    pub fn add_move(&mut self, mv: Box<dyn Move<D, L>>) {
        self.moves.push(mv);
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.moves.iter().map(|mv| mv.name()).collect()
    }

    pub fn sweep(
        &self,
        data: &D,
        likelihood: &L,
        mut params: Parameters,
        rng: &mut dyn RngCore,
        tally: &mut Tally,
    ) -> Result<Parameters> {
        for mv in &self.moves {
            let result = mv.make_move(data, likelihood, params, rng)?;
            tally.record(mv.name(), result.accepted, result.proposed);
            params = result.params;
        }
        Ok(params)
    }
}

/// Accepted and proposed counts per move name.
#[derive(Debug, Default, Clone)]
pub struct Tally {
    counts: BTreeMap<&'static str, (usize, usize)>,
}

impl Tally {
    pub fn record(&mut self, name: &'static str, accepted: usize, proposed: usize) {
        let entry = self.counts.entry(name).or_insert((0, 0));
        entry.0 += accepted;
        entry.1 += proposed;
    }

    pub fn counts(&self, name: &str) -> Option<(usize, usize)> {
        self.counts.get(name).copied()
    }

    pub fn acceptance_rates(&self) -> BTreeMap<String, f64> {
        self.counts
            .iter()
            .map(|(name, &(accepted, proposed))| {
                let rate = if proposed > 0 { accepted as f64 / proposed as f64 } else { 0.0 };
                (name.to_string(), rate)
            })
            .collect()
    }
}

/// The snapshot a move hands back, with how many proposals it made and kept.
#[derive(Debug, Clone)]
pub struct MoveResult {
    pub params: Parameters,
    pub proposed: usize,
    pub accepted: usize,
}

pub trait Move<D: ?Sized, L: ?Sized> {
    fn name(&self) -> &'static str;

    /// Takes the current state by value and returns the next one. Proposals
    /// that are rejected leave their coordinate exactly as it came in.
    fn make_move(
        &self,
        data: &D,
        likelihood: &L,
        params: Parameters,
        rng: &mut dyn RngCore,
    ) -> Result<MoveResult>;
}

fn check_size<D: CaseData + ?Sized>(data: &D, params: &Parameters) -> Result<usize> {
    let n = data.num_cases();
    if params.num_cases() != n {
        return Err(Error::InvalidInput(format!(
            "snapshot has {} cases, data has {}",
            params.num_cases(),
            n
        )));
    }
    Ok(n)
}

/// Gaussian random walk on the mutation rate, scored on the genetic
/// likelihood. No bounds are enforced here.
pub struct MuMove {
    step: StepDist,
}

impl MuMove {
    pub fn new(config: &cfg::Configuration) -> Result<Box<Self>> {
        Ok(Box::new(Self { step: StepDist::gaussian(config.sd_mu)? }))
    }
}

impl<D, L> Move<D, L> for MuMove
where
    D: CaseData + ?Sized,
    L: Likelihood<D> + ?Sized,
{
    fn name(&self) -> &'static str {
        "mu"
    }

    fn make_move(
        &self,
        data: &D,
        likelihood: &L,
        mut params: Parameters,
        rng: &mut dyn RngCore,
    ) -> Result<MoveResult> {
        let old_ll = likelihood.genetic(data, &params, Scope::All);

        let cur_mu = params.mu;
        params.mu = cur_mu + self.step.draw(rng);

        let new_ll = likelihood.genetic(data, &params, Scope::All);

        let accepted = metropolis_accept(old_ll, new_ll, rng);
        debug!(
            "mu move: {} -> {} ({}), loglik {} -> {}",
            cur_mu,
            params.mu,
            if accepted { "accepted" } else { "rejected" },
            old_ll,
            new_ll
        );
        if !accepted {
            params.mu = cur_mu;
        }

        Ok(MoveResult { params, proposed: 1, accepted: accepted as usize })
    }
}

/// Systematic scan over infection times, one +/-1 step per case in
/// ascending case order, scored on the timing likelihood.
///
/// Ancestor ordering is not re-checked after a shift; a sweep can leave a
/// case infected no later than its ancestor.
pub struct InfectionTimeMove {
    step: StepDist,
    recompute: Recompute,
}

impl InfectionTimeMove {
    pub fn new(config: &cfg::Configuration) -> Box<Self> {
        Box::new(Self { step: StepDist::UnitStep, recompute: config.recompute })
    }
}

impl<D, L> Move<D, L> for InfectionTimeMove
where
    D: CaseData + ?Sized,
    L: Likelihood<D> + ?Sized,
{
    fn name(&self) -> &'static str {
        "t_inf"
    }

    fn make_move(
        &self,
        data: &D,
        likelihood: &L,
        mut params: Parameters,
        rng: &mut dyn RngCore,
    ) -> Result<MoveResult> {
        let n = check_size(data, &params)?;
        let mut damage = Damage::blank(n);
        let mut accepted = 0;

        for i in 0..n {
            let case = CaseId::from_index(i);

            // shifting t_inf[i] touches case i's term and those of its children
            let affected;
            let scope = match self.recompute {
                Recompute::Full => Scope::All,
                Recompute::Local => {
                    damage.clear();
                    damage.mark_case(case);
                    damage.mark_descendants(&params, case);
                    affected = damage.marked();
                    Scope::Cases(&affected)
                }
            };

            let old_ll = likelihood.timing(data, &params, scope);

            let cur = params.t_inf[i];
            // a step past the i64 range is a zero-probability candidate
            let new_ll = match cur.checked_add(self.step.draw_step(rng)) {
                Some(t) => {
                    params.t_inf[i] = t;
                    likelihood.timing(data, &params, scope)
                }
                None => f64::NEG_INFINITY,
            };

            if metropolis_accept(old_ll, new_ll, rng) {
                accepted += 1;
                trace!("t_inf case {}: {} -> {}", data.case_label(case), cur, params.t_inf[i]);
            } else {
                params.t_inf[i] = cur;
            }
        }

        debug!("t_inf move: accepted {}/{}", accepted, n);
        Ok(MoveResult { params, proposed: n, accepted })
    }
}

/// Systematic scan over ancestries. Each case with an ancestor and at least
/// one case infected strictly before it gets a candidate ancestor from the
/// sampler; other cases are skipped.
///
/// Under `Recompute::Full` the decision uses the whole-population composite
/// likelihood; the case-restricted scores are evaluated for the trace log
/// only. Under `Recompute::Local` the decision uses the case-restricted ones.
pub struct AncestryMove<S = UniformAncestor> {
    sampler: S,
    recompute: Recompute,
}

impl AncestryMove<UniformAncestor> {
    pub fn new(config: &cfg::Configuration) -> Box<Self> {
        Box::new(Self { sampler: UniformAncestor, recompute: config.recompute })
    }
}

impl<S: AncestorSampler> AncestryMove<S> {
    pub fn with_sampler(sampler: S, recompute: Recompute) -> Box<Self> {
        Box::new(Self { sampler, recompute })
    }
}

impl<D, L, S> Move<D, L> for AncestryMove<S>
where
    D: CaseData + ?Sized,
    L: Likelihood<D> + ?Sized,
    S: AncestorSampler,
{
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn make_move(
        &self,
        data: &D,
        likelihood: &L,
        mut params: Parameters,
        rng: &mut dyn RngCore,
    ) -> Result<MoveResult> {
        let n = check_size(data, &params)?;
        let mut proposed = 0;
        let mut accepted = 0;

        for i in 0..n {
            let case = CaseId::from_index(i);
            let cur = params.alpha[i];
            if cur.is_none() || !params.has_earlier_case(case) {
                continue;
            }
            let only = [case];

            let (old_ll, old_ll_case) = match self.recompute {
                Recompute::Full => (
                    likelihood.composite(data, &params, Scope::All),
                    likelihood.composite(data, &params, Scope::Cases(&only)),
                ),
                Recompute::Local => {
                    let ll = likelihood.composite(data, &params, Scope::Cases(&only));
                    (ll, ll)
                }
            };

            let candidate = self.sampler.pick(&params, case, rng)?;
            params.alpha[i] = Some(candidate.index());

            let (new_ll, new_ll_case) = match self.recompute {
                Recompute::Full => (
                    likelihood.composite(data, &params, Scope::All),
                    likelihood.composite(data, &params, Scope::Cases(&only)),
                ),
                Recompute::Local => {
                    let ll = likelihood.composite(data, &params, Scope::Cases(&only));
                    (ll, ll)
                }
            };

            proposed += 1;
            let keep = metropolis_accept(old_ll, new_ll, rng);
            trace!(
                "alpha case {}: candidate {} {}, delta {} (case-restricted {})",
                data.case_label(case),
                data.case_label(candidate),
                if keep { "accepted" } else { "rejected" },
                new_ll - old_ll,
                new_ll_case - old_ll_case
            );
            if keep {
                accepted += 1;
            } else {
                params.alpha[i] = cur;
            }
        }

        debug!("alpha move: accepted {}/{} eligible cases", accepted, proposed);
        Ok(MoveResult { params, proposed, accepted })
    }
}
