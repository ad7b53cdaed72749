//! Metropolis-Hastings moves for reconstructing an outbreak's transmission
//! tree: the mutation rate, per-case infection times and per-case ancestries.
//!
//! Case identifiers cross the public API on the 1..=N scale as [`CaseId`];
//! snapshots store cases from index 0.

use std::collections::BTreeMap;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;


pub mod ancestor;
pub mod cfg;
pub mod data;
pub mod error;
pub mod likelihood;
pub mod params;
pub mod proposal;
pub mod util;

pub use error::{Error, Result};
pub use params::{CaseId, Parameters};

/// Cases whose likelihood terms a proposal touches.
pub struct Damage {
    cases: Vec<bool>,
}

impl Damage {
    pub fn blank(n_cases: usize) -> Self {
        Damage { cases: vec![false; n_cases] }
    }

    pub fn is_marked(&self, case: CaseId) -> bool {
        self.cases[case.index()]
    }

    pub fn mark_case(&mut self, case: CaseId) {
        self.cases[case.index()] = true;
    }

    pub fn clear(&mut self) {
        self.cases.iter_mut().for_each(|item| *item = false);
    }

    /// Marks every case `case` directly infected.
    pub fn mark_descendants(&mut self, params: &Parameters, case: CaseId) {
        for child in params.descendants(case) {
            self.mark_case(child);
        }
    }

    pub fn marked(&self) -> Vec<CaseId> {
        self.cases
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| CaseId::from_index(i))
            .collect()
    }
}

/// Owns the chain's random stream. Independent chains need independent
/// engines.
pub struct Engine {
    pub rng: StdRng,
}

impl Engine {
    pub fn forge(config: &cfg::Configuration) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Engine { rng }
    }
}

pub struct MCMC<'c, D, L>
where
    D: data::CaseData,
    L: likelihood::Likelihood<D>,
{
    pub config: &'c cfg::Configuration,
    pub data: &'c D,
    pub likelihood: &'c L,
    pub params: Parameters,
    pub engine: Engine,
    schedule: proposal::Schedule<D, L>,
    tally: proposal::Tally,
}

impl<'c, D, L> MCMC<'c, D, L>
where
    D: data::CaseData,
    L: likelihood::Likelihood<D>,
{
    pub fn new(
        config: &'c cfg::Configuration,
        data: &'c D,
        likelihood: &'c L,
        params: Parameters,
    ) -> Result<Self> {
        if params.num_cases() != data.num_cases() {
            return Err(Error::InvalidInput(format!(
                "snapshot has {} cases, data has {}",
                params.num_cases(),
                data.num_cases()
            )));
        }

        let schedule = config.get_moves()?;
        let engine = Engine::forge(config);
        info!(
            "chain ready: {} cases, moves {:?}, {:?} recomputation",
            data.num_cases(),
            schedule.names(),
            config.recompute
        );

        Ok(Self {
            config,
            data,
            likelihood,
            params,
            engine,
            schedule,
            tally: proposal::Tally::default(),
        })
    }

    /// Runs every move once on a working copy of the current snapshot. The
    /// copy replaces `params` only when the whole sweep succeeds.
    pub fn step(&mut self) -> Result<()> {
        let next = self.schedule.sweep(
            self.data,
            self.likelihood,
            self.params.clone(),
            &mut self.engine.rng,
            &mut self.tally,
        )?;
        self.params = next;
        Ok(())
    }

    pub fn tally(&self) -> &proposal::Tally {
        &self.tally
    }

    pub fn acceptance_rates(&self) -> BTreeMap<String, f64> {
        self.tally.acceptance_rates()
    }
}
