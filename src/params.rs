use std::fmt;

use crate::error::{Error, Result};

/// Identifier of a case as seen by callers, on the 1..=N scale.
///
/// Snapshots store cases contiguously from 0; `index` and `from_index` are
/// the only conversions between the two scales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseId(usize);

impl CaseId {
    pub fn new(id: usize) -> Result<Self> {
        if id == 0 {
            return Err(Error::InvalidInput("case identifiers start at 1".to_string()));
        }
        Ok(CaseId(id))
    }

    pub fn from_index(index: usize) -> Self {
        CaseId(index + 1)
    }

    pub fn index(self) -> usize {
        self.0 - 1
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One state of the chain: mutation rate, infection times and ancestries.
///
/// `alpha[i] == None` marks an index case. Case accessors panic when given a
/// `CaseId` beyond `num_cases()`, like slice indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    pub mu: f64,
    pub(crate) t_inf: Vec<i64>,
    pub(crate) alpha: Vec<Option<usize>>,
}

impl Parameters {
    /// Builds a snapshot from caller-scale vectors: `alpha` holds 1-based
    /// ancestor identifiers, `None` for index cases.
    pub fn from_external(mu: f64, t_inf: Vec<i64>, alpha: Vec<Option<usize>>) -> Result<Self> {
        let n = t_inf.len();
        if alpha.len() != n {
            return Err(Error::InvalidInput(format!(
                "{} infection times but {} ancestries",
                n,
                alpha.len()
            )));
        }

        let mut internal = Vec::with_capacity(n);
        for (i, a) in alpha.into_iter().enumerate() {
            let a = match a {
                None => None,
                Some(id) => {
                    if id == 0 || id > n {
                        return Err(Error::InvalidInput(format!(
                            "case {} has ancestor {} outside 1..={}",
                            i + 1,
                            id,
                            n
                        )));
                    }
                    if id == i + 1 {
                        return Err(Error::InvalidInput(format!(
                            "case {} is its own ancestor",
                            id
                        )));
                    }
                    Some(CaseId::new(id)?.index())
                }
            };
            internal.push(a);
        }

        Ok(Self { mu, t_inf, alpha: internal })
    }

    pub fn num_cases(&self) -> usize {
        self.t_inf.len()
    }

    pub fn cases(&self) -> impl Iterator<Item = CaseId> {
        (0..self.num_cases()).map(CaseId::from_index)
    }

    pub fn infection_times(&self) -> &[i64] {
        &self.t_inf
    }

    pub fn infection_time(&self, case: CaseId) -> i64 {
        self.t_inf[case.index()]
    }

    pub fn set_infection_time(&mut self, case: CaseId, t: i64) {
        self.t_inf[case.index()] = t;
    }

    pub fn ancestor(&self, case: CaseId) -> Option<CaseId> {
        self.alpha[case.index()].map(CaseId::from_index)
    }

    pub fn set_ancestor(&mut self, case: CaseId, ancestor: Option<CaseId>) -> Result<()> {
        if let Some(a) = ancestor {
            if a.index() >= self.num_cases() || a == case {
                return Err(Error::InvalidInput(format!(
                    "{} cannot be the ancestor of case {}",
                    a, case
                )));
            }
        }
        self.alpha[case.index()] = ancestor.map(CaseId::index);
        Ok(())
    }

    /// Ancestries on the caller's 1..=N scale.
    pub fn ancestors_external(&self) -> Vec<Option<usize>> {
        self.alpha.iter().map(|a| a.map(|j| j + 1)).collect()
    }

    pub fn is_index_case(&self, case: CaseId) -> bool {
        self.alpha[case.index()].is_none()
    }

    /// Cases infected strictly before `case`, in ascending identifier order.
    pub fn earlier_cases(&self, case: CaseId) -> Vec<CaseId> {
        let t = self.t_inf[case.index()];
        self.t_inf
            .iter()
            .enumerate()
            .filter(|(_, &s)| s < t)
            .map(|(j, _)| CaseId::from_index(j))
            .collect()
    }

    pub fn has_earlier_case(&self, case: CaseId) -> bool {
        let t = self.t_inf[case.index()];
        self.t_inf.iter().any(|&s| s < t)
    }

    /// Cases directly infected by `case`.
    pub fn descendants(&self, case: CaseId) -> Vec<CaseId> {
        let i = case.index();
        self.alpha
            .iter()
            .enumerate()
            .filter(|(_, a)| **a == Some(i))
            .map(|(j, _)| CaseId::from_index(j))
            .collect()
    }

    /// Cases whose ancestor is not infected strictly before them.
    pub fn temporal_violations(&self) -> Vec<CaseId> {
        self.alpha
            .iter()
            .enumerate()
            .filter_map(|(i, a)| match a {
                Some(j) if self.t_inf[*j] >= self.t_inf[i] => Some(CaseId::from_index(i)),
                _ => None,
            })
            .collect()
    }
}
