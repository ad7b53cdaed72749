use thiserror::Error;

use crate::params::CaseId;

#[derive(Debug, Error)]
pub enum Error {
    /// Configuration missing a required value or holding an unusable one.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Parameter snapshot or case identifier inconsistent with the data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The ancestor sampler was asked for a case with no earlier case.
    #[error("no case is infected before case {case}")]
    EmptyAncestorPool { case: CaseId },

    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
