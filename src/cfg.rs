use serde::Deserialize;
use serde_json::Value;

use crate::data::CaseData;
use crate::error::{Error, Result};
use crate::likelihood::Likelihood;
use crate::proposal;

/// How much of the population a likelihood evaluation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recompute {
    /// Whole-population scores before and after every single-case proposal.
    #[default]
    Full,
    /// Only the terms a proposal touches. Sums fewer terms, so results can
    /// differ from `Full` in the last bits under floating point.
    Local,
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    #[serde(default, alias = "sd.mu")]
    sd_mu: Option<Value>,
    #[serde(default)]
    recompute: Recompute,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Configuration {
    /// Standard deviation of the mutation rate proposal.
    pub sd_mu: f64,
    pub recompute: Recompute,
    /// Seed for the chain's random stream; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Configuration {
    pub fn new(sd_mu: f64) -> Result<Self> {
        check_sd_mu(sd_mu)?;
        Ok(Self { sd_mu, recompute: Recompute::Full, seed: None })
    }

    pub fn with_recompute(mut self, recompute: Recompute) -> Self {
        self.recompute = recompute;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reads a JSON object. Keys other than `sd_mu` (or `sd.mu`),
    /// `recompute` and `seed` belong to other components and are ignored.
    pub fn from_json(src: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(src)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidConfig("expected a mapping".to_string()));
        }
        let raw: RawConfiguration = serde_json::from_value(value)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let sd_mu = match raw.sd_mu {
            None | Some(Value::Null) => {
                return Err(Error::InvalidConfig("missing sd_mu".to_string()));
            }
            Some(v) => v
                .as_f64()
                .ok_or_else(|| Error::InvalidConfig(format!("sd_mu is not a number: {}", v)))?,
        };
        check_sd_mu(sd_mu)?;

        Ok(Self { sd_mu, recompute: raw.recompute, seed: raw.seed })
    }

    /// Moves run by one sweep: mutation rate, infection times, ancestries.
    pub fn get_moves<D, L>(&self) -> Result<proposal::Schedule<D, L>>
    where
        D: CaseData + ?Sized,
        L: Likelihood<D> + ?Sized,
    {
        let mut schedule = proposal::Schedule::empty();

        schedule.add_move(proposal::MuMove::new(self)?);
        schedule.add_move(proposal::InfectionTimeMove::new(self));
        schedule.add_move(proposal::AncestryMove::new(self));

        Ok(schedule)
    }
}

fn check_sd_mu(sd_mu: f64) -> Result<()> {
    if !sd_mu.is_finite() || sd_mu < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "sd_mu must be finite and non-negative, got {}",
            sd_mu
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_dotted_and_plain_keys() {
        let cfg = Configuration::from_json(r#"{"sd.mu": 0.0001, "n.iter": 100}"#).unwrap();
        assert_eq!(cfg.sd_mu, 0.0001);
        assert_eq!(cfg.recompute, Recompute::Full);
        assert_eq!(cfg.seed, None);

        let cfg =
            Configuration::from_json(r#"{"sd_mu": 0.5, "recompute": "local", "seed": 7}"#).unwrap();
        assert_eq!(cfg.recompute, Recompute::Local);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn missing_sd_mu_is_fatal() {
        let err = Configuration::from_json(r#"{"seed": 1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
        let err = Configuration::from_json(r#"{"sd_mu": null}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
    }

    #[test]
    fn non_numeric_sd_mu_is_fatal() {
        let err = Configuration::from_json(r#"{"sd_mu": "wide"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
    }

    #[test]
    fn negative_sd_mu_is_fatal() {
        assert!(Configuration::from_json(r#"{"sd_mu": -1.0}"#).is_err());
        assert!(Configuration::new(f64::INFINITY).is_err());
    }

    #[test]
    fn mistyped_fields_are_invalid_config() {
        let err = Configuration::from_json(r#"{"sd_mu": 0.1, "seed": -1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
        let err = Configuration::from_json(r#"{"sd_mu": 0.1, "recompute": "LOCAL"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)), "{}", err);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(Configuration::from_json("{sd_mu"), Err(Error::Json(_))));
        assert!(matches!(Configuration::from_json("[1, 2]"), Err(Error::InvalidConfig(_))));
    }
}
