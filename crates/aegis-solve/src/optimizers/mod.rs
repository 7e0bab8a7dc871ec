//! Classical optimizers for the variational loop.
//!
//! Every optimizer advances one step at a time: given the current iterate
//! and an objective, it proposes the next iterate. Stopping is decided by
//! [`ConvergencePolicy`](crate::convergence::ConvergencePolicy), not by the
//! optimizer.

mod compass;
mod nelder_mead;
mod spsa;

pub use compass::CompassSearch;
pub use nelder_mead::NelderMead;
pub use spsa::Spsa;

use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};

/// A parameter vector and its evaluated energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Iterate {
    /// θ.
    pub params: Vec<f64>,
    /// Objective value at θ.
    pub energy: f64,
}

/// Objective callback; errors abort the step.
pub type Objective<'a> = dyn FnMut(&[f64]) -> SolveResult<f64> + 'a;

/// A step-wise minimiser.
pub trait Optimizer: Send {
    /// Short name used in labels.
    fn name(&self) -> &'static str;

    /// Propose the next iterate from `current`.
    fn step(&mut self, current: &Iterate, objective: &mut Objective<'_>) -> SolveResult<Iterate>;
}

/// Optimizer choice, dispatched through [`Optimizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Simultaneous perturbation stochastic approximation.
    Spsa {
        /// Step-size numerator.
        a: f64,
        /// Perturbation numerator.
        c: f64,
        /// Step-size decay exponent.
        alpha: f64,
        /// Perturbation decay exponent.
        gamma: f64,
        /// Stability constant A.
        stability: f64,
    },
    /// Nelder-Mead simplex search.
    NelderMead {
        /// Edge length of the initial simplex.
        initial_step: f64,
    },
    /// Coordinate pattern search.
    CompassSearch {
        /// Starting poll radius.
        initial_step: f64,
        /// Radius below which polling stops.
        min_step: f64,
    },
}

impl OptimizerKind {
    /// SPSA with the standard decay exponents.
    pub fn spsa() -> Self {
        OptimizerKind::Spsa {
            a: 0.1,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            stability: 0.0,
        }
    }

    /// Nelder-Mead with a 0.5 rad initial simplex.
    pub fn nelder_mead() -> Self {
        OptimizerKind::NelderMead { initial_step: 0.5 }
    }

    /// Compass search from 0.5 rad down to 1e-4.
    pub fn compass() -> Self {
        OptimizerKind::CompassSearch {
            initial_step: 0.5,
            min_step: 1e-4,
        }
    }

    /// Short name.
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Spsa { .. } => "spsa",
            OptimizerKind::NelderMead { .. } => "nelder_mead",
            OptimizerKind::CompassSearch { .. } => "compass",
        }
    }

    /// Check the hyper-parameters.
    pub fn validate(&self) -> SolveResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SolveError::InvalidConfig(format!(
                    "{} {name} must be finite and positive, got {v}",
                    self.name()
                )))
            }
        };
        match *self {
            OptimizerKind::Spsa {
                a,
                c,
                alpha,
                gamma,
                stability,
            } => {
                positive("a", a)?;
                positive("c", c)?;
                if !(alpha.is_finite() && gamma.is_finite() && stability.is_finite())
                    || stability < 0.0
                {
                    return Err(SolveError::InvalidConfig(
                        "spsa exponents must be finite and stability non-negative".into(),
                    ));
                }
            }
            OptimizerKind::NelderMead { initial_step } => positive("initial_step", initial_step)?,
            OptimizerKind::CompassSearch {
                initial_step,
                min_step,
            } => {
                positive("initial_step", initial_step)?;
                positive("min_step", min_step)?;
            }
        }
        Ok(())
    }

    /// Instantiate a fresh optimizer; `seed` drives any randomness it uses.
    pub fn build(&self, seed: u64) -> SolveResult<Box<dyn Optimizer>> {
        self.validate()?;
        Ok(match *self {
            OptimizerKind::Spsa {
                a,
                c,
                alpha,
                gamma,
                stability,
            } => Box::new(Spsa::new(a, c, alpha, gamma, stability, seed)),
            OptimizerKind::NelderMead { initial_step } => Box::new(NelderMead::new(initial_step)),
            OptimizerKind::CompassSearch {
                initial_step,
                min_step,
            } => Box::new(CompassSearch::new(initial_step, min_step)),
        })
    }
}

impl Default for OptimizerKind {
    fn default() -> Self {
        Self::spsa()
    }
}

impl std::str::FromStr for OptimizerKind {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "spsa" => Ok(Self::spsa()),
            "nelder_mead" | "cobyla" => Ok(Self::nelder_mead()),
            "compass" | "compass_search" => Ok(Self::compass()),
            other => Err(SolveError::InvalidConfig(format!("unknown optimizer {other:?}"))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("spsa".parse::<OptimizerKind>().unwrap(), OptimizerKind::spsa());
        assert_eq!(
            "Nelder-Mead".parse::<OptimizerKind>().unwrap(),
            OptimizerKind::nelder_mead()
        );
        assert!("adam".parse::<OptimizerKind>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(OptimizerKind::compass().validate().is_ok());
        let bad = OptimizerKind::CompassSearch {
            initial_step: 0.0,
            min_step: 1e-3,
        };
        assert!(matches!(bad.build(0), Err(SolveError::InvalidConfig(_))));
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_string(&OptimizerKind::nelder_mead()).unwrap();
        assert_eq!(json, r#"{"kind":"nelder_mead","initial_step":0.5}"#);
    }
}
