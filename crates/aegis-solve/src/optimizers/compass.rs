//! Compass (coordinate pattern) search.

use super::{Iterate, Objective, Optimizer};
use crate::error::SolveResult;

/// Polls `θ ± step·eᵢ` coordinate by coordinate and moves to the first
/// improving point. When no poll improves, the step is halved. Once the step
/// drops below `min_step` the iterate is returned unchanged without
/// evaluating anything.
#[derive(Debug, Clone)]
pub struct CompassSearch {
    step: f64,
    min_step: f64,
}

impl CompassSearch {
    pub fn new(initial_step: f64, min_step: f64) -> Self {
        Self {
            step: initial_step,
            min_step,
        }
    }

    /// Current poll radius.
    pub fn step_size(&self) -> f64 {
        self.step
    }
}

impl Optimizer for CompassSearch {
    fn name(&self) -> &'static str {
        "compass"
    }

    fn step(&mut self, current: &Iterate, objective: &mut Objective<'_>) -> SolveResult<Iterate> {
        if self.step < self.min_step {
            return Ok(current.clone());
        }
        for i in 0..current.params.len() {
            for sign in [1.0, -1.0] {
                let mut params = current.params.clone();
                params[i] += sign * self.step;
                let energy = objective(&params)?;
                if energy < current.energy {
                    return Ok(Iterate { params, energy });
                }
            }
        }
        self.step /= 2.0;
        Ok(current.clone())
    }
}
