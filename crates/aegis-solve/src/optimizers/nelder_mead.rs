//! Nelder-Mead simplex search.
//!
//! Derivative-free and tolerant of noisy objectives. The simplex is seeded
//! on the first step from the current iterate plus one vertex per
//! coordinate, offset by `initial_step`. Each later step performs one
//! reflection / expansion / contraction / shrink round and returns the best
//! vertex, so the reported energy never increases.

use super::{Iterate, Objective, Optimizer};
use crate::error::SolveResult;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct NelderMead {
    initial_step: f64,
    simplex: Vec<Iterate>,
}

impl NelderMead {
    pub fn new(initial_step: f64) -> Self {
        Self {
            initial_step,
            simplex: Vec::new(),
        }
    }

    /// Current simplex vertices, best first.
    pub fn simplex(&self) -> &[Iterate] {
        &self.simplex
    }

    fn seed(&mut self, current: &Iterate, objective: &mut Objective<'_>) -> SolveResult<()> {
        self.simplex.clear();
        self.simplex.push(current.clone());
        for i in 0..current.params.len() {
            let mut params = current.params.clone();
            params[i] += self.initial_step;
            let energy = objective(&params)?;
            self.simplex.push(Iterate { params, energy });
        }
        self.sort();
        Ok(())
    }

    fn sort(&mut self) {
        self.simplex.sort_by(|a, b| a.energy.total_cmp(&b.energy));
    }
}

/// `from + t·(to − from)`
fn along(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter().zip(to).map(|(f, x)| f + t * (x - f)).collect()
}

impl Optimizer for NelderMead {
    fn name(&self) -> &'static str {
        "nelder_mead"
    }

    fn step(&mut self, current: &Iterate, objective: &mut Objective<'_>) -> SolveResult<Iterate> {
        let n = current.params.len();
        if n == 0 {
            return Ok(current.clone());
        }
        if self.simplex.len() != n + 1 {
            self.seed(current, objective)?;
        }

        let mut centroid = vec![0.0; n];
        for vertex in &self.simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(&vertex.params) {
                *c += x / n as f64;
            }
        }

        let best = self.simplex[0].energy;
        let second_worst = self.simplex[n - 1].energy;
        let worst = self.simplex[n].clone();

        let reflected = along(&centroid, &worst.params, -REFLECTION);
        let f_reflected = objective(&reflected)?;

        if f_reflected < best {
            let expanded = along(&centroid, &worst.params, -EXPANSION);
            let f_expanded = objective(&expanded)?;
            self.simplex[n] = if f_expanded < f_reflected {
                Iterate {
                    params: expanded,
                    energy: f_expanded,
                }
            } else {
                Iterate {
                    params: reflected,
                    energy: f_reflected,
                }
            };
        } else if f_reflected < second_worst {
            self.simplex[n] = Iterate {
                params: reflected,
                energy: f_reflected,
            };
        } else {
            let (contracted, bound) = if f_reflected < worst.energy {
                (along(&centroid, &reflected, CONTRACTION), f_reflected)
            } else {
                (along(&centroid, &worst.params, CONTRACTION), worst.energy)
            };
            let f_contracted = objective(&contracted)?;
            if f_contracted < bound {
                self.simplex[n] = Iterate {
                    params: contracted,
                    energy: f_contracted,
                };
            } else {
                let anchor = self.simplex[0].params.clone();
                for vertex in &mut self.simplex[1..] {
                    vertex.params = along(&anchor, &vertex.params, SHRINK);
                    vertex.energy = objective(&vertex.params)?;
                }
            }
        }

        self.sort();
        Ok(self.simplex[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizers::test_support::run;

    #[test]
    fn test_converges_on_sphere() {
        let mut nm = NelderMead::new(0.5);
        let end = run(&mut nm, vec![3.0, -2.0, 0.0], 300);
        assert!(end.energy < 1e-4, "energy {}", end.energy);
        assert!((end.params[1] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_energy_never_increases() {
        let mut nm = NelderMead::new(0.3);
        let mut objective = crate::optimizers::test_support::shifted_sphere;
        let start = vec![1.5, 1.5];
        let mut current = Iterate {
            energy: objective(&start).unwrap(),
            params: start,
        };
        for _ in 0..50 {
            let next = nm.step(&current, &mut objective).unwrap();
            assert!(next.energy <= current.energy);
            current = next;
        }
    }

    #[test]
    fn test_seeds_simplex_once() {
        let mut nm = NelderMead::new(0.5);
        run(&mut nm, vec![0.0, 0.0], 1);
        assert_eq!(nm.simplex().len(), 3);
    }
}
