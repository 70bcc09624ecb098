use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use microlp::{ComparisonOp, OptimizationDirection, Problem};
use tracing::{debug, warn};

use crate::error::CutError;
use crate::model::{CuttingModel, Relation, SolvedModel, VarDomain};

/// Anything that can solve a [`CuttingModel`] to optimality.
///
/// Failures must come back as [`CutError::Infeasible`], [`CutError::Unbounded`]
/// or [`CutError::Backend`]; no partial assignment is ever returned.
pub trait LpBackend {
    fn solve(&self, model: &CuttingModel) -> Result<SolvedModel, CutError>;
}

impl<B: LpBackend + ?Sized> LpBackend for &B {
    fn solve(&self, model: &CuttingModel) -> Result<SolvedModel, CutError> {
        (**self).solve(model)
    }
}

/// Pure-Rust simplex with branch and bound for integer variables.
///
/// microlp has no node or time limit of its own. With a time limit set, the
/// solve runs on a worker thread and the call gives up with
/// [`CutError::Backend`] once the limit passes. The abandoned worker cannot be
/// interrupted and keeps running until microlp returns or the process exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpBackend {
    time_limit: Option<Duration>,
}

impl MicroLpBackend {
    /// Waits for microlp however long it takes.
    pub fn new() -> Self {
        Self { time_limit: None }
    }

    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            time_limit: Some(limit),
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

fn run_microlp(problem: &Problem, vars: &[microlp::Variable]) -> Result<SolvedModel, CutError> {
    let solution = problem.solve()?;
    Ok(SolvedModel {
        objective: solution.objective(),
        values: vars.iter().map(|&v| *solution.var_value(v)).collect(),
    })
}

fn comparison(relation: Relation) -> ComparisonOp {
    match relation {
        Relation::Le => ComparisonOp::Le,
        Relation::Ge => ComparisonOp::Ge,
        Relation::Eq => ComparisonOp::Eq,
    }
}

impl LpBackend for MicroLpBackend {
    fn solve(&self, model: &CuttingModel) -> Result<SolvedModel, CutError> {
        // Rows without terms are constant; microlp wants at least one entry per row.
        for c in model.constraints().iter().filter(|c| c.terms.is_empty()) {
            if !c.relation.holds(0.0, c.rhs) {
                debug!(constraint = %c.name, rhs = c.rhs, "empty row cannot be satisfied");
                return Err(CutError::Infeasible);
            }
        }
        if model.num_vars() == 0 {
            return Ok(SolvedModel {
                objective: 0.0,
                values: Vec::new(),
            });
        }

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<microlp::Variable> = model
            .variables()
            .iter()
            .map(|v| match v.domain {
                VarDomain::Continuous => {
                    problem.add_var(v.objective, (v.lower, v.upper.unwrap_or(f64::INFINITY)))
                }
                VarDomain::Integer if v.lower == 0.0 && v.upper == Some(1.0) => {
                    problem.add_binary_var(v.objective)
                }
                VarDomain::Integer => problem.add_integer_var(
                    v.objective,
                    (
                        v.lower.ceil() as i32,
                        v.upper.map_or(i32::MAX, |u| u.floor() as i32),
                    ),
                ),
            })
            .collect();

        for c in model.constraints().iter().filter(|c| !c.terms.is_empty()) {
            problem.add_constraint(
                c.terms.iter().map(|&(id, coeff)| (vars[id.0], coeff)),
                comparison(c.relation),
                c.rhs,
            );
        }

        debug!(
            model = %model.name,
            vars = model.num_vars(),
            constraints = model.num_constraints(),
            time_limit_ms = self.time_limit.map(|l| l.as_millis() as u64),
            "solving with microlp"
        );
        let Some(limit) = self.time_limit else {
            return run_microlp(&problem, &vars);
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("microlp".to_string())
            .spawn(move || {
                // the receiver is gone once the caller stopped waiting
                let _ = tx.send(run_microlp(&problem, &vars));
            })
            .map_err(|e| CutError::Backend(format!("cannot start solver thread: {e}")))?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!(model = %model.name, limit_ms = limit.as_millis() as u64, "solver time limit reached");
                Err(CutError::Backend(format!(
                    "time limit of {:.1}s reached without an optimal solution",
                    limit.as_secs_f64()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(CutError::Backend("solver thread panicked".to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;

    use super::*;

    /// Returns a fixed assignment regardless of the model, counting calls.
    pub(crate) struct StubBackend {
        pub result: Result<SolvedModel, CutError>,
        pub calls: Cell<usize>,
    }

    impl StubBackend {
        pub fn returning(objective: f64, values: Vec<f64>) -> Self {
            Self {
                result: Ok(SolvedModel { objective, values }),
                calls: Cell::new(0),
            }
        }

        pub fn failing(err: CutError) -> Self {
            Self {
                result: Err(err),
                calls: Cell::new(0),
            }
        }
    }

    impl LpBackend for StubBackend {
        fn solve(&self, _model: &CuttingModel) -> Result<SolvedModel, CutError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }
}
