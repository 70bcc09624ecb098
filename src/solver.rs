use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::LpBackend;
use crate::error::CutError;
use crate::extract::BuiltModel;
use crate::types::{ProblemData, SolutionResult};
use crate::{direct, pattern};

/// Which of the two cutting-stock formulations to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Formulation {
    /// One variable per (order type, candidate roll) pair.
    #[default]
    Direct,
    /// One variable per supplied cutting pattern.
    Pattern,
}

impl Formulation {
    pub fn build(self, data: &ProblemData, integral: bool) -> BuiltModel {
        match self {
            Formulation::Direct => BuiltModel::Direct(direct::build(data, integral)),
            Formulation::Pattern => BuiltModel::Pattern(pattern::build(data, integral)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Formulation::Direct => "Kantorovich",
            Formulation::Pattern => "Gilmore-Gomory",
        }
    }
}

impl std::fmt::Display for Formulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formulation::Direct => write!(f, "direct"),
            Formulation::Pattern => write!(f, "pattern"),
        }
    }
}

/// Objective values of both formulations, integer and relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub direct_integer: f64,
    pub pattern_integer: f64,
    pub direct_relaxed: f64,
    pub pattern_relaxed: f64,
}

/// Builds and solves formulations of one instance against one backend.
pub struct Solver<'a, B> {
    data: &'a ProblemData,
    backend: B,
}

impl<'a, B: LpBackend> Solver<'a, B> {
    pub fn new(data: &'a ProblemData, backend: B) -> Self {
        Self { data, backend }
    }

    pub fn data(&self) -> &ProblemData {
        self.data
    }

    /// Builds a fresh model, solves it and reads back the pattern usage.
    pub fn solve(&self, formulation: Formulation, integral: bool) -> Result<SolutionResult, CutError> {
        let built = formulation.build(self.data, integral);
        let started = Instant::now();
        let solved = self.backend.solve(built.model())?;
        let result = built.extract(self.data, &solved)?;
        info!(
            %formulation,
            integral,
            objective = result.objective,
            patterns = result.pattern_usage.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solved"
        );
        Ok(result)
    }

    pub fn compare(&self) -> Result<Comparison, CutError> {
        Ok(Comparison {
            direct_integer: self.solve(Formulation::Direct, true)?.objective,
            pattern_integer: self.solve(Formulation::Pattern, true)?.objective,
            direct_relaxed: self.solve(Formulation::Direct, false)?.objective,
            pattern_relaxed: self.solve(Formulation::Pattern, false)?.objective,
        })
    }
}
