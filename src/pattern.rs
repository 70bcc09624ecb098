use std::collections::BTreeMap;

use tracing::debug;

use crate::error::CutError;
use crate::extract::{USAGE_TOLERANCE, check_assignment};
use crate::model::{CuttingModel, Relation, SolvedModel, VarDomain, VarId};
use crate::types::{Pattern, ProblemData, SolutionResult};

/// Gilmore–Gomory formulation over the instance's static pattern list.
#[derive(Debug, Clone)]
pub struct PatternModel {
    pub model: CuttingModel,
    /// `pattern_counts[p]`: rolls cut with pattern `p`.
    pub pattern_counts: Vec<VarId>,
}

pub fn build(data: &ProblemData, integral: bool) -> PatternModel {
    let domain = VarDomain::from_integral(integral);
    let mut model = CuttingModel::new("Gilmore-Gomory model");

    let pattern_counts: Vec<VarId> = (0..data.patterns().len())
        .map(|p| model.add_var(format!("patterns_{p}"), domain, (0.0, None), 1.0))
        .collect();

    for (t, order) in data.order_types().iter().enumerate() {
        let yields = data
            .patterns()
            .iter()
            .zip(&pattern_counts)
            .map(|(pattern, &v)| (v, pattern.counts()[t] as f64));
        model.add_constraint(
            format!("min_demand_{t}"),
            yields,
            Relation::Ge,
            order.quantity as f64,
        );
    }

    debug!(
        patterns = pattern_counts.len(),
        constraints = model.num_constraints(),
        integral,
        "built pattern model"
    );

    PatternModel {
        model,
        pattern_counts,
    }
}

impl PatternModel {
    /// Reports the solved roll count of every pattern that is actually used.
    pub fn extract(&self, data: &ProblemData, solved: &SolvedModel) -> Result<SolutionResult, CutError> {
        check_assignment(&self.model, solved)?;
        let mut pattern_usage: BTreeMap<Pattern, f64> = BTreeMap::new();
        for (pattern, &v) in data.patterns().iter().zip(&self.pattern_counts) {
            let weight = solved.value(v);
            if weight < USAGE_TOLERANCE {
                continue;
            }
            *pattern_usage.entry(pattern.clone()).or_insert(0.0) += weight;
        }
        Ok(SolutionResult {
            objective: solved.objective,
            pattern_usage,
        })
    }
}
