use std::collections::BTreeMap;

use tracing::debug;

use crate::error::CutError;
use crate::extract::{USAGE_TOLERANCE, check_assignment, read_count};
use crate::model::{CuttingModel, Relation, SolvedModel, VarDomain, VarId};
use crate::types::{Pattern, ProblemData, SolutionResult};

/// Assignment (Kantorovich) formulation: one candidate roll per demanded piece,
/// each order type's cut count decided roll by roll.
#[derive(Debug, Clone)]
pub struct DirectModel {
    pub model: CuttingModel,
    /// `used[c]`: whether roll `c` is cut at all.
    pub used: Vec<VarId>,
    /// `cut_counts[t][c]`: pieces of order type `t` cut from roll `c`.
    pub cut_counts: Vec<Vec<VarId>>,
}

pub fn build(data: &ProblemData, integral: bool) -> DirectModel {
    let domain = VarDomain::from_integral(integral);
    let rolls = data.total_demand();
    let orders = data.order_types();
    let mut model = CuttingModel::new("Kantorovich model");

    let used: Vec<VarId> = (0..rolls)
        .map(|c| model.add_var(format!("raw_cut_{c}"), domain, (0.0, Some(1.0)), 1.0))
        .collect();

    let cut_counts: Vec<Vec<VarId>> = (0..orders.len())
        .map(|t| {
            (0..rolls)
                .map(|c| model.add_var(format!("item_{t}_{c}"), domain, (0.0, None), 0.0))
                .collect()
        })
        .collect();

    for (t, order) in orders.iter().enumerate() {
        model.add_constraint(
            format!("min_demand_{t}"),
            cut_counts[t].iter().map(|&v| (v, 1.0)),
            Relation::Ge,
            order.quantity as f64,
        );
    }

    let raw_width = data.raw_width() as f64;
    for (c, &roll) in used.iter().enumerate() {
        let pieces = orders
            .iter()
            .zip(&cut_counts)
            .map(|(order, counts)| (counts[c], order.width as f64));
        model.add_constraint(
            format!("max_width_{c}"),
            pieces.chain(std::iter::once((roll, -raw_width))),
            Relation::Le,
            0.0,
        );
    }

    debug!(
        rolls,
        order_types = orders.len(),
        vars = model.num_vars(),
        constraints = model.num_constraints(),
        integral,
        "built direct model"
    );

    DirectModel {
        model,
        used,
        cut_counts,
    }
}

impl DirectModel {
    /// Reads the pattern cut on every used roll and counts identical patterns.
    pub fn extract(&self, data: &ProblemData, solved: &SolvedModel) -> Result<SolutionResult, CutError> {
        check_assignment(&self.model, solved)?;
        let mut pattern_usage: BTreeMap<Pattern, f64> = BTreeMap::new();
        for (c, &roll) in self.used.iter().enumerate() {
            if solved.value(roll) < USAGE_TOLERANCE {
                continue;
            }
            // Under relaxation a partly used roll may truncate to all zeros; it is
            // still reported, so relaxed usage describes rolls, not a cutting plan.
            let pattern = Pattern::new(
                self.cut_counts
                    .iter()
                    .map(|counts| read_count(solved.value(counts[c])))
                    .collect(),
            );
            if !data.fits(&pattern) {
                return Err(CutError::Backend(format!(
                    "roll {c} was assigned pattern {pattern} wider than {}",
                    data.raw_width()
                )));
            }
            *pattern_usage.entry(pattern).or_insert(0.0) += 1.0;
        }
        Ok(SolutionResult {
            objective: solved.objective,
            pattern_usage,
        })
    }
}
