use crate::direct::DirectModel;
use crate::error::CutError;
use crate::model::{CuttingModel, SolvedModel};
use crate::pattern::PatternModel;
use crate::types::{ProblemData, SolutionResult};

/// Solver values below this count as zero: the roll or pattern is unused.
pub const USAGE_TOLERANCE: f64 = 1e-3;

/// Distance from an integer under which a value is taken to be that integer.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Converts a solved cut count into a whole number of pieces.
///
/// Values within solver noise of an integer snap to it; anything else is
/// truncated, so the resulting pattern never gets wider than the solved one.
pub fn read_count(value: f64) -> u32 {
    let rounded = value.round();
    let count = if (value - rounded).abs() < INTEGRALITY_TOLERANCE {
        rounded
    } else {
        value.floor()
    };
    count.max(0.0) as u32
}

/// Fails unless `solved` carries exactly one value per variable of `model`.
pub(crate) fn check_assignment(model: &CuttingModel, solved: &SolvedModel) -> Result<(), CutError> {
    if solved.values.len() != model.num_vars() {
        return Err(CutError::Backend(format!(
            "solver returned {} values for {} variables",
            solved.values.len(),
            model.num_vars()
        )));
    }
    Ok(())
}

/// A built formulation, kept together with the variable handles needed to read
/// its solution back.
#[derive(Debug, Clone)]
pub enum BuiltModel {
    Direct(DirectModel),
    Pattern(PatternModel),
}

impl BuiltModel {
    pub fn model(&self) -> &CuttingModel {
        match self {
            BuiltModel::Direct(direct) => &direct.model,
            BuiltModel::Pattern(pattern) => &pattern.model,
        }
    }

    pub fn extract(
        &self,
        data: &ProblemData,
        solved: &SolvedModel,
    ) -> Result<SolutionResult, CutError> {
        match self {
            BuiltModel::Direct(direct) => direct.extract(data, solved),
            BuiltModel::Pattern(pattern) => pattern.extract(data, solved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderType, Pattern};
    use crate::{direct, pattern};

    #[test]
    fn test_read_count_snaps_noise() {
        assert_eq!(read_count(0.999_999_9), 1);
        assert_eq!(read_count(2.000_000_4), 2);
        assert_eq!(read_count(-0.000_000_1), 0);
    }

    #[test]
    fn test_read_count_truncates_fractions() {
        assert_eq!(read_count(1.5), 1);
        assert_eq!(read_count(0.9), 0);
        assert_eq!(read_count(-0.4), 0);
    }

    #[test]
    fn test_rejects_wrong_value_count() {
        let data = ProblemData::new(10, vec![OrderType::new(2, 5)], vec![Pattern::new(vec![2])])
            .unwrap();
        let built = BuiltModel::Pattern(pattern::build(&data, true));
        let solved = SolvedModel {
            objective: 1.0,
            values: vec![1.0, 0.0],
        };
        assert!(matches!(
            built.extract(&data, &solved),
            Err(CutError::Backend(_))
        ));
    }

    #[test]
    fn test_values_below_tolerance_are_excluded() {
        let data = ProblemData::new(
            10,
            vec![OrderType::new(2, 5), OrderType::new(1, 3)],
            vec![Pattern::new(vec![2, 0]), Pattern::new(vec![0, 3])],
        )
        .unwrap();

        let built = BuiltModel::Pattern(pattern::build(&data, false));
        let solved = SolvedModel {
            objective: 1.000_9,
            values: vec![1.0, 0.000_9],
        };
        let result = built.extract(&data, &solved).unwrap();
        assert_eq!(result.pattern_usage.len(), 1);
        assert!(result.pattern_usage.values().all(|&w| w >= USAGE_TOLERANCE));

        let built = BuiltModel::Direct(direct::build(&data, false));
        let mut values = vec![0.0; built.model().num_vars()];
        if let BuiltModel::Direct(d) = &built {
            values[d.used[0].0] = 1.0;
            values[d.cut_counts[0][0].0] = 2.0;
            values[d.used[1].0] = 0.000_99;
            values[d.cut_counts[1][1].0] = 1.0;
        }
        let solved = SolvedModel {
            objective: 1.000_99,
            values,
        };
        let result = built.extract(&data, &solved).unwrap();
        assert_eq!(result.pattern_usage.len(), 1);
        assert_eq!(result.pattern_usage[&Pattern::new(vec![2, 0])], 1.0);
    }
}
