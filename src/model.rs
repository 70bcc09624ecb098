//! Solver-independent description of a linear / integer program.
//!
//! Builders fill a [`CuttingModel`] and hand it to an
//! [`LpBackend`](crate::backend::LpBackend). The model is never changed after that.

/// Index of a variable in the model it was added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDomain {
    Continuous,
    Integer,
}

impl VarDomain {
    pub fn from_integral(integral: bool) -> Self {
        if integral {
            VarDomain::Integer
        } else {
            VarDomain::Continuous
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub domain: VarDomain,
    pub lower: f64,
    /// `None` means unbounded above.
    pub upper: Option<f64>,
    pub objective: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

impl Relation {
    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Eq => lhs == rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side evaluated at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values[v.0]).sum()
    }
}

/// Minimization program: variables, linear constraints and a linear objective.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingModel {
    pub name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl CuttingModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        domain: VarDomain,
        (lower, upper): (f64, Option<f64>),
        objective: f64,
    ) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            domain,
            lower,
            upper,
            objective,
        });
        id
    }

    /// Adds `terms relation rhs`. Terms with a zero coefficient are dropped.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = (VarId, f64)>,
        relation: Relation,
        rhs: f64,
    ) {
        let terms = terms.into_iter().filter(|&(_, c)| c != 0.0).collect();
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            relation,
            rhs,
        });
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(v, x)| v.objective * x)
            .sum()
    }

    /// Checks bounds and constraints of an assignment within `tol`.
    pub fn is_feasible(&self, values: &[f64], tol: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let in_bounds = self.variables.iter().zip(values).all(|(v, &x)| {
            x >= v.lower - tol && v.upper.is_none_or(|u| x <= u + tol)
        });
        in_bounds
            && self.constraints.iter().all(|c| {
                let lhs = c.lhs(values);
                match c.relation {
                    Relation::Le => lhs <= c.rhs + tol,
                    Relation::Ge => lhs >= c.rhs - tol,
                    Relation::Eq => (lhs - c.rhs).abs() <= tol,
                }
            })
    }
}

/// Values a backend assigned to every variable of a model, plus the objective.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedModel {
    pub objective: f64,
    pub values: Vec<f64>,
}

impl SolvedModel {
    pub fn value(&self, id: VarId) -> f64 {
        self.values[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_var_assigns_sequential_ids() {
        let mut model = CuttingModel::new("m");
        let x = model.add_var("x", VarDomain::Integer, (0.0, Some(1.0)), 1.0);
        let y = model.add_var("y", VarDomain::Continuous, (0.0, None), 0.0);
        assert_eq!(x, VarId(0));
        assert_eq!(y, VarId(1));
        assert_eq!(model.variable(y).name, "y");
        assert_eq!(model.num_vars(), 2);
    }

    #[test]
    fn test_zero_coefficients_dropped() {
        let mut model = CuttingModel::new("m");
        let x = model.add_var("x", VarDomain::Continuous, (0.0, None), 1.0);
        let y = model.add_var("y", VarDomain::Continuous, (0.0, None), 1.0);
        model.add_constraint("c", [(x, 0.0), (y, 2.0)], Relation::Ge, 4.0);
        let c = model.constraint("c").unwrap();
        assert_eq!(c.terms, vec![(y, 2.0)]);
    }

    #[test]
    fn test_is_feasible() {
        let mut model = CuttingModel::new("m");
        let x = model.add_var("x", VarDomain::Continuous, (0.0, Some(1.0)), 1.0);
        let y = model.add_var("y", VarDomain::Continuous, (0.0, None), 1.0);
        model.add_constraint("sum", [(x, 1.0), (y, 1.0)], Relation::Ge, 2.0);

        assert!(model.is_feasible(&[1.0, 1.0], 1e-9));
        assert!(!model.is_feasible(&[1.5, 1.0], 1e-9));
        assert!(!model.is_feasible(&[0.5, 1.0], 1e-9));
        assert!(!model.is_feasible(&[1.0], 1e-9));
        assert_eq!(model.objective_value(&[1.0, 3.0]), 4.0);
    }

    #[test]
    fn test_relation_holds() {
        assert!(Relation::Le.holds(0.0, 0.0));
        assert!(Relation::Ge.holds(0.0, -1.0));
        assert!(!Relation::Ge.holds(0.0, 3.0));
        assert!(Relation::Eq.holds(2.0, 2.0));
    }
}
