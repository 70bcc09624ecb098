use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CutError;

/// One ordered width together with how many pieces of it are demanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderType {
    pub quantity: u32,
    pub width: u32,
}

impl OrderType {
    pub fn new(quantity: u32, width: u32) -> Self {
        Self { quantity, width }
    }

    /// Total width this order type occupies across all demanded pieces.
    pub fn demanded_width(&self) -> u64 {
        self.quantity as u64 * self.width as u64
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.quantity, self.width)
    }
}

/// How one raw roll is cut: entry `j` is the number of pieces of order type `j`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(pub Vec<u32>);

impl Pattern {
    pub fn new(counts: Vec<u32>) -> Self {
        Self(counts)
    }

    pub fn counts(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Width consumed on the roll when cutting this pattern.
    pub fn width(&self, order_types: &[OrderType]) -> u64 {
        self.0
            .iter()
            .zip(order_types)
            .map(|(&n, o)| n as u64 * o.width as u64)
            .sum()
    }
}

impl From<Vec<u32>> for Pattern {
    fn from(counts: Vec<u32>) -> Self {
        Self(counts)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{n}")?;
        }
        write!(f, "]")
    }
}

/// Immutable cutting-stock instance. Always valid once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProblemData")]
pub struct ProblemData {
    raw_width: u32,
    order_types: Vec<OrderType>,
    patterns: Vec<Pattern>,
}

#[derive(Deserialize)]
struct RawProblemData {
    raw_width: u32,
    order_types: Vec<OrderType>,
    #[serde(default)]
    patterns: Vec<Pattern>,
}

impl TryFrom<RawProblemData> for ProblemData {
    type Error = CutError;

    fn try_from(raw: RawProblemData) -> Result<Self, Self::Error> {
        ProblemData::new(raw.raw_width, raw.order_types, raw.patterns)
    }
}

impl ProblemData {
    pub fn new(
        raw_width: u32,
        order_types: Vec<OrderType>,
        patterns: Vec<Pattern>,
    ) -> Result<Self, CutError> {
        if raw_width == 0 {
            return Err(CutError::InvalidInput(
                "raw width must be non-zero".to_string(),
            ));
        }
        for (t, order) in order_types.iter().enumerate() {
            if order.width == 0 {
                return Err(CutError::InvalidInput(format!(
                    "order type {t} has zero width"
                )));
            }
            if order.width > raw_width {
                return Err(CutError::InvalidInput(format!(
                    "order type {t} width {} exceeds raw width {raw_width}",
                    order.width
                )));
            }
        }
        for (p, pattern) in patterns.iter().enumerate() {
            if pattern.len() != order_types.len() {
                return Err(CutError::InvalidInput(format!(
                    "pattern {p} has {} entries, expected {}",
                    pattern.len(),
                    order_types.len()
                )));
            }
            let width = pattern.width(&order_types);
            if width > raw_width as u64 {
                return Err(CutError::InvalidInput(format!(
                    "pattern {p} {pattern} needs width {width}, raw width is {raw_width}"
                )));
            }
        }
        Ok(Self {
            raw_width,
            order_types,
            patterns,
        })
    }

    /// The instance the command line runs when no data file is given.
    pub fn sample() -> Self {
        let order_types = [(9, 3), (79, 5), (90, 6), (27, 9)]
            .into_iter()
            .map(|(quantity, width)| OrderType::new(quantity, width))
            .collect();
        let patterns = [
            [0, 0, 0, 1],
            [0, 0, 1, 0],
            [1, 0, 1, 0],
            [0, 1, 0, 0],
            [0, 2, 0, 0],
            [1, 1, 0, 0],
            [1, 0, 0, 0],
            [2, 0, 0, 0],
            [3, 0, 0, 0],
        ]
        .into_iter()
        .map(|p| Pattern::new(p.to_vec()))
        .collect();
        Self {
            raw_width: 10,
            order_types,
            patterns,
        }
    }

    pub fn raw_width(&self) -> u32 {
        self.raw_width
    }

    pub fn order_types(&self) -> &[OrderType] {
        &self.order_types
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Number of pieces demanded in total; also the most rolls a plan could ever need.
    pub fn total_demand(&self) -> usize {
        self.order_types.iter().map(|o| o.quantity as usize).sum()
    }

    /// Total demanded width divided by the roll width, rounded up.
    ///
    /// No cutting plan can use fewer rolls than this.
    pub fn lower_bound(&self) -> u64 {
        let demanded: u64 = self.order_types.iter().map(|o| o.demanded_width()).sum();
        demanded.div_ceil(self.raw_width as u64)
    }

    pub fn fits(&self, pattern: &Pattern) -> bool {
        pattern.len() == self.order_types.len()
            && pattern.width(&self.order_types) <= self.raw_width as u64
    }
}

/// Objective value plus how many rolls were cut with each pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionResult {
    pub objective: f64,
    pub pattern_usage: BTreeMap<Pattern, f64>,
}

impl SolutionResult {
    /// Rolls accounted for by the usage map; equals the objective for an exact solve.
    pub fn roll_count(&self) -> f64 {
        self.pattern_usage.values().sum()
    }

    pub fn usage_entries(&self) -> Vec<PatternUsage> {
        self.pattern_usage
            .iter()
            .map(|(pattern, &count)| PatternUsage {
                pattern: pattern.clone(),
                count,
            })
            .collect()
    }
}

/// Serializable form of one usage entry; patterns cannot be JSON object keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternUsage {
    pub pattern: Pattern,
    pub count: f64,
}
