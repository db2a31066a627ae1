use serde::{Deserialize, Serialize};

/// A single candidate for the knapsack: an HR retention project with a cost
/// and an expected impact on attrition.
///
/// `efficiency` is computed once at construction and never mutated; it is
/// the sort key the solver's bound relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub cost: f64,
    pub value: f64,
    pub category: String,
    efficiency: f64,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>, cost: f64, value: f64, category: impl Into<String>) -> Self {
        let efficiency = if cost > 0.0 { value / cost } else { 0.0 };
        Item {
            id,
            name: name.into(),
            cost,
            value,
            category: category.into(),
            efficiency,
        }
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }
}
