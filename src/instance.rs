use crate::error::InstanceError;
use crate::item::Item;

/// A validated 0/1 knapsack instance: a finite set of items plus a positive
/// budget, held in the canonical efficiency-descending order the bound
/// function depends on.
///
/// Construction places the items in canonical order; callers needing the
/// original order must keep it themselves.
#[derive(Debug, Clone)]
pub struct Instance {
    items: Vec<Item>,
    budget: f64,
}

impl Instance {
    pub fn new(mut items: Vec<Item>, budget: f64) -> Result<Self, InstanceError> {
        if items.is_empty() {
            return Err(InstanceError::EmptyItems);
        }
        if budget <= 0.0 {
            return Err(InstanceError::NonPositiveBudget(budget));
        }
        for item in &items {
            if item.cost < 0.0 {
                return Err(InstanceError::NegativeCost {
                    id: item.id,
                    cost: item.cost,
                });
            }
            if item.value < 0.0 {
                return Err(InstanceError::NegativeValue {
                    id: item.id,
                    value: item.value,
                });
            }
        }

        // Canonical order: efficiency descending, ties broken by id ascending.
        // The bound function's soundness depends on this ordering.
        items.sort_by(|a, b| {
            b.efficiency()
                .partial_cmp(&a.efficiency())
                .unwrap()
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(Instance { items, budget })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn n(&self) -> usize {
        self.items.len()
    }
}
