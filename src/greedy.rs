use crate::instance::Instance;
use crate::solver::{SolveOutcome, SolveResult, Solution};

/// Deterministic heuristic baseline: walk items in the canonical
/// efficiency-descending order, including each item iff it still fits the
/// remaining budget. 0/1 only; no fractional inclusion, regardless of what
/// the original's comments once suggested.
///
/// Not guaranteed optimal; shipped purely as a comparison point for
/// [`crate::solver::solve`].
pub fn greedy(instance: &Instance) -> SolveResult {
    let mut selected_ids = Vec::new();
    let mut total_cost = 0.0;
    let mut total_value = 0.0;

    for item in instance.items() {
        if total_cost + item.cost <= instance.budget() {
            selected_ids.push(item.id);
            total_cost += item.cost;
            total_value += item.value;
        }
    }

    let solution = Solution {
        n_selected: selected_ids.len(),
        budget_used_fraction: total_cost / instance.budget(),
        total_cost,
        total_value,
        selected_ids,
    };

    SolveResult {
        outcome: SolveOutcome::Heuristic(solution),
        metrics: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    #[test]
    fn never_exceeds_budget() {
        let items = vec![
            Item::new(1, "A", 6.0, 10.0, "Test"),
            Item::new(2, "B", 5.0, 8.0, "Test"),
            Item::new(3, "C", 5.0, 8.0, "Test"),
        ];
        let instance = Instance::new(items, 10.0).unwrap();
        let result = greedy(&instance);

        match result.outcome {
            SolveOutcome::Heuristic(s) => assert!(s.total_cost <= instance.budget()),
            _ => panic!("expected Heuristic"),
        }
    }
}
