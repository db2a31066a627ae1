use std::time::{Duration, Instant};

use serde::Serialize;

use crate::bound::bound;
use crate::frontier::Frontier;
use crate::instance::Instance;
use crate::node::SearchNode;

/// Tolerance used when comparing a node's bound against the incumbent
/// value, to avoid spurious non-pruning on exact ties caused by floating
/// point rounding.
const EPS: f64 = 1e-9;

/// A caller-supplied wall-clock budget for `solve`. If it elapses before
/// the frontier empties, `solve` returns the current incumbent tagged
/// `Timeout` instead of continuing or returning a partial/invalid result.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        Deadline {
            expires_at: Instant::now() + duration,
        }
    }

    fn has_passed(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// The selected subset and its totals, independent of how the result was
/// obtained (exact search or greedy heuristic).
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub selected_ids: Vec<u64>,
    pub total_cost: f64,
    pub total_value: f64,
    pub budget_used_fraction: f64,
    pub n_selected: usize,
}

impl Solution {
    fn from_node(instance: &Instance, node: &SearchNode) -> Self {
        let mut selected_ids: Vec<u64> = node.included.clone();
        // Canonical order, recommended by the reporting contract.
        let order: std::collections::HashMap<u64, usize> = instance
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| (item.id, idx))
            .collect();
        selected_ids.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));

        Solution {
            n_selected: selected_ids.len(),
            budget_used_fraction: node.total_cost / instance.budget(),
            total_cost: node.total_cost,
            total_value: node.total_value,
            selected_ids,
        }
    }
}

/// Counters describing the shape of the search that produced a result.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Metrics {
    pub nodes_expanded: u64,
    pub pruned_infeasible: u64,
    pub pruned_bound: u64,
    pub pruned_total: u64,
    pub max_depth: usize,
    pub elapsed_seconds: f64,
    pub pruning_efficiency_fraction: f64,
}

impl Metrics {
    fn finish(
        nodes_expanded: u64,
        pruned_infeasible: u64,
        pruned_bound: u64,
        max_depth: usize,
        elapsed: Duration,
    ) -> Self {
        let pruned_total = pruned_infeasible + pruned_bound;
        let denom = pruned_total + nodes_expanded;
        let pruning_efficiency_fraction = if denom == 0 {
            0.0
        } else {
            pruned_total as f64 / denom as f64
        };

        Metrics {
            nodes_expanded,
            pruned_infeasible,
            pruned_bound,
            pruned_total,
            max_depth,
            elapsed_seconds: elapsed.as_secs_f64(),
            pruning_efficiency_fraction,
        }
    }
}

/// The tagged outcome of a `solve` call. `NoFeasibleSolution` and `Timeout`
/// are returned, never raised as exceptions; construction-time validation
/// on `Instance` is the only hard failure in this crate.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolveOutcome {
    Optimal(Solution),
    NoFeasibleSolution,
    Timeout { partial: Option<Solution> },
    /// Produced by [`crate::greedy::greedy`]; not guaranteed optimal.
    Heuristic(Solution),
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveResult {
    #[serde(flatten)]
    pub outcome: SolveOutcome,
    pub metrics: Option<Metrics>,
}

/// Pruning predicate shared by both the push-time fast path and the
/// mandatory pop-time re-check.
fn should_prune(node: &SearchNode, budget: f64, incumbent_value: f64) -> PruneReason {
    if node.total_cost > budget {
        return PruneReason::Infeasible;
    }
    if node.bound <= incumbent_value + EPS {
        return PruneReason::Bound;
    }
    PruneReason::None
}

enum PruneReason {
    None,
    Infeasible,
    Bound,
}

/// Best-first branch-and-bound search for the exact 0/1 knapsack optimum.
///
/// Pops the live node with the largest bound, re-checks both pruning
/// predicates (the incumbent may have improved while the node waited in the
/// frontier; this re-check is what makes bound pruning effective), and
/// either discards it, accepts it as a new incumbent, or expands it into an
/// include/exclude child pair. Children are generated lazily at expansion
/// time so memory tracks the live frontier, not the whole tree.
pub fn solve(instance: &Instance, deadline: Option<Deadline>) -> SolveResult {
    let span = tracing::info_span!("solve", n = instance.n(), budget = instance.budget());
    let _enter = span.enter();

    let start = Instant::now();

    let mut root = SearchNode::root();
    root.bound = bound(instance, &root);

    let mut frontier = Frontier::new();
    frontier.push(root);

    let mut incumbent: Option<SearchNode> = None;
    let mut incumbent_value = 0.0f64;

    let mut nodes_expanded = 0u64;
    let mut pruned_infeasible = 0u64;
    let mut pruned_bound = 0u64;
    let mut max_depth = 0usize;

    while let Some(node) = frontier.pop() {
        if let Some(dl) = deadline {
            if dl.has_passed() {
                let metrics = Metrics::finish(
                    nodes_expanded,
                    pruned_infeasible,
                    pruned_bound,
                    max_depth,
                    start.elapsed(),
                );
                tracing::warn!(nodes_expanded, "solve timed out");
                return SolveResult {
                    outcome: SolveOutcome::Timeout {
                        partial: incumbent.as_ref().map(|n| Solution::from_node(instance, n)),
                    },
                    metrics: Some(metrics),
                };
            }
        }

        max_depth = max_depth.max(node.level);

        match should_prune(&node, instance.budget(), incumbent_value) {
            PruneReason::Infeasible => {
                pruned_infeasible += 1;
                continue;
            }
            PruneReason::Bound => {
                pruned_bound += 1;
                continue;
            }
            PruneReason::None => {}
        }

        if node.level == instance.n() {
            if node.total_value > incumbent_value {
                incumbent_value = node.total_value;
                tracing::debug!(incumbent_value, "new incumbent");
                incumbent = Some(node);
            }
            continue;
        }

        nodes_expanded += 1;
        let item = &instance.items()[node.level];

        // Include child, pushed before exclude per the recommended
        // deterministic expansion order.
        let mut include = SearchNode {
            level: node.level + 1,
            included: node.included.clone(),
            total_cost: node.total_cost + item.cost,
            total_value: node.total_value + item.value,
            bound: 0.0,
        };
        include.included.push(item.id);
        include.bound = bound(instance, &include);
        if let PruneReason::None = should_prune(&include, instance.budget(), incumbent_value) {
            frontier.push(include);
        }

        let mut exclude = SearchNode {
            level: node.level + 1,
            included: node.included,
            total_cost: node.total_cost,
            total_value: node.total_value,
            bound: 0.0,
        };
        exclude.bound = bound(instance, &exclude);
        if let PruneReason::None = should_prune(&exclude, instance.budget(), incumbent_value) {
            frontier.push(exclude);
        }
    }

    let metrics = Metrics::finish(
        nodes_expanded,
        pruned_infeasible,
        pruned_bound,
        max_depth,
        start.elapsed(),
    );

    let outcome = match incumbent {
        Some(node) => SolveOutcome::Optimal(Solution::from_node(instance, &node)),
        None => SolveOutcome::NoFeasibleSolution,
    };

    SolveResult {
        outcome,
        metrics: Some(metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;

    fn instance_of(pairs: &[(u64, f64, f64)], budget: f64) -> Instance {
        let items = pairs
            .iter()
            .map(|&(id, cost, value)| Item::new(id, format!("P{id}"), cost, value, "Test"))
            .collect();
        Instance::new(items, budget).unwrap()
    }

    fn optimal_solution(result: &SolveResult) -> &Solution {
        match &result.outcome {
            SolveOutcome::Optimal(s) => s,
            other => panic!("expected Optimal, got {other:?}"),
        }
    }

    #[test]
    fn scenario_a_simple_three_item_tight_budget() {
        let instance = instance_of(&[(1, 50.0, 60.0), (2, 30.0, 40.0), (3, 20.0, 25.0)], 100.0);
        let result = solve(&instance, None);
        let solution = optimal_solution(&result);

        let mut ids = solution.selected_ids.clone();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(solution.total_cost, 100.0);
        assert_eq!(solution.total_value, 125.0);
        assert_eq!(solution.n_selected, 3);
    }

    #[test]
    fn scenario_b_all_items_fit() {
        let instance = instance_of(&[(1, 10.0, 5.0), (2, 20.0, 10.0), (3, 30.0, 15.0)], 100.0);
        let result = solve(&instance, None);
        let solution = optimal_solution(&result);

        assert_eq!(solution.n_selected, 3);
        assert_eq!(solution.total_cost, 60.0);
        assert_eq!(solution.total_value, 30.0);
    }

    #[test]
    fn scenario_c_nothing_fits() {
        let instance = instance_of(&[(1, 100.0, 50.0), (2, 150.0, 75.0)], 50.0);
        let result = solve(&instance, None);
        assert!(matches!(result.outcome, SolveOutcome::NoFeasibleSolution));
    }

    #[test]
    fn scenario_d_single_item() {
        let instance = instance_of(&[(1, 50.0, 30.0)], 100.0);
        let result = solve(&instance, None);
        let solution = optimal_solution(&result);

        assert_eq!(solution.selected_ids, vec![1]);
        assert_eq!(solution.total_value, 30.0);
    }

    #[test]
    fn scenario_e_greedy_suboptimal() {
        use crate::greedy::greedy;

        let instance = instance_of(&[(1, 6.0, 10.0), (2, 5.0, 8.0), (3, 5.0, 8.0)], 10.0);
        let result = solve(&instance, None);
        let solution = optimal_solution(&result);
        assert_eq!(solution.total_value, 16.0);

        let greedy_result = greedy(&instance);
        match greedy_result.outcome {
            SolveOutcome::Heuristic(s) => assert_eq!(s.total_value, 10.0),
            other => panic!("expected Heuristic, got {other:?}"),
        }
    }

    #[test]
    fn feasibility_contract() {
        let instance = instance_of(&[(1, 50.0, 60.0), (2, 30.0, 40.0), (3, 20.0, 25.0)], 100.0);
        let result = solve(&instance, None);
        let solution = optimal_solution(&result);

        assert!(solution.total_cost <= instance.budget());

        let sum: f64 = solution
            .selected_ids
            .iter()
            .map(|id| instance.items().iter().find(|i| i.id == *id).unwrap().value)
            .sum();
        assert!((sum - solution.total_value).abs() < 1e-2);
    }

    #[test]
    fn determinism_across_repeated_calls() {
        let instance = instance_of(
            &[(1, 50.0, 60.0), (2, 30.0, 40.0), (3, 20.0, 25.0), (4, 15.0, 18.0)],
            90.0,
        );

        let r1 = solve(&instance, None);
        let r2 = solve(&instance, None);
        let r3 = solve(&instance, None);

        let m1 = r1.metrics.unwrap();
        let m2 = r2.metrics.unwrap();
        let m3 = r3.metrics.unwrap();
        assert_eq!(m1.nodes_expanded, m2.nodes_expanded);
        assert_eq!(m1.nodes_expanded, m3.nodes_expanded);
        assert_eq!(m1.pruned_total, m2.pruned_total);

        let s1 = optimal_solution(&r1);
        let s2 = optimal_solution(&r2);
        assert_eq!(s1.selected_ids, s2.selected_ids);
        assert_eq!(s1.total_value, s2.total_value);
    }

    #[test]
    fn monotone_in_budget() {
        let items = vec![(1, 50.0, 60.0), (2, 30.0, 40.0), (3, 20.0, 25.0), (4, 40.0, 35.0)];
        let low = instance_of(&items, 60.0);
        let high = instance_of(&items, 140.0);

        let low_value = optimal_solution(&solve(&low, None)).total_value;
        let high_value = optimal_solution(&solve(&high, None)).total_value;
        assert!(low_value <= high_value);
    }
}
