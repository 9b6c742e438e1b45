//! Weighted task selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agent::TaskSpec;

use super::error::SchedulerError;

/// Selects one task per scheduling tick, weighted by each task's weight.
///
/// Over many selections the empirical frequency of each task approaches
/// `weight / sum(weights)`. Selection is deterministic under a supplied
/// seed.
#[derive(Debug)]
pub struct TaskSelector {
    tasks: Vec<TaskSpec>,
    cumulative: Vec<u64>,
    total: u64,
    rng: StdRng,
}

impl TaskSelector {
    /// Build a selector seeded from OS entropy.
    pub fn new(tasks: &[TaskSpec]) -> Result<Self, SchedulerError> {
        Self::with_rng(tasks, StdRng::from_os_rng())
    }

    /// Build a selector with a fixed seed for reproducible selection.
    pub fn with_seed(tasks: &[TaskSpec], seed: u64) -> Result<Self, SchedulerError> {
        Self::with_rng(tasks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tasks: &[TaskSpec], rng: StdRng) -> Result<Self, SchedulerError> {
        let mut cumulative = Vec::with_capacity(tasks.len());
        let mut total = 0u64;
        for task in tasks {
            total += u64::from(task.weight);
            cumulative.push(total);
        }
        if total == 0 {
            return Err(SchedulerError::EmptyTaskSet);
        }
        Ok(Self {
            tasks: tasks.to_vec(),
            cumulative,
            total,
            rng,
        })
    }

    /// Select the next task.
    pub fn next(&mut self) -> &TaskSpec {
        let roll = self.rng.random_range(0..self.total);
        let index = self.cumulative.partition_point(|&bound| bound <= roll);
        &self.tasks[index]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn task(name: &str, weight: u32) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            weight,
            description: String::new(),
        }
    }

    #[test]
    fn empty_task_set_is_rejected() {
        let err = TaskSelector::new(&[]).unwrap_err();
        assert!(matches!(err, SchedulerError::EmptyTaskSet));
    }

    #[test]
    fn single_task_is_always_selected() {
        let mut selector = TaskSelector::with_seed(&[task("only", 3)], 7).unwrap();
        for _ in 0..50 {
            assert_eq!(selector.next().name, "only");
        }
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let tasks = [task("a", 2), task("b", 1), task("c", 5)];
        let mut left = TaskSelector::with_seed(&tasks, 42).unwrap();
        let mut right = TaskSelector::with_seed(&tasks, 42).unwrap();
        for _ in 0..200 {
            assert_eq!(left.next().name, right.next().name);
        }
    }

    #[test]
    fn selection_frequency_tracks_weights() {
        let tasks = [task("a", 2), task("b", 1)];
        let mut selector = TaskSelector::with_seed(&tasks, 42).unwrap();

        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..3000 {
            *counts.entry(selector.next().name.clone()).or_default() += 1;
        }

        let a = f64::from(counts["a"]);
        let b = f64::from(counts["b"]);
        // 2:1 weights over 3000 trials; allow 5% deviation on the ratio.
        let ratio = a / b;
        assert!(
            (ratio - 2.0).abs() / 2.0 < 0.05,
            "a={a} b={b} ratio={ratio}"
        );
    }
}
