pub mod assist;
pub mod calendar;
pub mod config;
pub mod plan;
pub mod scan;
pub mod session;
pub mod theme;

use anyhow::Result;
use colored::Colorize;

use crate::models::WorkoutPlan;
use crate::store::PlanStore;

/// Loads the plan collection, warning once when the stored JSON is
/// unreadable. Both "nothing stored" and "corrupt" read as empty.
pub async fn load_collection(store: &PlanStore) -> Result<Vec<WorkoutPlan>> {
    let snapshot = store.load_plans().await?;
    if snapshot.is_corrupt() {
        println!(
            "{} stored plan collection is unreadable – starting from an empty list",
            "warning:".yellow().bold()
        );
    }
    Ok(snapshot.into_plans())
}

/// Resolves a plan selector: 1-based index from `plan list`, or exact title.
pub fn find_plan(plans: &[WorkoutPlan], selector: &str) -> Option<usize> {
    if let Ok(idx) = selector.parse::<usize>() {
        if idx >= 1 && idx <= plans.len() {
            return Some(idx - 1);
        }
        return None;
    }

    plans.iter().position(|p| p.title == selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample_plan;

    #[test]
    fn selector_resolves_index_then_exact_title() {
        let plans = vec![sample_plan("a", "Day A"), sample_plan("b", "Day B")];

        assert_eq!(find_plan(&plans, "1"), Some(0));
        assert_eq!(find_plan(&plans, "2"), Some(1));
        assert_eq!(find_plan(&plans, "3"), None);
        assert_eq!(find_plan(&plans, "0"), None);
        assert_eq!(find_plan(&plans, "Day B"), Some(1));
        assert_eq!(find_plan(&plans, "day b"), None);
    }
}
