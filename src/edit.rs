use anyhow::Result;
use thiserror::Error;

use crate::models::{Exercise, WorkoutPlan};
use crate::store::PlanStore;

/// Maximum snapshots kept per exercise slot; the oldest is evicted first.
pub const HISTORY_LIMIT: usize = 5;

/// Contract violations by the caller. The CLI checks index bounds and
/// `has_history` before invoking, so surfacing one of these means a bug
/// in the front-end, not user error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("exercise index {index} out of range (plan has {len} exercises)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no edit history for exercise index {index}")]
    NoHistory { index: usize },
}

/// Snapshots the exercise at `index` into an editable draft.
pub fn begin_edit(plan: &WorkoutPlan, index: usize) -> Result<Exercise, EditError> {
    plan.exercises
        .get(index)
        .map(|slot| slot.details.clone())
        .ok_or(EditError::IndexOutOfRange {
            index,
            len: plan.exercises.len(),
        })
}

/// Commits an edited draft: the pre-edit exercise is pushed onto the slot's
/// history stack (evicting past HISTORY_LIMIT), then replaced in place and
/// persisted. This is the only mutation path, so every commit is undoable.
pub async fn commit_edit(
    store: &PlanStore,
    plan: &mut WorkoutPlan,
    index: usize,
    draft: Exercise,
) -> Result<()> {
    let len = plan.exercises.len();
    let slot = plan
        .exercises
        .get(index)
        .ok_or(EditError::IndexOutOfRange { index, len })?;
    let slot_id = slot.id.clone();
    let pre_edit = slot.details.clone();

    let mut stack = store.history(&plan.id, &slot_id).await?;
    stack.push(pre_edit);
    if stack.len() > HISTORY_LIMIT {
        let overflow = stack.len() - HISTORY_LIMIT;
        stack.drain(..overflow);
    }
    store.put_history(&plan.id, &slot_id, &stack).await?;

    plan.exercises[index].details = draft;
    store.upsert(plan).await?;
    Ok(())
}

/// Pops the most recent snapshot back into place. One-directional: the
/// overwritten value is discarded, there is no redo.
pub async fn undo(store: &PlanStore, plan: &mut WorkoutPlan, index: usize) -> Result<()> {
    let len = plan.exercises.len();
    let slot_id = plan
        .exercises
        .get(index)
        .map(|slot| slot.id.clone())
        .ok_or(EditError::IndexOutOfRange { index, len })?;

    let mut stack = store.history(&plan.id, &slot_id).await?;
    let previous = stack.pop().ok_or(EditError::NoHistory { index })?;
    store.put_history(&plan.id, &slot_id, &stack).await?;

    plan.exercises[index].details = previous;
    store.upsert(plan).await?;
    Ok(())
}

/// Non-mutating predicate backing the undo affordance in the CLI.
pub async fn has_history(store: &PlanStore, plan_id: &str, exercise_id: &str) -> Result<bool> {
    Ok(!store.history(plan_id, exercise_id).await?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{open_store, sample_plan};

    fn renamed(base: &Exercise, name: &str) -> Exercise {
        Exercise {
            name: name.to_string(),
            ..base.clone()
        }
    }

    #[tokio::test]
    async fn commit_then_undo_restores_pre_edit_value() {
        let (_dir, store) = open_store().await;
        let mut plan = sample_plan("a", "Day A");
        store.replace_all(std::slice::from_ref(&plan)).await.unwrap();

        let original = plan.exercises[0].details.clone();
        let exercise_id = plan.exercises[0].id.clone();
        let depth_before = store.history("a", &exercise_id).await.unwrap().len();

        let draft = renamed(&original, "Paused Bench Press");
        commit_edit(&store, &mut plan, 0, draft.clone()).await.unwrap();
        assert_eq!(plan.exercises[0].details, draft);
        assert!(has_history(&store, "a", &exercise_id).await.unwrap());

        undo(&store, &mut plan, 0).await.unwrap();
        assert_eq!(plan.exercises[0].details, original);
        assert_eq!(
            store.history("a", &exercise_id).await.unwrap().len(),
            depth_before
        );

        // The persisted plan matches the in-memory one after undo.
        let stored = store.load_plans().await.unwrap().into_plans();
        assert_eq!(stored[0].exercises[0].details, original);
    }

    #[tokio::test]
    async fn history_is_bounded_to_five_with_fifo_eviction() {
        let (_dir, store) = open_store().await;
        let mut plan = sample_plan("a", "Day A");
        store.replace_all(std::slice::from_ref(&plan)).await.unwrap();
        let exercise_id = plan.exercises[0].id.clone();

        // Seven commits: v0..v6 go through the slot, snapshots are the
        // pre-edit values v0..v5, and only v1..v5 may survive.
        for i in 1..=6 {
            let base = plan.exercises[0].details.clone();
            let draft = renamed(&base, &format!("v{i}"));
            commit_edit(&store, &mut plan, 0, draft).await.unwrap();
        }

        let stack = store.history("a", &exercise_id).await.unwrap();
        assert_eq!(stack.len(), HISTORY_LIMIT);
        let names: Vec<&str> = stack.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["v1", "v2", "v3", "v4", "v5"]);
    }

    #[tokio::test]
    async fn undo_is_destructive_of_forward_state() {
        let (_dir, store) = open_store().await;
        let mut plan = sample_plan("a", "Day A");
        store.replace_all(std::slice::from_ref(&plan)).await.unwrap();

        let original = plan.exercises[0].details.clone();
        commit_edit(&store, &mut plan, 0, renamed(&original, "edited")).await.unwrap();
        undo(&store, &mut plan, 0).await.unwrap();

        // No redo: a second undo finds nothing to pop.
        let err = undo(&store, &mut plan, 0).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<EditError>(),
            Some(&EditError::NoHistory { index: 0 })
        );
        assert_eq!(plan.exercises[0].details, original);
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected() {
        let (_dir, store) = open_store().await;
        let mut plan = sample_plan("a", "Day A");

        assert_eq!(
            begin_edit(&plan, 7),
            Err(EditError::IndexOutOfRange { index: 7, len: 2 })
        );

        let draft = plan.exercises[0].details.clone();
        let err = commit_edit(&store, &mut plan, 7, draft).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<EditError>(),
            Some(&EditError::IndexOutOfRange { index: 7, len: 2 })
        );
    }

    #[tokio::test]
    async fn histories_follow_the_slot_id_not_the_position() {
        let (_dir, store) = open_store().await;
        let mut plan = sample_plan("a", "Day A");
        store.replace_all(std::slice::from_ref(&plan)).await.unwrap();

        let first = plan.exercises[0].details.clone();
        commit_edit(&store, &mut plan, 0, renamed(&first, "edited")).await.unwrap();

        // Swap the two slots; the history stays attached to the slot id.
        plan.exercises.swap(0, 1);
        store.upsert(&plan).await.unwrap();

        undo(&store, &mut plan, 1).await.unwrap();
        assert_eq!(plan.exercises[1].details, first);
        assert!(!has_history(&store, "a", &plan.exercises[1].id).await.unwrap());
    }
}
