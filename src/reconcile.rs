use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{DraftRoutine, ExtractedRoutine, PlanExercise, WorkoutPlan};

/// Which draft field a review edit targets.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Name(String),
    Date(NaiveDate),
}

/// Wraps freshly extracted routines as editable drafts: temporary id,
/// scheduled for today. Pure, no side effects.
pub fn to_drafts(extracted: Vec<ExtractedRoutine>, today: NaiveDate) -> Vec<DraftRoutine> {
    extracted
        .into_iter()
        .map(|r| DraftRoutine {
            id: Uuid::new_v4().to_string(),
            routine_name: r.routine_name,
            selected_date: today,
            exercises: r.exercises,
        })
        .collect()
}

/// Applies a rename or re-date to the matching draft.
/// Silently leaves the drafts unchanged when `id` is unknown.
pub fn update_draft(drafts: &mut [DraftRoutine], id: &str, field: DraftField) {
    let Some(draft) = drafts.iter_mut().find(|d| d.id == id) else {
        return;
    };

    match field {
        DraftField::Name(name) => draft.routine_name = name,
        DraftField::Date(date) => draft.selected_date = date,
    }
}

/// Turns confirmed drafts into permanent plans: fresh plan and exercise
/// ids, `date_created` pinned to noon of the selected day (so the
/// serialized date can never shift across timezones), exercises copied
/// verbatim. The caller commits the whole batch or discards it.
pub fn finalize(drafts: &[DraftRoutine]) -> Vec<WorkoutPlan> {
    drafts
        .iter()
        .map(|draft| WorkoutPlan {
            id: Uuid::new_v4().to_string(),
            title: draft.routine_name.clone(),
            date_created: draft
                .selected_date
                .and_hms_opt(12, 0, 0)
                .expect("noon is always a valid time"),
            last_played: None,
            exercises: draft
                .exercises
                .iter()
                .cloned()
                .map(|details| PlanExercise {
                    id: Uuid::new_v4().to_string(),
                    details,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;
    use std::collections::HashSet;

    fn exercise(name: &str) -> Exercise {
        Exercise {
            name: name.to_string(),
            sets: 3,
            reps: "8-12".into(),
            muscle_group: "chest".into(),
            notes: None,
            rest_time: None,
        }
    }

    fn extracted(name: &str, exercises: Vec<Exercise>) -> ExtractedRoutine {
        ExtractedRoutine {
            routine_name: name.to_string(),
            exercises,
        }
    }

    #[test]
    fn drafts_get_fresh_ids_and_todays_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let drafts = to_drafts(
            vec![extracted("Day A", vec![exercise("Bench")]), extracted("Day B", vec![])],
            today,
        );

        assert_eq!(drafts.len(), 2);
        assert_ne!(drafts[0].id, drafts[1].id);
        assert!(drafts.iter().all(|d| d.selected_date == today));
        assert_eq!(drafts[0].routine_name, "Day A");
    }

    #[test]
    fn update_draft_targets_by_id_and_ignores_unknown() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut drafts = to_drafts(vec![extracted("Day A", vec![])], today);
        let id = drafts[0].id.clone();

        update_draft(&mut drafts, &id, DraftField::Name("Push Day".into()));
        assert_eq!(drafts[0].routine_name, "Push Day");

        let other = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        update_draft(&mut drafts, &id, DraftField::Date(other));
        assert_eq!(drafts[0].selected_date, other);

        let before = drafts.clone();
        update_draft(&mut drafts, "no-such-id", DraftField::Name("X".into()));
        assert_eq!(drafts, before);
    }

    #[test]
    fn finalize_pins_noon_and_copies_exercises_verbatim() {
        let e1 = exercise("Bench");
        let e2 = exercise("Fly");
        let e3 = exercise("Row");

        let drafts = vec![
            DraftRoutine {
                id: "tmp-a".into(),
                routine_name: "Day A".into(),
                selected_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                exercises: vec![e1.clone(), e2.clone()],
            },
            DraftRoutine {
                id: "tmp-b".into(),
                routine_name: "Day B".into(),
                selected_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                exercises: vec![e3.clone()],
            },
        ];

        let plans = finalize(&drafts);
        assert_eq!(plans.len(), 2);

        assert_eq!(plans[0].title, "Day A");
        assert_eq!(
            plans[0].date_created.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2024-06-01T12:00:00"
        );
        assert_eq!(
            plans[1].date_created.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2024-06-02T12:00:00"
        );

        // serde carries the same offset-free form.
        let json = serde_json::to_value(&plans[0]).unwrap();
        assert_eq!(json["dateCreated"], "2024-06-01T12:00:00");

        let details: Vec<&Exercise> = plans[0].exercises.iter().map(|s| &s.details).collect();
        assert_eq!(details, vec![&e1, &e2]);
        assert_eq!(plans[1].exercises[0].details, e3);

        // Fresh, distinct identifiers all around; temporary ids are gone.
        let mut ids: HashSet<&str> = HashSet::new();
        for plan in &plans {
            assert!(ids.insert(&plan.id));
            assert!(plan.id != "tmp-a" && plan.id != "tmp-b");
            for slot in &plan.exercises {
                assert!(ids.insert(&slot.id));
            }
            assert_eq!(plan.last_played, None);
        }
    }
}
