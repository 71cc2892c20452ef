use anyhow::Result;
use chrono::{DateTime, Local};

use crate::db::DB;
use crate::models::{Exercise, ThemeConfig, WorkoutPlan};

const KEY_WORKOUTS: &str = "workouts";
const KEY_THEME: &str = "theme";

fn history_key(plan_id: &str, exercise_id: &str) -> String {
    format!("history:{}:{}", plan_id, exercise_id)
}

/// Result of loading the plan collection. "Nothing stored yet" and
/// "stored but unreadable" both behave as an empty collection, but the
/// caller can tell them apart and warn on the corrupt case.
#[derive(Debug, Clone, PartialEq)]
pub enum PlansSnapshot {
    Loaded(Vec<WorkoutPlan>),
    Missing,
    Corrupt,
}

impl PlansSnapshot {
    pub fn into_plans(self) -> Vec<WorkoutPlan> {
        match self {
            PlansSnapshot::Loaded(plans) => plans,
            PlansSnapshot::Missing | PlansSnapshot::Corrupt => Vec::new(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, PlansSnapshot::Corrupt)
    }
}

/// Owns the canonical plan collection and the ancillary JSON documents
/// (theme, per-exercise edit histories). Every mutation is a full
/// read-modify-write of the affected document in a single statement, so a
/// partial write can never be observed.
pub struct PlanStore {
    pool: DB,
}

impl PlanStore {
    pub fn new(pool: DB) -> Self {
        Self { pool }
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(v,)| v))
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load_plans(&self) -> Result<PlansSnapshot> {
        let raw = match self.get_raw(KEY_WORKOUTS).await? {
            Some(raw) => raw,
            None => return Ok(PlansSnapshot::Missing),
        };

        match serde_json::from_str::<Vec<WorkoutPlan>>(&raw) {
            Ok(plans) => Ok(PlansSnapshot::Loaded(plans)),
            Err(_) => Ok(PlansSnapshot::Corrupt),
        }
    }

    /// Overwrites the whole persisted collection.
    pub async fn replace_all(&self, plans: &[WorkoutPlan]) -> Result<()> {
        let raw = serde_json::to_string(plans)?;
        self.set_raw(KEY_WORKOUTS, &raw).await
    }

    /// Replaces the plan with a matching id, preserving its position.
    /// Returns false (and writes nothing) when the id is unknown.
    pub async fn upsert(&self, plan: &WorkoutPlan) -> Result<bool> {
        let mut plans = self.load_plans().await?.into_plans();
        let Some(slot) = plans.iter_mut().find(|p| p.id == plan.id) else {
            return Ok(false);
        };

        *slot = plan.clone();
        self.replace_all(&plans).await?;
        Ok(true)
    }

    /// Deletes a plan by id, along with its edit-history stacks.
    /// Returns false when the id is unknown.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let mut plans = self.load_plans().await?.into_plans();
        let before = plans.len();
        plans.retain(|p| p.id != id);
        if plans.len() == before {
            return Ok(false);
        }

        self.replace_all(&plans).await?;

        sqlx::query("DELETE FROM kv_store WHERE key LIKE ?")
            .bind(format!("history:{}:%", id))
            .execute(&self.pool)
            .await?;

        Ok(true)
    }

    /// Records a completed session. The only writer of `last_played`.
    pub async fn touch_last_played(&self, id: &str, when: DateTime<Local>) -> Result<bool> {
        let mut plans = self.load_plans().await?.into_plans();
        let Some(plan) = plans.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };

        plan.last_played = Some(when);
        self.replace_all(&plans).await?;
        Ok(true)
    }

    /// Edit-history stack for one exercise slot, most recent snapshot last.
    /// Absent or malformed stacks read as empty.
    pub async fn history(&self, plan_id: &str, exercise_id: &str) -> Result<Vec<Exercise>> {
        let raw = self.get_raw(&history_key(plan_id, exercise_id)).await?;
        Ok(raw
            .and_then(|r| serde_json::from_str(&r).ok())
            .unwrap_or_default())
    }

    pub async fn put_history(
        &self,
        plan_id: &str,
        exercise_id: &str,
        stack: &[Exercise],
    ) -> Result<()> {
        let raw = serde_json::to_string(stack)?;
        self.set_raw(&history_key(plan_id, exercise_id), &raw).await
    }

    /// Theme config; absent or malformed reads as the default.
    pub async fn theme(&self) -> Result<ThemeConfig> {
        let raw = self.get_raw(KEY_THEME).await?;
        Ok(raw
            .and_then(|r| serde_json::from_str(&r).ok())
            .unwrap_or_default())
    }

    pub async fn put_theme(&self, theme: &ThemeConfig) -> Result<()> {
        let raw = serde_json::to_string(theme)?;
        self.set_raw(KEY_THEME, &raw).await
    }

    #[cfg(test)]
    async fn set_raw_for_test(&self, key: &str, value: &str) -> Result<()> {
        self.set_raw(key, value).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db;
    use crate::models::PlanExercise;
    use chrono::NaiveDate;

    pub async fn open_store() -> (tempfile::TempDir, PlanStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = db::open(path.to_str().unwrap()).await.unwrap();
        (dir, PlanStore::new(pool))
    }

    pub fn sample_plan(id: &str, title: &str) -> WorkoutPlan {
        WorkoutPlan {
            id: id.to_string(),
            title: title.to_string(),
            date_created: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            last_played: None,
            exercises: vec![
                PlanExercise {
                    id: format!("{id}-ex0"),
                    details: Exercise {
                        name: "Bench Press".into(),
                        sets: 4,
                        reps: "8-10".into(),
                        muscle_group: "chest".into(),
                        notes: None,
                        rest_time: Some(90),
                    },
                },
                PlanExercise {
                    id: format!("{id}-ex1"),
                    details: Exercise {
                        name: "Incline Dumbbell Press".into(),
                        sets: 3,
                        reps: "10-12".into(),
                        muscle_group: "chest".into(),
                        notes: Some("slow negatives".into()),
                        rest_time: None,
                    },
                },
            ],
        }
    }

    #[tokio::test]
    async fn empty_store_reads_as_missing() {
        let (_dir, store) = open_store().await;
        assert_eq!(store.load_plans().await.unwrap(), PlansSnapshot::Missing);
        assert!(store.load_plans().await.unwrap().into_plans().is_empty());
    }

    #[tokio::test]
    async fn corrupt_collection_is_flagged_but_reads_empty() {
        let (_dir, store) = open_store().await;
        store.set_raw_for_test("workouts", "{not json").await.unwrap();

        let snapshot = store.load_plans().await.unwrap();
        assert!(snapshot.is_corrupt());
        assert!(snapshot.into_plans().is_empty());
    }

    #[tokio::test]
    async fn replace_all_round_trips() {
        let (_dir, store) = open_store().await;
        let plans = vec![sample_plan("a", "Day A"), sample_plan("b", "Day B")];
        store.replace_all(&plans).await.unwrap();

        assert_eq!(store.load_plans().await.unwrap().into_plans(), plans);
    }

    #[tokio::test]
    async fn upsert_preserves_position_and_ignores_unknown_ids() {
        let (_dir, store) = open_store().await;
        let plans = vec![sample_plan("a", "Day A"), sample_plan("b", "Day B")];
        store.replace_all(&plans).await.unwrap();

        let mut updated = sample_plan("b", "Day B (deload)");
        updated.exercises.truncate(1);
        assert!(store.upsert(&updated).await.unwrap());

        let stored = store.load_plans().await.unwrap().into_plans();
        assert_eq!(stored[0].id, "a");
        assert_eq!(stored[1].title, "Day B (deload)");

        assert!(!store.upsert(&sample_plan("ghost", "Ghost")).await.unwrap());
        assert_eq!(store.load_plans().await.unwrap().into_plans().len(), 2);
    }

    #[tokio::test]
    async fn remove_drops_plan_and_its_history() {
        let (_dir, store) = open_store().await;
        let plans = vec![sample_plan("a", "Day A"), sample_plan("b", "Day B")];
        store.replace_all(&plans).await.unwrap();
        store
            .put_history("a", "a-ex0", &[plans[0].exercises[0].details.clone()])
            .await
            .unwrap();

        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());

        let stored = store.load_plans().await.unwrap().into_plans();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, "b");
        assert!(store.history("a", "a-ex0").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_or_malformed_history_reads_empty() {
        let (_dir, store) = open_store().await;
        assert!(store.history("a", "a-ex0").await.unwrap().is_empty());

        store.set_raw_for_test("history:a:a-ex0", "42").await.unwrap();
        assert!(store.history("a", "a-ex0").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn theme_defaults_and_round_trips() {
        let (_dir, store) = open_store().await;
        assert_eq!(store.theme().await.unwrap(), ThemeConfig::default());

        let custom = ThemeConfig {
            primary: "#ff0000".into(),
            secondary: "#00ff00".into(),
        };
        store.put_theme(&custom).await.unwrap();
        assert_eq!(store.theme().await.unwrap(), custom);
    }
}
