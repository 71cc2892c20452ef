use std::collections::BTreeSet;

use crate::models::{PlanExercise, WorkoutPlan};

/// Countdown seeded from the exercise's rest time, or this when unset.
pub const DEFAULT_REST_SECS: u32 = 60;

/// How long the completion flash stays on screen before the session
/// advances. No input is acted on during this window.
pub const CELEBRATION_MILLIS: u64 = 1500;

/// Step for the +/- rest adjustment keys.
pub const REST_ADJUST_SECS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Transient post-completion flash; resolved by `finish_celebration`.
    Celebrating,
    /// Modal exit confirmation; index, completed set and timer are untouched.
    ExitConfirming,
    Complete,
}

/// Outcome of resolving a celebration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved on to the next exercise.
    Advanced,
    /// That was the last exercise; the session is complete and the host
    /// must record `last_played` exactly once.
    Completed,
}

/// Guided walkthrough of one plan's exercises. Pure state: the host owns
/// the 1 Hz interval driving `tick` and the celebration delay, and must
/// drop both on every path out of the session.
#[derive(Debug)]
pub struct Session {
    plan_id: String,
    exercises: Vec<PlanExercise>,
    phase: Phase,
    /// Where `cancel_exit` returns to.
    resume_phase: Phase,
    active_index: usize,
    completed: BTreeSet<usize>,
    time_left: u32,
    timer_running: bool,
}

fn rest_of(exercises: &[PlanExercise], index: usize) -> u32 {
    exercises
        .get(index)
        .and_then(|e| e.details.rest_time)
        .unwrap_or(DEFAULT_REST_SECS)
}

impl Session {
    /// Starts at the first exercise with the countdown seeded and paused.
    /// The caller guarantees the plan has at least one exercise.
    pub fn new(plan: &WorkoutPlan) -> Self {
        let time_left = rest_of(&plan.exercises, 0);
        Self {
            plan_id: plan.id.clone(),
            exercises: plan.exercises.clone(),
            phase: Phase::Running,
            resume_phase: Phase::Running,
            active_index: 0,
            completed: BTreeSet::new(),
            time_left,
            timer_running: false,
        }
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn current(&self) -> &PlanExercise {
        &self.exercises[self.active_index]
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Display-only fraction of exercises done.
    pub fn progress(&self) -> f64 {
        self.completed.len() as f64 / self.exercises.len() as f64
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    /// Marks the current exercise done and enters the celebration window.
    /// Idempotent: returns false (and changes nothing) when the current
    /// exercise is already completed or the session is not running.
    pub fn mark_done(&mut self) -> bool {
        if self.phase != Phase::Running || self.completed.contains(&self.active_index) {
            return false;
        }

        self.phase = Phase::Celebrating;
        true
    }

    /// Resolves the celebration: records completion atomically, then either
    /// advances to the next exercise (countdown reseeded, paused) or
    /// completes the session. `None` outside the celebration window.
    pub fn finish_celebration(&mut self) -> Option<StepOutcome> {
        if self.phase != Phase::Celebrating {
            return None;
        }

        self.completed.insert(self.active_index);
        if self.active_index + 1 < self.exercises.len() {
            self.active_index += 1;
            self.time_left = rest_of(&self.exercises, self.active_index);
            self.timer_running = false;
            self.phase = Phase::Running;
            Some(StepOutcome::Advanced)
        } else {
            self.phase = Phase::Complete;
            self.timer_running = false;
            Some(StepOutcome::Completed)
        }
    }

    /// Routes a leave gesture into the confirmation overlay. Progress and
    /// timer state are preserved until the exit is confirmed.
    pub fn request_exit(&mut self) {
        if self.phase == Phase::Complete || self.phase == Phase::ExitConfirming {
            return;
        }

        self.resume_phase = self.phase;
        self.phase = Phase::ExitConfirming;
    }

    /// Backs out of the confirmation overlay, restoring the prior phase.
    pub fn cancel_exit(&mut self) {
        if self.phase == Phase::ExitConfirming {
            self.phase = self.resume_phase;
        }
    }

    /// Abandons the session. Consumes it: all progress is discarded and
    /// nothing is persisted (only full completion writes `last_played`).
    pub fn confirm_exit(self) {}

    /// One second of countdown. Reaching zero stops the timer; it never
    /// auto-advances the session.
    pub fn tick(&mut self) {
        if self.phase == Phase::Complete || !self.timer_running {
            return;
        }

        if self.time_left > 0 {
            self.time_left -= 1;
        }
        if self.time_left == 0 {
            self.timer_running = false;
        }
    }

    pub fn toggle_timer(&mut self) {
        if self.phase == Phase::Complete {
            return;
        }
        if self.time_left == 0 {
            // Restarting an expired countdown reseeds it first.
            self.time_left = rest_of(&self.exercises, self.active_index);
        }
        self.timer_running = !self.timer_running;
    }

    pub fn reset_timer(&mut self) {
        self.time_left = rest_of(&self.exercises, self.active_index);
        self.timer_running = false;
    }

    pub fn adjust_timer(&mut self, up: bool) {
        if up {
            self.time_left = self.time_left.saturating_add(REST_ADJUST_SECS);
        } else {
            self.time_left = self.time_left.saturating_sub(REST_ADJUST_SECS);
            if self.time_left == 0 {
                self.timer_running = false;
            }
        }
    }
}
