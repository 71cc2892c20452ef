use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use crate::cli::PlanCmd;
use crate::models::WorkoutPlan;
use crate::store::PlanStore;
use crate::edit;
use crate::types::{OutputFmt, best_muscle_suggestion, canonical_muscle, emit};

#[derive(Serialize)]
struct PlanJson {
    idx: usize,
    id: String,
    title: String,
    scheduled: String,
    last_played: Option<String>,
    exercises: usize,
}

pub async fn handle(cmd: PlanCmd, store: &PlanStore, fmt: OutputFmt) -> Result<()> {
    match cmd {
        PlanCmd::List => {
            let plans = super::load_collection(store).await?;

            let rows: Vec<PlanJson> = plans
                .iter()
                .enumerate()
                .map(|(i, p)| PlanJson {
                    idx: i + 1,
                    id: p.id.clone(),
                    title: p.title.clone(),
                    scheduled: p.date_created.format("%Y-%m-%d").to_string(),
                    last_played: p.last_played.map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
                    exercises: p.exercises.len(),
                })
                .collect();

            emit(fmt, &rows, || {
                if rows.is_empty() {
                    println!("{}", "  (no plans yet – try `gymscan scan <file>`)".dimmed());
                    return;
                }

                println!("{}", "Plans:".cyan().bold());
                let idx_w = rows.iter().map(|r| r.idx.to_string().len()).max().unwrap_or(1);
                for row in &rows {
                    let idx = format!("{:>width$}", row.idx, width = idx_w).yellow();
                    let played = row
                        .last_played
                        .as_deref()
                        .map(|t| format!(" | last played {}", t))
                        .unwrap_or_default();
                    println!(
                        " {} • {} — {} exercises, scheduled {}{}",
                        idx,
                        row.title.bold(),
                        row.exercises,
                        row.scheduled,
                        played.dimmed()
                    );
                }
            });

            Ok(())
        }

        PlanCmd::Show { plan } => {
            let plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };
            let plan = &plans[pos];

            println!(
                "{} {} {}",
                "Plan:".cyan().bold(),
                plan.title.bold(),
                format!("(scheduled {})", plan.date_created.format("%a %b %d %Y")).dimmed()
            );
            if let Some(played) = plan.last_played {
                println!(
                    "{} {}",
                    "Last played:".cyan().bold(),
                    played.format("%a %b %d %H:%M")
                );
            }

            println!("\n{}", "Exercises:".cyan().bold());
            for (i, slot) in plan.exercises.iter().enumerate() {
                let idx = format!("{}", i + 1).yellow();
                let undoable = if edit::has_history(store, &plan.id, &slot.id).await? {
                    " ↺".yellow().to_string()
                } else {
                    String::new()
                };
                let rest = slot
                    .details
                    .rest_time
                    .map(|r| format!(", rest {}s", r))
                    .unwrap_or_default();
                println!(
                    " {} • {} [{}] — {} sets × {}{}{}",
                    idx,
                    slot.details.name.bold(),
                    slot.details.muscle_group,
                    slot.details.sets,
                    slot.details.reps,
                    rest.dimmed(),
                    undoable
                );
                if let Some(notes) = &slot.details.notes {
                    println!("      {}", notes.dimmed());
                }
            }

            Ok(())
        }

        PlanCmd::Edit {
            plan,
            exercise,
            name,
            sets,
            reps,
            muscle,
            notes,
            rest,
        } => {
            let mut plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };

            if name.is_none()
                && sets.is_none()
                && reps.is_none()
                && muscle.is_none()
                && notes.is_none()
                && rest.is_none()
            {
                println!(
                    "{} nothing to change – pass at least one of --name --sets --reps --muscle --notes --rest",
                    "warning:".yellow().bold()
                );
                return Ok(());
            }

            let target = &mut plans[pos];
            let index = match exercise.checked_sub(1) {
                Some(i) if i < target.exercises.len() => i,
                _ => {
                    println!(
                        "{} no exercise at index {} (plan has {})",
                        "error:".red().bold(),
                        exercise,
                        target.exercises.len()
                    );
                    return Ok(());
                }
            };

            let mut draft = edit::begin_edit(target, index)?;
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(sets) = sets {
                draft.sets = sets;
            }
            if let Some(reps) = reps {
                draft.reps = reps;
            }
            if let Some(muscle) = muscle {
                // Muscle groups are free-form; canonicalization is advisory.
                match canonical_muscle(&muscle) {
                    Some(canonical) => draft.muscle_group = canonical,
                    None => {
                        if let Some(suggestion) = best_muscle_suggestion(&muscle) {
                            println!(
                                "{} unknown muscle `{}` – did you mean `{}`? Keeping your spelling.",
                                "warning:".yellow().bold(),
                                muscle,
                                suggestion.green()
                            );
                        }
                        draft.muscle_group = muscle;
                    }
                }
            }
            if let Some(notes) = notes {
                draft.notes = if notes.trim().is_empty() { None } else { Some(notes) };
            }
            if let Some(rest) = rest {
                draft.rest_time = if rest == 0 { None } else { Some(rest) };
            }

            edit::commit_edit(store, target, index, draft).await?;
            println!(
                "{} updated exercise {} of `{}` (undo with `plan undo`)",
                "ok:".green().bold(),
                exercise,
                target.title
            );

            Ok(())
        }

        PlanCmd::Undo { plan, exercise } => {
            let mut plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };

            let target = &mut plans[pos];
            let index = match exercise.checked_sub(1) {
                Some(i) if i < target.exercises.len() => i,
                _ => {
                    println!(
                        "{} no exercise at index {} (plan has {})",
                        "error:".red().bold(),
                        exercise,
                        target.exercises.len()
                    );
                    return Ok(());
                }
            };

            // The engine treats an empty stack as a caller bug, so gate on
            // the affordance predicate first.
            let exercise_id = target.exercises[index].id.clone();
            if !edit::has_history(store, &target.id, &exercise_id).await? {
                println!(
                    "{} no edits to revert for exercise {}",
                    "warning:".yellow().bold(),
                    exercise
                );
                return Ok(());
            }

            edit::undo(store, target, index).await?;
            println!(
                "{} reverted exercise {} of `{}` to `{}`",
                "ok:".green().bold(),
                exercise,
                target.title,
                target.exercises[index].details.name
            );

            Ok(())
        }

        PlanCmd::Delete { plan } => {
            let plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };

            let title = plans[pos].title.clone();
            store.remove(&plans[pos].id).await?;
            println!("{} deleted `{}`", "ok:".green().bold(), title);

            Ok(())
        }

        PlanCmd::Export { plan, file } => {
            let plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };

            let target = &plans[pos];
            let path = file.unwrap_or_else(|| default_export_name(target));
            tokio::fs::write(&path, render_markdown(target)).await?;
            println!("{} wrote `{}`", "ok:".green().bold(), path);

            Ok(())
        }
    }
}

fn default_export_name(plan: &WorkoutPlan) -> String {
    let stem: String = plan
        .title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}.md", stem)
}

fn render_markdown(plan: &WorkoutPlan) -> String {
    let mut out = format!(
        "# {}\n\nScheduled: {}\n",
        plan.title,
        plan.date_created.format("%Y-%m-%d")
    );
    if let Some(played) = plan.last_played {
        out.push_str(&format!("Last played: {}\n", played.format("%Y-%m-%d %H:%M")));
    }
    out.push('\n');

    for (i, slot) in plan.exercises.iter().enumerate() {
        let ex = &slot.details;
        let extras = [
            ex.rest_time.map(|r| format!("rest {}s", r)),
            ex.notes.clone(),
        ]
        .into_iter()
        .flatten()
        .join("; ");

        out.push_str(&format!(
            "{}. **{}** ({}) — {} sets × {}",
            i + 1,
            ex.name,
            ex.muscle_group,
            ex.sets,
            ex.reps
        ));
        if !extras.is_empty() {
            out.push_str(&format!(" — {}", extras));
        }
        out.push('\n');
    }

    out
}
