use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use itertools::Itertools;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::ai::Assistant;
use crate::models::DraftRoutine;
use crate::reconcile::{self, DraftField};
use crate::store::PlanStore;
use crate::upload;

pub async fn handle(
    store: &PlanStore,
    assistant: &dyn Assistant,
    file: String,
    date: Option<String>,
) -> Result<()> {
    let scheduled = match date {
        Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => {
                println!(
                    "{} invalid date `{}` – expected YYYY-MM-DD",
                    "error:".red().bold(),
                    raw
                );
                return Ok(());
            }
        },
        None => Local::now().date_naive(),
    };

    // Validation happens before the AI collaborator is ever involved.
    let doc = match upload::load_upload(Path::new(&file)) {
        Ok(doc) => doc,
        Err(e) => {
            println!("{} {}", "error:".red().bold(), e);
            return Ok(());
        }
    };

    println!(
        "{} analyzing `{}` ({}, {} KiB)...",
        "info:".blue().bold(),
        file,
        doc.mime,
        doc.data.len() / 1024
    );

    let extracted = match assistant.extract(&doc.data, doc.mime).await {
        Ok(routines) if routines.is_empty() => {
            println!(
                "{} no routines found in the document – try a clearer photo",
                "warning:".yellow().bold()
            );
            return Ok(());
        }
        Ok(routines) => routines,
        Err(e) => {
            // Extraction failure creates no drafts; the user may retry.
            println!("{} {}", "error:".red().bold(), e);
            return Ok(());
        }
    };

    let mut drafts = reconcile::to_drafts(extracted, scheduled);
    println!(
        "\n{} found {} routine{} – review, then `save` or `cancel`",
        "ok:".green().bold(),
        drafts.len(),
        if drafts.len() == 1 { "" } else { "s" }
    );

    review_loop(store, &mut drafts).await
}

fn print_drafts(drafts: &[DraftRoutine]) {
    println!("\n{}", "Routines:".cyan().bold());
    for (i, draft) in drafts.iter().enumerate() {
        let idx = format!("{}", i + 1).yellow();
        let preview = draft
            .exercises
            .iter()
            .take(3)
            .map(|e| e.name.as_str())
            .join(", ");
        let more = if draft.exercises.len() > 3 {
            format!(" +{} more", draft.exercises.len() - 3)
        } else {
            String::new()
        };
        println!(
            " {} • {} — {} exercises, on {}",
            idx,
            draft.routine_name.bold(),
            draft.exercises.len(),
            draft.selected_date
        );
        if !preview.is_empty() {
            println!("      {}{}", preview.dimmed(), more.dimmed());
        }
    }
}

fn print_review_help() {
    println!(
        "{}",
        "commands: name <i> <text> | date <i> <yyyy-mm-dd> | show <i> | save | cancel".dimmed()
    );
}

/// Review dialog over the drafts. `save` finalizes and commits the whole
/// batch; `cancel` (or end of input) discards every draft.
async fn review_loop(store: &PlanStore, drafts: &mut Vec<DraftRoutine>) -> Result<()> {
    print_drafts(drafts);
    print_review_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            println!("{} import cancelled – nothing saved", "info:".blue().bold());
            return Ok(());
        };

        let line = line.trim().to_string();
        let mut words = line.splitn(3, char::is_whitespace);
        let verb = words.next().unwrap_or("");

        match verb {
            "save" => {
                let plans = reconcile::finalize(drafts);
                let count = plans.len();

                // New plans go in front of the collection.
                let mut all = plans;
                all.extend(super::load_collection(store).await?);
                store.replace_all(&all).await?;

                println!(
                    "{} saved {} plan{}",
                    "ok:".green().bold(),
                    count,
                    if count == 1 { "" } else { "s" }
                );
                return Ok(());
            }

            "cancel" => {
                println!("{} import cancelled – nothing saved", "info:".blue().bold());
                return Ok(());
            }

            "name" | "date" | "show" => {
                let Some(index) = words
                    .next()
                    .and_then(|w| w.parse::<usize>().ok())
                    .and_then(|i| i.checked_sub(1))
                    .filter(|i| *i < drafts.len())
                else {
                    println!("{} no routine at that index", "error:".red().bold());
                    continue;
                };
                let id = drafts[index].id.clone();

                match verb {
                    "name" => {
                        let Some(text) = words.next().map(str::trim).filter(|t| !t.is_empty())
                        else {
                            println!("{} usage: name <i> <text>", "error:".red().bold());
                            continue;
                        };
                        reconcile::update_draft(drafts, &id, DraftField::Name(text.to_string()));
                        print_drafts(drafts);
                    }
                    "date" => {
                        let parsed = words
                            .next()
                            .and_then(|w| NaiveDate::parse_from_str(w.trim(), "%Y-%m-%d").ok());
                        let Some(date) = parsed else {
                            println!("{} usage: date <i> <yyyy-mm-dd>", "error:".red().bold());
                            continue;
                        };
                        reconcile::update_draft(drafts, &id, DraftField::Date(date));
                        print_drafts(drafts);
                    }
                    _ => {
                        let draft = &drafts[index];
                        println!("\n{}", draft.routine_name.cyan().bold());
                        for (i, ex) in draft.exercises.iter().enumerate() {
                            let rest = ex
                                .rest_time
                                .map(|r| format!(", rest {}s", r))
                                .unwrap_or_default();
                            println!(
                                " {} • {} [{}] — {} sets × {}{}",
                                format!("{}", i + 1).yellow(),
                                ex.name.bold(),
                                ex.muscle_group,
                                ex.sets,
                                ex.reps,
                                rest.dimmed()
                            );
                        }
                    }
                }
            }

            "" => {}

            _ => print_review_help(),
        }
    }
}
