use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::cli::SessionCmd;
use crate::models::WorkoutPlan;
use crate::session::{CELEBRATION_MILLIS, Phase, Session, StepOutcome};
use crate::store::PlanStore;

pub async fn handle(cmd: SessionCmd, store: &PlanStore) -> Result<()> {
    match cmd {
        SessionCmd::Start { plan } => {
            let plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };

            run(store, plans[pos].clone()).await
        }

        SessionCmd::Resume => {
            let plans = super::load_collection(store).await?;
            let Some(plan) = plans
                .iter()
                .filter(|p| p.last_played.is_some())
                .max_by_key(|p| p.last_played)
                .cloned()
            else {
                println!(
                    "{} no completed session yet – start one with `session start`",
                    "warning:".yellow().bold()
                );
                return Ok(());
            };

            println!(
                "{} resuming `{}` (last played {})",
                "info:".blue().bold(),
                plan.title.bold(),
                plan.last_played
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            );
            run(store, plan).await
        }
    }
}

fn print_exercise(session: &Session) {
    let slot = session.current();
    let ex = &slot.details;

    println!(
        "\n{} {} {}",
        format!("[{}/{}]", session.active_index() + 1, session.len()).yellow(),
        ex.name.bold(),
        format!("({})", ex.muscle_group).dimmed()
    );
    println!(
        "      {} sets × {} — rest timer {}s",
        ex.sets,
        ex.reps,
        session.time_left()
    );
    if let Some(notes) = &ex.notes {
        println!("      {}", notes.dimmed());
    }
    println!(
        "{}",
        "      [d]one  [t]imer start/stop  [+/-]15s  [r]eset  [q]uit".dimmed()
    );
}

fn print_progress(session: &Session) {
    println!(
        "{} {}/{} done ({:.0}%)",
        "progress:".cyan().bold(),
        session.completed_count(),
        session.len(),
        session.progress() * 100.0
    );
}

/// Drives one guided session. The 1 Hz interval and the stdin reader live
/// in this scope, so every way out of the loop tears the timer down with
/// it; leave gestures (q, EOF, Ctrl-C) all route into the exit
/// confirmation instead of silently dropping the session.
async fn run(store: &PlanStore, plan: WorkoutPlan) -> Result<()> {
    if plan.exercises.is_empty() {
        println!(
            "{} `{}` has no exercises to run",
            "error:".red().bold(),
            plan.title
        );
        return Ok(());
    }

    println!(
        "{} {} — {} exercises",
        "Session:".cyan().bold(),
        plan.title.bold(),
        plan.exercises.len()
    );

    let mut session = Session::new(&plan);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_exercise(&session);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let was_running = session.timer_running();
                session.tick();
                if was_running {
                    if session.time_left() == 0 {
                        println!("\n{} rest over – next set!", "info:".blue().bold());
                    } else {
                        print!("\r      rest: {:>4}s ", session.time_left());
                        let _ = std::io::stdout().flush();
                    }
                }
            }

            line = lines.next_line() => {
                let gesture = line?.unwrap_or_else(|| "q".to_string());
                if handle_input(store, &mut session, gesture.trim(), &mut lines).await? {
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                session.request_exit();
                if confirm_exit_dialog(&mut session, &mut lines).await? {
                    break;
                }
            }
        }

        if session.is_complete() {
            break;
        }
    }

    if !session.is_complete() {
        // Confirmed exit: progress is dropped with the session.
        session.confirm_exit();
    }

    Ok(())
}

/// Applies one input line to the session. Returns true when the loop
/// should end (exit confirmed, or the plan finished).
async fn handle_input(
    store: &PlanStore,
    session: &mut Session,
    gesture: &str,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    match gesture {
        "d" | "done" => {
            if !session.mark_done() {
                return Ok(false);
            }

            // Celebration window: purely visual, no input processed.
            println!("{}", "  ✔ nice!".green().bold());
            tokio::time::sleep(Duration::from_millis(CELEBRATION_MILLIS)).await;

            match session.finish_celebration() {
                Some(StepOutcome::Advanced) => {
                    print_progress(session);
                    print_exercise(session);
                    Ok(false)
                }
                Some(StepOutcome::Completed) => {
                    // The single persistent trace of the whole session.
                    store
                        .touch_last_played(session.plan_id(), chrono::Local::now())
                        .await?;
                    print_progress(session);
                    println!(
                        "\n{} {}",
                        "🏆".bold(),
                        "Great work! Session complete.".green().bold()
                    );
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        "t" | "timer" => {
            session.toggle_timer();
            if session.timer_running() {
                println!("{} rest timer running ({}s)", "info:".blue().bold(), session.time_left());
            } else {
                println!("{} rest timer paused at {}s", "info:".blue().bold(), session.time_left());
            }
            Ok(false)
        }

        "+" => {
            session.adjust_timer(true);
            println!("{} rest timer: {}s", "info:".blue().bold(), session.time_left());
            Ok(false)
        }

        "-" => {
            session.adjust_timer(false);
            println!("{} rest timer: {}s", "info:".blue().bold(), session.time_left());
            Ok(false)
        }

        "r" | "reset" => {
            session.reset_timer();
            println!("{} rest timer reset to {}s", "info:".blue().bold(), session.time_left());
            Ok(false)
        }

        "q" | "quit" | "exit" => {
            session.request_exit();
            confirm_exit_dialog(session, lines).await
        }

        "" => Ok(false),

        _ => {
            print_exercise(session);
            Ok(false)
        }
    }
}

/// Modal confirmation. Returns true when the user confirms leaving; the
/// session's progress is discarded, nothing is persisted.
async fn confirm_exit_dialog(
    session: &mut Session,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    if session.phase() != Phase::ExitConfirming {
        return Ok(false);
    }

    print!(
        "{} leave the session? Progress will be lost. [y/N] ",
        "confirm:".yellow().bold()
    );
    let _ = std::io::stdout().flush();

    let answer = lines.next_line().await?.unwrap_or_else(|| "y".to_string());
    if answer.trim().eq_ignore_ascii_case("y") {
        println!("{} session abandoned – nothing saved", "info:".blue().bold());
        Ok(true)
    } else {
        session.cancel_exit();
        print_exercise(session);
        Ok(false)
    }
}
