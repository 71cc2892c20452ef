use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::ai::{Answer, Assistant, ChatRole, ChatTurn};
use crate::cli::AssistCmd;
use crate::store::PlanStore;

pub async fn handle(cmd: AssistCmd, store: &PlanStore, assistant: &dyn Assistant) -> Result<()> {
    match cmd {
        AssistCmd::Explain { plan, exercise } => {
            let plans = super::load_collection(store).await?;
            let Some(pos) = super::find_plan(&plans, &plan) else {
                println!("{} no plan matching `{}`", "error:".red().bold(), plan);
                return Ok(());
            };

            let target = &plans[pos];
            let Some(slot) = exercise
                .checked_sub(1)
                .and_then(|i| target.exercises.get(i))
            else {
                println!(
                    "{} no exercise at index {} (plan has {})",
                    "error:".red().bold(),
                    exercise,
                    target.exercises.len()
                );
                return Ok(());
            };

            println!(
                "{} {} {}",
                "Explaining:".cyan().bold(),
                slot.details.name.bold(),
                format!("({})", slot.details.muscle_group).dimmed()
            );

            let answer = assistant
                .explain(&slot.details.name, &slot.details.muscle_group)
                .await;
            print_answer(&answer);

            Ok(())
        }

        AssistCmd::Chat => {
            println!(
                "{} chat with the AI coach – `exit` to leave",
                "info:".blue().bold()
            );

            let mut history: Vec<ChatTurn> = Vec::new();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                print!("{} ", "you>".green().bold());
                let _ = std::io::stdout().flush();

                let Some(line) = lines.next_line().await? else {
                    break;
                };
                let message = line.trim().to_string();
                if message.is_empty() {
                    continue;
                }
                if message == "exit" || message == "quit" {
                    break;
                }

                let answer = assistant.chat(&message, &history).await;
                print!("{} ", "coach>".cyan().bold());
                print_answer(&answer);

                // Degraded replies stay out of the history; the model never
                // said them.
                if let Answer::Fresh(text) = &answer {
                    history.push(ChatTurn {
                        role: ChatRole::User,
                        text: message,
                    });
                    history.push(ChatTurn {
                        role: ChatRole::Model,
                        text: text.clone(),
                    });
                }
            }

            Ok(())
        }

        AssistCmd::Quote => {
            print_answer(&assistant.quote().await);
            Ok(())
        }

        AssistCmd::Coach { minutes } => {
            let minutes = minutes.max(1);
            println!(
                "{} motivational ping every {} min – Ctrl-C to stop",
                "info:".blue().bold(),
                minutes
            );

            // tokio intervals fire immediately, so the first ping lands now.
            let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let stamp = chrono::Local::now().format("%H:%M");
                        print!("{} ", format!("[{}]", stamp).dimmed());
                        print_answer(&assistant.quote().await);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        println!("\n{} coach stopped", "info:".blue().bold());
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn print_answer(answer: &Answer) {
    match answer {
        Answer::Fresh(text) => println!("{}", text.trim()),
        Answer::Degraded(text) => println!("{} {}", text.trim(), "(offline)".dimmed()),
    }
}
