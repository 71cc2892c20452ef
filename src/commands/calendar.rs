use std::collections::HashMap;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use colored::Colorize;

use crate::models::WorkoutPlan;
use crate::store::PlanStore;

pub async fn handle(store: &PlanStore, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let now = chrono::Local::now();
    let year = year.unwrap_or(now.year());
    let month = month.unwrap_or(now.month());

    if !(1..=12).contains(&month) {
        println!("{} month must be between 1 and 12", "error:".red().bold());
        return Ok(());
    }

    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        println!("{} invalid year/month", "error:".red().bold());
        return Ok(());
    };
    let last_day = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1),
        _ => NaiveDate::from_ymd_opt(year, month + 1, 1),
    }
    .and_then(|d| d.pred_opt())
    .unwrap_or(first_day);

    let plans = super::load_collection(store).await?;

    // Scheduled plans per day of this month; played days marked separately.
    let mut scheduled_by_day: HashMap<u32, Vec<&WorkoutPlan>> = HashMap::new();
    let mut played_days: Vec<u32> = Vec::new();
    for plan in &plans {
        let scheduled = plan.date_created.date();
        if scheduled >= first_day && scheduled <= last_day {
            scheduled_by_day.entry(scheduled.day()).or_default().push(plan);
        }
        if let Some(played) = plan.last_played {
            let played = played.date_naive();
            if played >= first_day && played <= last_day {
                played_days.push(played.day());
            }
        }
    }

    // Print calendar header.
    println!("\n{}", first_day.format("%B %Y").to_string().bold().cyan());
    println!("{}", "Su Mo Tu We Th Fr Sa".dimmed());

    let first_weekday = first_day.weekday().num_days_from_sunday() as usize;
    print!("{}", "   ".repeat(first_weekday));

    for day in 1..=last_day.day() {
        if played_days.contains(&day) {
            print!("{:>2} ", day.to_string().green().bold());
        } else if scheduled_by_day.contains_key(&day) {
            print!("{:>2} ", day.to_string().cyan().bold());
        } else {
            print!("{:>2} ", day);
        }

        if (first_weekday + day as usize) % 7 == 0 {
            println!();
        }
    }
    println!("\n");

    if scheduled_by_day.is_empty() && played_days.is_empty() {
        println!("{}", "  (nothing scheduled this month)".dimmed());
        return Ok(());
    }

    println!(
        "{} {} scheduled  {} completed",
        "Legend:".bold().cyan(),
        "●".cyan(),
        "●".green()
    );

    let mut days: Vec<u32> = scheduled_by_day.keys().copied().collect();
    days.sort_unstable();
    for day in days {
        for plan in &scheduled_by_day[&day] {
            let played = plan
                .last_played
                .map(|t| format!(" | played {}", t.format("%b %d %H:%M")))
                .unwrap_or_default();
            println!(
                "  {} {} — {} exercises{}",
                plan.date_created.format("%a %b %d").to_string().cyan(),
                plan.title.bold(),
                plan.exercises.len(),
                played.dimmed()
            );
        }
    }

    Ok(())
}
