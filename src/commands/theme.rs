use anyhow::Result;
use colored::Colorize;

use crate::cli::ThemeCmd;
use crate::models::ThemeConfig;
use crate::store::PlanStore;

fn swatch(hex: &str) -> String {
    match ThemeConfig::parse_hex(hex) {
        Some((r, g, b)) => "  ".on_truecolor(r, g, b).to_string(),
        None => "??".to_string(),
    }
}

fn print_theme(theme: &ThemeConfig) {
    println!("{}", "Theme:".cyan().bold());
    println!("  primary   {} {}", swatch(&theme.primary), theme.primary);
    println!("  secondary {} {}", swatch(&theme.secondary), theme.secondary);
}

pub async fn handle(cmd: ThemeCmd, store: &PlanStore) -> Result<()> {
    match cmd {
        ThemeCmd::Show => {
            print_theme(&store.theme().await?);
        }

        ThemeCmd::Set { primary, secondary } => {
            if primary.is_none() && secondary.is_none() {
                println!(
                    "{} nothing to change – pass --primary and/or --secondary",
                    "warning:".yellow().bold()
                );
                return Ok(());
            }

            let mut theme = store.theme().await?;
            for (label, slot, value) in [
                ("primary", &mut theme.primary, primary),
                ("secondary", &mut theme.secondary, secondary),
            ] {
                if let Some(hex) = value {
                    if ThemeConfig::parse_hex(&hex).is_none() {
                        println!(
                            "{} `{}` is not a hex colour like `#10b981` – {} unchanged",
                            "error:".red().bold(),
                            hex,
                            label
                        );
                        continue;
                    }
                    *slot = hex;
                }
            }

            store.put_theme(&theme).await?;
            print_theme(&theme);
        }

        ThemeCmd::Reset => {
            let theme = ThemeConfig::default();
            store.put_theme(&theme).await?;
            println!("{} theme reset", "ok:".green().bold());
            print_theme(&theme);
        }
    }

    Ok(())
}
