use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gymscan", version, about = "AI workout plan scanner and session runner")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a photo or PDF of a workout plan and import the routines it contains
    Scan {
        /// Path to the document (JPG, PNG, WEBP or PDF, max 20 MB)
        file: String,

        /// Schedule the imported routines for this date (defaults to today)
        #[arg(short, long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },

    /// Plan management
    #[command(subcommand, visible_alias = "p")]
    Plan(PlanCmd),

    /// Guided workout sessions
    #[command(subcommand, visible_alias = "s")]
    Session(SessionCmd),

    /// AI coaching helpers
    #[command(subcommand, visible_alias = "a")]
    Assist(AssistCmd),

    /// View or change the accent colours
    #[command(subcommand)]
    Theme(ThemeCmd),

    /// Show scheduled and completed plans in a calendar view
    #[command(visible_alias = "cal")]
    Calendar {
        /// Year to show (defaults to current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show (1-12, defaults to current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// View or edit gymscan config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum PlanCmd {
    /// List all plans
    #[command(visible_alias = "l")]
    List,

    /// Show a single plan in detail
    #[command(visible_alias = "s")]
    Show {
        /// Plan index (from `plan list`) or exact title
        plan: String,
    },

    /// Edit one exercise of a plan - Usage: plan edit PLAN EXERCISE --field value ...
    #[command(visible_alias = "e")]
    Edit {
        /// Plan index or exact title
        plan: String,

        /// 1-based exercise index (same order shown in `plan show`)
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        /// New exercise name
        #[arg(long)]
        name: Option<String>,

        /// New set count
        #[arg(long)]
        sets: Option<u32>,

        /// New rep scheme (free-form, e.g. "8-12")
        #[arg(long)]
        reps: Option<String>,

        /// New muscle group
        #[arg(long)]
        muscle: Option<String>,

        /// New note (empty string clears it)
        #[arg(long)]
        notes: Option<String>,

        /// New rest time in seconds (0 clears it)
        #[arg(long)]
        rest: Option<u32>,
    },

    /// Revert the most recent edit of one exercise
    #[command(visible_alias = "u")]
    Undo {
        /// Plan index or exact title
        plan: String,

        /// 1-based exercise index
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
    },

    /// Delete a plan
    #[command(visible_alias = "d")]
    Delete {
        /// Plan index or exact title
        plan: String,
    },

    /// Export a plan as a markdown file
    Export {
        /// Plan index or exact title
        plan: String,

        /// Output file path (defaults to the plan title)
        #[arg(short, long)]
        file: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Run a guided session through a plan's exercises
    #[command(visible_alias = "s")]
    Start {
        /// Plan index or exact title
        plan: String,
    },

    /// Re-run the most recently completed plan
    #[command(visible_alias = "r")]
    Resume,
}

#[derive(Subcommand)]
pub enum AssistCmd {
    /// Ask the AI how to perform one exercise of a plan
    #[command(visible_alias = "e")]
    Explain {
        /// Plan index or exact title
        plan: String,

        /// 1-based exercise index
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
    },

    /// Chat with the AI coach
    #[command(visible_alias = "c")]
    Chat,

    /// Print one motivational quote
    #[command(visible_alias = "q")]
    Quote,

    /// Periodic motivational pings until interrupted
    Coach {
        /// Minutes between pings
        #[arg(short, long, default_value = "15")]
        minutes: u64,
    },
}

#[derive(Subcommand)]
pub enum ThemeCmd {
    /// Show the current accent colours
    Show,

    /// Set one or both accent colours (hex, e.g. "#10b981")
    Set {
        #[arg(long)]
        primary: Option<String>,

        #[arg(long)]
        secondary: Option<String>,
    },

    /// Restore the default colours
    Reset,
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
