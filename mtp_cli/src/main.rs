use chrono::{Datelike, Local, Utc, Weekday};
use clap::{Parser, Subcommand};
use mtp_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mtp")]
#[command(about = "Matrix Training Plus workout tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the plan for a day with last session and suggested weight (default)
    Plan {
        /// Day of the week (mon..fri); defaults to today
        #[arg(long, value_parser = parse_weekday)]
        day: Option<Weekday>,
    },

    /// Log a session for a machine
    Log {
        /// Machine id or number (e.g. PRESS or 15)
        machine: String,

        /// Category (heavy, light, core)
        #[arg(value_parser = parse_category)]
        category: Category,

        /// A set as REPSxWEIGHT, e.g. 8x100, or REPS alone to use the
        /// working weight (repeat for each set)
        #[arg(long = "set", value_parser = parse_set)]
        sets: Vec<(u32, Option<f64>)>,

        /// Handle position (inner, outer)
        #[arg(long, value_parser = parse_handle)]
        handle: Option<HandlePosition>,
    },

    /// Show the suggested weight for the next session
    Suggest {
        /// Machine id or number
        machine: String,

        /// Category (heavy, light, core)
        #[arg(value_parser = parse_category)]
        category: Category,
    },

    /// List logged sessions for a machine
    History {
        /// Machine id or number
        machine: String,

        /// Category (heavy, light, core)
        #[arg(value_parser = parse_category)]
        category: Category,
    },

    /// Show or change the working weight for a machine
    Weight {
        /// Machine id or number
        machine: String,

        /// Category whose weight increment is used for steps
        #[arg(value_parser = parse_category)]
        category: Category,

        /// `+` or `-` to step by one increment, or a weight to set
        #[arg(value_parser = parse_weight_change, allow_hyphen_values = true)]
        change: Option<WeightChange>,
    },

    /// Summarize the last 7 days
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export all history to CSV
    Export {
        /// Output file
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file if none exists yet
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    // Keep stdout for command output; diagnostics go to stderr
    mtp_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    let catalog = build_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let store = JsonFileStore::new(config.history_path());
    tracing::debug!("Using history file {:?}", store.path());
    let mut history = HistoryStore::new(store);
    if let Some(max) = config.history.max_sessions_per_key {
        history = history.with_retention(max)?;
    }
    let mut tracker = Tracker::new(catalog, config.rules.clone(), history);

    match cli.command {
        Some(Commands::Plan { day }) => cmd_plan(&tracker, day),
        Some(Commands::Log {
            machine,
            category,
            sets,
            handle,
        }) => cmd_log(&mut tracker, &machine, category, sets, handle),
        Some(Commands::Suggest { machine, category }) => cmd_suggest(&tracker, &machine, category),
        Some(Commands::History { machine, category }) => cmd_history(&tracker, &machine, category),
        Some(Commands::Weight {
            machine,
            category,
            change,
        }) => cmd_weight(&mut tracker, &machine, category, change),
        Some(Commands::Summary { json }) => cmd_summary(&tracker, json),
        Some(Commands::Export { output }) => cmd_export(&tracker, &output),
        Some(Commands::Config { init }) => cmd_config(&config, init),
        None => cmd_plan(&tracker, None),
    }
}

fn cmd_plan(tracker: &Tracker<JsonFileStore>, day: Option<Weekday>) -> Result<()> {
    let weekday = day.unwrap_or_else(|| match Local::now().weekday() {
        Weekday::Sat | Weekday::Sun => Weekday::Mon,
        today => today,
    });

    let Some(plan) = tracker.catalog().day(weekday) else {
        println!("No workout planned for {}.", weekday);
        return Ok(());
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} - {}", weekday, plan.title);
    println!("╰─────────────────────────────────────────╯");

    for status in tracker.day_status(weekday)? {
        println!();
        println!("  {}", status.machine.label());
        println!(
            "    {} • {} • {}",
            status.machine.muscle_group,
            status.category,
            status.rule.scheme()
        );
        if let Some(ref tempo) = status.rule.tempo {
            println!("    Tempo: {}", tempo);
        }

        match status.last_session {
            Some(ref last) => println!("    Last: {}", last),
            None => println!("    Last: None"),
        }

        match status.suggested_weight {
            Some(weight) => println!("    Suggested: {} lb", weight),
            None => println!("    Suggested: -"),
        }

        if let Some(weight) = status.working_weight {
            println!("    Working: {} lb", weight);
        }

        if status.earned_progression {
            println!(
                "    ★ Earned progression: +{} lb",
                status.rule.weight_increment
            );
        }
    }

    println!();
    Ok(())
}

fn cmd_log(
    tracker: &mut Tracker<JsonFileStore>,
    machine: &str,
    category: Category,
    sets: Vec<(u32, Option<f64>)>,
    handle: Option<HandlePosition>,
) -> Result<()> {
    let label = tracker.machine(machine)?.label();

    let default_weight = if sets.iter().any(|(_, weight)| weight.is_none()) {
        let weight = tracker.default_weight(machine, category)?.ok_or_else(|| {
            Error::Other(format!(
                "No working weight for {}; enter sets as REPSxWEIGHT or run `mtp weight`",
                label
            ))
        })?;
        Some(weight)
    } else {
        None
    };

    let sets: Vec<(u32, f64)> = sets
        .into_iter()
        .map(|(reps, weight)| (reps, weight.or(default_weight).unwrap_or_default()))
        .collect();

    let session = tracker.log_session(machine, category, Utc::now(), sets, handle)?;

    println!("\n✓ Session logged!");
    println!("  {} {}: {}", label, category, session);

    if tracker.has_earned_progression(machine, category)? {
        println!(
            "  ★ Three sessions at the rep ceiling - time to add {} lb",
            tracker.rules().get(category).weight_increment
        );
    }

    Ok(())
}

fn cmd_suggest(tracker: &Tracker<JsonFileStore>, machine: &str, category: Category) -> Result<()> {
    let label = tracker.machine(machine)?.label();

    match tracker.suggest_next_weight(machine, category)? {
        Some(weight) => println!("{} {}: suggested {} lb", label, category, weight),
        None => println!("{} {}: no history yet", label, category),
    }

    if tracker.has_earned_progression(machine, category)? {
        println!("Earned progression: yes");
    }

    Ok(())
}

fn cmd_history(tracker: &Tracker<JsonFileStore>, machine: &str, category: Category) -> Result<()> {
    let label = tracker.machine(machine)?.label();
    let sessions = tracker.load(machine, category)?;

    if sessions.is_empty() {
        println!("{} {}: no history yet", label, category);
        return Ok(());
    }

    println!("{} {} ({} sessions)", label, category, sessions.len());
    for session in &sessions {
        let when = session.timestamp().with_timezone(&Local);
        match session.handle() {
            Some(handle) => println!(
                "  {} - {} [{}]",
                when.format("%Y-%m-%d %H:%M"),
                session,
                handle
            ),
            None => println!("  {} - {}", when.format("%Y-%m-%d %H:%M"), session),
        }
    }

    Ok(())
}

fn cmd_weight(
    tracker: &mut Tracker<JsonFileStore>,
    machine: &str,
    category: Category,
    change: Option<WeightChange>,
) -> Result<()> {
    let label = tracker.machine(machine)?.label();

    let Some(change) = change else {
        match tracker.working_weight(machine)? {
            Some(weight) => println!("{}: working weight {} lb", label, weight),
            None => println!("{}: no working weight set", label),
        }
        return Ok(());
    };

    let weight = tracker.change_working_weight(machine, category, change)?;
    println!("✓ {} working weight: {} lb", label, weight);
    Ok(())
}

fn cmd_summary(tracker: &Tracker<JsonFileStore>, json: bool) -> Result<()> {
    let summary = tracker.summarize(Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Last 7 Days Summary");
    println!(
        "{:<8} {:>10} {:>14} {:>14}",
        "Type", "Total Sets", "Top Reps", "Top Weight"
    );
    for category in Category::ALL {
        let totals = summary.get(category);
        println!(
            "{:<8} {:>10} {:>14} {:>14}",
            category.as_str(),
            totals.total_sets,
            with_percent(totals.top_rep_sets, totals.total_sets),
            with_percent(totals.top_weight_sets, totals.total_sets),
        );
    }

    Ok(())
}

fn cmd_export(tracker: &Tracker<JsonFileStore>, output: &Path) -> Result<()> {
    let rows = mtp_core::export::write_history_csv(tracker, output)?;

    println!("✓ Exported {} sets to CSV", rows);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn cmd_config(config: &Config, init: bool) -> Result<()> {
    if !init {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let path = Config::default_config_path();
    if path.exists() {
        return Err(Error::Config(format!(
            "Config file already exists at {}",
            path.display()
        )));
    }

    config.save()?;
    println!("✓ Wrote config to {}", path.display());
    Ok(())
}

/// Count with its share of the total, e.g. `5 (83%)`
fn with_percent(part: u32, total: u32) -> String {
    if total == 0 {
        return format!("{}", part);
    }
    let pct = (part as f64 / total as f64 * 100.0).round();
    format!("{} ({}%)", part, pct)
}

fn parse_category(s: &str) -> std::result::Result<Category, String> {
    s.parse::<Category>().map_err(|e| e.to_string())
}

fn parse_handle(s: &str) -> std::result::Result<HandlePosition, String> {
    s.parse::<HandlePosition>().map_err(|e| e.to_string())
}

fn parse_weight_change(s: &str) -> std::result::Result<WeightChange, String> {
    s.parse::<WeightChange>().map_err(|e| e.to_string())
}

fn parse_weekday(s: &str) -> std::result::Result<Weekday, String> {
    s.parse::<Weekday>()
        .map_err(|_| format!("Unknown day: {} (expected mon..sun)", s))
}

/// Parse `REPSxWEIGHT` (also accepts `REPS@WEIGHT`) or bare `REPS`
fn parse_set(s: &str) -> std::result::Result<(u32, Option<f64>), String> {
    let (reps, weight) = match s.split_once(['x', 'X', '@']) {
        Some((reps, weight)) => (reps, Some(weight)),
        None => (s, None),
    };

    let reps = reps
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("Invalid reps in '{}': {} (expected REPSxWEIGHT, e.g. 8x100)", s, e))?;
    let weight = weight
        .map(|w| w.trim().parse::<f64>())
        .transpose()
        .map_err(|e| format!("Invalid weight in '{}': {}", s, e))?;

    Ok((reps, weight))
}
