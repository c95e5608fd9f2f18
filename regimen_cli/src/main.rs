use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use regimen_core::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "regimen")]
#[command(about = "Hair treatment schedule calendar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_cli_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the schedule for one day (default: today)
    Day {
        /// Date to show (YYYY-MM-DD)
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,

        /// Move by this many days (negative goes back)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,

        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the week containing a date
    Week {
        /// Any date in the week (YYYY-MM-DD)
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,

        /// Move by this many weeks (negative goes back)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },

    /// Show the month containing a date
    Month {
        /// Any date in the month (YYYY-MM-DD)
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,

        /// Move by this many months (negative goes back)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },

    /// Check whether an appointment needs booking
    Remind,

    /// Keep re-checking the reminder as the day changes
    Watch {
        /// Seconds between checks (default from config)
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Exit after this many checks
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Show the treatment legend
    Legend,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_cli_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Keep command output clean unless RUST_LOG asks for more
    regimen_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    if let Some(Commands::Init { force }) = cli.command {
        let path = cli.config.unwrap_or_else(Config::default_config_path);
        return cmd_init(&path, force);
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let catalog_errors = get_default_catalog().validate();
    if !catalog_errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in &catalog_errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Other("Invalid treatment catalog".into()));
    }

    let engine = ScheduleEngine::from_config(&config);
    let today = cli.today.unwrap_or_else(|| SystemClock.today());

    match cli.command {
        Some(Commands::Day { date, offset, json }) => {
            let date = navigate(date.unwrap_or(today), View::Day, offset);
            if !json {
                print_banner(&config, today);
            }
            cmd_day(&engine, date, today, json)
        }
        Some(Commands::Week { date, offset }) => {
            print_banner(&config, today);
            cmd_week(&engine, navigate(date.unwrap_or(today), View::Week, offset), today)
        }
        Some(Commands::Month { date, offset }) => {
            print_banner(&config, today);
            cmd_month(&engine, navigate(date.unwrap_or(today), View::Month, offset), today)
        }
        Some(Commands::Remind) => cmd_remind(&config, today),
        Some(Commands::Watch {
            interval_secs,
            max_ticks,
        }) => cmd_watch(&config, interval_secs, max_ticks),
        Some(Commands::Legend) => {
            cmd_legend();
            Ok(())
        }
        Some(Commands::Init { .. }) => Ok(()),
        None => {
            // Default to today's schedule
            print_banner(&config, today);
            cmd_day(&engine, today, today, false)
        }
    }
}

fn warn_outside_window(engine: &ScheduleEngine, date: NaiveDate) {
    let window = engine.window();
    if !window.contains(date) {
        tracing::warn!(
            "{} is outside the schedule window {} .. {}",
            date,
            window.start,
            window.end
        );
    }
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save_to(path)?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_day(engine: &ScheduleEngine, date: NaiveDate, today: NaiveDate, json: bool) -> Result<()> {
    warn_outside_window(engine, date);
    let schedule = engine.treatments_for_date(date);

    if json {
        let out = serde_json::to_string_pretty(&schedule)
            .map_err(|e| Error::Other(format!("JSON error: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    let title = if same_calendar_day(date, today) {
        "Today's Schedule".to_string()
    } else {
        date.format("%A, %B %-d").to_string()
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");

    if schedule.is_empty() {
        println!("\n  Nothing scheduled.");
    }

    for slot in Slot::ALL {
        let entries = schedule.slot(slot);
        if entries.is_empty() {
            continue;
        }

        println!("\n  {}", slot);
        for entry in entries {
            match entry {
                Entry::Treatment(t) => println!("    • {}", t.name),
                Entry::Divider(d) => println!("    ── {} ──", d.label.to_uppercase()),
            }
        }
    }

    println!();
    Ok(())
}

fn cmd_week(engine: &ScheduleEngine, date: NaiveDate, today: NaiveDate) -> Result<()> {
    const SHOWN_PER_DAY: usize = 3;

    println!("\nWeek of {}\n", start_of_week(date).format("%B %-d, %Y"));

    for (day, schedule) in engine.schedules_for(week_dates(date)) {
        let marker = if same_calendar_day(day, today) { '>' } else { ' ' };
        let names: Vec<&str> = schedule
            .treatments()
            .take(SHOWN_PER_DAY)
            .map(|t| t.name.as_str())
            .collect();
        let extra = schedule.treatment_count().saturating_sub(SHOWN_PER_DAY);

        let mut line = format!("{} {} {:>2}  {}", marker, day.format("%a"), day.day(), names.join(", "));
        if extra > 0 {
            line.push_str(&format!(" +{}", extra));
        }
        println!("{}", line);
    }

    println!();
    Ok(())
}

/// Five-column cell: day number, `[..]` around today, `*` on PRP days
fn month_cell(engine: &ScheduleEngine, cell: &MonthCell, today: NaiveDate) -> String {
    if !cell.is_current_month {
        return " ".repeat(5);
    }

    let day = cell.date.day();
    let marker = if engine.is_special_event_day(cell.date) { '*' } else { ' ' };
    if same_calendar_day(cell.date, today) {
        format!("[{:>2}]{}", day, marker)
    } else {
        format!(" {:>2}{} ", day, marker)
    }
}

fn cmd_month(engine: &ScheduleEngine, date: NaiveDate, today: NaiveDate) -> Result<()> {
    let grid = month_grid(date);

    println!("\n{}\n", date.format("%B %Y"));
    println!("  S    M    T    W    T    F    S");

    for week in grid.chunks(7) {
        let row: String = week.iter().map(|cell| month_cell(engine, cell, today)).collect();
        println!("{}", row.trim_end());
    }

    println!("\n  * PRP session   [ ] today\n");
    Ok(())
}

fn print_banner(config: &Config, today: NaiveDate) {
    if let Some(event) = upcoming_event(
        today,
        &config.schedule.special_event_dates,
        config.reminder.window_days,
    ) {
        print_reminder(event);
    }
}

fn cmd_remind(config: &Config, today: NaiveDate) -> Result<()> {
    let window_days = config.reminder.window_days;
    match upcoming_event(today, &config.schedule.special_event_dates, window_days) {
        Some(event) => print_reminder(event),
        None => println!("No PRP session to book in the next {} days.", window_days),
    }
    Ok(())
}

fn print_reminder(event: NaiveDate) {
    println!("🔔 Time to book PRP! Next session: {}", event.format("%b %-d"));
}

fn cmd_watch(config: &Config, interval_secs: Option<u64>, max_ticks: Option<u64>) -> Result<()> {
    let interval =
        Duration::from_secs(interval_secs.unwrap_or(config.reminder.refresh_interval_secs).max(1));

    let monitor = ReminderMonitor::from_config(SystemClock, config);
    match monitor.current() {
        Some(event) => print_reminder(event),
        None => println!("No PRP session to book right now."),
    }

    let (tick_tx, tick_rx) = mpsc::channel();
    let ticker = ReminderTicker::spawn(monitor, interval, move |change, _current| {
        match change {
            ReminderChange::Raised(event) | ReminderChange::Changed(event) => print_reminder(event),
            ReminderChange::Cleared => println!("Reminder cleared."),
            ReminderChange::Unchanged => {}
        }
        let _ = tick_tx.send(());
    })?;

    let mut ticks = 0u64;
    while tick_rx.recv().is_ok() {
        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
    }

    ticker.stop();
    Ok(())
}

fn cmd_legend() {
    println!("\nTreatment Legend\n");
    for (category, label) in legend() {
        println!("  {:<18} {:?}", label, category);
    }
    println!();
}
