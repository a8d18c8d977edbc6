use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use doit_cli::cli::{Cli, Command, HistoryCommand, ListCommand, collect_overrides};
use doit_core::Tracker;
use doit_core::clock::{SystemClock, format_day, local_offset};
use doit_core::config::{self, Config, Palette, merge_overrides, palette_for_theme};
use doit_core::error::AppError;
use doit_core::model::{HistoryEntry, Task};
use doit_core::reset::ResetOutcome;
use doit_core::stats::DayCount;
use doit_core::storage::{FileStore, KeyValueStore, MemoryStore, store_dir};
use std::io::{self, BufRead, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use tracing::warn;
use tracing_subscriber::EnvFilter;

type Session = Tracker<Box<dyn KeyValueStore>, SystemClock>;

const LOG_ENV_VAR: &str = "DOIT_LOG";
const BAR_WIDTH: usize = 20;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Done")]
    check: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Completed")]
    completed: String,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn local_time(timestamp: &str) -> String {
    OffsetDateTime::parse(timestamp, &Rfc3339)
        .ok()
        .and_then(|at| {
            at.to_offset(local_offset())
                .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_else(|| timestamp.to_string())
}

fn task_not_found() -> AppError {
    AppError::invalid_input("task not found")
}

fn print_tasks_plain(tasks: &[&Task], palette: &Palette) {
    if tasks.is_empty() {
        println!("{}", palette.mutedize("No tasks"));
        return;
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id,
        check: if task.completed { "x" } else { " " }.to_string(),
        kind: task.kind.to_string(),
        text: task.text.clone(),
        created: local_time(&task.created_at),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
}

fn print_history_plain(entries: &[&HistoryEntry], palette: &Palette) {
    if entries.is_empty() {
        println!("{}", palette.mutedize("No history yet"));
        return;
    }

    let rows = entries.iter().map(|entry| HistoryRow {
        id: entry.id,
        text: entry.task_text.clone(),
        kind: entry.task_type.to_string(),
        completed: local_time(&entry.completed_date),
    });
    println!("{}", Table::new(rows).with(Style::sharp()));
}

/// Bars are relative to the busiest day; any non-zero day gets at least one cell.
fn bar_cells(count: usize, max: usize) -> usize {
    if count == 0 || max == 0 {
        0
    } else {
        (count * BAR_WIDTH / max).max(1)
    }
}

fn print_stats_plain(session: &Session, palette: &Palette) -> Result<(), AppError> {
    let summary = session.summary();
    let week = session.weekly_histogram();
    let max = week.iter().map(|day| day.count).max().unwrap_or(0);

    println!(
        "Active tasks: {} ({} daily, {} global)",
        summary.active, summary.daily, summary.global
    );
    println!(
        "Completed: {} total, {} today",
        summary.completed_total, summary.completed_today
    );
    println!("Last 7 days:");
    for day in &week {
        let weekday = day.date.weekday().to_string();
        let bar = "#".repeat(bar_cells(day.count, max));
        println!(
            "{} {} {:<width$} {}",
            &weekday[..3],
            palette.mutedize(&format_day(day.date)?),
            palette.accentize(&bar),
            day.count,
            width = BAR_WIDTH
        );
    }

    Ok(())
}

fn week_json(week: &[DayCount]) -> Result<serde_json::Value, AppError> {
    let mut days = Vec::with_capacity(week.len());
    for day in week {
        days.push(serde_json::json!({
            "date": format_day(day.date)?,
            "count": day.count,
        }));
    }
    Ok(serde_json::Value::Array(days))
}

fn print_stats_json(session: &Session) -> Result<(), AppError> {
    let summary = session.summary();
    let json = serde_json::json!({
        "active": summary.active,
        "daily": summary.daily,
        "global": summary.global,
        "completed_total": summary.completed_total,
        "completed_today": summary.completed_today,
        "week": week_json(&session.weekly_histogram())?,
    });
    println!("{}", json);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn load_base_config() -> Config {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "ignoring unreadable config");
    }
    loaded.config
}

fn resolve_config(base: &Config, cli: &Cli) -> Result<Config, AppError> {
    let overrides = collect_overrides(&cli.config_override).map_err(AppError::invalid_input)?;
    Ok(merge_overrides(base, &overrides))
}

/// Falls back to a session-only store when no data directory can be found.
fn open_session(config: &Config) -> Session {
    let store: Box<dyn KeyValueStore> = match store_dir(config.store_dir.as_deref()) {
        Ok(dir) => Box::new(FileStore::new(dir)),
        Err(err) => {
            warn!(error = %err, "no data directory, changes will not be saved");
            Box::new(MemoryStore::new())
        }
    };
    Tracker::open(store, SystemClock)
}

fn run_command(session: &mut Session, base: &Config, cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(base, &cli)?;
    let palette = palette_for_theme(config.theme.as_deref());

    match cli.command {
        Command::Add { text, kind } => {
            let kind = kind.unwrap_or(config.default_type);
            match session.add(&text.join(" "), kind) {
                Some(task) if cli.json => println!("{}", serde_json::to_string(&task)?),
                Some(task) => println!("Added task: {} ({}, {})", task.text, task.id, task.kind),
                None if cli.json => println!("null"),
                None => println!("Nothing added: task text is empty"),
            }
        }
        Command::Toggle { id } => {
            let completed = session.toggle(id).ok_or_else(task_not_found)?;
            let task = session.task(id).ok_or_else(task_not_found)?;
            if cli.json {
                println!("{}", serde_json::to_string(task)?);
            } else if completed {
                println!("Checked task: {} ({})", task.text, task.id);
            } else {
                println!("Unchecked task: {} ({})", task.text, task.id);
            }
        }
        Command::Done { id } => {
            let entry = session.complete(id).ok_or_else(task_not_found)?;
            if cli.json {
                println!("{}", serde_json::to_string(&entry)?);
            } else {
                println!("Completed task: {} ({})", entry.task_text, entry.task_id);
            }
        }
        Command::Delete { id } => {
            let task = session.delete(id).ok_or_else(task_not_found)?;
            if cli.json {
                println!("{}", serde_json::to_string(&task)?);
            } else {
                println!("Deleted task: {} ({})", task.text, task.id);
            }
        }
        Command::List { list } => {
            let tasks: Vec<&Task> = match list.unwrap_or(ListCommand::All).kind() {
                Some(kind) => session.tasks_of(kind),
                None => session.tasks().iter().collect(),
            };
            if cli.json {
                println!("{}", serde_json::to_string(&tasks)?);
            } else {
                print_tasks_plain(&tasks, &palette);
            }
        }
        Command::History { action: None } => {
            let entries = session.history_newest_first();
            if cli.json {
                println!("{}", serde_json::to_string(&entries)?);
            } else {
                print_history_plain(&entries, &palette);
            }
        }
        Command::History {
            action: Some(HistoryCommand::Delete { id }),
        } => {
            let entry = session
                .delete_entry(id)
                .ok_or_else(|| AppError::invalid_input("history entry not found"))?;
            if cli.json {
                println!("{}", serde_json::to_string(&entry)?);
            } else {
                println!("Deleted history entry: {} ({})", entry.task_text, entry.id);
            }
        }
        Command::History {
            action: Some(HistoryCommand::Clear { yes }),
        } => {
            if !yes && !confirm("Clear all history? [y/N] ")? {
                println!("Cancelled");
                return Ok(());
            }
            let cleared = session.clear_all();
            if cli.json {
                println!("{}", serde_json::json!({ "cleared": cleared }));
            } else {
                println!("Cleared {cleared} history entries");
            }
        }
        Command::Stats => {
            if cli.json {
                print_stats_json(session)?;
            } else {
                print_stats_plain(session, &palette)?;
            }
        }
        Command::Reset => {
            let outcome = session.run_daily_reset();
            let today = format_day(session.today())?;
            if cli.json {
                let cleared = match outcome {
                    ResetOutcome::Skipped => None,
                    ResetOutcome::Applied { cleared } => Some(cleared),
                };
                println!(
                    "{}",
                    serde_json::json!({ "date": today, "applied": cleared.is_some(), "cleared": cleared })
                );
            } else {
                match outcome {
                    ResetOutcome::Skipped => println!("Daily reset already ran today ({today})"),
                    ResetOutcome::Applied { cleared } => {
                        println!("Daily reset applied ({today}): {cleared} task(s) unchecked")
                    }
                }
            }
        }
    }

    Ok(())
}

fn run_interactive(session: &mut Session, base: &Config) -> Result<(), AppError> {
    let mut raw = Vec::new();
    let stdin = io::stdin();

    loop {
        raw.clear();
        let bytes = stdin.lock().read_until(b'\n', &mut raw)?;

        if bytes == 0 {
            break;
        }

        let input = match std::str::from_utf8(&raw) {
            Ok(input) => input,
            Err(_) => {
                eprintln!(
                    "ERROR: {}",
                    AppError::invalid_input("line is not valid UTF-8")
                );
                continue;
            }
        };

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("doit".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(session, base, cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();
    let base = load_base_config();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let mut session = open_session(&base);
        if let Err(err) = run_interactive(&mut session, &base) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let config = match resolve_config(&base, &cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let mut session = open_session(&config);
    if let Err(err) = run_command(&mut session, &base, cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
