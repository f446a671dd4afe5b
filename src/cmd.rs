//! Command implementations for the CLI interface.
//!
//! Each handler works on the session built for this invocation. Mutating
//! commands apply once and print the outcome; nothing is written to disk.

use std::time::Duration;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::calendar::Intensity;
use crate::error::{AppError, Result};
use crate::fields::*;
use crate::progression::Milestone;
use crate::session::Session;
use crate::store::*;
use crate::task::{parse_reminder, NewTask, Task};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal interface.
    Ui,

    /// List today's practice tasks.
    List {
        /// Include tasks from every date, not just the session date.
        #[arg(long)]
        all_dates: bool,
        /// Only completed tasks.
        #[arg(long, conflicts_with = "pending")]
        completed: bool,
        /// Only pending tasks.
        #[arg(long)]
        pending: bool,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Add a practice task.
    Add {
        /// Short title for the task.
        title: String,
        /// Category: focus | physical | mind | chore.
        #[arg(long, value_enum, default_value_t = Category::Focus)]
        category: Category,
        /// Spiritual weight: 1 (normal), 2 (important) or 3 (urgent).
        #[arg(long, default_value_t = 1)]
        priority: u8,
        /// Reminder time, HH:MM.
        #[arg(long)]
        reminder: Option<String>,
        /// Repeat daily.
        #[arg(long)]
        repeat: bool,
        #[arg(long)]
        json: bool,
    },

    /// Flip a task between pending and complete.
    Toggle {
        id: u64,
        #[arg(long)]
        json: bool,
    },

    /// Delete a task. Experience already earned is kept.
    Delete {
        id: u64,
        #[arg(long)]
        json: bool,
    },

    /// Counts and per-category breakdown for today.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Rank, experience and the rank ladder.
    Profile {
        #[arg(long)]
        json: bool,
    },

    /// Month grid of completions.
    Calendar,

    /// Friends ranked by spirit power.
    Friends {
        #[arg(long)]
        json: bool,
    },

    /// Show the public square, or a private transcript with --friend.
    Messages {
        /// Friend id.
        #[arg(long)]
        friend: Option<String>,
    },

    /// Privacy, reminder and notification settings.
    Settings {
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Dispatch one parsed command.
pub fn run(command: Commands, session: &mut Session, delay: Duration) -> Result<()> {
    match command {
        Commands::Ui => cmd_ui(session, delay),
        Commands::List { all_dates, completed, pending, json } => {
            let filter = if completed {
                CompletionFilter::Completed
            } else if pending {
                CompletionFilter::Pending
            } else {
                CompletionFilter::All
            };
            cmd_list(session, all_dates, filter, json)
        }
        Commands::Add { title, category, priority, reminder, repeat, json } => {
            cmd_add(session, title, category, priority, reminder, repeat, json)
        }
        Commands::Toggle { id, json } => cmd_toggle(session, id, json),
        Commands::Delete { id, json } => cmd_delete(session, id, json),
        Commands::Stats { json } => cmd_stats(session, json),
        Commands::Profile { json } => cmd_profile(session, json),
        Commands::Calendar => {
            cmd_calendar(session);
            Ok(())
        }
        Commands::Friends { json } => cmd_friends(session, json),
        Commands::Messages { friend } => cmd_messages(session, friend),
        Commands::Settings { json } => cmd_settings(session, json),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Launch the terminal interface on this session.
pub fn cmd_ui(session: &mut Session, delay: Duration) -> Result<()> {
    run_tui(session, delay)
}

/// List tasks for the session date (or every date).
pub fn cmd_list(session: &Session, all_dates: bool, filter: CompletionFilter, json: bool) -> Result<()> {
    let store = session.store();
    let scope: Vec<&Task> = if all_dates {
        store.tasks().iter().collect()
    } else {
        store.today_tasks()
    };
    let rows = filter_completion(&scope, filter);
    if json {
        return print_json(&rows);
    }
    if rows.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_table(&rows);
    Ok(())
}

/// Build a [`NewTask`] from command-line values, validating priority and reminder.
pub fn build_new_task(
    title: String,
    category: Category,
    priority: u8,
    reminder: Option<String>,
    repeat: bool,
) -> Result<NewTask> {
    let priority = Priority::from_weight(priority).ok_or(AppError::InvalidPriority(priority))?;
    let reminder = match reminder {
        Some(raw) => parse_reminder(&raw)?,
        None => None,
    };
    Ok(NewTask::new(title, category, priority)
        .with_reminder(reminder)
        .with_repeat(repeat))
}

pub fn cmd_add(
    session: &mut Session,
    title: String,
    category: Category,
    priority: u8,
    reminder: Option<String>,
    repeat: bool,
    json: bool,
) -> Result<()> {
    let new = build_new_task(title, category, priority, reminder, repeat)?;
    let added = session.store_mut().add_task(new);
    let task = added.and_then(|id| session.store().get(id));
    if json {
        return print_json(&json!({ "added": task }));
    }
    match task {
        Some(t) => println!("Added task {} [{}]: {}", t.id, format_category(t.category), t.title),
        None => {
            warn!("add rejected: blank title");
            println!("Nothing added: the title is blank.");
        }
    }
    Ok(())
}

pub fn cmd_toggle(session: &mut Session, id: u64, json: bool) -> Result<()> {
    let outcome = session.store_mut().toggle_completion(id);
    let exp = session.store().progression().exp;
    if json {
        let body = match outcome {
            Some(o) => json!({
                "id": o.id,
                "completed": o.completed,
                "exp_awarded": o.exp_awarded,
                "exp": exp,
            }),
            None => json!({ "id": id, "found": false, "exp": exp }),
        };
        return print_json(&body);
    }
    match outcome {
        Some(o) if o.completed => println!("Task {} completed. +{} exp (now {}).", o.id, o.exp_awarded, exp),
        Some(o) => println!("Task {} reopened. Exp stays at {}.", o.id, exp),
        None => println!("Task {id} not found."),
    }
    Ok(())
}

pub fn cmd_delete(session: &mut Session, id: u64, json: bool) -> Result<()> {
    let removed = session.store_mut().delete_task(id);
    if json {
        return print_json(&json!({ "deleted": removed }));
    }
    match removed {
        Some(t) => println!("Deleted task {}: {}", t.id, t.title),
        None => println!("Task {id} not found."),
    }
    Ok(())
}

#[derive(Serialize)]
struct Stats {
    date: chrono::NaiveDate,
    total: usize,
    completed: usize,
    categories: Vec<CategoryStat>,
}

pub fn cmd_stats(session: &Session, json: bool) -> Result<()> {
    let today = session.store().today_tasks();
    let stats = Stats {
        date: session.store().today(),
        total: total_count(&today),
        completed: completed_count(&today),
        categories: category_breakdown(&today),
    };
    if json {
        return print_json(&stats);
    }
    println!("Practice for {}: {}/{} complete", stats.date, stats.completed, stats.total);
    println!("{:<10} {:<10} {:>5} {:>5}", "Category", "Realm", "Done", "Total");
    for s in &stats.categories {
        println!(
            "{:<10} {:<10} {:>5} {:>5}",
            s.category.label(),
            s.category.themed_name(),
            s.completed,
            s.count
        );
    }
    Ok(())
}

pub fn cmd_profile(session: &Session, json: bool) -> Result<()> {
    let p = session.store().progression();
    let stats = session.profile_stats();
    let ladder: Vec<Milestone> = p.milestones();
    if json {
        return print_json(&json!({
            "profile": &session.settings.profile,
            "progression": p,
            "progress_ratio": p.progress_ratio(),
            "stats": stats,
            "ladder": ladder,
        }));
    }
    let profile = &session.settings.profile;
    println!("{} {} · {}", profile.avatar, profile.name, profile.title);
    println!("Realm: {} (level {})", p.title(), p.level);
    println!(
        "Exp:   {}/{} ({:.1}%)",
        p.exp,
        p.next_level_exp,
        p.progress_ratio() * 100.0
    );
    println!(
        "Roots: diligence {}  wisdom {}  body {}",
        p.attributes.diligence, p.attributes.wisdom, p.attributes.body
    );
    println!(
        "Tasks: {}/{} complete, streak {} days",
        stats.total_completed, stats.total_tasks, stats.streak_days
    );
    println!();
    for m in &ladder {
        let mark = if m.current {
            "▶"
        } else if m.reached {
            "✓"
        } else {
            " "
        };
        println!("{mark} L{} {:<4} {:>6}", m.level, m.name, m.threshold);
    }
    Ok(())
}

fn intensity_glyph(i: Intensity) -> char {
    match i {
        Intensity::None => '·',
        Intensity::Low => '░',
        Intensity::Medium => '▒',
        Intensity::High => '█',
    }
}

pub fn cmd_calendar(session: &Session) {
    let history = session.history();
    let today_done = session.today_completed();
    println!("{}", history.today().format("%Y-%m"));
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in history.month_grid(today_done) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                Some(c) if c.is_today => format!("[{:>2}{}]", c.day, intensity_glyph(c.intensity)),
                Some(c) => format!(" {:>2}{} ", c.day, intensity_glyph(c.intensity)),
                None => "     ".to_string(),
            })
            .collect();
        println!("{}", line.join(""));
    }
    let summary = session.month_summary();
    println!();
    println!(
        "Completed {}  streak {} days  best day {}",
        summary.total_completed, summary.streak_days, summary.best_day
    );
}

pub fn cmd_friends(session: &Session, json: bool) -> Result<()> {
    let ranked = session.social.ranked_friends();
    if json {
        return print_json(&ranked);
    }
    println!("{:<3} {:<4} {:<10} {:<10} {:<10} {:>7}", "#", "ID", "Name", "Title", "Realm", "Spirit");
    for (i, f) in ranked.iter().enumerate() {
        println!(
            "{:<3} {:<4} {} {} {} {:>7}",
            i + 1,
            f.id,
            pad(&truncate(&f.name, 10), 10),
            pad(&truncate(&f.title, 10), 10),
            pad(&format!("{}{}", f.rank, f.stage), 10),
            f.spirit
        );
    }
    Ok(())
}

pub fn cmd_messages(session: &Session, friend: Option<String>) -> Result<()> {
    let lines = match friend {
        Some(id) => {
            let f = session
                .social
                .friend(&id)
                .ok_or_else(|| AppError::UnknownFriend(id.clone()))?;
            println!("Chat with {} {}", f.avatar, f.name);
            session.social.private_transcript(&id)
        }
        None => {
            println!("Public square");
            session.social.public_messages().to_vec()
        }
    };
    for m in lines {
        println!("{} {} {}: {}", m.time, m.avatar, m.from, m.content);
    }
    Ok(())
}

pub fn cmd_settings(session: &Session, json: bool) -> Result<()> {
    let settings = &session.settings;
    if json {
        return print_json(settings);
    }
    println!("[privacy]");
    for key in crate::settings::PrivacyToggle::ALL {
        println!("  {:<28} {}", key.label(), on_off(settings.privacy.get(key)));
    }
    println!("  {:<28} {}", "Profile visibility", settings.privacy.profile_visibility.label());
    println!("  {:<28} {}", "Task visibility", settings.privacy.task_visibility.label());
    println!("[reminder]");
    for slot in crate::settings::ReminderSlot::ALL {
        println!(
            "  {:<28} {} {}",
            slot.label(),
            settings.reminder.slot_time(slot).format("%H:%M"),
            on_off(settings.reminder.slot_enabled(slot))
        );
    }
    for key in crate::settings::ReminderToggle::ALL {
        println!("  {:<28} {}", key.label(), on_off(settings.reminder.get(key)));
    }
    println!("[notification]");
    for key in crate::settings::NotificationToggle::ALL {
        println!(
            "  {:<28} {}",
            format!("{} / {}", key.group(), key.label()),
            on_off(settings.notification.get(key))
        );
    }
    println!("  {:<28} {}", "In-app only", on_off(settings.notification.in_app_only));
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
    info!(?shell, "completions generated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_build_new_task_validates() {
        let t = build_new_task("冥想".into(), Category::Mind, 2, Some("06:30".into()), true).unwrap();
        assert_eq!(t.priority, Priority::Important);
        assert_eq!(t.reminder.map(|r| r.format("%H:%M").to_string()), Some("06:30".into()));
        assert_eq!(t.repeat, Some(true));

        assert!(matches!(
            build_new_task("x".into(), Category::Mind, 4, None, false),
            Err(AppError::InvalidPriority(4))
        ));
        assert!(matches!(
            build_new_task("x".into(), Category::Mind, 1, Some("25:00".into()), false),
            Err(AppError::InvalidReminder(_))
        ));
    }

    #[test]
    fn test_unknown_friend_transcript_is_error() {
        let session = Session::new(&Config::default());
        assert!(matches!(
            cmd_messages(&session, Some("nobody".into())),
            Err(AppError::UnknownFriend(_))
        ));
    }

    #[test]
    fn test_add_and_toggle_through_handlers() {
        let mut session = Session::new(&Config::default());
        cmd_add(&mut session, "站桩".into(), Category::Physical, 1, None, false, false).unwrap();
        assert_eq!(session.store().tasks().len(), 5);
        cmd_toggle(&mut session, 5, false).unwrap();
        assert_eq!(session.store().progression().exp, 3300);
        cmd_delete(&mut session, 5, false).unwrap();
        assert_eq!(session.store().progression().exp, 3300);
    }
}
