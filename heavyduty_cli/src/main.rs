use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use heavyduty_core::nutrition::{self, ActivityLevel, Goal, Sex};
use heavyduty_core::progress::DayStatus;
use heavyduty_core::stats::{group_stats, monthly_workouts, total_workouts, MonthStats};
use heavyduty_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "heavyduty")]
#[command(about = "Home workout progression planner and nutrition tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the training start date (defaults to today)
    Start { date: Option<NaiveDate> },

    /// Show the plan for a day (default)
    Today {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show the plan for a whole training week
    Week {
        /// Week number (defaults to the current week)
        week: Option<u32>,
    },

    /// Mark exercises as done
    Mark {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Unmark exercises
    Unmark {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show current and longest streak
    Streak,

    /// Show a month of progress
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
    },

    /// Per muscle group statistics
    Stats,

    /// Browse the exercise library
    Library {
        /// warm_up, stretch, mobility, cardio or a muscle group
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        equipment: Option<String>,
        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one exercise in detail
    Show { id: String },

    /// Set or clear (omit URL) an exercise's video link
    Video { id: String, url: Option<String> },

    /// Clear all progress (keeps the start date and longest streak)
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Nutrition profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Meal log
    Meal {
        #[command(subcommand)]
        action: MealAction,
    },

    /// Export history and meals as CSV
    Export {
        /// Output directory (defaults to <data-dir>/exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show profile and targets (default)
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        sex: Option<Sex>,
        #[arg(long)]
        activity: Option<ActivityLevel>,
        #[arg(long)]
        goal: Option<Goal>,
    },
}

#[derive(Subcommand)]
enum MealAction {
    /// Log a meal
    Add {
        label: String,
        #[arg(long, default_value_t = 0.0)]
        calories: f64,
        #[arg(long, default_value_t = 0.0)]
        protein: f64,
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,
        #[arg(long, default_value_t = 0.0)]
        fat: f64,
        /// HH:MM
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove a meal by its number in `meal list`
    Remove {
        number: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List meals and totals for a day
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn parse_month(s: &str) -> std::result::Result<(i32, u32), String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got {}", s))?;
    let year: i32 = year.parse().map_err(|_| format!("bad year in {}", s))?;
    let month: u32 = month.parse().map_err(|_| format!("bad month in {}", s))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month must be 1-12, got {}", month));
    }
    Ok((year, month))
}

fn parse_time(s: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    heavyduty_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    tracing::debug!(%today, "Using data directory {:?}", data_dir);

    let mut session = Session::open(&data_dir, config)?;
    for warning in session.warnings() {
        eprintln!("⚠ {}", warning);
    }

    match cli.command.unwrap_or(Commands::Today { date: None }) {
        Commands::Start { date } => cmd_start(&mut session, date.unwrap_or(today)),
        Commands::Today { date } => cmd_today(&session, date.unwrap_or(today)),
        Commands::Week { week } => cmd_week(&session, week, today),
        Commands::Mark { ids, date } => cmd_mark(&mut session, &ids, date.unwrap_or(today), true),
        Commands::Unmark { ids, date } => {
            cmd_mark(&mut session, &ids, date.unwrap_or(today), false)
        }
        Commands::Streak => cmd_streak(&session, today),
        Commands::Calendar { month } => {
            let (year, month) = month.unwrap_or((today.year(), today.month()));
            cmd_calendar(&session, year, month, today)
        }
        Commands::Stats => cmd_stats(&session, today),
        Commands::Library {
            category,
            difficulty,
            equipment,
            search,
        } => cmd_library(
            &session,
            &ExerciseFilter {
                category,
                difficulty,
                equipment,
                name_contains: search,
            },
        ),
        Commands::Show { id } => cmd_show(&session, &id),
        Commands::Video { id, url } => cmd_video(&mut session, &id, url.as_deref().unwrap_or("")),
        Commands::Reset { yes } => cmd_reset(&mut session, yes, today),
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => cmd_profile_show(&session),
            ProfileAction::Set {
                weight,
                height,
                age,
                sex,
                activity,
                goal,
            } => {
                let mut profile = session.nutrition().profile().clone();
                profile.weight_kg = weight.or(profile.weight_kg);
                profile.height_cm = height.or(profile.height_cm);
                profile.age = age.or(profile.age);
                profile.sex = sex.unwrap_or(profile.sex);
                profile.activity = activity.unwrap_or(profile.activity);
                profile.goal = goal.unwrap_or(profile.goal);
                session.set_profile(profile)?;
                println!("✓ Profile saved");
                cmd_profile_show(&session)
            }
        },
        Commands::Meal { action } => match action {
            MealAction::Add {
                label,
                calories,
                protein,
                carbs,
                fat,
                time,
                date,
            } => {
                let date = date.unwrap_or(today);
                session.log_meal(
                    date,
                    MealEntry {
                        label: label.clone(),
                        calories,
                        protein_g: protein,
                        carbs_g: carbs,
                        fat_g: fat,
                        time,
                    },
                )?;
                println!("✓ Logged {} ({:.0} kcal) on {}", label, calories, date);
                Ok(())
            }
            MealAction::Remove { number, date } => {
                let date = date.unwrap_or(today);
                let index = number.checked_sub(1).ok_or_else(|| {
                    Error::InvalidInput("meal numbers start at 1".into())
                })?;
                let removed = session.remove_meal(date, index)?;
                println!("✓ Removed {} from {}", removed.label, date);
                Ok(())
            }
            MealAction::List { date } => cmd_meal_list(&session, date.unwrap_or(today)),
        },
        Commands::Export { out } => {
            let dir = out.unwrap_or_else(|| data_dir.join("exports"));
            let summary = session.export(&dir, today)?;
            println!(
                "✓ Exported {} training days to {}",
                summary.history_rows,
                summary.history_path.display()
            );
            println!(
                "✓ Exported {} meals to {}",
                summary.meal_rows,
                summary.meals_path.display()
            );
            Ok(())
        }
    }
}

fn require_start(session: &Session) -> Option<NaiveDate> {
    let start = session.progress().start_date();
    if start.is_none() {
        println!("No start date set. Run `heavyduty start [YYYY-MM-DD]` first.");
    }
    start
}

fn cmd_start(session: &mut Session, date: NaiveDate) -> Result<()> {
    session.set_start_date(date)?;
    println!("✓ Training starts on {} ({})", date, date.weekday());
    Ok(())
}

fn print_header(title: &str) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");
}

fn cmd_today(session: &Session, date: NaiveDate) -> Result<()> {
    let Some(start) = require_start(session) else {
        return Ok(());
    };
    if date < start {
        println!("Training starts on {}.", start);
        return Ok(());
    }

    let engine = session.engine();
    let schedule = session.progress().schedule_for(&engine, date)?;
    let info = engine.week_info(schedule.week)?;

    print_header(&format!(
        "WEEK {} · LEVEL {} ({})",
        info.week, info.tier, info.level_name
    ));
    println!("  {}", info.description);
    println!();

    if !schedule.is_training_day() {
        println!("  {} ({}) · Rest day", date, date.weekday());
        println!();
        return Ok(());
    }

    let groups: Vec<String> = schedule.groups.iter().map(|g| g.to_string()).collect();
    println!("  {} ({}) · {}", date, date.weekday(), groups.join(", "));
    println!();

    let completed = session.progress().completed_on(date);
    for exercise in &schedule.exercises {
        let mark = if completed.contains(&exercise.id) { "x" } else { " " };
        println!(
            "  [{}] {:<30} {} × {}   ({})",
            mark, exercise.name, exercise.sets, exercise.reps, exercise.id
        );
    }

    let ratio = schedule.completion_ratio(&completed).unwrap_or(0.0);
    println!();
    println!(
        "  Progress: {}/{} ({:.0}%){}",
        schedule.completed_count(&completed),
        schedule.planned_count(),
        ratio * 100.0,
        if engine.is_complete(ratio) { " ✓ day complete" } else { "" }
    );
    println!();
    Ok(())
}

fn cmd_week(session: &Session, week: Option<u32>, today: NaiveDate) -> Result<()> {
    let week = match week {
        Some(w) => w.max(1),
        None => {
            let Some(start) = require_start(session) else {
                return Ok(());
            };
            week_of(today, start)
        }
    };

    let engine = session.engine();
    let info = engine.week_info(week)?;
    let strategy = engine.strategy_for(week)?;
    let plan = strategy.build(session.catalog())?;

    print_header(&format!(
        "WEEK {} · LEVEL {} ({})",
        info.week, info.tier, info.level_name
    ));
    println!(
        "  {} · week {} of this level · {}",
        info.description,
        info.week_in_level,
        if strategy.is_fixed() { "fixed plan" } else { "generated plan" }
    );
    println!();

    for day in &plan.days {
        if day.exercises.is_empty() {
            println!("  {}  rest", day.weekday);
            continue;
        }
        let groups: Vec<String> = day.groups.iter().map(|g| g.to_string()).collect();
        println!(
            "  {}  {} ({} exercises)",
            day.weekday,
            groups.join(", "),
            day.exercises.len()
        );
    }
    println!();
    Ok(())
}

fn cmd_mark(session: &mut Session, ids: &[String], date: NaiveDate, done: bool) -> Result<()> {
    for id in ids {
        let changed = if done {
            session.mark(date, id)?
        } else {
            session.unmark(date, id)?
        };
        let verb = if done { "Marked" } else { "Unmarked" };
        if changed {
            println!("✓ {} {} on {}", verb, id, date);
        } else {
            println!("  {} was already {}", id, verb.to_lowercase());
        }
    }

    let engine = session.engine();
    if let Some(ratio) = session.progress().completion_ratio(&engine, date)? {
        println!("  Day progress: {:.0}%", ratio * 100.0);
    }
    Ok(())
}

fn cmd_streak(session: &Session, today: NaiveDate) -> Result<()> {
    let engine = session.engine();
    let streak = session.progress().streak(&engine, today)?;
    let total = total_workouts(session.progress(), &engine, today)?;
    println!("Current streak: {} days", streak.current);
    println!("Longest streak: {} days", streak.longest);
    println!("Completed workouts: {}", total);
    Ok(())
}

fn cmd_calendar(session: &Session, year: i32, month: u32, today: NaiveDate) -> Result<()> {
    let engine = session.engine();
    let summary = session.progress().monthly_summary(&engine, year, month)?;

    print_header(&format!("{}-{:02}", year, month));
    println!("   Mon   Tue   Wed   Thu   Fri   Sat   Sun");

    let mut line = String::from(" ");
    if let Some(first) = summary.first() {
        for _ in 0..first.date.weekday().num_days_from_monday() {
            line.push_str("      ");
        }
    }
    for day in &summary {
        let marker = match day.status {
            DayStatus::NotStarted => ' ',
            DayStatus::Rest => '-',
            DayStatus::Training { complete: true, .. } => '✓',
            DayStatus::Training { ratio, .. } if ratio > 0.0 => '~',
            DayStatus::Training { .. } => '·',
        };
        line.push_str(&format!("  {:>2}{} ", day.date.day(), marker));
        if day.date.weekday() == chrono::Weekday::Sun {
            println!("{}", line.trim_end());
            line = String::from(" ");
        }
    }
    if !line.trim().is_empty() {
        println!("{}", line.trim_end());
    }

    let stats = MonthStats::from_summary(&summary, today);
    println!();
    println!("  ✓ complete  ~ partial  · missed/planned  - rest");
    println!(
        "  Training days so far: {}  Completed: {}  Average: {}",
        stats.training_days,
        stats.completed_days,
        stats
            .average_ratio
            .map(|r| format!("{:.0}%", r * 100.0))
            .unwrap_or_else(|| "n/a".into())
    );
    println!();
    Ok(())
}

fn cmd_stats(session: &Session, today: NaiveDate) -> Result<()> {
    let engine = session.engine();
    let total = total_workouts(session.progress(), &engine, today)?;

    print_header("STATISTICS");
    println!("  Completed workouts: {}", total);

    let months = monthly_workouts(session.progress(), &engine, today)?;
    if !months.is_empty() {
        println!();
        for ((year, month), count) in months {
            println!("  {}-{:02}  {:>3}  {}", year, month, count, "█".repeat(count));
        }
    }
    println!();
    println!(
        "  {:<10} {:>9} {:>6} {:>10}",
        "group", "completed", "days", "exercises"
    );
    for s in group_stats(session.progress(), session.catalog()) {
        println!(
            "  {:<10} {:>9} {:>6} {:>6}/{:<3}",
            s.group.to_string(),
            s.completed,
            s.days_trained,
            s.unique_exercises,
            s.catalog_size
        );
    }
    println!();
    Ok(())
}

fn cmd_library(session: &Session, filter: &ExerciseFilter) -> Result<()> {
    let mut count = 0;
    for exercise in session.catalog().filter(filter) {
        let equipment: Vec<&str> = exercise.equipment.iter().map(String::as_str).collect();
        println!(
            "  {:<30} {:<26} {:<18} {:<12} {}",
            exercise.id,
            exercise.name,
            exercise.category.to_string(),
            exercise.difficulty.to_string(),
            if equipment.is_empty() { "-".to_string() } else { equipment.join(", ") }
        );
        count += 1;
    }
    println!("\n  {} exercises", count);
    Ok(())
}

fn cmd_show(session: &Session, id: &str) -> Result<()> {
    let exercise = session.catalog().get(id)?;
    print_header(&exercise.name);
    println!("  id:         {}", exercise.id);
    println!("  category:   {}", exercise.category);
    println!("  difficulty: {}", exercise.difficulty);
    println!("  default:    {} × {}", exercise.sets, exercise.reps);
    if !exercise.equipment.is_empty() {
        let equipment: Vec<&str> = exercise.equipment.iter().map(String::as_str).collect();
        println!("  equipment:  {}", equipment.join(", "));
    }
    println!();
    println!("  {}", exercise.instructions);
    if !exercise.safety_notes.is_empty() {
        println!();
        println!("  ⚠ {}", exercise.safety_notes);
    }
    if let Some(ref url) = exercise.video_url {
        println!();
        println!("  ℹ Video: {}", url);
    }
    println!();
    Ok(())
}

fn cmd_video(session: &mut Session, id: &str, url: &str) -> Result<()> {
    session.save_video_url(id, url)?;
    if url.trim().is_empty() {
        println!("✓ Cleared video for {}", id);
    } else {
        println!("✓ Saved video for {}", id);
    }
    Ok(())
}

fn cmd_reset(session: &mut Session, yes: bool, today: NaiveDate) -> Result<()> {
    if !yes {
        print!("This deletes all recorded progress. Type 'yes' to confirm: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "yes" {
            println!("Aborted.");
            return Ok(());
        }
    }
    session.reset_all(today)?;
    println!("✓ Progress reset");
    Ok(())
}

fn cmd_profile_show(session: &Session) -> Result<()> {
    let profile = session.nutrition().profile();
    let offsets = &session.config().nutrition;

    print_header("NUTRITION PROFILE");
    let show = |v: Option<f64>, unit: &str| {
        v.map(|v| format!("{} {}", v, unit))
            .unwrap_or_else(|| "not set".into())
    };
    println!("  weight:   {}", show(profile.weight_kg, "kg"));
    println!("  height:   {}", show(profile.height_cm, "cm"));
    println!("  age:      {}", show(profile.age.map(f64::from), "years"));
    println!("  sex:      {:?}", profile.sex);
    println!("  activity: {:?}", profile.activity);
    println!("  goal:     {}", profile.goal);
    println!();

    match nutrition::macro_targets(profile, offsets) {
        Ok(targets) => {
            println!("  BMR:      {:.0} kcal", nutrition::bmr(profile)?);
            println!("  TDEE:     {:.0} kcal", nutrition::tdee(profile)?);
            println!("  Target:   {:.0} kcal", targets.calories);
            println!(
                "  Macros:   {:.0} g protein · {:.0} g carbs · {:.0} g fat",
                targets.protein_g, targets.carbs_g, targets.fat_g
            );
        }
        Err(Error::InvalidInput(msg)) => {
            println!("  Targets unavailable: {}", msg);
        }
        Err(e) => return Err(e),
    }
    println!();
    Ok(())
}

fn cmd_meal_list(session: &Session, date: NaiveDate) -> Result<()> {
    let log = session.nutrition();
    let meals = log.meals_on(date);

    print_header(&format!("MEALS {}", date));
    if meals.is_empty() {
        println!("  No meals logged.");
    }
    for (i, meal) in meals.iter().enumerate() {
        let time = meal
            .time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".into());
        println!(
            "  {:>2}. {} {:<24} {:>6.0} kcal  P {:.0} g  C {:.0} g  F {:.0} g",
            i + 1,
            time,
            meal.label,
            meal.calories,
            meal.protein_g,
            meal.carbs_g,
            meal.fat_g
        );
    }

    let totals = log.daily_totals(date);
    println!();
    println!(
        "  Total: {:.0} kcal  P {:.0} g  C {:.0} g  F {:.0} g",
        totals.calories, totals.protein_g, totals.carbs_g, totals.fat_g
    );
    if let Ok(progress) =
        log.progress_vs_target(date, log.profile(), &session.config().nutrition)
    {
        println!(
            "  vs target: {:.0}% kcal · {:.0}% protein · {:.0}% carbs · {:.0}% fat",
            progress.calories * 100.0,
            progress.protein * 100.0,
            progress.carbs * 100.0,
            progress.fat * 100.0
        );
    }
    println!();
    Ok(())
}
