use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use formrep_core::sessions::{export_csv, read_sessions, summarize};
use formrep_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "formrep")]
#[command(about = "Rep counting and workout scheduling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretend the current time is this (YYYY-MM-DDTHH:MM)
    #[arg(long, global = true, value_parser = parse_datetime)]
    now: Option<NaiveDateTime>,

    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count repetitions in a recorded pose stream
    Count {
        /// Exercise (bicep_curl, push_up, squat)
        #[arg(long, value_parser = parse_exercise)]
        exercise: ExerciseKind,

        /// Pose stream file, one JSON landmark array per line
        #[arg(long)]
        poses: PathBuf,

        /// Frame rate of the recording, used for session duration
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Show the count without logging the session
        #[arg(long)]
        dry_run: bool,
    },

    /// Suggest a workout slot
    Suggest {
        /// Fitness level (beginner, intermediate, advanced)
        #[arg(long)]
        level: Option<String>,

        /// Target date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Workout length in minutes
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        duration: Option<u32>,

        /// Booking being rescheduled, ignored when finding conflicts
        #[arg(long)]
        exclude: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a time is free
    Check {
        /// Proposed start (YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_datetime)]
        at: NaiveDateTime,

        /// Workout length in minutes
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        duration: Option<u32>,

        /// Booking being rescheduled, ignored when finding conflicts
        #[arg(long)]
        exclude: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Book a workout if the slot is free
    Book {
        /// Start (YYYY-MM-DDTHH:MM)
        #[arg(long, value_parser = parse_datetime)]
        at: NaiveDateTime,

        /// Display title
        #[arg(long)]
        title: String,

        /// Workout length in minutes
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        duration: Option<u32>,
    },

    /// Summarize logged sessions
    Stats {
        /// Also append all sessions to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("invalid date-time {:?}, expected YYYY-MM-DDTHH:MM", s))
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {:?}: {}", s, e))
}

fn parse_exercise(s: &str) -> std::result::Result<ExerciseKind, String> {
    s.parse::<ExerciseKind>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    formrep_core::logging::init_with_level(if cli.verbose { "debug" } else { "warn" });

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    // One reading of the clock per invocation
    let clock = FixedClock(cli.now.unwrap_or_else(|| SystemClock.now()));

    match cli.command {
        Commands::Count {
            exercise,
            poses,
            fps,
            dry_run,
        } => cmd_count(&data_dir, exercise, &poses, fps, dry_run, &config, &clock),
        Commands::Suggest {
            level,
            date,
            duration,
            exclude,
            json,
        } => {
            let level = level
                .as_deref()
                .map(FitnessLevel::parse_lenient)
                .unwrap_or(config.schedule.fitness_level);
            let date = date.unwrap_or_else(|| clock.now().date());
            let duration = duration.unwrap_or(config.schedule.default_duration_minutes);
            cmd_suggest(&data_dir, level, date, duration, exclude.as_deref(), json, &clock)
        }
        Commands::Check {
            at,
            duration,
            exclude,
            json,
        } => {
            let duration = duration.unwrap_or(config.schedule.default_duration_minutes);
            cmd_check(&data_dir, at, duration, exclude.as_deref(), json, &clock)
        }
        Commands::Book {
            at,
            title,
            duration,
        } => {
            let duration = duration.unwrap_or(config.schedule.default_duration_minutes);
            cmd_book(&data_dir, at, title, duration, &clock)
        }
        Commands::Stats { csv } => cmd_stats(&data_dir, csv.as_deref()),
    }
}

fn bookings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("bookings.jsonl")
}

fn sessions_path(data_dir: &Path) -> PathBuf {
    data_dir.join("sessions.jsonl")
}

fn cmd_count(
    data_dir: &Path,
    exercise: ExerciseKind,
    poses: &Path,
    fps: u32,
    dry_run: bool,
    config: &Config,
    clock: &FixedClock,
) -> Result<()> {
    let frames = read_pose_stream(poses)?;
    let frame_count = frames.len();
    let kcal_per_rep = config.calories.per_rep(exercise);

    let mut counter = RepCounter::new(exercise).with_calories_per_rep(kcal_per_rep);
    let summary = replay(
        &mut counter,
        frames,
        config.counter.skip_unstable_frames,
        config.counter.stability_threshold,
    );

    println!("{}: {} reps", exercise, summary.count);
    println!(
        "  Frames: {} processed, {} skipped",
        summary.frames_processed, summary.frames_skipped
    );
    println!("  Calories: ~{:.1} kcal", summary.calories);
    if let Some(last) = summary.feedback.last() {
        println!("  Last feedback: {}", last);
    }

    if dry_run {
        println!("\n[Dry run - not logging session]");
        return Ok(());
    }

    let started_at = clock.now();
    let elapsed_ms = (frame_count as i64 * 1000) / i64::from(fps.max(1));
    let session = WorkoutSession {
        id: uuid::Uuid::new_v4(),
        exercise,
        started_at,
        finished_at: started_at + Duration::milliseconds(elapsed_ms),
        reps: summary.count,
        frames_processed: summary.frames_processed,
        frames_skipped: summary.frames_skipped,
        calories: summary.calories,
    };

    let mut log = JsonlSessionLog::new(sessions_path(data_dir));
    log.append(&session)?;

    println!("\n✓ Session logged!");
    Ok(())
}

fn cmd_suggest(
    data_dir: &Path,
    level: FitnessLevel,
    date: NaiveDate,
    duration: u32,
    exclude: Option<&str>,
    json: bool,
    clock: &FixedClock,
) -> Result<()> {
    let bookings = JsonlBookingStore::new(bookings_path(data_dir)).list()?;
    let suggestion = suggest_optimal_time(level, date, duration, &bookings, exclude, clock);

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
        return Ok(());
    }

    match suggestion {
        Some(s) => {
            println!("Suggested: {}", s.time.format("%Y-%m-%d %H:%M"));
            println!("  {}", s.reason);
        }
        None => println!("No workout slot available."),
    }
    Ok(())
}

fn cmd_check(
    data_dir: &Path,
    at: NaiveDateTime,
    duration: u32,
    exclude: Option<&str>,
    json: bool,
    clock: &FixedClock,
) -> Result<()> {
    let bookings = JsonlBookingStore::new(bookings_path(data_dir)).list()?;
    let result = check_availability(at, duration, &bookings, exclude, clock);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display_availability(&result);
    }
    Ok(())
}

fn cmd_book(
    data_dir: &Path,
    at: NaiveDateTime,
    title: String,
    duration: u32,
    clock: &FixedClock,
) -> Result<()> {
    let mut store = JsonlBookingStore::new(bookings_path(data_dir));
    let bookings = store.list()?;
    let result = check_availability(at, duration, &bookings, None, clock);

    if !result.available {
        display_availability(&result);
        return Err(Error::InvalidInput(format!(
            "cannot book {}",
            at.format("%Y-%m-%d %H:%M")
        )));
    }

    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        start: at,
        duration_minutes: Some(duration),
        completed: false,
    };
    store.append(&booking)?;

    println!(
        "✓ Booked \"{}\" at {} ({} min)",
        booking.title,
        at.format("%Y-%m-%d %H:%M"),
        duration
    );
    println!("  id: {}", booking.id);
    Ok(())
}

fn cmd_stats(data_dir: &Path, csv: Option<&Path>) -> Result<()> {
    let sessions = read_sessions(&sessions_path(data_dir))?;

    if sessions.is_empty() {
        println!("No sessions logged yet.");
        return Ok(());
    }

    for (exercise, stats) in summarize(&sessions) {
        println!(
            "{}: {} sessions, {} reps (best {}), ~{:.1} kcal",
            exercise, stats.sessions, stats.total_reps, stats.best_reps, stats.total_calories
        );
    }

    if let Some(csv_path) = csv {
        let count = export_csv(&sessions, csv_path)?;
        println!("✓ Exported {} sessions to {}", count, csv_path.display());
    }
    Ok(())
}

fn display_availability(result: &TimeAvailabilityResult) {
    if result.available {
        println!("✓ {}", result.message.as_deref().unwrap_or("Available"));
        return;
    }

    println!("✗ {}", result.message.as_deref().unwrap_or("Not available"));
    for conflict in result.conflicts.iter().flatten() {
        println!(
            "  - {} ({} - {})",
            conflict.title,
            conflict.start.format("%H:%M"),
            conflict.end.format("%H:%M")
        );
    }
    if let Some(next) = result.next_available {
        println!("  Next available: {}", next.format("%Y-%m-%d %H:%M"));
    }
}
