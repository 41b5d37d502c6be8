use clap::{Parser, Subcommand};
use levelup_core::trend::{net_change, weight_series, write_csv};
use levelup_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "levelup")]
#[command(about = "Turn workouts, meals and check-ins into RPG character progression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show engine logs (same as RUST_LOG=info)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show level, EXP, coins and stats (default)
    Status,

    /// Log a workout
    Workout {
        /// Exercise line as NAME:SETS:REPS:WEIGHT_KG:MINUTES (repeatable)
        #[arg(long = "set", required = true, value_parser = parse_exercise_set)]
        sets: Vec<ExerciseSet>,
    },

    /// Log a meal
    Diet {
        #[arg(long, default_value_t = 0.0)]
        calories: f64,
        #[arg(long, default_value_t = 0.0)]
        protein: f64,
        #[arg(long, default_value_t = 0.0)]
        carbs: f64,
        #[arg(long, default_value_t = 0.0)]
        fat: f64,
    },

    /// Record body weight (kg)
    Weight {
        weight: f64,
        /// Body-fat percentage
        #[arg(long)]
        body_fat: Option<f64>,
    },

    /// Attach a progress photo
    Photo { file: PathBuf },

    /// List quests
    Quests,

    /// Complete a quest
    Quest { id: String },

    /// Show or change game settings
    Settings {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        calorie_goal: Option<f64>,
        /// EXP per workout minute
        #[arg(long)]
        minutes: Option<f64>,
        /// EXP per kg of volume
        #[arg(long)]
        total_weight: Option<f64>,
        /// EXP per gram of protein
        #[arg(long)]
        protein: Option<f64>,
    },

    /// Export the save as pretty JSON
    Export {
        /// Output directory (defaults to the configured export dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a compact copy of the save
    Duplicate {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the save with an exported file
    Import { file: PathBuf },

    /// Reset all progress to the starting state
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show the weight trend
    Trend {
        /// Also write the series as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show the config file location, optionally writing defaults there
    Config {
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        levelup_core::logging::init_with_level("info");
    } else {
        levelup_core::logging::init();
    }

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());

    tracing::debug!("Using data directory {:?}", data_dir);

    let mut store = FileStore::in_dir(&data_dir);
    let mut engine = Engine::new(SaveState::load_or_default(&store)?);

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => cmd_status(&engine),
        Commands::Workout { sets } => {
            let outcome = engine.log_workout(sets)?;
            store.save(engine.state())?;
            println!("✓ Workout logged: +{} EXP", outcome.exp_gained.round());
            announce(&engine, &outcome.events);
            Ok(())
        }
        Commands::Diet {
            calories,
            protein,
            carbs,
            fat,
        } => {
            let outcome = engine.log_diet(Meal {
                calories,
                protein,
                carbs,
                fat,
            })?;
            store.save(engine.state())?;
            println!("✓ Diet logged: +{} EXP", outcome.exp_gained.round());
            announce(&engine, &outcome.events);
            Ok(())
        }
        Commands::Weight { weight, body_fat } => {
            engine.log_weight(weight, body_fat)?;
            store.save(engine.state())?;
            println!("✓ Weight logged: {} kg", weight);
            Ok(())
        }
        Commands::Photo { file } => {
            let bytes = std::fs::read(&file)?;
            let outcome = engine.log_photo(PhotoBlob::new(guess_mime(&file), bytes));
            store.save(engine.state())?;
            println!("✓ Photo added ({} bytes)", outcome.record.image.bytes.len());
            Ok(())
        }
        Commands::Quests => cmd_quests(&engine),
        Commands::Quest { id } => cmd_quest(&mut engine, &mut store, &id),
        Commands::Settings {
            name,
            calorie_goal,
            minutes,
            total_weight,
            protein,
        } => {
            let mut settings = engine.state().settings.clone();
            let changed = name.is_some()
                || calorie_goal.is_some()
                || minutes.is_some()
                || total_weight.is_some()
                || protein.is_some();

            if let Some(name) = name {
                settings.display_name = name;
            }
            if let Some(goal) = calorie_goal {
                settings.calorie_goal = goal;
            }
            if let Some(m) = minutes {
                settings.exp_multipliers.minutes = m;
            }
            if let Some(m) = total_weight {
                settings.exp_multipliers.total_weight = m;
            }
            if let Some(m) = protein {
                settings.exp_multipliers.protein = m;
            }

            if changed {
                engine.update_settings(settings)?;
                store.save(engine.state())?;
                println!("✓ Settings saved");
            }
            print_settings(&engine.state().settings);
            Ok(())
        }
        Commands::Export { out } => {
            let (name, bytes) = engine.export()?;
            let dir = out.unwrap_or_else(|| config.export.dir.clone());
            let path = write_output(&dir, &name, &bytes)?;
            println!("✓ Exported to {}", path.display());
            Ok(())
        }
        Commands::Duplicate { out } => {
            let (name, bytes) = engine.duplicate()?;
            let dir = out.unwrap_or_else(|| config.export.dir.clone());
            let path = write_output(&dir, &name, &bytes)?;
            println!("✓ Save duplicated to {}", path.display());
            Ok(())
        }
        Commands::Import { file } => {
            let bytes = std::fs::read(&file)?;
            if let Err(e) = engine.import(&bytes) {
                eprintln!("Import failed: invalid file format.");
                return Err(e);
            }
            store.save(engine.state())?;
            println!(
                "✓ Import successful: level {}, {} coins",
                engine.state().level,
                engine.state().coins
            );
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                println!("Refusing to reset without --yes. Nothing changed.");
                return Ok(());
            }
            engine.reset();
            store.save(engine.state())?;
            println!("✓ Progress reset");
            Ok(())
        }
        Commands::Trend { csv } => cmd_trend(&engine, csv),
        Commands::Config { write } => {
            let path = Config::default_config_path();
            if write {
                config.save_to(&path)?;
                println!("✓ Wrote config");
            }
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn cmd_status(engine: &Engine) -> Result<()> {
    let state = engine.state();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}  ·  Level {}", state.settings.display_name, state.level);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  EXP    {} / {}  ({:.0}%)",
        state.exp.round(),
        state.next_level_exp,
        engine.exp_progress()
    );
    println!("  Coins  {}", state.coins);
    println!();
    for (attribute, value) in state.stats.iter() {
        println!("  {:<13}{}", attribute.name(), value.round());
    }
    println!();
    println!(
        "  {} workouts · {} meals · {} weigh-ins · {} photos",
        state.workouts.len(),
        state.diet.len(),
        state.weights.len(),
        state.photos.len()
    );
    if !state.inventory.is_empty() {
        println!("  Inventory: {}", state.inventory.join(", "));
    }
    println!();
    Ok(())
}

fn cmd_quests(engine: &Engine) -> Result<()> {
    for quest in &engine.state().quests {
        let mark = if quest.completed { "✓" } else { " " };
        let kind = match quest.kind {
            QuestKind::Daily => "daily",
            QuestKind::Weekly => "weekly",
        };
        println!(
            "[{}] {:<5} {:<7} {}  (+{} EXP, +{} coins)",
            mark, quest.id, kind, quest.title, quest.reward_exp, quest.reward_coins
        );
    }
    Ok(())
}

fn cmd_quest(engine: &mut Engine, store: &mut FileStore, id: &str) -> Result<()> {
    // Explain no-ops instead of silently doing nothing
    if let Err(e) = engine.check_quest(id) {
        println!("Nothing to do: {}", e);
        return Ok(());
    }

    let events = engine.complete_quest(id);
    store.save(engine.state())?;
    announce(engine, &events);
    Ok(())
}

fn cmd_trend(engine: &Engine, csv: Option<PathBuf>) -> Result<()> {
    let series = weight_series(&engine.state().weights);
    if series.is_empty() {
        println!("No weigh-ins yet.");
        return Ok(());
    }

    for point in &series {
        match point.body_fat {
            Some(bf) => println!("  {}  {:>6.1} kg  {:>4.1}%", point.date.format("%Y-%m-%d"), point.weight, bf),
            None => println!("  {}  {:>6.1} kg", point.date.format("%Y-%m-%d"), point.weight),
        }
    }
    if let Some(change) = net_change(&series) {
        println!("  Net change: {:+.1} kg", change);
    }

    if let Some(path) = csv {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&path)?;
        let count = write_csv(&series, file)?;
        println!("✓ Wrote {} points to {}", count, path.display());
    }
    Ok(())
}

/// Print the events returned by an engine operation
fn announce(engine: &Engine, events: &[Event]) {
    for event in events {
        match event {
            Event::QuestCompleted { id } => {
                if let Some(quest) = engine.quest(id) {
                    println!(
                        "✓ Quest complete: {} +{} EXP, +{} coins",
                        quest.title, quest.reward_exp, quest.reward_coins
                    );
                }
            }
            Event::LeveledUp { to } => {
                println!("★ Level up! You reached level {}.", to);
            }
        }
    }
}

fn print_settings(settings: &Settings) {
    println!("  Name          {}", settings.display_name);
    println!("  Calorie goal  {}", settings.calorie_goal);
    println!(
        "  EXP per minute {} · per kg {} · per g protein {}",
        settings.exp_multipliers.minutes,
        settings.exp_multipliers.total_weight,
        settings.exp_multipliers.protein
    );
}

fn write_output(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn parse_exercise_set(s: &str) -> std::result::Result<ExerciseSet, String> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let [exercise, sets, reps, weight, minutes] = parts.as_slice() else {
        return Err(format!(
            "expected NAME:SETS:REPS:WEIGHT:MINUTES, got {:?}",
            s
        ));
    };

    Ok(ExerciseSet {
        exercise: exercise.to_string(),
        sets: sets.parse().map_err(|e| format!("sets: {}", e))?,
        reps: reps.parse().map_err(|e| format!("reps: {}", e))?,
        weight: weight.parse().map_err(|e| format!("weight: {}", e))?,
        minutes: minutes.parse().map_err(|e| format!("minutes: {}", e))?,
    })
}
