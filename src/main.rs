// SPDX-FileCopyrightText: 2026 The tabsmith authors
// SPDX-License-Identifier: LicenseRef-Tabsmith-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of tabsmith and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! tabsmith CLI entrypoint.
//!
//! Most subcommands work on one session container. Editing subcommands write to `-o <out>`
//! when given, otherwise they overwrite the input container (backing it up first when backups
//! are enabled in the settings file). `profiles`, `import` and `restore` work on Firefox
//! profile directories.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use tabsmith::clean::TitleCleaner;
use tabsmith::config::{Settings, DEFAULT_BACKUP_DIR};
use tabsmith::query::ExtrasBundle;
use tabsmith::store::profile::{self, ImportRecord};
use tabsmith::store::{Profile, ProfileError, RestoreOptions, RestoreTarget, SessionFile};
use tabsmith::{LoadOutcome, SaveOutcome, SessionEngine};

#[derive(Debug, Parser)]
#[command(name = "tabsmith")]
#[command(about = "Inspect and edit Firefox session containers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print window, tab and group counts
    Info { file: PathBuf },

    /// List live tabs in flat order
    Tabs {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// List closed tabs, closed groups, closed windows and saved groups
    Extras {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Decode a container to JSON (stdout unless -o is given)
    Decode {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Encode a decoded JSON session into a container
    Encode {
        json: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Move a tab into a group, across windows when the group lives elsewhere
    Move(MoveArgs),

    /// Remove configured fragments from every tab title
    #[command(name = "clean-titles")]
    CleanTitles(CleanTitlesArgs),

    /// List Firefox profiles and their session containers
    Profiles {
        /// Profiles directory; overrides `profiles_root`
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Copy a profile's session containers into a new dated backup directory
    Import {
        /// Profile directory name, or part of it
        profile: String,
        #[arg(long)]
        root: Option<PathBuf>,
        /// Where the backup directory is created
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace a profile's session container with an edited one
    Restore(RestoreArgs),
}

#[derive(Debug, Args)]
struct RestoreArgs {
    file: PathBuf,
    /// Profile name or directory; defaults to the profile recorded next to the container
    #[arg(long)]
    profile: Option<String>,
    /// sessionstore, recovery or previous
    #[arg(long, default_value_t = RestoreTarget::Sessionstore)]
    target: RestoreTarget,
    /// Replace even when the profile's container is newer or startup restore is off
    #[arg(long)]
    force: bool,
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct MoveArgs {
    file: PathBuf,
    /// Tab position as listed by `tabs`
    #[arg(long)]
    tab: usize,
    /// Target group name, or `Ungrouped`
    #[arg(long)]
    group: String,
    /// Target window position
    #[arg(long)]
    window: Option<usize>,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CleanTitlesArgs {
    file: PathBuf,
    /// Fragment to remove; repeatable. Replaces `title_patterns` from the settings file
    #[arg(long = "pattern")]
    patterns: Vec<String>,
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

fn profiles_root(root: Option<PathBuf>, settings: &Settings) -> Result<PathBuf, ProfileError> {
    root.or_else(|| settings.profiles_root()).ok_or(ProfileError::NoProfilesRoot)
}

/// A name that is an existing directory is used as is; anything else is looked up under the
/// profiles root.
fn resolve_profile(
    name: &str,
    root: Option<PathBuf>,
    settings: &Settings,
) -> Result<Profile, ProfileError> {
    let path = Path::new(name);
    if path.is_dir() {
        return Profile::open(path);
    }
    profile::find(&profiles_root(root, settings)?, name)
}

fn print_profiles(root: &Path, profiles: &[Profile]) {
    println!("{}", root.display());
    for profile in profiles {
        let marker = if profile.has_session() { ' ' } else { '-' };
        println!("{marker} {}", profile.name);
        for slot in &profile.slots {
            let modified = slot
                .modified
                .map(|at| at.to_string())
                .unwrap_or_else(|| "?".to_owned());
            println!("    {:<13} {:>10} B  {modified}", slot.target.name(), slot.size);
        }
    }
}

fn print_info(windows: usize, outcome: &LoadOutcome, extras: &ExtrasBundle) {
    println!("windows:         {windows}");
    println!("tabs:            {}", outcome.tabs.len());
    println!("skipped tabs:    {}", outcome.skipped);
    println!("groups:          {}", outcome.group_infos.len());
    print_extras(extras);
}

fn print_extras(extras: &ExtrasBundle) {
    println!("closed tabs:     {}", extras.closed_tabs.len());
    println!("closed groups:   {}", extras.closed_groups.len());
    println!("closed windows:  {}", extras.closed_windows.len());
    println!("saved groups:    {}", extras.saved_groups.len());
    println!("extracted tabs:  {}", extras.all_tabs().count());
    if extras.skipped > 0 {
        println!("skipped entries: {}", extras.skipped);
    }
}

fn print_tabs(outcome: &LoadOutcome) {
    for (position, tab) in outcome.tabs.iter().enumerate() {
        let mut flags = String::new();
        if tab.pinned {
            flags.push('p');
        }
        if tab.hidden {
            flags.push('h');
        }
        println!(
            "{position:>4}  w{:<2} {:<3} [{}] {}  {}",
            tab.window_index, flags, tab.group_name, tab.title, tab.url
        );
    }
}

fn print_saved(outcome: &SaveOutcome) {
    if let Some(backup) = &outcome.backup {
        println!("backup: {}", backup.dir.display());
    }
    println!(
        "saved {} ({} tabs, {} omitted)",
        outcome.path.display(),
        outcome.sync.tabs,
        outcome.sync.omitted
    );
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { file } => {
            let mut engine = SessionEngine::new(settings);
            let outcome = engine.load(&file)?;
            let windows = engine.reconciler()?.document().windows().len();
            print_info(windows, &outcome, &engine.extras()?);
        }
        Commands::Tabs { file, json } => {
            let mut engine = SessionEngine::new(settings);
            let outcome = engine.load(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.tabs)?);
            } else {
                print_tabs(&outcome);
            }
        }
        Commands::Extras { file, json } => {
            let mut engine = SessionEngine::new(settings);
            engine.load(&file)?;
            let extras = engine.extras()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&extras)?);
            } else {
                print_extras(&extras);
            }
        }
        Commands::Decode {
            file,
            output,
            compact,
        } => {
            let store = SessionFile::new(&file).with_durability(settings.durability);
            let document = store.load()?;
            match output {
                Some(out) => store.export_json(&document, &out, !compact)?,
                None if compact => println!("{}", serde_json::to_string(&document.to_value())?),
                None => println!("{}", serde_json::to_string_pretty(&document.to_value())?),
            }
        }
        Commands::Encode { json, output } => {
            let document = SessionFile::import_json(&json)?;
            SessionFile::new(&output)
                .with_durability(settings.durability)
                .with_verification(settings.verify_before_write)
                .save(&document)?;
            println!("encoded {}", output.display());
        }
        Commands::Move(args) => {
            let mut engine = SessionEngine::new(settings);
            let outcome = engine.load(&args.file)?;
            let tab = outcome.tabs.get(args.tab).ok_or_else(|| {
                format!(
                    "no tab at position {} ({} tabs listed)",
                    args.tab,
                    outcome.tabs.len()
                )
            })?;
            let applied = engine.move_to_group(tab.raw_tab, &args.group, args.window)?;
            log::info!("move applied (rev={})", applied.rev);
            print_saved(&engine.sync_and_save(args.output.as_deref())?);
        }
        Commands::CleanTitles(args) => {
            let cleaner = if args.patterns.is_empty() {
                settings.title_cleaner()
            } else {
                TitleCleaner::new(&args.patterns)
            };
            if cleaner.is_empty() {
                return Err("no title patterns given (use --pattern or title_patterns)".into());
            }
            let mut engine = SessionEngine::new(settings);
            engine.load(&args.file)?;
            let applied = engine.clean_titles(&cleaner)?;
            println!("cleaned {} title(s)", applied.delta.updated.len());
            print_saved(&engine.sync_and_save(args.output.as_deref())?);
        }
        Commands::Profiles { root } => {
            let root = profiles_root(root, &settings)?;
            print_profiles(&root, &profile::discover(&root)?);
        }
        Commands::Import {
            profile,
            root,
            output,
        } => {
            let profile = resolve_profile(&profile, root, &settings)?;
            let output = output
                .or_else(|| settings.backup.dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
            let report = profile::import(&profile, &output, settings.durability)?;
            for (target, backup) in &report.files {
                println!("{:<13} {}", target.name(), backup.copy.display());
            }
            println!("imported {} into {}", profile.name, report.dir.display());
        }
        Commands::Restore(args) => {
            let dir = args.file.parent().unwrap_or_else(|| Path::new("."));
            let record = ImportRecord::read(dir)?;
            let name = match (&args.profile, &record) {
                (Some(name), _) => name.clone(),
                (None, Some(record)) => record.profile.clone(),
                (None, None) => {
                    return Err("no profile given and no profile.txt next to the container".into())
                }
            };
            let profile = resolve_profile(&name, args.root, &settings)?;
            let options = RestoreOptions {
                imported_at: record.and_then(|record| record.imported_at),
                force: args.force,
                durability: settings.durability,
                work_dir: None,
            };
            let report = profile::restore(&args.file, &profile.dir, args.target, &options)?;
            if let Some(backup) = &report.replaced_backup {
                println!("previous container kept at {}", backup.display());
            }
            println!("restored {} as {}", report.target_path.display(), report.target);
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("tabsmith: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
