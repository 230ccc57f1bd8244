mod app;
mod clipboard;
mod config;
mod export;
mod favorites;
mod logging;
mod matrix;
mod model;
mod search;
mod simulation;

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use favorites::{FavoriteKey, FavoritesIndex};
use model::{Catalog, Platform, Tab};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "cmdref", version, about = "Terminal commands explorer")]
struct Cli {
    /// Override config path. If omitted, cmdref checks ./cmdref.toml, ./.cmdref.toml, and then ~/.config/cmdref/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tab to open first (linux, windows, macos, favorites)
    #[arg(short, long)]
    tab: Option<Tab>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Mark a command as favorite for this session by flat key (Linux n, Windows 1000+n, macOS 2000+n)
    #[arg(long = "favorite", value_name = "KEY")]
    favorites: Vec<u32>,

    /// Print the command catalog as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Restrict --dump to one platform
    #[arg(long, requires = "dump")]
    platform: Option<Platform>,

    /// Write an example config to the global config path and exit
    #[arg(long)]
    init_config: bool,

    /// Overwrite an existing config with --init-config
    #[arg(long, requires = "init_config")]
    force: bool,
}

#[derive(Serialize)]
struct PlatformDump<'a> {
    platform: Platform,
    commands: &'a [model::CommandRecord],
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let catalog = Catalog::builtin()?;

    if cli.init_config {
        let path = config::global_config_path()?;
        config::write_example_config(&path, cli.force)?;
        println!("Wrote example config: {}", path.display());
        return Ok(());
    }

    if cli.dump {
        let platforms = match cli.platform {
            Some(platform) => vec![platform],
            None => Platform::ALL.to_vec(),
        };
        let dump: Vec<PlatformDump<'_>> = platforms
            .into_iter()
            .map(|platform| PlatformDump {
                platform,
                commands: catalog.records_for(platform),
            })
            .collect();
        let json = serde_json::to_string_pretty(&dump).context("failed to serialize catalog")?;
        println!("{json}");
        return Ok(());
    }

    let cwd = env::current_dir()?;
    let loaded = config::load(&cwd, cli.config.as_deref())?;

    if let Some(path) = cli.log_file.as_ref().or(loaded.config.logging.file.as_ref()) {
        logging::init(path, &loaded.config.logging.level)?;
    }
    tracing::info!(
        commands = catalog.len(),
        config = ?loaded.path,
        "starting cmdref"
    );

    let mut favorites = FavoritesIndex::new();
    for key in cli.favorites {
        favorites
            .add_key(FavoriteKey(key))
            .with_context(|| format!("invalid --favorite {key}"))?;
    }

    let start_tab = match cli.tab {
        Some(tab) => tab,
        None => loaded.config.ui.start_tab()?,
    };

    app::run_tui(
        catalog,
        favorites,
        app::Settings {
            start_tab,
            theme: loaded.config.ui.theme,
            animation_enabled: loaded.config.animation.enabled,
            tick_rate: loaded.config.animation.tick_rate(),
            matrix: loaded.config.animation.matrix_settings(),
            default_output_file: loaded.config.output.default_file.clone(),
            cwd,
        },
    )
}
