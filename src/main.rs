// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use oxiclone::{
    clone::copy::BarObserver,
    launch::open_project,
    path::default_config_path,
    CloneEnvironment, CloneSettings, Project,
};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use inquire::Confirm;
use std::{fs, path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  oxiclone [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Path to configuration file to use instead of the default.
    #[arg(short, long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let settings = load_settings(self.config)?;
        match self.command {
            Command::Create(opts) => run_create(opts, settings),
            Command::Delete(opts) => run_delete(opts, settings),
            Command::Open(opts) => run_open(opts, settings),
            Command::Status(opts) => run_status(opts, settings),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Create a linked clone of a project.
    #[command(override_usage = "oxiclone create [options]")]
    Create(CreateOptions),

    /// Delete the clone of a project.
    #[command(override_usage = "oxiclone delete [options]")]
    Delete(DeleteOptions),

    /// Open a project or its clone through the editor hub.
    #[command(override_usage = "oxiclone open [options]")]
    Open(OpenOptions),

    /// Show clone state and resolved paths of a project.
    #[command(override_usage = "oxiclone status [options]")]
    Status(StatusOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct CreateOptions {
    /// Root path of the original project, defaults to the current directory.
    #[arg(short, long, value_name = "path")]
    pub project: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct DeleteOptions {
    /// Root path of the original project, defaults to the current directory.
    #[arg(short, long, value_name = "path")]
    pub project: Option<PathBuf>,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long)]
    pub assume_yes: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct OpenOptions {
    /// Root path of the project, defaults to the current directory.
    #[arg(short, long, value_name = "path")]
    pub project: Option<PathBuf>,

    /// Open the project's counterpart instead of the project itself.
    #[arg(short = 'C', long)]
    pub counterpart: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct StatusOptions {
    /// Root path of the project, defaults to the current directory.
    #[arg(short, long, value_name = "path")]
    pub project: Option<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn load_settings(config: Option<PathBuf>) -> Result<CloneSettings> {
    let path = match config {
        Some(path) => path,
        None => default_config_path()?,
    };

    if path.is_file() {
        Ok(fs::read_to_string(path)?.parse()?)
    } else {
        Ok(CloneSettings::default())
    }
}

fn project_root(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(std::env::current_dir()?),
    }
}

fn run_create(opts: CreateOptions, settings: CloneSettings) -> Result<()> {
    let root = project_root(opts.project)?;
    let env = CloneEnvironment::host(settings);

    let mut observer = BarObserver::new(ProgressBar::new(0))?;
    let clone = env.create_clone(&root, &mut observer)?;
    observer.finish();

    println!("created clone:\n{clone}");

    Ok(())
}

fn run_delete(opts: DeleteOptions, settings: CloneSettings) -> Result<()> {
    let root = project_root(opts.project)?;
    let env = CloneEnvironment::host(settings);

    let clone_path = env
        .clone_path_of(&root)
        .ok_or_else(|| anyhow!("no clone found for project at {:?}", root.display()))?;

    let confirmed = opts.assume_yes
        || Confirm::new(&format!("delete clone at {:?}?", clone_path.display()))
            .with_default(false)
            .prompt()?;
    if !confirmed {
        return Ok(());
    }

    let deleted = env.delete_clone(&root)?;
    println!("deleted clone at {:?}", deleted.display());

    Ok(())
}

fn run_open(opts: OpenOptions, settings: CloneSettings) -> Result<()> {
    let root = project_root(opts.project)?;
    let env = CloneEnvironment::host(settings);

    let target = if opts.counterpart {
        env.counterpart_path_of(&root)
            .ok_or_else(|| anyhow!("no counterpart found for project at {:?}", root.display()))?
    } else {
        root
    };

    let hub = env
        .settings()
        .hub_path
        .clone()
        .ok_or_else(|| anyhow!("no editor hub configured, set `hub_path` in the config file"))?;

    open_project(hub, target)?;

    Ok(())
}

fn run_status(opts: StatusOptions, settings: CloneSettings) -> Result<()> {
    let root = project_root(opts.project)?;
    let env = CloneEnvironment::host(settings);
    let project = Project::new(root.as_path());

    println!("{project}");
    if env.is_clone(&root) {
        println!("  state:    clone");
        match env.original_path_of(&root) {
            Some(original) => println!("  original: {}", original.display()),
            None => println!("  original: not found"),
        }
    } else {
        println!("  state:    original");
        match env.clone_path_of(&root) {
            Some(clone) => println!("  clone:    {}", clone.display()),
            None => println!("  clone:    not created"),
        }
    }

    Ok(())
}
