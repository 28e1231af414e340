// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI entry point for asylum-keybind-manager
//!
//! Every mutating command reads the config files, applies one change and
//! writes both files back before exiting.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use asylum_keybind_manager::config::LauncherSettings;
use asylum_keybind_manager::controller::{Controller, FovSlider};
use asylum_keybind_manager::core::{split_label, Action, TokenRegistry};

#[derive(Parser)]
#[command(name = "asylum-keybind-manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the launcher settings file
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Game config directory, overriding the settings file
    #[arg(short, long, global = true)]
    config_dir: Option<String>,

    /// Log file operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List current bindings and settings
    List {
        /// Only show bindings whose action or key contains this text
        query: Option<String>,
    },

    /// List action names accepted by `bind` and `unbind`
    Actions,

    /// Bind a key to an action, e.g. `bind crouch "Ctrl + C"`
    Bind {
        action: String,
        label: String,
    },

    /// Remove the key from an action
    Unbind {
        action: String,
    },

    /// Change mouse settings
    Mouse {
        #[arg(long)]
        sensitivity: Option<u32>,

        #[arg(long)]
        smoothing: Option<bool>,
    },

    /// Set the FOV applied by one of the custom FOV keys
    Fov {
        #[arg(value_enum)]
        slider: SliderArg,
        value: u32,
    },

    /// Rewrite both config files from their current contents
    Apply,

    /// Restore both config files from the packaged defaults
    Reset,

    /// Check whether a key can be bound
    CheckKey {
        key: String,
    },

    /// List config backups
    Backups,
}

#[derive(Clone, Copy, ValueEnum)]
enum SliderArg {
    A,
    B,
}

impl From<SliderArg> for FovSlider {
    fn from(arg: SliderArg) -> Self {
        match arg {
            SliderArg::A => FovSlider::A,
            SliderArg::B => FovSlider::B,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Actions => list_actions(),
        Commands::CheckKey { ref key } => check_key(key),
        ref command => {
            let mut controller = open_controller(&cli)?;
            run(&mut controller, command)?;
        }
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_controller(cli: &Cli) -> anyhow::Result<Controller> {
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(LauncherSettings::default_path);
    let mut settings = LauncherSettings::load(&settings_path)?;
    if let Some(dir) = &cli.config_dir {
        settings.config_dir = dir.clone();
    }

    Controller::open(&settings)
        .with_context(|| format!("Failed to load config from {}", settings.config_dir().display()))
}

fn run(controller: &mut Controller, command: &Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { query } => list_bindings(controller, query.as_deref().unwrap_or("")),
        Commands::Bind { action, label } => {
            let action = parse_action(action)?;
            let revoked = controller.assign(action, label)?;
            controller.apply()?;

            println!("{} {} → {}", "✓".green(), action, controller.bindings().label(action).cyan());
            for holder in revoked {
                println!("  {} {} is now {}", "!".yellow(), holder, "Unbound".red());
            }
        }
        Commands::Unbind { action } => {
            let action = parse_action(action)?;
            controller.unbind(action);
            controller.apply()?;
            println!("{} {} → {}", "✓".green(), action, "Unbound".red());
        }
        Commands::Mouse { sensitivity, smoothing } => {
            if sensitivity.is_none() && smoothing.is_none() {
                return Err(anyhow!("Nothing to change: pass --sensitivity and/or --smoothing"));
            }
            if let Some(value) = sensitivity {
                controller.set_mouse_sensitivity(*value)?;
            }
            if let Some(enabled) = smoothing {
                controller.set_mouse_smoothing(*enabled);
            }
            controller.apply_mouse()?;
            println!("{} Mouse settings saved", "✓".green());
        }
        Commands::Fov { slider, value } => {
            controller.set_fov((*slider).into(), *value)?;
            controller.apply()?;
            println!("{} FOV {} saved", "✓".green(), value);
        }
        Commands::Apply => {
            controller.apply()?;
            println!("{} Both config files written", "✓".green());
        }
        Commands::Reset => {
            controller.reset_to_defaults()?;
            println!("{} Config restored to defaults", "✓".green());
        }
        Commands::Backups => list_backups(controller)?,
        Commands::Actions | Commands::CheckKey { .. } => {}
    }

    Ok(())
}

fn parse_action(name: &str) -> anyhow::Result<Action> {
    Action::from_name(name).ok_or_else(|| {
        anyhow!("Unknown action '{}' (run `asylum-keybind-manager actions` for the list)", name)
    })
}

/// List bindings in presentation order, unbound ones highlighted
fn list_bindings(controller: &Controller, query: &str) {
    let files = controller.files();
    println!("{}", format!("Bindings from: {}\n", files.primary().display()).bold());

    let bindings = controller.find_bindings(query);
    for binding in &bindings {
        let label = if binding.is_assigned() {
            binding.label.cyan().bold()
        } else {
            binding.label.red()
        };
        println!("{:<22} → {}", binding.action.display_name(), label);
    }

    let scalars = controller.scalars();
    let show = |value: Option<u32>| value.map_or_else(|| "?".to_string(), |v| v.to_string());
    println!();
    println!("{:<22} → {}", "Mouse Sensitivity", show(scalars.mouse_sensitivity));
    println!("{:<22} → {}", "Mouse Smoothing", scalars.mouse_smoothing);
    println!("{:<22} → {}", "Custom FOV 1", show(scalars.fov_slider_a));
    println!("{:<22} → {}", "Custom FOV 2", show(scalars.fov_slider_b));

    let unbound = controller.bindings().unbound_actions();
    if unbound.is_empty() {
        println!("\n{} {} bindings, all assigned", "✓".green(), bindings.len());
    } else {
        println!("\n{} {} action(s) have no key", "⚠".yellow(), unbound.len());
    }
}

fn list_actions() {
    for action in Action::ALL {
        println!("{:<20} {}", action.name().green(), action.display_name());
    }
}

/// Exits with status 1 if the key is on the deny-list
fn check_key(label: &str) {
    let registry = TokenRegistry::standard();
    let (_, key) = split_label(label);

    if registry.is_banned(key) {
        println!("{} '{}' is reserved and cannot be bound", "✗".red().bold(), key);
        std::process::exit(1);
    }

    println!(
        "{} '{}' can be bound (engine token {})",
        "✓".green().bold(),
        key,
        registry.to_config(key).cyan()
    );
}

fn list_backups(controller: &Controller) -> anyhow::Result<()> {
    let Some(dir) = controller.files().backup_dir() else {
        println!("{}", "Backups are disabled in the launcher settings".yellow());
        return Ok(());
    };

    let backups = controller.backups()?;
    if backups.is_empty() {
        println!("No backups in {}", dir.display());
        return Ok(());
    }

    println!("{}", format!("Backups in: {}\n", dir.display()).bold());
    for path in &backups {
        if let Some(name) = path.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    println!("\n{} Total: {} backups", "✓".green(), backups.len());
    Ok(())
}
