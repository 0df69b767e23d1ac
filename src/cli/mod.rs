//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `mindful chat`: interactive Mindful Chat session (see [`repl`])
//! - `mindful recommend`: PC game recommendations for a hardware spec
//! - `mindful settings show|theme|font-size|save-history`
//! - `mindful history`: saved exchanges
//! - `mindful health`: config, storage, and server reachability
//! - `mindful config show|init|set|reset`: configuration management

pub mod repl;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::client::HttpClient;
use crate::config::{self, MindfulConfig};
use crate::logging::expand_home;
use crate::persistence::{FontSize, Persistence, SettingsUpdate, Theme};
use crate::recommend::{self, Card, Preset, Rendered, ScoreClass};
use crate::storage::FileStore;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Resolve the storage file from config.
pub fn storage_path(cfg: &MindfulConfig) -> Result<PathBuf> {
    match cfg.storage.path.as_deref() {
        Some(path) => Ok(expand_home(path)),
        None => FileStore::default_path().context("could not determine home directory"),
    }
}

fn open_store(cfg: &MindfulConfig) -> Result<FileStore> {
    Ok(FileStore::open(storage_path(cfg)?))
}

// ---------------------------------------------------------------------------
// mindful recommend
// ---------------------------------------------------------------------------

/// Fetch and print game recommendations.
pub fn run_recommend(
    cfg: &MindfulConfig,
    preset: Option<&str>,
    cpu: Option<String>,
    gpu: Option<String>,
    ram: Option<String>,
    genre: Option<&str>,
) -> Result<()> {
    let preset = match preset {
        Some(name) => Some(
            Preset::parse(name)
                .with_context(|| format!("unknown preset '{name}' (low, mid, high)"))?,
        ),
        None => None,
    };
    let specs = recommend::build_request(preset, cpu, gpu, ram);

    let mut client = HttpClient::from_config(&cfg.server);
    println!("{}", "Finding games for your rig...".dimmed());

    match recommend::recommend(&mut client, &specs, genre) {
        Ok(rendered) => print_rendered(&rendered),
        Err(e) => println!("{}", format!("{e:#}").red()),
    }
    Ok(())
}

fn print_rendered(rendered: &Rendered) {
    match rendered {
        Rendered::Error(error) => println!("{} {}", "Error:".red().bold(), error),
        Rendered::NoMatches => println!("{}", recommend::NO_MATCHES.yellow()),
        Rendered::Cards {
            header,
            cards,
            genres,
        } => {
            println!("{}", "Top Suggestions".bold().cyan());
            println!("  {}", format!("Your specs — {header}").dimmed());
            if !genres.is_empty() {
                println!("  {}", format!("Genres: {}", genres.join(", ")).dimmed());
            }
            println!("{}", "=".repeat(60));
            for card in cards {
                print_card(card);
            }
        }
    }
}

fn print_card(card: &Card) {
    let percent = format!("{:>3}%", card.percent);
    let badge = match card.class {
        ScoreClass::Good => percent.green().bold(),
        ScoreClass::Ok => percent.yellow().bold(),
        ScoreClass::Poor => percent.red().bold(),
    };
    println!(
        "  {} {} {}",
        badge,
        card.title.bold(),
        card.genre.dimmed()
    );
    println!("       {} {}", "Min".dimmed(), card.minimum);
    println!("       {} {}", "Rec".dimmed(), card.recommended);
}

// ---------------------------------------------------------------------------
// mindful settings
// ---------------------------------------------------------------------------

/// Print the stored chat settings.
pub fn run_settings_show(cfg: &MindfulConfig) -> Result<()> {
    let persistence = Persistence::new(open_store(cfg)?);
    let settings = persistence.load_settings();

    println!("{}", "Mindful Chat Settings".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Theme:       ".bold(), settings.theme);
    println!("  {} {}", "Font size:   ".bold(), settings.font_size);
    println!(
        "  {} {}",
        "Save history:".bold(),
        if settings.save_history { "on" } else { "off" }
    );
    Ok(())
}

pub fn run_settings_theme(cfg: &MindfulConfig, value: &str) -> Result<()> {
    let theme = Theme::parse(value)
        .with_context(|| format!("unknown theme '{value}' (auto, dark, light-default)"))?;
    let mut persistence = Persistence::new(open_store(cfg)?);
    persistence.update_settings(SettingsUpdate::theme(theme));
    println!("{} Theme set to {}", "✓".green().bold(), theme.to_string().bold());
    Ok(())
}

pub fn run_settings_font_size(cfg: &MindfulConfig, value: &str) -> Result<()> {
    let size = FontSize::parse(value)
        .with_context(|| format!("unknown font size '{value}' (small, medium, large)"))?;
    let mut persistence = Persistence::new(open_store(cfg)?);
    persistence.update_settings(SettingsUpdate::font_size(size));
    println!("{} Font size set to {}", "✓".green().bold(), size.to_string().bold());
    Ok(())
}

/// Turning history off also deletes saved history and draft.
pub fn run_settings_save_history(cfg: &MindfulConfig, value: &str) -> Result<()> {
    let save = config::parse_bool(value)
        .with_context(|| format!("unknown value '{value}' (on, off)"))?;
    let mut persistence = Persistence::new(open_store(cfg)?);
    persistence.set_save_history(save);
    if save {
        println!("{} History saving enabled", "✓".green().bold());
    } else {
        println!(
            "{} History saving disabled; saved history and draft deleted",
            "✓".green().bold()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// mindful history
// ---------------------------------------------------------------------------

/// Print saved exchanges.
pub fn run_history(cfg: &MindfulConfig, format: OutputFormat) -> Result<()> {
    let persistence = Persistence::new(open_store(cfg)?);
    if !persistence.save_history_enabled() {
        println!(
            "{}",
            "History saving is off. Enable it with `mindful settings save-history on`.".yellow()
        );
        return Ok(());
    }

    let history = persistence.load_history();
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("{}", "No saved conversations yet.".yellow());
        return Ok(());
    }

    println!("{}", "Saved Conversations".bold().cyan());
    println!("{}", "=".repeat(60));
    for (i, exchange) in history.iter().enumerate() {
        let when = exchange
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M");
        println!("  {} {}", format!("#{:<3}", i + 1).dimmed(), when.to_string().dimmed());
        println!("    {} {}", "you".bold().blue(), exchange.user_message);
        println!("    {} {}", "♥".bold().magenta(), exchange.ai_message);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// mindful health
// ---------------------------------------------------------------------------

pub fn run_health(cfg: &MindfulConfig) -> Result<()> {
    println!("{}", "Mindful Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.mindful/config.toml found"
        } else {
            "not found (run `mindful config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".mindful.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item(
        "Failure policy",
        true,
        &cfg.chat.failure_policy.to_string(),
    );

    match storage_path(cfg) {
        Ok(path) => print_health_item(
            "Storage",
            true,
            &if path.exists() {
                format!("{}", path.display())
            } else {
                format!("{} (created on first write)", path.display())
            },
        ),
        Err(e) => print_health_item("Storage", false, &format!("{e:#}")),
    }

    let client = HttpClient::from_config(&cfg.server);
    match client.health() {
        Ok(health) => {
            let version = health
                .version
                .as_deref()
                .map(|v| format!(", v{v}"))
                .unwrap_or_default();
            print_health_item(
                "Server",
                health.is_healthy(),
                &format!("{} at {}{}", health.status, client.base_url(), version),
            );
        }
        Err(e) => print_health_item(
            "Server",
            false,
            &format!("not reachable at {} ({e:#})", client.base_url()),
        ),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// mindful config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective Mindful Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.mindful/config.toml", global_exists);
    print_source(".mindful.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "MINDFUL_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}
