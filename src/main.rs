use anyhow::Result;
use clap::{Parser, Subcommand};

use mindful::{cli, config, logging};

#[derive(Debug, Parser)]
#[command(name = "mindful")]
#[command(about = "Mindful Chat and PC game recommendations from the terminal")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start an interactive Mindful Chat session
    Chat {
        /// Keep settings, history, and draft in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Recommend PC games for a hardware spec
    Recommend {
        /// Hardware preset: low, mid, high
        #[arg(long)]
        preset: Option<String>,
        /// CPU model (overrides the preset)
        #[arg(long)]
        cpu: Option<String>,
        /// GPU model (overrides the preset)
        #[arg(long)]
        gpu: Option<String>,
        /// RAM in GB (overrides the preset)
        #[arg(long)]
        ram: Option<String>,
        /// Preferred genre, or "any"
        #[arg(long)]
        genre: Option<String>,
    },
    /// Show or change chat settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Show saved conversations
    History {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config, storage, and server reachability
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Set the theme: auto, dark, light-default
    Theme { value: String },
    /// Set the font size: small, medium, large
    FontSize { value: String },
    /// Turn history saving on or off (off deletes saved history and draft)
    SaveHistory { value: String },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.mindful/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `chat.failure_policy local-fallback`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(&cfg.logging);

    match app.command {
        Commands::Chat { ephemeral } => cli::repl::run_chat(&cfg, ephemeral),
        Commands::Recommend {
            preset,
            cpu,
            gpu,
            ram,
            genre,
        } => cli::run_recommend(&cfg, preset.as_deref(), cpu, gpu, ram, genre.as_deref()),
        Commands::Settings { action } => match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => cli::run_settings_show(&cfg),
            SettingsAction::Theme { value } => cli::run_settings_theme(&cfg, &value),
            SettingsAction::FontSize { value } => cli::run_settings_font_size(&cfg, &value),
            SettingsAction::SaveHistory { value } => {
                cli::run_settings_save_history(&cfg, &value)
            }
        },
        Commands::History { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(&cfg, fmt)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
