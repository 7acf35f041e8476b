//! sommaire - productivity-summary command line client
//!
//! Submits a batch of screenshots with employee metadata for summarisation,
//! and browses past summaries grouped by employee.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sommaire_client::models::ImageFile;
use sommaire_client::services::{StorageClient, SummaryClient};
use sommaire_client::{render, App, SubmissionState};
use sommaire_common::config::{
    config_path, default_config_path, load_toml_config, write_toml_config, ConfigOverrides,
    StorageSection, TomlConfig,
};
use sommaire_common::events::{ClientEvent, EventBus, SubmissionPhase};
use sommaire_common::logging::init_tracing;
use sommaire_common::ClientConfig;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "sommaire", version, about = "Productivity summary client")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Config file (default: ~/.config/sommaire/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Summary API base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Object storage project URL
    #[arg(long, global = true)]
    storage_url: Option<String>,

    /// Object storage access key
    #[arg(long, global = true)]
    storage_key: Option<String>,

    /// Bucket for profile pictures
    #[arg(long, global = true)]
    bucket: Option<String>,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_base_url: self.api_base.clone(),
            storage_url: self.storage_url.clone(),
            storage_key: self.storage_key.clone(),
            bucket: self.bucket.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit screenshots for a summary
    Submit {
        /// Employee name
        #[arg(long)]
        name: String,

        /// Profile picture file
        #[arg(long)]
        pfp: PathBuf,

        /// Session date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Screenshot files (1 to 18)
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Browse past summaries
    History {
        /// Show one employee's sessions instead of the profile list
        #[arg(long)]
        employee: Option<String>,

        /// Earliest date, inclusive
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Latest date, inclusive
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a config file from the given flags
    Init {
        /// Where to write (default: the platform config directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml_config = match config_path(cli.global.config.as_deref()) {
        Some(path) => load_toml_config(&path)?,
        None => TomlConfig::default(),
    };
    init_tracing(&toml_config.logging);

    info!(
        "Starting sommaire v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match cli.command {
        Command::Config {
            action: ConfigAction::Init { path },
        } => init_config(&cli.global, path),
        Command::Submit {
            name,
            pfp,
            date,
            images,
        } => {
            let config = ClientConfig::resolve(&cli.global.overrides(), &toml_config)?;
            submit(&config, name, &pfp, date, &images).await
        }
        Command::History { employee, from, to } => {
            let config = ClientConfig::resolve(&cli.global.overrides(), &toml_config)?;
            history(&config, employee.as_deref(), from, to).await
        }
    }
}

fn init_config(global: &GlobalArgs, path: Option<PathBuf>) -> Result<()> {
    let path = match path.or_else(default_config_path) {
        Some(path) => path,
        None => bail!("No config directory on this platform; pass --path"),
    };

    let config = TomlConfig {
        api_base_url: global.api_base.clone(),
        storage: StorageSection {
            url: global.storage_url.clone(),
            key: global.storage_key.clone(),
            bucket: global.bucket.clone(),
        },
        ..TomlConfig::default()
    };
    write_toml_config(&config, &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn read_image(path: &Path) -> Result<ImageFile> {
    ImageFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn phase_label(phase: SubmissionPhase) -> Option<&'static str> {
    match phase {
        SubmissionPhase::UploadingPfp => Some("Uploading profile picture..."),
        SubmissionPhase::Submitting => Some("Generating summary..."),
        _ => None,
    }
}

async fn submit(
    config: &ClientConfig,
    name: String,
    pfp: &Path,
    date: NaiveDate,
    images: &[PathBuf],
) -> Result<()> {
    let store = StorageClient::new(config.storage.clone())?;
    let api = SummaryClient::new(config)?;

    let bus = EventBus::new(32);
    let mut rx = bus.subscribe();
    let progress = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if let ClientEvent::SubmissionPhaseChanged { new_phase, .. } = event {
                if let Some(label) = phase_label(new_phase) {
                    eprintln!("{}", label);
                }
            }
        }
    });

    let mut files = Vec::with_capacity(images.len());
    for path in images {
        files.push(read_image(path).await?);
    }
    let picture = read_image(pfp).await?;

    let mut app = App::with_event_bus(bus);
    let screen = app.upload_mut();
    if let Err(e) = screen.select_files(files) {
        bail!("{}", e);
    }
    screen.set_employee_name(name);
    screen.set_date(date.format("%Y-%m-%d").to_string());
    screen.set_profile_picture(Some(picture));

    let outcome = match screen.submit(&store, &api).await {
        SubmissionState::Succeeded(result) => Ok(render::summary_result(result)),
        SubmissionState::Failed(e) => Err(e.to_string()),
        other => Err(format!("Submission ended in unexpected state {:?}", other.phase())),
    };

    drop(app);
    let _ = progress.await;

    match outcome {
        Ok(text) => {
            print!("{}", text);
            Ok(())
        }
        Err(message) => {
            error!("{}", message);
            bail!("{}", message)
        }
    }
}

async fn history(
    config: &ClientConfig,
    employee: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let api = SummaryClient::new(config)?;
    let mut app = App::new();
    app.enter_history();

    let browser = app.history_mut();
    browser.load(&api).await;
    if let Some(message) = browser.load_error() {
        bail!("{}", message);
    }

    let Some(name) = employee else {
        print!("{}", render::profile_list(browser.profiles()));
        return Ok(());
    };

    if !browser.select_profile(name) {
        bail!("No sessions for {:?}", name);
    }
    browser.filter_by_date_range(from, to);

    if let Some(profile) = browser.selected_profile() {
        print!("{}", render::session_list(profile, &browser.visible_sessions()));
    }
    Ok(())
}
