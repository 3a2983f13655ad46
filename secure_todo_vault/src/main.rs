//! Secure TODO Vault - CLI
//!
//! Command-line front end over a file-backed fallback store.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};

use secure_todo_vault::biometrics::{
    BiometricCapability, BiometricKind, LockoutState, PromptOutcome, PromptRequest, USER_CANCEL,
};
use secure_todo_vault::crypto::Sha256Digest;
use secure_todo_vault::{AppConfig, PlatformError, PlatformStorage, SecureFs, TodoApp, TodoItem};

#[derive(Parser)]
#[command(name = "secure-todo")]
#[command(version = secure_todo_vault::VERSION)]
#[command(about = "Secure TODO Vault - device-authenticated TODO list")]
struct Cli {
    /// Data directory
    #[arg(short, long, default_value = "./todo_data")]
    data_dir: PathBuf,

    /// Config file (defaults to <data-dir>/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device PIN; repeated failures lock every command for the configured window
    #[arg(short, long, global = true)]
    pin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config (with --pin as the device PIN) if none exists, then
    /// load the list, seeding sample items on first launch
    Init,

    /// List all items
    List,

    /// Add an item
    Add {
        /// Description
        text: String,
    },

    /// Change an item's description
    Edit {
        /// Item ID
        id: String,

        /// New description
        text: String,
    },

    /// Toggle completion
    Toggle {
        /// Item ID
        id: String,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },

    /// Show storage and authentication status
    Status,
}

/// Desktop device credential: no biometric hardware, PIN only
struct DevicePin {
    expected: Option<String>,
    entered: Option<String>,
}

#[async_trait]
impl BiometricCapability for DevicePin {
    async fn has_hardware(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn is_enrolled(&self) -> Result<bool, PlatformError> {
        Ok(self.expected.is_some())
    }

    async fn supported_kinds(&self) -> Result<HashSet<BiometricKind>, PlatformError> {
        Ok(HashSet::new())
    }

    async fn authenticate(&self, request: &PromptRequest) -> Result<PromptOutcome, PlatformError> {
        log::debug!("prompt: {}", request.prompt_message);

        match (&self.expected, &self.entered) {
            (None, _) => Err(PlatformError::new("no device PIN configured")),
            (Some(_), None) => Ok(PromptOutcome::failure(USER_CANCEL)),
            (Some(expected), Some(entered)) if expected == entered => Ok(PromptOutcome::success()),
            _ => Ok(PromptOutcome::failure("authentication_failed")),
        }
    }
}

/// Gatekeeper lockout carried between runs
const LOCKOUT_FILE: &str = "lockout.json";

fn load_lockout(path: &Path) -> anyhow::Result<Option<LockoutState>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let state = serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(state))
}

fn save_lockout(path: &Path, state: &LockoutState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(state)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

async fn print_status(app: &TodoApp, data_dir: &Path) -> anyhow::Result<()> {
    let availability = app.gatekeeper().check_biometric_availability().await;
    println!("📊 Secure TODO Vault {}", secure_todo_vault::VERSION);
    println!("{:-<40}", "");
    println!("Data directory:   {}", data_dir.display());
    println!("Namespace:        {}", app.config().namespace);
    println!("Biometrics:       {:?}", availability.biometric_type);
    println!("Device PIN set:   {}", app.gatekeeper().is_enrolled().await);
    println!("First launch:     {}", app.repository().is_first_launch().await?);
    Ok(())
}

/// Log in, carrying the lockout over from earlier runs
async fn login(app: &TodoApp, lockout_path: &Path) -> anyhow::Result<()> {
    if let Some(state) = load_lockout(lockout_path)? {
        app.gatekeeper().restore_lockout(state);
    }

    let authenticated = app.auth().login().await;
    save_lockout(lockout_path, &app.gatekeeper().lockout_state())?;

    if !authenticated {
        let reason = app
            .auth()
            .last_error()
            .unwrap_or_else(|| "Authentication failed".into());
        bail!("🔒 {}", reason);
    }
    Ok(())
}

async fn run(app: &TodoApp, command: Commands) -> anyhow::Result<()> {
    let todos = app.todos();
    todos.initialize_with_sample_data().await?;

    match command {
        Commands::Init | Commands::List | Commands::Status => {}
        Commands::Add { text } => {
            let item = todos.add_todo(&text).await?;
            println!("✅ Added: {}", item.id);
        }
        Commands::Edit { id, text } => {
            todos.update_todo(&id, &text).await?;
            println!("✏️ Updated: {}", id);
        }
        Commands::Toggle { id } => {
            todos.toggle_todo(&id).await?;
            println!("🔁 Toggled: {}", id);
        }
        Commands::Delete { id } => {
            todos.delete_todo(&id).await?;
            println!("🗑️ Deleted: {}", id);
        }
    }

    print_todos(&todos.todos());
    Ok(())
}

fn print_todos(todos: &[TodoItem]) {
    if todos.is_empty() {
        println!("📭 No TODO items");
        return;
    }

    println!("📋 TODO items ({}):", todos.len());
    println!("{:-<60}", "");
    for todo in todos {
        let mark = if todo.is_completed { "✅" } else { "⬜" };
        println!("{} {} - {}", mark, todo.id, todo.description);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("config.json"));
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if matches!(cli.command, Commands::Init) && !config_path.exists() {
        config.device_pin = cli.pin.clone();
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        config.save(&config_path)?;
        println!("📝 Wrote {}", config_path.display());
    }

    let credential = Arc::new(DevicePin {
        expected: config.device_pin.clone(),
        entered: cli.pin.clone(),
    });
    let platform = PlatformStorage::Fallback {
        store: Arc::new(SecureFs::new(&cli.data_dir.join("store"))),
        digest: Arc::new(Sha256Digest),
    };
    let app = TodoApp::new(config, platform, credential)?;

    match cli.command {
        Commands::Status => print_status(&app, &cli.data_dir).await,
        command => {
            login(&app, &cli.data_dir.join(LOCKOUT_FILE)).await?;
            run(&app, command).await
        }
    }
}
