use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gateway_console::config::default_config_file;
use gateway_console::terminal::{self, render};
use gateway_console::{
    CommandOutcome, ConsoleApp, ConsoleConfig, Credential, Identity, RestoreOutcome, RuleAction,
};

/// Gateway console: operator client for a command-gating service
#[derive(Parser, Debug)]
#[command(name = "gateway-console")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the gateway base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive console (default)
    Console,

    /// Validate an API key and remember it
    Login {
        /// API key; read from stdin when omitted
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Forget the stored API key
    Logout,

    /// Show the identity behind the stored API key
    Whoami,

    /// Send one command to the gateway
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Manage gating rules (admin)
    #[command(subcommand)]
    Rule(RuleCommand),

    /// Print the audit trail (admin)
    Audit,
}

#[derive(Subcommand, Debug)]
enum RuleCommand {
    /// Submit a new rule
    Add {
        /// Regular expression matched against commands
        #[arg(short, long)]
        pattern: String,

        /// block or allow
        #[arg(short, long, default_value = "block")]
        action: RuleAction,

        #[arg(short, long, default_value = "")]
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    debug!("Gateway at {}", config.api.base_url);
    let app = ConsoleApp::from_config(&config)?;

    match cli.command.unwrap_or(Command::Console) {
        Command::Console => handle_console(&app, &config).await,
        Command::Login { key } => handle_login(&app, key).await,
        Command::Logout => {
            app.manager.logout().await;
            println!("Disconnected.");
            Ok(())
        }
        Command::Whoami => {
            let identity = require_session(&app).await?;
            println!("{}", render::identity(&identity));
            Ok(())
        }
        Command::Exec { command } => handle_exec(&app, command.join(" ")).await,
        Command::Rule(RuleCommand::Add {
            pattern,
            action,
            description,
        }) => {
            require_session(&app).await?;
            app.rules.set_pattern(pattern).await?;
            app.rules.set_action(action).await?;
            app.rules.set_description(description).await?;
            let rule = app.rules.submit_rule().await?;
            println!("Rule deployed: {} {:?}", rule.action, rule.pattern);
            Ok(())
        }
        Command::Audit => {
            require_session(&app).await?;
            let records = app.audit.refresh().await?;
            println!("{}", render::audit_table(&records));
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// File, then environment, then command-line overrides
fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let path = cli.config.clone().unwrap_or_else(default_config_file);
    let mut config = ConsoleConfig::load_or_default(Some(path.as_path()))
        .with_context(|| format!("Failed to load config: {:?}", path))?;

    config.apply_env();
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

async fn handle_console(app: &ConsoleApp, config: &ConsoleConfig) -> Result<()> {
    match app
        .manager
        .restore(config.session.revalidate_on_start)
        .await?
    {
        RestoreOutcome::Restored(identity) => info!("Session restored for {}", identity.username),
        RestoreOutcome::Pending => println!("Stored API key found. Press enter to reconnect."),
        RestoreOutcome::Unreachable(err) => {
            println!("Gateway unreachable ({}). Press enter to retry the stored key.", err)
        }
        RestoreOutcome::Rejected => println!("Stored API key was rejected. Please log in again."),
        RestoreOutcome::NoCredential => {}
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    terminal::run_console(app, stdin, &mut stdout).await
}

async fn handle_login(app: &ConsoleApp, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            eprint!("API key: ");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            lines.next_line().await?.unwrap_or_default()
        }
    };

    let identity = app.manager.login(Credential::new(key)).await?;
    println!("{}", render::identity(&identity));
    Ok(())
}

async fn handle_exec(app: &ConsoleApp, command: String) -> Result<()> {
    require_session(app).await?;
    let shown = app.session.transcript().await.len();

    let outcome = app.console.execute(&command).await?;
    terminal::print_transcript(app, &mut std::io::stdout(), shown).await?;

    match outcome {
        CommandOutcome::Executed(_) | CommandOutcome::Ignored => Ok(()),
        _ => std::process::exit(1),
    }
}

/// Re-validate the stored credential for a one-shot command.
async fn require_session(app: &ConsoleApp) -> Result<Identity> {
    match app.manager.restore(true).await? {
        RestoreOutcome::Restored(identity) => Ok(identity),
        RestoreOutcome::NoCredential | RestoreOutcome::Pending => {
            bail!("Not logged in. Run `gateway-console login` first.")
        }
        RestoreOutcome::Rejected => bail!("Stored API key was rejected. Please log in again."),
        RestoreOutcome::Unreachable(err) => {
            Err(err).context("Gateway unreachable while validating the stored API key")
        }
    }
}
