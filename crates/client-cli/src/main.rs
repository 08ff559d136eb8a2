use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod config;
mod credentials;
mod filter;
mod query;
mod session;
mod stats;
mod tui;

use api::{ApiClient, InterviewQuery};
use credentials::CredentialStore;
use shared::{Interview, InterviewStatus, InterviewType};

// Default backend URL
const DEFAULT_SERVER: &str = "https://we23tm7jpl.execute-api.us-east-1.amazonaws.com/dev";

#[derive(Parser)]
#[command(name = "intrack")]
#[command(about = "Interview tracker - log your interviews and browse the community feed")]
#[command(version)]
struct Cli {
    /// Backend URL (overrides config)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Sign in via Google
    Login {
        /// ID token issued by the Google sign-in (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// Sign out and delete the stored credential
    Logout,
    /// Show current login status
    Whoami,
    /// Record a new interview
    Add(AddArgs),
    /// Update an existing interview
    Edit(EditArgs),
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a configuration value
    Set {
        /// Configuration key (server)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Get the config file path
    Path,
}

#[derive(Args)]
struct AddArgs {
    /// Company name
    company: String,
    /// Position / role
    role: String,
    /// ISO 8601 date-time (defaults to now)
    #[arg(long)]
    date: Option<String>,
    /// Interview type: phone, video, in-person, panel
    #[arg(long = "type", default_value = "video")]
    interview_type: String,
    /// Lifecycle status: scheduled, completed, waiting_for_feedback, canceled
    #[arg(long, default_value = "scheduled")]
    status: String,
    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,
    /// Keep the record out of the community feed
    #[arg(long)]
    private: bool,
}

#[derive(Args)]
struct EditArgs {
    /// Record id
    id: String,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    role: Option<String>,
    /// ISO 8601 date-time
    #[arg(long)]
    date: Option<String>,
    /// Interview type: phone, video, in-person, panel
    #[arg(long = "type")]
    interview_type: Option<String>,
    /// Lifecycle status: scheduled, completed, waiting_for_feedback, canceled
    #[arg(long)]
    status: Option<String>,
    /// Result: true, false, or unknown
    #[arg(long)]
    passed: Option<String>,
    /// Self-assessment between 1 and 10
    #[arg(long)]
    rating: Option<u8>,
    #[arg(long)]
    notes: Option<String>,
    /// Community visibility
    #[arg(long)]
    public: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = config::Config::load().unwrap_or_default();
    let server = cli
        .server
        .or(config.server)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    let credentials = CredentialStore::open_default()?;
    let api = ApiClient::new(server, credentials.clone());

    match cli.command {
        Some(Commands::Config { action }) => handle_config_command(action),
        Some(Commands::Login { token }) => auth::login(&api, &credentials, token).await,
        Some(Commands::Logout) => {
            auth::logout(&credentials);
            Ok(())
        }
        Some(Commands::Whoami) => auth::whoami(&api, &credentials).await,
        Some(Commands::Add(args)) => handle_add(&api, &credentials, args).await,
        Some(Commands::Edit(args)) => handle_edit(&api, &credentials, args).await,
        None => tui::run(api, credentials).await,
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = config::Config::load().unwrap_or_default();
            match key.as_str() {
                "server" => config.server = Some(value),
                _ => anyhow::bail!("Unknown config key: {}. Valid keys: server", key),
            }
            config.save()?;
            println!("Configuration saved");
        }
        ConfigAction::Get { key } => {
            let config = config::Config::load()?;
            let value = match key.as_str() {
                "server" => config.server.unwrap_or_default(),
                _ => anyhow::bail!("Unknown config key: {}", key),
            };
            println!("{}", value);
        }
        ConfigAction::Show => {
            let config = config::Config::load()?;
            println!("server: {}", config.server.unwrap_or_default());
        }
        ConfigAction::Path => {
            let path = config::Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn require_sign_in(credentials: &CredentialStore) -> bool {
    if credentials.get().is_none() {
        eprintln!("\x1b[33m🔐 Not signed in.\x1b[0m");
        eprintln!("   Run '\x1b[1mintrack login\x1b[0m' to authenticate.");
        return false;
    }
    true
}

async fn handle_add(api: &ApiClient, credentials: &CredentialStore, args: AddArgs) -> Result<()> {
    if !require_sign_in(credentials) {
        return Ok(());
    }

    let interview_type: InterviewType = args.interview_type.parse()?;
    let status: InterviewStatus = args.status.parse()?;
    let date = args.date.unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    let mut interview = Interview::new(args.company, args.role, date, interview_type);
    interview.status = Some(status);
    interview.notes = args.notes;
    interview.is_public = !args.private;

    let saved = api.save_interview(&interview).await?;
    println!(
        "\x1b[32m✅ Recorded interview at {}\x1b[0m ({})",
        saved.company,
        saved.id.as_deref().unwrap_or("id pending")
    );
    Ok(())
}

async fn handle_edit(api: &ApiClient, credentials: &CredentialStore, args: EditArgs) -> Result<()> {
    if !require_sign_in(credentials) {
        return Ok(());
    }

    let found = api.fetch_interviews(&InterviewQuery::by_id(&args.id)).await?;
    let mut interview = found
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No interview with id {}", args.id))?;

    if let Some(company) = args.company {
        interview.company = company;
    }
    if let Some(role) = args.role {
        interview.role = role;
    }
    if let Some(date) = args.date {
        interview.date = date;
    }
    if let Some(interview_type) = args.interview_type {
        interview.interview_type = interview_type.parse()?;
    }
    if let Some(status) = args.status {
        interview.status = Some(status.parse::<InterviewStatus>()?);
    }
    if let Some(passed) = args.passed.as_deref() {
        interview.passed = match passed {
            "true" => Some(true),
            "false" => Some(false),
            "unknown" => None,
            other => anyhow::bail!("Result must be true, false, or unknown (got {})", other),
        };
    }
    if let Some(rating) = args.rating {
        anyhow::ensure!((1..=10).contains(&rating), "Rating must be between 1 and 10");
        interview.performance_rating = Some(rating);
    }
    if let Some(notes) = args.notes {
        interview.notes = Some(notes);
    }
    if let Some(public) = args.public {
        interview.is_public = public;
    }

    // Saving with the id present makes this an update, not a create.
    interview.id = Some(args.id.clone());

    let saved = api.save_interview(&interview).await?;
    println!(
        "\x1b[32m✅ Updated interview at {}\x1b[0m ({})",
        saved.company,
        saved.id.as_deref().unwrap_or(&args.id)
    );
    Ok(())
}
