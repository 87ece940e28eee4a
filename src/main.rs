use std::path::PathBuf;
use std::process::ExitCode;

use adminctl::config::{config_schema, load_config};
use adminctl::error::BoxError;
use adminctl::models::{Role, SignupRequest, UserUpdate};
use adminctl::startup::build_state;
use adminctl::state::AppState;
use adminctl::utils::init_logging;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "adminctl", about = "Command-line client for the admin panel API")]
struct Cli {
    /// YAML configuration file; a missing file means defaults.
    #[arg(long, env = "ADMINCTL_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the configuration JSON schema.
    Schema,
    #[command(flatten)]
    Api(ApiCommand),
}

/// Commands that talk to the backend.
#[derive(Subcommand, Debug)]
enum ApiCommand {
    /// Register a new account.
    Signup(SignupArgs),
    /// Log in and remember the token.
    Login { email: String, password: String },
    /// Forget the stored token.
    Logout,
    /// Show the signed-in account.
    Me,
    /// List every account (admin only).
    Users,
    /// Show one account (admin only).
    User { id: i64 },
    /// Change role, approval or name of an account (admin only).
    UpdateUser(UpdateUserArgs),
    /// Delete an account (admin only).
    DeleteUser { id: i64 },
    /// Account counts (admin only).
    Stats,
}

#[derive(Args, Debug)]
struct SignupArgs {
    email: String,
    password: String,
    #[arg(long)]
    full_name: String,
    #[arg(long, value_parser = parse_role, default_value = "student")]
    role: Role,
}

#[derive(Args, Debug)]
struct UpdateUserArgs {
    id: i64,
    #[arg(long, value_parser = parse_role)]
    role: Option<Role>,
    #[arg(long)]
    approved: Option<bool>,
    #[arg(long)]
    full_name: Option<String>,
}

// The backend accepts any role string; the CLI only hands out the known ones.
fn parse_role(raw: &str) -> Result<Role, String> {
    match raw.to_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "teacher" => Ok(Role::Teacher),
        "student" => Ok(Role::Student),
        _ => Err(format!("unknown role '{raw}', expected admin, teacher or student")),
    }
}

impl UpdateUserArgs {
    fn to_update(&self) -> Result<UserUpdate, BoxError> {
        let update = UserUpdate {
            role: self.role.clone(),
            is_approved: self.approved,
            full_name: self.full_name.clone(),
        };
        if update.is_empty() {
            return Err("nothing to update; pass --role, --approved or --full-name".into());
        }
        Ok(update)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(state: AppState, command: ApiCommand) -> Result<(), BoxError> {
    match command {
        ApiCommand::Signup(args) => {
            let request = SignupRequest {
                email: args.email,
                password: args.password,
                full_name: args.full_name,
                role: args.role,
            };
            print_json(&state.api.signup(&request).await?)
        }
        ApiCommand::Login { email, password } => {
            print_json(&state.sign_in(&email, &password).await?)
        }
        ApiCommand::Logout => {
            state.sign_out()?;
            print_json(&state.session.snapshot())
        }
        ApiCommand::Me => match state.restore().await? {
            Some(user) => print_json(&user),
            None => Err("not signed in; run `adminctl login` first".into()),
        },
        ApiCommand::Users => print_json(&state.api.get_all_users().await?),
        ApiCommand::User { id } => print_json(&state.api.get_user(id).await?),
        ApiCommand::UpdateUser(args) => {
            let update = args.to_update()?;
            print_json(&state.api.update_user(args.id, &update).await?)
        }
        ApiCommand::DeleteUser { id } => print_json(&state.api.delete_user(id).await?),
        ApiCommand::Stats => print_json(&state.api.get_admin_stats().await?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Schema => {
            println!("{}", config_schema());
            return ExitCode::SUCCESS;
        }
        Command::Api(command) => command,
    };

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let state = match build_state(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(state, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
