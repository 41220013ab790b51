use clap::{Args, Parser, Subcommand};
use clinic_portal::net::types::{PasswordResetRequest, RegistrationRequest};
use clinic_portal::router::NavigationOutcome;
use clinic_portal::{ApiError, ConfigError, NavigationError, Portal, PortalConfig, RoleCode, User};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("backend call failed: {0}")]
    Api(#[from] ApiError),
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("--email and --password must be given together")]
    PartialCredentials,
    #[error("passwords do not match")]
    PasswordMismatch,
}

#[derive(Parser, Debug)]
#[command(name = "portal-cli", about = "Clinic portal session and navigation CLI")]
struct Cli {
    /// Backend base URL; overrides `API_URL` from the environment.
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,

    /// Log in with these credentials before running the command.
    #[arg(long, env = "PORTAL_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "PORTAL_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the signed-in user.
    Login,
    /// End the backend session.
    Logout,
    /// Print the user behind the current backend session.
    Whoami,
    Register(RegisterArgs),
    ResetPassword(ResetPasswordCommand),
    /// Navigate through each path in turn and print every outcome.
    Navigate {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print the role to dashboard mapping.
    Roles,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    new_email: String,
    #[arg(long)]
    new_password: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone_number: Option<String>,
    #[arg(long)]
    pesel: Option<String>,
}

#[derive(Args, Debug)]
struct ResetPasswordCommand {
    #[command(subcommand)]
    command: ResetPasswordSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResetPasswordSubcommand {
    /// Ask the backend to email a reset link.
    Request { address: String },
    /// Complete a reset with the emailed token.
    Confirm {
        #[arg(long)]
        token: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = PortalConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url)?;
    }

    if let Command::Roles = cli.command {
        print_roles();
        return Ok(());
    }

    let mut portal = Portal::connect(config)?;
    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => {
            if !matches!(cli.command, Command::Login) {
                portal.gateway().login(email, password).await?;
            }
        }
        (None, None) => {}
        _ => return Err(CliError::PartialCredentials),
    }

    match cli.command {
        Command::Login => run_login(&portal, cli.email.as_deref(), cli.password.as_deref()).await,
        Command::Logout => {
            portal.gateway().logout().await?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = portal.gateway().check_session_status().await?;
            print_user(&user)
        }
        Command::Register(args) => run_register(&portal, args).await,
        Command::ResetPassword(reset) => run_reset_password(&portal, reset).await,
        Command::Navigate { paths } => run_navigate(&mut portal, &paths).await,
        Command::Roles => Ok(()),
    }
}

async fn run_login(portal: &Portal, email: Option<&str>, password: Option<&str>) -> Result<(), CliError> {
    let (Some(email), Some(password)) = (email, password) else {
        return Err(CliError::PartialCredentials);
    };
    let user = portal.gateway().login(email, password).await?;
    print_user(&user)
}

async fn run_register(portal: &Portal, args: RegisterArgs) -> Result<(), CliError> {
    let payload = RegistrationRequest {
        email: args.new_email,
        password: args.new_password,
        first_name: args.first_name,
        last_name: args.last_name,
        phone_number: args.phone_number,
        pesel: args.pesel,
    };
    portal.gateway().register_user(&payload).await?;
    println!("registered {}", payload.email);
    Ok(())
}

async fn run_reset_password(portal: &Portal, reset: ResetPasswordCommand) -> Result<(), CliError> {
    match reset.command {
        ResetPasswordSubcommand::Request { address } => {
            portal.gateway().reset_password_request(&address).await?;
            println!("reset link requested for {address}");
        }
        ResetPasswordSubcommand::Confirm { token, new_password, confirm_password } => {
            if new_password != confirm_password {
                return Err(CliError::PasswordMismatch);
            }
            let payload = PasswordResetRequest { token, new_password, confirm_password };
            portal.gateway().reset_password_with_token(&payload).await?;
            println!("password updated");
        }
    }
    Ok(())
}

async fn run_navigate(portal: &mut Portal, paths: &[String]) -> Result<(), CliError> {
    for path in paths {
        let nav = portal.navigate(path).await?;
        print_navigation(&nav.requested, &nav.redirects, &nav.outcome);

        for pending in portal.process_pending().await {
            let nav = pending?;
            print_navigation(&nav.requested, &nav.redirects, &nav.outcome);
        }
    }
    Ok(())
}

fn print_navigation(requested: &str, redirects: &[String], outcome: &NavigationOutcome) {
    let chain: String = redirects.iter().map(|hop| format!(" -> {hop}")).collect();
    match outcome {
        NavigationOutcome::Committed { screen, .. } => println!("{requested}{chain} [{screen}]"),
        NavigationOutcome::Denied { path } => println!("{requested}{chain} denied at {path}"),
    }
}

fn print_user(user: &User) -> Result<(), CliError> {
    let value = serde_json::to_value(user)?;
    print_json(&value)
}

fn print_roles() {
    for role in RoleCode::ALL {
        println!("{:<8} {}", role.as_str(), role.dashboard_path());
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
