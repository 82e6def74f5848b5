use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pegasus::app::App;
use pegasus::config::{ClientConfig, ConfigError};
use pegasus::endpoints::{driver, user};
use pegasus::error::ApiError;
use pegasus::net::types::{BookingSearchRequest, LoginRequest, PasswordResetRequest, Role};
use pegasus::router::NavigationError;
use pegasus::util::{booking, format};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("not logged in; run `pegasus login` first")]
    NotLoggedIn,
}

#[derive(Parser, Debug)]
#[command(name = "pegasus", about = "Pegasus booking client")]
struct Cli {
    /// Overrides `PEGASUS_STORAGE_PATH`.
    #[arg(long)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether a session is active and who owns it.
    Status,
    /// Log in with email, password, and the emailed two-factor code.
    Login {
        #[arg(long, env = "PEGASUS_EMAIL")]
        email: String,
        #[arg(long, env = "PEGASUS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    /// Request a password reset email.
    ForgotPassword {
        email: String,
    },
    /// Run a guarded navigation and print where it ends up.
    Navigate {
        path: String,
    },
    Profile,
    /// List bookings for the logged-in customer or driver.
    Bookings {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }
    let app = App::bootstrap(config).await?;

    match cli.command {
        Command::Status => run_status(&app),
        Command::Login { email, password } => run_login(&app, email, password).await,
        Command::Logout => {
            app.session.logout().await;
            println!("logged out");
            Ok(())
        }
        Command::ForgotPassword { email } => {
            let result = app.session.forgot_password(&PasswordResetRequest { email }).await;
            finish(result.success, result.message)
        }
        Command::Navigate { path } => {
            let outcome = app.router.navigate(&path).await?;
            match outcome.redirected_from {
                Some(from) => println!("{from} -> {}", outcome.route.path),
                None => println!("{}", outcome.route.path),
            }
            Ok(())
        }
        Command::Profile => {
            let profile = app.session.user().ok_or(CliError::NotLoggedIn)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
        Command::Bookings { search, page } => run_bookings(&app, search, page).await,
    }
}

fn run_status(app: &App) -> Result<(), CliError> {
    let session = app.session.snapshot();
    match session.user {
        Some(user) if session.is_authenticated => {
            let roles: Vec<String> = user.roles.iter().map(|r| format!("{r:?}")).collect();
            println!("logged in as {} ({})", user.email, roles.join(", "));
            println!("home: {}", app.session.load_route_based_on_role());
        }
        _ => println!("logged out"),
    }
    Ok(())
}

async fn run_login(app: &App, email: String, password: Option<String>) -> Result<(), CliError> {
    let password = match password {
        Some(password) => password,
        None => prompt("password: ")?,
    };
    let result = app.session.login(&LoginRequest { email, password }).await;
    if !result.success {
        return Err(CliError::Rejected(result.message));
    }
    if !result.message.is_empty() {
        println!("{}", result.message);
    }

    let code = prompt("two-factor code: ")?;
    let result = app.session.verify_two_factor(&code).await;
    if !result.success {
        return Err(CliError::Rejected(result.message));
    }
    let landing = app.router.navigate(app.session.load_route_based_on_role()).await?;
    println!("logged in; landing on {}", landing.route.path);
    Ok(())
}

async fn run_bookings(app: &App, search: Option<String>, page: Option<u32>) -> Result<(), CliError> {
    let user_profile = app.session.user().ok_or(CliError::NotLoggedIn)?;
    let query = BookingSearchRequest { search, page, ..BookingSearchRequest::default() };
    let resp = if user_profile.has_role(Role::Driver) {
        driver::my_bookings(&app.gateway, &query).await?
    } else {
        user::my_bookings(&app.gateway, &query).await?
    };
    let Some(page) = resp.data else {
        println!("no bookings");
        return Ok(());
    };
    for item in &page.items {
        println!(
            "#{} {} {} -> {} [{}] {}",
            item.booking_id,
            item.pick_up_date_time,
            item.pick_up_address,
            item.drop_off_address,
            booking::status_label(item.status),
            format::format_minutes(item.duration_minutes),
        );
    }
    println!("page {}/{} ({} total)", page.page, page.total_pages, page.total_count);
    Ok(())
}

fn finish(success: bool, message: String) -> Result<(), CliError> {
    if success {
        println!("{message}");
        Ok(())
    } else {
        Err(CliError::Rejected(message))
    }
}

fn prompt(label: &str) -> Result<String, CliError> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}
