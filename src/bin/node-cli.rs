use clap::{Parser, Subcommand};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "node-cli")]
#[command(about = "Control CLI for an instance node", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:80")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show instance info, health and load state
    Status,
    /// Probe the health route like an instance group would
    Health,
    /// Start burning CPU
    StartLoad,
    /// Stop burning CPU
    StopLoad,
    /// Report healthy on the health route
    MakeHealthy,
    /// Report unhealthy on the health route
    MakeUnhealthy,
}

impl Commands {
    fn control_path(&self) -> Option<&'static str> {
        match self {
            Commands::StartLoad => Some("/startLoad"),
            Commands::StopLoad => Some("/stopLoad"),
            Commands::MakeHealthy => Some("/makeHealthy"),
            Commands::MakeUnhealthy => Some("/makeUnhealthy"),
            Commands::Status | Commands::Health => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()?;

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            let status = res.status();
            println!("{}", if status.is_success() { "healthy" } else { "unhealthy" });
            println!("HTTP {}", status.as_u16());
        }
        Commands::Status => {
            print_status(&client, base).await?;
        }
        command => {
            if let Some(path) = command.control_path() {
                let res = client.get(format!("{}{}", base, path)).send().await?;
                check_control_status(path, res.status())?;
            }
            print_status(&client, base).await?;
        }
    }

    Ok(())
}

/// Control routes answer with a redirect home; anything else is a failure.
fn check_control_status(path: &str, status: StatusCode) -> Result<(), String> {
    if status.is_redirection() {
        Ok(())
    } else {
        Err(format!("{} returned status {}", path, status))
    }
}

async fn print_status(
    client: &reqwest::Client,
    base: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let res = client.get(format!("{}/status", base)).send().await?;
    let status = res.status();
    if !status.is_success() {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("node returned status {}", status).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
