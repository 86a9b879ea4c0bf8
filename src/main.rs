use clap::{Parser, Subcommand};

use gpf_planner::api::{self, PlanSimulationArgs, ProjectArgs, RebalanceArgs, ServeArgs};
use gpf_planner::logging::{LoggingConfig, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "gpf-planner",
    version,
    about = "Retirement fund allocation, rebalancing and projection planner"
)]
struct Cli {
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Project retirement savings with bull/base/bear bands.
    Project(ProjectArgs),
    /// Recommend trades for a holdings file.
    Rebalance(RebalanceArgs),
    /// Simulate catalogue plans forward and against history.
    Plans(PlanSimulationArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&LoggingConfig::new(&cli.log_level)) {
        eprintln!("Invalid log level {:?}: {e}", cli.log_level);
        std::process::exit(2);
    }

    let output = match cli.command {
        Command::Serve(args) => {
            if let Err(e) = api::run_http_server(args).await {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
            return;
        }
        Command::Project(args) => api::run_project_command(args),
        Command::Rebalance(args) => api::run_rebalance_command(args),
        Command::Plans(args) => api::run_plans_command(args),
    };

    match output {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
