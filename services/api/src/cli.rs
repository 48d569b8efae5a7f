use crate::demo::{run_demo, run_settlement_preview, DemoArgs, SettlementPreviewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use popmarket::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Popup Deal Engine",
    about = "Run the popup marketplace verification, trust, and settlement service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect settlement math without touching a live pipeline
    Settlement {
        #[command(subcommand)]
        command: SettlementCommand,
    },
    /// Run an end-to-end CLI demo covering the deal lifecycle and a check-in
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum SettlementCommand {
    /// Compute the fee split and payout schedule for a hypothetical campaign
    Preview(SettlementPreviewArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Settlement {
            command: SettlementCommand::Preview(args),
        } => run_settlement_preview(args),
        Command::Demo(args) => run_demo(args),
    }
}
