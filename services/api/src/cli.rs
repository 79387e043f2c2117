use crate::analyze::{run_analyze, run_regions, AnalyzeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use deal_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Deal Engine",
    about = "Value wholesale real-estate deals and serve the deal engine over HTTP",
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
    /// Analyze a single property from the command line
    Analyze(AnalyzeArgs),
    /// Print the regional price-per-sqft table used by fallback estimates
    Regions,
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
        Command::Analyze(args) => run_analyze(args),
        Command::Regions => {
            run_regions();
            Ok(())
        }
    }
}
