use crate::server;
use crate::verify::{run_api_check, run_count_check, ApiCheckArgs, CountCheckArgs};
use clap::{Args, Parser, Subcommand};
use lourdes_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lourdes Garden Enquiry Intake",
    about = "Run the contact enquiry intake service and its verification checks",
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
    /// One-shot checks confirming the intake pipeline is live end-to-end
    Check {
        #[command(subcommand)]
        command: CheckCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CheckCommand {
    /// Query the submission store and print the total enquiry count
    Count(CountCheckArgs),
    /// Post a synthetic enquiry to the intake endpoint and print the response
    Api(ApiCheckArgs),
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
        Command::Check {
            command: CheckCommand::Count(args),
        } => run_count_check(args),
        Command::Check {
            command: CheckCommand::Api(args),
        } => run_api_check(args).await,
    }
}
