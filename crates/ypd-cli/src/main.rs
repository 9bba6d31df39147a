mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI and dispatch; logging is set up once the config is known.
    match CliCommand::run_from_args().await {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(err) => {
            eprintln!("ypd error: {:#}", err);
            std::process::exit(1);
        }
    }
}
