mod commands;
mod terminal;

use commands::{CommandLine, Commands, scan, tools};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);

    match commands.command {
        Commands::Scan(args) => scan::scan(args, commands.quiet).await,
        Commands::Tools => {
            print::header("external tools", commands.quiet);
            tools::tools();
            Ok(())
        }
    }
}
