use clap::Parser;
use codeindex::cli::{Cli, Commands};
use codeindex::config::Settings;
use codeindex::logging;

fn main() {
    let cli = Cli::parse();
    let settings = Settings::load().unwrap_or_default();
    logging::init_with_config(&settings.logging);

    let result: Result<(), Box<dyn std::error::Error>> = match &cli.command {
        Commands::Init { force } => Settings::init_config_file(*force).map(|path| {
            println!("Created configuration file at: {}", path.display());
        }),
        Commands::Index { path, additional_excludes } => {
            codeindex::cli::run_index(path, additional_excludes.clone())
        }
        Commands::Call { tool, path, params } => {
            codeindex::cli::run_call(tool, path, params.clone())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
