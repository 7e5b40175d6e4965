use clap::Parser;

use ledger_recon::cli::{self, AlertsCommands, Cli, Commands, ConfigCommands};

fn main() {
    let cli = Cli::parse();
    let data_dir = cli::resolve_data_dir(&cli.data_dir);

    let result = match cli.command {
        Commands::Demo => cli::demo::run(&data_dir),
        Commands::Analyze { document_id, json } => cli::analyze::run(&data_dir, document_id, json),
        Commands::Reconcile { holidays } => cli::reconcile::run(&data_dir, &holidays).map(|_| ()),
        Commands::Alerts { command } => match command {
            AlertsCommands::Get { id, holidays } => cli::alerts::get(&data_dir, id, &holidays),
        },
        Commands::Correct { document_id, reference, content_file, kind } => {
            cli::correct::run(&data_dir, &document_id, &reference, &content_file, kind)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
