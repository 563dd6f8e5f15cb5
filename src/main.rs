use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use partdesc::cli::commands::{self, HistoryAction, Options, SavedAction};
use partdesc::cli::repl;
use partdesc::error::Result;

#[derive(Parser)]
#[command(name = "partdesc", about = "Part description generator", version)]
struct Cli {
    /// Store file (overrides the config's store_path)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Uppercase generated and edited elements
    #[arg(long, global = true)]
    upper: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the noun, specs and material found in a description
    Parse {
        text: String,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Generate elements from a description and record it in history
    Generate { text: String },

    /// Generate elements, then replay a YAML gesture script on them
    Edit {
        text: String,

        /// Script file
        #[arg(short, long)]
        script: PathBuf,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Keep a description in the saved list
    Save { text: String },

    /// Publish a description as the current one
    Reuse { text: String },

    /// Print the current description
    Current,

    /// Recent history
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },

    /// Saved descriptions
    Saved {
        #[command(subcommand)]
        action: Option<SavedCommand>,
    },

    /// Interactive editor
    Repl,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List recent descriptions, newest first
    List,
    /// Remove an item by id
    Remove { id: String },
    /// Copy an item into the saved list
    Save { id: String },
    /// Publish an item as the current description
    Reuse { id: String },
}

#[derive(Subcommand)]
enum SavedCommand {
    /// List saved descriptions, newest first
    List,
    /// Remove an item by id
    Remove { id: String },
    /// Publish an item as the current description
    Reuse { id: String },
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_repl(options: &Options) -> Result<String> {
    let mut session = options.open_session()?;
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    repl::run_repl(&mut session, &mut input, &mut out)?;
    Ok(String::new())
}

fn dispatch(command: Commands, options: &Options) -> Result<String> {
    match command {
        Commands::Parse { text, format } => commands::run_parse(&text, &format),
        Commands::Generate { text } => commands::run_generate(&text, options),
        Commands::Edit {
            text,
            script,
            format,
        } => commands::run_edit(&text, &script, &format, options),
        Commands::Save { text } => commands::run_save(&text, options),
        Commands::Reuse { text } => commands::run_reuse(&text, options),
        Commands::Current => commands::run_current(options),
        Commands::History { action } => {
            let action = match action.unwrap_or(HistoryCommand::List) {
                HistoryCommand::List => HistoryAction::List,
                HistoryCommand::Remove { id } => HistoryAction::Remove(id),
                HistoryCommand::Save { id } => HistoryAction::Save(id),
                HistoryCommand::Reuse { id } => HistoryAction::Reuse(id),
            };
            commands::run_history(&action, options)
        }
        Commands::Saved { action } => {
            let action = match action.unwrap_or(SavedCommand::List) {
                SavedCommand::List => SavedAction::List,
                SavedCommand::Remove { id } => SavedAction::Remove(id),
                SavedCommand::Reuse { id } => SavedAction::Reuse(id),
            };
            commands::run_saved(&action, options)
        }
        Commands::Repl => run_repl(options),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = Options {
        store: cli.store,
        config: cli.config,
        uppercase: cli.upper,
    };

    let Some(command) = cli.command else {
        // No subcommand: clap prints help and exits
        Cli::parse_from(["partdesc", "--help"]);
        return;
    };

    match dispatch(command, &options) {
        Ok(result) => print!("{result}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
