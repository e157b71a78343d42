use crate::run;
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xapi-backfill", version)]
#[command(
    about = "Upload historical learning-platform log data to an LRS as xAPI",
    long_about = "xapi-backfill pages through a platform database snapshot's legacy activity log, turns matching records into xAPI statements recipe by recipe, and submits them to a remote LRS one batch per page."
)]
#[command(arg_required_else_help = true)]
#[command(after_long_help = "Examples:
  xapi-backfill check --config backfill.toml
  xapi-backfill run --config backfill.toml --db snapshot.db
  xapi-backfill run --config backfill.toml --recipe course_viewed --log backfill.ndjson
  xapi-backfill recipes
  xapi-backfill completion zsh > ~/.zsh/completions/_xapi-backfill
  xapi-backfill man > xapi-backfill.1")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run the backfill against the remote LRS",
        long_about = "Run the backfill: verify connectivity, then for each selected recipe page through the snapshot's log, build statements, and submit one batch per page. Recipes run strictly in order; a failed submission aborts the run."
    )]
    #[command(arg_required_else_help = true)]
    #[command(after_long_help = "Examples:
  xapi-backfill run --config backfill.toml
  xapi-backfill run --config backfill.toml --db snapshot.db --batch-size 50
  xapi-backfill run --config backfill.toml --recipe user_loggedin --recipe course_viewed")]
    Run {
        #[arg(long, value_name = "PATH", help = "Path to TOML config file")]
        config: PathBuf,
        #[arg(
            long,
            value_name = "PATH",
            help = "Platform snapshot db (overrides `[platform].db` in config)"
        )]
        db: Option<PathBuf>,
        #[arg(
            long,
            value_name = "N",
            help = "Records per page and per submission (overrides `[upload].batch_size`)"
        )]
        batch_size: Option<u64>,
        #[arg(
            long,
            value_name = "KEY",
            help = "Recipe key to run (repeatable; default: all five in order)"
        )]
        recipe: Vec<String>,
        #[arg(long, value_name = "PATH", help = "Write NDJSON page/skip log to file")]
        log: Option<PathBuf>,
    },
    #[command(about = "Check connectivity to the remote LRS and print supported xAPI versions")]
    #[command(arg_required_else_help = true)]
    #[command(after_long_help = "Example:
  xapi-backfill check --config backfill.toml")]
    Check {
        #[arg(long, value_name = "PATH", help = "Path to TOML config file")]
        config: PathBuf,
    },
    #[command(about = "List the fixed recipes and their log filters")]
    Recipes,
    #[command(
        about = "Generate shell completion script",
        long_about = "Generate shell completion script for your shell. Redirect output to your shell completion directory."
    )]
    #[command(arg_required_else_help = true)]
    #[command(after_long_help = "Examples:
  xapi-backfill completion bash > ~/.local/share/bash-completion/completions/xapi-backfill
  xapi-backfill completion zsh > ~/.zsh/completions/_xapi-backfill
  xapi-backfill completion fish > ~/.config/fish/completions/xapi-backfill.fish")]
    Completion {
        #[arg(value_enum, value_name = "SHELL", help = "Target shell")]
        shell: Shell,
    },
    #[command(
        about = "Generate a man page",
        long_about = "Generate a roff man page for xapi-backfill."
    )]
    #[command(after_long_help = "Examples:
  xapi-backfill man > xapi-backfill.1
  xapi-backfill man --output docs/xapi-backfill.1")]
    Man {
        #[arg(
            long,
            value_name = "PATH",
            help = "Write man page to file (stdout when omitted)"
        )]
        output: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            db,
            batch_size,
            recipe,
            log,
        } => run::execute_run(run::RunCommand {
            config,
            db,
            batch_size,
            recipes: recipe,
            log,
        }),
        Commands::Check { config } => run::execute_check(run::CheckCommand { config }),
        Commands::Recipes => run::list_recipes(),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Man { output } => {
            let man = clap_mangen::Man::new(Cli::command());
            match output {
                Some(path) => {
                    let mut bytes = Vec::new();
                    man.render(&mut bytes)?;
                    fs::write(path, bytes)?;
                }
                None => {
                    man.render(&mut io::stdout())?;
                }
            }
            Ok(())
        }
    }
}
