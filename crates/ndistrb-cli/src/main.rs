mod edit;
mod install;
mod list;
mod update;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ndistrb_pm::{Config, Output, Reporter};

#[derive(Parser, Debug)]
#[command(name = "ndistrb")]
#[command(version, about = "Install modules from <user>/<module> into ./modules")]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    install: install::InstallArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'd', long, default_value = ".", global = true)]
    working_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Opens <root>/.ndistro in $EDITOR
    Edit,

    /// Update ndistrb to the latest version
    Update,

    /// List the modules available from <user>
    List {
        /// Account to list modules for
        user: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args, output: Arc<Output>) -> Result<u8> {
    let root = args
        .working_dir
        .canonicalize()
        .context("Failed to resolve working directory")?;

    let config = Arc::new(Config::build(&root, true).context("Failed to load configuration")?);
    log::debug!("Project root: {}", root.display());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;

    match args.command {
        Some(Commands::Edit) => edit::execute(&config),
        Some(Commands::Update) => rt.block_on(update::execute(&config, &output)),
        Some(Commands::List { user }) => rt.block_on(list::execute(&user, config, &output)),
        None if args.install.user.is_some() => rt.block_on(install::execute(args.install, config, output)),
        None => {
            Args::command().print_help()?;
            Ok(0)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut output = Output::new();
    output.set_quiet(args.quiet);
    let output = Arc::new(output);

    match run(args, Arc::clone(&output)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let mut message = e.to_string();
            for cause in e.chain().skip(1) {
                message.push_str(&format!("\n  Caused by: {}", cause));
            }
            output.fail(&message, 1)
        }
    }
}
