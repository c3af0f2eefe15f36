mod init;
mod list;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser};

use mango::output::{ColorChoice, Painter};
use mango::{EXIT_TOOL_ERROR, MangoError};

#[derive(Parser, Debug)]
#[command(
    name = "mango",
    version,
    about = "Run repository scripts by name",
    after_help = "Commands inside a submodule can be addressed directly as `sub1:sub2:name`."
)]
struct Cli {
    /// Create a mango repository in the current directory
    #[arg(long, conflicts_with_all = ["remove", "list", "which"])]
    init: bool,

    /// Delete the enclosing mango repository's `.mango` directory
    #[arg(long, conflicts_with_all = ["list", "which"])]
    remove: bool,

    /// With --init, complete an existing repository; with --remove, skip the confirmation
    #[arg(long)]
    force: bool,

    /// List visible commands (of the root scope, or of the submodule given as COMMAND)
    #[arg(short, long, conflicts_with = "which")]
    list: bool,

    /// Print the script a command resolves to instead of running it
    #[arg(long)]
    which: bool,

    /// When to color output
    #[arg(long, value_enum)]
    color: Option<ColorChoice>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Command address followed by the arguments passed to the script
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let painter = Painter::new(cli.color.unwrap_or_default());

    let log_file = match cli.log_file.as_ref().map(std::fs::File::create).transpose() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("{} unable to open log file: {e}", painter.error("error:"));
            return ExitCode::from(EXIT_TOOL_ERROR);
        }
    };
    mango::logger::init(mango::logger::level_filter(cli.verbose), painter, log_file);

    match dispatch(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", painter.error("error:"));
            ExitCode::from(e.exit_code())
        }
    }
}

fn dispatch(cli: &Cli) -> Result<ExitCode, MangoError> {
    let cwd = std::env::current_dir().map_err(|e| {
        mango::repo::RepoError::UnknownWorkingDirectory(e.to_string())
    })?;

    if cli.init {
        return init::run_init(&cwd, cli.force, cli.color);
    }
    if cli.remove {
        return init::run_remove(&cwd, cli.force, cli.color);
    }

    if cli.command.is_empty() && !cli.list {
        let _ = Cli::command().print_help();
        return Ok(ExitCode::from(2));
    }

    let repo = mango::Repository::closest()?;
    let painter = Painter::new(cli.color.or(repo.config.color).unwrap_or_default());
    mango::logger::set_painter(painter);

    let (command, args) = match cli.command.split_first() {
        Some((command, args)) => (command.as_str(), args),
        None => ("", &[][..]),
    };

    if cli.list {
        return list::run(&repo, command, &painter);
    }
    if cli.which {
        return run::which(&repo, command, &painter);
    }
    run::run(&repo, command, args, cwd)
}
