use clap::{Parser as ClapParser, Subcommand};
use kriti_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "kriti")]
#[command(about = "Kriti - JSON templates with {{ range }}, {{ if }} and path directives")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace). Otherwise KRITI_LOG sets the filter
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a template and render it against JSON input
    Check {
        /// The template source
        template: Option<String>,

        /// Read the template from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// JSON input bound to `$` (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't render
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the tokens of a template
    Tokens {
        /// The template source
        template: Option<String>,

        /// Read the template from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            template,
            file,
            input,
            pretty,
            syntax_only,
        } => read_template(template, file)
            .and_then(|template| run_check(template, input, pretty, syntax_only)),
        Commands::Tokens { template, file } => read_template(template, file)
            .and_then(|template| cli::list_tokens(&template))
            .map(|listing| println!("{}", listing)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("KRITI_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("kriti=debug"),
        _ => EnvFilter::new("kriti=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_template(template: Option<String>, file: Option<PathBuf>) -> Result<String, CliError> {
    match (template, file) {
        (_, Some(path)) => Ok(fs::read_to_string(path)?),
        (Some(template), None) => Ok(template),
        (None, None) => Err(CliError::NoTemplate),
    }
}

fn run_check(
    template: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        template,
        input,
        pretty,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(json) => println!("{}", json),
    }
    Ok(())
}
