use clap::Parser;
use schemagraph::mermaid::{Direction, MermaidRenderer};
use schemagraph::{extract, ruby, sexp, Error};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "schemagraph",
    version,
    about = "Render a Rails schema.rb as a Mermaid table dependency graph"
)]
struct Cli {
    /// schema.rb to run through Ripper, a saved Ripper dump, or `-` for a dump on stdin
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Graph direction: TD, TB, BT, LR, RL
    #[arg(short, long, default_value = "TD", value_parser = parse_direction)]
    direction: Direction,

    /// Ruby interpreter used for .rb input
    #[arg(long, env = "SCHEMAGRAPH_RUBY", default_value = ruby::DEFAULT_RUBY)]
    ruby: String,

    /// Log extraction steps to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::from_str(s).ok_or_else(|| format!("invalid direction: {}", s))
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Schema(#[from] Error),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_dump(cli: &Cli) -> Result<String, CliError> {
    let display = cli.input.display().to_string();

    if cli.input.as_os_str() == "-" {
        let mut dump = String::new();
        io::stdin()
            .read_to_string(&mut dump)
            .map_err(|source| CliError::Read {
                path: "stdin".to_string(),
                source,
            })?;
        return Ok(dump);
    }

    if ruby::is_ruby_source(&cli.input) {
        return Ok(ruby::dump_sexp(&cli.ruby, &cli.input).map_err(Error::from)?);
    }

    fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: display,
        source,
    })
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let dump = read_dump(cli)?;
    let root = sexp::parse(&dump).map_err(Error::from)?;
    let schema = extract::extract(&root).map_err(Error::from)?;
    info!(tables = schema.len(), "extracted schema");

    let diagram = MermaidRenderer::new(cli.direction).render_to_string(&schema);

    match &cli.output {
        Some(path) => {
            debug!(path = %path.display(), "writing diagram");
            fs::write(path, format!("{}\n", diagram)).map_err(|source| CliError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }
        None => println!("{}", diagram),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
