use clap::Parser as ClapParser;
use mistql::cli::{self, Options};

/// `mistql <query> [--data JSON | --file PATH] [--output PATH] [--pretty]`
#[derive(ClapParser)]
#[command(name = "mistql")]
#[command(about = "Query and transform JSON documents with MistQL expressions")]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version and exit
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// The MistQL query to run
    query: String,

    /// JSON input given inline, as opposed to a file or stdin
    #[arg(short, long, conflicts_with = "file")]
    data: Option<String>,

    /// JSON input read from a file, as opposed to inline data or stdin
    #[arg(short, long, conflicts_with = "data")]
    file: Option<std::path::PathBuf>,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    /// Pretty-print the result
    #[arg(short, long)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = Options { query: cli.query, data: cli.data, file: cli.file, output: cli.output, pretty: cli.pretty };

    if let Err(e) = cli::execute(options) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
