//! Command-line interface for the SVL compiler.

mod pipeline;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pipeline::{compile, Backend, CompileOptions};
use svl_core::error::Result;

#[derive(Parser)]
#[command(name = "svl")]
#[command(about = "Compile SVL chart specifications into interactive HTML plots")]
struct Cli {
    /// Path to the SVL source file.
    svl_source: PathBuf,

    /// Plotting backend to render with.
    #[arg(short, long, value_enum, default_value_t = Backend::Plotly)]
    backend: Backend,

    /// Where to write the rendered HTML.
    #[arg(short, long, default_value = "visualization.html")]
    output_file: PathBuf,

    /// Additional file dataset as NAME=PATH; repeatable.
    #[arg(short, long)]
    dataset: Vec<String>,

    /// Do not open a browser on the rendered file.
    #[arg(long)]
    no_browser: bool,

    /// Embed the plotting library JS into the HTML output.
    #[arg(long)]
    offline_js: bool,

    /// Print the pretty-printed parse tree instead of compiling.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}:", error.category());
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = fs::read_to_string(&cli.svl_source)?;

    let options = CompileOptions {
        backend: cli.backend,
        datasets: cli.dataset.clone(),
        offline_js: cli.offline_js,
        debug: cli.debug,
    };

    let rendered = compile(&source, &options)?;

    if cli.debug {
        println!("{}", rendered);
        return Ok(());
    }

    fs::write(&cli.output_file, &rendered)?;
    tracing::info!(output = %cli.output_file.display(), "wrote visualization");

    if !cli.no_browser {
        let path = fs::canonicalize(&cli.output_file)?;
        let url = format!("file://{}", path.display());
        if let Err(error) = webbrowser::open(&url) {
            // Rendering succeeded; a headless environment is not an error.
            tracing::warn!(%error, "could not open browser");
        }
    }

    Ok(())
}
