//! The compile pipeline: source text in, rendered HTML out.
//!
//! Passes run in a fixed order; the first failing pass aborts the run with
//! its typed error. Plots are processed strictly in source order.

use std::path::Path;

use clap::ValueEnum;

use svl_core::ast::DatasetSource;
use svl_core::error::{Result, SvlError};
use svl_core::layout::tree_to_grid;
use svl_core::validate::validate_plot;
use svl_core::{parse_svl, parse_svl_debug};
use svl_engine::Session;
use svl_render::{render_page, template_vars, PlotlyJs};

/// Environment variable naming the plotly bundle used by `--offline-js`.
pub const PLOTLY_JS_ENV: &str = "SVL_PLOTLY_JS";

/// Plotting backends selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Render through plotly (the default).
    Plotly,
    /// Reserved; selecting it reports a not-implemented error.
    Vega,
}

/// Everything the pipeline needs besides the source text.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Which backend renders the plots.
    pub backend: Backend,
    /// Additional `NAME=PATH` file dataset bindings from the command line.
    pub datasets: Vec<String>,
    /// Embed the plotting library's JS instead of loading it from the CDN.
    pub offline_js: bool,
    /// Return the pretty-printed parse tree instead of compiling.
    pub debug: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            backend: Backend::Plotly,
            datasets: Vec::new(),
            offline_js: false,
            debug: false,
        }
    }
}

/// Split `NAME=PATH` bindings, rejecting anything malformed.
fn extract_cli_datasets(datasets: &[String]) -> Result<Vec<(String, String)>> {
    datasets
        .iter()
        .map(|binding| {
            let parts: Vec<&str> = binding.split('=').collect();
            match parts.as_slice() {
                [name, path] => Ok((name.to_string(), path.to_string())),
                _ => Err(SvlError::Specification(format!(
                    "dataset {} needs to be name=path",
                    binding
                ))),
            }
        })
        .collect()
}

/// Read the plotly bundle for offline embedding.
fn load_plotly_bundle() -> Result<String> {
    let path = std::env::var(PLOTLY_JS_ENV).map_err(|_| {
        SvlError::Specification(format!(
            "offline mode needs the plotly bundle; set {} to its path",
            PLOTLY_JS_ENV
        ))
    })?;
    std::fs::read_to_string(&path).map_err(|e| {
        SvlError::Specification(format!("could not read plotly bundle {}: {}", path, e))
    })
}

/// Compile SVL source into the rendered HTML page (or, in debug mode, the
/// pretty-printed parse tree).
pub fn compile(source: &str, options: &CompileOptions) -> Result<String> {
    if options.debug {
        return parse_svl_debug(source);
    }

    let cli_datasets = extract_cli_datasets(&options.datasets)?;

    let mut visualization = parse_svl(source)?;
    for (name, path) in cli_datasets {
        visualization
            .datasets
            .insert(name, DatasetSource::File(path));
    }

    // Every file-backed dataset must exist before anything touches the
    // engine.
    for (_, dataset) in visualization.datasets.iter() {
        if let DatasetSource::File(path) = dataset {
            if !Path::new(path).exists() {
                return Err(SvlError::MissingFile(path.clone()));
            }
        }
    }

    if visualization.datasets.files().next().is_none() {
        return Err(SvlError::MissingDataset(
            "No file datasets were provided; at least one dataset must be backed by a file."
                .to_string(),
        ));
    }

    let plots = tree_to_grid(&visualization.layout);
    tracing::info!(plots = plots.len(), "laid out plot grid");

    for positioned in &plots {
        if !visualization.datasets.contains(&positioned.plot.data) {
            return Err(SvlError::MissingDataset(format!(
                "Dataset {} is not in provided datasets {}.",
                positioned.plot.data,
                visualization.datasets.names()
            )));
        }
        let (ok, messages) = validate_plot(&positioned.plot);
        if !ok {
            return Err(SvlError::Plot(messages));
        }
    }

    let session = Session::open_in_memory()?;
    session.create_datasets(&visualization.datasets)?;

    let datas = plots
        .iter()
        .map(|positioned| session.plot_data(&positioned.plot))
        .collect::<Result<Vec<_>>>()?;

    match options.backend {
        Backend::Plotly => {
            let vars = template_vars(&plots, &datas);
            let plotly_js = if options.offline_js {
                PlotlyJs::Embedded(load_plotly_bundle()?)
            } else {
                PlotlyJs::Cdn
            };
            Ok(render_page(&vars, &plotly_js))
        }
        Backend::Vega => Err(SvlError::NotImplemented("vega".to_string())),
    }
}
