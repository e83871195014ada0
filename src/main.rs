//! Headless front-end for molsysviewer.
//!
//! Loads a structure, applies visibility changes and shapes, then writes
//! every command the view emits to stdout as one JSON object per line.
//!
//! ```text
//! molsysviewer protein.pdb --isolate "chain_id A" --shapes pockets.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use molsysviewer::{
    JsonLinesTransport, MolSysView, Options, Selection, ShapeRequest,
    StructureIndices, SystemSource,
};

#[derive(Parser)]
#[command(name = "molsysviewer")]
#[command(about = "Emit viewer commands for a molecular system as JSON lines")]
struct Cli {
    /// Viewer JSON document (`.json`), mmCIF (`.cif`) or PDB file
    input: Option<PathBuf>,

    /// Options TOML file
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Display label for the structure
    #[arg(short, long)]
    label: Option<String>,

    /// Atom selection applied at load time
    #[arg(long, default_value = "all")]
    selection: String,

    /// Frames to keep (comma-separated, zero-based)
    #[arg(long, value_delimiter = ',')]
    frames: Option<Vec<usize>>,

    /// Show only these atoms (applied first)
    #[arg(long, value_name = "SELECTION")]
    isolate: Option<String>,

    /// Hide these atoms (repeatable, applied after --isolate)
    #[arg(long, value_name = "SELECTION")]
    hide: Vec<String>,

    /// Show these atoms (repeatable, applied last)
    #[arg(long, value_name = "SELECTION")]
    show: Vec<String>,

    /// JSON file holding an array of shape requests
    #[arg(long, value_name = "FILE")]
    shapes: Option<PathBuf>,

    /// Print the options JSON schema and exit
    #[arg(long)]
    schema: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.schema {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &Options::json_schema())?;
        writeln!(out)?;
        return Ok(());
    }
    let Some(input) = &cli.input else {
        anyhow::bail!("an input file is required");
    };

    let options = match &cli.options {
        Some(path) => Options::load(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => Options::default(),
    };

    let transport = JsonLinesTransport::new(io::stdout().lock());
    let mut view = MolSysView::builder(transport).with_options(options).build();

    let frames = cli
        .frames
        .clone()
        .map_or(StructureIndices::All, StructureIndices::from);
    view.load(
        &SystemSource::Path(input.clone()),
        &Selection::from(cli.selection.as_str()),
        &frames,
        cli.label.as_deref(),
    )
    .with_context(|| format!("loading {}", input.display()))?;

    if let Some(sel) = &cli.isolate {
        view.isolate(&Selection::from(sel.as_str()))?;
    }
    for sel in &cli.hide {
        view.hide(&Selection::from(sel.as_str()))?;
    }
    for sel in &cli.show {
        view.show(&Selection::from(sel.as_str()))?;
    }

    if let Some(path) = &cli.shapes {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let requests: Vec<serde_json::Value> = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        for (i, raw) in requests.iter().enumerate() {
            let request = ShapeRequest::from_json(raw)
                .with_context(|| format!("shape request {i}"))?;
            view.shapes()
                .apply(&request)
                .with_context(|| format!("shape request {i}"))?;
        }
    }

    // Stand in for the front-end's readiness event.
    let _ = view.handle_frontend_message(&serde_json::json!({ "event": "ready" }));
    Ok(())
}
