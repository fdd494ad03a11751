//! Interactive geometry viewer
//!
//! Loads the geometry files named on the command line into one scene and
//! opens an interactive window. Files that fail to load are reported and
//! skipped; the viewer still opens for whatever did load.

use anyhow::Result;
use clap::Parser;
use geomviewer_view::ViewerSession;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geomviewer")]
#[command(about = "Interactive 3D geometry viewer")]
struct Args {
    /// Geometry files to load (.vtp, .vtu, .obj, .ply, .stl)
    files: Vec<PathBuf>,

    /// Mouse-wheel zoom-step multiplier
    #[arg(long, default_value_t = 1.0)]
    scroll_sensitivity: f32,

    /// Show edge lines on the loaded geometry
    #[arg(long)]
    edges: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut session = ViewerSession::new();
    session.initialize()?;
    session.set_scroll_sensitivity(args.scroll_sensitivity)?;

    for file in &args.files {
        if let Err(e) = session.load_data_file(file) {
            log::error!("Skipping {}: {}", file.display(), e);
        }
    }
    if args.edges {
        session.set_edge_visibility(true)?;
    }

    session.run()?;
    Ok(())
}
