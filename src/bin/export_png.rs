use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sms_gfx_editor::persist;

/// Render a project's tile set to a PNG image at scale 1.
#[derive(Parser, Debug)]
struct Args {
    /// Project JSON file
    project: PathBuf,

    /// PNG file to write
    output: PathBuf,

    /// Index of the palette to colour the tiles with
    #[arg(long, default_value_t = 0)]
    palette: usize,
}

pub fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let project = persist::load_project(&args.project)?;
    persist::export_png(&project, args.palette, &args.output)?;
    Ok(())
}
