/// stlinfo - print statistics of STL files
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use nalgebra::Point3;
use stltools_cli::{init_logging, load_mesh, CommonArgs};
use stltools_core::ReadOptions;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "stlinfo", version, arg_required_else_help = true)]
#[command(about = "Print the name, size and facet statistics of STL files")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// One or more STL files
    files: Vec<PathBuf>,
}

fn point(p: &Point3<f32>) -> String {
    format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
}

fn field<W: Write>(w: &mut W, label: &str, value: impl std::fmt::Display) -> Result<()> {
    queue!(
        w,
        SetForegroundColor(Color::Cyan),
        Print(format!("  {label:<18}")),
        ResetColor,
        Print(format!("{value}\n"))
    )?;
    Ok(())
}

fn report<W: Write>(w: &mut W, path: &Path, options: &ReadOptions) -> Result<()> {
    let mesh = load_mesh(path, options)?;
    let bb = mesh
        .bounding_box()
        .with_context(|| format!("\"{}\" has no facets", path.display()))?;
    let mean = mesh
        .mean_point()
        .with_context(|| format!("\"{}\" has no facets", path.display()))?;

    queue!(
        w,
        SetForegroundColor(Color::Yellow),
        Print(format!("{}\n", path.display())),
        ResetColor
    )?;
    field(w, "name", format!("\"{}\"", mesh.name))?;
    field(w, "facets", mesh.len())?;
    field(w, "unique vertices", mesh.vertices.len())?;
    field(w, "unique normals", mesh.normals.len())?;
    field(w, "degenerate facets", mesh.degenerate_facets().len())?;
    for (axis, lo, hi) in [
        ("x", bb.min.x, bb.max.x),
        ("y", bb.min.y, bb.max.y),
        ("z", bb.min.z, bb.max.z),
    ] {
        field(w, &format!("{axis} range"), format!("{lo:.3} ≤ {axis} ≤ {hi:.3}"))?;
    }
    field(w, "center", point(&bb.center()))?;
    field(w, "mean point", point(&mean))?;
    w.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.common.log);

    let options = match cli.common.read_options() {
        Ok(options) => options,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = stdout();
    let mut failed = false;
    for path in &cli.files {
        if let Err(e) = report(&mut stdout, path, &options) {
            error!("{e:#}");
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
