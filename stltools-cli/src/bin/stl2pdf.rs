/// stl2pdf - draw a view of an STL model as a PDF page
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stltools_cli::{
    create_output, init_logging, load_mesh, outname, parse_canvas, parse_with_matches,
    rotations, CommonArgs, RotationArgs,
};
use stltools_core::pdf::write_pdf;
use stltools_core::{compose, project, PdfOptions, Rgb, ViewOptions};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "stl2pdf", version)]
#[command(about = "Convert a view of an STL file into a PDF file")]
struct Cli {
    /// Add the model coordinate system to the image
    #[arg(short, long)]
    axes: bool,

    /// Canvas size in PostScript points
    #[arg(short, long, default_value = "200", value_parser = parse_canvas)]
    canvas: f32,

    /// Foreground color in 6-digit hexadecimal RGB
    #[arg(short, long, value_name = "RRGGBB", default_value = "E6E6E6")]
    foreground: Rgb,

    /// Output file name
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    rotations: RotationArgs,

    #[command(flatten)]
    common: CommonArgs,

    /// The STL file to draw
    file: PathBuf,
}

fn main() -> Result<()> {
    let (cli, matches) = parse_with_matches::<Cli>();
    init_logging(cli.common.log);

    let rotation = compose(&rotations(&matches))?;
    debug!("rotation matrix: {}", rotation);
    let out = cli.output.clone().unwrap_or_else(|| {
        let out = PathBuf::from(outname(&cli.file, "pdf"));
        info!("no output filename given, using \"{}\"", out.display());
        out
    });

    let mesh = load_mesh(&cli.file, &cli.common.read_options()?)?;
    let view = ViewOptions {
        canvas: cli.canvas,
        flip_y: true,
    };
    let projection = project(&mesh.transformed(&rotation), &view)
        .with_context(|| format!("cannot draw \"{}\"", cli.file.display()))?;

    let options = PdfOptions {
        foreground: cli.foreground,
        axes: cli.axes,
    };
    let mut w = create_output(&out)?;
    write_pdf(&mut w, &projection, &rotation, &options)?;
    w.flush()?;
    Ok(())
}
