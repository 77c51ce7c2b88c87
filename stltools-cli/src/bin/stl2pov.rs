/// stl2pov - convert STL files into POV-ray mesh declarations
///
/// Every input `name.stl` becomes `name.inc` in the current directory. Files
/// are converted in parallel; a file that fails is reported and skipped.
/// Inputs that map to the same output name are converted one after another,
/// so the last of them wins.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use rayon::prelude::*;
use stltools_cli::{create_output, group_by_output, init_logging, load_mesh, CommonArgs};
use stltools_core::{pov, ReadOptions};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "stl2pov", version, arg_required_else_help = true)]
#[command(about = "Convert STL files into POV-ray mesh or mesh2 objects")]
struct Cli {
    /// Generate a mesh2 object
    #[arg(short = '2', long)]
    mesh2: bool,

    #[command(flatten)]
    common: CommonArgs,

    /// One or more STL files
    files: Vec<PathBuf>,
}

fn convert(path: &Path, out: &Path, mesh2: bool, options: &ReadOptions) -> Result<()> {
    let mesh = load_mesh(path, options)?;
    let identifier = pov::identifier(&mesh.name, path);

    let mut w = create_output(out)?;
    writeln!(w, "// Generated by stl2pov {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, "// Source file name: \"{}\"", path.display())?;
    if mesh2 {
        pov::write_mesh2(&mut w, &identifier, &mesh)?;
    } else {
        pov::write_mesh(&mut w, &identifier, &mesh)?;
    }
    w.flush()?;
    Ok(())
}

fn is_stl(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"))
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

    let (inputs, skipped): (Vec<PathBuf>, Vec<PathBuf>) =
        cli.files.iter().cloned().partition(|path| is_stl(path));
    for path in &skipped {
        warn!(
            "the file \"{}\" is probably not an STL file, skipping",
            path.display()
        );
    }

    let failed: usize = group_by_output(&inputs, "inc")
        .par_iter()
        .map(|(out, paths)| {
            if paths.len() > 1 {
                warn!(
                    "{} input files map to \"{}\", later ones replace earlier ones",
                    paths.len(),
                    out
                );
            }
            let out = Path::new(out);
            paths
                .iter()
                .filter(|path| match convert(path, out, cli.mesh2, &options) {
                    Ok(()) => {
                        info!("done with \"{}\" -> \"{}\"", path.display(), out.display());
                        false
                    }
                    Err(e) => {
                        error!("{e:#}");
                        true
                    }
                })
                .count()
        })
        .sum();

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
