//! Shared pieces of the stltools command line programs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgMatches, Args, Parser, ValueEnum};
use stltools_core::stl::read_stl;
use stltools_core::{Axis, Mesh, Operation, ReadOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Logging verbosity for `--log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log to stderr. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Options every program takes.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Encoding for the name of the STL object
    #[arg(short, long, default_value = "utf-8")]
    pub encoding: String,

    /// Logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Warning)]
    pub log: LogLevel,
}

impl CommonArgs {
    pub fn read_options(&self) -> Result<ReadOptions> {
        Ok(ReadOptions::with_encoding(&self.encoding)?)
    }
}

/// Rotations of the model before it is drawn.
///
/// The flags may be repeated and mixed; the rotations are applied in the
/// order they appear on the command line.
#[derive(Debug, Clone, Args)]
pub struct RotationArgs {
    /// Rotation around the X axis in degrees
    #[arg(short = 'x', value_name = "DEG", allow_negative_numbers = true)]
    pub x: Vec<f32>,

    /// Rotation around the Y axis in degrees
    #[arg(short = 'y', value_name = "DEG", allow_negative_numbers = true)]
    pub y: Vec<f32>,

    /// Rotation around the Z axis in degrees
    #[arg(short = 'z', value_name = "DEG", allow_negative_numbers = true)]
    pub z: Vec<f32>,
}

/// Parse the command line, keeping the raw matches for [`rotations`].
pub fn parse_with_matches<T: Parser>() -> (T, ArgMatches) {
    let matches = T::command().get_matches();
    match T::from_arg_matches(&matches) {
        Ok(args) => (args, matches),
        Err(e) => e.exit(),
    }
}

/// The rotations given with `-x`, `-y` and `-z`, in command line order.
pub fn rotations(matches: &ArgMatches) -> Vec<Operation> {
    let mut found: Vec<(usize, Operation)> = Vec::new();
    for (id, axis) in [("x", Axis::X), ("y", Axis::Y), ("z", Axis::Z)] {
        let (Some(indices), Some(values)) = (matches.indices_of(id), matches.get_many::<f32>(id))
        else {
            continue;
        };
        found.extend(
            indices
                .zip(values)
                .map(|(i, &deg)| (i, Operation::Rotate(axis, deg))),
        );
    }
    found.sort_by_key(|(i, _)| *i);
    found.into_iter().map(|(_, op)| op).collect()
}

/// Canvas sizes must be positive.
pub fn parse_canvas(s: &str) -> std::result::Result<f32, String> {
    let size: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(format!("canvas size must be positive, not {size}"))
    }
}

/// Name of the output file for `input`, in the current directory.
///
/// Leading dots and whitespace are removed from the file stem, and runs of
/// whitespace become underscores.
pub fn outname(input: &Path, extension: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end();
    let name = stem.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{}.{}", name, extension.trim_start_matches('.'))
}

/// Group `inputs` by the output file name they map to.
///
/// Groups are ordered by output name; inputs keep their command line order
/// within a group.
pub fn group_by_output<'a>(
    inputs: &'a [PathBuf],
    extension: &str,
) -> Vec<(String, Vec<&'a Path>)> {
    let mut groups: BTreeMap<String, Vec<&Path>> = BTreeMap::new();
    for input in inputs {
        groups
            .entry(outname(input, extension))
            .or_default()
            .push(input.as_path());
    }
    groups.into_iter().collect()
}

/// Read an STL file into an indexed mesh.
pub fn load_mesh(path: &Path, options: &ReadOptions) -> Result<Mesh> {
    info!("reading STL file \"{}\"", path.display());
    let stl = read_stl(path, options)?;
    let mesh = Mesh::from(stl);
    let degenerate = mesh.degenerate_facets().len();
    if degenerate > 0 {
        warn!(
            "\"{}\" has {} degenerate facets",
            path.display(),
            degenerate
        );
    }
    Ok(mesh)
}

/// Create `path` for writing.
pub fn create_output(path: &Path) -> Result<std::io::BufWriter<std::fs::File>> {
    info!("writing output file \"{}\"", path.display());
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot write output file \"{}\"", path.display()))?;
    Ok(std::io::BufWriter::new(file))
}
