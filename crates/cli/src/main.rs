//! `wallmask`: label the wall points of a scanned point cloud from the wall
//! lines of a DXF floor plan.

#![forbid(unsafe_code)]

mod commands;
mod paths;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wallmask", version)]
#[command(about = "Label wall points in a point cloud from a DXF wall mask")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Label every point and write a color-coded overlay cloud
    Label(LabelArgs),
    /// Label a random subset for a quick alignment check
    Preview(PreviewArgs),
    /// Combine a cloud and its overlay into a labeled .npy table
    MakeNpy(MakeNpyArgs),
    /// Render a labeled .npy table back to an original and a mask cloud
    #[command(name = "npy2ply")]
    Npy2Ply(Npy2PlyArgs),
    /// Print layer / entity type / line type counts of a drawing as JSON
    InspectDxf(InspectDxfArgs),
}

/// Inputs shared by every command that builds a wall mask.
#[derive(Args)]
struct MaskArgs {
    /// Input DXF drawing
    dxf: PathBuf,

    /// Input point cloud (.ply or .las)
    cloud: PathBuf,

    /// Extraction filter (JSON: layer -> entity type -> line types)
    #[arg(short, long, default_value = "default.config")]
    config: PathBuf,

    /// Mask points per drawing unit of length
    #[arg(long, default_value = "100")]
    density: f64,

    /// Plan-view distance within which a point is a wall point
    #[arg(short, long, default_value = "0.04")]
    threshold: f64,
}

#[derive(Args)]
struct LabelArgs {
    #[command(flatten)]
    mask: MaskArgs,

    /// Output overlay cloud [default: <cloud>_label.ply, numbered if taken]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the labeled table to this .npy file
    #[arg(long)]
    npy: Option<PathBuf>,

    /// Wall label code for --npy
    #[arg(long, default_value = "2")]
    fg: i32,

    /// Other label code for --npy
    #[arg(long, default_value = "12")]
    bg: i32,
}

#[derive(Args)]
struct PreviewArgs {
    #[command(flatten)]
    mask: MaskArgs,

    /// Share of points to label, in [0, 1]
    #[arg(long, default_value = "0.01")]
    rate: f64,

    /// Sampling seed [default: random]
    #[arg(long)]
    seed: Option<u64>,

    /// Output preview cloud [default: <cloud>_preview.ply]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct MakeNpyArgs {
    /// Overlay cloud written by `label`
    overlay: PathBuf,

    /// Original point cloud, same points in the same order as the overlay.
    /// Without it the overlay's positions are stored with gray colors.
    #[arg(long)]
    cloud: Option<PathBuf>,

    /// Output table [default: <cloud>_labeled.npy, or <overlay>.npy]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wall label code
    #[arg(long, default_value = "2")]
    fg: i32,

    /// Other label code
    #[arg(long, default_value = "12")]
    bg: i32,
}

#[derive(Args)]
struct Npy2PlyArgs {
    /// Labeled table (N x 7: x y z r g b label)
    npy: PathBuf,

    /// Wall label code
    #[arg(long, default_value = "2")]
    fg: i32,
}

#[derive(Args)]
struct InspectDxfArgs {
    /// Input DXF drawing
    dxf: PathBuf,

    /// Only report these layers
    layers: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Label(args) => commands::label(&args),
        Command::Preview(args) => commands::preview(&args),
        Command::MakeNpy(args) => commands::make_npy(&args),
        Command::Npy2Ply(args) => commands::npy2ply(&args),
        Command::InspectDxf(args) => commands::inspect_dxf(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn label_defaults() {
        let cli = Cli::try_parse_from(["wallmask", "label", "plan.dxf", "room.ply"]).unwrap();
        let Command::Label(args) = cli.command else {
            panic!("expected label");
        };
        assert_eq!(args.mask.config, PathBuf::from("default.config"));
        assert_eq!(args.mask.density, 100.0);
        assert_eq!(args.mask.threshold, 0.04);
        assert_eq!((args.fg, args.bg), (2, 12));
        assert!(args.output.is_none());
    }

    #[test]
    fn npy2ply_takes_fg_code() {
        let cli = Cli::try_parse_from(["wallmask", "npy2ply", "scan.npy", "--fg", "5"]).unwrap();
        let Command::Npy2Ply(args) = cli.command else {
            panic!("expected npy2ply");
        };
        assert_eq!(args.fg, 5);
    }
}
