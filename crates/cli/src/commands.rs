use std::path::Path;

use anyhow::{ensure, Context, Result};
use log::{info, warn};
use wallmask_core::{count_foreground, Colors, LabelCodes, PointCloud};
use wallmask_drawing::{build_reference_mask, extract, DrawingStats, ExtractionFilter};
use wallmask_labeling::{
    classify_overlay, decode, encode, label_cloud, label_preview, label_preview_seeded,
    overlay_cloud,
};

use crate::paths::{free_label_path, with_suffix};
use crate::{InspectDxfArgs, LabelArgs, MakeNpyArgs, MaskArgs, Npy2PlyArgs, PreviewArgs};

fn read_cloud(path: &Path) -> Result<PointCloud> {
    let cloud = wallmask_io::read_cloud(path)
        .with_context(|| format!("reading point cloud {}", path.display()))?;
    info!("{}: {} points", path.display(), cloud.len());
    Ok(cloud)
}

fn write_cloud(path: &Path, cloud: &PointCloud) -> Result<()> {
    wallmask_io::write_ply_binary(path, cloud)
        .with_context(|| format!("writing {}", path.display()))?;
    info!("saved {} points to {}", cloud.len(), path.display());
    Ok(())
}

/// Load the filter, read the drawing and sample its wall entities.
fn load_mask(args: &MaskArgs) -> Result<PointCloud> {
    let filter = ExtractionFilter::from_path(&args.config).with_context(|| {
        format!(
            "loading extraction filter {} (pass one with --config)",
            args.config.display()
        )
    })?;
    info!(
        "using filter {} for layers {:?}",
        args.config.display(),
        filter.layers().collect::<Vec<_>>()
    );

    let drawing = wallmask_io::read_dxf(&args.dxf)
        .with_context(|| format!("reading drawing {}", args.dxf.display()))?;
    let extracted = extract(&drawing, &filter);
    let mask = build_reference_mask(&extracted, args.density)?;

    info!(
        "mask: {} points from {} of {} entities",
        mask.points.len(),
        extracted.len(),
        drawing.len()
    );
    if mask.skipped_count() > 0 {
        warn!("skipped entities without interpolation: {:?}", mask.skipped);
    }
    if mask.points.is_empty() {
        warn!("wall mask is empty; check the filter layers against `wallmask inspect-dxf`");
    }
    Ok(mask.points)
}

pub fn label(args: &LabelArgs) -> Result<()> {
    let codes = LabelCodes::new(args.fg, args.bg);
    ensure!(codes.is_distinct(), "--fg and --bg must differ");

    let mask = load_mask(&args.mask)?;
    let cloud = read_cloud(&args.mask.cloud)?;
    let output = match &args.output {
        Some(path) => path.clone(),
        None => free_label_path(&args.mask.cloud),
    };

    info!("labeling, please wait...");
    let classes = label_cloud(&cloud, &mask, args.mask.threshold)?;
    info!(
        "{} of {} points are wall",
        count_foreground(&classes),
        classes.len()
    );

    write_cloud(&output, &overlay_cloud(&cloud, &classes)?)?;

    if let Some(npy) = &args.npy {
        let labeled = encode(&cloud, &classes, codes)?;
        wallmask_io::write_labeled_npy(npy, &labeled)
            .with_context(|| format!("writing {}", npy.display()))?;
        info!("saved labeled table to {}", npy.display());
    }
    Ok(())
}

pub fn preview(args: &PreviewArgs) -> Result<()> {
    let mask = load_mask(&args.mask)?;
    let cloud = read_cloud(&args.mask.cloud)?;

    let preview = match args.seed {
        Some(seed) => label_preview_seeded(&cloud, &mask, args.mask.threshold, args.rate, seed)?,
        None => label_preview(&cloud, &mask, args.mask.threshold, args.rate)?,
    };
    info!(
        "preview: {} of {} sampled points are wall",
        count_foreground(&preview.classes),
        preview.indices.len()
    );

    let output = match &args.output {
        Some(path) => path.clone(),
        None => with_suffix(&args.mask.cloud, "_preview", "ply"),
    };
    write_cloud(&output, &preview.cloud)
}

/// Color stored for every point when no original cloud is given.
const PLACEHOLDER_GRAY: u8 = 200;

pub fn make_npy(args: &MakeNpyArgs) -> Result<()> {
    let overlay = read_cloud(&args.overlay)?;
    let classes = classify_overlay(&overlay)
        .with_context(|| format!("reading labels from {}", args.overlay.display()))?;

    let (cloud, default_output) = match &args.cloud {
        Some(path) => {
            let cloud = read_cloud(path)?;
            ensure!(
                cloud.len() == overlay.len(),
                "{} has {} points but {} has {}; the overlay must come from the same cloud",
                path.display(),
                cloud.len(),
                args.overlay.display(),
                overlay.len()
            );
            (cloud, with_suffix(path, "_labeled", "npy"))
        }
        None => {
            warn!(
                "no original cloud given; storing {} with gray colors",
                args.overlay.display()
            );
            let gray = f32::from(PLACEHOLDER_GRAY) / 255.0;
            let cloud = PointCloud::from_xyz(overlay.x, overlay.y, overlay.z)
                .with_colors(Colors::uniform(classes.len(), [gray; 3]));
            (cloud, with_suffix(&args.overlay, "", "npy"))
        }
    };

    let labeled = encode(&cloud, &classes, LabelCodes::new(args.fg, args.bg))?;
    let output = args.output.clone().unwrap_or(default_output);
    wallmask_io::write_labeled_npy(&output, &labeled)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "saved {} rows ({} wall) to {}",
        labeled.len(),
        count_foreground(&classes),
        output.display()
    );
    Ok(())
}

pub fn npy2ply(args: &Npy2PlyArgs) -> Result<()> {
    let labeled = wallmask_io::read_labeled_npy(&args.npy)
        .with_context(|| format!("reading {}", args.npy.display()))?;
    let decoded = decode(&labeled, args.fg);

    write_cloud(&with_suffix(&args.npy, "", "ply"), &decoded.original)?;
    write_cloud(&with_suffix(&args.npy, "_mask", "ply"), &decoded.overlay)
}

pub fn inspect_dxf(args: &InspectDxfArgs) -> Result<()> {
    let drawing = wallmask_io::read_dxf(&args.dxf)
        .with_context(|| format!("reading drawing {}", args.dxf.display()))?;
    let mut stats = DrawingStats::collect(&drawing);
    if !args.layers.is_empty() {
        stats.retain_layers(&args.layers);
        for missing in args
            .layers
            .iter()
            .filter(|name| !stats.layer_names().any(|layer| layer == name.as_str()))
        {
            warn!("layer {missing} is not in {}", args.dxf.display());
        }
    }
    println!("{}", stats.to_json_pretty()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wallmask_core::Classification;

    const PLAN: &str = "0\nSECTION\n2\nENTITIES\n\
        0\nLINE\n8\nWALL\n10\n0\n20\n0\n11\n2\n21\n0\n\
        0\nLINE\n8\nFURNITURE\n10\n0\n20\n5\n11\n2\n21\n5\n\
        0\nENDSEC\n0\nEOF\n";

    fn mask_args(dir: &Path) -> MaskArgs {
        let dxf = dir.join("plan.dxf");
        let config = dir.join("walls.json");
        let cloud = dir.join("room.ply");
        fs::write(&dxf, PLAN).unwrap();
        fs::write(&config, r#"{"WALL": {"LINE": ["BYLAYER"]}}"#).unwrap();

        let room = PointCloud::from_xyz(
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.01, 0.5, 5.0, -0.03],
            vec![0.0, 1.0, 2.0, 3.0],
        )
        .with_colors(Colors::uniform(4, [0.2, 0.4, 0.6]));
        wallmask_io::write_ply(&cloud, &room).unwrap();

        MaskArgs {
            dxf,
            cloud,
            config,
            density: 10.0,
            threshold: 0.04,
        }
    }

    #[test]
    fn label_then_make_npy_then_npy2ply() {
        let dir = tempfile::tempdir().unwrap();
        let mask = mask_args(dir.path());
        let overlay_path = dir.path().join("room_label.ply");

        label(&LabelArgs {
            mask,
            output: None,
            npy: None,
            fg: 2,
            bg: 12,
        })
        .unwrap();

        let overlay = wallmask_io::read_ply(&overlay_path).unwrap();
        assert_eq!(
            classify_overlay(&overlay).unwrap(),
            vec![
                Classification::Foreground,
                Classification::Background,
                Classification::Background,
                Classification::Foreground,
            ]
        );

        let npy = dir.path().join("room_labeled.npy");
        make_npy(&MakeNpyArgs {
            overlay: overlay_path,
            cloud: Some(dir.path().join("room.ply")),
            output: None,
            fg: 2,
            bg: 12,
        })
        .unwrap();
        let labeled = wallmask_io::read_labeled_npy(&npy).unwrap();
        let codes: Vec<i32> = labeled.records.iter().map(|r| r.class_code).collect();
        assert_eq!(codes, vec![2, 12, 12, 2]);
        assert_eq!(labeled.records[0].color, [51, 102, 153]);

        npy2ply(&Npy2PlyArgs { npy, fg: 2 }).unwrap();
        let original = wallmask_io::read_ply(dir.path().join("room_labeled.ply")).unwrap();
        let rendered_mask = wallmask_io::read_ply(dir.path().join("room_labeled_mask.ply")).unwrap();
        assert_eq!(original.len(), 4);
        assert_eq!(original.colors.unwrap().get_bytes(2), [51, 102, 153]);
        assert_eq!(classify_overlay(&rendered_mask).unwrap()[3], Classification::Foreground);
    }

    #[test]
    fn label_writes_npy_alongside() {
        let dir = tempfile::tempdir().unwrap();
        let npy = dir.path().join("out.npy");
        label(&LabelArgs {
            mask: mask_args(dir.path()),
            output: Some(dir.path().join("out.ply")),
            npy: Some(npy.clone()),
            fg: 5,
            bg: 0,
        })
        .unwrap();
        let labeled = wallmask_io::read_labeled_npy(&npy).unwrap();
        assert_eq!(labeled.classification(5)[0], Classification::Foreground);
        assert!(dir.path().join("out.ply").exists());
    }

    #[test]
    fn preview_with_seed_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let out_a = dir.path().join("a.ply");
        let out_b = dir.path().join("b.ply");
        for output in [&out_a, &out_b] {
            preview(&PreviewArgs {
                mask: mask_args(dir.path()),
                rate: 0.5,
                seed: Some(3),
                output: Some(output.clone()),
            })
            .unwrap();
        }
        let a = wallmask_io::read_ply(&out_a).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a, wallmask_io::read_ply(&out_b).unwrap());
    }

    #[test]
    fn missing_filter_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut mask = mask_args(dir.path());
        mask.config = dir.path().join("nope.json");
        let err = label(&LabelArgs {
            mask,
            output: None,
            npy: None,
            fg: 2,
            bg: 12,
        })
        .unwrap_err();
        assert!(err.to_string().contains("extraction filter"));
        assert!(!dir.path().join("room_label.ply").exists());
    }

    #[test]
    fn make_npy_rejects_mismatched_clouds() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = dir.path().join("a.ply");
        let overlay = dir.path().join("b.ply");
        wallmask_io::write_ply(&cloud, &PointCloud::from_xyz(vec![0.0], vec![0.0], vec![0.0]))
            .unwrap();
        wallmask_io::write_ply(&overlay, &PointCloud::new().with_colors(Colors::with_capacity(0)))
            .unwrap();
        assert!(make_npy(&MakeNpyArgs {
            overlay,
            cloud: Some(cloud),
            output: None,
            fg: 2,
            bg: 12,
        })
        .is_err());
    }

    #[test]
    fn make_npy_without_cloud_stores_gray_overlay_points() {
        let dir = tempfile::tempdir().unwrap();
        let overlay = dir.path().join("scan_label.ply");
        let mut colors = Colors::with_capacity(2);
        colors.push([0.0, 1.0, 0.0]);
        colors.push([0.3, 0.3, 0.3]);
        wallmask_io::write_ply_binary(
            &overlay,
            &PointCloud::from_points(&[[500_000.25, 4_500_000.5, 1.0], [1.0, 2.0, 3.0]])
                .with_colors(colors),
        )
        .unwrap();

        make_npy(&MakeNpyArgs {
            overlay,
            cloud: None,
            output: None,
            fg: 2,
            bg: 12,
        })
        .unwrap();

        let labeled = wallmask_io::read_labeled_npy(dir.path().join("scan_label.npy")).unwrap();
        assert_eq!(labeled.records[0].position, [500_000.25, 4_500_000.5, 1.0]);
        assert_eq!(labeled.records[0].class_code, 2);
        assert_eq!(labeled.records[1].class_code, 12);
        assert!(labeled.records.iter().all(|r| r.color == [200, 200, 200]));
    }
}
