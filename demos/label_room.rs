use wallmask::drawing::{build_reference_mask, extract, Drawing, DrawingEntity, ExtractionFilter};
use wallmask::labeling::{encode, label_cloud};
use wallmask::model::count_foreground;
use wallmask::{LabelCodes, PointCloud};

fn main() {
    // A 4 x 3 room outline and a partition wall, drawn on the wall layer
    let drawing = Drawing::from_entities(vec![
        DrawingEntity::polyline(
            "A-WALL",
            "BYLAYER",
            &[
                [0.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [4.0, 3.0, 0.0],
                [0.0, 3.0, 0.0],
                [0.0, 0.0, 0.0],
            ],
        ),
        DrawingEntity::line("A-WALL", "CONTINUOUS", [2.0, 0.0, 0.0], [2.0, 3.0, 0.0]),
        DrawingEntity::line("A-FURN", "CONTINUOUS", [0.5, 1.0, 0.0], [1.5, 1.0, 0.0]),
    ]);
    let filter = ExtractionFilter::new()
        .with_rule("A-WALL", "LWPOLYLINE", ["BYLAYER"])
        .with_rule("A-WALL", "LINE", ["CONTINUOUS"]);

    let mask = build_reference_mask(&extract(&drawing, &filter), 100.0)
        .expect("room geometry is finite");
    println!("Reference mask: {} points", mask.points.len());

    // A synthetic scan: a grid over the floor at several heights
    let mut points = Vec::new();
    for i in 0..=40 {
        for j in 0..=30 {
            for k in 0..3 {
                points.push([f64::from(i) * 0.1, f64::from(j) * 0.1, f64::from(k) * 1.2]);
            }
        }
    }
    let scan = PointCloud::from_points(&points);
    println!("Scan: {} points", scan.len());

    let classes = label_cloud(&scan, &mask.points, 0.04).expect("threshold is valid");
    println!("Wall points: {}", count_foreground(&classes));

    let labeled = encode(&scan, &classes, LabelCodes::default()).expect("codes are distinct");
    println!("First row: {:?}", labeled.records[0].to_row());
}
