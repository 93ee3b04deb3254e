use wallmask::drawing::{build_reference_mask, extract, ExtractionFilter};
use wallmask::io::{
    parse_dxf, read_cloud, read_dxf, read_labeled_npy, write_labeled_npy, write_ply,
    write_ply_binary,
};
use wallmask::labeling::{classify_overlay, decode, encode, label_cloud, overlay_cloud};
use wallmask::model::Colors;
use wallmask::{Classification, LabelCodes, PointCloud};

use Classification::{Background, Foreground};

fn colored_scan() -> PointCloud {
    let mut colors = Colors::with_capacity(4);
    colors.push_bytes([10, 20, 30]);
    colors.push_bytes([255, 255, 255]);
    colors.push_bytes([0, 255, 0]);
    colors.push_bytes([128, 64, 32]);
    PointCloud::from_points(&[
        [0.5, 1.25, -3.0],
        [100.125, -7.5, 2.0],
        [0.0, 0.0, 0.0],
        [-1.0, 2.0, 1e4],
    ])
    .with_colors(colors)
}

#[test]
fn overlay_file_then_npy_then_back() {
    let dir = tempfile::tempdir().unwrap();
    let cloud = colored_scan();
    let classes = vec![Foreground, Background, Background, Foreground];

    // a green input point is not mistaken for a wall: labels come from the overlay
    let overlay_path = dir.path().join("scan_label.ply");
    write_ply_binary(&overlay_path, &overlay_cloud(&cloud, &classes).unwrap()).unwrap();
    let overlay = read_cloud(&overlay_path).unwrap();
    assert_eq!(classify_overlay(&overlay).unwrap(), classes);

    for codes in [LabelCodes::default(), LabelCodes::new(5, 0)] {
        let npy_path = dir.path().join(format!("scan_{}.npy", codes.foreground));
        let labeled = encode(&cloud, &classes, codes).unwrap();
        write_labeled_npy(&npy_path, &labeled).unwrap();

        let loaded = read_labeled_npy(&npy_path).unwrap();
        assert_eq!(loaded, labeled);
        assert_eq!(loaded.classification(codes.foreground), classes);

        let decoded = decode(&loaded, codes.foreground);
        assert_eq!(decoded.original.x, cloud.x);
        assert_eq!(decoded.original.colors, cloud.colors);
        assert_eq!(classify_overlay(&decoded.overlay).unwrap(), classes);
    }
}

#[test]
fn ascii_and_binary_ply_agree() {
    let dir = tempfile::tempdir().unwrap();
    let cloud = colored_scan();
    let ascii = dir.path().join("a.ply");
    let binary = dir.path().join("b.ply");
    write_ply(&ascii, &cloud).unwrap();
    write_ply_binary(&binary, &cloud).unwrap();

    let a = read_cloud(&ascii).unwrap();
    let b = read_cloud(&binary).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, cloud);
}

#[test]
fn numpy_written_header_is_readable() {
    // header as numpy 1.x writes it for np.zeros((1, 7))
    let dict = "{'descr': '<f8', 'fortran_order': False, 'shape': (1, 7), }";
    let mut header = dict.to_string();
    while (10 + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');

    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for v in [1.0f64, 2.0, 3.0, 200.0, 200.0, 200.0, 12.0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("from_numpy.npy");
    std::fs::write(&path, bytes).unwrap();

    let labeled = read_labeled_npy(&path).unwrap();
    assert_eq!(labeled.records[0].position, [1.0, 2.0, 3.0]);
    assert_eq!(labeled.records[0].color, [200, 200, 200]);
    assert_eq!(labeled.classification(2), vec![Background]);
}

#[test]
fn dxf_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.dxf");
    std::fs::write(
        &path,
        "0\r\nSECTION\r\n2\r\nENTITIES\r\n0\r\nLINE\r\n8\r\nWALL\r\n10\r\n0\r\n20\r\n0\r\n11\r\n1\r\n21\r\n0\r\n0\r\nENDSEC\r\n0\r\nEOF\r\n",
    )
    .unwrap();
    let drawing = read_dxf(&path).unwrap();
    assert_eq!(drawing.len(), 1);
    assert_eq!(drawing.entities()[0].layer, "WALL");
}

#[test]
fn read_cloud_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_cloud(dir.path().join("missing.ply")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

/// A survey-grid drawing (UTM-like eastings/northings) and a scan in the same
/// frame: centimetre offsets must still decide the label, and positions must
/// come back bit-for-bit after every file hop.
#[test]
fn georeferenced_scan_keeps_positions_through_every_file() {
    let dxf = "0\nSECTION\n2\nENTITIES\n\
0\nLINE\n8\nWALL\n10\n500000.0\n20\n4500000.0\n11\n500010.0\n21\n4500000.0\n\
0\nENDSEC\n0\nEOF\n";
    let drawing = parse_dxf(dxf).unwrap();
    let filter = ExtractionFilter::new().with_rule("WALL", "LINE", ["BYLAYER"]);
    let mask = build_reference_mask(&extract(&drawing, &filter), 100.0).unwrap();
    assert_eq!(mask.points.len(), 1000);

    let dir = tempfile::tempdir().unwrap();
    let scan_path = dir.path().join("survey.ply");
    let scan = PointCloud::from_points(&[
        [500_005.0, 4_500_000.12, 101.5],
        [500_005.0, 4_500_000.03, 101.5],
        [500_005.123, 4_500_000.456, 99.875],
    ])
    .with_colors(Colors::uniform(3, [0.5, 0.25, 1.0]));
    write_ply_binary(&scan_path, &scan).unwrap();
    let cloud = read_cloud(&scan_path).unwrap();
    assert_eq!(cloud.x, scan.x);
    assert_eq!(cloud.y, scan.y);

    let classes = label_cloud(&cloud, &mask.points, 0.04).unwrap();
    assert_eq!(classes, vec![Background, Foreground, Background]);

    let npy_path = dir.path().join("survey_labeled.npy");
    write_labeled_npy(&npy_path, &encode(&cloud, &classes, LabelCodes::default()).unwrap())
        .unwrap();
    let labeled = read_labeled_npy(&npy_path).unwrap();
    assert_eq!(labeled.records[2].position, [500_005.123, 4_500_000.456, 99.875]);

    let decoded = decode(&labeled, 2);
    let back_path = dir.path().join("survey_labeled.ply");
    write_ply_binary(&back_path, &decoded.original).unwrap();
    let back = read_cloud(&back_path).unwrap();
    for i in 0..cloud.len() {
        assert_eq!(back.point(i).map(f64::to_bits), cloud.point(i).map(f64::to_bits));
    }
}
