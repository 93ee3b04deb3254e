//! DXF reader for the model-space entities of a drawing, ASCII or binary.
//!
//! Decoding is done by the `dxf` crate. `LINE`, `LWPOLYLINE`, `POLYLINE`
//! and `ARC` carry their geometry; every other entity kind keeps its layer
//! and line type so it can still be counted and filtered.

use std::fs;
use std::io::{self, BufReader};
use std::path::Path;

use ::dxf::entities::{Arc, Entity, EntityType, LwPolyline, Polyline};
use nalgebra::Point3;
use wallmask_drawing::{Drawing, DrawingEntity, Geometry};

fn invalid(err: ::dxf::DxfError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err.to_string())
}

/// Objects whose extrusion direction points down are drawn in a plane seen
/// from below: their object X axis and Z axis are the negated world ones.
fn extruded_downwards(direction: &::dxf::Vector) -> bool {
    direction.z < 0.0
}

fn arc_geometry(arc: &Arc) -> Geometry {
    let center = &arc.center;
    if extruded_downwards(&arc.normal) {
        // mirrored about the world Y axis, so the sweep runs the other way
        Geometry::Arc {
            center: Point3::new(-center.x, center.y, -center.z),
            radius: arc.radius,
            start_angle: (180.0 - arc.end_angle).rem_euclid(360.0),
            end_angle: (180.0 - arc.start_angle).rem_euclid(360.0),
        }
    } else {
        Geometry::Arc {
            center: Point3::new(center.x, center.y, center.z),
            radius: arc.radius,
            start_angle: arc.start_angle,
            end_angle: arc.end_angle,
        }
    }
}

fn lwpolyline_geometry(polyline: &LwPolyline, elevation: f64) -> Geometry {
    let (x_sign, z) = if extruded_downwards(&polyline.extrusion_direction) {
        (-1.0, -elevation)
    } else {
        (1.0, elevation)
    };
    Geometry::Polyline {
        vertices: polyline
            .vertices
            .iter()
            .map(|v| Point3::new(x_sign * v.x, v.y, z))
            .collect(),
    }
}

fn vertex_polyline_geometry(polyline: &Polyline) -> Geometry {
    Geometry::VertexPolyline {
        vertices: polyline
            .vertices()
            .map(|v| Point3::new(v.location.x, v.location.y, v.location.z))
            .collect(),
    }
}

/// DXF name of an entity kind that has no interpolation rule.
fn unsupported_kind(specific: &EntityType) -> String {
    let kind = match specific {
        EntityType::Circle(_) => "CIRCLE",
        EntityType::Ellipse(_) => "ELLIPSE",
        EntityType::Spline(_) => "SPLINE",
        EntityType::Text(_) => "TEXT",
        EntityType::MText(_) => "MTEXT",
        EntityType::Insert(_) => "INSERT",
        EntityType::Solid(_) => "SOLID",
        EntityType::Face3D(_) => "3DFACE",
        EntityType::ModelPoint(_) => "POINT",
        other => {
            let debug = format!("{other:?}");
            return debug
                .split(|c: char| !c.is_alphanumeric())
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
        }
    };
    kind.to_string()
}

fn convert(entity: &Entity) -> DrawingEntity {
    let geometry = match &entity.specific {
        EntityType::Line(line) => Geometry::Line {
            start: Point3::new(line.p1.x, line.p1.y, line.p1.z),
            end: Point3::new(line.p2.x, line.p2.y, line.p2.z),
        },
        EntityType::LwPolyline(polyline) => lwpolyline_geometry(polyline, entity.common.elevation),
        EntityType::Polyline(polyline) => vertex_polyline_geometry(polyline),
        EntityType::Arc(arc) => arc_geometry(arc),
        other => Geometry::Unsupported {
            kind: unsupported_kind(other),
        },
    };
    DrawingEntity::new(
        entity.common.layer.as_str(),
        entity.common.line_type_name.as_str(),
        geometry,
    )
}

fn collect_model_space(source: &::dxf::Drawing) -> Drawing {
    let mut drawing = Drawing::new();
    let mut paper_space = 0usize;

    for entity in source.entities() {
        if entity.common.is_in_paper_space {
            paper_space += 1;
            continue;
        }
        drawing.push(convert(entity));
    }

    if paper_space > 0 {
        log::debug!("ignored {paper_space} paper-space entities");
    }
    log::debug!("read {} model-space entities", drawing.len());
    drawing
}

/// Parse the model-space entities of an ASCII DXF document.
pub fn parse_dxf(source: &str) -> io::Result<Drawing> {
    let parsed = ::dxf::Drawing::load(&mut source.as_bytes()).map_err(invalid)?;
    Ok(collect_model_space(&parsed))
}

/// Read a DXF file, ASCII or binary.
pub fn read_dxf(path: impl AsRef<Path>) -> io::Result<Drawing> {
    let mut reader = BufReader::new(fs::File::open(path)?);
    let parsed = ::dxf::Drawing::load(&mut reader).map_err(invalid)?;
    Ok(collect_model_space(&parsed))
}
