use nalgebra::Point3;

/// DXF type name of a straight segment.
pub const LINE: &str = "LINE";
/// DXF type name of a lightweight polyline.
pub const LWPOLYLINE: &str = "LWPOLYLINE";
/// DXF type name of a polyline made of `VERTEX` records.
pub const POLYLINE: &str = "POLYLINE";
/// DXF type name of a circular arc.
pub const ARC: &str = "ARC";

/// Line type reported for entities that do not name one.
pub const BYLAYER: &str = "BYLAYER";

/// Geometry of a drawing entity.
///
/// Kinds without an interpolation rule are kept as [`Geometry::Unsupported`]
/// so that filters can still select them and the mask builder can report
/// them instead of silently losing them.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
    },
    Polyline {
        vertices: Vec<Point3<f64>>,
    },
    /// `POLYLINE` with its `VERTEX` records. Interpolated like
    /// [`Geometry::Polyline`] but filtered under its own type name.
    VertexPolyline {
        vertices: Vec<Point3<f64>>,
    },
    /// Counter-clockwise arc in the XY plane at the center's height.
    /// Angles are in degrees.
    Arc {
        center: Point3<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Unsupported {
        kind: String,
    },
}

impl Geometry {
    /// The entity-type name filters match against.
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Line { .. } => LINE,
            Geometry::Polyline { .. } => LWPOLYLINE,
            Geometry::VertexPolyline { .. } => POLYLINE,
            Geometry::Arc { .. } => ARC,
            Geometry::Unsupported { kind } => kind,
        }
    }
}

/// One model-space entity of a drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingEntity {
    pub layer: String,
    pub linetype: String,
    pub geometry: Geometry,
}

impl DrawingEntity {
    pub fn new(layer: impl Into<String>, linetype: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            layer: layer.into(),
            linetype: linetype.into(),
            geometry,
        }
    }

    pub fn line(
        layer: impl Into<String>,
        linetype: impl Into<String>,
        start: [f64; 3],
        end: [f64; 3],
    ) -> Self {
        Self::new(
            layer,
            linetype,
            Geometry::Line {
                start: Point3::from(start),
                end: Point3::from(end),
            },
        )
    }

    pub fn polyline(
        layer: impl Into<String>,
        linetype: impl Into<String>,
        vertices: &[[f64; 3]],
    ) -> Self {
        Self::new(
            layer,
            linetype,
            Geometry::Polyline {
                vertices: vertices.iter().copied().map(Point3::from).collect(),
            },
        )
    }

    pub fn entity_type(&self) -> &str {
        self.geometry.type_name()
    }
}

/// The model space of a parsed vector drawing, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    entities: Vec<DrawingEntity>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: Vec<DrawingEntity>) -> Self {
        Self { entities }
    }

    pub fn push(&mut self, entity: DrawingEntity) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[DrawingEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
