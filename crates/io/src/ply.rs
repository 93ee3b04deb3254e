use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::Path;
use wallmask_core::{Colors, PointCloud};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// Scalar property type as declared in the PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropType {
    Char,
    Uchar,
    Short,
    Ushort,
    Int,
    Uint,
    Float,
    Double,
}

impl PropType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => PropType::Char,
            "uchar" | "uint8" => PropType::Uchar,
            "short" | "int16" => PropType::Short,
            "ushort" | "uint16" => PropType::Ushort,
            "int" | "int32" => PropType::Int,
            "uint" | "uint32" => PropType::Uint,
            "float" | "float32" => PropType::Float,
            "double" | "float64" => PropType::Double,
            _ => return None,
        })
    }

    fn byte_size(self) -> usize {
        match self {
            PropType::Char | PropType::Uchar => 1,
            PropType::Short | PropType::Ushort => 2,
            PropType::Int | PropType::Uint | PropType::Float => 4,
            PropType::Double => 8,
        }
    }

    fn read_le(self, b: &[u8]) -> f64 {
        match self {
            PropType::Char => f64::from(b[0] as i8),
            PropType::Uchar => f64::from(b[0]),
            PropType::Short => f64::from(i16::from_le_bytes([b[0], b[1]])),
            PropType::Ushort => f64::from(u16::from_le_bytes([b[0], b[1]])),
            PropType::Int => f64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            PropType::Uint => f64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            PropType::Float => f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            PropType::Double => {
                f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            }
        }
    }

    /// Divisor taking a stored color channel to `[0, 1]`. Signed types use
    /// the scale of their unsigned twin; negative values clamp to 0.
    fn color_scale(self) -> f32 {
        match self {
            PropType::Short | PropType::Ushort => 65535.0,
            PropType::Float | PropType::Double => 1.0,
            _ => 255.0,
        }
    }
}

struct Property {
    name: String,
    ty: PropType,
    offset: usize,
}

/// Parsed header information.
struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    properties: Vec<Property>,
    stride: usize,
    header_end_offset: usize,
}

impl PlyHeader {
    fn find(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

/// Offsets of the `end_header` line: where it starts and where the body
/// starts. Only a whole header line counts, not text inside a comment.
fn locate_end_header(data: &[u8]) -> Option<(usize, usize)> {
    let mut start = 0;
    while start < data.len() {
        let end = start + data[start..].iter().position(|&b| b == b'\n')? + 1;
        if std::str::from_utf8(&data[start..end]).map(str::trim) == Ok("end_header") {
            return Some((start, end));
        }
        start = end;
    }
    None
}

fn parse_ply_header(data: &[u8]) -> io::Result<PlyHeader> {
    let (marker, header_end_offset) =
        locate_end_header(data).ok_or_else(|| invalid("missing end_header line in PLY file"))?;

    let header_text = std::str::from_utf8(&data[..marker]).map_err(|_| invalid("PLY header not valid UTF-8"))?;

    let mut lines = header_text.lines().map(str::trim);
    if lines.next() != Some("ply") {
        return Err(invalid("file does not start with 'ply'"));
    }

    let mut format = None;
    let mut vertex_count: Option<usize> = None;
    let mut properties: Vec<Property> = Vec::new();
    let mut stride = 0;
    let mut in_vertex_element = false;

    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["format", kind, ..] => {
                format = Some(match *kind {
                    "ascii" => PlyFormat::Ascii,
                    "binary_little_endian" => PlyFormat::BinaryLittleEndian,
                    other => {
                        return Err(io::Error::new(
                            io::ErrorKind::Unsupported,
                            format!("unsupported PLY format: {other}"),
                        ))
                    }
                });
            }
            ["element", "vertex", count, ..] => {
                in_vertex_element = true;
                vertex_count = Some(
                    count
                        .parse::<usize>()
                        .map_err(|e| invalid(format!("invalid vertex count: {e}")))?,
                );
            }
            ["element", name, count, ..] => {
                in_vertex_element = false;
                // vertex data must come first so the body can be read without
                // decoding other elements
                if vertex_count.is_none() && *count != "0" {
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        format!("PLY element '{name}' precedes the vertex element"),
                    ));
                }
            }
            ["property", "list", ..] if in_vertex_element => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "list properties on vertices are not supported",
                ));
            }
            ["property", ty, name, ..] if in_vertex_element => {
                let ty = PropType::parse(ty).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::Unsupported,
                        format!("unsupported property type: {ty}"),
                    )
                })?;
                properties.push(Property {
                    name: name.to_string(),
                    ty,
                    offset: stride,
                });
                stride += ty.byte_size();
            }
            _ => {}
        }
    }

    let format = format.ok_or_else(|| invalid("PLY format line missing"))?;

    Ok(PlyHeader {
        format,
        vertex_count: vertex_count.unwrap_or(0),
        properties,
        stride,
        header_end_offset,
    })
}

/// Read the vertex element of an ASCII or binary little-endian PLY file.
///
/// `x`, `y` and `z` are required. `red`, `green` and `blue`, when all three
/// are present, are scaled to `[0, 1]` according to their declared type.
pub fn read_ply(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let data = fs::read(&path)?;
    parse_ply(&data)
}

/// Parse an in-memory PLY file. See [`read_ply`].
pub fn parse_ply(data: &[u8]) -> io::Result<PointCloud> {
    let header = parse_ply_header(data)?;

    let (idx_x, idx_y, idx_z) = match (header.find("x"), header.find("y"), header.find("z")) {
        (Some(ix), Some(iy), Some(iz)) => (ix, iy, iz),
        _ => return Err(invalid("PLY file missing required x, y, z properties")),
    };
    let color_idx = match (header.find("red"), header.find("green"), header.find("blue")) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        _ => None,
    };

    let n = header.vertex_count;
    // a hostile header can claim any count
    let cap = n.min(data.len());
    let mut x = Vec::with_capacity(cap);
    let mut y = Vec::with_capacity(cap);
    let mut z = Vec::with_capacity(cap);
    let mut colors = color_idx.map(|_| Colors::with_capacity(cap));

    let mut push_vertex = |value: &dyn Fn(usize) -> f64| {
        x.push(value(idx_x));
        y.push(value(idx_y));
        z.push(value(idx_z));
        if let (Some(colors), Some(idx)) = (colors.as_mut(), color_idx) {
            colors.push(idx.map(|i| {
                (value(i) as f32 / header.properties[i].ty.color_scale()).clamp(0.0, 1.0)
            }));
        }
    };

    let body = &data[header.header_end_offset..];
    match header.format {
        PlyFormat::Ascii => {
            let body = std::str::from_utf8(body).map_err(|_| invalid("PLY body not valid UTF-8"))?;
            let mut rows = body.lines().map(str::trim).filter(|l| !l.is_empty());

            for vi in 0..n {
                let line = rows
                    .next()
                    .ok_or_else(|| invalid(format!("PLY body ends after {vi} of {n} vertices")))?;
                let fields = line
                    .split_whitespace()
                    .enumerate()
                    .map(|(_, f)| {
                        f.parse::<f64>()
                            .map_err(|e| invalid(format!("vertex {vi}: bad number '{f}': {e}")))
                    })
                    .collect::<io::Result<Vec<f64>>>()?;
                if fields.len() < header.properties.len() {
                    return Err(invalid(format!(
                        "vertex line has {} fields, expected {}",
                        fields.len(),
                        header.properties.len()
                    )));
                }
                push_vertex(&|i| fields[i]);
            }
        }
        PlyFormat::BinaryLittleEndian => {
            let needed = n
                .checked_mul(header.stride)
                .ok_or_else(|| invalid("PLY vertex count overflows"))?;
            if body.len() < needed {
                return Err(invalid(format!(
                    "PLY binary body too short: need {needed} bytes, got {}",
                    body.len()
                )));
            }

            for row in body[..needed].chunks_exact(header.stride.max(1)).take(n) {
                push_vertex(&|i| {
                    let prop = &header.properties[i];
                    prop.ty.read_le(&row[prop.offset..])
                });
            }
        }
    }

    let mut cloud = PointCloud::from_xyz(x, y, z);
    if let Some(colors) = colors {
        cloud = cloud.with_colors(colors);
    }
    Ok(cloud)
}

fn write_header(w: &mut impl io::Write, format: &str, cloud: &PointCloud) -> io::Result<()> {
    w.write_all(b"ply\n")?;
    writeln!(w, "format {format} 1.0")?;
    writeln!(w, "element vertex {}", cloud.len())?;
    w.write_all(b"property double x\n")?;
    w.write_all(b"property double y\n")?;
    w.write_all(b"property double z\n")?;

    if cloud.colors.is_some() {
        w.write_all(b"property uchar red\n")?;
        w.write_all(b"property uchar green\n")?;
        w.write_all(b"property uchar blue\n")?;
    }

    w.write_all(b"end_header\n")
}

/// Write a PLY file in ASCII format. Positions are stored as `double`,
/// colors as `uchar`.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_header(&mut w, "ascii", cloud)?;

    for i in 0..cloud.len() {
        write!(w, "{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i])?;
        if let Some(ref colors) = cloud.colors {
            let [r, g, b] = colors.get_bytes(i);
            write!(w, " {r} {g} {b}")?;
        }
        w.write_all(b"\n")?;
    }

    w.flush()
}

/// Write a PLY file in binary_little_endian format.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let mut w = BufWriter::new(fs::File::create(path)?);
    write_header(&mut w, "binary_little_endian", cloud)?;

    for i in 0..cloud.len() {
        w.write_all(&cloud.x[i].to_le_bytes())?;
        w.write_all(&cloud.y[i].to_le_bytes())?;
        w.write_all(&cloud.z[i].to_le_bytes())?;
        if let Some(ref colors) = cloud.colors {
            w.write_all(&colors.get_bytes(i))?;
        }
    }

    w.flush()
}
