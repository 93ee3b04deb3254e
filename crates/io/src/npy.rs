//! NumPy `.npy` persistence for the dense labeled table.
//!
//! Files are written as format version 1.0, little-endian `f64`, C order,
//! shape `(N, 7)`, so that `numpy.load` reads them unchanged.

use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::Path;
use wallmask_labeling::codec::ROW_WIDTH;
use wallmask_labeling::LabeledPointCloud;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
/// Total header size is padded to a multiple of this.
const HEADER_ALIGN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F4,
    F8,
}

impl Dtype {
    fn byte_size(self) -> usize {
        match self {
            Dtype::F4 => 4,
            Dtype::F8 => 8,
        }
    }
}

#[derive(Debug, PartialEq)]
struct NpyHeader {
    dtype: Dtype,
    fortran_order: bool,
    shape: Vec<usize>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn unsupported(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, msg.into())
}

/// Text following `'key':` in a header dict, up to the end of the dict.
fn dict_value<'a>(dict: &'a str, key: &str) -> io::Result<&'a str> {
    let quoted = [format!("'{key}'"), format!("\"{key}\"")];
    let start = quoted
        .iter()
        .find_map(|k| dict.find(k.as_str()).map(|i| i + k.len()))
        .ok_or_else(|| invalid(format!("npy header has no '{key}' entry")))?;
    let rest = dict[start..].trim_start();
    rest.strip_prefix(':')
        .map(str::trim_start)
        .ok_or_else(|| invalid(format!("npy header entry '{key}' is malformed")))
}

fn parse_header_dict(dict: &str) -> io::Result<NpyHeader> {
    let descr = dict_value(dict, "descr")?;
    let quote = descr
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| invalid("npy descr is not a string"))?;
    let descr = descr[1..]
        .split(quote)
        .next()
        .ok_or_else(|| invalid("npy descr is not terminated"))?;
    let dtype = match descr {
        "<f8" => Dtype::F8,
        "<f4" => Dtype::F4,
        other => return Err(unsupported(format!("unsupported npy dtype '{other}'"))),
    };

    let fortran = dict_value(dict, "fortran_order")?;
    let fortran_order = if fortran.starts_with("True") {
        true
    } else if fortran.starts_with("False") {
        false
    } else {
        return Err(invalid("npy fortran_order is not a boolean"));
    };

    let shape = dict_value(dict, "shape")?;
    let inner = shape
        .strip_prefix('(')
        .and_then(|s| s.split(')').next())
        .ok_or_else(|| invalid("npy shape is not a tuple"))?;
    let shape = inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|e| invalid(format!("npy shape entry '{s}': {e}")))
        })
        .collect::<io::Result<Vec<usize>>>()?;

    Ok(NpyHeader {
        dtype,
        fortran_order,
        shape,
    })
}

/// Split a `.npy` file into its header and data bytes.
fn split_npy(data: &[u8]) -> io::Result<(NpyHeader, &[u8])> {
    if data.len() < 10 || &data[..6] != MAGIC {
        return Err(invalid("not an npy file (bad magic)"));
    }
    let (len_bytes, header_len): (usize, usize) = match data[6] {
        1 => (2, usize::from(u16::from_le_bytes([data[8], data[9]]))),
        2 | 3 => {
            if data.len() < 12 {
                return Err(invalid("npy header truncated"));
            }
            let len = u32::from_le_bytes([data[8], data[9], data[10], data[11]]);
            (4, len as usize)
        }
        major => return Err(unsupported(format!("unsupported npy version {major}.{}", data[7]))),
    };

    let start = 8 + len_bytes;
    let end = start
        .checked_add(header_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| invalid("npy header truncated"))?;
    let dict = std::str::from_utf8(&data[start..end]).map_err(|_| invalid("npy header not valid text"))?;

    Ok((parse_header_dict(dict)?, &data[end..]))
}

/// Parse an in-memory `.npy` holding an `(N, 7)` float table.
pub fn parse_npy_rows(data: &[u8]) -> io::Result<Vec<[f64; ROW_WIDTH]>> {
    let (header, body) = split_npy(data)?;

    let rows = match header.shape.as_slice() {
        [rows, cols] if *cols == ROW_WIDTH => *rows,
        other => {
            return Err(invalid(format!(
                "expected an (N, {ROW_WIDTH}) array, found shape {other:?}"
            )))
        }
    };

    let size = header.dtype.byte_size();
    let needed = rows
        .checked_mul(ROW_WIDTH * size)
        .ok_or_else(|| invalid("npy shape overflows"))?;
    if body.len() < needed {
        return Err(invalid(format!(
            "npy data too short: need {needed} bytes, got {}",
            body.len()
        )));
    }

    let cell = |flat: usize| -> f64 {
        let b = &body[flat * size..];
        match header.dtype {
            Dtype::F8 => f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
            Dtype::F4 => f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        }
    };

    Ok((0..rows)
        .map(|r| {
            let mut row = [0.0; ROW_WIDTH];
            for (c, slot) in row.iter_mut().enumerate() {
                let flat = if header.fortran_order {
                    c * rows + r
                } else {
                    r * ROW_WIDTH + c
                };
                *slot = cell(flat);
            }
            row
        })
        .collect())
}

pub fn read_npy_rows(path: impl AsRef<Path>) -> io::Result<Vec<[f64; ROW_WIDTH]>> {
    parse_npy_rows(&fs::read(path)?)
}

/// Write an `(N, 7)` table as a version 1.0 `<f8` `.npy` file.
pub fn write_npy_rows(path: impl AsRef<Path>, rows: &[[f64; ROW_WIDTH]]) -> io::Result<()> {
    let mut dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, {ROW_WIDTH}), }}",
        rows.len()
    );
    // magic + version + u16 length + dict + trailing newline
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    dict.extend(std::iter::repeat(' ').take(padding));
    dict.push('\n');
    let header_len = u16::try_from(dict.len()).map_err(|_| invalid("npy header too long"))?;

    let mut w = BufWriter::new(fs::File::create(path)?);
    w.write_all(MAGIC)?;
    w.write_all(&[1, 0])?;
    w.write_all(&header_len.to_le_bytes())?;
    w.write_all(dict.as_bytes())?;
    for row in rows {
        for v in row {
            w.write_all(&v.to_le_bytes())?;
        }
    }
    w.flush()
}

/// Read a labeled table, rejecting non-integral color or label cells.
pub fn read_labeled_npy(path: impl AsRef<Path>) -> io::Result<LabeledPointCloud> {
    let rows = read_npy_rows(path)?;
    let labeled = LabeledPointCloud::from_rows(&rows).map_err(|e| invalid(e.to_string()))?;
    log::debug!("read {} labeled rows", labeled.len());
    Ok(labeled)
}

pub fn write_labeled_npy(path: impl AsRef<Path>, labeled: &LabeledPointCloud) -> io::Result<()> {
    write_npy_rows(path, &labeled.to_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use wallmask_labeling::LabeledRecord;

    fn labeled() -> LabeledPointCloud {
        LabeledPointCloud {
            records: vec![
                LabeledRecord {
                    position: [1.5, -2.0, 3.25],
                    color: [255, 128, 0],
                    class_code: 2,
                },
                LabeledRecord {
                    position: [0.0, 0.0, 0.0],
                    color: [0, 0, 0],
                    class_code: 12,
                },
            ],
        }
    }

    #[test]
    fn labeled_table_roundtrip() {
        let tmp = NamedTempFile::new().unwrap();
        write_labeled_npy(tmp.path(), &labeled()).unwrap();
        assert_eq!(read_labeled_npy(tmp.path()).unwrap(), labeled());
    }

    #[test]
    fn georeferenced_positions_are_stored_exactly() {
        let mut table = labeled();
        table.records[0].position = [500_005.123, 4_500_000.456, 312.789];
        let tmp = NamedTempFile::new().unwrap();
        write_labeled_npy(tmp.path(), &table).unwrap();

        let rows = read_npy_rows(tmp.path()).unwrap();
        assert_eq!(rows[0][..3], [500_005.123, 4_500_000.456, 312.789]);
        assert_eq!(read_labeled_npy(tmp.path()).unwrap(), table);
    }

    #[test]
    fn header_is_aligned_v1() {
        let tmp = NamedTempFile::new().unwrap();
        write_labeled_npy(tmp.path(), &labeled()).unwrap();
        let bytes = fs::read(tmp.path()).unwrap();

        assert_eq!(&bytes[..8], b"\x93NUMPY\x01\x00");
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % HEADER_ALIGN, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 2 * 7 * 8);

        let dict = std::str::from_utf8(&bytes[10..10 + header_len]).unwrap();
        assert!(dict.contains("'shape': (2, 7)"));
    }

    #[test]
    fn empty_table_roundtrip() {
        let tmp = NamedTempFile::new().unwrap();
        write_labeled_npy(tmp.path(), &LabeledPointCloud::default()).unwrap();
        assert!(read_labeled_npy(tmp.path()).unwrap().is_empty());
    }

    fn npy_bytes(version: u8, dict: &str, body: &[u8]) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[version, 0]);
        if version == 1 {
            out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(dict.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(dict.as_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn reads_f4_v2_and_fortran_order() {
        // two rows, column-major
        let cols: [[f32; 2]; 7] = [
            [1.0, 2.0],
            [3.0, 4.0],
            [5.0, 6.0],
            [10.0, 20.0],
            [30.0, 40.0],
            [50.0, 60.0],
            [2.0, 12.0],
        ];
        let body: Vec<u8> = cols.iter().flatten().flat_map(|v| v.to_le_bytes()).collect();
        let data = npy_bytes(
            2,
            "{'descr': '<f4', 'fortran_order': True, 'shape': (2, 7), }\n",
            &body,
        );

        let rows = parse_npy_rows(&data).unwrap();
        assert_eq!(rows[0], [1.0, 3.0, 5.0, 10.0, 30.0, 50.0, 2.0]);
        assert_eq!(rows[1], [2.0, 4.0, 6.0, 20.0, 40.0, 60.0, 12.0]);
    }

    #[test]
    fn rejects_wrong_shape_dtype_and_truncation() {
        let wrong_cols = npy_bytes(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (1, 6), }\n",
            &[0; 48],
        );
        assert_eq!(parse_npy_rows(&wrong_cols).unwrap_err().kind(), io::ErrorKind::InvalidData);

        let ints = npy_bytes(
            1,
            "{'descr': '<i8', 'fortran_order': False, 'shape': (1, 7), }\n",
            &[0; 56],
        );
        assert_eq!(parse_npy_rows(&ints).unwrap_err().kind(), io::ErrorKind::Unsupported);

        let short = npy_bytes(
            1,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 7), }\n",
            &[0; 56],
        );
        assert_eq!(parse_npy_rows(&short).unwrap_err().kind(), io::ErrorKind::InvalidData);

        assert!(parse_npy_rows(b"PK\x03\x04 zip archive").is_err());
    }

    #[test]
    fn fractional_label_is_rejected_on_read() {
        let mut row = [0.0f64; 7];
        row[6] = 2.5;
        let tmp = NamedTempFile::new().unwrap();
        write_npy_rows(tmp.path(), &[row]).unwrap();
        let err = read_labeled_npy(tmp.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
