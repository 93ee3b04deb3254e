use crate::CodecError;
use wallmask_core::{channel_to_byte, Classification, Colors, LabelCodes, PointCloud, WALL_COLOR};

/// Columns of the dense labeled table: `x, y, z, r, g, b, label`.
pub const ROW_WIDTH: usize = 7;

/// One labeled point: position, 8-bit color and class code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledRecord {
    pub position: [f64; 3],
    pub color: [u8; 3],
    pub class_code: i32,
}

impl LabeledRecord {
    pub fn to_row(&self) -> [f64; ROW_WIDTH] {
        let [x, y, z] = self.position;
        let [r, g, b] = self.color;
        [
            x,
            y,
            z,
            f64::from(r),
            f64::from(g),
            f64::from(b),
            f64::from(self.class_code),
        ]
    }
}

/// Ordered labeled records, index-for-index with the cloud they came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledPointCloud {
    pub records: Vec<LabeledRecord>,
}

impl LabeledPointCloud {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classes recovered from the codes: `foreground_code` is
    /// [`Classification::Foreground`], every other code is background.
    pub fn classification(&self, foreground_code: i32) -> Vec<Classification> {
        self.records
            .iter()
            .map(|r| {
                if r.class_code == foreground_code {
                    Classification::Foreground
                } else {
                    Classification::Background
                }
            })
            .collect()
    }

    pub fn to_rows(&self) -> Vec<[f64; ROW_WIDTH]> {
        self.records.iter().map(LabeledRecord::to_row).collect()
    }

    /// Parse the dense table back into records.
    ///
    /// Positions are kept as stored. Color cells must hold integers in
    /// `0..=255` and label cells integers that fit an `i32`.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, CodecError> {
        let mut records = Vec::with_capacity(rows.len());

        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != ROW_WIDTH {
                return Err(CodecError::BadRowWidth {
                    row,
                    found: cells.len(),
                });
            }

            let mut color = [0u8; 3];
            for (channel, slot) in color.iter_mut().enumerate() {
                let column = 3 + channel;
                *slot = integral_cell(row, column, cells[column], 0, 255)? as u8;
            }
            let class_code = integral_cell(
                row,
                6,
                cells[6],
                i64::from(i32::MIN),
                i64::from(i32::MAX),
            )? as i32;

            records.push(LabeledRecord {
                position: [cells[0], cells[1], cells[2]],
                color,
                class_code,
            });
        }

        Ok(Self { records })
    }
}

fn integral_cell(row: usize, column: usize, value: f64, min: i64, max: i64) -> Result<i64, CodecError> {
    let in_range = value.fract() == 0.0 && value >= min as f64 && value <= max as f64;
    if !in_range {
        return Err(CodecError::BadCell {
            row,
            column,
            value,
            min,
            max,
        });
    }
    Ok(value as i64)
}

/// Pair every point of `target` with its class code.
///
/// Colors become bytes (`round(c * 255)`, clamped); a cloud without colors
/// encodes as black.
pub fn encode(
    target: &PointCloud,
    classes: &[Classification],
    codes: LabelCodes,
) -> Result<LabeledPointCloud, CodecError> {
    if !codes.is_distinct() {
        return Err(CodecError::AmbiguousCodes(codes.foreground));
    }
    if classes.len() != target.len() {
        return Err(CodecError::LengthMismatch {
            expected: target.len(),
            actual: classes.len(),
        });
    }

    let records = classes
        .iter()
        .enumerate()
        .map(|(i, &class)| {
            let color = target.color(i).unwrap_or([0.0; 3]).map(channel_to_byte);
            LabeledRecord {
                position: target.point(i),
                color,
                class_code: codes.code(class),
            }
        })
        .collect();

    Ok(LabeledPointCloud { records })
}

/// The two clouds a labeled table renders to.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClouds {
    /// Positions with the stored colors scaled back to [0, 1].
    pub original: PointCloud,
    /// Positions painted with the wall / unlabeled sentinel colors.
    pub overlay: PointCloud,
}

pub fn decode(labeled: &LabeledPointCloud, foreground_code: i32) -> DecodedClouds {
    let n = labeled.len();
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    let mut original = Colors::with_capacity(n);
    let mut overlay = Colors::with_capacity(n);

    for (record, class) in labeled
        .records
        .iter()
        .zip(labeled.classification(foreground_code))
    {
        x.push(record.position[0]);
        y.push(record.position[1]);
        z.push(record.position[2]);
        original.push_bytes(record.color);
        overlay.push(class.overlay_color());
    }

    let positions = PointCloud::from_xyz(x, y, z);
    DecodedClouds {
        original: positions.clone().with_colors(original),
        overlay: positions.with_colors(overlay),
    }
}

/// Recover classes from a cloud painted with the overlay colors.
///
/// A point is foreground when its color rounds to exactly `(0, 255, 0)`.
pub fn classify_overlay(overlay: &PointCloud) -> Result<Vec<Classification>, CodecError> {
    let colors = overlay.colors.as_ref().ok_or(CodecError::MissingColors)?;
    let wall = WALL_COLOR.map(channel_to_byte);

    Ok((0..colors.len())
        .map(|i| {
            if colors.get(i).map(channel_to_byte) == wall {
                Classification::Foreground
            } else {
                Classification::Background
            }
        })
        .collect())
}
