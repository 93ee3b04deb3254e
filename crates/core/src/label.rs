/// Color painted on wall points in overlay clouds.
pub const WALL_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

/// Color painted on every other point in overlay clouds.
pub const UNLABELED_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Binary wall/other classification of a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// Wall.
    Foreground,
    /// Anything else.
    #[default]
    Background,
}

impl Classification {
    pub fn is_foreground(self) -> bool {
        matches!(self, Classification::Foreground)
    }

    /// Sentinel overlay color for this class.
    pub fn overlay_color(self) -> [f32; 3] {
        match self {
            Classification::Foreground => WALL_COLOR,
            Classification::Background => UNLABELED_COLOR,
        }
    }
}

/// Numeric class codes written to labeled arrays.
///
/// Codes are chosen by the caller so that labeled output can slot into an
/// existing training taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCodes {
    pub foreground: i32,
    pub background: i32,
}

impl LabelCodes {
    pub fn new(foreground: i32, background: i32) -> Self {
        Self {
            foreground,
            background,
        }
    }

    pub fn code(&self, class: Classification) -> i32 {
        match class {
            Classification::Foreground => self.foreground,
            Classification::Background => self.background,
        }
    }

    /// Whether the two codes can be told apart when decoding.
    pub fn is_distinct(&self) -> bool {
        self.foreground != self.background
    }
}

impl Default for LabelCodes {
    fn default() -> Self {
        Self {
            foreground: 2,
            background: 12,
        }
    }
}

/// Number of foreground entries in a classification.
pub fn count_foreground(classes: &[Classification]) -> usize {
    classes.iter().filter(|c| c.is_foreground()).count()
}
