use std::fmt;

/// Image size as (height, width), the axis order the corpus metadata uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub height: u32,
    pub width: u32,
}

impl Resolution {
    pub const ZERO: Resolution = Resolution {
        height: 0,
        width: 0,
    };

    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Per-axis maximum of two resolutions.
    pub fn max(self, other: Resolution) -> Resolution {
        Resolution {
            height: self.height.max(other.height),
            width: self.width.max(other.width),
        }
    }

    /// Rounds each axis up to the nearest multiple of `tile`.
    pub fn tile_aligned(self, tile: u32) -> Resolution {
        let tile = tile.max(1);
        Resolution {
            height: self.height.div_ceil(tile) * tile,
            width: self.width.div_ceil(tile) * tile,
        }
    }

    pub fn contains(self, other: Resolution) -> bool {
        other.height <= self.height && other.width <= self.width
    }
}

impl From<[u32; 2]> for Resolution {
    fn from(value: [u32; 2]) -> Self {
        Resolution::new(value[0], value[1])
    }
}

impl From<Resolution> for [u32; 2] {
    fn from(value: Resolution) -> Self {
        [value.height, value.width]
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}
