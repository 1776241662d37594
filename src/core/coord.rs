//! Tile coordinate model.
//!
//! Tiles live in one of four quadrants of an integer plane, addressed by a
//! (distance, direction) pair on each axis. There is no origin row or column:
//! the first tile north of the fold is `m = 1`, the first tile east is `n = 1`.
//! The canonical tile name doubles as the memoization key and the on-disk
//! filename, e.g. `3s7e.png`.

use std::fmt;

/// Per-axis offsets a confirmed tile probes when expanding.
///
/// The ±2 window lets discovery jump over a single missing tile, which keeps
/// sparse regions of the mosaic connected.
const EXPAND: [i64; 5] = [-2, -1, 0, 1, 2];

/// North-south direction label for the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NorthSouth {
    North,
    South,
}

impl NorthSouth {
    pub fn as_str(&self) -> &'static str {
        match self {
            NorthSouth::North => "n",
            NorthSouth::South => "s",
        }
    }
}

impl fmt::Display for NorthSouth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// East-west direction label for the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EastWest {
    East,
    West,
}

impl EastWest {
    pub fn as_str(&self) -> &'static str {
        match self {
            EastWest::East => "e",
            EastWest::West => "w",
        }
    }
}

impl fmt::Display for EastWest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quadrant-scoped tile coordinate.
///
/// Identity is the full 4-tuple: `1n1e` and `1s1e` are distinct tiles even
/// though the magnitudes match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Distance north or south of the fold, >= 1
    pub m: u32,
    pub ns: NorthSouth,
    /// Distance east or west of the fold, >= 1
    pub n: u32,
    pub ew: EastWest,
}

impl TileCoord {
    pub fn new(m: u32, ns: NorthSouth, n: u32, ew: EastWest) -> Self {
        Self { m, ns, n, ew }
    }

    /// Canonical tile name, e.g. `3s7e.png`.
    pub fn name(&self) -> String {
        format!("{}{}{}{}.png", self.m, self.ns, self.n, self.ew)
    }

    /// The quadrant placeholder coordinate, used as the image source for
    /// cells that were probed but do not exist.
    pub fn placeholder(ns: NorthSouth, ew: EastWest) -> Self {
        Self::new(11, ns, 11, ew)
    }

    /// Maps a signed render-window cell to a coordinate.
    ///
    /// Row `r > 0` is north, `r < 0` south; column `c > 0` east, `c < 0` west.
    /// Returns `None` on the origin row or column, which hold no tiles.
    pub fn from_row_col(r: i32, c: i32) -> Option<Self> {
        let ns = match r {
            0 => return None,
            r if r > 0 => NorthSouth::North,
            _ => NorthSouth::South,
        };
        let ew = match c {
            0 => return None,
            c if c > 0 => EastWest::East,
            _ => EastWest::West,
        };
        Some(Self::new(r.unsigned_abs(), ns, c.unsigned_abs(), ew))
    }

    /// All coordinates adjacent to this one in the crawl graph.
    ///
    /// Offsets `m` and `n` independently by each value in [`EXPAND`], dropping
    /// the self-offset and anything that would cross the quadrant boundary
    /// (`m < 1` or `n < 1`). Direction labels are never flipped, so expansion
    /// stays inside the originating quadrant. Yields at most 24 coordinates,
    /// in row-major offset order.
    pub fn neighbors(&self) -> Vec<TileCoord> {
        let mut out = Vec::with_capacity(24);
        for dm in EXPAND {
            for dn in EXPAND {
                if dm == 0 && dn == 0 {
                    continue;
                }
                let m = self.m as i64 + dm;
                let n = self.n as i64 + dn;
                if m < 1 || n < 1 {
                    continue;
                }
                out.push(TileCoord::new(m as u32, self.ns, n as u32, self.ew));
            }
        }
        out
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.m, self.ns, self.n, self.ew)
    }
}
