//! Hex coordinate system (axial coordinates)
//!
//! Axial (q, r) with derived cube coordinate s = -q - r. The canonical text
//! key for a hex is `"q,r"`, used by scenario files and serialized output;
//! inside the engine hexes are plain `Copy` values with structural hashing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::FrontlineError;

const SQRT_3: f32 = 1.732_050_8;

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Chebyshev distance on the cube representation
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds) as u32
    }

    /// The 6 neighbors, in `HexDirection::all()` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::all().map(|dir| self.step(dir))
    }

    /// Adjacent hex in the given direction
    pub fn step(&self, dir: HexDirection) -> HexCoord {
        let offset = dir.offset();
        HexCoord::new(self.q + offset.q, self.r + offset.r)
    }

    /// Hexes on the segment from self to other, both ends included.
    ///
    /// The walk is always computed from the lower coordinate to the higher
    /// one, so `b.line_to(a)` is exactly `a.line_to(b)` reversed even when the
    /// segment passes through a rounding tie.
    pub fn line_to(&self, other: &Self) -> Vec<HexCoord> {
        if self > other {
            let mut line = other.line_to(self);
            line.reverse();
            return line;
        }

        let n = self.distance(other);
        if n == 0 {
            return vec![*self];
        }

        let mut results = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let q = self.q as f64 + (other.q - self.q) as f64 * t;
            let r = self.r as f64 + (other.r - self.r) as f64 * t;
            results.push(Self::round(q, r));
        }
        results
    }

    /// Round a fractional cube coordinate to the nearest valid hex
    fn round(q: f64, r: f64) -> Self {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let q_diff = (rq - q).abs();
        let r_diff = (rr - r).abs();
        let s_diff = (rs - s).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        Self::new(rq as i32, rr as i32)
    }

    /// All hexes within range (inclusive)
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Pointy-top cartesian position of the hex center (unit hex size)
    pub fn to_cartesian(&self) -> (f32, f32) {
        let x = SQRT_3 * self.q as f32 + SQRT_3 / 2.0 * self.r as f32;
        let y = 1.5 * self.r as f32;
        (x, y)
    }

    /// Cartesian vector from self to other
    pub fn vector_to(&self, other: &Self) -> (f32, f32) {
        let (ax, ay) = self.to_cartesian();
        let (bx, by) = other.to_cartesian();
        (bx - ax, by - ay)
    }

    /// Direction whose canonical vector best matches the bearing to `other`
    pub fn direction_to(&self, other: &Self) -> Option<HexDirection> {
        if self == other {
            return None;
        }
        let (dx, dy) = self.vector_to(other);
        Some(HexDirection::nearest(dx, dy))
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for HexCoord {
    type Err = FrontlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FrontlineError::InvalidHexKey(s.to_string());
        let (q, r) = s.split_once(',').ok_or_else(invalid)?;
        let q = q.trim().parse().map_err(|_| invalid())?;
        let r = r.trim().parse().map_err(|_| invalid())?;
        Ok(HexCoord::new(q, r))
    }
}

impl Serialize for HexCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// Hex-edge direction, used for neighbors and unit facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HexDirection {
    #[default]
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

impl HexDirection {
    /// Get the hex offset for this direction
    pub fn offset(&self) -> HexCoord {
        match self {
            HexDirection::East => HexCoord::new(1, 0),
            HexDirection::NorthEast => HexCoord::new(1, -1),
            HexDirection::NorthWest => HexCoord::new(0, -1),
            HexDirection::West => HexCoord::new(-1, 0),
            HexDirection::SouthWest => HexCoord::new(-1, 1),
            HexDirection::SouthEast => HexCoord::new(0, 1),
        }
    }

    /// Get opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            HexDirection::East => HexDirection::West,
            HexDirection::NorthEast => HexDirection::SouthWest,
            HexDirection::NorthWest => HexDirection::SouthEast,
            HexDirection::West => HexDirection::East,
            HexDirection::SouthWest => HexDirection::NorthEast,
            HexDirection::SouthEast => HexDirection::NorthWest,
        }
    }

    /// All directions, in neighbor order
    pub fn all() -> [HexDirection; 6] {
        [
            HexDirection::East,
            HexDirection::NorthEast,
            HexDirection::NorthWest,
            HexDirection::West,
            HexDirection::SouthWest,
            HexDirection::SouthEast,
        ]
    }

    /// Position in `all()`; facings are stored and compared by this index
    pub fn index(&self) -> usize {
        match self {
            HexDirection::East => 0,
            HexDirection::NorthEast => 1,
            HexDirection::NorthWest => 2,
            HexDirection::West => 3,
            HexDirection::SouthWest => 4,
            HexDirection::SouthEast => 5,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::all()[index % 6]
    }

    /// Unit-length cartesian vector pointing across this edge
    pub fn unit_vector(&self) -> (f32, f32) {
        let (x, y) = self.offset().to_cartesian();
        let len = (x * x + y * y).sqrt();
        (x / len, y / len)
    }

    /// Direction with the largest dot product against (dx, dy).
    /// Ties resolve to the earlier direction in `all()`.
    pub fn nearest(dx: f32, dy: f32) -> Self {
        let mut best = HexDirection::East;
        let mut best_dot = f32::NEG_INFINITY;
        for dir in Self::all() {
            let (ux, uy) = dir.unit_vector();
            let dot = ux * dx + uy * dy;
            if dot > best_dot + 1e-6 {
                best = dir;
                best_dot = dot;
            }
        }
        best
    }
}

/// Cosine of the angle between two cartesian vectors, 0 for degenerate input
pub fn cosine(a: (f32, f32), b: (f32, f32)) -> f32 {
    let la = (a.0 * a.0 + a.1 * a.1).sqrt();
    let lb = (b.0 * b.0 + b.1 * b.1).sqrt();
    if la <= f32::EPSILON || lb <= f32::EPSILON {
        return 0.0;
    }
    ((a.0 * b.0 + a.1 * b.1) / (la * lb)).clamp(-1.0, 1.0)
}
