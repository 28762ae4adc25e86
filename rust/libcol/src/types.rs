use crate::io::*;
use bytes::BufMut;
use cgmath::{Matrix4, Vector3};
use col_derive::Writable;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type Point3F = Vector3<f32>;

pub type MatrixF = Matrix4<f32>;

/// A rounded, in-game position. Every component fits the signed 16-bit
/// range the console reads vertex data with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Writable)]
pub struct Vec3I {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Index into the vertex list of a collision record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Writable)]
pub struct VertexIndex(pub u16);

pub type ColResult<T> = Result<T, ColError>;

#[derive(Debug, Error)]
pub enum ColError {
    #[error("{object} must have a material associated with it.")]
    MissingMaterial { object: String },
    #[error("No collision data to export")]
    NoCollisionData,
    #[error("Size too big: Data ends at {end:#x}, which is larger than the specified range ({max:#x}).")]
    RangeOverflow { end: u64, max: u64 },
    #[error("{what} value {value} does not fit in 16 bits")]
    ValueOutOfRange { what: &'static str, value: i64 },
    #[error("{what} \"{literal}\" is not a valid number")]
    InvalidLiteral { what: &'static str, literal: String },
    #[error("Unknown surface type \"{0}\"")]
    UnknownSurfaceType(String),
    #[error("{object}: face references {what} {index}, but only {count} exist")]
    InvalidIndex {
        object: String,
        what: &'static str,
        index: usize,
        count: usize,
    },
    #[error("Box \"{object}\" cannot have a non-zero world rotation, currently at ({x}, {y}, {z})")]
    NonIdentityRotation { object: String, x: f32, y: f32, z: f32 },
    #[error("Footer {footer} does not exist in {path}.")]
    MissingFooter { path: String, footer: String },
    #[error("{path} does not exist.")]
    MissingFile { path: String },
    #[error("Actor header type chosen but group name not provided.")]
    MissingGroupName,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Vec3I {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Vec3I { x, y, z }
    }

    /// Rounds a transformed position to the grid the game stores vertices on.
    pub fn from_point(point: Point3F) -> ColResult<Self> {
        Ok(Vec3I {
            x: round_to_i16("Vertex", point.x)?,
            y: round_to_i16("Vertex", point.y)?,
            z: round_to_i16("Vertex", point.z)?,
        })
    }

    /// Squared length of the normal of the triangle (self, b, c), computed in
    /// integer space so degenerate faces are detected after rounding.
    pub fn normal_length_squared(&self, b: &Vec3I, c: &Vec3I) -> i64 {
        let (x1, y1, z1) = (self.x as i64, self.y as i64, self.z as i64);
        let (x2, y2, z2) = (b.x as i64, b.y as i64, b.z as i64);
        let (x3, y3, z3) = (c.x as i64, c.y as i64, c.z as i64);

        let nx = (y2 - y1) * (z3 - z2) - (z2 - z1) * (y3 - y2);
        let ny = (z2 - z1) * (x3 - x2) - (x2 - x1) * (z3 - z2);
        let nz = (x2 - x1) * (y3 - y2) - (y2 - y1) * (x3 - x2);

        nx * nx + ny * ny + nz * nz
    }
}

impl Display for Vec3I {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

impl Display for VertexIndex {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round half to even, matching the rounding the exported data has always
/// been produced with (2.5 -> 2, 3.5 -> 4).
pub fn round_half_even(value: f32) -> i64 {
    value.round_ties_even() as i64
}

pub fn round_to_i16(what: &'static str, value: f32) -> ColResult<i16> {
    let rounded = round_half_even(value);
    i16::try_from(rounded).map_err(|_| ColError::ValueOutOfRange {
        what,
        value: rounded,
    })
}

/// Low 16 bits of a value that may be written either as a signed or an
/// unsigned halfword. Negative values become their two's complement.
pub fn to_halfword(what: &'static str, value: i64) -> ColResult<u16> {
    if (i16::MIN as i64..=u16::MAX as i64).contains(&value) {
        Ok(value as u16)
    } else {
        Err(ColError::ValueOutOfRange { what, value })
    }
}

/// Item counts are stored as unsigned halfwords.
pub fn to_count(count: usize) -> ColResult<u16> {
    u16::try_from(count).map_err(|_| ColError::ValueOutOfRange {
        what: "Item count",
        value: count as i64,
    })
}

/// Parses a numeric literal the way it would be read by the target's C
/// compiler: `0x` prefix for hex, decimal otherwise.
pub fn parse_int_literal(what: &'static str, literal: &str) -> ColResult<i64> {
    let trimmed = literal.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let parsed = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };
    parsed
        .map(|v| if negative { -v } else { v })
        .map_err(|_| ColError::InvalidLiteral {
            what,
            literal: literal.to_owned(),
        })
}

/// Replaces every character that cannot appear in a C identifier.
pub fn to_alnum(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}
