//! Map regions and containment predicates.
//!
//! Regions come in two shapes, parsed once from a descriptor string and
//! never mutated afterwards. All predicates use inclusive bounds: a point
//! exactly on a rectangle edge or exactly at circle-radius distance is
//! inside.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Playable map extents in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSize {
    /// Extent along the x axis.
    pub width: f32,
    /// Extent along the z axis.
    pub length: f32,
}

impl MapSize {
    /// Create a new map size.
    #[must_use]
    pub const fn new(width: f32, length: f32) -> Self {
        Self { width, length }
    }
}

/// Descriptor coordinates are expressed on a fixed 0..=200 grid and scaled
/// against the map dimensions at parse time.
pub const DESCRIPTOR_GRID: f32 = 200.0;

/// A named map area, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    /// Axis-aligned rectangle in world coordinates.
    Rect {
        /// Minimum x bound.
        left: f32,
        /// Minimum z bound.
        top: f32,
        /// Maximum x bound.
        right: f32,
        /// Maximum z bound.
        bottom: f32,
    },
    /// Circle in world coordinates.
    Circle {
        /// Center x.
        x: f32,
        /// Center z.
        z: f32,
        /// Radius.
        radius: f32,
    },
}

impl Region {
    /// Check whether a point lies inside the region (bounds inclusive).
    #[must_use]
    pub fn contains_point(&self, px: f32, pz: f32) -> bool {
        match *self {
            Self::Rect {
                left,
                top,
                right,
                bottom,
            } => px >= left && px <= right && pz >= top && pz <= bottom,
            Self::Circle { x, z, radius } => {
                let dx = px - x;
                let dz = pz - z;
                dx * dx + dz * dz <= radius * radius
            }
        }
    }

    /// Check whether a full axis-aligned footprint centered at `(px, pz)`
    /// lies inside the region.
    ///
    /// For circles this tests the four footprint corners only; edge
    /// midpoints are not tested, so containment is under-approximated
    /// for large footprints.
    #[must_use]
    pub fn contains_footprint(&self, px: f32, pz: f32, size_x: f32, size_z: f32) -> bool {
        let hx = size_x / 2.0;
        let hz = size_z / 2.0;
        match *self {
            Self::Rect {
                left,
                top,
                right,
                bottom,
            } => px - hx >= left && px + hx <= right && pz - hz >= top && pz + hz <= bottom,
            Self::Circle { .. } => {
                self.contains_point(px - hx, pz - hz)
                    && self.contains_point(px + hx, pz - hz)
                    && self.contains_point(px - hx, pz + hz)
                    && self.contains_point(px + hx, pz + hz)
            }
        }
    }

    /// Parse a region descriptor and scale it against the map dimensions.
    ///
    /// Accepted forms, with every number on the 0..=200 descriptor grid:
    /// - `"rect L T R B"`
    /// - `"circle X Z R"`
    ///
    /// X-axis values scale by `width / 200`, z-axis values by
    /// `length / 200`. A circle radius has no axis and scales against the
    /// smaller map dimension so a radius-200 circle stays inscribed on
    /// non-square maps.
    ///
    /// # Errors
    ///
    /// Returns a [`RegionParseError`] when the shape keyword is unknown,
    /// the number count is wrong, a number fails to parse or leaves the
    /// descriptor grid, or a rectangle has inverted bounds.
    pub fn parse(descriptor: &str, map: MapSize) -> Result<Self, RegionParseError> {
        let mut tokens = descriptor.split_whitespace();
        let shape = tokens.next().unwrap_or("");
        let numbers: Vec<&str> = tokens.collect();

        let scale_x = map.width / DESCRIPTOR_GRID;
        let scale_z = map.length / DESCRIPTOR_GRID;
        let scale_r = map.width.min(map.length) / DESCRIPTOR_GRID;

        if shape.eq_ignore_ascii_case("rect") {
            let [left, top, right, bottom] = parse_numbers(&numbers)?;
            if left > right || top > bottom {
                return Err(RegionParseError::InvertedRect);
            }
            Ok(Self::Rect {
                left: left * scale_x,
                top: top * scale_z,
                right: right * scale_x,
                bottom: bottom * scale_z,
            })
        } else if shape.eq_ignore_ascii_case("circle") {
            let [x, z, radius] = parse_numbers(&numbers)?;
            Ok(Self::Circle {
                x: x * scale_x,
                z: z * scale_z,
                radius: radius * scale_r,
            })
        } else {
            Err(RegionParseError::UnknownShape(shape.to_string()))
        }
    }

    /// The fallback hill used when a descriptor fails to parse: a
    /// centered rectangle spanning the middle fifth of the map.
    #[must_use]
    pub fn default_hill(map: MapSize) -> Self {
        // Descriptor-grid 80..120 on both axes.
        let scale_x = map.width / DESCRIPTOR_GRID;
        let scale_z = map.length / DESCRIPTOR_GRID;
        Self::Rect {
            left: 80.0 * scale_x,
            top: 80.0 * scale_z,
            right: 120.0 * scale_x,
            bottom: 120.0 * scale_z,
        }
    }
}

/// Parse exactly `N` descriptor-grid numbers.
fn parse_numbers<const N: usize>(tokens: &[&str]) -> Result<[f32; N], RegionParseError> {
    if tokens.len() != N {
        return Err(RegionParseError::WrongNumberCount {
            expected: N,
            found: tokens.len(),
        });
    }
    let mut out = [0.0f32; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        let value: f32 = token
            .parse()
            .map_err(|_| RegionParseError::BadNumber((*token).to_string()))?;
        if !value.is_finite() || !(0.0..=DESCRIPTOR_GRID).contains(&value) {
            return Err(RegionParseError::OutOfGrid(value));
        }
        *slot = value;
    }
    Ok(out)
}

/// Error type for region descriptor parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionParseError {
    /// The shape keyword was neither `rect` nor `circle`.
    UnknownShape(String),
    /// Wrong number of coordinates for the shape.
    WrongNumberCount {
        /// How many numbers the shape requires.
        expected: usize,
        /// How many were present.
        found: usize,
    },
    /// A coordinate failed to parse as a number.
    BadNumber(String),
    /// A coordinate was non-finite or outside the 0..=200 grid.
    OutOfGrid(f32),
    /// Rectangle bounds were inverted (left > right or top > bottom).
    InvertedRect,
}

impl fmt::Display for RegionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownShape(shape) => write!(f, "unknown region shape: {shape:?}"),
            Self::WrongNumberCount { expected, found } => {
                write!(f, "expected {expected} coordinates, found {found}")
            }
            Self::BadNumber(token) => write!(f, "unparseable coordinate: {token:?}"),
            Self::OutOfGrid(value) => {
                write!(f, "coordinate {value} outside the 0..=200 descriptor grid")
            }
            Self::InvertedRect => write!(f, "rectangle bounds are inverted"),
        }
    }
}

impl std::error::Error for RegionParseError {}
