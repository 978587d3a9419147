pub mod bounds;
pub mod intersect_2d;
pub mod polygon_2d;
pub mod vector;

pub use bounds::Aabb;
pub use vector::{PointTransform, VectorSolutions};

/// 2D point type (world coordinates).
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type (offsets, directions, scale factors).
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Squared tolerance, for comparisons made without a square root.
pub const TOLERANCE_SQUARED: f64 = 1e-20;

/// Distance within which a reference (grip) point matches an entity point.
pub const REF_TOLERANCE: f64 = 1e-4;

/// Largest coordinate considered finite; also the empty-accumulator sentinel.
pub const MAX_COORD: f64 = f64::MAX;

/// Smallest coordinate considered finite.
pub const MIN_COORD: f64 = -f64::MAX;
