use thiserror::Error;

use crate::entity::EntityType;

/// Top-level error type for the drafting entity model.
#[derive(Debug, Error)]
pub enum PfError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors related to geometric computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,
}

/// Misuse of the entity tree. These are caller errors, not runtime conditions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EntityError {
    #[error("entity not found")]
    NotFound,

    #[error("{0:?} entity cannot hold children")]
    NotAContainer(EntityType),

    #[error("entity is not a line")]
    NotALine,

    #[error("entity is not a polyline")]
    NotAPolyline,

    #[error("polyline segments can only be changed through the vertex API")]
    PolylineChildren,

    #[error("polyline segment is not an atomic entity")]
    NonAtomicSegment,

    #[error("arc segments are not supported (bulge {bulge})")]
    ArcSegmentUnsupported { bulge: f64 },
}

/// Convenience type alias for results using [`PfError`].
pub type Result<T> = std::result::Result<T, PfError>;
