//! Drawable entities and the data the store keeps for each of them.
//!
//! Entities form a tree: atomic shapes ([`Line`]) are leaves, composites
//! ([`Polyline`], [`Container`]) own an ordered list of children. The tree
//! lives in an [`EntityStore`](crate::store::EntityStore) arena and entities
//! refer to each other through [`EntityId`] keys.

mod container;
mod line;
mod polyline;

pub use container::Container;
pub use line::{Line, LineIndices};
pub use polyline::{Polyline, PolylineState, SegmentShape};

use crate::math::{Aabb, Point2};

slotmap::new_key_type! {
    /// Unique identifier for an entity in the entity store.
    pub struct EntityId;
}

/// Shape tag of an entity, for dispatch without matching on the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Line,
    Polyline,
    Container,
}

/// How deep a "what is under the cursor" query resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveLevel {
    /// Report the direct child of the queried container.
    #[default]
    None,
    /// Report the deepest atomic entity.
    All,
}

/// The geometric payload of an entity.
#[derive(Debug)]
pub enum EntityKind {
    /// A straight segment.
    Line(Line),
    /// A chain of line segments with shared endpoints.
    Polyline(Polyline),
    /// A plain group of entities.
    Container(Container),
}

impl EntityKind {
    /// Returns the shape tag.
    #[must_use]
    pub fn rtti(&self) -> EntityType {
        match self {
            Self::Line(_) => EntityType::Line,
            Self::Polyline(_) => EntityType::Polyline,
            Self::Container(_) => EntityType::Container,
        }
    }

    /// Returns `true` for leaf shapes that cannot hold children.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::Line(_))
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        !self.is_atomic()
    }

    /// Children in draw order; empty for atomic entities.
    #[must_use]
    pub fn children(&self) -> &[EntityId] {
        match self {
            Self::Line(_) => &[],
            Self::Polyline(p) => p.segments(),
            Self::Container(c) => c.children(),
        }
    }

    #[must_use]
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Self::Line(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_polyline(&self) -> Option<&Polyline> {
        match self {
            Self::Polyline(p) => Some(p),
            _ => None,
        }
    }

    /// Applies `f` to every point stored directly in this payload.
    ///
    /// Children are not visited; their points live in their own slots.
    pub(crate) fn map_own_points(&mut self, f: &dyn Fn(&mut Point2)) {
        match self {
            Self::Line(l) => l.map_points(f),
            Self::Polyline(p) => p.map_markers(f),
            Self::Container(_) => {}
        }
    }
}

impl From<Line> for EntityKind {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Polyline> for EntityKind {
    fn from(polyline: Polyline) -> Self {
        Self::Polyline(polyline)
    }
}

impl From<Container> for EntityKind {
    fn from(container: Container) -> Self {
        Self::Container(container)
    }
}

/// Everything the store keeps for one entity.
#[derive(Debug)]
pub struct EntityData {
    pub(crate) kind: EntityKind,
    pub(crate) parent: Option<EntityId>,
    pub(crate) bounds: Aabb,
    pub(crate) selected: bool,
    pub(crate) visible: bool,
}

impl EntityData {
    /// Creates a visible, unselected entity with no parent.
    #[must_use]
    pub fn new(kind: impl Into<EntityKind>) -> Self {
        Self {
            kind: kind.into(),
            parent: None,
            bounds: Aabb::empty(),
            selected: false,
            visible: true,
        }
    }

    /// Builder-style visibility override.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    #[must_use]
    pub fn rtti(&self) -> EntityType {
        self.kind.rtti()
    }

    /// The owning container, if any. Never keeps the parent alive.
    #[must_use]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Cached bounds, valid after the last `calculate_borders` or transform.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// The point found.
    pub point: Point2,
    /// Distance from the query coordinate to `point`.
    pub distance: f64,
    /// The atomic entity the point belongs to.
    pub entity: EntityId,
}

/// Result of a distance-to-point ("under the cursor") query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance from the query coordinate to the entity.
    pub distance: f64,
    /// The entity hit, resolved per [`ResolveLevel`].
    pub entity: EntityId,
}
