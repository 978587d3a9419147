//! Triangle mesh records as produced by an external mesher.
//!
//! The crate never builds meshes; these types only give mesher output a
//! shape to land in.

use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Aabb, Point2};

/// A mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Projection onto the drawing plane.
    #[must_use]
    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A triangular element referencing three nodes by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub nodes: [usize; 3],
    /// Mesher element type code.
    pub element_type: i32,
    /// Physical group the element belongs to.
    pub physical_tag: i32,
    /// Geometric entity the element was meshed from.
    pub geometry_tag: i32,
}

/// Nodes plus the elements built on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
}

impl Mesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.elements.is_empty()
    }

    /// Planar bounds of all nodes, `None` without nodes.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut bounds = Aabb::empty();
        for node in &self.nodes {
            bounds.include_point(&node.xy());
        }
        Some(bounds.sanitized())
    }

    pub fn elements_with_physical_tag(&self, tag: i32) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter().filter(move |e| e.physical_tag == tag)
    }

    /// The three nodes of `element`, or `None` if an index is out of range.
    #[must_use]
    pub fn element_nodes(&self, element: &Element) -> Option<[&Node; 3]> {
        let [a, b, c] = element.nodes;
        Some([self.nodes.get(a)?, self.nodes.get(b)?, self.nodes.get(c)?])
    }

    /// Signed planar area of `element`; positive for counter-clockwise nodes.
    #[must_use]
    pub fn element_area(&self, element: &Element) -> Option<f64> {
        let corners = self.element_nodes(element)?.map(Node::xy);
        Some(signed_area_2d(&corners))
    }
}
