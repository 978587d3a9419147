//! Text export in the `.geo` geometry-description format.
//!
//! Points and lines are numbered by [`IdAllocator`]s. Indexed lines keep the
//! numbers they were created with; plain lines are numbered on export.

use std::collections::HashSet;

use crate::entity::{EntityId, EntityKind, Line, LineIndices};
use crate::math::{Point2, TOLERANCE};
use crate::store::EntityStore;

/// Hands out consecutive ids starting at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id and advances.
    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next [`allocate`](Self::allocate) will return.
    #[must_use]
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// A numbered point of the geometry description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub index: u32,
    pub position: Point2,
}

impl GeoPoint {
    #[must_use]
    pub fn new(index: u32, position: Point2) -> Self {
        Self { index, position }
    }
}

/// Export parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoOptions {
    /// Target mesh size written with every point.
    pub characteristic_length: f64,
    /// Digits after the decimal point for coordinates.
    pub precision: usize,
}

impl Default for GeoOptions {
    fn default() -> Self {
        Self {
            characteristic_length: 1.0,
            precision: 6,
        }
    }
}

/// `Point (<index>) = {<x>, <y>, 0, <lc>};`
#[must_use]
pub fn point_record(index: u32, position: &Point2, options: &GeoOptions) -> String {
    let p = options.precision;
    format!(
        "Point ({index}) = {{{:.p$}, {:.p$}, 0, {:.p$}}};",
        position.x, position.y, options.characteristic_length
    )
}

/// `Line (<id>) = {<start>, <end>};`
#[must_use]
pub fn line_record(id: u32, start: u32, end: u32) -> String {
    format!("Line ({id}) = {{{start}, {end}}};")
}

/// `Line Loop (<id>) = {<l1>, <l2>, ...};`
#[must_use]
pub fn line_loop_record(id: u32, lines: &[u32]) -> String {
    let list = lines
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Line Loop ({id}) = {{{list}}};")
}

/// Accumulates records, writing each point once before its first use.
#[derive(Debug)]
pub struct GeoWriter {
    options: GeoOptions,
    points: IdAllocator,
    lines: IdAllocator,
    written: HashSet<u32>,
    positions: Vec<(u32, Point2)>,
    out: String,
}

impl GeoWriter {
    /// Creates a writer numbering new points and lines from the given
    /// allocators.
    #[must_use]
    pub fn new(options: GeoOptions, points: IdAllocator, lines: IdAllocator) -> Self {
        Self {
            options,
            points,
            lines,
            written: HashSet::new(),
            positions: Vec::new(),
            out: String::new(),
        }
    }

    /// Writes point `index` unless it was written before.
    pub fn point(&mut self, index: u32, position: &Point2) {
        if self.written.insert(index) {
            self.positions.push((index, *position));
            self.push(&point_record(index, position, &self.options));
        }
    }

    /// Writes the line and any of its points not yet written. Returns the
    /// line id.
    ///
    /// A plain line gets fresh ids; its endpoints reuse any point already
    /// written at the same position.
    pub fn line(&mut self, line: &Line) -> u32 {
        let indices = match line.indices() {
            Some(indices) => {
                self.point(indices.start, &line.start_point());
                self.point(indices.end, &line.end_point());
                indices
            }
            None => LineIndices {
                id: self.lines.allocate(),
                start: self.point_at(&line.start_point()),
                end: self.point_at(&line.end_point()),
            },
        };
        self.push(&line_record(indices.id, indices.start, indices.end));
        indices.id
    }

    /// Writes a loop over already written lines. Returns the loop id.
    pub fn line_loop(&mut self, lines: &[u32]) -> u32 {
        let id = self.lines.allocate();
        self.push(&line_loop_record(id, lines));
        id
    }

    /// The text written so far, one record per line.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn point_at(&mut self, position: &Point2) -> u32 {
        let existing = self
            .positions
            .iter()
            .find(|(_, p)| (p - position).norm() < TOLERANCE)
            .map(|(index, _)| *index);
        existing.unwrap_or_else(|| {
            let index = self.points.allocate();
            self.point(index, position);
            index
        })
    }

    fn push(&mut self, record: &str) {
        self.out.push_str(record);
        self.out.push('\n');
    }
}

impl EntityStore {
    /// Writes the subtree in draw order, hidden entities included. Closed
    /// polylines also get a line loop. Returns the ids of the lines written.
    pub fn write_geo(&self, id: EntityId, writer: &mut GeoWriter) -> Vec<u32> {
        let Some(data) = self.get(id) else {
            return Vec::new();
        };
        match &data.kind {
            EntityKind::Line(line) => vec![writer.line(line)],
            EntityKind::Polyline(pl) => {
                let ids: Vec<u32> = pl
                    .segments()
                    .iter()
                    .flat_map(|s| self.write_geo(*s, writer))
                    .collect();
                if pl.is_closed() && !ids.is_empty() {
                    writer.line_loop(&ids);
                }
                ids
            }
            EntityKind::Container(container) => container
                .children()
                .iter()
                .flat_map(|c| self.write_geo(*c, writer))
                .collect(),
        }
    }
}
