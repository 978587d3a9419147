//! Hook for renderers: the store enumerates what to draw, the painter draws.

use crate::entity::{EntityId, EntityKind, Line};
use crate::store::EntityStore;

/// Per-entity state a painter may style by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawState {
    /// The line or one of its ancestors is selected.
    pub selected: bool,
    /// Nesting depth below the entity the walk started from.
    pub depth: usize,
}

/// Receives the visible lines of a subtree in draw order.
pub trait Painter {
    fn draw_line(&mut self, entity: EntityId, line: &Line, state: DrawState);
}

impl EntityStore {
    /// Walks the visible subtree of `id` in draw order, handing every line to
    /// `painter`. Hidden composites are skipped with everything below them.
    /// Returns the number of lines drawn.
    pub fn draw(&self, id: EntityId, painter: &mut impl Painter) -> usize {
        let selected = self.is_parent_selected(id);
        self.draw_subtree(id, painter, DrawState { selected, depth: 0 })
    }

    fn draw_subtree(&self, id: EntityId, painter: &mut impl Painter, state: DrawState) -> usize {
        let Some(data) = self.get(id) else {
            return 0;
        };
        if !data.visible {
            return 0;
        }
        let state = DrawState {
            selected: state.selected || data.selected,
            ..state
        };
        match &data.kind {
            EntityKind::Line(line) => {
                painter.draw_line(id, line, state);
                1
            }
            kind => {
                let child_state = DrawState {
                    depth: state.depth + 1,
                    ..state
                };
                kind.children()
                    .iter()
                    .map(|c| self.draw_subtree(*c, painter, child_state))
                    .sum()
            }
        }
    }
}
