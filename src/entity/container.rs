use super::EntityId;

/// Ordered list of child entities.
///
/// Order is draw order (z-order) and the tie-break order of queries. The
/// list only holds keys; the entities themselves live in the store, which
/// deletes them together with their owning container.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Container {
    children: Vec<EntityId>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Children in draw order.
    #[must_use]
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<EntityId> {
        self.children.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<EntityId> {
        self.children.last().copied()
    }

    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.children.iter().position(|c| *c == id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.children.contains(&id)
    }

    pub(crate) fn push(&mut self, id: EntityId) {
        self.children.push(id);
    }

    pub(crate) fn prepend(&mut self, id: EntityId) {
        self.children.insert(0, id);
    }

    /// Inserts at `index`, clamped to the end of the list.
    pub(crate) fn insert(&mut self, index: usize, id: EntityId) {
        let index = index.min(self.children.len());
        self.children.insert(index, id);
    }

    /// Removes the first occurrence of `id`.
    pub(crate) fn remove(&mut self, id: EntityId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Empties the list, handing back the former children in order.
    pub(crate) fn take_all(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn reverse(&mut self) {
        self.children.reverse();
    }

    /// Moves `id` to the back of the list if present.
    pub(crate) fn move_to_back(&mut self, id: EntityId) {
        if self.remove(id) {
            self.children.push(id);
        }
    }

    /// Moves the listed children so they sit, in list order, before the child
    /// currently at `index`.
    ///
    /// `index == 0` moves them to the front, `index >= count()` to the back.
    /// Ids not in the container and repeated ids are dropped. Returns the ids
    /// actually moved.
    pub(crate) fn move_entities(&mut self, index: usize, list: &[EntityId]) -> Vec<EntityId> {
        let anchor = if index > 0 {
            self.children.get(index).copied()
        } else {
            None
        };

        let mut moved = Vec::with_capacity(list.len());
        for &id in list {
            if !moved.contains(&id) && self.remove(id) {
                moved.push(id);
            }
        }
        if moved.is_empty() {
            return moved;
        }

        let at = match anchor {
            _ if index == 0 => 0,
            Some(anchor) if !moved.contains(&anchor) => {
                self.position(anchor).unwrap_or(self.children.len())
            }
            Some(_) => index.min(self.children.len()),
            None => self.children.len(),
        };
        self.children.splice(at..at, moved.iter().copied());
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<EntityId> {
        let mut map: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn filled(ids: &[EntityId]) -> Container {
        let mut c = Container::new();
        for id in ids {
            c.push(*id);
        }
        c
    }

    #[test]
    fn insert_clamps_and_prepend() {
        let k = ids(3);
        let mut c = Container::new();
        c.insert(10, k[0]);
        c.prepend(k[1]);
        c.insert(1, k[2]);
        assert_eq!(c.children(), &[k[1], k[2], k[0]]);
        assert_eq!(c.first(), Some(k[1]));
        assert_eq!(c.last(), Some(k[0]));
    }

    #[test]
    fn move_before_anchor_keeps_list_order() {
        let k = ids(4);
        let mut c = filled(&k);
        let moved = c.move_entities(1, &[k[3], k[2]]);
        assert_eq!(moved, vec![k[3], k[2]]);
        assert_eq!(c.children(), &[k[0], k[3], k[2], k[1]]);
    }

    #[test]
    fn move_to_front_and_back() {
        let k = ids(4);
        let mut c = filled(&k);
        c.move_entities(0, &[k[2]]);
        assert_eq!(c.children(), &[k[2], k[0], k[1], k[3]]);
        c.move_entities(99, &[k[2], k[0]]);
        assert_eq!(c.children(), &[k[1], k[3], k[2], k[0]]);
    }

    #[test]
    fn move_drops_absent_and_duplicate_ids() {
        let k = ids(5);
        let mut c = filled(&k[..3]);
        let moved = c.move_entities(0, &[k[4], k[2], k[2], k[3]]);
        assert_eq!(moved, vec![k[2]]);
        assert_eq!(c.children(), &[k[2], k[0], k[1]]);
        assert!(c.move_entities(1, &[k[4]]).is_empty());
        assert_eq!(c.count(), 3);
    }

    #[test]
    fn move_with_anchor_in_list() {
        let k = ids(4);
        let mut c = filled(&k);
        c.move_entities(1, &[k[1], k[3]]);
        assert_eq!(c.children(), &[k[0], k[1], k[3], k[2]]);
    }

    #[test]
    fn remove_and_reverse() {
        let k = ids(3);
        let mut c = filled(&k);
        assert!(c.remove(k[1]));
        assert!(!c.remove(k[1]));
        c.reverse();
        assert_eq!(c.children(), &[k[2], k[0]]);
        c.move_to_back(k[2]);
        assert_eq!(c.children(), &[k[0], k[2]]);
        assert_eq!(c.take_all(), vec![k[0], k[2]]);
        assert!(c.is_empty());
    }
}
