#![forbid(unsafe_code)]

//! Item → container ownership index over one board snapshot.
//!
//! The index pins the [`Arc<Board>`] it was built from. Callers compare the
//! pinned snapshot against the store's current one with
//! [`ContainerIndex::is_snapshot`] (pointer identity) and rebuild only when
//! the store has published a new board.

use std::sync::Arc;

use ahash::AHashMap;

use crate::model::{Board, Container, ContainerId};

/// Precomputed ownership map for a single [`Board`] snapshot.
#[derive(Debug, Clone)]
pub struct ContainerIndex {
    board: Arc<Board>,
    /// Item id → position of the owning container in `board.containers`.
    owners: AHashMap<String, usize>,
    /// Container id → position in `board.containers`.
    containers: AHashMap<String, usize>,
}

impl ContainerIndex {
    /// Build the index for `board`.
    ///
    /// If the board violates the uniqueness invariants, the first container
    /// seen for a given id wins.
    #[must_use]
    pub fn new(board: Arc<Board>) -> Self {
        let mut owners = AHashMap::with_capacity(board.total_items());
        let mut containers = AHashMap::with_capacity(board.containers.len());
        for (pos, container) in board.containers.iter().enumerate() {
            containers
                .entry(container.id.as_str().to_owned())
                .or_insert(pos);
            for item in &container.items {
                owners.entry(item.as_str().to_owned()).or_insert(pos);
            }
        }
        Self {
            board,
            owners,
            containers,
        }
    }

    /// The snapshot this index was built from.
    #[must_use]
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Whether `snapshot` is the same allocation this index was built from.
    #[must_use]
    pub fn is_snapshot(&self, snapshot: &Arc<Board>) -> bool {
        Arc::ptr_eq(&self.board, snapshot)
    }

    /// Id of the container that owns `item`.
    #[must_use]
    pub fn owner_of(&self, item: &str) -> Option<&ContainerId> {
        self.owning_container(item).map(|c| &c.id)
    }

    /// The container that owns `item`.
    #[must_use]
    pub fn owning_container(&self, item: &str) -> Option<&Container> {
        let pos = *self.owners.get(item)?;
        self.board.containers.get(pos)
    }

    /// Look up a container by id.
    #[must_use]
    pub fn container(&self, id: &str) -> Option<&Container> {
        let pos = *self.containers.get(id)?;
        self.board.containers.get(pos)
    }

    /// Resolve a hover/drop target id to a container.
    ///
    /// A container whose id equals `over` takes precedence over a container
    /// owning an item whose id equals `over`.
    #[must_use]
    pub fn resolve_target(&self, over: &str) -> Option<&Container> {
        self.container(over).or_else(|| self.owning_container(over))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> ContainerIndex {
        ContainerIndex::new(Arc::new(
            Board::default()
                .with_container("TODO", ["a", "b", "c"])
                .with_container("DOING", ["d"])
                .with_container("DONE", Vec::<&str>::new()),
        ))
    }

    #[test]
    fn owner_of_matches_linear_scan() {
        let idx = index();
        for item in ["a", "b", "c", "d"] {
            assert_eq!(
                idx.owner_of(item),
                idx.board().container_of(item).map(|c| &c.id),
                "owner mismatch for {item}"
            );
        }
        assert!(idx.owner_of("missing").is_none());
    }

    #[test]
    fn resolve_target_accepts_container_or_item() {
        let idx = index();
        assert_eq!(idx.resolve_target("DOING").unwrap().id, "DOING");
        assert_eq!(idx.resolve_target("b").unwrap().id, "TODO");
        assert_eq!(idx.resolve_target("DONE").unwrap().id, "DONE");
        assert!(idx.resolve_target("nowhere").is_none());
    }

    #[test]
    fn container_id_wins_over_item_id() {
        let idx = ContainerIndex::new(Arc::new(
            Board::default()
                .with_container("x", ["y"])
                .with_container("z", ["x"]),
        ));
        assert_eq!(idx.resolve_target("x").unwrap().id, "x");
        assert_eq!(idx.owner_of("x").unwrap(), "z");
    }

    #[test]
    fn snapshot_identity_is_pointer_based() {
        let board = Arc::new(Board::default().with_container("TODO", ["a"]));
        let idx = ContainerIndex::new(Arc::clone(&board));
        assert!(idx.is_snapshot(&board));

        let equal_but_new = Arc::new((*board).clone());
        assert!(!idx.is_snapshot(&equal_but_new));
    }
}
