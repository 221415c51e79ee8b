//! Undirected room adjacency. An edge exists exactly when a corridor was
//! physically carved between the two rooms.

use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl RoomGraph {
    pub fn new(room_count: usize) -> Self {
        Self { adjacency: vec![BTreeSet::new(); room_count] }
    }

    pub fn room_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn add_edge(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency[a].contains(&b)
    }

    pub fn neighbors(&self, room: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[room].iter().copied()
    }

    pub fn degree(&self, room: usize) -> usize {
        self.adjacency[room].len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }
}
