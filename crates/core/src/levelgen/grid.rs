//! Row-major cell grid with bounds-checked access and perimeter sealing.

use crate::types::{CellKind, Pos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, kind: CellKind) -> Self {
        Self { width, height, cells: vec![kind; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Out-of-bounds reads behave as solid wall.
    pub fn get(&self, pos: Pos) -> CellKind {
        if !self.in_bounds(pos) {
            return CellKind::Wall;
        }
        self.cells[(pos.y as usize) * self.width + (pos.x as usize)]
    }

    /// Out-of-bounds writes are dropped.
    pub fn set(&mut self, pos: Pos, kind: CellKind) {
        if !self.in_bounds(pos) {
            return;
        }
        self.cells[(pos.y as usize) * self.width + (pos.x as usize)] = kind;
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.get(pos).is_walkable()
    }

    /// Forces the outer border back to wall. Carving never targets the border,
    /// this guards the invariant regardless.
    pub fn seal_border(&mut self) {
        for x in 0..self.width {
            self.cells[x] = CellKind::Wall;
            self.cells[(self.height - 1) * self.width + x] = CellKind::Wall;
        }
        for y in 0..self.height {
            self.cells[y * self.width] = CellKind::Wall;
            self.cells[y * self.width + self.width - 1] = CellKind::Wall;
        }
    }

    pub fn walkable_ratio(&self) -> f64 {
        let walkable = self.cells.iter().filter(|cell| cell.is_walkable()).count();
        walkable as f64 / self.cells.len() as f64
    }

    /// Nearest walkable cell to `desired`, lowest (y, x) on ties. Falls back to
    /// `desired` itself when the grid has no walkable cell at all.
    pub fn nearest_walkable(&self, desired: Pos) -> Pos {
        if self.is_walkable(desired) {
            return desired;
        }

        let mut best = desired;
        let mut best_distance = u32::MAX;
        for y in 1..(self.height as i32 - 1) {
            for x in 1..(self.width as i32 - 1) {
                let pos = Pos { y, x };
                if !self.is_walkable(pos) {
                    continue;
                }
                let distance = crate::types::manhattan(pos, desired);
                if distance < best_distance
                    || (distance == best_distance && (pos.y, pos.x) < (best.y, best.x))
                {
                    best = pos;
                    best_distance = distance;
                }
            }
        }
        best
    }
}
