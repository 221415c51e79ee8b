use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn orthogonal_neighbors(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }

    pub fn squared_distance(self, other: Pos) -> u64 {
        let dy = (self.y - other.y) as i64;
        let dx = (self.x - other.x) as i64;
        (dy * dy + dx * dx) as u64
    }
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellKind {
    Wall,
    Floor,
    ControlFloor,
    BossFloor,
    MiniBossFloor,
    Door,
    BossDoor,
}

impl CellKind {
    pub fn is_walkable(self) -> bool {
        self != CellKind::Wall
    }

    pub fn code(self) -> u8 {
        match self {
            CellKind::Wall => 0,
            CellKind::Floor => 1,
            CellKind::ControlFloor => 2,
            CellKind::BossFloor => 3,
            CellKind::MiniBossFloor => 4,
            CellKind::Door => 5,
            CellKind::BossDoor => 6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Control,
    Boss,
    MiniBoss,
    Normal,
}
