use slab::Slab;
use std::ops::{Index, IndexMut};
use tracing::trace;

/// The generation a fresh or cleared board starts at.
pub const INITIAL_GENERATION: u64 = 1;

#[derive(Hash, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug)]
pub(crate) struct NodeId(u32);

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Quadrant {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Quadrant {
    /// Pre-order visiting order.
    pub(crate) const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];

    /// Offset of the quadrant's top-left corner from its parent's.
    pub(crate) fn offset(self, half: i128) -> (i128, i128) {
        match self {
            Quadrant::Nw => (0, 0),
            Quadrant::Ne => (half, 0),
            Quadrant::Sw => (0, half),
            Quadrant::Se => (half, half),
        }
    }

    /// The quadrant of the square `[x0, x0 + 2 * half) × [y0, y0 + 2 * half)`
    /// holding `(x, y)`, if the point lies in the square at all.
    pub(crate) fn locate(x0: i128, y0: i128, half: i128, x: i128, y: i128) -> Option<Quadrant> {
        let west = x0 <= x && x < x0 + half;
        let east = x0 + half <= x && x < x0 + 2 * half;
        let north = y0 <= y && y < y0 + half;
        let south = y0 + half <= y && y < y0 + 2 * half;
        match (west, east, north, south) {
            (true, _, true, _) => Some(Quadrant::Nw),
            (_, true, true, _) => Some(Quadrant::Ne),
            (true, _, _, true) => Some(Quadrant::Sw),
            (_, true, _, true) => Some(Quadrant::Se),
            _ => None,
        }
    }
}

/// A square region of the plane: `[x, x + size) × [y, y + size)`.
///
/// Cells are `i64`, but a square around cells near the ends of that range
/// reaches past it, so squares are measured in `i128`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Square {
    pub x_top_left: i128,
    pub y_top_left: i128,
    pub size: i128,
}

impl Square {
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let (x, y) = (i128::from(x), i128::from(y));
        self.x_top_left <= x
            && x < self.x_top_left + self.size
            && self.y_top_left <= y
            && y < self.y_top_left + self.size
    }
}

/// A node covering a `2^level` square. A node only exists if some cell
/// beneath it is alive; at level 0 its existence is the live cell.
#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) level: u8,
    nw: Option<NodeId>,
    ne: Option<NodeId>,
    sw: Option<NodeId>,
    se: Option<NodeId>,
}

impl NodeData {
    fn new(level: u8) -> Self {
        NodeData {
            level,
            nw: None,
            ne: None,
            sw: None,
            se: None,
        }
    }

    pub(crate) fn size(&self) -> i128 {
        1 << self.level
    }

    pub(crate) fn child(&self, quadrant: Quadrant) -> Option<NodeId> {
        match quadrant {
            Quadrant::Nw => self.nw,
            Quadrant::Ne => self.ne,
            Quadrant::Sw => self.sw,
            Quadrant::Se => self.se,
        }
    }

    fn child_mut(&mut self, quadrant: Quadrant) -> &mut Option<NodeId> {
        match quadrant {
            Quadrant::Nw => &mut self.nw,
            Quadrant::Ne => &mut self.ne,
            Quadrant::Sw => &mut self.sw,
            Quadrant::Se => &mut self.se,
        }
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = (Quadrant, NodeId)> + '_ {
        Quadrant::ALL
            .into_iter()
            .filter_map(move |q| self.child(q).map(|id| (q, id)))
    }
}

/// A sparse Game of Life board on the unbounded integer plane.
///
/// Live cells are kept in a quadtree whose root covers the bounding square.
/// Dead regions are never materialized: a missing child means its whole
/// quadrant is dead.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) x_top_left: i128,
    pub(crate) y_top_left: i128,
    pub(crate) root: Option<NodeId>,
    node_data: Slab<NodeData>,
    pub(crate) generation: u64,
    population: u64,
}

impl Index<NodeId> for Board {
    type Output = NodeData;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.node_data[id.0 as usize]
    }
}

impl IndexMut<NodeId> for Board {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.node_data[id.0 as usize]
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl FromIterator<(i64, i64)> for Board {
    fn from_iter<T: IntoIterator<Item = (i64, i64)>>(iter: T) -> Self {
        let mut board = Board::new();
        board.extend(iter);
        board
    }
}

impl Extend<(i64, i64)> for Board {
    fn extend<T: IntoIterator<Item = (i64, i64)>>(&mut self, iter: T) {
        for (x, y) in iter {
            self.set(x, y);
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::with_generation(INITIAL_GENERATION)
    }

    pub fn with_generation(generation: u64) -> Self {
        Board {
            x_top_left: 0,
            y_top_left: 0,
            root: None,
            node_data: Slab::new(),
            generation,
            population: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The square guaranteed to contain every live cell, or `None` if no
    /// cell was ever set since the last clear.
    pub fn bounding_square(&self) -> Option<Square> {
        self.root.map(|id| Square {
            x_top_left: self.x_top_left,
            y_top_left: self.y_top_left,
            size: self[id].size(),
        })
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        self.bounding_square()
            .map_or(false, |square| square.contains(x, y))
    }

    /// Discards every cell and resets the generation counter.
    pub fn clear(&mut self) {
        self.node_data.clear();
        self.root = None;
        self.x_top_left = 0;
        self.y_top_left = 0;
        self.generation = INITIAL_GENERATION;
        self.population = 0;
    }

    /// Marks the cell alive, growing the bounding square as needed.
    ///
    /// Every `i64` coordinate is accepted. Two cells at opposite ends of the
    /// range grow the square to at most `2^66` on a side.
    pub fn set(&mut self, x: i64, y: i64) -> &mut Self {
        let root = match self.root {
            Some(root) => root,
            None => {
                self.x_top_left = x.into();
                self.y_top_left = y.into();
                let root = self.alloc(NodeData::new(0));
                self.root = Some(root);
                self.population = 1;
                return self;
            }
        };
        let root = self.grow_towards(root, x, y);
        if self.insert(root, x, y) {
            self.population += 1;
        }
        self
    }

    pub fn is_set(&self, x: i64, y: i64) -> bool {
        match self.root {
            Some(root) if self.contains(x, y) => self.lookup(root, x, y),
            _ => false,
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        NodeId(self.node_data.insert(data) as u32)
    }

    /// Doubles the bounding square until it holds `(x, y)`, each time
    /// hanging the old root in the quadrant facing away from the point.
    fn grow_towards(&mut self, mut root: NodeId, x: i64, y: i64) -> NodeId {
        while !self.contains(x, y) {
            let level = self[root].level;
            let size = self[root].size();
            let west = i128::from(x) < self.x_top_left;
            let north = i128::from(y) < self.y_top_left;
            let quadrant = match (west, north) {
                (true, true) => Quadrant::Se,
                (true, false) => Quadrant::Ne,
                (false, true) => Quadrant::Sw,
                (false, false) => Quadrant::Nw,
            };
            if west {
                self.x_top_left -= size;
            }
            if north {
                self.y_top_left -= size;
            }
            let mut parent = NodeData::new(level + 1);
            *parent.child_mut(quadrant) = Some(root);
            root = self.alloc(parent);
            self.root = Some(root);
            trace!(
                x_top_left = self.x_top_left,
                y_top_left = self.y_top_left,
                size = 2 * size,
                "grew bounding square"
            );
        }
        root
    }

    /// Descends to `(x, y)`, allocating missing children on the way.
    /// Returns whether the leaf is new.
    fn insert(&mut self, root: NodeId, x: i64, y: i64) -> bool {
        let (x, y) = (i128::from(x), i128::from(y));
        let (mut id, mut x0, mut y0) = (root, self.x_top_left, self.y_top_left);
        let mut created = false;
        while self[id].level > 0 {
            let level = self[id].level;
            let half = self[id].size() / 2;
            let quadrant = match Quadrant::locate(x0, y0, half, x, y) {
                Some(quadrant) => quadrant,
                None => unreachable!(
                    "({}, {}) lies outside the node at ({}, {}) of size {}",
                    x,
                    y,
                    x0,
                    y0,
                    2 * half
                ),
            };
            let (dx, dy) = quadrant.offset(half);
            x0 += dx;
            y0 += dy;
            id = match self[id].child(quadrant) {
                Some(child) => child,
                None => {
                    let child = self.alloc(NodeData::new(level - 1));
                    *self[id].child_mut(quadrant) = Some(child);
                    created = true;
                    child
                }
            };
            debug_assert_eq!(
                self[id].level + 1,
                level,
                "a child sits exactly one level below its parent"
            );
        }
        created
    }

    /// The caller must have checked that `(x, y)` lies in the bounding square.
    fn lookup(&self, root: NodeId, x: i64, y: i64) -> bool {
        let (x, y) = (i128::from(x), i128::from(y));
        let (mut id, mut x0, mut y0) = (root, self.x_top_left, self.y_top_left);
        while self[id].level > 0 {
            let half = self[id].size() / 2;
            let quadrant = match Quadrant::locate(x0, y0, half, x, y) {
                Some(quadrant) => quadrant,
                None => unreachable!("({}, {}) is not in the bounding square", x, y),
            };
            let (dx, dy) = quadrant.offset(half);
            x0 += dx;
            y0 += dy;
            id = match self[id].child(quadrant) {
                Some(child) => child,
                None => return false,
            };
        }
        true
    }

    /// Whether anything beneath the node is alive.
    pub(crate) fn is_populated(&self, id: NodeId) -> bool {
        let data = &self[id];
        data.level == 0 || data.children().any(|(_, child)| self.is_populated(child))
    }

    /// Tight bounds of the living cells: (left, right, top, bottom), all
    /// inclusive.
    pub fn bound(&self) -> Option<(i64, i64, i64, i64)> {
        let root = self.root?;
        let (x0, y0) = (self.x_top_left, self.y_top_left);
        match (
            self.extent(root, x0, y0, Side::Left),
            self.extent(root, x0, y0, Side::Right),
            self.extent(root, x0, y0, Side::Top),
            self.extent(root, x0, y0, Side::Bottom),
        ) {
            (Some(left), Some(right), Some(top), Some(bottom)) => Some((left, right, top, bottom)),
            (None, None, None, None) => None,
            _ => unreachable!(),
        }
    }

    /// Outermost live coordinate towards `side`. Quadrants on that side are
    /// searched first and the far pair only if the near pair is empty.
    fn extent(&self, id: NodeId, x0: i128, y0: i128, side: Side) -> Option<i64> {
        let data = &self[id];
        if data.level == 0 {
            // A leaf's corner is the cell itself, so it fits in `i64`.
            return Some(match side {
                Side::Left | Side::Right => x0 as i64,
                Side::Top | Side::Bottom => y0 as i64,
            });
        }
        let half = data.size() / 2;
        let (near, far) = side.quadrants();
        let best = |quadrants: [Quadrant; 2]| {
            let extents = quadrants.iter().filter_map(|&q| {
                let child = data.child(q)?;
                let (dx, dy) = q.offset(half);
                self.extent(child, x0 + dx, y0 + dy, side)
            });
            match side {
                Side::Left | Side::Top => extents.min(),
                Side::Right | Side::Bottom => extents.max(),
            }
        };
        best(near).or_else(|| best(far))
    }
}

#[derive(Copy, Clone, Debug)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    fn quadrants(self) -> ([Quadrant; 2], [Quadrant; 2]) {
        use Quadrant::*;
        match self {
            Side::Left => ([Nw, Sw], [Ne, Se]),
            Side::Right => ([Ne, Se], [Nw, Sw]),
            Side::Top => ([Nw, Ne], [Sw, Se]),
            Side::Bottom => ([Sw, Se], [Nw, Ne]),
        }
    }
}
