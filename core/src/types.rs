use ndarray::Array2;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Squared euclidean distance between two cells.
pub fn distance_sq(a: Coord2, b: Coord2) -> u32 {
    let dr = i32::from(a.0) - i32::from(b.0);
    let dc = i32::from(a.1) - i32::from(b.1);
    (dr * dr + dc * dc) as u32
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
    fn iter_cardinal(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, dims(self), Adjacency::Full)
    }

    fn iter_cardinal(&self, index: Coord2) -> NeighborIter {
        NeighborIter::new(index, dims(self), Adjacency::Cardinal)
    }
}

fn dims<T>(array: &Array2<T>) -> Coord2 {
    let (rows, cols) = array.dim();
    (
        rows.try_into().unwrap_or(Coord::MAX),
        cols.try_into().unwrap_or(Coord::MAX),
    )
}

/// Which cells count as touching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Adjacency {
    /// Edges and corners, up to 8 cells.
    Full,
    /// Edges only, up to 4 cells.
    Cardinal,
}

// Cardinal displacements come first so `Cardinal` can take a prefix.
const DISPLACEMENTS: [(isize, isize); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

impl Adjacency {
    const fn len(self) -> usize {
        match self {
            Self::Full => 8,
            Self::Cardinal => 4,
        }
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (isize, isize), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (dr, dc) = delta;
    let (max_row, max_col) = bounds;

    let next_row = row.checked_add_signed(dr.try_into().ok()?)?;
    if next_row >= max_row {
        return None;
    }

    let next_col = col.checked_add_signed(dc.try_into().ok()?)?;
    if next_col >= max_col {
        return None;
    }

    Some((next_row, next_col))
}

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    adjacency: Adjacency,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2, adjacency: Adjacency) -> Self {
        Self {
            center,
            bounds,
            adjacency,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= self.adjacency.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
