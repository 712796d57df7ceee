//! Precomputed heights for the play area.

/// Row-major table of column heights covering `[-half_extent, half_extent)²`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightMap {
    half_extent: i32,
    side: usize,
    heights: Vec<i32>,
}

impl HeightMap {
    pub(crate) fn from_raw(half_extent: i32, heights: Vec<i32>) -> Self {
        let side = usize::try_from(half_extent).unwrap_or(0) * 2;
        debug_assert_eq!(heights.len(), side * side, "height table does not cover the play area");
        Self { half_extent, side, heights }
    }

    /// World column for flat index `i` in a table of the given side.
    pub(crate) fn column_of(i: usize, side: usize, half_extent: i32) -> (i32, i32) {
        let col = i32::try_from(i % side).unwrap_or(i32::MAX);
        let row = i32::try_from(i / side).unwrap_or(i32::MAX);
        (col - half_extent, row - half_extent)
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        let col = usize::try_from(x + self.half_extent).ok()?;
        let row = usize::try_from(z + self.half_extent).ok()?;
        (col < self.side && row < self.side).then_some(col + row * self.side)
    }

    #[must_use]
    pub fn get(&self, x: i32, z: i32) -> Option<i32> {
        self.index(x, z).map(|i| self.heights[i])
    }

    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Iterate `(x, z, height)` over every column in the table.
    pub fn columns(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        self.heights.iter().enumerate().map(|(i, &h)| {
            let (x, z) = Self::column_of(i, self.side, self.half_extent);
            (x, z, h)
        })
    }

    #[must_use]
    pub fn min_height(&self) -> Option<i32> {
        self.heights.iter().copied().min()
    }

    #[must_use]
    pub fn max_height(&self) -> Option<i32> {
        self.heights.iter().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_corners() {
        let map = HeightMap::from_raw(2, (0..16).collect());
        assert_eq!(map.get(-2, -2), Some(0));
        assert_eq!(map.get(1, -2), Some(3));
        assert_eq!(map.get(-2, -1), Some(4));
        assert_eq!(map.get(1, 1), Some(15));
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.get(0, -3), None);
    }

    #[test]
    fn columns_visit_every_cell_once() {
        let map = HeightMap::from_raw(2, (0..16).collect());
        let cols: Vec<(i32, i32, i32)> = map.columns().collect();
        assert_eq!(cols.len(), 16);
        assert!(cols.iter().all(|&(x, z, h)| map.get(x, z) == Some(h)));
        assert_eq!(map.min_height(), Some(0));
        assert_eq!(map.max_height(), Some(15));
    }
}
