use crate::geometry::TileParameters;
use num_traits::{Float, ToPrimitive};

/// A uniform grid of tiles over the clustering space, holding the indices
/// of the points that fall into each tile. Periodic axes wrap around at
/// the bounds; non-periodic axes clamp, so points slightly outside the
/// configured bounds land in the border tiles.
#[derive(Debug, Clone)]
pub(crate) struct TileGrid<T, const D: usize> {
    params: TileParameters<T, D>,
    n_tiles: [usize; D],
    strides: [usize; D],
    bins: Vec<Vec<usize>>,
}

impl<T: Float, const D: usize> TileGrid<T, D> {
    pub(crate) fn new(params: TileParameters<T, D>) -> Self {
        let mut n_tiles = [1usize; D];
        for dim in 0..D {
            let span = (params.max[dim] - params.min[dim]) / params.tile_size[dim];
            n_tiles[dim] = span.ceil().to_usize().unwrap_or(1).max(1);
        }
        let mut strides = [1usize; D];
        for dim in (0..D.saturating_sub(1)).rev() {
            strides[dim] = strides[dim + 1] * n_tiles[dim + 1];
        }
        let total: usize = n_tiles.iter().product();
        TileGrid { params, n_tiles, strides, bins: vec![Vec::new(); total] }
    }

    pub(crate) fn fill(&mut self, coords: &[[T; D]]) {
        for (idx, point) in coords.iter().enumerate() {
            let bin = self.bin_of(point);
            self.bins[bin].push(idx);
        }
    }

    fn bin_of(&self, coords: &[T; D]) -> usize {
        let mut bin = 0;
        for dim in 0..D {
            bin += self.dim_bin(coords[dim], dim) * self.strides[dim];
        }
        bin
    }

    fn dim_bin(&self, coord: T, dim: usize) -> usize {
        let n = self.n_tiles[dim];
        let offset = (coord - self.params.min[dim]) / self.params.tile_size[dim];
        let raw = offset.floor().to_isize().unwrap_or(0);
        if self.params.wrapped[dim] {
            raw.rem_euclid(n as isize) as usize
        } else {
            raw.clamp(0, n as isize - 1) as usize
        }
    }

    /// Visits every point index stored in the tiles overlapping the box
    /// `[center - radius, center + radius]` in each dimension. Each stored
    /// point is visited at most once; the caller applies the exact
    /// distance cut.
    pub(crate) fn for_each_in_box(&self, center: &[T; D], radius: T, mut visit: impl FnMut(usize)) {
        let mut dim_bins: [Vec<usize>; D] = std::array::from_fn(|_| Vec::new());
        for dim in 0..D {
            dim_bins[dim] = self.search_range(center[dim], radius, dim);
        }
        let mut base = [0usize; D];
        self.visit_tiles(&dim_bins, &mut base, 0, &mut visit);
    }

    fn search_range(&self, center: T, radius: T, dim: usize) -> Vec<usize> {
        let n = self.n_tiles[dim] as isize;
        let size = self.params.tile_size[dim];
        let lo = ((center - radius - self.params.min[dim]) / size)
            .floor()
            .to_isize()
            .unwrap_or(0);
        let hi = ((center + radius - self.params.min[dim]) / size)
            .floor()
            .to_isize()
            .unwrap_or(n - 1);
        if self.params.wrapped[dim] {
            if hi - lo + 1 >= n {
                return (0..n as usize).collect();
            }
            (lo..=hi).map(|bin| bin.rem_euclid(n) as usize).collect()
        } else {
            let lo = lo.clamp(0, n - 1);
            let hi = hi.clamp(0, n - 1);
            (lo as usize..=hi as usize).collect()
        }
    }

    fn visit_tiles(
        &self,
        dim_bins: &[Vec<usize>; D],
        base: &mut [usize; D],
        dim: usize,
        visit: &mut impl FnMut(usize),
    ) {
        if dim == D {
            let bin: usize = (0..D).map(|d| base[d] * self.strides[d]).sum();
            for &point_idx in &self.bins[bin] {
                visit(point_idx);
            }
            return;
        }
        for &tile in &dim_bins[dim] {
            base[dim] = tile;
            self.visit_tiles(dim_bins, base, dim + 1, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn collect_in_box(grid: &TileGrid<f32, 2>, center: [f32; 2], radius: f32) -> Vec<usize> {
        let mut found = Vec::new();
        grid.for_each_in_box(&center, radius, |idx| found.push(idx));
        found.sort_unstable();
        found.dedup();
        found
    }

    #[test]
    fn points_land_in_distinct_tiles() {
        let params = TileParameters::new([0.0f32; 2], [100.0; 2], [10.0; 2]);
        let mut grid = TileGrid::new(params);
        grid.fill(&[[5.0, 5.0], [95.0, 95.0]]);
        assert_eq!(vec![0], collect_in_box(&grid, [5.0, 5.0], 8.0));
        assert_eq!(vec![1], collect_in_box(&grid, [95.0, 95.0], 8.0));
        assert_eq!(vec![0, 1], collect_in_box(&grid, [50.0, 50.0], 60.0));
    }

    #[test]
    fn out_of_bounds_clamps_to_border_tile() {
        let params = TileParameters::new([0.0f32; 2], [100.0; 2], [10.0; 2]);
        let mut grid = TileGrid::new(params);
        grid.fill(&[[-5.0, 105.0]]);
        assert_eq!(vec![0], collect_in_box(&grid, [0.0, 100.0], 1.0));
    }

    #[test]
    fn wrapped_dim_searches_across_boundary() {
        let params = TileParameters::new([-PI, -100.0], [PI, 100.0], [0.1, 10.0]).wrap_dim(0);
        let mut grid = TileGrid::new(params);
        grid.fill(&[[PI - 0.01, 0.0]]);
        // A search window just across the -pi boundary must still reach it
        assert_eq!(vec![0], collect_in_box(&grid, [-PI + 0.01, 0.0], 0.1));
    }

    #[test]
    fn oversized_window_covers_whole_wrapped_axis() {
        let params = TileParameters::new([-PI, -100.0], [PI, 100.0], [0.1, 10.0]).wrap_dim(0);
        let mut grid = TileGrid::new(params);
        grid.fill(&[[0.0, 0.0], [3.0, 0.0], [-3.0, 0.0]]);
        assert_eq!(vec![0, 1, 2], collect_in_box(&grid, [0.0, 0.0], 50.0));
    }
}
