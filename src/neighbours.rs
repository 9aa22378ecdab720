use crate::distance;
use crate::geometry::TileParameters;
use crate::tiles::TileGrid;
use kdtree::distance::squared_euclidean;
use num_traits::Float;

const BRUTE_FORCE_N_POINTS_LIMIT: usize = 2_000;

/// The fixed-radius neighbour search backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighbourSearch {
    /// The stage selects a backend per region: tiles when the region has a
    /// tile layout, otherwise brute force for small collections and a
    /// k-d tree for large ones.
    Auto,
    /// Scans every point of the region for each query.
    BruteForce,
    /// Bins points into a uniform tile grid. Requires a tile layout on
    /// the region; the only backend that supports periodic axes.
    Tiles,
    /// K-dimensional tree. Not available for periodic regions.
    KdTree,
}

pub(crate) enum NeighbourIndex<'a, T: Float, const D: usize> {
    BruteForce {
        coords: &'a [[T; D]],
        periods: [Option<T>; D],
    },
    Tiles {
        grid: TileGrid<T, D>,
        coords: &'a [[T; D]],
        periods: [Option<T>; D],
    },
    KdTree {
        tree: kdtree::KdTree<T, usize, [T; D]>,
    },
}

impl<'a, T: Float, const D: usize> NeighbourIndex<'a, T, D> {
    pub(crate) fn build(
        backend: NeighbourSearch,
        coords: &'a [[T; D]],
        periods: [Option<T>; D],
        tiles: Option<&TileParameters<T, D>>,
    ) -> Self {
        let periodic = periods.iter().any(|p| p.is_some());
        match (backend, tiles, coords.len()) {
            (NeighbourSearch::Tiles, Some(params), _)
            | (NeighbourSearch::Auto, Some(params), _) => {
                let mut grid = TileGrid::new(*params);
                grid.fill(coords);
                NeighbourIndex::Tiles { grid, coords, periods }
            }
            (NeighbourSearch::BruteForce, _, _)
            | (NeighbourSearch::Auto, None, usize::MIN..=BRUTE_FORCE_N_POINTS_LIMIT) => {
                NeighbourIndex::BruteForce { coords, periods }
            }
            (NeighbourSearch::Auto, None, _) if periodic => {
                // No tile layout to wrap with, so fall back to scanning
                NeighbourIndex::BruteForce { coords, periods }
            }
            (NeighbourSearch::KdTree, _, _) | (NeighbourSearch::Auto, None, _) => {
                let mut tree = kdtree::KdTree::with_capacity(D, coords.len().max(1));
                coords
                    .iter()
                    .enumerate()
                    .for_each(|(n, point)| tree.add(*point, n).expect("Failed to add to KdTree"));
                NeighbourIndex::KdTree { tree }
            }
            (NeighbourSearch::Tiles, None, _) => {
                unreachable!("Tiles backend without a tile layout is rejected at configuration")
            }
        }
    }

    /// Visits every point within `radius` of `query` (itself included),
    /// passing the point index and the squared distance.
    pub(crate) fn for_neighbours(&self, query: &[T; D], radius: T, mut visit: impl FnMut(usize, T)) {
        let radius_sq = radius * radius;
        match self {
            NeighbourIndex::BruteForce { coords, periods } => {
                for (j, other) in coords.iter().enumerate() {
                    let d_sq = distance::dist_sq(query, other, periods);
                    if d_sq <= radius_sq {
                        visit(j, d_sq);
                    }
                }
            }
            NeighbourIndex::Tiles { grid, coords, periods } => {
                grid.for_each_in_box(query, radius, |j| {
                    let d_sq = distance::dist_sq(query, &coords[j], periods);
                    if d_sq <= radius_sq {
                        visit(j, d_sq);
                    }
                });
            }
            NeighbourIndex::KdTree { tree } => {
                let neighbours = tree
                    .within(query, radius_sq, &squared_euclidean)
                    .expect("Failed to find neighbours");
                for (d_sq, &j) in neighbours {
                    visit(j, d_sq);
                }
            }
        }
    }
}
