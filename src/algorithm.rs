use crate::clusters::PointStatus;
use crate::kernel::ConvolutionalKernel;
use crate::neighbours::NeighbourIndex;
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The per-point quantities produced by the clustering passes over one
/// region. Indices are region-local.
#[derive(Debug, Clone)]
pub(crate) struct RegionResult<T> {
    pub(crate) labels: Vec<i32>,
    pub(crate) status: Vec<PointStatus>,
    pub(crate) rho: Vec<T>,
    pub(crate) delta: Vec<T>,
    pub(crate) nearest_higher: Vec<Option<usize>>,
    /// Seed point of each region-local cluster id, in promotion order.
    pub(crate) seeds: Vec<usize>,
}

/// Local density: the kernel-weighted energy of all neighbours within the
/// critical distance. A point contributes its own energy with weight one.
pub(crate) fn calculate_local_density<T: Float, const D: usize>(
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    weights: &[T],
    kernel: &ConvolutionalKernel<T>,
    dc: T,
) -> Vec<T> {
    (0..coords.len())
        .map(|i| density_of(i, index, coords, weights, kernel, dc))
        .collect()
}

#[cfg(feature = "parallel")]
pub(crate) fn calculate_local_density_par<T, const D: usize>(
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    weights: &[T],
    kernel: &ConvolutionalKernel<T>,
    dc: T,
) -> Vec<T>
where
    T: Float + Send + Sync,
{
    (0..coords.len())
        .into_par_iter()
        .map(|i| density_of(i, index, coords, weights, kernel, dc))
        .collect()
}

fn density_of<T: Float, const D: usize>(
    i: usize,
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    weights: &[T],
    kernel: &ConvolutionalKernel<T>,
    dc: T,
) -> T {
    let mut rho = T::zero();
    index.for_neighbours(&coords[i], dc, |j, dist_sq| {
        rho = rho + kernel.calc(dist_sq.sqrt(), i, j) * weights[j];
    });
    rho
}

/// Nearest higher: for each point, the closest neighbour within
/// `dm = outlier_delta_factor * dc` whose density is strictly higher.
/// Density ties break towards the larger point index, which keeps the
/// follower graph acyclic. Returns the separation `delta` (infinity when
/// no higher neighbour is in range) and the neighbour index.
pub(crate) fn calculate_nearest_higher<T: Float, const D: usize>(
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    rho: &[T],
    dm: T,
) -> (Vec<T>, Vec<Option<usize>>) {
    (0..coords.len())
        .map(|i| nearest_higher_of(i, index, coords, rho, dm))
        .unzip()
}

#[cfg(feature = "parallel")]
pub(crate) fn calculate_nearest_higher_par<T, const D: usize>(
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    rho: &[T],
    dm: T,
) -> (Vec<T>, Vec<Option<usize>>)
where
    T: Float + Send + Sync,
{
    (0..coords.len())
        .into_par_iter()
        .map(|i| nearest_higher_of(i, index, coords, rho, dm))
        .unzip()
}

fn nearest_higher_of<T: Float, const D: usize>(
    i: usize,
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    rho: &[T],
    dm: T,
) -> (T, Option<usize>) {
    let mut delta_sq = T::infinity();
    let mut nearest_higher = None;
    index.for_neighbours(&coords[i], dm, |j, dist_sq| {
        let found_higher =
            rho[j] > rho[i] || (rho[j] == rho[i] && rho[j] > T::zero() && j > i);
        if found_higher && dist_sq < delta_sq {
            delta_sq = dist_sq;
            nearest_higher = Some(j);
        }
    });
    (delta_sq.sqrt(), nearest_higher)
}

/// Promotes each point to seed, outlier or follower:
/// * seed if its nearest higher is beyond `dc` and its density reaches
///   `rho_c`;
/// * outlier if its nearest higher is beyond `dm` and its density is
///   below `rho_c`;
/// * follower of its nearest higher otherwise.
///
/// Seeds are numbered in point order; the returned follower lists drive
/// the cluster assignment.
pub(crate) fn find_clusters<T: Float>(
    rho: &[T],
    delta: &[T],
    nearest_higher: &[Option<usize>],
    dc: T,
    dm: T,
    rho_c: T,
) -> (Vec<PointStatus>, Vec<usize>, Vec<Vec<usize>>) {
    let n_points = rho.len();
    let mut status = vec![PointStatus::Outlier; n_points];
    let mut seeds = Vec::new();
    let mut followers = vec![Vec::new(); n_points];

    for i in 0..n_points {
        let is_seed = delta[i] > dc && rho[i] >= rho_c;
        let is_outlier = delta[i] > dm && rho[i] < rho_c;
        if is_seed {
            status[i] = PointStatus::Seed;
            seeds.push(i);
        } else if !is_outlier {
            // A non-outlier below the seed cut always has a higher in range
            if let Some(higher) = nearest_higher[i] {
                status[i] = PointStatus::Follower;
                followers[higher].push(i);
            }
        }
    }
    (status, seeds, followers)
}

/// Passes each seed's cluster id depth first through its chain of
/// followers. Points not reached from any seed keep the outlier label.
pub(crate) fn assign_clusters(
    n_points: usize,
    seeds: &[usize],
    followers: &[Vec<usize>],
) -> Vec<i32> {
    let mut labels = vec![-1; n_points];
    let mut stack = Vec::new();

    for (cluster_id, &seed) in seeds.iter().enumerate() {
        labels[seed] = cluster_id as i32;
        stack.push(seed);
        while let Some(point) = stack.pop() {
            for &follower in &followers[point] {
                labels[follower] = labels[point];
                stack.push(follower);
            }
        }
    }
    labels
}

pub(crate) fn run_region<T: Float, const D: usize>(
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    weights: &[T],
    kernel: &ConvolutionalKernel<T>,
    dc: T,
    dm: T,
    rho_c: T,
) -> RegionResult<T> {
    let rho = calculate_local_density(index, coords, weights, kernel, dc);
    let (delta, nearest_higher) = calculate_nearest_higher(index, coords, &rho, dm);
    finish_region(coords.len(), rho, delta, nearest_higher, dc, dm, rho_c)
}

#[cfg(feature = "parallel")]
pub(crate) fn run_region_par<T, const D: usize>(
    index: &NeighbourIndex<T, D>,
    coords: &[[T; D]],
    weights: &[T],
    kernel: &ConvolutionalKernel<T>,
    dc: T,
    dm: T,
    rho_c: T,
) -> RegionResult<T>
where
    T: Float + Send + Sync,
{
    let rho = calculate_local_density_par(index, coords, weights, kernel, dc);
    let (delta, nearest_higher) = calculate_nearest_higher_par(index, coords, &rho, dm);
    finish_region(coords.len(), rho, delta, nearest_higher, dc, dm, rho_c)
}

fn finish_region<T: Float>(
    n_points: usize,
    rho: Vec<T>,
    delta: Vec<T>,
    nearest_higher: Vec<Option<usize>>,
    dc: T,
    dm: T,
    rho_c: T,
) -> RegionResult<T> {
    let (status, seeds, followers) = find_clusters(&rho, &delta, &nearest_higher, dc, dm, rho_c);
    let labels = assign_clusters(n_points, &seeds, &followers);
    RegionResult { labels, status, rho, delta, nearest_higher, seeds }
}
