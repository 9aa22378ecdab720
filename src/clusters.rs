use crate::point::CaloHit;
use num_traits::Float;
use std::ops::Range;

// Minimum log-energy fraction for a hit to pull on the cluster position
const POSITION_LOG_WEIGHT_CUT: f64 = 2.9;

/// The role the clustering passes assigned to a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    /// A local density maximum that became a cluster centre.
    Seed,
    /// A point attached to the cluster of its nearest higher-density
    /// neighbour.
    Follower,
    /// A point not density-reachable from any seed; labelled -1.
    Outlier,
}

/// The per-point clustering outcome for one event, indexed over all hits
/// of the configured regions concatenated in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment<T> {
    pub(crate) labels: Vec<i32>,
    pub(crate) status: Vec<PointStatus>,
    pub(crate) rho: Vec<T>,
    pub(crate) delta: Vec<T>,
    pub(crate) nearest_higher: Vec<Option<usize>>,
    pub(crate) regions: Vec<(String, Range<usize>)>,
}

impl<T: Float> ClusterAssignment<T> {
    /// Cluster label per point: a contiguous non-negative cluster id, or
    /// -1 for outliers.
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    pub fn status(&self) -> &[PointStatus] {
        &self.status
    }

    /// Local density per point.
    pub fn rho(&self) -> &[T] {
        &self.rho
    }

    /// Distance to the nearest higher-density neighbour per point, or
    /// infinity when none was in range.
    pub fn delta(&self) -> &[T] {
        &self.delta
    }

    /// Event-wide index of the nearest higher-density neighbour. Always
    /// a point of the same region.
    pub fn nearest_higher(&self) -> &[Option<usize>] {
        &self.nearest_higher
    }

    /// The slice of event-wide point indices a collection occupies.
    pub fn region_range(&self, collection: &str) -> Option<Range<usize>> {
        self.regions
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, range)| range.clone())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Summary of one produced cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary<T> {
    pub id: i32,
    /// Collection name of the region the cluster was found in.
    pub region: String,
    /// Event-wide index of the seed hit.
    pub seed_index: usize,
    /// Global position of the seed hit.
    pub seed_position: [T; 3],
    /// Log-energy-weighted barycentre of the member hits, in global
    /// coordinates.
    pub position: [T; 3],
    /// Summed energy of the member hits.
    pub energy: T,
    pub n_hits: usize,
}

/// The named, ordered cluster collection of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCollection<T> {
    pub(crate) name: String,
    pub(crate) clusters: Vec<ClusterSummary<T>>,
}

impl<T: Float> ClusterCollection<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clusters(&self) -> &[ClusterSummary<T>] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// The full output of processing one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ClueOutput<T> {
    pub assignment: ClusterAssignment<T>,
    pub clusters: ClusterCollection<T>,
}

/// Builds the summary of every cluster id present in `labels`. Hits,
/// labels and seed/region metadata are all event-wide; ids are assumed
/// contiguous from zero.
pub(crate) fn build_cluster_summaries<T: Float>(
    name: &str,
    hits: &[CaloHit<T>],
    labels: &[i32],
    seeds: &[usize],
    seed_regions: &[String],
) -> ClusterCollection<T> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); seeds.len()];
    for (idx, &label) in labels.iter().enumerate() {
        if label >= 0 {
            members[label as usize].push(idx);
        }
    }

    let clusters = members
        .iter()
        .enumerate()
        .map(|(id, member_indices)| {
            let energy = member_indices
                .iter()
                .map(|&idx| hits[idx].energy)
                .fold(T::zero(), std::ops::Add::add);
            ClusterSummary {
                id: id as i32,
                region: seed_regions[id].clone(),
                seed_index: seeds[id],
                seed_position: hits[seeds[id]].position,
                position: calculate_position(hits, member_indices, energy),
                energy,
                n_hits: member_indices.len(),
            }
        })
        .collect();

    ClusterCollection { name: String::from(name), clusters }
}

/// Log-energy-weighted barycentre: hits pull on the position with weight
/// `max(w0 + ln(E_i / E_tot), 0)`, so hits below a fraction of the
/// cluster energy do not contribute. Falls back to the energy-weighted
/// mean when every hit falls below the cut.
fn calculate_position<T: Float>(hits: &[CaloHit<T>], members: &[usize], total_energy: T) -> [T; 3] {
    let w0 = T::from(POSITION_LOG_WEIGHT_CUT).unwrap();
    let mut position = [T::zero(); 3];
    let mut total_weight = T::zero();

    for &idx in members {
        let weight = (w0 + (hits[idx].energy / total_energy).ln()).max(T::zero());
        for dim in 0..3 {
            position[dim] = position[dim] + hits[idx].position[dim] * weight;
        }
        total_weight = total_weight + weight;
    }

    if total_weight == T::zero() {
        for &idx in members {
            for dim in 0..3 {
                position[dim] = position[dim] + hits[idx].position[dim] * hits[idx].energy;
            }
        }
        total_weight = total_energy;
    }

    for dim in 0..3 {
        position[dim] = position[dim] / total_weight;
    }
    position
}
