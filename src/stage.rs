use crate::algorithm::{self, RegionResult};
use crate::clusters::{self, ClueOutput, ClusterAssignment};
use crate::config::{ClueConfig, RegionConfig};
use crate::neighbours::NeighbourIndex;
use crate::point::{CaloHit, Event};
use crate::ClueError;
use log::debug;
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The CLUE density clustering stage. Generic over floating point numeric
/// types and over the dimensionality of the clustering space (2 or 3).
///
/// The stage is constructed once per run from a validated configuration
/// and holds no other state, so processing an event is a pure function of
/// the event and the configuration: calls are idempotent and safe to make
/// concurrently for independent events.
#[derive(Debug, Clone, PartialEq)]
pub struct ClueStage<T, const D: usize> {
    config: ClueConfig<T, D>,
}

struct RegionInput<'a, T, const D: usize> {
    region: &'a RegionConfig<T, D>,
    start: usize,
    coords: Vec<[T; D]>,
    weights: Vec<T>,
}

impl<T: Float + Send + Sync, const D: usize> ClueStage<T, D> {
    /// Creates a clustering stage for one run.
    ///
    /// # Parameters
    /// * `config` - the run configuration, as produced by
    ///              `ClueConfig::builder`.
    ///
    /// # Returns
    /// * The stage, or `InvalidParameter` if the configuration does not
    ///   validate.
    pub fn new(config: ClueConfig<T, D>) -> Result<Self, ClueError> {
        config.validate()?;
        debug!(
            "clue stage configured: {} regions, output collection {}",
            config.regions().len(),
            config.output_collection()
        );
        Ok(ClueStage { config })
    }

    pub fn config(&self) -> &ClueConfig<T, D> {
        &self.config
    }

    /// Clusters the hits of one event.
    ///
    /// Each configured region is clustered independently; cluster ids are
    /// then made unique across the event by offsetting them in region
    /// configuration order, so the output is reproducible between runs.
    ///
    /// # Parameters
    /// * `event` - the hit collections of the event. Every configured
    ///             collection must be present; empty collections are
    ///             allowed and skipped.
    ///
    /// # Returns
    /// * The per-point assignment and the cluster collection, or an error
    ///   if a configured collection is missing, a hit is non-finite, or
    ///   the event holds no hits at all. No partial output is produced.
    #[cfg(feature = "serial")]
    pub fn process(&self, event: &Event<T>) -> Result<ClueOutput<T>, ClueError> {
        let (hits, inputs) = self.prepare(event)?;
        let results = inputs
            .iter()
            .map(|input| self.run_region(input))
            .collect::<Vec<_>>();
        Ok(self.merge(&hits, &inputs, results))
    }

    /// As [`ClueStage::process`], running the per-region passes and the
    /// region loop on the rayon thread pool. The output is identical to
    /// the serial path.
    #[cfg(feature = "parallel")]
    pub fn process_par(&self, event: &Event<T>) -> Result<ClueOutput<T>, ClueError> {
        let (hits, inputs) = self.prepare(event)?;
        let results = inputs
            .par_iter()
            .map(|input| self.run_region_par(input))
            .collect::<Vec<_>>();
        Ok(self.merge(&hits, &inputs, results))
    }

    fn prepare<'a>(
        &'a self,
        event: &Event<T>,
    ) -> Result<(Vec<CaloHit<T>>, Vec<RegionInput<'a, T, D>>), ClueError> {
        let mut hits = Vec::new();
        let mut inputs = Vec::with_capacity(self.config.regions().len());

        for region in self.config.regions() {
            let collection = event
                .collection(&region.collection)
                .ok_or_else(|| ClueError::MissingCollection(region.collection.clone()))?;
            Self::validate_hits(&region.collection, collection)?;

            let coords = collection
                .iter()
                .map(|hit| region.projection.project(hit))
                .collect::<Vec<[T; D]>>();
            let weights = collection.iter().map(|hit| hit.energy).collect();

            inputs.push(RegionInput { region, start: hits.len(), coords, weights });
            hits.extend_from_slice(collection);
        }

        if hits.is_empty() {
            return Err(ClueError::EmptyInput);
        }
        Ok((hits, inputs))
    }

    fn validate_hits(collection: &str, hits: &[CaloHit<T>]) -> Result<(), ClueError> {
        for (n, hit) in hits.iter().enumerate() {
            let finite = hit.position.iter().all(|coord| coord.is_finite()) && hit.energy.is_finite();
            if !finite {
                return Err(ClueError::NonFiniteCoordinate(format!(
                    "hit {n} of collection {collection} contains non-finite element(s)"
                )));
            }
        }
        Ok(())
    }

    #[cfg(feature = "serial")]
    fn run_region(&self, input: &RegionInput<T, D>) -> RegionResult<T> {
        if input.coords.is_empty() {
            return Self::empty_region();
        }
        let index = self.region_index(input);
        algorithm::run_region(
            &index,
            &input.coords,
            &input.weights,
            &self.config.kernel,
            self.config.critical_distance,
            self.outlier_distance(),
            self.config.min_local_density,
        )
    }

    #[cfg(feature = "parallel")]
    fn run_region_par(&self, input: &RegionInput<T, D>) -> RegionResult<T> {
        if input.coords.is_empty() {
            return Self::empty_region();
        }
        let index = self.region_index(input);
        algorithm::run_region_par(
            &index,
            &input.coords,
            &input.weights,
            &self.config.kernel,
            self.config.critical_distance,
            self.outlier_distance(),
            self.config.min_local_density,
        )
    }

    fn region_index<'a>(&self, input: &'a RegionInput<T, D>) -> NeighbourIndex<'a, T, D> {
        NeighbourIndex::build(
            self.config.neighbour_search,
            &input.coords,
            input.region.projection.periods(),
            input.region.tiles.as_ref(),
        )
    }

    fn outlier_distance(&self) -> T {
        self.config.outlier_delta_factor * self.config.critical_distance
    }

    fn empty_region() -> RegionResult<T> {
        RegionResult {
            labels: Vec::new(),
            status: Vec::new(),
            rho: Vec::new(),
            delta: Vec::new(),
            nearest_higher: Vec::new(),
            seeds: Vec::new(),
        }
    }

    fn merge(
        &self,
        hits: &[CaloHit<T>],
        inputs: &[RegionInput<T, D>],
        results: Vec<RegionResult<T>>,
    ) -> ClueOutput<T> {
        let n_points = hits.len();
        let mut assignment = ClusterAssignment {
            labels: Vec::with_capacity(n_points),
            status: Vec::with_capacity(n_points),
            rho: Vec::with_capacity(n_points),
            delta: Vec::with_capacity(n_points),
            nearest_higher: Vec::with_capacity(n_points),
            regions: Vec::with_capacity(inputs.len()),
        };
        let mut seeds = Vec::new();
        let mut seed_regions = Vec::new();
        let mut cluster_offset = 0;

        for (input, result) in inputs.iter().zip(results) {
            let name = &input.region.collection;
            let start = input.start;
            debug!(
                "collection {name}: {} hits, {} clusters",
                result.labels.len(),
                result.seeds.len()
            );

            assignment
                .regions
                .push((name.clone(), start..start + result.labels.len()));
            assignment.labels.extend(
                result
                    .labels
                    .iter()
                    .map(|&label| if label < 0 { -1 } else { label + cluster_offset }),
            );
            assignment.status.extend(result.status);
            assignment.rho.extend(result.rho);
            assignment.delta.extend(result.delta);
            assignment.nearest_higher.extend(
                result
                    .nearest_higher
                    .iter()
                    .map(|higher| higher.map(|j| j + start)),
            );
            for &seed in &result.seeds {
                seeds.push(start + seed);
                seed_regions.push(name.clone());
            }
            cluster_offset += result.seeds.len() as i32;
        }

        let clusters = clusters::build_cluster_summaries(
            self.config.output_collection(),
            hits,
            &assignment.labels,
            &seeds,
            &seed_regions,
        );
        ClueOutput { assignment, clusters }
    }
}
