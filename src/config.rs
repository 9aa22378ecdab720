use crate::geometry::{Projection, TileParameters};
use crate::kernel::ConvolutionalKernel;
use crate::neighbours::NeighbourSearch;
use crate::ClueError;
use num_traits::Float;

// Defaults for parameters
const MIN_LOCAL_DENSITY_DEFAULT: f64 = 0.1;
const CRITICAL_DISTANCE_DEFAULT: f64 = 25.0;
const OUTLIER_DELTA_FACTOR_DEFAULT: f64 = 4.0;
const OUTPUT_COLLECTION_DEFAULT: &str = "CLUEClusters";

/// One input collection to cluster and how its hits map into the
/// clustering space.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig<T, const D: usize> {
    pub(crate) collection: String,
    pub(crate) projection: Projection,
    pub(crate) tiles: Option<TileParameters<T, D>>,
}

impl<T: Float, const D: usize> RegionConfig<T, D> {
    pub fn new(collection: impl Into<String>, projection: Projection) -> Self {
        RegionConfig { collection: collection.into(), projection, tiles: None }
    }

    /// Attaches a tile layout, enabling the tiled neighbour search for
    /// this region.
    pub fn with_tiles(mut self, tiles: TileParameters<T, D>) -> Self {
        self.tiles = Some(tiles);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

/// The immutable run configuration of the clustering stage. Only use the
/// builder if you want to tune parameters or change the region list;
/// otherwise the defaults reproduce the standard barrel plus endcap setup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClueConfig<T, const D: usize> {
    pub(crate) min_local_density: T,
    pub(crate) critical_distance: T,
    pub(crate) outlier_delta_factor: T,
    pub(crate) kernel: ConvolutionalKernel<T>,
    pub(crate) neighbour_search: NeighbourSearch,
    pub(crate) regions: Vec<RegionConfig<T, D>>,
    pub(crate) output_collection: String,
}

/// Builder object to assemble and validate a run configuration.
pub struct ClueConfigBuilder<T, const D: usize> {
    min_local_density: Option<T>,
    critical_distance: Option<T>,
    outlier_delta_factor: Option<T>,
    kernel: Option<ConvolutionalKernel<T>>,
    neighbour_search: Option<NeighbourSearch>,
    regions: Vec<RegionConfig<T, D>>,
    output_collection: Option<String>,
}

impl<T: Float, const D: usize> ClueConfig<T, D> {
    /// The default configuration over the given regions: the standard
    /// scalar parameters (0.1 / 25 / 4), a flat 0.5 kernel and automatic
    /// neighbour search backend selection.
    pub fn default_params(regions: Vec<RegionConfig<T, D>>) -> Result<Self, ClueError> {
        let mut builder = Self::builder();
        builder.regions = regions;
        builder.build()
    }

    /// Enters the builder pattern, allowing custom parameters to be set
    /// using the various setter methods.
    pub fn builder() -> ClueConfigBuilder<T, D> {
        ClueConfigBuilder {
            min_local_density: None,
            critical_distance: None,
            outlier_delta_factor: None,
            kernel: None,
            neighbour_search: None,
            regions: Vec::new(),
            output_collection: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ClueError> {
        if !(D == 2 || D == 3) {
            return Err(ClueError::InvalidParameter(format!(
                "clustering dimensionality must be 2 or 3, not {D}"
            )));
        }
        if !(self.min_local_density > T::zero()) {
            return Err(ClueError::InvalidParameter(String::from(
                "min_local_density must be greater than zero",
            )));
        }
        if !(self.critical_distance > T::zero()) {
            return Err(ClueError::InvalidParameter(String::from(
                "critical_distance must be greater than zero",
            )));
        }
        if self.outlier_delta_factor < T::one() {
            return Err(ClueError::InvalidParameter(String::from(
                "outlier_delta_factor must be at least 1.0",
            )));
        }
        if self.regions.is_empty() {
            return Err(ClueError::InvalidParameter(String::from(
                "at least one region must be configured",
            )));
        }
        for (n, region) in self.regions.iter().enumerate() {
            if self.regions[..n].iter().any(|r| r.collection == region.collection) {
                return Err(ClueError::InvalidParameter(format!(
                    "duplicate region collection: {}",
                    region.collection
                )));
            }
            if let Some(tiles) = &region.tiles {
                tiles.validate(&region.collection)?;
                // Tile binning must wrap exactly where distances wrap,
                // or boundary hits are never seen as neighbours
                let periods = region.projection.periods::<T, D>();
                for dim in 0..D {
                    match periods[dim] {
                        Some(period) => {
                            if !tiles.wrapped[dim] {
                                return Err(ClueError::InvalidParameter(format!(
                                    "tile layout of region {} must wrap periodic axis {dim}",
                                    region.collection
                                )));
                            }
                            let span = tiles.max[dim] - tiles.min[dim];
                            let tolerance = T::from(1e-3).unwrap();
                            if ((span - period) / period).abs() > tolerance {
                                return Err(ClueError::InvalidParameter(format!(
                                    "tile layout of region {} must span the full period \
                                    of axis {dim}",
                                    region.collection
                                )));
                            }
                        }
                        None => {
                            if tiles.wrapped[dim] {
                                return Err(ClueError::InvalidParameter(format!(
                                    "tile layout of region {} wraps axis {dim}, which is \
                                    not periodic",
                                    region.collection
                                )));
                            }
                        }
                    }
                }
            }
            if self.neighbour_search == NeighbourSearch::Tiles && region.tiles.is_none() {
                return Err(ClueError::InvalidParameter(format!(
                    "region {} has no tile layout but the Tiles backend was requested",
                    region.collection
                )));
            }
            if self.neighbour_search == NeighbourSearch::KdTree && region.projection.is_periodic() {
                return Err(ClueError::InvalidParameter(format!(
                    "region {} is periodic; the KdTree backend cannot wrap coordinates",
                    region.collection
                )));
            }
        }
        Ok(())
    }

    pub fn min_local_density(&self) -> T {
        self.min_local_density
    }

    pub fn critical_distance(&self) -> T {
        self.critical_distance
    }

    pub fn outlier_delta_factor(&self) -> T {
        self.outlier_delta_factor
    }

    pub fn regions(&self) -> &[RegionConfig<T, D>] {
        &self.regions
    }

    pub fn output_collection(&self) -> &str {
        &self.output_collection
    }
}

impl<T: Float, const D: usize> ClueConfigBuilder<T, D> {
    /// Sets the local density a point must reach to be promoted to a
    /// cluster seed. Points below it that cannot reach any seed become
    /// outliers. Defaults to 0.1.
    pub fn min_local_density(mut self, min_local_density: T) -> Self {
        self.min_local_density = Some(min_local_density);
        self
    }

    /// Sets the critical distance: the neighbour-search radius used both
    /// for density estimation and for cluster propagation, in the units of
    /// the clustering coordinates. Defaults to 25.
    pub fn critical_distance(mut self, critical_distance: T) -> Self {
        self.critical_distance = Some(critical_distance);
        self
    }

    /// Sets the outlier delta factor: the multiplier on the critical
    /// distance beyond which a point is too far from its nearest
    /// higher-density neighbour to join that neighbour's cluster.
    /// Defaults to 4.
    pub fn outlier_delta_factor(mut self, outlier_delta_factor: T) -> Self {
        self.outlier_delta_factor = Some(outlier_delta_factor);
        self
    }

    /// Sets the convolutional kernel weighting neighbour energies in the
    /// local density. Defaults to a flat kernel of 0.5.
    pub fn kernel(mut self, kernel: ConvolutionalKernel<T>) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Sets the fixed-radius neighbour search backend. Defaults to Auto,
    /// whereby a backend is chosen per region based on its tile layout
    /// and size.
    pub fn neighbour_search(mut self, neighbour_search: NeighbourSearch) -> Self {
        self.neighbour_search = Some(neighbour_search);
        self
    }

    /// Appends a region. Regions are processed, and their clusters
    /// numbered, in the order they are added.
    pub fn region(mut self, region: RegionConfig<T, D>) -> Self {
        self.regions.push(region);
        self
    }

    /// Sets the name of the produced cluster collection.
    /// Defaults to "CLUEClusters".
    pub fn output_collection(mut self, name: impl Into<String>) -> Self {
        self.output_collection = Some(name.into());
        self
    }

    /// Finishes building the configuration, validating every parameter.
    ///
    /// # Returns
    /// * The completed configuration, or `InvalidParameter` if any scalar
    ///   is out of range, no region was added, region collections collide,
    ///   or the requested backend cannot serve a configured region.
    pub fn build(self) -> Result<ClueConfig<T, D>, ClueError> {
        let config = ClueConfig {
            min_local_density: self
                .min_local_density
                .unwrap_or_else(|| T::from(MIN_LOCAL_DENSITY_DEFAULT).unwrap()),
            critical_distance: self
                .critical_distance
                .unwrap_or_else(|| T::from(CRITICAL_DISTANCE_DEFAULT).unwrap()),
            outlier_delta_factor: self
                .outlier_delta_factor
                .unwrap_or_else(|| T::from(OUTLIER_DELTA_FACTOR_DEFAULT).unwrap()),
            kernel: self.kernel.unwrap_or_default(),
            neighbour_search: self.neighbour_search.unwrap_or(NeighbourSearch::Auto),
            regions: self.regions,
            output_collection: self
                .output_collection
                .unwrap_or_else(|| String::from(OUTPUT_COLLECTION_DEFAULT)),
        };
        config.validate()?;
        Ok(config)
    }
}
