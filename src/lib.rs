//! CLUE ("CLUstering of Energy") density-based clustering of calorimeter
//! hits in Rust. Generic over floating point numeric types and over the
//! dimensionality of the clustering space.
//!
//! CLUE groups energy deposits into clusters by local energy density.
//! The main traits of the algorithm are that:
//!  1. It needs no assumption on the number of clusters: every local
//!     density maximum that is sufficiently separated from denser points
//!     becomes a cluster seed, and membership propagates outward from the
//!     seeds through chains of lower-density neighbours;
//!  2. It does not force every hit into a cluster. Hits below the density
//!     threshold that cannot reach any seed are labelled outliers (-1),
//!     which is essential for noisy detector data; and
//!  3. All neighbour queries are fixed-radius searches, so the whole pass
//!     runs on a uniform tile grid in time roughly linear in the number
//!     of hits.
//!
//! Hit collections are clustered per detector region (barrel regions in
//! `(phi, z)`, endcap regions in `(x, y)`, optionally with a third axis),
//! and the per-region results are merged into one event-wide cluster
//! collection with contiguous ids.
//!
//! # Examples
//! ```
//!use clue::{CaloHit, ClueConfig, ClueStage, Event, Projection, RegionConfig};
//!
//!let config = ClueConfig::default_params(vec![
//!    RegionConfig::new("ECALEndcap", Projection::Endcap),
//!])
//!.unwrap();
//!let stage = ClueStage::<f32, 2>::new(config).unwrap();
//!
//!let mut event = Event::new();
//!event.add_collection(
//!    "ECALEndcap",
//!    vec![
//!        CaloHit::new([0.0, 0.0, 0.0], 1.0, 0),
//!        CaloHit::new([5.0, 0.0, 0.0], 1.0, 0),
//!        CaloHit::new([0.0, 5.0, 0.0], 1.0, 0),
//!        CaloHit::new([5.0, 5.0, 0.0], 1.0, 0),
//!        CaloHit::new([2.5, 2.5, 0.0], 1.0, 0),
//!        CaloHit::new([1000.0, 1000.0, 0.0], 0.05, 0),
//!    ],
//!);
//!let output = stage.process(&event).unwrap();
//!assert_eq!(&[0, 0, 0, 0, 0, -1], output.assignment.labels());
//!assert_eq!(1, output.clusters.len());
//! ```
//!
//! # References
//! * [Rovere, M.; Chen, Z.; Di Pilato, A.; Pantaleo, F.; Seez, C. CLUE: A Fast Parallel Clustering Algorithm for High Granularity Calorimeters in High-Energy Physics.](https://doi.org/10.3389/fdata.2020.591315)

pub use crate::clusters::{
    ClueOutput, ClusterAssignment, ClusterCollection, ClusterSummary, PointStatus,
};
pub use crate::config::{ClueConfig, ClueConfigBuilder, RegionConfig};
pub use crate::error::ClueError;
pub use crate::geometry::{Projection, TileParameters};
pub use crate::kernel::ConvolutionalKernel;
pub use crate::neighbours::NeighbourSearch;
pub use crate::point::{CaloHit, Event};
pub use crate::run_config::{load_run_config, RegionSpec, RunConfig};
pub use crate::stage::ClueStage;

mod algorithm;
mod clusters;
mod config;
mod distance;
mod error;
mod geometry;
mod kernel;
mod neighbours;
mod point;
mod run_config;
mod stage;
mod tiles;
