use crate::config::{ClueConfig, RegionConfig};
use crate::geometry::Projection;
use crate::ClueError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One input collection as named in a run configuration file.
#[derive(Clone, Debug, Deserialize)]
pub struct RegionSpec {
    pub collection: String,
    /// "barrel" or "endcap"
    pub projection: String,
}

/// A run configuration as read from a JSON file, covering the external
/// configuration surface of the stage: the three scalar parameters, the
/// input collections and the output collection name.
#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    pub min_local_density: f32,
    pub critical_distance: f32,
    pub outlier_delta_factor: f32,
    pub regions: Vec<RegionSpec>,
    pub output_collection: Option<String>,
}

pub fn load_run_config(path: &Path) -> Result<RunConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RunConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

impl RunConfig {
    /// Converts the file representation into a validated stage
    /// configuration.
    pub fn to_clue_config<const D: usize>(&self) -> Result<ClueConfig<f32, D>, ClueError> {
        let mut builder = ClueConfig::builder()
            .min_local_density(self.min_local_density)
            .critical_distance(self.critical_distance)
            .outlier_delta_factor(self.outlier_delta_factor);
        for spec in &self.regions {
            let projection = match spec.projection.as_str() {
                "barrel" => Projection::Barrel,
                "endcap" => Projection::Endcap,
                other => {
                    return Err(ClueError::InvalidParameter(format!(
                        "unknown projection {other:?} for collection {}",
                        spec.collection
                    )))
                }
            };
            builder = builder.region(RegionConfig::new(&spec.collection, projection));
        }
        if let Some(name) = &self.output_collection {
            builder = builder.output_collection(name);
        }
        builder.build()
    }
}
