use num_traits::Float;

/// A single calorimeter hit: a global 3D position, a deposited energy used
/// as the clustering weight, and the layer it was recorded on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaloHit<T> {
    pub position: [T; 3],
    pub energy: T,
    pub layer: u32,
}

impl<T: Float> CaloHit<T> {
    pub fn new(position: [T; 3], energy: T, layer: u32) -> Self {
        CaloHit { position, energy, layer }
    }

    /// Azimuthal angle of the hit position, in radians in `(-pi, pi]`.
    pub(crate) fn phi(&self) -> T {
        self.position[1].atan2(self.position[0])
    }

    /// Pseudorapidity of the hit position.
    pub(crate) fn eta(&self) -> T {
        let r = (self.position[0] * self.position[0] + self.position[1] * self.position[1]).sqrt();
        (self.position[2] / r).asinh()
    }
}

/// The hit collections of one event, keyed by collection name. Insertion
/// order is preserved, though the processing order is always the order in
/// which regions were configured on the stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event<T> {
    collections: Vec<(String, Vec<CaloHit<T>>)>,
}

impl<T: Float> Event<T> {
    pub fn new() -> Self {
        Event { collections: Vec::new() }
    }

    /// Adds a named hit collection, replacing any previous collection of
    /// the same name.
    pub fn add_collection(&mut self, name: impl Into<String>, hits: Vec<CaloHit<T>>) {
        let name = name.into();
        if let Some(existing) = self.collections.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = hits;
        } else {
            self.collections.push((name, hits));
        }
    }

    pub fn collection(&self, name: &str) -> Option<&[CaloHit<T>]> {
        self.collections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, hits)| hits.as_slice())
    }

    pub fn n_hits(&self) -> usize {
        self.collections.iter().map(|(_, hits)| hits.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.n_hits() == 0
    }
}
