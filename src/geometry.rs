use crate::point::CaloHit;
use num_traits::Float;

/// How hits of a region are projected into the clustering space.
///
/// Barrel regions cluster in `(phi, z)` (plus `eta` in three dimensions),
/// where the azimuthal angle is periodic. Endcap regions cluster in the
/// transverse plane `(x, y)` (plus `z` in three dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Barrel,
    Endcap,
}

impl Projection {
    pub(crate) fn project<T: Float, const D: usize>(&self, hit: &CaloHit<T>) -> [T; D] {
        let mut coords = [T::zero(); D];
        match self {
            Projection::Barrel => {
                coords[0] = hit.phi();
                coords[1] = hit.position[2];
                if D == 3 {
                    coords[2] = hit.eta();
                }
            }
            Projection::Endcap => {
                coords[0] = hit.position[0];
                coords[1] = hit.position[1];
                if D == 3 {
                    coords[2] = hit.position[2];
                }
            }
        }
        coords
    }

    /// Period of each clustering axis, or None for non-periodic axes.
    pub(crate) fn periods<T: Float, const D: usize>(&self) -> [Option<T>; D] {
        let mut periods = [None; D];
        if let Projection::Barrel = self {
            periods[0] = Some(T::from(2.0 * std::f64::consts::PI).unwrap());
        }
        periods
    }

    pub(crate) fn is_periodic(&self) -> bool {
        matches!(self, Projection::Barrel)
    }
}

/// Geometry of the uniform tile grid used for neighbour search: bounds,
/// tile sizes and wrap flags per clustering axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileParameters<T, const D: usize> {
    pub min: [T; D],
    pub max: [T; D],
    pub tile_size: [T; D],
    pub wrapped: [bool; D],
}

impl<T: Float, const D: usize> TileParameters<T, D> {
    pub fn new(min: [T; D], max: [T; D], tile_size: [T; D]) -> Self {
        TileParameters { min, max, tile_size, wrapped: [false; D] }
    }

    /// Marks one axis as periodic: tile lookups on it wrap around instead
    /// of clamping at the bounds.
    pub fn wrap_dim(mut self, dim: usize) -> Self {
        self.wrapped[dim] = true;
        self
    }

    pub(crate) fn validate(&self, region: &str) -> Result<(), crate::ClueError> {
        for dim in 0..D {
            if !(self.tile_size[dim] > T::zero()) {
                return Err(crate::ClueError::InvalidParameter(format!(
                    "tile_size of region {region} must be positive in every dimension"
                )));
            }
            if !(self.max[dim] > self.min[dim]) {
                return Err(crate::ClueError::InvalidParameter(format!(
                    "tile bounds of region {region} must satisfy min < max in every dimension"
                )));
            }
        }
        Ok(())
    }
}

macro_rules! barrel_tile_preset {
    ($name:ident, $z_half:expr, $phi_size:expr, $z_size:expr) => {
        /// Tile layout for this detector's barrel, clustering in `(phi, z)`.
        pub fn $name() -> Self {
            let pi = T::from(std::f64::consts::PI).unwrap();
            TileParameters::new(
                [-pi, T::from(-$z_half).unwrap()],
                [pi, T::from($z_half).unwrap()],
                [T::from($phi_size).unwrap(), T::from($z_size).unwrap()],
            )
            .wrap_dim(0)
        }
    };
}

macro_rules! endcap_tile_preset {
    ($name:ident, $half:expr, $size:expr) => {
        /// Tile layout for this detector's endcap, clustering in `(x, y)`.
        pub fn $name() -> Self {
            TileParameters::new(
                [T::from(-$half).unwrap(); 2],
                [T::from($half).unwrap(); 2],
                [T::from($size).unwrap(); 2],
            )
        }
    };
}

impl<T: Float> TileParameters<T, 2> {
    barrel_tile_preset!(cld_barrel, 2210.0, 0.01, 15.0);
    endcap_tile_preset!(cld_endcap, 2455.0, 15.0);
    barrel_tile_preset!(clicdet_barrel, 2210.0, 0.15, 35.0);
    endcap_tile_preset!(clicdet_endcap, 1701.0, 27.0);
    barrel_tile_preset!(lar_barrel, 3110.0, 0.15, 50.0);
}
