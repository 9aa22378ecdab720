use num_traits::Float;

/// Convolutional kernels used to weight a neighbour's energy contribution
/// to a point's local density. A point always contributes its own energy
/// with weight one, regardless of the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvolutionalKernel<T> {
    /// A constant weight for every neighbour within the critical distance.
    Flat(T),
    /// A Gaussian of the neighbour distance: `amplitude * exp(-(dist - mean)^2 / (2 * std^2))`.
    Gaussian { mean: T, std: T, amplitude: T },
    /// An exponential decay of the neighbour distance: `amplitude * exp(-rate * dist)`.
    Exponential { rate: T, amplitude: T },
}

impl<T: Float> ConvolutionalKernel<T> {
    pub(crate) fn calc(&self, dist: T, point_id: usize, neighbour_id: usize) -> T {
        if point_id == neighbour_id {
            return T::one();
        }
        match *self {
            Self::Flat(flat) => flat,
            Self::Gaussian { mean, std, amplitude } => {
                let pull = (dist - mean) / std;
                amplitude * (-(pull * pull) / (T::one() + T::one())).exp()
            }
            Self::Exponential { rate, amplitude } => amplitude * (-rate * dist).exp(),
        }
    }
}

impl<T: Float> Default for ConvolutionalKernel<T> {
    fn default() -> Self {
        Self::Flat(T::from(0.5).unwrap())
    }
}
