use num_traits::Float;

/// Difference between two coordinates on one axis, taking the shortest way
/// around for periodic axes (e.g. the azimuthal angle in a barrel).
pub(crate) fn coord_delta<T: Float>(a: T, b: T, period: Option<T>) -> T {
    let raw = a - b;
    match period {
        None => raw,
        Some(period) => {
            let half = period / (T::one() + T::one());
            let mut wrapped = raw;
            while wrapped > half {
                wrapped = wrapped - period;
            }
            while wrapped < -half {
                wrapped = wrapped + period;
            }
            wrapped
        }
    }
}

pub(crate) fn dist_sq<T: Float, const D: usize>(
    a: &[T; D],
    b: &[T; D],
    periods: &[Option<T>; D],
) -> T {
    let mut acc = T::zero();
    for dim in 0..D {
        let delta = coord_delta(a[dim], b[dim], periods[dim]);
        acc = acc + delta * delta;
    }
    acc
}
