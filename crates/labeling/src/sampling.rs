use crate::LabelError;
use rand::Rng;

/// Number of points a preview at `rate` labels out of `n`: `round(rate * n)`.
pub fn preview_sample_size(n: usize, rate: f64) -> Result<usize, LabelError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(LabelError::InvalidSampleRate(rate));
    }
    Ok(((rate * n as f64).round() as usize).min(n))
}

/// Draw `round(rate * n)` distinct indices from `[0, n)` uniformly, without
/// replacement.
///
/// The result is sorted ascending so that a subset keeps the relative order
/// of the cloud it was drawn from.
pub fn sample_indices<R: Rng + ?Sized>(
    n: usize,
    rate: f64,
    rng: &mut R,
) -> Result<Vec<usize>, LabelError> {
    let amount = preview_sample_size(n, rate)?;
    let mut indices = rand::seq::index::sample(rng, n, amount).into_vec();
    indices.sort_unstable();
    Ok(indices)
}
