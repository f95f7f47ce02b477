//! Set similarity between two readers' liked series.

use data_loader::SeriesId;
use std::collections::HashSet;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`, in `[0, 1]`.
///
/// Two empty sets carry no signal and score 0.0, not 1.0.
pub fn jaccard(a: &HashSet<SeriesId>, b: &HashSet<SeriesId>) -> f64 {
    // Iterate the smaller set for the intersection
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|id| large.contains(id)).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
