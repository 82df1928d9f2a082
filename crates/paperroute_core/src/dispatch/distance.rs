//! Distance metric used to rank deliveries.

use crate::model::coordinate::Coordinate;

/// Returns the Euclidean norm between two coordinates, treating latitude and
/// longitude as plain Cartesian axes.
///
/// This is not a geodesic distance; it only orders nearby points relative
/// to each other. Replacing it changes assignment outcomes.
///
/// Non-finite inputs propagate into the result (`NaN` or infinity).
pub fn euclidean_distance(a: Coordinate, b: Coordinate) -> f64 {
    (a.latitude - b.latitude).hypot(a.longitude - b.longitude)
}
