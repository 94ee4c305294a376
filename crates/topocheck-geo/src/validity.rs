//! Line string validity: finite coordinates, at least two distinct
//! positions, and simplicity.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// First error as a one-line summary
    pub fn summary(&self) -> Option<String> {
        self.errors.first().map(|e| match self.errors.len() {
            1 => format!("{}: {}", e.location, e.reason),
            n => format!("{}: {} (+{} more)", e.location, e.reason, n - 1),
        })
    }
}

/// Validate a line string.
///
/// A closed line (first == last) may touch itself only at that shared
/// position. Any other contact between segments, including a segment that
/// doubles back over its predecessor, makes the line invalid.
pub fn validate_linestring(linestring: &LineString<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();

    for (i, coord) in linestring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            result
                .add_error(format!("LineString[{}]", i), "Coordinates must be finite".to_string());
        }
    }
    if !result.is_valid {
        return result;
    }

    let mut coords: Vec<Coord<f64>> = linestring.0.clone();
    coords.dedup();

    if coords.len() < 2 {
        result.add_error(
            "LineString".to_string(),
            format!("LineString must have at least 2 distinct points, found {}", coords.len()),
        );
        return result;
    }

    let segments: Vec<Line<f64>> = coords.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let closed = coords.first() == coords.last();
    let last = segments.len() - 1;

    for k in 0..segments.len() {
        for l in (k + 1)..segments.len() {
            let adjacent = l == k + 1 || (closed && k == 0 && l == last);

            match line_intersection(segments[k], segments[l]) {
                None => {}
                // Neighbours meet at their shared vertex and nowhere else
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    result.add_error(
                        format!("LineString segments {} and {}", k, l),
                        format!("Self-intersection at ({}, {})", intersection.x, intersection.y),
                    );
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    result.add_error(
                        format!("LineString segments {} and {}", k, l),
                        format!(
                            "Overlapping segments between ({}, {}) and ({}, {})",
                            intersection.start.x,
                            intersection.start.y,
                            intersection.end.x,
                            intersection.end.y
                        ),
                    );
                }
            }
        }
    }

    result
}
