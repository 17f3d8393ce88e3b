// Validation utilities for rule tables
// Author: Gabriel Demetrios Lafis

/// Validate bin edges and their labels
pub fn validate_bins(edges: &[f64], labels: &[String]) -> Result<(), String> {
    if edges.len() < 2 {
        return Err(format!("bins need at least two edges, got {}", edges.len()));
    }

    if edges.iter().any(|edge| !edge.is_finite()) {
        return Err("bin edges must be finite".to_string());
    }

    if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(format!("bin edges must be strictly ascending: {:?}", edges));
    }

    if labels.len() != edges.len() - 1 {
        return Err(format!(
            "{} bin edges need {} labels, got {}",
            edges.len(),
            edges.len() - 1,
            labels.len()
        ));
    }

    Ok(())
}

/// Validate that a numeric value is positive
pub fn validate_positive(value: f64, name: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("'{}' must be positive, got {}", name, value))
    }
}

/// Validate that `min..=max` is a well-formed range
pub fn validate_range(min: f64, max: f64, name: &str) -> Result<(), String> {
    if min.is_nan() || max.is_nan() || min > max {
        Err(format!("range for '{}' is empty: [{}, {}]", name, min, max))
    } else {
        Ok(())
    }
}

/// Validate that a string is not empty
pub fn validate_not_empty(value: &str, name: &str) -> Result<(), String> {
    if value.is_empty() {
        Err(format!("'{}' cannot be empty", name))
    } else {
        Ok(())
    }
}
