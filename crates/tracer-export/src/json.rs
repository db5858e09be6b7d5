//! JSON export: clusters as an array of arrays of `[x, y]` pairs.
//!
//! ```json
//! [[[0,0],[1,1]],[[4,2]]]
//! ```

use tracer_pipeline::Cluster;

use crate::ExportError;

/// Serialize clusters, preserving cluster order and point order.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn clusters_to_json(clusters: &[Cluster]) -> Result<String, ExportError> {
    Ok(serde_json::to_string(clusters)?)
}

/// Parse clusters written by [`clusters_to_json`].
///
/// # Errors
///
/// Returns [`ExportError::Json`] if the input is not an array of arrays
/// of non-negative integer pairs.
pub fn clusters_from_json(json: &str) -> Result<Vec<Cluster>, ExportError> {
    Ok(serde_json::from_str(json)?)
}
