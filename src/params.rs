//! T-vertex repair parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for T-vertex repair.
///
/// Defaults suit meshes in normalized or meter-scale units. For very small
/// or very large geometry scale `weld_tolerance` with the mesh; the
/// alignment tolerance is dimensionless and usually fine as-is.
///
/// # Example
///
/// ```
/// use mesh_tvertex::TVertexParams;
///
/// let params = TVertexParams::default().with_alignment_tolerance(1e-5);
/// assert!(params.weld_vertices);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TVertexParams {
    /// Merge near-duplicate vertices before detection.
    ///
    /// T-vertices hidden behind unwelded duplicate vertices defeat
    /// detection, so this is on by default. Welding also drops vertices no
    /// face references.
    pub weld_vertices: bool,

    /// Distance below which two vertices are considered the same.
    pub weld_tolerance: f64,

    /// Angular-deviation proxy for the collinearity test.
    ///
    /// A vertex counts as lying on an edge when the squared cross product
    /// of the two unit vectors (vertex to endpoint, edge direction) is
    /// strictly below this value squared. Roughly the sine of the maximum
    /// accepted deviation angle.
    pub alignment_tolerance: f64,
}

impl Default for TVertexParams {
    fn default() -> Self {
        Self {
            weld_vertices: true,
            weld_tolerance: 1e-5,
            alignment_tolerance: 1e-4, // ~0.006 degrees
        }
    }
}

impl TVertexParams {
    /// Create new parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create parameters for meshes that are already welded.
    ///
    /// Skips the welding stage entirely; every vertex in the buffer acts as
    /// a detection probe, including unreferenced ones.
    #[must_use]
    pub fn without_welding() -> Self {
        Self {
            weld_vertices: false,
            ..Self::default()
        }
    }

    /// Set whether to weld vertices before detection.
    #[must_use]
    pub const fn with_weld_vertices(mut self, weld: bool) -> Self {
        self.weld_vertices = weld;
        self
    }

    /// Set the welding distance tolerance.
    #[must_use]
    pub const fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    /// Set the collinearity tolerance.
    #[must_use]
    pub const fn with_alignment_tolerance(mut self, tolerance: f64) -> Self {
        self.alignment_tolerance = tolerance;
        self
    }

    /// The squared alignment tolerance used by the detector.
    #[inline]
    #[must_use]
    pub fn alignment_tolerance_sq(&self) -> f64 {
        self.alignment_tolerance * self.alignment_tolerance
    }
}
