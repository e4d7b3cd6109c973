//! T-vertex detection.
//!
//! A T-vertex is a vertex that lies on the interior of an edge it is not an
//! endpoint of. Rendering such a mesh shows hairline cracks along the edge
//! because the two sides tessellate differently.

use nalgebra::Point3;

use crate::edges::EdgeIndex;
use crate::error::TVertexResult;
use crate::mesh::{Mesh, Vertex};

/// Find the first edge `probe` lies on, in edge iteration order.
///
/// Two-stage test, both comparisons strict so points exactly at a threshold
/// never count:
///
/// 1. containment: the squared distance from the probe to the edge midpoint
///    must be below the edge's squared half-length. This bounds the probe
///    to the open segment and doubles as a cheap sphere rejection.
/// 2. collinearity: the unit vector from the probe to endpoint `a`, crossed
///    with the edge direction, must have squared length below
///    `alignment_tol_sq`.
///
/// Edges the probe is an endpoint of are skipped. Returns the slot of the
/// first match so the caller can resolve it and rescan.
pub(crate) fn find_coincident_edge(
    probe: Point3<f64>,
    probe_index: u32,
    index: &EdgeIndex,
    vertices: &[Vertex],
    alignment_tol_sq: f64,
) -> Option<usize> {
    for (slot, edge) in index.iter().enumerate() {
        if edge.has_endpoint(probe_index) {
            continue;
        }
        if (edge.midpoint - probe).norm_squared() >= edge.half_length_sq {
            continue;
        }
        let pa = vertices[edge.a as usize].position;
        let va = (pa - probe).normalize();
        if va.cross(&edge.direction).norm_squared() < alignment_tol_sq {
            return Some(slot);
        }
    }
    None
}

/// Count the vertices currently coincident with an edge they are not part of.
///
/// Builds a scratch edge index and runs detection once per vertex without
/// resolving anything; the mesh is not modified. A successful
/// [`remove_t_vertices`](crate::remove_t_vertices) pass brings this to zero.
///
/// # Errors
///
/// Same boundary errors as [`EdgeIndex::extract`].
///
/// # Example
///
/// ```
/// use mesh_tvertex::{count_t_vertices, Mesh};
///
/// let positions = [
///     0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0, // triangle
///     1.0, 0.0, 0.0, // on the first edge
/// ];
/// let mesh = Mesh::from_indexed(&positions, &[0, 1, 2, 3, 3, 3])?;
/// assert_eq!(count_t_vertices(&mesh, 1e-4)?, 1);
/// # Ok::<(), mesh_tvertex::TVertexError>(())
/// ```
pub fn count_t_vertices(mesh: &Mesh, alignment_tolerance: f64) -> TVertexResult<usize> {
    let index = EdgeIndex::extract(mesh)?;
    let tol_sq = alignment_tolerance * alignment_tolerance;

    let mut count = 0;
    #[allow(clippy::cast_possible_truncation)] // u32 face indices bound the mesh size
    for (vi, vertex) in mesh.vertices.iter().enumerate() {
        if find_coincident_edge(vertex.position, vi as u32, &index, &mesh.vertices, tol_sq)
            .is_some()
        {
            count += 1;
        }
    }
    Ok(count)
}
