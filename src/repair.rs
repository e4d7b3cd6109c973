//! The T-vertex repair pipeline.

use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::detect::find_coincident_edge;
use crate::edges::EdgeIndex;
use crate::error::TVertexResult;
use crate::mesh::Mesh;
use crate::params::TVertexParams;
use crate::split::resolve_coincident_edge;
use crate::weld::{remove_unreferenced_vertices, weld_vertices};

/// Find and remove every T-vertex in a mesh.
///
/// Pipeline, in order:
///
/// 1. Validate face indices.
/// 2. Weld near-duplicate vertices and drop unreferenced ones (skipped when
///    [`TVertexParams::weld_vertices`] is off).
/// 3. Extract the edge topology, then for each vertex in index order:
///    while it lies on an edge it is not part of, remove that edge and
///    split the faces registered on it at the vertex.
/// 4. If anything was split, rebuild the face list from the surviving
///    topology.
///
/// When no coincidence is found the face list is returned untouched.
/// Rebuilding drops degenerate faces (they carry edges but no face), so a
/// mesh that needed repair comes back without them; one that did not keeps
/// them as-is.
///
/// # Errors
///
/// Boundary errors reject the mesh before step 2; topology errors abort
/// step 3. Splits are staged on a scratch index, so on error the mesh
/// keeps its pre-repair face list (welding, a complete repair of its own,
/// stays applied).
///
/// # Example
///
/// ```
/// use mesh_tvertex::{remove_t_vertices, Mesh, TVertexParams};
///
/// // Two triangles sharing a diagonal, plus a vertex sitting on it.
/// let positions = [
///     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
///     0.5, 0.5, 0.0,
/// ];
/// let mut mesh = Mesh::from_indexed(&positions, &[0, 1, 2, 0, 2, 3, 4, 4, 4])?;
///
/// let summary = remove_t_vertices(&mut mesh, &TVertexParams::default())?;
/// assert_eq!(summary.t_vertices_removed, 1);
/// assert_eq!(mesh.face_count(), 4);
/// # Ok::<(), mesh_tvertex::TVertexError>(())
/// ```
pub fn remove_t_vertices(
    mesh: &mut Mesh,
    params: &TVertexParams,
) -> TVertexResult<TVertexSummary> {
    mesh.validate_indices()?;

    let initial_vertices = mesh.vertex_count();
    let faces_before = mesh.face_count();

    let (vertices_welded, unreferenced_removed) = if params.weld_vertices {
        let welded = weld_vertices(mesh, params.weld_tolerance);
        let unreferenced = remove_unreferenced_vertices(mesh);
        debug!(
            "Welding pass merged {} vertices, dropped {} unreferenced",
            welded, unreferenced
        );
        (welded, unreferenced)
    } else {
        (0, 0)
    };

    let mut index = EdgeIndex::extract(mesh)?;
    let tol_sq = params.alignment_tolerance_sq();

    let mut t_vertices_removed = 0;
    #[allow(clippy::cast_possible_truncation)] // u32 face indices bound the mesh size
    for vi in 0..mesh.vertices.len() {
        let probe = mesh.vertices[vi].position;
        let vi = vi as u32;
        while let Some(slot) = find_coincident_edge(probe, vi, &index, &mesh.vertices, tol_sq) {
            resolve_coincident_edge(vi, slot, &mut index, &mesh.vertices)?;
            t_vertices_removed += 1;
        }
    }

    if t_vertices_removed > 0 {
        mesh.faces = index.surviving_faces();
    }

    let summary = TVertexSummary {
        initial_vertices,
        final_vertices: mesh.vertex_count(),
        vertices_welded,
        unreferenced_removed,
        t_vertices_removed,
        faces_before,
        faces_after: mesh.face_count(),
    };
    info!(
        t_vertices = summary.t_vertices_removed,
        faces_before = summary.faces_before,
        faces_after = summary.faces_after,
        "T-vertex repair complete"
    );
    Ok(summary)
}

/// Result of a T-vertex repair pass.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TVertexSummary {
    /// Number of vertices before repair.
    pub initial_vertices: usize,
    /// Number of vertices after repair.
    pub final_vertices: usize,
    /// Number of vertices merged by welding.
    pub vertices_welded: usize,
    /// Number of unreferenced vertices dropped after welding.
    pub unreferenced_removed: usize,
    /// Number of coincident edges resolved. A vertex lying on several
    /// edges in sequence counts once per edge.
    pub t_vertices_removed: usize,
    /// Number of faces before repair.
    pub faces_before: usize,
    /// Number of faces after repair.
    pub faces_after: usize,
}

impl TVertexSummary {
    /// Check if the pass changed the mesh at all.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.vertices_welded > 0 || self.unreferenced_removed > 0 || self.t_vertices_removed > 0
    }
}

impl std::fmt::Display for TVertexSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "T-vertex repair: {} removed, {} -> {} faces, {} verts ({} welded, {} unreferenced)",
            self.t_vertices_removed,
            self.faces_before,
            self.faces_after,
            self.final_vertices,
            self.vertices_welded,
            self.unreferenced_removed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::count_t_vertices;
    use crate::mesh::Vertex;

    fn quad_with_diagonal_midpoint() -> Mesh {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.5, 0.5, 0.0, //
        ];
        Mesh::from_indexed(&positions, &[0, 1, 2, 0, 2, 3, 4, 4, 4]).unwrap()
    }

    #[test]
    fn repairs_quad_with_midpoint_vertex() {
        let mut mesh = quad_with_diagonal_midpoint();
        let area_before = mesh.surface_area();

        let summary = remove_t_vertices(&mut mesh, &TVertexParams::default()).unwrap();

        assert_eq!(summary.t_vertices_removed, 1);
        assert_eq!(summary.faces_before, 3);
        assert_eq!(summary.faces_after, 4);
        assert!(summary.had_changes());
        assert_eq!(mesh.vertex_count(), 5);
        assert!((mesh.surface_area() - area_before).abs() < 1e-12);
        assert_eq!(count_t_vertices(&mesh, 1e-4).unwrap(), 0);
    }

    #[test]
    fn identity_on_clean_triangle() {
        let mut mesh = Mesh::from_indexed(
            &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0],
            &[0, 1, 2],
        )
        .unwrap();

        let summary = remove_t_vertices(&mut mesh, &TVertexParams::default()).unwrap();

        assert_eq!(summary.t_vertices_removed, 0);
        assert!(!summary.had_changes());
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn identity_keeps_degenerate_faces() {
        let mut mesh = Mesh::from_indexed(
            &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0],
            &[0, 1, 2],
        )
        .unwrap();
        mesh.faces.push([2, 2, 2]);

        let summary = remove_t_vertices(&mut mesh, &TVertexParams::default()).unwrap();

        assert_eq!(summary.t_vertices_removed, 0);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn welds_duplicate_probe_before_detection() {
        let mut mesh = quad_with_diagonal_midpoint();
        // A second copy of the midpoint vertex in its own degenerate face.
        mesh.vertices.push(Vertex::from_coords(0.5, 0.5, 0.0));
        mesh.faces.push([5, 5, 5]);

        let summary = remove_t_vertices(&mut mesh, &TVertexParams::default()).unwrap();

        assert_eq!(summary.vertices_welded, 1);
        assert_eq!(summary.unreferenced_removed, 1);
        assert_eq!(summary.t_vertices_removed, 1);
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(count_t_vertices(&mesh, 1e-4).unwrap(), 0);
    }

    #[test]
    fn soup_input_repairs_end_to_end() {
        // One long triangle above the x axis, two short ones below it;
        // the long edge's midpoint is a corner of both short triangles.
        let positions = [
            0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 1.0, 1.0, 0.0, // long
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, -1.0, 0.0, // short left
            1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 1.5, -1.0, 0.0, // short right
        ];
        let mut mesh = Mesh::from_soup(&positions).unwrap();
        let area_before = mesh.surface_area();

        let summary = remove_t_vertices(&mut mesh, &TVertexParams::default()).unwrap();

        assert_eq!(summary.vertices_welded, 3);
        assert_eq!(summary.t_vertices_removed, 1);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face_count(), 4);
        assert!((mesh.surface_area() - area_before).abs() < 1e-12);
        assert_eq!(count_t_vertices(&mesh, 1e-4).unwrap(), 0);
    }

    #[test]
    fn error_keeps_face_list_intact() {
        // Three faces share the (0, 1) edge; the probe on it is unresolvable.
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, //
            0.0, 0.0, 2.0, //
            0.0, -2.0, 0.0, //
            1.0, 0.0, 0.0, //
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3], [0, 1, 4], [5, 5, 5]];
        let mut mesh = Mesh::from_indexed(
            &positions,
            &faces.iter().flatten().copied().collect::<Vec<_>>(),
        )
        .unwrap();

        let err = remove_t_vertices(&mut mesh, &TVertexParams::without_welding()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TVertexError::NonManifoldEdge { .. }
        ));
        assert_eq!(mesh.faces, faces);
    }

    #[test]
    fn rejects_invalid_indices_at_boundary() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.faces.push([0, 1, 2]);

        let err = remove_t_vertices(&mut mesh, &TVertexParams::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TVertexError::IndexOutOfRange { face: 0, .. }
        ));
    }

    #[test]
    fn summary_display_reads_well() {
        let summary = TVertexSummary {
            initial_vertices: 10,
            final_vertices: 8,
            vertices_welded: 2,
            unreferenced_removed: 2,
            t_vertices_removed: 3,
            faces_before: 6,
            faces_after: 9,
        };
        let text = format!("{summary}");
        assert!(text.contains("3 removed"));
        assert!(text.contains("6 -> 9 faces"));
    }
}
