//! Face splitting around a resolved T-vertex.

use tracing::debug;

use crate::edges::{normalize_edge, EdgeIndex};
use crate::error::{TVertexError, TVertexResult};
use crate::mesh::Vertex;

/// The corner of `face` that is on neither end of the edge `(a, b)`.
fn opposite_vertex(face: [u32; 3], a: u32, b: u32) -> Option<u32> {
    face.into_iter().find(|&v| v != a && v != b)
}

/// Replace one corner of a face, keeping corner order.
///
/// Corner order is what encodes winding, so both halves of a split face
/// inherit the original orientation.
fn replace_corner(face: [u32; 3], from: u32, to: u32) -> [u32; 3] {
    face.map(|v| if v == from { to } else { v })
}

/// Remove the edge at `slot` and split every face registered on it at the
/// probe vertex.
///
/// For each face `F` on the removed edge `(a, b)` with opposite corner
/// `vk`:
///
/// - `F` is dropped from its two neighbor edges `(a, vk)` and `(b, vk)`.
/// - If `vk` is the probe itself, `F` is a flat sliver across the removed
///   edge and is discarded outright.
/// - Otherwise `F` becomes two faces, one keeping `a` and one keeping `b`,
///   with the probe replacing the far endpoint in each; the probe's three
///   surrounding edges are created as needed and the new faces registered
///   on them and on the neighbors.
///
/// The probe stays an interior vertex of the new triangulation, so every
/// edge created here has it as an endpoint and can never match the same
/// probe again.
///
/// # Errors
///
/// - [`TVertexError::VertexOnOwnEdge`] if the probe is an endpoint of the
///   edge being resolved.
/// - [`TVertexError::NonManifoldEdge`] if more than two faces are
///   registered on it.
/// - [`TVertexError::MissingOppositeVertex`] /
///   [`TVertexError::MissingNeighborEdge`] if face and edge bookkeeping
///   have come apart.
/// - [`TVertexError::ZeroLengthEdge`] if a new edge would connect two
///   vertices at the same position.
pub(crate) fn resolve_coincident_edge(
    probe_index: u32,
    slot: usize,
    index: &mut EdgeIndex,
    vertices: &[Vertex],
) -> TVertexResult<()> {
    let edge = index.remove(slot);
    if edge.has_endpoint(probe_index) {
        return Err(TVertexError::VertexOnOwnEdge {
            vertex: probe_index,
            a: edge.a,
            b: edge.b,
        });
    }
    if edge.faces.len() > 2 {
        return Err(TVertexError::NonManifoldEdge {
            a: edge.a,
            b: edge.b,
            faces: edge.faces.len(),
        });
    }

    let (a, b) = (edge.a, edge.b);
    for &handle in &edge.faces {
        let face = index.face(handle);
        let vk = opposite_vertex(face, a, b).ok_or(TVertexError::MissingOppositeVertex {
            v0: face[0],
            v1: face[1],
            v2: face[2],
            a,
            b,
        })?;

        let slot_ak = index.lookup(a, vk).ok_or_else(|| {
            let (na, nb) = normalize_edge(a, vk);
            TVertexError::MissingNeighborEdge { a: na, b: nb }
        })?;
        let slot_bk = index.lookup(b, vk).ok_or_else(|| {
            let (na, nb) = normalize_edge(b, vk);
            TVertexError::MissingNeighborEdge { a: na, b: nb }
        })?;
        index.unregister_face(slot_ak, handle);
        index.unregister_face(slot_bk, handle);

        if vk == probe_index {
            debug!(face = handle, "Discarded flat face spanning removed edge");
            continue;
        }

        let handle_a = index.push_face(replace_corner(face, b, probe_index));
        let handle_b = index.push_face(replace_corner(face, a, probe_index));

        let slot_ap = index.insert_or_get(a, probe_index, vertices)?;
        let slot_bp = index.insert_or_get(b, probe_index, vertices)?;
        let slot_kp = index.insert_or_get(vk, probe_index, vertices)?;

        index.register_face(slot_ap, handle_a);
        index.register_face(slot_kp, handle_a);
        index.register_face(slot_ak, handle_a);
        index.register_face(slot_bp, handle_b);
        index.register_face(slot_kp, handle_b);
        index.register_face(slot_bk, handle_b);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::find_coincident_edge;
    use crate::mesh::Mesh;

    const TOL_SQ: f64 = 1e-8;

    fn detect(mesh: &Mesh, index: &EdgeIndex, probe: u32) -> Option<usize> {
        find_coincident_edge(
            mesh.vertices[probe as usize].position,
            probe,
            index,
            &mesh.vertices,
            TOL_SQ,
        )
    }

    /// Unit quad split along its diagonal, plus a probe vertex at the
    /// diagonal's midpoint held by a degenerate face.
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
    fn splits_both_faces_of_a_shared_edge() {
        let mesh = quad_with_diagonal_midpoint();
        let mut index = EdgeIndex::extract(&mesh).unwrap();

        let slot = detect(&mesh, &index, 4).unwrap();
        assert_eq!((index.edge(slot).a, index.edge(slot).b), (0, 2));
        resolve_coincident_edge(4, slot, &mut index, &mesh.vertices).unwrap();

        let faces = index.surviving_faces();
        assert_eq!(faces, vec![[0, 1, 4], [4, 1, 2], [0, 4, 3], [4, 2, 3]]);
        // No further coincidence for the same probe.
        assert!(detect(&mesh, &index, 4).is_none());
    }

    #[test]
    fn split_preserves_winding() {
        let mesh = quad_with_diagonal_midpoint();
        let mut index = EdgeIndex::extract(&mesh).unwrap();
        let slot = detect(&mesh, &index, 4).unwrap();
        resolve_coincident_edge(4, slot, &mut index, &mesh.vertices).unwrap();

        // Every output face keeps the +z normal of the input quad.
        for face in index.surviving_faces() {
            let p0 = mesh.vertices[face[0] as usize].position;
            let p1 = mesh.vertices[face[1] as usize].position;
            let p2 = mesh.vertices[face[2] as usize].position;
            let normal = (p1 - p0).cross(&(p2 - p0));
            assert!(normal.z > 0.0, "face {face:?} flipped");
        }
    }

    #[test]
    fn discards_flat_face_spanning_the_edge() {
        // Face [0, 1, 3] is a zero-area sliver: its apex is the probe
        // itself, sitting on the (0, 1) edge it spans.
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, //
            1.0, 0.0, 0.0, //
        ];
        let mesh = Mesh::from_indexed(&positions, &[0, 1, 2, 0, 1, 3]).unwrap();
        let mut index = EdgeIndex::extract(&mesh).unwrap();

        let slot = detect(&mesh, &index, 3).unwrap();
        resolve_coincident_edge(3, slot, &mut index, &mesh.vertices).unwrap();

        let faces = index.surviving_faces();
        assert_eq!(faces, vec![[0, 3, 2], [3, 1, 2]]);
    }

    #[test]
    fn rejects_non_manifold_coincident_edge() {
        // Three faces share the (0, 1) edge.
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, //
            0.0, 0.0, 2.0, //
            0.0, -2.0, 0.0, //
            1.0, 0.0, 0.0, //
        ];
        let mesh =
            Mesh::from_indexed(&positions, &[0, 1, 2, 0, 1, 3, 0, 1, 4, 5, 5, 5]).unwrap();
        let mut index = EdgeIndex::extract(&mesh).unwrap();

        let slot = detect(&mesh, &index, 5).unwrap();
        let err = resolve_coincident_edge(5, slot, &mut index, &mesh.vertices).unwrap_err();
        assert!(matches!(
            err,
            TVertexError::NonManifoldEdge { a: 0, b: 1, faces: 3 }
        ));
    }

    #[test]
    fn rejects_probe_on_its_own_edge() {
        let mesh = Mesh::from_indexed(
            &[0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0],
            &[0, 1, 2],
        )
        .unwrap();
        let mut index = EdgeIndex::extract(&mesh).unwrap();
        let slot = index.lookup(0, 1).unwrap();

        let err = resolve_coincident_edge(0, slot, &mut index, &mesh.vertices).unwrap_err();
        assert!(matches!(
            err,
            TVertexError::VertexOnOwnEdge { vertex: 0, a: 0, b: 1 }
        ));
    }

    #[test]
    fn reports_missing_neighbor_edge() {
        let positions = [
            0.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, //
            1.0, 0.0, 0.0, //
        ];
        let mesh = Mesh::from_indexed(&positions, &[0, 1, 2, 3, 3, 3]).unwrap();
        let mut index = EdgeIndex::extract(&mesh).unwrap();

        // Sabotage: drop the (1, 2) side out from under the face.
        let doomed = index.lookup(1, 2).unwrap();
        index.remove(doomed);

        let slot = detect(&mesh, &index, 3).unwrap();
        let err = resolve_coincident_edge(3, slot, &mut index, &mesh.vertices).unwrap_err();
        assert!(matches!(
            err,
            TVertexError::MissingNeighborEdge { a: 1, b: 2 }
        ));
    }
}
