//! Edge topology index used by T-vertex repair.
//!
//! [`EdgeIndex`] holds every edge of the mesh exactly once, keyed by its
//! canonical vertex pair, with the geometry the detector needs cached at
//! creation time. Faces live in an append-only arena and are referenced
//! from edges by handle; a face with no referencing edge is dead. The
//! repaired face list is read back with [`EdgeIndex::surviving_faces`].

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{TVertexError, TVertexResult};
use crate::mesh::{Mesh, Vertex};

/// Normalize an edge so the smaller vertex index comes first.
#[inline]
pub(crate) const fn normalize_edge(v0: u32, v1: u32) -> (u32, u32) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

/// A mesh edge with cached geometry and the faces registered on it.
///
/// Geometry is computed once when the edge is created: the coincidence test
/// runs over every edge for every vertex, so per-test recomputation would
/// dominate the pass.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Smaller endpoint index.
    pub a: u32,

    /// Larger endpoint index.
    pub b: u32,

    /// Segment midpoint.
    pub midpoint: Point3<f64>,

    /// Squared half-length of the segment.
    pub half_length_sq: f64,

    /// Unit direction from endpoint `a` to endpoint `b`.
    pub direction: Vector3<f64>,

    /// Handles of the faces whose sides include this edge.
    pub faces: SmallVec<[u32; 2]>,
}

impl Edge {
    /// Check whether `vertex` is one of this edge's endpoints.
    #[inline]
    #[must_use]
    pub const fn has_endpoint(&self, vertex: u32) -> bool {
        self.a == vertex || self.b == vertex
    }
}

/// Edge-keyed topology of a triangle mesh.
///
/// Built once per repair pass by [`EdgeIndex::extract`], then mutated by
/// face splitting: edges are removed and created, split faces are appended
/// to the arena, and replaced faces are dropped from every edge that
/// referenced them.
///
/// # Example
///
/// ```
/// use mesh_tvertex::{EdgeIndex, Mesh};
///
/// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
/// let mesh = Mesh::from_indexed(&positions, &[0, 1, 2])?;
/// let index = EdgeIndex::extract(&mesh)?;
///
/// assert_eq!(index.edge_count(), 3);
/// assert_eq!(index.surviving_faces(), vec![[0, 1, 2]]);
/// # Ok::<(), mesh_tvertex::TVertexError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    /// Dense edge storage; slots move only on removal (swap-remove).
    edges: Vec<Edge>,

    /// Canonical pair to slot in `edges`.
    slot_by_key: HashMap<(u32, u32), usize>,

    /// Append-only face arena addressed by the handles edges carry.
    face_arena: Vec<[u32; 3]>,
}

impl EdgeIndex {
    /// Build the edge topology of a mesh.
    ///
    /// Fully degenerate faces (one repeated index) are ignored. Faces with
    /// exactly two distinct indices contribute their single real side as an
    /// edge with no face registered on it: the edge stays geometrically
    /// present for detection, but there is nothing to split. All other
    /// faces enter the arena and register on their three side edges.
    ///
    /// # Errors
    ///
    /// - [`TVertexError::IndexOutOfRange`] if a face names a missing vertex.
    /// - [`TVertexError::ZeroLengthEdge`] if two distinct indices share a
    ///   position.
    pub fn extract(mesh: &Mesh) -> TVertexResult<Self> {
        let vertices = &mesh.vertices;
        let mut index = Self {
            edges: Vec::with_capacity(mesh.faces.len() * 3 / 2),
            slot_by_key: HashMap::with_capacity(mesh.faces.len() * 3 / 2),
            face_arena: Vec::with_capacity(mesh.faces.len()),
        };

        for (face, &[ia, ib, ic]) in mesh.faces.iter().enumerate() {
            for corner in [ia, ib, ic] {
                if corner as usize >= vertices.len() {
                    return Err(TVertexError::IndexOutOfRange {
                        face,
                        index: corner,
                        vertex_count: vertices.len(),
                    });
                }
            }

            if ia == ib && ia == ic {
                continue;
            }
            if ia == ib {
                index.insert_or_get(ia, ic, vertices)?;
            } else if ia == ic {
                index.insert_or_get(ia, ib, vertices)?;
            } else if ib == ic {
                index.insert_or_get(ia, ib, vertices)?;
            } else {
                let handle = index.push_face([ia, ib, ic]);
                for (u, v) in [(ia, ib), (ib, ic), (ic, ia)] {
                    let slot = index.insert_or_get(u, v, vertices)?;
                    index.edges[slot].faces.push(handle);
                }
            }
        }

        debug!(
            edges = index.edges.len(),
            faces = index.face_arena.len(),
            "Extracted edge topology"
        );
        Ok(index)
    }

    /// Get the edge at `slot`, or create it with freshly computed geometry.
    ///
    /// # Errors
    ///
    /// [`TVertexError::ZeroLengthEdge`] if the endpoints coincide.
    pub(crate) fn insert_or_get(
        &mut self,
        i: u32,
        j: u32,
        vertices: &[Vertex],
    ) -> TVertexResult<usize> {
        let key = normalize_edge(i, j);
        if let Some(&slot) = self.slot_by_key.get(&key) {
            return Ok(slot);
        }

        let (a, b) = key;
        let pa = vertices[a as usize].position;
        let pb = vertices[b as usize].position;
        let span = pb - pa;
        let length_sq = span.norm_squared();
        if length_sq == 0.0 {
            return Err(TVertexError::ZeroLengthEdge { a, b });
        }

        let slot = self.edges.len();
        self.edges.push(Edge {
            a,
            b,
            midpoint: pa + span * 0.5,
            half_length_sq: length_sq * 0.25,
            direction: span / length_sq.sqrt(),
            faces: SmallVec::new(),
        });
        self.slot_by_key.insert(key, slot);
        Ok(slot)
    }

    /// Append a face to the arena and return its handle.
    #[allow(clippy::cast_possible_truncation)] // arena growth is bounded by u32 face handles
    pub(crate) fn push_face(&mut self, face: [u32; 3]) -> u32 {
        let handle = self.face_arena.len() as u32;
        self.face_arena.push(face);
        handle
    }

    /// Register `handle` on the edge at `slot`.
    pub(crate) fn register_face(&mut self, slot: usize, handle: u32) {
        self.edges[slot].faces.push(handle);
    }

    /// Drop `handle` from the face list of the edge at `slot`.
    ///
    /// Returns whether the handle was present.
    pub(crate) fn unregister_face(&mut self, slot: usize, handle: u32) -> bool {
        let faces = &mut self.edges[slot].faces;
        if let Some(position) = faces.iter().position(|&f| f == handle) {
            faces.remove(position);
            true
        } else {
            false
        }
    }

    /// Find the slot of the edge between `i` and `j`, in either order.
    #[inline]
    #[must_use]
    pub fn lookup(&self, i: u32, j: u32) -> Option<usize> {
        self.slot_by_key.get(&normalize_edge(i, j)).copied()
    }

    /// The edge stored at `slot`.
    #[inline]
    #[must_use]
    pub fn edge(&self, slot: usize) -> &Edge {
        &self.edges[slot]
    }

    /// The face triple behind `handle`.
    #[inline]
    #[must_use]
    pub fn face(&self, handle: u32) -> [u32; 3] {
        self.face_arena[handle as usize]
    }

    /// Remove the edge at `slot` and return it.
    ///
    /// The last edge is swapped into the vacated slot and its key mapping
    /// is updated, so all other slots stay valid.
    pub(crate) fn remove(&mut self, slot: usize) -> Edge {
        let edge = self.edges.swap_remove(slot);
        self.slot_by_key.remove(&(edge.a, edge.b));
        if slot < self.edges.len() {
            let moved = normalize_edge(self.edges[slot].a, self.edges[slot].b);
            self.slot_by_key.insert(moved, slot);
        }
        edge
    }

    /// Number of live edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the index holds no edges.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate over live edges in slot order.
    ///
    /// Slot order is creation order perturbed by swap-removes; the detector
    /// defines "first coincident edge" against this order, which is
    /// deterministic for any given mutation history.
    pub fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Collect the faces still referenced by at least one live edge.
    ///
    /// Each live face is emitted once, in arena (creation) order. Faces
    /// that lost all edge references, and degenerate input faces that never
    /// had any, do not appear.
    #[must_use]
    pub fn surviving_faces(&self) -> Vec<[u32; 3]> {
        let mut referenced = vec![false; self.face_arena.len()];
        for edge in &self.edges {
            for &handle in &edge.faces {
                referenced[handle as usize] = true;
            }
        }
        self.face_arena
            .iter()
            .zip(referenced)
            .filter_map(|(face, live)| live.then_some(*face))
            .collect()
    }
}
