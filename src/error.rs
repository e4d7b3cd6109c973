//! Error types for T-vertex repair operations.

use thiserror::Error;

/// Errors that can occur during T-vertex detection and removal.
///
/// Boundary errors (`InvalidPositionCount`, `InvalidIndexCount`,
/// `IndexOutOfRange`, `InvalidPrefix`) reject malformed input before any
/// processing starts. Topology errors (`ZeroLengthEdge`, `NonManifoldEdge`,
/// `VertexOnOwnEdge`, `MissingOppositeVertex`, `MissingNeighborEdge`) abort
/// the repair pass; the mesh's face list is left untouched when they occur.
#[derive(Debug, Error)]
pub enum TVertexError {
    /// Flat position buffer length is not a multiple of 3.
    #[error("Position buffer has {count} values, which is not a multiple of 3")]
    InvalidPositionCount {
        /// Number of scalar values in the buffer.
        count: usize,
    },

    /// Index buffer length is not a multiple of 3.
    #[error("Index buffer has {count} entries, which is not a multiple of 3")]
    InvalidIndexCount {
        /// Number of indices in the buffer.
        count: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("Face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending face position in the face list.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A draw-range prefix extends past the end of the index buffer.
    #[error("Draw range covers {count} indices but only {available} are available")]
    InvalidPrefix {
        /// Requested number of indices.
        count: usize,
        /// Indices actually present in the buffer.
        available: usize,
    },

    /// Two distinct vertex indices occupy the exact same position.
    #[error("Vertices {a} and {b} occupy the same position; weld vertices before repair")]
    ZeroLengthEdge {
        /// First endpoint index.
        a: u32,
        /// Second endpoint index.
        b: u32,
    },

    /// A coincident edge is shared by more than two faces.
    #[error("Edge ({a}, {b}) is shared by {faces} faces; T-vertex repair supports at most 2")]
    NonManifoldEdge {
        /// Smaller endpoint index.
        a: u32,
        /// Larger endpoint index.
        b: u32,
        /// Number of faces registered on the edge.
        faces: usize,
    },

    /// A vertex was reported coincident with an edge it is an endpoint of.
    #[error("Vertex {vertex} reported coincident with its own edge ({a}, {b})")]
    VertexOnOwnEdge {
        /// The coincident vertex.
        vertex: u32,
        /// Smaller endpoint index of the edge.
        a: u32,
        /// Larger endpoint index of the edge.
        b: u32,
    },

    /// A face registered on an edge has no third vertex outside that edge.
    #[error("Face ({v0}, {v1}, {v2}) has no vertex opposite edge ({a}, {b})")]
    MissingOppositeVertex {
        /// First face corner.
        v0: u32,
        /// Second face corner.
        v1: u32,
        /// Third face corner.
        v2: u32,
        /// Smaller endpoint index of the split edge.
        a: u32,
        /// Larger endpoint index of the split edge.
        b: u32,
    },

    /// An edge that must exist for a face being split is absent.
    #[error("Expected edge ({a}, {b}) is missing while splitting an adjacent face")]
    MissingNeighborEdge {
        /// Smaller endpoint index.
        a: u32,
        /// Larger endpoint index.
        b: u32,
    },
}

/// Result type for T-vertex repair operations.
pub type TVertexResult<T> = std::result::Result<T, TVertexError>;
