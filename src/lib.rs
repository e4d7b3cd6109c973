//! T-vertex detection and removal for indexed triangle meshes.
//!
//! A T-vertex (or T-junction) is a vertex that sits on the interior of an
//! edge it is not an endpoint of, so the surface tessellates differently on
//! the two sides of that edge. Rasterizers round the two sides
//! independently, which shows up as hairline cracks, shading seams, and
//! broken watertightness. This crate finds such vertices and splits the
//! faces on the offending edges so the vertex becomes a real corner of the
//! surrounding triangulation.
//!
//! The repair pass:
//! - never moves, adds, or reorders vertices (the optional welding stage
//!   may merge and compact them),
//! - preserves the winding of every face it splits,
//! - conserves surface area up to floating-point rounding,
//! - leaves the face list untouched when it finds nothing.
//!
//! # Example
//!
//! ```
//! use mesh_tvertex::{count_t_vertices, remove_t_vertices, Mesh, TVertexParams};
//!
//! // Two triangles share the diagonal of a quad; a fifth vertex sits at
//! // the diagonal's midpoint without being connected to it.
//! let positions = [
//!     0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
//!     0.5, 0.5, 0.0,
//! ];
//! let mut mesh = Mesh::from_indexed(&positions, &[0, 1, 2, 0, 2, 3, 4, 4, 4])?;
//! assert_eq!(count_t_vertices(&mesh, 1e-4)?, 1);
//!
//! let summary = remove_t_vertices(&mut mesh, &TVertexParams::default())?;
//! assert_eq!(summary.t_vertices_removed, 1);
//! assert_eq!(mesh.face_count(), 4);
//! assert_eq!(count_t_vertices(&mesh, 1e-4)?, 0);
//! # Ok::<(), mesh_tvertex::TVertexError>(())
//! ```
//!
//! # Tolerances
//!
//! Two parameters control what counts as "on an edge":
//!
//! - [`TVertexParams::weld_tolerance`] (default `1e-5`) is a distance in
//!   mesh units. Scale it with your geometry.
//! - [`TVertexParams::alignment_tolerance`] (default `1e-4`) is
//!   dimensionless, roughly the sine of the largest accepted deviation
//!   angle between a vertex and an edge. It rarely needs tuning.
//!
//! Both detection comparisons are strict, so a vertex exactly at a
//! threshold is not coincident; in particular an unwelded duplicate of an
//! edge endpoint is never treated as a T-vertex.
//!
//! # Errors
//!
//! Malformed input (ragged buffers, out-of-range indices) is rejected
//! before any processing. Topology that the splitter cannot handle, such
//! as a coincident edge shared by more than two faces, aborts the pass
//! with a typed [`TVertexError`]; the mesh's face list is never left in a
//! half-split state.

#![warn(missing_docs)]
// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod detect;
mod edges;
mod error;
mod mesh;
mod params;
mod repair;
mod split;
mod weld;

pub use detect::count_t_vertices;
pub use edges::{Edge, EdgeIndex};
pub use error::{TVertexError, TVertexResult};
pub use mesh::{Mesh, Vertex, VertexAttributes};
pub use params::TVertexParams;
pub use repair::{remove_t_vertices, TVertexSummary};
pub use weld::{remove_unreferenced_vertices, weld_vertices};

// Re-export the nalgebra types used in the public API.
pub use nalgebra::{Point3, Vector3};
