//! Mesh and vertex types.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TVertexError, TVertexResult};

/// Optional attributes that can be attached to a vertex.
///
/// T-vertex repair never interpolates attributes: split faces only reuse
/// vertices that already exist, so whatever was set here survives unchanged.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexAttributes {
    /// Unit normal vector.
    pub normal: Option<Vector3<f64>>,

    /// Texture coordinates (U, V).
    pub uv: Option<(f32, f32)>,
}

impl VertexAttributes {
    /// Create empty attributes with no values set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            normal: None,
            uv: None,
        }
    }

    /// Create attributes with just a normal.
    #[inline]
    #[must_use]
    pub const fn with_normal(normal: Vector3<f64>) -> Self {
        Self {
            normal: Some(normal),
            uv: None,
        }
    }

    /// Check if any attributes are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.normal.is_none() && self.uv.is_none()
    }
}

/// A vertex in 3D space with optional attributes.
///
/// The position is stored as a `Point3<f64>` for high precision.
///
/// # Example
///
/// ```
/// use mesh_tvertex::{Vertex, Point3};
///
/// let v1 = Vertex::new(Point3::new(1.0, 2.0, 3.0));
/// let v2 = Vertex::from_coords(1.0, 2.0, 3.0);
///
/// assert_eq!(v1.position, v2.position);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Optional attributes (normal, texture coordinates).
    pub attributes: VertexAttributes,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            attributes: VertexAttributes::empty(),
        }
    }

    /// Create a vertex from raw coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_tvertex::Vertex;
    ///
    /// let v = Vertex::from_coords(1.0, 2.0, 3.0);
    /// assert_eq!(v.position.y, 2.0);
    /// ```
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a vertex with position and normal.
    #[inline]
    #[must_use]
    pub const fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            attributes: VertexAttributes::with_normal(normal),
        }
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

impl From<[f64; 3]> for Vertex {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::from_coords(x, y, z)
    }
}

impl From<(f64, f64, f64)> for Vertex {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::from_coords(x, y, z)
    }
}

/// An indexed triangle mesh.
///
/// Vertices are stored once and faces reference them by index. This is the
/// input and output representation for T-vertex repair: the repair pass
/// rewrites `faces` and never grows or reorders `vertices` (the optional
/// welding stage may shrink it).
///
/// Fields are public for direct manipulation; [`remove_t_vertices`]
/// validates face indices at its boundary, so meshes built by hand are
/// checked before any processing happens.
///
/// [`remove_t_vertices`]: crate::remove_t_vertices
///
/// # Example
///
/// ```
/// use mesh_tvertex::{Mesh, Vertex};
///
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// Vertex buffer.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as vertex index triples.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty mesh with preallocated capacity.
    #[must_use]
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Build a mesh from a flat position buffer and an explicit index buffer.
    ///
    /// `positions` holds xyz triples; `indices` holds face corner triples.
    ///
    /// # Errors
    ///
    /// - [`TVertexError::InvalidPositionCount`] if `positions.len()` is not a
    ///   multiple of 3.
    /// - [`TVertexError::InvalidIndexCount`] if `indices.len()` is not a
    ///   multiple of 3.
    /// - [`TVertexError::IndexOutOfRange`] if any index does not name a
    ///   vertex.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_tvertex::Mesh;
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let mesh = Mesh::from_indexed(&positions, &[0, 1, 2])?;
    /// assert_eq!(mesh.face_count(), 1);
    /// # Ok::<(), mesh_tvertex::TVertexError>(())
    /// ```
    pub fn from_indexed(positions: &[f64], indices: &[u32]) -> TVertexResult<Self> {
        let vertices = vertices_from_flat(positions)?;
        let faces = faces_from_indices(indices, vertices.len())?;
        Ok(Self { vertices, faces })
    }

    /// Build a mesh from a position buffer and the first `count` indices.
    ///
    /// Mirrors draw-range bounded geometry where only a prefix of the index
    /// buffer is live: indices past `count` are ignored entirely.
    ///
    /// # Errors
    ///
    /// - [`TVertexError::InvalidPrefix`] if `count > indices.len()`.
    /// - Everything [`Mesh::from_indexed`] can return, applied to the prefix.
    pub fn from_indexed_prefix(
        positions: &[f64],
        indices: &[u32],
        count: usize,
    ) -> TVertexResult<Self> {
        if count > indices.len() {
            return Err(TVertexError::InvalidPrefix {
                count,
                available: indices.len(),
            });
        }
        Self::from_indexed(positions, &indices[..count])
    }

    /// Build a mesh from an unindexed triangle soup.
    ///
    /// Every consecutive nine values form one triangle; the implied index
    /// buffer is `0, 1, 2, 3, ...`. Soup input always carries duplicate
    /// vertices wherever triangles touch, so repairing it without welding
    /// enabled will find nothing.
    ///
    /// # Errors
    ///
    /// - [`TVertexError::InvalidPositionCount`] if `positions.len()` is not a
    ///   multiple of 3.
    /// - [`TVertexError::InvalidIndexCount`] if the implied vertex sequence
    ///   is not a whole number of triangles.
    pub fn from_soup(positions: &[f64]) -> TVertexResult<Self> {
        let vertices = vertices_from_flat(positions)?;
        if vertices.len() % 3 != 0 {
            return Err(TVertexError::InvalidIndexCount {
                count: vertices.len(),
            });
        }
        #[allow(clippy::cast_possible_truncation)] // u32 face indices bound the mesh size
        let faces = (0..vertices.len() as u32 / 3)
            .map(|f| [3 * f, 3 * f + 1, 3 * f + 2])
            .collect();
        Ok(Self { vertices, faces })
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no vertices and no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.faces.is_empty()
    }

    /// Total surface area of all faces.
    ///
    /// Degenerate faces contribute zero; faces with out-of-range indices
    /// contribute nothing.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .filter_map(|&[i0, i1, i2]| {
                let a = self.vertices.get(i0 as usize)?.position;
                let b = self.vertices.get(i1 as usize)?.position;
                let c = self.vertices.get(i2 as usize)?.position;
                Some((b - a).cross(&(c - a)).norm() * 0.5)
            })
            .sum()
    }

    /// Validate that every face index names an existing vertex.
    ///
    /// # Errors
    ///
    /// [`TVertexError::IndexOutOfRange`] naming the first offending face.
    pub fn validate_indices(&self) -> TVertexResult<()> {
        let vertex_count = self.vertices.len();
        for (face, corners) in self.faces.iter().enumerate() {
            for &index in corners {
                if index as usize >= vertex_count {
                    return Err(TVertexError::IndexOutOfRange {
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Convert a flat xyz buffer into vertices.
fn vertices_from_flat(positions: &[f64]) -> TVertexResult<Vec<Vertex>> {
    if positions.len() % 3 != 0 {
        return Err(TVertexError::InvalidPositionCount {
            count: positions.len(),
        });
    }
    Ok(positions
        .chunks_exact(3)
        .map(|p| Vertex::from_coords(p[0], p[1], p[2]))
        .collect())
}

/// Convert a flat index buffer into face triples, validating range.
fn faces_from_indices(indices: &[u32], vertex_count: usize) -> TVertexResult<Vec<[u32; 3]>> {
    if indices.len() % 3 != 0 {
        return Err(TVertexError::InvalidIndexCount {
            count: indices.len(),
        });
    }
    let mut faces = Vec::with_capacity(indices.len() / 3);
    for (face, corners) in indices.chunks_exact(3).enumerate() {
        for &index in corners {
            if index as usize >= vertex_count {
                return Err(TVertexError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        faces.push([corners[0], corners[1], corners[2]]);
    }
    Ok(faces)
}
