//! Vertex welding for meshes with near-duplicate vertices.
//!
//! T-vertex detection walks the vertex buffer and compares positions against
//! edges, so a T-vertex hidden behind an unwelded duplicate is invisible to
//! it. The repair pipeline runs these two passes first unless
//! [`TVertexParams::weld_vertices`](crate::TVertexParams::weld_vertices) is
//! off.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;

use crate::mesh::Mesh;

/// Weld vertices that are within `tolerance` distance of each other.
///
/// Uses spatial hashing; each vertex is merged into the lowest-index vertex
/// within range. Face indices are remapped in place. Returns the number of
/// vertices merged away.
///
/// Faces that collapse onto repeated indices are kept: they still pin their
/// surviving edge into the mesh, which matters for detection coverage.
/// Merged-away vertices stay in the buffer until
/// [`remove_unreferenced_vertices`] runs.
///
/// # Example
///
/// ```
/// use mesh_tvertex::{Mesh, Vertex, weld_vertices};
///
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0000001, 0.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([0, 3, 2]);
///
/// let merged = weld_vertices(&mut mesh, 1e-5);
/// assert_eq!(merged, 1);
/// assert_eq!(mesh.faces[1], [0, 1, 2]);
/// ```
pub fn weld_vertices(mesh: &mut Mesh, tolerance: f64) -> usize {
    if mesh.vertices.is_empty() {
        return 0;
    }

    let cell_size = tolerance * 2.0;

    // Build spatial hash
    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();

    #[allow(clippy::cast_possible_truncation)] // u32 face indices bound the mesh size
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let cell = pos_to_cell(&vertex.position, cell_size);
        spatial_hash.entry(cell).or_default().push(idx as u32);
    }

    // Find canonical representatives
    #[allow(clippy::cast_possible_truncation)]
    let mut vertex_remap: Vec<u32> = (0..mesh.vertices.len() as u32).collect();
    let mut merged_count = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let idx = idx as u32;
        if vertex_remap[idx as usize] != idx {
            continue;
        }

        let cell = pos_to_cell(&vertex.position, cell_size);

        // Check 3x3x3 neighborhood
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor_cell = (cell.0 + dx, cell.1 + dy, cell.2 + dz);

                    if let Some(candidates) = spatial_hash.get(&neighbor_cell) {
                        for &other_idx in candidates {
                            if other_idx <= idx {
                                continue;
                            }
                            if vertex_remap[other_idx as usize] != other_idx {
                                continue;
                            }

                            let other_pos = &mesh.vertices[other_idx as usize].position;
                            let dist = (vertex.position - other_pos).norm();

                            if dist < tolerance {
                                vertex_remap[other_idx as usize] = idx;
                                merged_count += 1;
                            }
                        }
                    }
                }
            }
        }
    }

    if merged_count == 0 {
        return 0;
    }

    // Resolve transitive merges
    for i in 0..vertex_remap.len() {
        let mut target = vertex_remap[i];
        while vertex_remap[target as usize] != target {
            target = vertex_remap[target as usize];
        }
        vertex_remap[i] = target;
    }

    // Remap face indices
    for face in &mut mesh.faces {
        face[0] = vertex_remap[face[0] as usize];
        face[1] = vertex_remap[face[1] as usize];
        face[2] = vertex_remap[face[2] as usize];
    }

    merged_count
}

/// Convert position to spatial hash cell.
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

/// Remove vertices no face references and compact the vertex buffer.
///
/// Surviving vertices keep their relative order. Face indices are remapped
/// in place. Returns the number of vertices removed.
///
/// Note that a vertex kept alive only by a fully degenerate face still
/// counts as referenced.
///
/// # Example
///
/// ```
/// use mesh_tvertex::{Mesh, Vertex, remove_unreferenced_vertices};
///
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(100.0, 100.0, 100.0)); // Unreferenced
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 2, 3]);
///
/// let removed = remove_unreferenced_vertices(&mut mesh);
/// assert_eq!(removed, 1);
/// assert_eq!(mesh.faces[0], [0, 1, 2]);
/// ```
pub fn remove_unreferenced_vertices(mesh: &mut Mesh) -> usize {
    let original_count = mesh.vertices.len();

    // Find all referenced vertices
    let mut referenced: HashSet<u32> = HashSet::new();
    for face in &mesh.faces {
        referenced.insert(face[0]);
        referenced.insert(face[1]);
        referenced.insert(face[2]);
    }

    if referenced.len() == original_count {
        return 0;
    }

    // Build compacted vertex list and remap
    let mut new_vertices = Vec::with_capacity(referenced.len());
    let mut remap: Vec<u32> = vec![u32::MAX; original_count];

    #[allow(clippy::cast_possible_truncation)]
    for (old_idx, vertex) in mesh.vertices.iter().enumerate() {
        if referenced.contains(&(old_idx as u32)) {
            remap[old_idx] = new_vertices.len() as u32;
            new_vertices.push(vertex.clone());
        }
    }

    // Remap face indices
    for face in &mut mesh.faces {
        face[0] = remap[face[0] as usize];
        face[1] = remap[face[1] as usize];
        face[2] = remap[face[2] as usize];
    }

    let removed = original_count - new_vertices.len();
    mesh.vertices = new_vertices;

    removed
}
