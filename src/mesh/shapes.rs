//! Primitive generators.
//!
//! Generated meshes follow the editable-mesh convention: every face owns its
//! own copies of the positions it uses, and coincident copies are tied
//! together through the shared-vertex grouping.

use nalgebra::Point3;

use super::editable::EditableMesh;
use super::face::Face;
use super::index::MeshIndex;
use super::shared::SharedVertices;
use crate::error::{MeshError, Result};

/// A `columns x rows` grid of quads in the XZ plane, centred on the origin
/// and facing +Y.
///
/// # Errors
/// Returns [`MeshError::InvalidParameter`] for a non-positive size or a zero
/// quad count.
///
/// # Example
/// ```
/// use wingmesh::mesh::{shapes, EditableMesh};
///
/// let plane: EditableMesh = shapes::plane(2.0, 2.0, 3, 2).unwrap();
/// assert_eq!(plane.num_faces(), 6);
/// assert_eq!(plane.num_positions(), 24);
/// assert_eq!(plane.shared().len(), 12);
/// ```
pub fn plane<I: MeshIndex>(
    width: f64,
    height: f64,
    columns: usize,
    rows: usize,
) -> Result<EditableMesh<I>> {
    check_size("width", width)?;
    check_size("height", height)?;
    if columns == 0 {
        return Err(MeshError::invalid_param("columns", columns, "must be at least 1"));
    }
    if rows == 0 {
        return Err(MeshError::invalid_param("rows", rows, "must be at least 1"));
    }

    let grid_point = |i: usize, j: usize| {
        Point3::new(
            -width * 0.5 + width * i as f64 / columns as f64,
            0.0,
            -height * 0.5 + height * j as f64 / rows as f64,
        )
    };

    let stride = columns + 1;
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); stride * (rows + 1)];
    let mut positions = Vec::with_capacity(columns * rows * 4);
    let mut faces = Vec::with_capacity(columns * rows);

    for j in 0..rows {
        for i in 0..columns {
            // Counter-clockwise seen from +Y
            let corners = [(i, j), (i, j + 1), (i + 1, j + 1), (i + 1, j)];
            let mut outline = [0usize; 4];
            for (k, &(ci, cj)) in corners.iter().enumerate() {
                let index = positions.len();
                positions.push(grid_point(ci, cj));
                groups[cj * stride + ci].push(index);
                outline[k] = index;
            }
            faces.push(Face::polygon(&outline));
        }
    }

    let shared = SharedVertices::from_groups(groups, positions.len())?;
    EditableMesh::with_shared(positions, faces, shared)
}

/// An axis-aligned cube of edge length `size`, centred on the origin, with
/// outward-facing quads.
///
/// # Errors
/// Returns [`MeshError::InvalidParameter`] for a non-positive size.
pub fn cube<I: MeshIndex>(size: f64) -> Result<EditableMesh<I>> {
    check_size("size", size)?;

    // Corner `c` sits at x = bit 0, y = bit 1, z = bit 2.
    let corner = |c: usize| {
        let coord = |bit: usize| if c & (1 << bit) != 0 { size * 0.5 } else { -size * 0.5 };
        Point3::new(coord(0), coord(1), coord(2))
    };
    const SIDES: [[usize; 4]; 6] = [
        [0, 4, 6, 2], // -X
        [1, 3, 7, 5], // +X
        [0, 1, 5, 4], // -Y
        [2, 6, 7, 3], // +Y
        [0, 2, 3, 1], // -Z
        [4, 5, 7, 6], // +Z
    ];

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); 8];
    let mut positions = Vec::with_capacity(24);
    let mut faces = Vec::with_capacity(6);

    for side in SIDES {
        let mut outline = [0usize; 4];
        for (k, &c) in side.iter().enumerate() {
            let index = positions.len();
            positions.push(corner(c));
            groups[c].push(index);
            outline[k] = index;
        }
        faces.push(Face::polygon(&outline));
    }

    let shared = SharedVertices::from_groups(groups, positions.len())?;
    EditableMesh::with_shared(positions, faces, shared)
}

fn check_size(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MeshError::invalid_param(name, value, "must be finite and positive"))
    }
}
