//! # Wingmesh
//!
//! Winged-edge topology queries over editable polygon meshes.
//!
//! Editable meshes store every face with its own copies of the positions it
//! uses and keep a separate shared-vertex grouping that says which copies
//! are the same point. Wingmesh builds a winged-edge view over such a mesh
//! so callers can walk face and edge adjacency: find the open edges of a
//! face, step around a face in winding order, or cross an edge to the
//! neighbouring face.
//!
//! ## Features
//!
//! - **Winged-edge view**: per-face edge records with next/previous/opposite links
//! - **Shared-vertex canonicalization**: split copies of a vertex still connect faces
//! - **Graceful validation**: malformed faces are skipped and reported, not fatal
//! - **Type-safe indices**: 16-, 32-, or 64-bit ids for faces, records, and groups
//! - **Consumers**: primitive generators, triangle-mesh import, ray-cast face
//!   picking, edge and face extrusion
//!
//! ## Quick Start
//!
//! ```
//! use wingmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: EditableMesh = EditableMesh::new(positions, vec![Face::polygon(&[0, 1, 2, 3])]);
//!
//! let wings = WingedEdgeSet::build(&mesh);
//! let face = FaceId::new(0);
//!
//! // A lone quad: four records, all on the boundary
//! assert_eq!(wings.len(), 4);
//! for id in wings.edges_of_face(face) {
//!     assert_eq!(wings.opposite(id), None);
//!     assert_eq!(wings.edge_kind(id), EdgeKind::Boundary);
//! }
//! ```
//!
//! ## Keeping Views Fresh
//!
//! A [`WingedEdgeSet`](mesh::WingedEdgeSet) is a snapshot. It is never
//! updated when the mesh changes, so build a new one before each
//! topology-dependent operation:
//!
//! ```
//! use wingmesh::prelude::*;
//! use wingmesh::algo::extrude::{extrude_edge, ExtrudeOptions};
//!
//! let mut mesh: EditableMesh = wingmesh::mesh::shapes::plane(1.0, 1.0, 1, 1).unwrap();
//! let face = FaceId::new(0);
//!
//! let before = WingedEdgeSet::build(&mesh);
//! let (wing, _) = before.boundary_edges(face)[0];
//! let edge = before.wing(wing).edge.local;
//!
//! extrude_edge(&mut mesh, face, edge, &ExtrudeOptions::default()).unwrap();
//!
//! let after = WingedEdgeSet::build(&mesh);
//! let wing = after.find_wing(face, edge).unwrap();
//! assert!(after.opposite(wing).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use wingmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{FaceDefect, MeshError, Result};
    pub use crate::mesh::{
        Edge, EdgeKind, EdgeLookup, EditableMesh, Face, FaceId, GroupId, MeshIndex,
        SharedVertices, WingId, WingedEdge, WingedEdgeSet,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            Face::polygon(&[0, 2, 1]), // bottom
            Face::polygon(&[0, 1, 3]), // front
            Face::polygon(&[1, 2, 3]), // right
            Face::polygon(&[2, 0, 3]), // left
        ];

        let mesh: EditableMesh = EditableMesh::new(positions, faces);
        let wings = WingedEdgeSet::build(&mesh);

        // 4 faces * 3 edges, every edge shared by two faces
        assert_eq!(wings.len(), 12);
        assert!(wings.is_closed());
        for f in mesh.face_ids() {
            assert!(wings.boundary_edges(f).is_empty(), "face {:?} has open edges", f);
        }
    }

    #[test]
    fn test_wide_indices() {
        let mesh: EditableMesh<u64> = crate::mesh::shapes::cube(1.0).unwrap();
        let wings: WingedEdgeSet<u64> = WingedEdgeSet::build(&mesh);
        assert!(wings.is_closed());
        assert_eq!(wings.adjacent_faces(FaceId::<u64>::new(0)).len(), 4);
    }
}
