//! Core mesh data structures.
//!
//! This module provides the editable mesh snapshot and the winged-edge view
//! built over it.
//!
//! # Overview
//!
//! An [`EditableMesh`] holds positions, polygon [`Face`]s stored as triangle
//! lists, and a [`SharedVertices`] grouping that ties coincident position
//! copies together. A [`WingedEdgeSet`] is derived from a mesh on demand and
//! answers adjacency questions: which edges of a face are open, what lies
//! across an edge, and the winding order of a face's edges.
//!
//! # Index Types
//!
//! - [`FaceId`] - Identifies a face
//! - [`WingId`] - Identifies a winged-edge record
//! - [`GroupId`] - Identifies a shared-vertex group
//!
//! Raw position indices are plain `usize`.
//!
//! # Construction
//!
//! ```
//! use wingmesh::mesh::{EditableMesh, Face, FaceId, WingedEdgeSet};
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
//! assert_eq!(wings.len(), 4);
//! assert_eq!(wings.boundary_edges(FaceId::new(0)).len(), 4);
//! ```

mod edge;
mod editable;
mod face;
mod import;
mod index;
mod shared;
pub mod shapes;
mod winged;

pub use edge::{Edge, EdgeLookup};
pub use editable::EditableMesh;
pub use face::{Face, MaterialId};
pub use import::{import_triangles, ImportSettings};
pub use index::{FaceId, GroupId, MeshIndex, WingId};
pub use shared::SharedVertices;
pub use winged::{EdgeKind, WingedEdge, WingedEdgeOptions, WingedEdgeSet};
