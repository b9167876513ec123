//! Mesh editing algorithms built on the winged-edge view.
//!
//! - **Extrusion**: grow quads off the open edges of a face, or lift whole
//!   faces and wall them in
//!
//! Each algorithm rebuilds the topology it needs from the mesh it is given,
//! so callers never have to keep a view in sync by hand.

pub mod extrude;

pub use extrude::{
    extrude_edge, extrude_faces, extrude_random_edge, extrusion_direction, ExtrudeMethod,
    ExtrudeOptions, ExtrudedEdge,
};
