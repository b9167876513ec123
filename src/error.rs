//! Error types for wingmesh.
//!
//! [`MeshError`] covers everything a public operation can report.
//! [`FaceDefect`] describes why a single face cannot take part in a
//! topology view; it reaches callers wrapped in [`MeshError::MalformedFace`].

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Reasons a face is rejected from a winged-edge view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaceDefect {
    /// The face has no triangles at all.
    #[error("face has no triangles")]
    EmptyTriangleList,

    /// The triangle index list is not a multiple of three.
    #[error("triangle list has {len} indices, which is not a multiple of 3")]
    RaggedTriangleList {
        /// Number of indices in the list.
        len: usize,
    },

    /// The face references fewer than three distinct positions.
    #[error("face has only {distinct} distinct indices")]
    TooFewIndices {
        /// Number of distinct indices.
        distinct: usize,
    },

    /// A triangle repeats an index, collapsing one of its edges to a point.
    #[error("edge ({a}, {b}) is degenerate")]
    DegenerateEdge {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
    },

    /// Both endpoints of a boundary edge belong to the same shared-vertex group.
    #[error("edge ({a}, {b}) collapses to a single shared vertex")]
    CollapsedEdge {
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
    },

    /// An index points past the end of the position array.
    #[error("index {index} is out of range for {len} positions")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of positions in the mesh.
        len: usize,
    },

    /// The perimeter edges do not close into a single loop.
    #[error("face perimeter does not form a single closed loop")]
    OpenBoundary,
}

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face could not be used to build topology.
    #[error("face {face} is malformed: {defect}")]
    MalformedFace {
        /// The face index.
        face: usize,
        /// What is wrong with it.
        #[source]
        defect: FaceDefect,
    },

    /// A face id does not exist in the mesh.
    #[error("face {face} does not exist (mesh has {count} faces)")]
    InvalidFaceId {
        /// The requested face index.
        face: usize,
        /// Number of faces in the mesh.
        count: usize,
    },

    /// A triangle or group references an invalid vertex index.
    #[error("index {vertex} is out of range for {count} positions")]
    InvalidVertexIndex {
        /// The invalid vertex index.
        vertex: usize,
        /// Number of positions.
        count: usize,
    },

    /// The shared-vertex grouping is inconsistent with the positions.
    #[error("invalid shared vertex groups: {0}")]
    InvalidSharedGroups(String),

    /// The edge is not an open (boundary or non-manifold) edge of the face.
    #[error("edge ({a}, {b}) is not an open edge of face {face}")]
    NotAnOpenEdge {
        /// The face index.
        face: usize,
        /// First endpoint.
        a: usize,
        /// Second endpoint.
        b: usize,
    },

    /// The geometry around a face is too degenerate for the operation.
    #[error("face {face} is geometrically degenerate: {details}")]
    DegenerateGeometry {
        /// The face index.
        face: usize,
        /// What could not be computed.
        details: &'static str,
    },

    /// A topology view ran out of record ids for the chosen index width.
    #[error("face {face} does not fit in the view: at most {limit} edge records are addressable")]
    TooManyRecords {
        /// The first face that did not fit.
        face: usize,
        /// Number of addressable records.
        limit: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Index of the face this error is about, if any.
    pub fn face(&self) -> Option<usize> {
        match self {
            MeshError::MalformedFace { face, .. }
            | MeshError::InvalidFaceId { face, .. }
            | MeshError::NotAnOpenEdge { face, .. }
            | MeshError::DegenerateGeometry { face, .. }
            | MeshError::TooManyRecords { face, .. } => Some(*face),
            _ => None,
        }
    }
}
