//! Winged-edge topology view.
//!
//! A [`WingedEdgeSet`] is built from an [`EditableMesh`] snapshot right
//! before a topology query and thrown away afterwards. It is not updated
//! when the mesh changes: after adding or removing faces, build a new one.
//!
//! # Structure
//!
//! - Every valid face contributes one [`WingedEdge`] record per outline edge,
//!   stored contiguously in the face's winding order
//! - Each record links to the `next` and `previous` record of the same face
//! - Records are matched across faces by their canonical edge, i.e. the
//!   edge between shared-vertex groups rather than raw position indices
//! - Two records are each other's `opposite` only when the canonical edge is
//!   used by exactly two records on two different faces
//!
//! # Edge kinds
//!
//! A record without an opposite is either a [`EdgeKind::Boundary`] edge
//! (the only record on its edge) or an [`EdgeKind::NonManifold`] edge (three
//! or more records, or two records on the same face). Extrusion and other
//! callers that only want true borders should check the kind.

use std::collections::HashMap;
use std::ops::Range;

use super::editable::EditableMesh;
use super::edge::{Edge, EdgeLookup};
use super::face::Face;
use super::index::{FaceId, MeshIndex, WingId};
use crate::error::{FaceDefect, MeshError, Result};

/// One edge of one face, with links to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WingedEdge<I: MeshIndex = u32> {
    /// The edge in raw and canonical form. `edge.local` follows face winding.
    pub edge: EdgeLookup,

    /// The face this record belongs to.
    pub face: FaceId<I>,

    /// The next record around the face.
    pub next: WingId<I>,

    /// The previous record around the face.
    pub previous: WingId<I>,

    /// The record on the other face sharing this edge, if the edge is manifold.
    pub opposite: Option<WingId<I>>,
}

/// How many faces meet at a record's edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Only this face uses the edge.
    Boundary,
    /// Exactly two faces use the edge.
    Manifold,
    /// More than two records use the edge, or one face uses it twice.
    NonManifold,
}

/// Options for [`WingedEdgeSet::build_with`].
#[derive(Debug, Clone)]
pub struct WingedEdgeOptions<I: MeshIndex = u32> {
    /// Only build records for these faces. `None` means every face.
    pub faces: Option<Vec<FaceId<I>>>,

    /// Fail on the first malformed face instead of skipping it.
    pub strict: bool,
}

impl<I: MeshIndex> Default for WingedEdgeOptions<I> {
    fn default() -> Self {
        Self {
            faces: None,
            strict: false,
        }
    }
}

impl<I: MeshIndex> WingedEdgeOptions<I> {
    /// Restrict the view to the given faces.
    pub fn with_faces(mut self, faces: impl IntoIterator<Item = FaceId<I>>) -> Self {
        self.faces = Some(faces.into_iter().collect());
        self
    }

    /// Set whether malformed faces are an error.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Face/edge adjacency over a mesh snapshot.
#[derive(Debug, Clone)]
pub struct WingedEdgeSet<I: MeshIndex = u32> {
    wings: Vec<WingedEdge<I>>,

    /// Record range of each face, `None` for faces that were skipped.
    face_spans: Vec<Option<Range<usize>>>,

    /// Records keyed by canonical edge.
    by_edge: HashMap<Edge, Vec<WingId<I>>>,

    /// Shared group of each position index at build time.
    canonical: Vec<usize>,

    rejected: Vec<MeshError>,
}

impl<I: MeshIndex> WingedEdgeSet<I> {
    /// Build a view over every face of `mesh`.
    ///
    /// Malformed faces, and faces whose records no longer fit the index
    /// type, are left out and listed by [`rejected`](Self::rejected); the
    /// rest of the mesh is still linked.
    pub fn build(mesh: &EditableMesh<I>) -> Self {
        let faces = mesh.face_ids();
        match Self::build_faces(mesh, faces, false) {
            Ok(set) => set,
            // Non-strict builds only fail for unknown face ids, which
            // cannot come from `face_ids`.
            Err(_) => Self::empty(mesh),
        }
    }

    /// Build a view with explicit options.
    ///
    /// # Errors
    /// Returns [`MeshError::InvalidFaceId`] if the face subset names a face
    /// that does not exist. When `strict` is set, also returns
    /// [`MeshError::MalformedFace`] for the first malformed face and
    /// [`MeshError::TooManyRecords`] once the index type runs out of ids.
    pub fn build_with(mesh: &EditableMesh<I>, options: &WingedEdgeOptions<I>) -> Result<Self> {
        match &options.faces {
            Some(faces) => Self::build_faces(mesh, faces.iter().copied(), options.strict),
            None => Self::build_faces(mesh, mesh.face_ids(), options.strict),
        }
    }

    fn empty(mesh: &EditableMesh<I>) -> Self {
        Self {
            wings: Vec::new(),
            face_spans: vec![None; mesh.num_faces()],
            by_edge: HashMap::new(),
            canonical: canonical_groups(mesh),
            rejected: Vec::new(),
        }
    }

    fn build_faces(
        mesh: &EditableMesh<I>,
        faces: impl Iterator<Item = FaceId<I>>,
        strict: bool,
    ) -> Result<Self> {
        let mut set = Self::empty(mesh);
        let mut seen = vec![false; mesh.num_faces()];
        let limit = I::MAX.to_usize().saturating_add(1);

        for fid in faces {
            let face = mesh.require_face(fid)?;
            if std::mem::replace(&mut seen[fid.index()], true) {
                continue;
            }

            let lookups = set
                .face_lookups(mesh, face)
                .map_err(|defect| MeshError::MalformedFace {
                    face: fid.index(),
                    defect,
                })
                .and_then(|lookups| {
                    if set.wings.len() + lookups.len() > limit {
                        Err(MeshError::TooManyRecords {
                            face: fid.index(),
                            limit,
                        })
                    } else {
                        Ok(lookups)
                    }
                });
            let lookups = match lookups {
                Ok(lookups) => lookups,
                Err(err) => {
                    if strict {
                        return Err(err);
                    }
                    log::warn!("skipping face in winged-edge build: {}", err);
                    set.rejected.push(err);
                    continue;
                }
            };

            let start = set.wings.len();
            let n = lookups.len();
            for (k, lookup) in lookups.into_iter().enumerate() {
                let id = WingId::new(start + k);
                set.wings.push(WingedEdge {
                    edge: lookup,
                    face: fid,
                    next: WingId::new(start + (k + 1) % n),
                    previous: WingId::new(start + (k + n - 1) % n),
                    opposite: None,
                });
                set.by_edge.entry(lookup.common).or_default().push(id);
            }
            set.face_spans[fid.index()] = Some(start..start + n);
        }

        set.link_opposites();

        log::debug!(
            "built winged-edge view: {} records, {} edges, {} faces rejected",
            set.wings.len(),
            set.by_edge.len(),
            set.rejected.len()
        );

        Ok(set)
    }

    /// Outline of `face` with each edge paired with its canonical form.
    fn face_lookups(
        &self,
        mesh: &EditableMesh<I>,
        face: &Face,
    ) -> std::result::Result<Vec<EdgeLookup>, FaceDefect> {
        let len = mesh.num_positions();
        if let Some(&index) = face.distinct_indices().iter().find(|&&i| i >= len) {
            return Err(FaceDefect::IndexOutOfRange { index, len });
        }

        let outline = face.boundary()?;
        let mut lookups = Vec::with_capacity(outline.len());
        for local in outline {
            let ga = self.canonical_index(local.a, len)?;
            let gb = self.canonical_index(local.b, len)?;
            if ga == gb {
                return Err(FaceDefect::CollapsedEdge {
                    a: local.a,
                    b: local.b,
                });
            }
            lookups.push(EdgeLookup::new(local, Edge::new(ga, gb)));
        }
        Ok(lookups)
    }

    fn canonical_index(&self, index: usize, len: usize) -> std::result::Result<usize, FaceDefect> {
        self.canonical
            .get(index)
            .copied()
            .ok_or(FaceDefect::IndexOutOfRange { index, len })
    }

    fn link_opposites(&mut self) {
        for ids in self.by_edge.values() {
            if let [a, b] = ids.as_slice() {
                if self.wings[a.index()].face != self.wings[b.index()].face {
                    self.wings[a.index()].opposite = Some(*b);
                    self.wings[b.index()].opposite = Some(*a);
                }
            }
        }
    }

    // ==================== Accessors ====================

    /// Get the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.wings.len()
    }

    /// Whether the view has no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wings.is_empty()
    }

    /// Get a record by ID.
    ///
    /// # Panics
    /// Panics if `id` is not a record of this view.
    #[inline]
    pub fn wing(&self, id: WingId<I>) -> &WingedEdge<I> {
        &self.wings[id.index()]
    }

    /// Get a record by ID, or `None` if it does not exist.
    #[inline]
    pub fn get(&self, id: WingId<I>) -> Option<&WingedEdge<I>> {
        self.wings.get(id.index())
    }

    /// Iterate over all records with their IDs.
    pub fn iter(&self) -> impl Iterator<Item = (WingId<I>, &WingedEdge<I>)> + '_ {
        self.wings
            .iter()
            .enumerate()
            .map(|(i, w)| (WingId::new(i), w))
    }

    /// Faces that failed validation during the build.
    #[inline]
    pub fn rejected(&self) -> &[MeshError] {
        &self.rejected
    }

    // ==================== Topology Queries ====================

    /// The matching record on the adjacent face, if the edge is manifold.
    #[inline]
    pub fn opposite(&self, id: WingId<I>) -> Option<WingId<I>> {
        self.wing(id).opposite
    }

    /// The next record around the same face.
    #[inline]
    pub fn next(&self, id: WingId<I>) -> WingId<I> {
        self.wing(id).next
    }

    /// The previous record around the same face.
    #[inline]
    pub fn previous(&self, id: WingId<I>) -> WingId<I> {
        self.wing(id).previous
    }

    /// Classify the edge of a record.
    pub fn edge_kind(&self, id: WingId<I>) -> EdgeKind {
        let wing = self.wing(id);
        if wing.opposite.is_some() {
            return EdgeKind::Manifold;
        }
        match self.by_edge.get(&wing.edge.common).map(Vec::len) {
            Some(1) => EdgeKind::Boundary,
            _ => EdgeKind::NonManifold,
        }
    }

    /// Whether `face` has records in this view.
    pub fn contains_face(&self, face: FaceId<I>) -> bool {
        self.span(face).is_some()
    }

    fn span(&self, face: FaceId<I>) -> Option<Range<usize>> {
        self.face_spans.get(face.index()).cloned().flatten()
    }

    /// Records of `face` in winding order.
    ///
    /// Empty for faces that are missing, skipped, or were rejected.
    pub fn edges_of_face(&self, face: FaceId<I>) -> impl Iterator<Item = WingId<I>> + '_ {
        self.span(face).unwrap_or(0..0).map(WingId::new)
    }

    /// Records of `face` in winding order, as a slice.
    pub fn face_wings(&self, face: FaceId<I>) -> &[WingedEdge<I>] {
        match self.span(face) {
            Some(range) => &self.wings[range],
            None => &[],
        }
    }

    /// Records of `face` that have no opposite, with their kind.
    pub fn boundary_edges(&self, face: FaceId<I>) -> Vec<(WingId<I>, EdgeKind)> {
        self.edges_of_face(face)
            .filter(|&id| self.opposite(id).is_none())
            .map(|id| (id, self.edge_kind(id)))
            .collect()
    }

    /// The record of `face` whose raw edge equals `edge`, in either direction.
    pub fn find_wing(&self, face: FaceId<I>, edge: Edge) -> Option<WingId<I>> {
        self.edges_of_face(face)
            .find(|&id| self.wing(id).edge.local == edge)
    }

    /// All records on the same topological edge as the raw edge `edge`.
    pub fn wings_on_edge(&self, edge: Edge) -> &[WingId<I>] {
        let common = match (self.canonical.get(edge.a), self.canonical.get(edge.b)) {
            (Some(&a), Some(&b)) => Edge::new(a, b),
            _ => return &[],
        };
        self.by_edge.get(&common).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Faces across the manifold edges of `face`, without repeats.
    pub fn adjacent_faces(&self, face: FaceId<I>) -> Vec<FaceId<I>> {
        let mut out: Vec<FaceId<I>> = Vec::new();
        for id in self.edges_of_face(face) {
            if let Some(opp) = self.opposite(id) {
                let other = self.wing(opp).face;
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
        out
    }

    /// Whether every record has an opposite.
    pub fn is_closed(&self) -> bool {
        !self.wings.is_empty() && self.wings.iter().all(|w| w.opposite.is_some())
    }

    /// Count the distinct canonical edges with the given kind.
    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.by_edge
            .values()
            .filter(|ids| self.edge_kind(ids[0]) == kind)
            .count()
    }
}

fn canonical_groups<I: MeshIndex>(mesh: &EditableMesh<I>) -> Vec<usize> {
    (0..mesh.num_positions())
        .map(|i| mesh.shared().group_of(i).map_or(usize::MAX, |g| g.index()))
        .collect()
}
