//! The editable mesh snapshot that topology views are built from.

use nalgebra::{Point3, Vector3};

use super::face::Face;
use super::index::{FaceId, GroupId, MeshIndex};
use super::shared::SharedVertices;
use crate::error::{MeshError, Result};

/// Positions, faces, and the shared-vertex grouping of an editable mesh.
///
/// Faces do not share position indices implicitly. Coincident copies are
/// tied together by [`SharedVertices`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableMesh<I: MeshIndex = u32> {
    pub(crate) positions: Vec<Point3<f64>>,
    pub(crate) faces: Vec<Face>,
    pub(crate) shared: SharedVertices<I>,
}

impl<I: MeshIndex> Default for EditableMesh<I> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl<I: MeshIndex> EditableMesh<I> {
    /// Create a mesh where every position is its own topological vertex.
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<Face>) -> Self {
        let shared = SharedVertices::identity(positions.len());
        Self {
            positions,
            faces,
            shared,
        }
    }

    /// Create a mesh with an explicit shared-vertex grouping.
    ///
    /// # Errors
    /// Returns [`MeshError::InvalidSharedGroups`] if the grouping does not
    /// cover exactly the positions.
    pub fn with_shared(
        positions: Vec<Point3<f64>>,
        faces: Vec<Face>,
        shared: SharedVertices<I>,
    ) -> Result<Self> {
        if shared.position_count() != positions.len() {
            return Err(MeshError::InvalidSharedGroups(format!(
                "grouping covers {} indices but the mesh has {} positions",
                shared.position_count(),
                positions.len()
            )));
        }
        Ok(Self {
            positions,
            faces,
            shared,
        })
    }

    // ==================== Accessors ====================

    /// Get the number of positions.
    #[inline]
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// All positions.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// A single position.
    #[inline]
    pub fn position(&self, index: usize) -> Option<&Point3<f64>> {
        self.positions.get(index)
    }

    /// All faces, in storage order.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// A face by id.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> Option<&Face> {
        self.faces.get(id.index())
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// The shared-vertex grouping.
    #[inline]
    pub fn shared(&self) -> &SharedVertices<I> {
        &self.shared
    }

    /// Resolve a face id or report it as missing.
    pub(crate) fn require_face(&self, id: FaceId<I>) -> Result<&Face> {
        self.face(id).ok_or(MeshError::InvalidFaceId {
            face: id.index(),
            count: self.faces.len(),
        })
    }

    // ==================== Construction ====================

    /// Append a position as a new topological vertex.
    pub fn add_position(&mut self, position: Point3<f64>) -> usize {
        let (index, _) = self.shared.push_singleton();
        self.positions.push(position);
        index
    }

    /// Append a position as another copy of an existing shared vertex.
    ///
    /// The new position is placed at `position`; callers normally pass the
    /// group's current location.
    pub fn add_shared_position(&mut self, group: GroupId<I>, position: Point3<f64>) -> usize {
        let index = self.shared.push_into(group);
        self.positions.push(position);
        index
    }

    /// Append a face and return its id.
    ///
    /// Any winged-edge view built before this call is stale afterwards.
    pub fn add_face(&mut self, face: Face) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        self.faces.push(face);
        id
    }

    /// Move the given vertices, and every coincident copy of them, by `delta`.
    ///
    /// Each shared group is moved once even if several of its members are
    /// listed. Out-of-range indices are ignored.
    pub fn translate_shared(&mut self, indices: &[usize], delta: Vector3<f64>) {
        let mut groups: Vec<GroupId<I>> = indices
            .iter()
            .filter_map(|&i| self.shared.group_of(i))
            .collect();
        groups.sort_unstable();
        groups.dedup();

        for group in groups {
            for &member in self.shared.group(group) {
                self.positions[member] += delta;
            }
        }
    }

    // ==================== Geometry ====================

    /// Mean of the face's distinct positions.
    ///
    /// Returns `None` for a missing face or one that references no valid
    /// position.
    pub fn face_center(&self, id: FaceId<I>) -> Option<Point3<f64>> {
        let face = self.face(id)?;
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for &i in face.distinct_indices() {
            if let Some(p) = self.positions.get(i) {
                sum += p.coords;
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        Some(Point3::from(sum / count as f64))
    }

    /// The face whose center is closest to `point`.
    pub fn nearest_face(&self, point: &Point3<f64>) -> Option<FaceId<I>> {
        self.face_ids()
            .filter_map(|f| self.face_center(f).map(|c| (f, (c - point).norm_squared())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }

    /// Unit normal of a face, from the area-weighted sum of its triangles.
    ///
    /// Counter-clockwise triangles face the viewer. Returns `None` for a
    /// missing face, an out-of-range index, or a face with no area.
    pub fn face_normal(&self, id: FaceId<I>) -> Option<Vector3<f64>> {
        let face = self.face(id)?;
        let mut sum = Vector3::zeros();
        for tri in face.indices().chunks_exact(3) {
            let p0 = self.positions.get(tri[0])?;
            let p1 = self.positions.get(tri[1])?;
            let p2 = self.positions.get(tri[2])?;
            sum += (p1 - p0).cross(&(p2 - p0));
        }
        sum.try_normalize(f64::EPSILON)
    }

    /// The first face hit by the ray from `origin` along `direction`, with
    /// the distance to the hit.
    ///
    /// Triangles are hit from either side. `direction` need not be unit
    /// length; the distance is measured in the mesh's units. Returns `None`
    /// for a zero direction or a miss.
    pub fn raycast_face(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<(FaceId<I>, f64)> {
        let dir = direction.try_normalize(f64::EPSILON)?;
        let mut best: Option<(FaceId<I>, f64)> = None;

        for (id, face) in self.face_ids().zip(&self.faces) {
            for tri in face.indices().chunks_exact(3) {
                let corners = (
                    self.positions.get(tri[0]),
                    self.positions.get(tri[1]),
                    self.positions.get(tri[2]),
                );
                let (Some(&v0), Some(&v1), Some(&v2)) = corners else {
                    continue;
                };
                if let Some(t) = ray_triangle(origin, &dir, v0, v1, v2) {
                    if best.map_or(true, |(_, nearest)| t < nearest) {
                        best = Some((id, t));
                    }
                }
            }
        }
        best
    }

    /// Push a face along its normal by `distance`, dragging every coincident
    /// copy of its vertices with it.
    ///
    /// # Errors
    /// - [`MeshError::InvalidFaceId`] if `id` does not exist
    /// - [`MeshError::DegenerateGeometry`] if the face has no normal
    pub fn offset_face(&mut self, id: FaceId<I>, distance: f64) -> Result<()> {
        let indices = self.require_face(id)?.distinct_indices().to_vec();
        let normal = self.face_normal(id).ok_or(MeshError::DegenerateGeometry {
            face: id.index(),
            details: "face has no normal",
        })?;
        self.translate_shared(&indices, normal * distance);
        Ok(())
    }
}

/// Möller-Trumbore ray/triangle intersection, without back-face culling.
///
/// Returns the distance along `dir` to the hit.
fn ray_triangle(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Option<f64> {
    const EPSILON: f64 = 1e-12;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    // Parallel to the triangle's plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > EPSILON).then_some(t)
}
