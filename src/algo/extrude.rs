//! Edge and face extrusion.
//!
//! Extruding an open edge of a face appends a new quad that hangs off that
//! edge, pushed outward along the direction from the face center to the
//! edge midpoint. Repeatedly extruding a random open edge of the newest
//! face grows a snake of quads.
//!
//! Extruding faces lifts them along their normals and closes the gap with
//! side quads, either face by face or for a selection as a whole (see
//! [`ExtrudeMethod`]).
//!
//! Every call builds a fresh [`WingedEdgeSet`], so a mesh may be edited
//! freely between calls.
//!
//! # Example
//!
//! ```
//! use wingmesh::algo::extrude::{extrude_edge, ExtrudeOptions};
//! use wingmesh::mesh::{shapes, Edge, EditableMesh, FaceId, WingedEdgeSet};
//!
//! let mut mesh: EditableMesh = shapes::plane(1.0, 1.0, 1, 1).unwrap();
//! let face = FaceId::new(0);
//! let edge = mesh.faces()[0].boundary().unwrap()[0];
//!
//! let extruded = extrude_edge(&mut mesh, face, edge, &ExtrudeOptions::default()).unwrap();
//! assert_eq!(mesh.num_faces(), 2);
//!
//! let wings = WingedEdgeSet::build(&mesh);
//! assert_eq!(wings.adjacent_faces(face), vec![extruded.face]);
//! ```

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use rand::Rng;

use crate::error::{MeshError, Result};
use crate::mesh::{
    Edge, EdgeKind, EditableMesh, Face, FaceId, GroupId, MaterialId, MeshIndex, WingId,
    WingedEdgeSet,
};

/// How [`extrude_faces`] treats selected faces that touch each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrudeMethod {
    /// Every face moves along its own normal and gets its own ring of side
    /// quads, even where it touches another selected face.
    #[default]
    IndividualFaces,

    /// Touching selected faces move together. Each vertex follows the mean
    /// normal of the selected faces around it, and only the outline of the
    /// selection gets side quads.
    Grouped,
}

/// Options for edge and face extrusion.
#[derive(Debug, Clone)]
pub struct ExtrudeOptions {
    /// How far the new geometry is pushed out.
    pub distance: f64,

    /// Whether edges shared by more than two faces may be extruded.
    pub allow_non_manifold: bool,

    /// How [`extrude_faces`] handles touching faces.
    pub method: ExtrudeMethod,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            distance: 1.0,
            allow_non_manifold: false,
            method: ExtrudeMethod::default(),
        }
    }
}

impl ExtrudeOptions {
    /// Set the extrusion distance.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Set whether non-manifold edges may be extruded.
    pub fn with_allow_non_manifold(mut self, allow: bool) -> Self {
        self.allow_non_manifold = allow;
        self
    }

    /// Set how touching faces are extruded.
    pub fn with_method(mut self, method: ExtrudeMethod) -> Self {
        self.method = method;
        self
    }

    fn accepts(&self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::Boundary => true,
            EdgeKind::NonManifold => self.allow_non_manifold,
            EdgeKind::Manifold => false,
        }
    }

    fn check_distance(&self) -> Result<()> {
        if self.distance.is_finite() {
            Ok(())
        } else {
            Err(MeshError::invalid_param(
                "distance",
                self.distance,
                "must be finite",
            ))
        }
    }
}

/// The result of an extrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrudedEdge<I: MeshIndex = u32> {
    /// The quad that was added.
    pub face: FaceId<I>,

    /// The outer edge of the new quad, in the quad's winding order.
    pub edge: Edge,
}

/// Unit vector from the center of `face` toward the midpoint of `edge`.
///
/// Returns `None` if the face or an endpoint is missing, or if the midpoint
/// coincides with the center.
pub fn extrusion_direction<I: MeshIndex>(
    mesh: &EditableMesh<I>,
    face: FaceId<I>,
    edge: Edge,
) -> Option<Vector3<f64>> {
    let center = mesh.face_center(face)?;
    let a = mesh.position(edge.a)?;
    let b = mesh.position(edge.b)?;
    let midpoint = Point3::from((a.coords + b.coords) * 0.5);
    (midpoint - center).try_normalize(f64::EPSILON)
}

/// Extrude one open edge of `face` by `options.distance`.
///
/// `edge` may be given in either direction; the new quad is always wound
/// against the source face so the pair stays consistently oriented. The
/// copies of the edge endpoints join their shared groups, so a view built
/// afterwards sees the source edge as manifold.
///
/// # Errors
/// - [`MeshError::InvalidFaceId`] if `face` does not exist
/// - [`MeshError::NotAnOpenEdge`] if `edge` is not an extrudable edge of `face`
/// - [`MeshError::DegenerateGeometry`] if no outward direction exists
/// - [`MeshError::InvalidParameter`] for a non-finite distance
pub fn extrude_edge<I: MeshIndex>(
    mesh: &mut EditableMesh<I>,
    face: FaceId<I>,
    edge: Edge,
    options: &ExtrudeOptions,
) -> Result<ExtrudedEdge<I>> {
    options.check_distance()?;
    mesh.require_face(face)?;

    let wings = WingedEdgeSet::build(mesh);
    let wing = wings
        .find_wing(face, edge)
        .filter(|&id| options.accepts(wings.edge_kind(id)))
        .ok_or(MeshError::NotAnOpenEdge {
            face: face.index(),
            a: edge.a,
            b: edge.b,
        })?;

    extrude_wing(mesh, &wings, wing, options)
}

/// Extrude a randomly chosen open edge of `face`.
///
/// Returns `Ok(None)` without touching the mesh when the face has no
/// extrudable edge, for example when it is surrounded on all sides or was
/// rejected as malformed.
///
/// # Errors
/// Same as [`extrude_edge`].
pub fn extrude_random_edge<I: MeshIndex, R: Rng + ?Sized>(
    mesh: &mut EditableMesh<I>,
    face: FaceId<I>,
    rng: &mut R,
    options: &ExtrudeOptions,
) -> Result<Option<ExtrudedEdge<I>>> {
    options.check_distance()?;
    mesh.require_face(face)?;

    let wings = WingedEdgeSet::build(mesh);
    let candidates = open_edges(&wings, face, options);
    if candidates.is_empty() {
        log::debug!("{:?} has no open edge to extrude", face);
        return Ok(None);
    }

    let wing = candidates[rng.gen_range(0..candidates.len())];
    extrude_wing(mesh, &wings, wing, options).map(Some)
}

/// Records of `face` that `options` allows extruding.
fn open_edges<I: MeshIndex>(
    wings: &WingedEdgeSet<I>,
    face: FaceId<I>,
    options: &ExtrudeOptions,
) -> Vec<WingId<I>> {
    wings
        .boundary_edges(face)
        .into_iter()
        .filter(|&(_, kind)| options.accepts(kind))
        .map(|(id, _)| id)
        .collect()
}

/// Extrude the edge of `wing`. `wings` must be built from `mesh` as it is.
fn extrude_wing<I: MeshIndex>(
    mesh: &mut EditableMesh<I>,
    wings: &WingedEdgeSet<I>,
    wing: WingId<I>,
    options: &ExtrudeOptions,
) -> Result<ExtrudedEdge<I>> {
    let face = wings.wing(wing).face;
    // Walk the edge the way the source face does
    let local = wings.wing(wing).edge.local;
    let material = mesh.require_face(face)?.material();

    let direction =
        extrusion_direction(mesh, face, local).ok_or(MeshError::DegenerateGeometry {
            face: face.index(),
            details: "edge midpoint coincides with face center",
        })?;
    let offset = direction * options.distance;

    let (pa, pb) = (mesh.positions[local.a], mesh.positions[local.b]);
    let (ga, gb) = match (
        mesh.shared().group_of(local.a),
        mesh.shared().group_of(local.b),
    ) {
        (Some(ga), Some(gb)) => (ga, gb),
        _ => {
            return Err(MeshError::NotAnOpenEdge {
                face: face.index(),
                a: local.a,
                b: local.b,
            })
        }
    };

    let a_copy = mesh.add_shared_position(ga, pa);
    let b_copy = mesh.add_shared_position(gb, pb);
    let a_out = mesh.add_position(pa + offset);
    let b_out = mesh.add_position(pb + offset);

    let added = mesh.add_face(side_quad([b_copy, a_copy, a_out, b_out], material));

    log::debug!(
        "extruded edge ({}, {}) of {:?} into {:?}",
        local.a,
        local.b,
        face,
        added
    );

    Ok(ExtrudedEdge {
        face: added,
        edge: Edge::new(a_out, b_out),
    })
}

/// Lift `faces` along their normals by `options.distance` and close the gap
/// with side quads.
///
/// Lifted faces keep their ids and leave the shared groups of faces that
/// stay behind, so the side quads sit between them and their old
/// neighbours. Side quads take the material of the face they border.
/// Returns the ids of the side quads.
///
/// Every face is checked before the mesh is changed.
///
/// # Errors
/// - [`MeshError::InvalidFaceId`] if a face does not exist
/// - [`MeshError::MalformedFace`] if a face cannot take part in a view
/// - [`MeshError::DegenerateGeometry`] if a face has no normal, or grouped
///   normals cancel out at a vertex
/// - [`MeshError::InvalidParameter`] for a non-finite distance
///
/// # Example
///
/// ```
/// use wingmesh::algo::extrude::{extrude_faces, ExtrudeOptions};
/// use wingmesh::mesh::{shapes, EdgeKind, EditableMesh, FaceId, WingedEdgeSet};
///
/// let mut mesh: EditableMesh = shapes::plane(1.0, 1.0, 1, 1).unwrap();
/// let sides = extrude_faces(&mut mesh, &[FaceId::new(0)], &ExtrudeOptions::default()).unwrap();
/// assert_eq!(sides.len(), 4);
///
/// // An upside-down open box: only the bottom rim is left open
/// let wings = WingedEdgeSet::build(&mesh);
/// assert_eq!(wings.count_edges(EdgeKind::Boundary), 4);
/// ```
pub fn extrude_faces<I: MeshIndex>(
    mesh: &mut EditableMesh<I>,
    faces: &[FaceId<I>],
    options: &ExtrudeOptions,
) -> Result<Vec<FaceId<I>>> {
    options.check_distance()?;
    let wings = WingedEdgeSet::build(mesh);
    let selection = selected_normals(mesh, &wings, faces)?;

    let added = match options.method {
        ExtrudeMethod::IndividualFaces => {
            let mut added = Vec::new();
            let mut view = wings;
            for (i, &lifted) in selection.iter().enumerate() {
                if i > 0 {
                    view = WingedEdgeSet::build(mesh);
                }
                added.extend(lift_faces(mesh, &view, &[lifted], options.distance)?);
            }
            added
        }
        ExtrudeMethod::Grouped => lift_faces(mesh, &wings, &selection, options.distance)?,
    };

    log::debug!(
        "extruded {} faces ({:?}), added {} side quads",
        selection.len(),
        options.method,
        added.len()
    );
    Ok(added)
}

/// Distinct selected faces with their normals, checked against `wings`.
fn selected_normals<I: MeshIndex>(
    mesh: &EditableMesh<I>,
    wings: &WingedEdgeSet<I>,
    faces: &[FaceId<I>],
) -> Result<Vec<(FaceId<I>, Vector3<f64>)>> {
    let mut out: Vec<(FaceId<I>, Vector3<f64>)> = Vec::with_capacity(faces.len());
    for &face in faces {
        mesh.require_face(face)?;
        if out.iter().any(|&(f, _)| f == face) {
            continue;
        }
        if !wings.contains_face(face) {
            let reason = wings
                .rejected()
                .iter()
                .find(|err| err.face() == Some(face.index()))
                .cloned();
            return Err(reason.unwrap_or(MeshError::InvalidFaceId {
                face: face.index(),
                count: mesh.num_faces(),
            }));
        }
        let normal = mesh
            .face_normal(face)
            .ok_or(MeshError::DegenerateGeometry {
                face: face.index(),
                details: "face has no normal",
            })?;
        out.push((face, normal));
    }
    Ok(out)
}

/// A shared group touched by the lifted faces.
struct Lift<I: MeshIndex> {
    /// Copies used by lifted faces.
    members: Vec<usize>,
    normal: Vector3<f64>,
    /// First lifted face that uses the group.
    face: FaceId<I>,
    offset: Vector3<f64>,
    /// Group of the lifted copies.
    top: GroupId<I>,
    /// Group side quads attach to at the old position.
    bottom: Option<GroupId<I>>,
}

/// Outline edge of the lifted faces, captured before anything moves.
struct Rim<I: MeshIndex> {
    ga: GroupId<I>,
    gb: GroupId<I>,
    pa: Point3<f64>,
    pb: Point3<f64>,
    material: Option<MaterialId>,
}

fn lift_faces<I: MeshIndex>(
    mesh: &mut EditableMesh<I>,
    wings: &WingedEdgeSet<I>,
    selection: &[(FaceId<I>, Vector3<f64>)],
    distance: f64,
) -> Result<Vec<FaceId<I>>> {
    let is_selected = |face: FaceId<I>| selection.iter().any(|&(f, _)| f == face);

    let mut lifts: BTreeMap<GroupId<I>, Lift<I>> = BTreeMap::new();
    for &(face, normal) in selection {
        let mut touched: Vec<GroupId<I>> = Vec::new();
        for &i in mesh.faces[face.index()].distinct_indices() {
            let Some(group) = mesh.shared.group_of(i) else {
                continue;
            };
            let lift = lifts.entry(group).or_insert_with(|| Lift {
                members: Vec::new(),
                normal: Vector3::zeros(),
                face,
                offset: Vector3::zeros(),
                top: group,
                bottom: None,
            });
            if !lift.members.contains(&i) {
                lift.members.push(i);
            }
            if !touched.contains(&group) {
                touched.push(group);
                lift.normal += normal;
            }
        }
    }

    let mut rims: Vec<Rim<I>> = Vec::new();
    for &(face, _) in selection {
        let material = mesh.faces[face.index()].material();
        for wing in wings.face_wings(face) {
            let local = wing.edge.local;
            let inside = wings
                .wings_on_edge(local)
                .iter()
                .filter(|&&id| is_selected(wings.wing(id).face))
                .count();
            if inside > 1 {
                continue;
            }
            let (Some(ga), Some(gb)) = (
                mesh.shared.group_of(local.a),
                mesh.shared.group_of(local.b),
            ) else {
                continue;
            };
            rims.push(Rim {
                ga,
                gb,
                pa: mesh.positions[local.a],
                pb: mesh.positions[local.b],
                material,
            });
        }
    }

    for lift in lifts.values_mut() {
        let direction =
            lift.normal
                .try_normalize(f64::EPSILON)
                .ok_or(MeshError::DegenerateGeometry {
                    face: lift.face.index(),
                    details: "selected face normals cancel out at a shared vertex",
                })?;
        lift.offset = direction * distance;
    }

    // The mesh is untouched up to here
    for (&group, lift) in lifts.iter_mut() {
        if lift.members.len() < mesh.shared.group(group).len() {
            if let Some(top) = mesh.shared.split_off(group, &lift.members) {
                lift.top = top;
                lift.bottom = Some(group);
            }
        }
        for &m in &lift.members {
            mesh.positions[m] += lift.offset;
        }
    }

    let mut added = Vec::with_capacity(rims.len());
    for rim in rims {
        let a_bottom = bottom_copy(mesh, &mut lifts, rim.ga, rim.pa);
        let b_bottom = bottom_copy(mesh, &mut lifts, rim.gb, rim.pb);
        let a_top = top_copy(mesh, &lifts, rim.ga, rim.pa);
        let b_top = top_copy(mesh, &lifts, rim.gb, rim.pb);
        added.push(mesh.add_face(side_quad(
            [a_bottom, b_bottom, b_top, a_top],
            rim.material,
        )));
    }
    Ok(added)
}

/// A copy of the old position of `group` for the foot of a side quad.
///
/// Groups lifted as a whole get a fresh group for their feet on first use.
fn bottom_copy<I: MeshIndex>(
    mesh: &mut EditableMesh<I>,
    lifts: &mut BTreeMap<GroupId<I>, Lift<I>>,
    group: GroupId<I>,
    position: Point3<f64>,
) -> usize {
    let Some(lift) = lifts.get_mut(&group) else {
        return mesh.add_position(position);
    };
    match lift.bottom {
        Some(bottom) => mesh.add_shared_position(bottom, position),
        None => {
            let index = mesh.add_position(position);
            lift.bottom = mesh.shared.group_of(index);
            index
        }
    }
}

/// A copy of the lifted position of `group` for the top of a side quad.
fn top_copy<I: MeshIndex>(
    mesh: &mut EditableMesh<I>,
    lifts: &BTreeMap<GroupId<I>, Lift<I>>,
    group: GroupId<I>,
    position: Point3<f64>,
) -> usize {
    match lifts.get(&group) {
        Some(lift) => mesh.add_shared_position(lift.top, position + lift.offset),
        None => mesh.add_position(position),
    }
}

fn side_quad(outline: [usize; 4], material: Option<MaterialId>) -> Face {
    let quad = Face::polygon(&outline);
    match material {
        Some(material) => quad.with_material(material),
        None => quad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::shapes;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn unit_square() -> EditableMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        EditableMesh::new(positions, vec![Face::polygon(&[0, 1, 2, 3])])
    }

    /// Three triangles fanning around edge (0, 1).
    fn fan() -> EditableMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![
            Face::polygon(&[0, 1, 2]),
            Face::polygon(&[1, 0, 3]),
            Face::polygon(&[0, 1, 4]),
        ];
        EditableMesh::new(positions, faces)
    }

    fn face_heights(mesh: &EditableMesh, face: usize) -> Vec<f64> {
        mesh.faces()[face]
            .distinct_indices()
            .iter()
            .map(|&i| mesh.positions()[i].y)
            .collect()
    }

    #[test]
    fn test_direction_points_away_from_center() {
        let mesh = unit_square();
        let dir = extrusion_direction(&mesh, FaceId::new(0), Edge::new(1, 2)).unwrap();
        assert!((dir - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!(extrusion_direction(&mesh, FaceId::new(3), Edge::new(1, 2)).is_none());
    }

    #[test]
    fn test_extrude_edge_geometry_and_topology() {
        let mut mesh = unit_square();
        let options = ExtrudeOptions::default().with_distance(2.0);
        // Reversed input still follows the face winding
        let out = extrude_edge(&mut mesh, FaceId::new(0), Edge::new(2, 1), &options).unwrap();

        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_positions(), 8);
        assert_eq!(mesh.positions()[out.edge.a], Point3::new(3.0, 0.0, 0.0));
        assert_eq!(mesh.positions()[out.edge.b], Point3::new(3.0, 1.0, 0.0));

        let wings = WingedEdgeSet::build(&mesh);
        assert!(wings.rejected().is_empty());
        let source = wings.find_wing(FaceId::new(0), Edge::new(1, 2)).unwrap();
        let opposite = wings.opposite(source).unwrap();
        assert_eq!(wings.wing(opposite).face, out.face);
        // Consistent orientation: the shared edge is walked both ways
        assert!(wings
            .wing(opposite)
            .edge
            .common
            .same_direction(wings.wing(source).edge.common.reversed()));

        let outer = wings.find_wing(out.face, out.edge).unwrap();
        assert_eq!(wings.edge_kind(outer), EdgeKind::Boundary);
    }

    #[test]
    fn test_extrude_inherits_material() {
        let positions = unit_square().positions().to_vec();
        let face = Face::polygon(&[0, 1, 2, 3]).with_material(MaterialId(7));
        let mut mesh = EditableMesh::<u32>::new(positions, vec![face]);

        let out = extrude_edge(
            &mut mesh,
            FaceId::new(0),
            Edge::new(0, 1),
            &ExtrudeOptions::default(),
        )
        .unwrap();
        assert_eq!(mesh.face(out.face).unwrap().material(), Some(MaterialId(7)));
    }

    #[test]
    fn test_manifold_edge_is_refused() {
        let mut mesh: EditableMesh = shapes::plane(2.0, 1.0, 2, 1).unwrap();
        let wings = WingedEdgeSet::build(&mesh);
        let inner = wings
            .edges_of_face(FaceId::new(0))
            .find(|&id| wings.opposite(id).is_some())
            .unwrap();
        let edge = wings.wing(inner).edge.local;

        let result = extrude_edge(&mut mesh, FaceId::new(0), edge, &ExtrudeOptions::default());
        assert!(matches!(result, Err(MeshError::NotAnOpenEdge { face: 0, .. })));
        assert_eq!(mesh.num_faces(), 2);
    }

    #[test]
    fn test_non_manifold_edge_needs_opt_in() {
        let mut mesh = fan();
        let shared = Edge::new(0, 1);

        let refused = extrude_edge(&mut mesh, FaceId::new(0), shared, &ExtrudeOptions::default());
        assert!(matches!(refused, Err(MeshError::NotAnOpenEdge { face: 0, a: 0, b: 1 })));
        assert_eq!(mesh.num_faces(), 3);

        let options = ExtrudeOptions::default().with_allow_non_manifold(true);
        let out = extrude_edge(&mut mesh, FaceId::new(0), shared, &options).unwrap();
        assert_eq!(mesh.num_faces(), 4);

        let wings = WingedEdgeSet::build(&mesh);
        assert_eq!(wings.wings_on_edge(shared).len(), 4);
        let outer = wings.find_wing(out.face, out.edge).unwrap();
        assert_eq!(wings.edge_kind(outer), EdgeKind::Boundary);
    }

    #[test]
    fn test_open_edges_follow_option() {
        let mesh = fan();
        let wings = WingedEdgeSet::build(&mesh);
        let face = FaceId::new(0);
        let shared = wings.find_wing(face, Edge::new(0, 1)).unwrap();

        let strict = open_edges(&wings, face, &ExtrudeOptions::default());
        assert_eq!(strict.len(), 2);
        assert!(!strict.contains(&shared));

        let lenient = open_edges(
            &wings,
            face,
            &ExtrudeOptions::default().with_allow_non_manifold(true),
        );
        assert_eq!(lenient.len(), 3);
        assert!(lenient.contains(&shared));
    }

    #[test]
    fn test_random_edge_reaches_non_manifold_only_with_opt_in() {
        let shared = Edge::new(0, 1);
        let lenient = ExtrudeOptions::default().with_allow_non_manifold(true);
        let mut reached = false;

        for seed in 0..64 {
            let mut mesh = fan();
            let mut rng = SmallRng::seed_from_u64(seed);
            extrude_random_edge(&mut mesh, FaceId::new(0), &mut rng, &ExtrudeOptions::default())
                .unwrap()
                .unwrap();
            assert_eq!(WingedEdgeSet::build(&mesh).wings_on_edge(shared).len(), 3);

            let mut mesh = fan();
            let mut rng = SmallRng::seed_from_u64(seed);
            extrude_random_edge(&mut mesh, FaceId::new(0), &mut rng, &lenient)
                .unwrap()
                .unwrap();
            reached |= WingedEdgeSet::build(&mesh).wings_on_edge(shared).len() == 4;
        }
        assert!(reached);
    }

    #[test]
    fn test_unknown_edge_and_face() {
        let mut mesh = unit_square();
        let options = ExtrudeOptions::default();
        assert!(matches!(
            extrude_edge(&mut mesh, FaceId::new(0), Edge::new(0, 2), &options),
            Err(MeshError::NotAnOpenEdge { .. })
        ));
        assert!(matches!(
            extrude_edge(&mut mesh, FaceId::new(5), Edge::new(0, 1), &options),
            Err(MeshError::InvalidFaceId { face: 5, count: 1 })
        ));
        assert!(extrude_edge(
            &mut mesh,
            FaceId::new(0),
            Edge::new(0, 1),
            &options.clone().with_distance(f64::NAN)
        )
        .is_err());
    }

    #[test]
    fn test_random_snake() {
        let mut mesh: EditableMesh = shapes::plane(1.0, 1.0, 1, 1).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let options = ExtrudeOptions::default();

        let mut last = FaceId::new(0);
        for step in 1..=6 {
            let out = extrude_random_edge(&mut mesh, last, &mut rng, &options)
                .unwrap()
                .unwrap();
            assert_eq!(mesh.num_faces(), step + 1);

            let wings = WingedEdgeSet::build(&mesh);
            assert!(wings.rejected().is_empty());
            assert!(wings.adjacent_faces(last).contains(&out.face));
            assert_eq!(wings.count_edges(EdgeKind::NonManifold), 0);
            last = out.face;
        }
    }

    #[test]
    fn test_random_on_closed_mesh_is_none() {
        let mut mesh: EditableMesh = shapes::cube(1.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let out = extrude_random_edge(&mut mesh, FaceId::new(0), &mut rng, &ExtrudeOptions::default())
            .unwrap();
        assert!(out.is_none());
        assert_eq!(mesh.num_faces(), 6);
    }

    #[test]
    fn test_extrude_single_face() {
        let positions = unit_square().positions().to_vec();
        let face = Face::polygon(&[0, 1, 2, 3]).with_material(MaterialId(3));
        let mut mesh = EditableMesh::<u32>::new(positions, vec![face]);

        let sides = extrude_faces(&mut mesh, &[FaceId::new(0)], &ExtrudeOptions::default()).unwrap();
        assert_eq!(sides.len(), 4);
        assert_eq!(mesh.num_faces(), 5);
        assert_eq!(mesh.num_positions(), 4 + 4 * 4);

        // Lifted along +Z
        for &i in mesh.faces()[0].distinct_indices() {
            assert!((mesh.positions()[i].z - 1.0).abs() < 1e-12);
        }
        for &side in &sides {
            assert_eq!(mesh.face(side).unwrap().material(), Some(MaterialId(3)));
        }

        let wings = WingedEdgeSet::build(&mesh);
        assert!(wings.rejected().is_empty());
        assert!(wings.boundary_edges(FaceId::new(0)).is_empty());
        assert_eq!(wings.adjacent_faces(FaceId::new(0)), sides);
        assert_eq!(wings.count_edges(EdgeKind::Boundary), 4);
        assert_eq!(wings.count_edges(EdgeKind::Manifold), 8);
    }

    #[test]
    fn test_extrude_faces_grouped() {
        let mut mesh: EditableMesh = shapes::plane(2.0, 1.0, 2, 1).unwrap();
        let options = ExtrudeOptions::default().with_method(ExtrudeMethod::Grouped);
        let both = [FaceId::new(0), FaceId::new(1)];

        let sides = extrude_faces(&mut mesh, &both, &options).unwrap();
        assert_eq!(sides.len(), 6);
        assert!(face_heights(&mesh, 0).iter().all(|&y| (y - 1.0).abs() < 1e-12));
        assert!(face_heights(&mesh, 1).iter().all(|&y| (y - 1.0).abs() < 1e-12));

        let wings = WingedEdgeSet::build(&mesh);
        assert!(wings.rejected().is_empty());
        assert!(wings.adjacent_faces(FaceId::new(0)).contains(&FaceId::new(1)));
        assert_eq!(wings.count_edges(EdgeKind::Boundary), 6);
        assert_eq!(wings.count_edges(EdgeKind::Manifold), 13);
        assert_eq!(wings.count_edges(EdgeKind::NonManifold), 0);
    }

    #[test]
    fn test_extrude_part_of_a_plane() {
        let mut mesh: EditableMesh = shapes::plane(2.0, 1.0, 2, 1).unwrap();
        let options = ExtrudeOptions::default().with_method(ExtrudeMethod::Grouped);

        let sides = extrude_faces(&mut mesh, &[FaceId::new(0)], &options).unwrap();
        assert_eq!(sides.len(), 4);
        assert!(face_heights(&mesh, 0).iter().all(|&y| (y - 1.0).abs() < 1e-12));
        assert!(face_heights(&mesh, 1).iter().all(|&y| y == 0.0));

        // The neighbour now borders a side quad instead of the lifted face
        let wings = WingedEdgeSet::build(&mesh);
        let neighbours = wings.adjacent_faces(FaceId::new(1));
        assert_eq!(neighbours.len(), 1);
        assert!(sides.contains(&neighbours[0]));
        assert_eq!(wings.count_edges(EdgeKind::Boundary), 6);
        assert_eq!(wings.count_edges(EdgeKind::NonManifold), 0);
    }

    #[test]
    fn test_extrude_individual_neighbours() {
        let mut mesh: EditableMesh = shapes::plane(2.0, 1.0, 2, 1).unwrap();
        let both = [FaceId::new(0), FaceId::new(1)];

        let sides = extrude_faces(&mut mesh, &both, &ExtrudeOptions::default()).unwrap();
        assert_eq!(sides.len(), 8);
        assert_eq!(mesh.num_faces(), 10);

        // Back-to-back side quads between the two lifted faces
        let wings = WingedEdgeSet::build(&mesh);
        assert!(wings.rejected().is_empty());
        assert!(!wings.adjacent_faces(FaceId::new(0)).contains(&FaceId::new(1)));
        assert_eq!(wings.count_edges(EdgeKind::Boundary), 6);
        assert_eq!(wings.count_edges(EdgeKind::NonManifold), 0);
    }

    #[test]
    fn test_extrude_faces_errors_leave_mesh_alone() {
        let mut mesh = unit_square();
        let options = ExtrudeOptions::default();

        assert_eq!(
            extrude_faces(&mut mesh, &[FaceId::new(4)], &options).unwrap_err(),
            MeshError::InvalidFaceId { face: 4, count: 1 }
        );
        assert!(extrude_faces(&mut mesh, &[], &options).unwrap().is_empty());

        let broken = mesh.add_face(Face::polygon(&[0, 1, 1]));
        assert!(matches!(
            extrude_faces(&mut mesh, &[FaceId::new(0), broken], &options),
            Err(MeshError::MalformedFace { face: 1, .. })
        ));

        let n = mesh.add_position(Point3::new(2.0, 0.0, 0.0));
        let flat = mesh.add_face(Face::polygon(&[0, 1, n]));
        assert!(matches!(
            extrude_faces(&mut mesh, &[flat], &options),
            Err(MeshError::DegenerateGeometry { face: 2, .. })
        ));

        assert!(matches!(
            extrude_faces(
                &mut mesh,
                &[FaceId::new(0)],
                &options.clone().with_distance(f64::INFINITY)
            ),
            Err(MeshError::InvalidParameter { name: "distance", .. })
        ));

        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_positions(), 5);
        assert_eq!(mesh.positions()[0], Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_grouped_opposite_normals_cancel() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![Face::polygon(&[0, 1, 2]), Face::polygon(&[0, 2, 1])];
        let mut mesh = EditableMesh::<u32>::new(positions, faces);

        let options = ExtrudeOptions::default().with_method(ExtrudeMethod::Grouped);
        let result = extrude_faces(&mut mesh, &[FaceId::new(0), FaceId::new(1)], &options);
        assert!(matches!(result, Err(MeshError::DegenerateGeometry { face: 0, .. })));
        assert_eq!(mesh.num_positions(), 3);
    }
}
