//! Conversion of generic triangle meshes into editable meshes.
//!
//! Render meshes share vertices freely between triangles. Editable meshes
//! give every face its own copies instead and remember which copies belong
//! together, so the import splits positions per face and records the
//! original vertex of each copy as its shared group.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::editable::EditableMesh;
use super::face::Face;
use super::index::MeshIndex;
use super::shared::SharedVertices;
use crate::error::{FaceDefect, MeshError, Result};

/// Minimum cosine between the normals of two triangles merged into a quad.
const QUAD_COPLANAR_COS: f64 = 0.9995;

/// Settings for [`import_triangles`].
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// Merge consecutive coplanar triangle pairs that share an edge into quads.
    pub quads: bool,

    /// Also treat source vertices within this distance as one vertex, grouped
    /// the way [`SharedVertices::weld`] groups them.
    pub weld_distance: Option<f64>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            quads: true,
            weld_distance: None,
        }
    }
}

impl ImportSettings {
    /// Set whether triangle pairs are merged into quads.
    pub fn with_quads(mut self, quads: bool) -> Self {
        self.quads = quads;
        self
    }

    /// Weld source vertices that fall within `distance` of each other.
    pub fn with_weld_distance(mut self, distance: f64) -> Self {
        self.weld_distance = Some(distance);
        self
    }
}

/// Convert an indexed triangle mesh into an [`EditableMesh`].
///
/// # Errors
/// - [`MeshError::MalformedFace`] if `triangles` is not a multiple of 3 long
/// - [`MeshError::InvalidVertexIndex`] if a triangle references a missing position
/// - [`MeshError::InvalidParameter`] for a non-positive weld distance
///
/// # Example
/// ```
/// use wingmesh::mesh::{import_triangles, EditableMesh, ImportSettings};
/// use wingmesh::nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let triangles = [0, 1, 2, 2, 3, 0];
///
/// let mesh: EditableMesh =
///     import_triangles(&positions, &triangles, &ImportSettings::default()).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn import_triangles<I: MeshIndex>(
    positions: &[Point3<f64>],
    triangles: &[usize],
    settings: &ImportSettings,
) -> Result<EditableMesh<I>> {
    if triangles.len() % 3 != 0 {
        return Err(MeshError::MalformedFace {
            face: triangles.len() / 3,
            defect: FaceDefect::RaggedTriangleList {
                len: triangles.len(),
            },
        });
    }
    if let Some(&vertex) = triangles.iter().find(|&&i| i >= positions.len()) {
        return Err(MeshError::InvalidVertexIndex {
            vertex,
            count: positions.len(),
        });
    }

    let source: SharedVertices<I> = match settings.weld_distance {
        Some(distance) => SharedVertices::weld(positions, distance)?,
        None => SharedVertices::identity(positions.len()),
    };
    let group_of = |i: usize| source.group_of(i).map_or(i, |g| g.index());

    let tris: Vec<[usize; 3]> = triangles
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    // Source triangle lists, one per output face
    let mut face_sources: Vec<Vec<usize>> = Vec::with_capacity(tris.len());
    let mut t = 0;
    while t < tris.len() {
        if settings.quads
            && t + 1 < tris.len()
            && mergeable(positions, &tris[t], &tris[t + 1], &group_of)
        {
            let mut both = tris[t].to_vec();
            both.extend_from_slice(&tris[t + 1]);
            face_sources.push(both);
            t += 2;
        } else {
            face_sources.push(tris[t].to_vec());
            t += 1;
        }
    }

    let mut out_positions = Vec::with_capacity(triangles.len());
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); source.len()];
    let mut faces = Vec::with_capacity(face_sources.len());

    for src in &face_sources {
        // One copy per source vertex (after welding) per face
        let mut copies: HashMap<usize, usize> = HashMap::with_capacity(src.len());
        let indices = src
            .iter()
            .map(|&s| {
                let group = group_of(s);
                *copies.entry(group).or_insert_with(|| {
                    let index = out_positions.len();
                    out_positions.push(positions[s]);
                    groups[group].push(index);
                    index
                })
            })
            .collect();
        faces.push(Face::from_triangles(indices));
    }

    log::debug!(
        "imported {} triangles as {} faces over {} positions",
        tris.len(),
        faces.len(),
        out_positions.len()
    );

    let shared = SharedVertices::from_groups(groups, out_positions.len())?;
    EditableMesh::with_shared(out_positions, faces, shared)
}

/// Whether two triangles form a flat quad: they share exactly one edge,
/// walked in opposite directions, and their normals agree.
fn mergeable(
    positions: &[Point3<f64>],
    a: &[usize; 3],
    b: &[usize; 3],
    group_of: &impl Fn(usize) -> usize,
) -> bool {
    let ga = a.map(group_of);
    let gb = b.map(group_of);

    let mut shared = 0;
    for k in 0..3 {
        let (a0, a1) = (ga[k], ga[(k + 1) % 3]);
        if a0 == a1 {
            return false;
        }
        for m in 0..3 {
            let (b0, b1) = (gb[m], gb[(m + 1) % 3]);
            if b0 == b1 {
                return false;
            }
            if a0 == b1 && a1 == b0 {
                shared += 1;
            } else if a0 == b0 && a1 == b1 {
                // Same direction: the pair is wound inconsistently
                return false;
            }
        }
    }
    if shared != 1 {
        return false;
    }

    match (normal(positions, a), normal(positions, b)) {
        (Some(na), Some(nb)) => na.dot(&nb) >= QUAD_COPLANAR_COS,
        _ => false,
    }
}

fn normal(positions: &[Point3<f64>], t: &[usize; 3]) -> Option<Vector3<f64>> {
    let [p0, p1, p2] = t.map(|i| positions[i]);
    (p1 - p0).cross(&(p2 - p0)).try_normalize(f64::EPSILON)
}
