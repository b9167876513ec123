//! Polygon faces stored as triangle lists.

use std::collections::HashMap;

use super::edge::Edge;
use crate::error::FaceDefect;

/// Opaque handle to a material owned by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// A face of an editable mesh.
///
/// The face is stored as a flat triangle list into the mesh's position
/// array, e.g. a quad is `[0, 1, 2, 0, 2, 3]`. Its polygon outline is
/// recovered by [`Face::boundary`].
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    indices: Vec<usize>,
    /// Unique entries of `indices`, in order of first appearance.
    distinct: Vec<usize>,
    material: Option<MaterialId>,
    manual_uv: bool,
}

impl Face {
    /// Create a face from a flat triangle index list.
    ///
    /// No validation happens here; a malformed face is reported when a
    /// topology view is built over it.
    pub fn from_triangles(indices: Vec<usize>) -> Self {
        let mut distinct = Vec::with_capacity(indices.len());
        for &i in &indices {
            if !distinct.contains(&i) {
                distinct.push(i);
            }
        }
        Self {
            indices,
            distinct,
            material: None,
            manual_uv: false,
        }
    }

    /// Create a face from a polygon outline by fan triangulation.
    ///
    /// The boundary of the resulting face walks `outline` in order.
    pub fn polygon(outline: &[usize]) -> Self {
        if outline.len() < 3 {
            return Self::from_triangles(outline.to_vec());
        }
        let mut indices = Vec::with_capacity((outline.len() - 2) * 3);
        for i in 1..outline.len() - 1 {
            indices.extend_from_slice(&[outline[0], outline[i], outline[i + 1]]);
        }
        Self::from_triangles(indices)
    }

    /// Set the material.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Mark the face's UVs as manually authored.
    pub fn with_manual_uv(mut self, manual_uv: bool) -> Self {
        self.manual_uv = manual_uv;
        self
    }

    /// The flat triangle index list.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Each position index used by the face, once.
    #[inline]
    pub fn distinct_indices(&self) -> &[usize] {
        &self.distinct
    }

    /// Number of whole triangles in the index list.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The face's material, if any.
    #[inline]
    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Whether UVs were authored by hand rather than projected.
    #[inline]
    pub fn manual_uv(&self) -> bool {
        self.manual_uv
    }

    /// Whether the face references position `index`.
    pub fn contains_index(&self, index: usize) -> bool {
        self.distinct.contains(&index)
    }

    /// Walk the face outline.
    ///
    /// Perimeter edges are the triangle edges used exactly once within the
    /// face. They are returned as one directed loop that starts with the
    /// first perimeter edge in triangle order, so the endpoints follow the
    /// face winding: `Face::polygon(&[0, 1, 2, 3])` yields
    /// `(0,1), (1,2), (2,3), (3,0)`.
    pub fn boundary(&self) -> Result<Vec<Edge>, FaceDefect> {
        if self.indices.is_empty() {
            return Err(FaceDefect::EmptyTriangleList);
        }
        if self.indices.len() % 3 != 0 {
            return Err(FaceDefect::RaggedTriangleList {
                len: self.indices.len(),
            });
        }
        if self.distinct.len() < 3 {
            return Err(FaceDefect::TooFewIndices {
                distinct: self.distinct.len(),
            });
        }

        let mut directed = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            for k in 0..3 {
                let edge = Edge::new(tri[k], tri[(k + 1) % 3]);
                if edge.is_degenerate() {
                    return Err(FaceDefect::DegenerateEdge {
                        a: edge.a,
                        b: edge.b,
                    });
                }
                directed.push(edge);
            }
        }

        let mut uses: HashMap<Edge, usize> = HashMap::with_capacity(directed.len());
        for &edge in &directed {
            *uses.entry(edge).or_insert(0) += 1;
        }
        let perimeter: Vec<Edge> = directed.into_iter().filter(|e| uses[e] == 1).collect();

        chain_loop(&perimeter).ok_or(FaceDefect::OpenBoundary)
    }
}

/// Order directed edges into a single closed loop, starting at `edges[0]`.
fn chain_loop(edges: &[Edge]) -> Option<Vec<Edge>> {
    let first = *edges.first()?;

    let mut by_start: HashMap<usize, Vec<usize>> = HashMap::with_capacity(edges.len());
    for (i, e) in edges.iter().enumerate() {
        by_start.entry(e.a).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    used[0] = true;
    let mut out = Vec::with_capacity(edges.len());
    out.push(first);

    while out.len() < edges.len() {
        let end = out[out.len() - 1].b;
        if end == first.a {
            // Closed before consuming every perimeter edge: more than one loop.
            return None;
        }
        let next = by_start
            .get(&end)?
            .iter()
            .copied()
            .find(|&i| !used[i])?;
        used[next] = true;
        out.push(edges[next]);
    }

    if out[out.len() - 1].b == first.a {
        Some(out)
    } else {
        None
    }
}
