//! Edges between raw position indices.

use std::hash::{Hash, Hasher};

/// An unordered pair of position indices.
///
/// The endpoints keep the order they were created with, because face
/// winding matters to callers, but equality and hashing ignore it:
/// `Edge::new(1, 2) == Edge::new(2, 1)`.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// First endpoint.
    pub a: usize,
    /// Second endpoint.
    pub b: usize,
}

impl Edge {
    /// Create an edge from `a` to `b`.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// The same edge walked the other way.
    #[inline]
    pub fn reversed(self) -> Self {
        Self { a: self.b, b: self.a }
    }

    /// The edge with its smaller endpoint first.
    #[inline]
    pub fn normalized(self) -> Self {
        if self.a <= self.b {
            self
        } else {
            self.reversed()
        }
    }

    /// Whether both endpoints are the same index.
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self.a == self.b
    }

    /// Whether `index` is one of the endpoints.
    #[inline]
    pub fn contains(self, index: usize) -> bool {
        self.a == index || self.b == index
    }

    /// The endpoint opposite `index`, or `None` if `index` is not on this edge.
    pub fn other(self, index: usize) -> Option<usize> {
        if self.a == index {
            Some(self.b)
        } else if self.b == index {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether the two edges have the same endpoints in the same order.
    #[inline]
    pub fn same_direction(self, other: Edge) -> bool {
        self.a == other.a && self.b == other.b
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalized();
        n.a.hash(state);
        n.b.hash(state);
    }
}

impl From<(usize, usize)> for Edge {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

/// A raw edge paired with its canonical form.
///
/// `local` holds the position indices as the face stores them. `common`
/// holds the shared-vertex group indices of those positions, so two
/// lookups describe the same topological edge exactly when their
/// `common` edges are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLookup {
    /// The edge in raw position indices, in face winding order.
    pub local: Edge,
    /// The edge in shared-vertex group indices.
    pub common: Edge,
}

impl EdgeLookup {
    /// Pair a raw edge with its canonical form.
    pub fn new(local: Edge, common: Edge) -> Self {
        Self { local, common }
    }
}
