//! Shared-vertex grouping.
//!
//! Editable meshes give every face its own copies of the positions it uses,
//! so two faces that touch in space usually reference different raw indices.
//! A [`SharedVertices`] partition records which raw indices are the same
//! topological vertex. Every index in `0..position_count` belongs to exactly
//! one group.

use std::collections::HashMap;

use nalgebra::Point3;

use super::index::{GroupId, MeshIndex};
use crate::error::{MeshError, Result};

/// A partition of position indices into groups of coincident vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedVertices<I: MeshIndex = u32> {
    groups: Vec<Vec<usize>>,
    /// Group of each position index.
    lookup: Vec<GroupId<I>>,
}

impl<I: MeshIndex> Default for SharedVertices<I> {
    fn default() -> Self {
        Self::identity(0)
    }
}

impl<I: MeshIndex> SharedVertices<I> {
    /// Every index in `0..count` in a group of its own.
    pub fn identity(count: usize) -> Self {
        Self {
            groups: (0..count).map(|i| vec![i]).collect(),
            lookup: (0..count).map(GroupId::new).collect(),
        }
    }

    /// Build a grouping from explicit groups over `count` positions.
    ///
    /// Indices not mentioned in any group get a singleton group, appended
    /// after the explicit ones. Empty groups are dropped.
    ///
    /// # Errors
    /// Returns [`MeshError::InvalidVertexIndex`] for an index outside
    /// `0..count` and [`MeshError::InvalidSharedGroups`] for an index that
    /// appears more than once.
    pub fn from_groups(groups: Vec<Vec<usize>>, count: usize) -> Result<Self> {
        let mut lookup = vec![GroupId::invalid(); count];
        let mut out: Vec<Vec<usize>> = Vec::with_capacity(groups.len());

        for group in groups.into_iter().filter(|g| !g.is_empty()) {
            let id = GroupId::new(out.len());
            for &index in &group {
                let slot = lookup.get_mut(index).ok_or(MeshError::InvalidVertexIndex {
                    vertex: index,
                    count,
                })?;
                if slot.is_valid() {
                    return Err(MeshError::InvalidSharedGroups(format!(
                        "index {} appears in more than one group",
                        index
                    )));
                }
                *slot = id;
            }
            out.push(group);
        }

        for (index, slot) in lookup.iter_mut().enumerate() {
            if !slot.is_valid() {
                *slot = GroupId::new(out.len());
                out.push(vec![index]);
            }
        }

        Ok(Self { groups: out, lookup })
    }

    /// Group positions that lie within `epsilon` of each other.
    ///
    /// Positions are bucketed into `epsilon`-sized grid cells and each one
    /// joins the first earlier group whose first member lies within
    /// `epsilon`, searching its own and the neighbouring cells. Positions
    /// with a non-finite coordinate stay in groups of their own.
    ///
    /// # Errors
    /// Returns [`MeshError::InvalidParameter`] unless `epsilon` is finite and
    /// positive, or if a coordinate is too large for a cell of that size.
    pub fn weld(positions: &[Point3<f64>], epsilon: f64) -> Result<Self> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(MeshError::invalid_param(
                "epsilon",
                epsilon,
                "must be finite and positive",
            ));
        }

        let mut cells: HashMap<[i64; 3], Vec<usize>> = HashMap::with_capacity(positions.len());
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for (index, p) in positions.iter().enumerate() {
            let key = match weld_cell(p, epsilon)? {
                Some(key) => key,
                None => {
                    groups.push(vec![index]);
                    continue;
                }
            };

            let found = neighbour_cells(key)
                .filter_map(|cell| cells.get(&cell))
                .flatten()
                .copied()
                .find(|&g| (positions[groups[g][0]] - *p).norm() <= epsilon);

            match found {
                Some(g) => groups[g].push(index),
                None => {
                    cells.entry(key).or_default().push(groups.len());
                    groups.push(vec![index]);
                }
            }
        }

        let lookup = {
            let mut lookup = vec![GroupId::invalid(); positions.len()];
            for (gi, group) in groups.iter().enumerate() {
                for &index in group {
                    lookup[index] = GroupId::new(gi);
                }
            }
            lookup
        };

        log::debug!(
            "welded {} positions into {} shared groups",
            positions.len(),
            groups.len()
        );

        Ok(Self { groups, lookup })
    }

    /// Number of groups.
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups (and therefore no positions).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of position indices covered.
    #[inline]
    pub fn position_count(&self) -> usize {
        self.lookup.len()
    }

    /// The group holding `index`, or `None` if `index` is out of range.
    #[inline]
    pub fn group_of(&self, index: usize) -> Option<GroupId<I>> {
        self.lookup.get(index).copied()
    }

    /// Members of a group.
    ///
    /// # Panics
    /// Panics if `id` does not name a group.
    #[inline]
    pub fn group(&self, id: GroupId<I>) -> &[usize] {
        &self.groups[id.index()]
    }

    /// Iterate over all groups with their ids.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId<I>, &[usize])> + '_ {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (GroupId::new(i), g.as_slice()))
    }

    /// Whether two position indices are the same topological vertex.
    pub fn coincident(&self, a: usize, b: usize) -> bool {
        match (self.group_of(a), self.group_of(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }

    /// Register one more position in a new group of its own.
    ///
    /// Returns the new position index and its group.
    pub fn push_singleton(&mut self) -> (usize, GroupId<I>) {
        let index = self.lookup.len();
        let id = GroupId::new(self.groups.len());
        self.groups.push(vec![index]);
        self.lookup.push(id);
        (index, id)
    }

    /// Register one more position as a member of an existing group.
    ///
    /// # Panics
    /// Panics if `id` does not name a group.
    pub fn push_into(&mut self, id: GroupId<I>) -> usize {
        let index = self.lookup.len();
        self.groups[id.index()].push(index);
        self.lookup.push(id);
        index
    }

    /// Move `members` out of `group` into a new group of their own.
    ///
    /// Returns `None` and leaves the grouping unchanged if a member is not
    /// in `group`, or if either group would end up empty.
    pub fn split_off(&mut self, group: GroupId<I>, members: &[usize]) -> Option<GroupId<I>> {
        let current = self.groups.get(group.index())?;
        if members.is_empty() || members.iter().any(|&m| self.group_of(m) != Some(group)) {
            return None;
        }
        let kept: Vec<usize> = current
            .iter()
            .copied()
            .filter(|m| !members.contains(m))
            .collect();
        if kept.is_empty() {
            return None;
        }

        let id = GroupId::new(self.groups.len());
        let mut moved = members.to_vec();
        moved.sort_unstable();
        moved.dedup();
        for &m in &moved {
            self.lookup[m] = id;
        }
        self.groups[group.index()] = kept;
        self.groups.push(moved);
        Some(id)
    }
}

/// Largest cell coordinate a weld accepts; leaves room for the neighbour search.
const MAX_CELL: f64 = (1u64 << 62) as f64;

/// Grid cell of `p`, or `None` for a non-finite position.
fn weld_cell(p: &Point3<f64>, epsilon: f64) -> Result<Option<[i64; 3]>> {
    if !p.coords.iter().all(|c| c.is_finite()) {
        return Ok(None);
    }
    let mut key = [0i64; 3];
    for (slot, &c) in key.iter_mut().zip(p.coords.iter()) {
        let q = (c / epsilon).round();
        if q.abs() >= MAX_CELL {
            return Err(MeshError::invalid_param(
                "epsilon",
                epsilon,
                "too small for the extent of the positions",
            ));
        }
        *slot = q as i64;
    }
    Ok(Some(key))
}

fn neighbour_cells(key: [i64; 3]) -> impl Iterator<Item = [i64; 3]> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).map(move |dz| [key[0] + dx, key[1] + dy, key[2] + dz])
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let shared = SharedVertices::<u32>::identity(3);
        assert_eq!(shared.len(), 3);
        assert_eq!(shared.group_of(2), Some(GroupId::new(2)));
        assert_eq!(shared.group_of(3), None);
        assert!(!shared.coincident(0, 1));
    }

    #[test]
    fn test_from_groups_fills_singletons() {
        let shared = SharedVertices::<u32>::from_groups(vec![vec![0, 3], vec![]], 4).unwrap();
        assert_eq!(shared.len(), 3);
        assert!(shared.coincident(0, 3));
        assert!(!shared.coincident(1, 2));
        assert_eq!(shared.group(GroupId::new(0)), &[0, 3]);
        assert_eq!(shared.group(GroupId::new(1)), &[1]);
        assert_eq!(shared.group(GroupId::new(2)), &[2]);
    }

    #[test]
    fn test_from_groups_rejects_duplicates() {
        let result = SharedVertices::<u32>::from_groups(vec![vec![0, 1], vec![1, 2]], 3);
        assert!(matches!(result, Err(MeshError::InvalidSharedGroups(_))));
    }

    #[test]
    fn test_from_groups_rejects_out_of_range() {
        let result = SharedVertices::<u32>::from_groups(vec![vec![0, 5]], 3);
        assert_eq!(
            result,
            Err(MeshError::InvalidVertexIndex { vertex: 5, count: 3 })
        );
    }

    #[test]
    fn test_weld_coincident_positions() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1e-7),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let shared = SharedVertices::<u32>::weld(&positions, 1e-4).unwrap();
        assert_eq!(shared.len(), 2);
        assert!(shared.coincident(0, 2));
        assert!(shared.coincident(1, 3));
        assert!(!shared.coincident(0, 1));
    }

    #[test]
    fn test_weld_across_cell_boundary() {
        // Both sides of the rounding boundary at 0.5 * epsilon
        let positions = vec![
            Point3::new(0.0005 - 1e-8, 0.0, 0.0),
            Point3::new(0.0005 + 1e-8, 0.0, 0.0),
            Point3::new(0.0025, 0.0, 0.0),
        ];
        let shared = SharedVertices::<u32>::weld(&positions, 1e-3).unwrap();
        assert!(shared.coincident(0, 1));
        assert!(!shared.coincident(0, 2));
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_weld_keeps_non_finite_apart() {
        let positions = vec![
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(f64::INFINITY, 0.0, 0.0),
        ];
        let shared = SharedVertices::<u32>::weld(&positions, 1e-5).unwrap();
        assert_eq!(shared.len(), 4);
        assert!(!shared.coincident(0, 1));
        assert!(!shared.coincident(0, 2));
    }

    #[test]
    fn test_weld_rejects_huge_coordinates() {
        let positions = vec![Point3::new(1e300, 0.0, 0.0), Point3::new(2e300, 0.0, 0.0)];
        assert!(matches!(
            SharedVertices::<u32>::weld(&positions, 1e-5),
            Err(MeshError::InvalidParameter { name: "epsilon", .. })
        ));

        // A coarse enough grid handles the same points
        let shared = SharedVertices::<u32>::weld(&positions, 1e290).unwrap();
        assert!(!shared.coincident(0, 1));
    }

    #[test]
    fn test_weld_rejects_bad_epsilon() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0)];
        assert!(SharedVertices::<u32>::weld(&positions, 0.0).is_err());
        assert!(SharedVertices::<u32>::weld(&positions, f64::NAN).is_err());
    }

    #[test]
    fn test_push() {
        let mut shared = SharedVertices::<u32>::identity(2);
        let (index, group) = shared.push_singleton();
        assert_eq!(index, 2);
        assert_eq!(group.index(), 2);

        let joined = shared.push_into(GroupId::new(0));
        assert_eq!(joined, 3);
        assert!(shared.coincident(0, 3));
        assert_eq!(shared.position_count(), 4);
    }

    #[test]
    fn test_split_off() {
        let mut shared = SharedVertices::<u32>::from_groups(vec![vec![0, 1, 2]], 4).unwrap();
        let g = shared.group_of(0).unwrap();

        let moved = shared.split_off(g, &[1, 2]).unwrap();
        assert_eq!(shared.group(g), &[0]);
        assert_eq!(shared.group(moved), &[1, 2]);
        assert!(shared.coincident(1, 2));
        assert!(!shared.coincident(0, 1));

        // Would empty the group, or names a foreign member
        assert_eq!(shared.split_off(g, &[0]), None);
        assert_eq!(shared.split_off(g, &[3]), None);
        assert_eq!(shared.group(g), &[0]);
    }
}
