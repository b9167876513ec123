//! Index types for mesh elements.
//!
//! Faces, winged-edge records, and shared-vertex groups are addressed through
//! type-safe wrappers so one kind of id can never be passed where another is
//! expected. The wrappers are generic over the underlying integer type; `u32`
//! is the default.
//!
//! Raw position indices stay plain `usize`, since they come straight from the
//! host mesh's index buffers.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for types that can be used as mesh indices.
///
/// Implemented for `u16`, `u32`, and `u64`.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The largest usable index; ids run from 0 to `MAX` inclusive.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl MeshIndex for u16 {
    const MAX: Self = u16::MAX - 1;
    const INVALID: Self = u16::MAX;

    #[inline]
    fn from_usize(v: usize) -> Self {
        debug_assert!(v <= Self::MAX as usize, "index {} too large for u16", v);
        v as u16
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl MeshIndex for u32 {
    const MAX: Self = u32::MAX - 1;
    const INVALID: Self = u32::MAX;

    #[inline]
    fn from_usize(v: usize) -> Self {
        debug_assert!(v <= Self::MAX as usize, "index {} too large for u32", v);
        v as u32
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl MeshIndex for u64 {
    const MAX: Self = u64::MAX - 1;
    const INVALID: Self = u64::MAX;

    #[inline]
    fn from_usize(v: usize) -> Self {
        v as u64
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe winged-edge record index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct WingId<I: MeshIndex = u32>(I);

/// A type-safe shared-vertex group index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct GroupId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }
    };
}

impl_index_type!(FaceId, "F");
impl_index_type!(WingId, "W");
impl_index_type!(GroupId, "G");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_id() {
        let f: FaceId = FaceId::new(42);
        assert_eq!(f.index(), 42);
        assert!(f.is_valid());

        let invalid: FaceId = FaceId::invalid();
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_small_indices() {
        let w: WingId<u16> = WingId::new(1000);
        assert_eq!(w.index(), 1000);

        let last: WingId<u16> = WingId::new(65534);
        assert!(last.is_valid());
        assert_eq!(<u16 as MeshIndex>::MAX.to_usize(), 65534);
    }

    #[test]
    fn test_debug_format() {
        let g: GroupId = GroupId::new(7);
        assert_eq!(format!("{:?}", g), "G(7)");

        let invalid: WingId = WingId::invalid();
        assert_eq!(format!("{:?}", invalid), "W(INVALID)");
    }
}
