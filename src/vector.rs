//! GrowVec: index-addressed growable array of opaque handles.
//!
//! The array stores handles but never owns what they refer to: dropping a
//! `GrowVec` releases its backing storage only. Capacity is tracked
//! explicitly, only ever doubles, and each doubling is checked against the
//! addressable size before any allocation happens.

use crate::error::{vec_oom, VecError};

/// Capacity used by [`GrowVec::new_default`].
pub const DEFAULT_CAPACITY: usize = 32;

const GROWTH_MULTIPLIER: usize = 2;

#[derive(Debug, Clone)]
pub struct GrowVec<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> GrowVec<T> {
    /// Allocate an empty array able to hold `capacity` handles before growing.
    pub fn new(capacity: usize) -> Result<Self, VecError> {
        check_bytes::<T>(capacity)?;
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|e| vec_oom(capacity, e))?;
        Ok(Self { items, capacity })
    }

    pub fn new_default() -> Result<Self, VecError> {
        Self::new(DEFAULT_CAPACITY)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Result<&T, VecError> {
        let len = self.items.len();
        self.items
            .get(index)
            .ok_or(VecError::OutOfBounds { index, len })
    }

    /// Overwrite slot `index`; only live slots (`index < len`) are addressable.
    pub fn set(&mut self, index: usize, handle: T) -> Result<(), VecError> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(VecError::OutOfBounds { index, len })?;
        *slot = handle;
        Ok(())
    }

    /// Push `handle` at position `len`, doubling capacity first when full.
    ///
    /// On error the array is unchanged.
    pub fn append(&mut self, handle: T) -> Result<(), VecError> {
        if self.items.len() == self.capacity {
            self.grow()?;
        }
        self.items.push(handle);
        Ok(())
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn grow(&mut self) -> Result<(), VecError> {
        let new_capacity = self
            .capacity
            .max(1)
            .checked_mul(GROWTH_MULTIPLIER)
            .ok_or(VecError::CapacityOverflow {
                capacity: self.capacity,
            })?;
        check_bytes::<T>(new_capacity).map_err(|_| VecError::CapacityOverflow {
            capacity: self.capacity,
        })?;
        let additional = new_capacity - self.items.len();
        self.items
            .try_reserve_exact(additional)
            .map_err(|e| vec_oom(new_capacity, e))?;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a GrowVec<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// Allocations larger than isize::MAX bytes are never valid.
fn check_bytes<T>(slots: usize) -> Result<(), VecError> {
    let bytes = slots
        .checked_mul(core::mem::size_of::<T>())
        .ok_or(VecError::CapacityOverflow { capacity: slots })?;
    if bytes > isize::MAX as usize {
        return Err(VecError::CapacityOverflow { capacity: slots });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty_with_requested_capacity() {
        let v: GrowVec<u32> = GrowVec::new(4).unwrap();
        assert_eq!(v.len(), 0);
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 4);

        let d: GrowVec<u32> = GrowVec::new_default().unwrap();
        assert_eq!(d.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut v = GrowVec::new(2).unwrap();
        assert_eq!(v.get(0), Err(VecError::OutOfBounds { index: 0, len: 0 }));
        v.append(10u32).unwrap();
        assert_eq!(v.get(0), Ok(&10));
        assert_eq!(
            v.set(1, 5),
            Err(VecError::OutOfBounds { index: 1, len: 1 })
        );
        v.set(0, 11).unwrap();
        assert_eq!(v.get(0), Ok(&11));
    }

    #[test]
    fn append_doubles_and_preserves_indices() {
        let mut v = GrowVec::new(2).unwrap();
        for i in 0..5u32 {
            v.append(i).unwrap();
        }
        // 2 -> 4 -> 8
        assert_eq!(v.capacity(), 8);
        assert_eq!(v.len(), 5);
        for i in 0..5u32 {
            assert_eq!(v.get(i as usize), Ok(&i));
        }
        assert_eq!(v.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_capacity_still_grows() {
        let mut v = GrowVec::new(0).unwrap();
        v.append('a').unwrap();
        v.append('b').unwrap();
        assert_eq!(v.capacity(), 2);
        assert_eq!(v.iter().collect::<String>(), "ab");
    }

    #[test]
    fn oversized_capacity_is_rejected_before_allocating() {
        let r: Result<GrowVec<u64>, _> = GrowVec::new(usize::MAX / 4);
        assert!(matches!(r, Err(VecError::CapacityOverflow { .. })));
    }

    #[test]
    fn doubling_overflow_is_reported() {
        // Zero-sized handles never hit the byte limit, so the only failure is
        // the multiplication itself.
        let capacity = usize::MAX / 2 + 1;
        let mut v: GrowVec<()> = GrowVec {
            items: Vec::new(),
            capacity,
        };
        assert_eq!(v.grow(), Err(VecError::CapacityOverflow { capacity }));
        assert_eq!(v.capacity(), capacity);
    }
}
