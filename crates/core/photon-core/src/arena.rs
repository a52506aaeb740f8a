//! Fixed-capacity slot arena with generation-checked keys.
//!
//! The driver framework keeps every long-lived object (registered drivers,
//! open channels, display pipes) in a statically sized pool. A
//! [`SlotKey`] names a slot *and* the generation the slot had when the key
//! was issued; removing an element bumps the slot's generation, so a stale
//! key held by a caller resolves to `None` instead of aliasing whatever
//! object reuses the slot.

use core::fmt;

/// Index + generation pair naming one occupied slot of a [`SlotArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    index: u16,
    generation: u16,
}

impl SlotKey {
    /// A key that never resolves, in any arena.
    pub const INVALID: Self = Self {
        index: u16::MAX,
        generation: 0,
    };

    /// Returns the slot index.
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the generation the slot had when this key was issued.
    pub const fn generation(self) -> u16 {
        self.generation
    }

    /// Packs the key into a single `u32` (generation in the high half).
    pub const fn to_raw(self) -> u32 {
        ((self.generation as u32) << 16) | self.index as u32
    }

    /// Rebuilds a key from [`to_raw`](Self::to_raw) output.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            index: raw as u16,
            generation: (raw >> 16) as u16,
        }
    }

    /// Returns `true` for [`SlotKey::INVALID`].
    pub const fn is_invalid(self) -> bool {
        self.index == u16::MAX
    }
}

impl fmt::Debug for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            f.write_str("SlotKey(invalid)")
        } else {
            write!(f, "SlotKey({}v{})", self.index, self.generation)
        }
    }
}

struct Slot<T> {
    generation: u16,
    value: Option<T>,
}

/// A pool of at most `N` values addressed by [`SlotKey`].
pub struct SlotArena<T, const N: usize> {
    slots: [Slot<T>; N],
    len: usize,
}

impl<T, const N: usize> Default for SlotArena<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> SlotArena<T, N> {
    /// Creates an empty arena.
    ///
    /// # Panics
    ///
    /// Panics if `N` does not fit below the reserved invalid index.
    #[must_use]
    pub const fn new() -> Self {
        assert!(N < u16::MAX as usize, "SlotArena capacity too large");
        Self {
            slots: [const {
                Slot {
                    generation: 0,
                    value: None,
                }
            }; N],
            len: 0,
        }
    }

    /// Maximum number of elements.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if every slot is occupied.
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Places `value` in the lowest free slot.
    ///
    /// # Errors
    ///
    /// Returns the value back if the arena is full.
    #[allow(clippy::cast_possible_truncation)]
    pub fn insert(&mut self, value: T) -> Result<SlotKey, T> {
        let Some(index) = self.slots.iter().position(|s| s.value.is_none()) else {
            return Err(value);
        };
        let slot = &mut self.slots[index];
        slot.value = Some(value);
        self.len += 1;
        Ok(SlotKey {
            index: index as u16,
            generation: slot.generation,
        })
    }

    fn slot(&self, key: SlotKey) -> Option<&Slot<T>> {
        self.slots
            .get(key.index())
            .filter(|s| s.generation == key.generation && s.value.is_some())
    }

    /// Returns `true` if `key` names a live element.
    pub fn contains(&self, key: SlotKey) -> bool {
        self.slot(key).is_some()
    }

    /// Resolves `key` to its element.
    pub fn get(&self, key: SlotKey) -> Option<&T> {
        self.slot(key).and_then(|s| s.value.as_ref())
    }

    /// Resolves `key` to its element, mutably.
    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.slots
            .get_mut(key.index())
            .filter(|s| s.generation == key.generation)
            .and_then(|s| s.value.as_mut())
    }

    /// Removes the element named by `key`, invalidating every copy of the key.
    pub fn remove(&mut self, key: SlotKey) -> Option<T> {
        let slot = self
            .slots
            .get_mut(key.index())
            .filter(|s| s.generation == key.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.len -= 1;
        Some(value)
    }

    /// Removes every element and invalidates all outstanding keys.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.len = 0;
    }

    /// Iterates over live elements with their keys, in slot order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    SlotKey {
                        index: i as u16,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    /// Iterates mutably over live elements with their keys, in slot order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotKey, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.value.as_mut().map(|v| {
                (
                    SlotKey {
                        index: i as u16,
                        generation,
                    },
                    v,
                )
            })
        })
    }

    /// Returns the key of the first element matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<SlotKey> {
        self.iter().find(|(_, v)| pred(v)).map(|(k, _)| k)
    }
}
