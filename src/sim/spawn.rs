//! Pipe entry arbitration
//!
//! One enemy at a time may come out of each side's pipe. Slots live on the
//! world and are handed to characters through the tick context.

use serde::{Deserialize, Serialize};

use super::events::ActorId;

/// Screen side of a pipe or respawn elevator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// -1 for left, 1 for right
    pub fn sign(&self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }

    pub fn from_sign(sign: i32) -> Self {
        if sign > 0 { Side::Right } else { Side::Left }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Exclusive left/right entry lanes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnSlots {
    left: Option<ActorId>,
    right: Option<ActorId>,
}

impl SpawnSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<ActorId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn owner(&self, side: Side) -> Option<ActorId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Take the lane if it is free or already ours
    pub fn try_acquire(&mut self, side: Side, id: ActorId) -> bool {
        let slot = self.slot_mut(side);
        match *slot {
            Some(owner) if owner != id => false,
            _ => {
                *slot = Some(id);
                true
            }
        }
    }

    /// Give the lane back; a no-op unless `id` owns it
    pub fn release(&mut self, side: Side, id: ActorId) {
        let slot = self.slot_mut(side);
        if *slot == Some(id) {
            *slot = None;
        }
    }

    /// Release whatever lanes `id` holds
    pub fn release_owner(&mut self, id: ActorId) {
        self.release(Side::Left, id);
        self.release(Side::Right, id);
    }

    /// Level teardown
    pub fn release_all(&mut self) {
        self.left = None;
        self.right = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_per_side() {
        let mut slots = SpawnSlots::new();
        assert!(slots.try_acquire(Side::Left, ActorId(1)));
        assert!(!slots.try_acquire(Side::Left, ActorId(2)));
        assert!(slots.try_acquire(Side::Left, ActorId(1)));
        assert!(slots.try_acquire(Side::Right, ActorId(2)));
    }

    #[test]
    fn test_release_by_non_owner_is_noop() {
        let mut slots = SpawnSlots::new();
        slots.try_acquire(Side::Right, ActorId(1));
        slots.release(Side::Right, ActorId(7));
        assert_eq!(slots.owner(Side::Right), Some(ActorId(1)));
        slots.release(Side::Right, ActorId(1));
        slots.release(Side::Right, ActorId(1));
        assert_eq!(slots.owner(Side::Right), None);
        assert!(slots.try_acquire(Side::Right, ActorId(7)));
    }

    #[test]
    fn test_release_all() {
        let mut slots = SpawnSlots::new();
        slots.try_acquire(Side::Left, ActorId(1));
        slots.try_acquire(Side::Right, ActorId(2));
        slots.release_all();
        assert_eq!(slots.owner(Side::Left), None);
        assert_eq!(slots.owner(Side::Right), None);
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Left.sign(), -1);
        assert_eq!(Side::from_sign(1), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}
