//=========================================================================
// Scene Data
//=========================================================================
//
// Typed extension state attached to a scene.
//
// Architecture:
//   Extensions → insert<T>() / get_or_insert_with<T>() → HashMap<TypeId, Box<dyn Any>>
//                                                             ↓
//   Same extension, later frame ← get<T>() / get_mut<T>()
//
// One slot per Rust type. Extensions define their own state struct, so
// two extensions can never collide on a string key.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};
use std::collections::HashMap;

//=== SceneExtension ======================================================

/// Marker for types that can be stored in [`SceneData`].
///
/// Automatically implemented for all `'static` types.
pub trait SceneExtension: Any {}

impl<T: Any> SceneExtension for T {}

//=== SceneData ===========================================================

#[derive(Default)]
pub struct SceneData {
    slots: HashMap<TypeId, Box<dyn Any>>,
}

impl SceneData {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Storage ----------------------------------------------------------

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<T: SceneExtension>(&mut self, value: T) -> Option<T> {
        self.slots
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn remove<T: SceneExtension>(&mut self) -> Option<T> {
        self.slots
            .remove(&TypeId::of::<T>())
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Returns the stored value, creating it with `init` first if absent.
    pub fn get_or_insert_with<T, F>(&mut self, init: F) -> &mut T
    where
        T: SceneExtension,
        F: FnOnce() -> T,
    {
        self.slots
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(init()))
            .downcast_mut::<T>()
            .expect("Type mismatch in SceneData slot")
    }

    //--- Query API --------------------------------------------------------

    pub fn get<T: SceneExtension>(&self) -> Option<&T> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<T>())
    }

    pub fn get_mut<T: SceneExtension>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_mut::<T>())
    }

    pub fn contains<T: SceneExtension>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Score(u32);

    #[derive(Debug, PartialEq, Default)]
    struct TileState {
        loaded: bool,
    }

    #[test]
    fn new_data_is_empty() {
        let data = SceneData::new();
        assert!(data.is_empty());
        assert!(data.get::<Score>().is_none());
        assert!(!data.contains::<Score>());
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut data = SceneData::new();
        assert_eq!(data.insert(Score(1)), None);
        assert_eq!(data.insert(Score(2)), Some(Score(1)));
        assert_eq!(data.get::<Score>(), Some(&Score(2)));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn types_have_separate_slots() {
        let mut data = SceneData::new();
        data.insert(Score(5));
        data.get_or_insert_with(TileState::default).loaded = true;

        assert_eq!(data.get::<Score>(), Some(&Score(5)));
        assert_eq!(data.get::<TileState>(), Some(&TileState { loaded: true }));
    }

    #[test]
    fn get_or_insert_with_keeps_existing_value() {
        let mut data = SceneData::new();
        data.insert(Score(9));
        let score = data.get_or_insert_with(|| Score(0));
        assert_eq!(score.0, 9);
    }

    #[test]
    fn remove_takes_value_out() {
        let mut data = SceneData::new();
        data.insert(Score(3));
        data.get_mut::<Score>().unwrap().0 += 1;

        assert_eq!(data.remove::<Score>(), Some(Score(4)));
        assert!(data.is_empty());
    }
}
