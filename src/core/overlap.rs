//=========================================================================
// Overlap Registry
//=========================================================================
//
// Bookkeeping for kind-based sprite dispatch.
//
// Architecture:
//   on_overlap(kind, other, f) ──→ overlap_handlers + overlap_map[kind ↔ other]
//   on_collision(kind, f)      ──→ collision_handlers[kind]
//   on_created / on_destroyed  ──→ lifecycle handler lists
//
// The physics collaborator reads `overlap_map` so it only tests kind
// pairs somebody listens to, instead of every sprite against every other.
// This module does no geometry of its own.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::sprite::{SpriteKind, SpriteLike};

//=== Handler Types =======================================================

/// Lifecycle callback receiving the created or destroyed sprite.
pub type SpriteHandler = Box<dyn FnMut(&mut dyn SpriteLike)>;

/// Overlap callback receiving the sprite of the registered kind first.
pub type OverlapCallback = Box<dyn FnMut(&mut dyn SpriteLike, &mut dyn SpriteLike)>;

/// World-edge collision callback.
pub type CollisionCallback = Box<dyn FnMut(&mut dyn SpriteLike, CollisionSide)>;

/// Edge of the world a sprite ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionSide {
    Left,
    Top,
    Right,
    Bottom,
}

struct KindHandler {
    kind: SpriteKind,
    handler: SpriteHandler,
}

struct OverlapHandler {
    kind: SpriteKind,
    other_kind: SpriteKind,
    handler: OverlapCallback,
}

//=== OverlapRegistry =====================================================

#[derive(Default)]
pub struct OverlapRegistry {
    overlap_handlers: Vec<OverlapHandler>,
    overlap_map: HashMap<SpriteKind, Vec<SpriteKind>>,
    collision_handlers: HashMap<SpriteKind, Vec<CollisionCallback>>,
    created_handlers: Vec<KindHandler>,
    destroyed_handlers: Vec<KindHandler>,
}

impl OverlapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Fires `handler(sprite_of_kind, sprite_of_other_kind)` whenever two
    /// such sprites overlap.
    pub fn on_overlap<F>(&mut self, kind: SpriteKind, other_kind: SpriteKind, handler: F)
    where
        F: FnMut(&mut dyn SpriteLike, &mut dyn SpriteLike) + 'static,
    {
        trace!(target: "scene", "Overlap handler {:?} <-> {:?}", kind, other_kind);
        self.overlap_handlers.push(OverlapHandler {
            kind,
            other_kind,
            handler: Box::new(handler),
        });
        self.link(kind, other_kind);
        self.link(other_kind, kind);
    }

    /// Fires when a sprite of `kind` hits a world edge.
    pub fn on_collision<F>(&mut self, kind: SpriteKind, handler: F)
    where
        F: FnMut(&mut dyn SpriteLike, CollisionSide) + 'static,
    {
        self.collision_handlers
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    /// Fires when a sprite of `kind` is created through the scene.
    pub fn on_created<F>(&mut self, kind: SpriteKind, handler: F)
    where
        F: FnMut(&mut dyn SpriteLike) + 'static,
    {
        self.created_handlers.push(KindHandler {
            kind,
            handler: Box::new(handler),
        });
    }

    /// Fires when a sprite of `kind` leaves the scene.
    pub fn on_destroyed<F>(&mut self, kind: SpriteKind, handler: F)
    where
        F: FnMut(&mut dyn SpriteLike) + 'static,
    {
        self.destroyed_handlers.push(KindHandler {
            kind,
            handler: Box::new(handler),
        });
    }

    //--- Queries ----------------------------------------------------------

    /// Kinds that `kind` must be tested against. Empty if none.
    pub fn overlap_kinds(&self, kind: SpriteKind) -> &[SpriteKind] {
        self.overlap_map
            .get(&kind)
            .map(|kinds| kinds.as_slice())
            .unwrap_or(&[])
    }

    /// True if some handler listens for overlaps between the two kinds.
    pub fn should_check(&self, a: SpriteKind, b: SpriteKind) -> bool {
        self.overlap_kinds(a).contains(&b)
    }

    /// Every monitored kind pair once, as `(low, high)`, sorted.
    pub fn monitored_pairs(&self) -> Vec<(SpriteKind, SpriteKind)> {
        let mut pairs: Vec<_> = self
            .overlap_map
            .iter()
            .flat_map(|(&kind, others)| others.iter().map(move |&other| (kind, other)))
            .filter(|(kind, other)| kind <= other)
            .collect();
        pairs.sort();
        pairs
    }

    /// True if any collision handler exists for `kind`.
    pub fn has_collision_handlers(&self, kind: SpriteKind) -> bool {
        self.collision_handlers
            .get(&kind)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    pub fn overlap_handler_count(&self) -> usize {
        self.overlap_handlers.len()
    }

    //--- Dispatch ---------------------------------------------------------

    /// Runs overlap handlers matching the kinds of `a` and `b`, in
    /// registration order. Sprites without a kind never match.
    pub fn fire_overlap(&mut self, a: &mut dyn SpriteLike, b: &mut dyn SpriteLike) {
        let (Some(kind_a), Some(kind_b)) = (a.kind(), b.kind()) else {
            return;
        };

        for entry in self.overlap_handlers.iter_mut() {
            if entry.kind == kind_a && entry.other_kind == kind_b {
                (entry.handler)(&mut *a, &mut *b);
            } else if entry.kind == kind_b && entry.other_kind == kind_a {
                (entry.handler)(&mut *b, &mut *a);
            }
        }
    }

    pub fn fire_collision(&mut self, sprite: &mut dyn SpriteLike, side: CollisionSide) {
        let Some(kind) = sprite.kind() else {
            return;
        };

        if let Some(handlers) = self.collision_handlers.get_mut(&kind) {
            for handler in handlers.iter_mut() {
                handler(&mut *sprite, side);
            }
        }
    }

    pub fn fire_created(&mut self, sprite: &mut dyn SpriteLike) {
        Self::fire_lifecycle(&mut self.created_handlers, sprite);
    }

    pub fn fire_destroyed(&mut self, sprite: &mut dyn SpriteLike) {
        Self::fire_lifecycle(&mut self.destroyed_handlers, sprite);
    }

    //--- Internal Helpers -------------------------------------------------

    fn link(&mut self, kind: SpriteKind, other_kind: SpriteKind) {
        let others = self.overlap_map.entry(kind).or_default();
        if !others.contains(&other_kind) {
            others.push(other_kind);
        }
    }

    fn fire_lifecycle(handlers: &mut [KindHandler], sprite: &mut dyn SpriteLike) {
        let Some(kind) = sprite.kind() else {
            return;
        };

        for entry in handlers.iter_mut().filter(|entry| entry.kind == kind) {
            (entry.handler)(&mut *sprite);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::render::Image;
    use crate::core::sprite::{Sprite, SpriteId};

    const PLAYER: SpriteKind = SpriteKind(1);
    const ENEMY: SpriteKind = SpriteKind(2);
    const FOOD: SpriteKind = SpriteKind(3);

    fn sprite_of(kind: SpriteKind, id: u32) -> Sprite {
        let mut sprite = Sprite::new(Image::new(1, 1)).with_kind(kind);
        sprite.set_id(SpriteId(id));
        sprite
    }

    //--- Overlap Map ------------------------------------------------------

    #[test]
    fn absent_kind_has_no_overlap_kinds() {
        let registry = OverlapRegistry::new();
        assert!(registry.overlap_kinds(PLAYER).is_empty());
        assert!(!registry.should_check(PLAYER, ENEMY));
    }

    #[test]
    fn overlap_map_is_symmetric_and_deduplicated() {
        let mut registry = OverlapRegistry::new();
        registry.on_overlap(PLAYER, ENEMY, |_, _| {});
        registry.on_overlap(PLAYER, ENEMY, |_, _| {});
        registry.on_overlap(ENEMY, PLAYER, |_, _| {});

        assert_eq!(registry.overlap_kinds(PLAYER), &[ENEMY]);
        assert_eq!(registry.overlap_kinds(ENEMY), &[PLAYER]);
        assert_eq!(registry.overlap_handler_count(), 3);
    }

    #[test]
    fn monitored_pairs_lists_each_pair_once() {
        let mut registry = OverlapRegistry::new();
        registry.on_overlap(ENEMY, PLAYER, |_, _| {});
        registry.on_overlap(PLAYER, FOOD, |_, _| {});
        registry.on_overlap(PLAYER, PLAYER, |_, _| {});

        assert_eq!(
            registry.monitored_pairs(),
            vec![(PLAYER, PLAYER), (PLAYER, ENEMY), (PLAYER, FOOD)]
        );
        assert!(!registry.should_check(ENEMY, FOOD));
    }

    //--- Dispatch ---------------------------------------------------------

    #[test]
    fn overlap_handler_receives_registered_kind_first() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = OverlapRegistry::new();
        let log = Rc::clone(&seen);
        registry.on_overlap(PLAYER, ENEMY, move |a, b| {
            log.borrow_mut().push((a.id(), b.id()));
        });

        let mut enemy = sprite_of(ENEMY, 7);
        let mut player = sprite_of(PLAYER, 3);
        registry.fire_overlap(&mut enemy, &mut player);

        assert_eq!(*seen.borrow(), vec![(SpriteId(3), SpriteId(7))]);
    }

    #[test]
    fn unrelated_kinds_do_not_fire() {
        let fired = Rc::new(RefCell::new(0));
        let mut registry = OverlapRegistry::new();
        let counter = Rc::clone(&fired);
        registry.on_overlap(PLAYER, ENEMY, move |_, _| *counter.borrow_mut() += 1);

        registry.fire_overlap(&mut sprite_of(PLAYER, 0), &mut sprite_of(FOOD, 1));
        registry.fire_overlap(&mut sprite_of(PLAYER, 0), &mut Sprite::new(Image::new(1, 1)));

        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn lifecycle_handlers_filter_by_kind() {
        let created = Rc::new(RefCell::new(Vec::new()));
        let mut registry = OverlapRegistry::new();
        let log = Rc::clone(&created);
        registry.on_created(ENEMY, move |s| log.borrow_mut().push(s.id()));

        registry.fire_created(&mut sprite_of(PLAYER, 0));
        registry.fire_created(&mut sprite_of(ENEMY, 1));
        registry.fire_destroyed(&mut sprite_of(ENEMY, 1));

        assert_eq!(*created.borrow(), vec![SpriteId(1)]);
    }

    #[test]
    fn collision_handlers_receive_side() {
        let sides = Rc::new(RefCell::new(Vec::new()));
        let mut registry = OverlapRegistry::new();
        let log = Rc::clone(&sides);
        registry.on_collision(PLAYER, move |_, side| log.borrow_mut().push(side));

        assert!(registry.has_collision_handlers(PLAYER));
        assert!(!registry.has_collision_handlers(ENEMY));

        registry.fire_collision(&mut sprite_of(PLAYER, 0), CollisionSide::Left);
        registry.fire_collision(&mut sprite_of(ENEMY, 1), CollisionSide::Top);

        assert_eq!(*sides.borrow(), vec![CollisionSide::Left]);
    }
}
