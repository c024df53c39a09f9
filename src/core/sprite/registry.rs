//=========================================================================
// Sprite Registry
//=========================================================================
//
// Owns the live sprite collection of a scene.
//
// - Ids come from a monotonic counter and are never handed out twice.
// - The list keeps registration order until a z-sort is requested.
// - `by_kind` is sparse: kinds with no live sprites have no entry.
// - Removal is deferred: callers queue ids (or sprites flag themselves
//   destroyed) and the physics pass drains the queue before iterating,
//   so no pass ever sees the list change under it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeSet, HashMap};

use log::trace;

//=== Internal Dependencies ===============================================

use super::{SpriteId, SpriteKind, SpriteLike};

//=== SpriteRegistry ======================================================

#[derive(Default)]
pub struct SpriteRegistry {
    sprites: Vec<Box<dyn SpriteLike>>,
    next_id: u32,
    by_kind: HashMap<SpriteKind, BTreeSet<SpriteId>>,
    pending_removals: Vec<SpriteId>,
}

impl SpriteRegistry {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Appends a sprite and assigns it the next id.
    ///
    /// No duplicate detection is performed.
    pub fn add(&mut self, mut sprite: Box<dyn SpriteLike>) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id += 1;

        sprite.set_id(id);
        if let Some(kind) = sprite.kind() {
            self.by_kind.entry(kind).or_default().insert(id);
        }

        trace!(target: "scene", "Registered sprite {:?} (kind {:?})", id, sprite.kind());
        self.sprites.push(sprite);
        id
    }

    /// Id the next registered sprite will receive.
    pub fn next_id(&self) -> SpriteId {
        SpriteId(self.next_id)
    }

    //--- Removal ----------------------------------------------------------

    /// Queues a sprite for removal at the next drain.
    pub fn queue_removal(&mut self, id: SpriteId) {
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    /// Removes queued and self-destroyed sprites, returning them in list
    /// order so lifecycle handlers can observe them one last time.
    pub fn drain_removals(&mut self) -> Vec<Box<dyn SpriteLike>> {
        let queued = std::mem::take(&mut self.pending_removals);
        let doomed = |sprite: &Box<dyn SpriteLike>| {
            sprite.is_destroyed() || queued.contains(&sprite.id())
        };

        if !self.sprites.iter().any(doomed) {
            return Vec::new();
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.sprites.len());
        for sprite in self.sprites.drain(..) {
            if doomed(&sprite) {
                removed.push(sprite);
            } else {
                kept.push(sprite);
            }
        }
        self.sprites = kept;

        for sprite in &removed {
            self.unindex(sprite.id(), sprite.kind());
        }

        trace!(target: "scene", "Removed {} sprite(s)", removed.len());
        removed
    }

    //--- Ordering ---------------------------------------------------------

    /// Stable sort by ascending z, ties broken by ascending id.
    pub fn sort_by_z(&mut self) {
        self.sprites
            .sort_by(|a, b| a.z().total_cmp(&b.z()).then(a.id().cmp(&b.id())));
    }

    //--- Queries ----------------------------------------------------------

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Sprites in current list (draw) order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn SpriteLike + 'static)> + '_ {
        self.sprites.iter().map(|s| s.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn SpriteLike + 'static)> + '_ {
        self.sprites.iter_mut().map(|s| s.as_mut())
    }

    /// Ids in current list order.
    pub fn ids(&self) -> Vec<SpriteId> {
        self.sprites.iter().map(|s| s.id()).collect()
    }

    pub fn get(&self, id: SpriteId) -> Option<&(dyn SpriteLike + 'static)> {
        self.sprites.iter().find(|s| s.id() == id).map(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: SpriteId) -> Option<&mut (dyn SpriteLike + 'static)> {
        self.sprites
            .iter_mut()
            .find(|s| s.id() == id)
            .map(|s| s.as_mut())
    }

    /// Two distinct sprites borrowed mutably at once.
    ///
    /// Returns `None` if either id is missing or both ids are equal.
    pub fn pair_mut(
        &mut self,
        a: SpriteId,
        b: SpriteId,
    ) -> Option<(&mut (dyn SpriteLike + 'static), &mut (dyn SpriteLike + 'static))> {
        let ia = self.sprites.iter().position(|s| s.id() == a)?;
        let ib = self.sprites.iter().position(|s| s.id() == b)?;

        if ia == ib {
            return None;
        }

        if ia < ib {
            let (left, right) = self.sprites.split_at_mut(ib);
            Some((left[ia].as_mut(), right[0].as_mut()))
        } else {
            let (left, right) = self.sprites.split_at_mut(ia);
            Some((right[0].as_mut(), left[ib].as_mut()))
        }
    }

    /// Ids of live sprites of `kind`, ascending. Empty for unknown kinds.
    pub fn of_kind(&self, kind: SpriteKind) -> impl Iterator<Item = SpriteId> + '_ {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// Kinds that currently have at least one live sprite.
    pub fn kinds(&self) -> impl Iterator<Item = SpriteKind> + '_ {
        self.by_kind.keys().copied()
    }

    //--- Internal Helpers -------------------------------------------------

    fn unindex(&mut self, id: SpriteId, kind: Option<SpriteKind>) {
        let Some(kind) = kind else {
            return;
        };

        if let Some(ids) = self.by_kind.get_mut(&kind) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_kind.remove(&kind);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::{Camera, Image};
    use crate::core::sprite::Sprite;

    fn sprite(z: f32) -> Box<dyn SpriteLike> {
        Box::new(Sprite::new(Image::new(1, 1)).with_z(z))
    }

    fn kinded(kind: i32) -> Box<dyn SpriteLike> {
        Box::new(Sprite::new(Image::new(1, 1)).with_kind(SpriteKind(kind)))
    }

    //--- Id Assignment ----------------------------------------------------

    #[test]
    fn ids_are_sequential_from_zero() {
        let mut registry = SpriteRegistry::new();
        let ids: Vec<_> = (0..5).map(|_| registry.add(sprite(0.0))).collect();
        assert_eq!(ids, (0..5).map(SpriteId).collect::<Vec<_>>());
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut registry = SpriteRegistry::new();
        let first = registry.add(sprite(0.0));
        registry.add(sprite(0.0));

        registry.queue_removal(first);
        assert_eq!(registry.drain_removals().len(), 1);

        assert_eq!(registry.add(sprite(0.0)), SpriteId(2));
        assert_eq!(registry.ids(), vec![SpriteId(1), SpriteId(2)]);
    }

    //--- Removal ----------------------------------------------------------

    #[test]
    fn self_destroyed_sprites_are_drained() {
        let mut registry = SpriteRegistry::new();
        let mut doomed = Sprite::new(Image::new(1, 1));
        doomed.destroy();
        registry.add(Box::new(doomed));
        registry.add(sprite(0.0));

        let removed = registry.drain_removals();

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), SpriteId(0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn drain_without_removals_is_noop() {
        let mut registry = SpriteRegistry::new();
        registry.add(sprite(0.0));
        assert!(registry.drain_removals().is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_updates_kind_index() {
        let mut registry = SpriteRegistry::new();
        let a = registry.add(kinded(1));
        let b = registry.add(kinded(1));

        registry.queue_removal(a);
        registry.drain_removals();
        assert_eq!(registry.of_kind(SpriteKind(1)).collect::<Vec<_>>(), vec![b]);

        registry.queue_removal(b);
        registry.drain_removals();
        assert_eq!(registry.kinds().count(), 0);
    }

    //--- Kind Index -------------------------------------------------------

    #[test]
    fn unknown_kind_is_empty() {
        let registry = SpriteRegistry::new();
        assert_eq!(registry.of_kind(SpriteKind(42)).count(), 0);
    }

    #[test]
    fn kind_index_groups_sprites() {
        let mut registry = SpriteRegistry::new();
        registry.add(kinded(1));
        registry.add(kinded(2));
        registry.add(kinded(1));
        registry.add(sprite(0.0));

        assert_eq!(
            registry.of_kind(SpriteKind(1)).collect::<Vec<_>>(),
            vec![SpriteId(0), SpriteId(2)]
        );
        assert_eq!(registry.of_kind(SpriteKind(2)).count(), 1);
    }

    //--- Ordering ---------------------------------------------------------

    #[test]
    fn sort_orders_by_z_then_id() {
        let mut registry = SpriteRegistry::new();
        registry.add(sprite(5.0));
        registry.add(sprite(1.0));
        registry.add(sprite(5.0));
        registry.add(sprite(-2.0));

        registry.sort_by_z();

        assert_eq!(
            registry.ids(),
            vec![SpriteId(3), SpriteId(1), SpriteId(0), SpriteId(2)]
        );
    }

    //--- Access -----------------------------------------------------------

    #[test]
    fn pair_mut_borrows_both_sprites() {
        let mut registry = SpriteRegistry::new();
        let a = registry.add(sprite(0.0));
        let b = registry.add(sprite(0.0));

        let (first, second) = registry.pair_mut(b, a).unwrap();
        assert_eq!(first.id(), b);
        assert_eq!(second.id(), a);

        first.set_velocity(1.0, 0.0);
        second.update(&Camera::new(1, 1), 1.0);
    }

    #[test]
    fn pair_mut_rejects_same_id() {
        let mut registry = SpriteRegistry::new();
        let a = registry.add(sprite(0.0));
        assert!(registry.pair_mut(a, a).is_none());
        assert!(registry.pair_mut(a, SpriteId(9)).is_none());
    }
}
