//=========================================================================
// Physics Collaborator
//=========================================================================
//
// Narrow interface the scene drives during the physics pass, plus a
// default engine that only reports overlaps and world-edge contacts.
//
// Architecture:
//   Scene (priority 15)
//     └─ PhysicsEngine::step(PhysicsWorld { sprites, overlaps, bounds }, dt)
//          ├─ OverlapRegistry::monitored_pairs()   (which kinds to test)
//          ├─ SpriteRegistry::of_kind()            (who to test)
//          └─ fire_overlap / fire_collision
//
// Sprite removal requested by handlers is never applied here; sprites
// flag themselves or get queued and the registry drains them at the start
// of the next physics pass.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::overlap::{CollisionSide, OverlapRegistry};
use crate::core::render::{Camera, Image, Rect};
use crate::core::sprite::{SpriteId, SpriteRegistry};

//=== PhysicsWorld ========================================================

/// Mutable view of the scene state a physics step may touch.
pub struct PhysicsWorld<'a> {
    pub sprites: &'a mut SpriteRegistry,
    pub overlaps: &'a mut OverlapRegistry,

    /// World extent; `None` disables edge collisions.
    pub bounds: Option<Rect>,
}

//=== PhysicsEngine =======================================================

/// Physics capability consumed by the scene.
pub trait PhysicsEngine {
    /// Advances the simulation by `dt` seconds.
    fn step(&mut self, world: PhysicsWorld<'_>, dt: f32);

    /// Debug visualization, called after rendering when debug is enabled.
    fn draw(&self, _sprites: &SpriteRegistry, _camera: &Camera, _target: &mut Image) {}
}

//=== OverlapPhysics ======================================================

/// Default engine: overlap and edge detection without resolution.
///
/// Only kind pairs with a registered overlap handler are tested.
#[derive(Debug, Default)]
pub struct OverlapPhysics {
    checks: usize,
}

impl OverlapPhysics {
    /// Hitbox color used by [`PhysicsEngine::draw`].
    pub const DEBUG_COLOR: u8 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sprite pairs tested during the last step.
    pub fn last_check_count(&self) -> usize {
        self.checks
    }
}

impl PhysicsEngine for OverlapPhysics {
    fn step(&mut self, world: PhysicsWorld<'_>, _dt: f32) {
        let PhysicsWorld {
            sprites,
            overlaps,
            bounds,
        } = world;

        let boxes: HashMap<SpriteId, Rect> = sprites
            .iter()
            .filter(|s| !s.is_destroyed())
            .filter_map(|s| s.bounds().map(|b| (s.id(), b)))
            .collect();

        //--- Overlaps -----------------------------------------------------
        let mut hits = Vec::new();
        self.checks = 0;

        for (kind_a, kind_b) in overlaps.monitored_pairs() {
            for a in sprites.of_kind(kind_a) {
                for b in sprites.of_kind(kind_b) {
                    // Same-kind pairs are visited once
                    if kind_a == kind_b && a >= b {
                        continue;
                    }
                    let (Some(box_a), Some(box_b)) = (boxes.get(&a), boxes.get(&b)) else {
                        continue;
                    };
                    self.checks += 1;
                    if box_a.intersects(box_b) {
                        hits.push((a, b));
                    }
                }
            }
        }

        for (a, b) in hits {
            if let Some((sprite_a, sprite_b)) = sprites.pair_mut(a, b) {
                // An earlier handler this pass may have destroyed one of them
                if sprite_a.is_destroyed() || sprite_b.is_destroyed() {
                    continue;
                }
                overlaps.fire_overlap(sprite_a, sprite_b);
            }
        }

        //--- World Edges --------------------------------------------------
        let Some(world_bounds) = bounds else {
            return;
        };

        let mut contacts = Vec::new();
        for sprite in sprites.iter() {
            let Some(kind) = sprite.kind() else { continue };
            if !overlaps.has_collision_handlers(kind) {
                continue;
            }
            let Some(hitbox) = boxes.get(&sprite.id()) else { continue };

            if hitbox.x < world_bounds.x {
                contacts.push((sprite.id(), CollisionSide::Left));
            }
            if hitbox.y < world_bounds.y {
                contacts.push((sprite.id(), CollisionSide::Top));
            }
            if hitbox.right() > world_bounds.right() {
                contacts.push((sprite.id(), CollisionSide::Right));
            }
            if hitbox.bottom() > world_bounds.bottom() {
                contacts.push((sprite.id(), CollisionSide::Bottom));
            }
        }

        if !contacts.is_empty() {
            trace!(target: "physics", "{} world-edge contact(s)", contacts.len());
        }

        for (id, side) in contacts {
            if let Some(sprite) = sprites.get_mut(id) {
                overlaps.fire_collision(sprite, side);
            }
        }
    }

    fn draw(&self, sprites: &SpriteRegistry, camera: &Camera, target: &mut Image) {
        for sprite in sprites.iter() {
            if let Some(hitbox) = sprite.bounds() {
                let (x, y) = camera.world_to_screen(hitbox.x, hitbox.y);
                target.draw_rect(
                    x,
                    y,
                    hitbox.width.ceil() as i32,
                    hitbox.height.ceil() as i32,
                    Self::DEBUG_COLOR,
                );
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
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::sprite::{Sprite, SpriteKind, SpriteLike};

    const PLAYER: SpriteKind = SpriteKind(1);
    const ENEMY: SpriteKind = SpriteKind(2);
    const SCENERY: SpriteKind = SpriteKind(3);

    fn block(kind: SpriteKind, x: f32, y: f32) -> Box<dyn SpriteLike> {
        Box::new(Sprite::new(Image::new(4, 4)).with_kind(kind).at(x, y))
    }

    fn step(physics: &mut OverlapPhysics, sprites: &mut SpriteRegistry, overlaps: &mut OverlapRegistry, bounds: Option<Rect>) {
        physics.step(
            PhysicsWorld {
                sprites,
                overlaps,
                bounds,
            },
            0.016,
        );
    }

    //--- Overlaps ---------------------------------------------------------

    #[test]
    fn overlapping_registered_kinds_fire() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut overlaps = OverlapRegistry::new();
        let log = Rc::clone(&hits);
        overlaps.on_overlap(PLAYER, ENEMY, move |a, b| log.borrow_mut().push((a.id(), b.id())));

        let mut sprites = SpriteRegistry::new();
        let enemy = sprites.add(block(ENEMY, 2.0, 2.0));
        let player = sprites.add(block(PLAYER, 0.0, 0.0));
        sprites.add(block(ENEMY, 50.0, 50.0));

        step(&mut OverlapPhysics::new(), &mut sprites, &mut overlaps, None);

        assert_eq!(*hits.borrow(), vec![(player, enemy)]);
    }

    #[test]
    fn unmonitored_kinds_are_never_tested() {
        let mut overlaps = OverlapRegistry::new();
        overlaps.on_overlap(PLAYER, ENEMY, |_, _| {});

        let mut sprites = SpriteRegistry::new();
        sprites.add(block(PLAYER, 0.0, 0.0));
        for i in 0..10 {
            sprites.add(block(SCENERY, i as f32, 0.0));
        }

        let mut physics = OverlapPhysics::new();
        step(&mut physics, &mut sprites, &mut overlaps, None);

        assert_eq!(physics.last_check_count(), 0);
    }

    #[test]
    fn same_kind_pairs_fire_once() {
        let count = Rc::new(RefCell::new(0));
        let mut overlaps = OverlapRegistry::new();
        let counter = Rc::clone(&count);
        overlaps.on_overlap(ENEMY, ENEMY, move |_, _| *counter.borrow_mut() += 1);

        let mut sprites = SpriteRegistry::new();
        sprites.add(block(ENEMY, 0.0, 0.0));
        sprites.add(block(ENEMY, 1.0, 1.0));

        step(&mut OverlapPhysics::new(), &mut sprites, &mut overlaps, None);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn destroyed_sprites_are_skipped() {
        let count = Rc::new(RefCell::new(0));
        let mut overlaps = OverlapRegistry::new();
        let counter = Rc::clone(&count);
        overlaps.on_overlap(PLAYER, ENEMY, move |_, _| *counter.borrow_mut() += 1);

        let mut sprites = SpriteRegistry::new();
        sprites.add(block(PLAYER, 0.0, 0.0));
        let mut doomed = Sprite::new(Image::new(4, 4)).with_kind(ENEMY);
        doomed.destroy();
        sprites.add(Box::new(doomed));

        step(&mut OverlapPhysics::new(), &mut sprites, &mut overlaps, None);

        assert_eq!(*count.borrow(), 0);
    }

    //--- World Edges ------------------------------------------------------

    #[test]
    fn leaving_world_bounds_reports_side() {
        let sides = Rc::new(RefCell::new(Vec::new()));
        let mut overlaps = OverlapRegistry::new();
        let log = Rc::clone(&sides);
        overlaps.on_collision(PLAYER, move |_, side| log.borrow_mut().push(side));

        let mut sprites = SpriteRegistry::new();
        sprites.add(block(PLAYER, -1.0, 10.0));
        sprites.add(block(PLAYER, 10.0, 10.0));

        step(
            &mut OverlapPhysics::new(),
            &mut sprites,
            &mut overlaps,
            Some(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );

        assert_eq!(*sides.borrow(), vec![CollisionSide::Left]);
    }

    //--- Debug Draw -------------------------------------------------------

    #[test]
    fn draw_outlines_hitboxes() {
        let mut sprites = SpriteRegistry::new();
        sprites.add(block(PLAYER, 1.0, 1.0));
        let mut target = Image::new(8, 8);

        OverlapPhysics::new().draw(&sprites, &Camera::new(8, 8), &mut target);

        assert_eq!(target.pixel(1, 1), Some(OverlapPhysics::DEBUG_COLOR));
        assert_eq!(target.pixel(2, 2), Some(0));
    }
}
