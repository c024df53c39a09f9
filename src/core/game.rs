//=========================================================================
// Game
//=========================================================================
//
// Stack of scenes sharing one console.
//
// Architecture:
//   Game
//     ├─ scenes: Vec<Scene>          (top = current, never empty)
//     ├─ console: ConsoleHandle      (cloned into every scene)
//     └─ initializers                (run by every new scene's init)
//
// Flow:
//   tick() → current.tick() → current.take_transitions() → apply in order
//
// Only the top scene ticks. Transitions requested during a frame are
// applied after that frame completes.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::console::ConsoleHandle;
use crate::core::scene::{Scene, SceneConfig, SceneInitializers, SceneTransition};
use crate::core::scheduler::EventContext;
use crate::core::time::FrameTime;

//=== Game ================================================================

pub struct Game {
    scenes: Vec<Scene>,
    config: SceneConfig,
    console: ConsoleHandle,
    initializers: SceneInitializers,
}

impl Game {
    //--- Construction -----------------------------------------------------

    /// Creates a game with one initialized scene.
    pub fn new(config: SceneConfig, console: ConsoleHandle, initializers: SceneInitializers) -> Self {
        let mut game = Self {
            scenes: Vec::new(),
            config,
            console,
            initializers,
        };
        game.push_scene();
        game
    }

    //--- Scene Stack ------------------------------------------------------

    /// Pushes a fresh, initialized scene and returns it.
    pub fn push_scene(&mut self) -> &mut Scene {
        let mut scene = Scene::new(
            EventContext::new(),
            self.config.clone(),
            self.console.clone(),
            self.initializers.clone(),
        );
        scene.init();

        self.scenes.push(scene);
        debug!(target: "scene", "Pushed scene, stack depth {}", self.scenes.len());

        let top = self.scenes.len() - 1;
        &mut self.scenes[top]
    }

    /// Destroys the current scene. An emptied stack gets a fresh scene.
    pub fn pop_scene(&mut self) {
        if let Some(scene) = self.scenes.pop() {
            scene.destroy();
        }
        debug!(target: "scene", "Popped scene, stack depth {}", self.scenes.len());

        if self.scenes.is_empty() {
            self.push_scene();
        }
    }

    pub fn current_scene(&self) -> &Scene {
        &self.scenes[self.scenes.len() - 1]
    }

    pub fn current_scene_mut(&mut self) -> &mut Scene {
        let top = self.scenes.len() - 1;
        &mut self.scenes[top]
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn console(&self) -> &ConsoleHandle {
        &self.console
    }

    //--- Frame ------------------------------------------------------------

    /// Ticks the current scene, then applies the transitions it queued.
    pub fn tick(&mut self, frame: &FrameTime) {
        let scene = self.current_scene_mut();
        scene.tick(frame);
        let transitions = scene.take_transitions();

        for transition in transitions {
            match transition {
                SceneTransition::Push(setup) => setup(self.push_scene()),
                SceneTransition::Pop => self.pop_scene(),
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
