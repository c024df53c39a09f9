//=========================================================================
// Scene Initializers
//=========================================================================
//
// Registry of setup callbacks run by `Scene::init`, once per scene, in
// registration order. The registry is built by the host (usually through
// `EngineBuilder::with_scene_initializer`) and handed to every scene the
// game creates, so extensions can hook scene setup without a global.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::Scene;

//=== SceneInitializers ===================================================

/// Shared scene setup callback.
///
/// `Send + Sync` so the registry can be built on the host thread and moved
/// into the core thread.
pub type SceneInitializer = Arc<dyn Fn(&mut Scene) + Send + Sync>;

#[derive(Clone, Default)]
pub struct SceneInitializers {
    initializers: Vec<SceneInitializer>,
}

impl SceneInitializers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, initializer: F)
    where
        F: Fn(&mut Scene) + Send + Sync + 'static,
    {
        self.initializers.push(Arc::new(initializer));
    }

    /// Runs every initializer against `scene`, in registration order.
    pub fn run_all(&self, scene: &mut Scene) {
        for initializer in &self.initializers {
            initializer(scene);
        }
    }

    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }
}

impl fmt::Debug for SceneInitializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneInitializers")
            .field("count", &self.initializers.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
