//=========================================================================
// Transition Queue
//=========================================================================
//
// Scene stack operations requested from inside a frame.
//
// Scenes queue transitions here during their handlers. The game applies
// the queue at the tick boundary, after the current scene finished its
// pass, so a scene is never destroyed while its own handlers run.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::Scene;

//=== Scene Transition ====================================================

/// Setup run against a freshly pushed scene, after its initializers.
pub type SceneSetup = Box<dyn FnOnce(&mut Scene)>;

/// Scene stack operation.
pub enum SceneTransition {
    /// Pushes a new initialized scene and runs the setup on it.
    Push(SceneSetup),

    /// Destroys the current scene and resumes the one below it.
    Pop,
}

impl SceneTransition {
    pub fn push<F>(setup: F) -> Self
    where
        F: FnOnce(&mut Scene) + 'static,
    {
        Self::Push(Box::new(setup))
    }
}

impl fmt::Debug for SceneTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(_) => f.write_str("Push(..)"),
            Self::Pop => f.write_str("Pop"),
        }
    }
}

//=== Transition Queue ====================================================

#[derive(Debug, Default)]
pub struct TransitionQueue {
    queue: Vec<SceneTransition>,
}

impl TransitionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a transition for the next tick boundary.
    pub fn push(&mut self, transition: SceneTransition) {
        self.queue.push(transition);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Takes all queued transitions in FIFO order, leaving the queue empty.
    pub fn take(&mut self) -> Vec<SceneTransition> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
