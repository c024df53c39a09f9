//=========================================================================
// Frame Handler Priorities
//=========================================================================
//
// Fixed priority table for the scene's frame handlers. Smaller values run
// earlier within a tick.
//
//   8   controller state        15  physics + sprite update
//   13  controller sprites      19  update-interval hooks
//   14  camera follow           20  update hooks + forever handlers
//   90  render                  150 diagnostics + flag reset
//   200 screen flush
//
//=========================================================================

/// Advances scene time and the controller state.
pub const CONTROLLER: i32 = 8;

/// Applies controller-driven velocities to bound sprites.
pub const CONTROLLER_SPRITES: i32 = 13;

/// Moves the camera towards its followed sprite.
pub const FOLLOW_SPRITE: i32 = 14;

/// Physics step, camera update and per-sprite update.
pub const PHYSICS: i32 = 15;

/// Reserved for periodic user hooks.
pub const UPDATE_INTERVAL: i32 = 19;

/// Reserved for per-frame user hooks.
pub const UPDATE: i32 = 20;

/// Background and sprite rendering.
pub const RENDER_SPRITES: i32 = 90;

/// Stats overlay, debug draw and flag reset.
pub const RENDER_DIAGNOSTICS: i32 = 150;

/// Frame buffer hand-off to the screen.
pub const UPDATE_SCREEN: i32 = 200;
