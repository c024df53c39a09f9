//=========================================================================
// Core Runtime
//=========================================================================
//
// Owns the game on the core (non-platform) thread.
//
// Each frame:
//  1. Collect platform events (non-blocking; parked wait while asleep)
//  2. Feed button transitions to the console
//  3. Tick the game with a clamped FrameClock delta
//  4. Sleep to hold the configured frame rate
//
// The game and its scenes are built inside the thread, so nothing they
// hold needs to be Send. Only the runtime's inputs cross the boundary.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::console::Console;
use crate::core::game::Game;
use crate::core::platform_bridge::{EventCollector, PlatformEvent, TickControl};
use crate::core::render::{NullScreen, ScreenSink};
use crate::core::scene::{SceneConfig, SceneInitializers};
use crate::core::time::FrameClock;

//=== CoreRuntime =========================================================

/// Setup run once against the game before the first frame.
pub type GameSetup = Box<dyn FnOnce(&mut Game) + Send>;

pub(crate) struct CoreRuntime {
    pub(crate) fps: f64,
    pub(crate) scene_config: SceneConfig,
    pub(crate) deep_sleep_after: Option<Duration>,
    pub(crate) screen: Box<dyn ScreenSink + Send>,
    pub(crate) initializers: SceneInitializers,
    pub(crate) setups: Vec<GameSetup>,
}

impl CoreRuntime {
    /// Wait per iteration while the console is in deep sleep.
    const DEEP_SLEEP_POLL: Duration = Duration::from_millis(250);

    pub(crate) fn new() -> Self {
        Self {
            fps: 60.0,
            scene_config: SceneConfig::default(),
            deep_sleep_after: None,
            screen: Box::new(NullScreen),
            initializers: SceneInitializers::new(),
            setups: Vec::new(),
        }
    }

    /// Spawns the core thread. It runs until the platform closes the
    /// window or drops its sender.
    pub(crate) fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
    ) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("arcade-core".to_string())
            .spawn(move || self.run(receiver))
    }

    fn run(self, receiver: Receiver<PlatformEvent>) {
        let frame_duration = Duration::from_secs_f64(1.0 / self.fps);
        let console = Console::new(self.screen, self.deep_sleep_after).into_handle();

        let mut game = Game::new(self.scene_config, console.clone(), self.initializers);
        for setup in self.setups {
            setup(&mut game);
        }

        let mut collector = EventCollector::new(receiver);
        let mut clock = FrameClock::new();
        info!(target: "engine", "Core thread running at {} FPS", self.fps);

        loop {
            let frame_start = Instant::now();
            let sleeping = console.borrow().is_sleeping();

            //--- Step 1: Gather platform events ----------------------------
            let control = if sleeping {
                collector.wait(Self::DEEP_SLEEP_POLL)
            } else {
                collector.collect_frame()
            };
            if control == TickControl::Exit {
                info!(target: "engine", "Core thread exiting");
                break;
            }

            //--- Step 2: Feed the console ----------------------------------
            let buttons = collector.take_buttons();
            if !buttons.is_empty() {
                let mut console = console.borrow_mut();
                for button in buttons {
                    console.apply_input(button);
                }
            }
            if sleeping && !console.borrow().is_sleeping() {
                debug!(target: "engine", "Woken by input, resuming full frame rate");
                clock.reset();
            }

            //--- Step 3: Tick ----------------------------------------------
            let frame = clock.tick();
            game.tick(&frame);

            //--- Step 4: Pace ----------------------------------------------
            if !console.borrow().is_sleeping() {
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }
        }

        debug!(target: "engine", "Releasing {} scene(s)", game.scene_count());
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Sender};

    use crate::core::controller::{Button, ButtonEvent};
    use crate::core::render::Image;

    struct ChannelScreen(Sender<usize>);

    impl ScreenSink for ChannelScreen {
        fn present(&mut self, frame: &Image) {
            let _ = self.0.send(frame.pixels().len());
        }
    }

    #[test]
    fn runs_frames_until_window_closed() {
        let (frames_tx, frames_rx) = unbounded();
        let (platform_tx, platform_rx) = unbounded();

        let mut runtime = CoreRuntime::new();
        runtime.fps = 200.0;
        runtime.scene_config = SceneConfig {
            screen_width: 4,
            screen_height: 4,
            ..SceneConfig::default()
        };
        runtime.screen = Box::new(ChannelScreen(frames_tx));

        let handle = runtime.spawn_core_thread(platform_rx).unwrap();

        assert_eq!(frames_rx.recv_timeout(Duration::from_secs(5)), Ok(16));
        platform_tx.send(PlatformEvent::WindowClosed).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn setups_and_input_reach_the_game() {
        let (pressed_tx, pressed_rx) = unbounded();
        let (platform_tx, platform_rx) = unbounded();

        let mut runtime = CoreRuntime::new();
        runtime.fps = 200.0;
        runtime.setups.push(Box::new(move |game: &mut Game| {
            game.current_scene_mut().on_update(move |scene, _| {
                if scene.console().borrow().controller().is_pressed(Button::A) {
                    let _ = pressed_tx.send(());
                }
            });
        }));

        let handle = runtime.spawn_core_thread(platform_rx).unwrap();
        platform_tx
            .send(PlatformEvent::Buttons(vec![ButtonEvent::Pressed(Button::A)]))
            .unwrap();

        assert!(pressed_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        drop(platform_tx);
        handle.join().unwrap();
    }
}
