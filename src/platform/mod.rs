//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the core thread via a crossbeam
// channel.
//
// Architecture:
// ```text
//  Main Thread:                     Core Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  Winit Event Loop        │    │  CoreRuntime     │
//  │   ↓                      │    │   ↓              │
//  │  InputProcessor          │    │  Console         │
//  │   └─ keys → buttons      │    │   ↓              │
//  │   ↓                      │    │  Game / Scene    │
//  │  InputBuffer             │    │                  │
//  │   ↓                      │    └──────────────────┘
//  │  RedrawRequested         │             ↑
//  │   ↓ (flush)              │             │
//  │  Channel ────────────────┼─────────────┘
//  └──────────────────────────┘    PlatformEvent
// ```
//
// RedrawRequested is the frame boundary: all button transitions buffered
// since the previous redraw are sent as one batch. Empty batches are not
// sent. If the core thread is gone, sends fail with a warning and the
// window stays closable.
//
// Winit requires the main thread on macOS/iOS, so this runs on the thread
// that called `Engine::run()`.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{PlatformError, PlatformEvent};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== Platform ============================================================

/// Window owner and button aggregator. Not Send; lives on the main thread.
pub(crate) struct Platform {
    /// Created lazily in `resumed()`.
    window: Option<Window>,
    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    input_processor: InputProcessor,
    title: String,
    size: (u32, u32),
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub fn new(event_sender: Sender<PlatformEvent>, title: String, size: (u32, u32)) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
            title,
            size,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the window closes.
    ///
    /// # Errors
    ///
    /// [`PlatformError`] if the event loop cannot be created or fails while
    /// running.
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered button transitions to the core thread.
    fn flush_input_buffer(&mut self) {
        if let Some(buttons) = self.buffer.drain() {
            let count = buttons.len();
            trace!(target: "platform::input", "Flushing {} button events", count);

            if self.event_sender.send(PlatformEvent::Buttons(buttons)).is_err() {
                warn!(
                    target: "platform::input",
                    "Channel disconnected, dropping {} button events",
                    count
                );
            }
        }
    }

    fn request_close(&self, event_loop: &ActiveEventLoop) {
        let _ = self.event_sender.send(PlatformEvent::WindowClosed);
        event_loop.exit();
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.request_close(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.request_close(event_loop);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(button) = self.input_processor.process_key_event(key_event) {
                    self.buffer.push(button);
                } else {
                    trace!(target: "platform::input", "Unmapped or repeated key ignored");
                }
            }

            WindowEvent::RedrawRequested => {
                self.flush_input_buffer();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controller::{Button, ButtonEvent};
    use crossbeam_channel::unbounded;

    fn platform(sender: Sender<PlatformEvent>) -> Platform {
        Platform::new(sender, "test".to_string(), (320, 240))
    }

    #[test]
    fn platform_creation() {
        let (tx, _rx) = unbounded();
        let platform = platform(tx);
        assert!(platform.window().is_none(), "Window should be created lazily");
    }

    #[test]
    fn flush_empty_buffer_is_noop() {
        let (tx, rx) = unbounded();
        let mut platform = platform(tx);

        platform.flush_input_buffer();

        assert!(rx.try_recv().is_err(), "No events should be sent for empty buffer");
    }

    #[test]
    fn flush_sends_buffered_buttons() {
        let (tx, rx) = unbounded();
        let mut platform = platform(tx);
        platform.buffer.push(ButtonEvent::Pressed(Button::A));

        platform.flush_input_buffer();

        assert_eq!(
            rx.try_recv(),
            Ok(PlatformEvent::Buttons(vec![ButtonEvent::Pressed(Button::A)]))
        );
    }

    #[test]
    fn flush_handles_disconnected_channel() {
        let (tx, rx) = unbounded();
        let mut platform = platform(tx);
        platform.buffer.push(ButtonEvent::Pressed(Button::B));
        drop(rx);

        platform.flush_input_buffer();
        assert!(platform.buffer.is_empty());
    }

    #[test]
    fn multiple_flushes_clear_buffer() {
        let (tx, rx) = unbounded();
        let mut platform = platform(tx);
        platform.buffer.push(ButtonEvent::Pressed(Button::Left));

        platform.flush_input_buffer();
        platform.flush_input_buffer();

        assert!(rx.try_recv().is_ok(), "First flush should send");
        assert!(rx.try_recv().is_err(), "Second flush should not send");
    }
}
