//! Window events.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use super::{create_engine, App};

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("mirrorscene")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                self.error = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        match create_engine(window.clone(), &self.config) {
            Ok(engine) => {
                let screen = engine.target_sizes().screen;
                if screen != (self.config.width, self.config.height) {
                    log::warn!(
                        "window is {}x{}, not the configured {}x{}",
                        screen.0,
                        screen.1,
                        self.config.width,
                        self.config.height
                    );
                }
                self.context.set_screen_size(screen);
                self.engine = Some(engine);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("failed to initialize renderer: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                // Targets are sized once; the window is not resizable.
                if let Some(engine) = &self.engine {
                    if (size.width, size.height) != engine.target_sizes().screen {
                        log::warn!(
                            "ignoring resize to {}x{}; render targets stay {:?}",
                            size.width,
                            size.height,
                            engine.target_sizes().screen
                        );
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if self.error.is_some() {
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
