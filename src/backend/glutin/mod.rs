/*!

Backend implementation for the glutin library.

The window is created hidden in automatic mode, since nothing needs to be shown to run a test.
It is still backed by a real window surface so that the default framebuffer has the requested
size.

# Features

Only available if the 'glutin_backend' feature is enabled.

*/
use std::error::Error;
use std::ffi::CString;
use std::fmt;
use std::num::NonZeroU32;
use std::ops::Deref;
use std::os::raw::c_void;
use std::rc::Rc;

use ::glutin::config::{ConfigTemplateBuilder, GlConfig};
use ::glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use ::glutin::display::{GetGlDisplay, GlDisplay};
use ::glutin::prelude::{NotCurrentGlContext, PossiblyCurrentGlContext};
use ::glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::backend::{Backend, Facade};
use crate::context::{Context, ContextCreationError};
use crate::framework::Config;

/// Error that can happen while creating the test window.
#[derive(Debug)]
pub enum WindowCreationError {
    /// The event loop could not be created.
    EventLoop(winit::error::EventLoopError),
    /// No window or no matching GL config could be created.
    Display(String),
    /// The window has a zero width or height.
    ZeroSize,
    /// glutin failed to create the context or the surface.
    Context(::glutin::error::Error),
    /// The context was created but the harness can't use it.
    Incompatible(ContextCreationError),
}

impl fmt::Display for WindowCreationError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowCreationError::EventLoop(err) =>
                write!(fmt, "Failed to create the event loop: {}", err),
            WindowCreationError::Display(err) =>
                write!(fmt, "Failed to create the window: {}", err),
            WindowCreationError::ZeroSize =>
                fmt.write_str("The window has a zero width or height"),
            WindowCreationError::Context(err) =>
                write!(fmt, "Failed to create the GL context: {}", err),
            WindowCreationError::Incompatible(err) => fmt::Display::fmt(err, fmt),
        }
    }
}

impl Error for WindowCreationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WindowCreationError::EventLoop(err) => Some(err),
            WindowCreationError::Context(err) => Some(err),
            WindowCreationError::Incompatible(err) => Some(err),
            WindowCreationError::Display(_) | WindowCreationError::ZeroSize => None,
        }
    }
}

impl From<::glutin::error::Error> for WindowCreationError {
    #[inline]
    fn from(err: ::glutin::error::Error) -> WindowCreationError {
        WindowCreationError::Context(err)
    }
}

impl From<ContextCreationError> for WindowCreationError {
    #[inline]
    fn from(err: ContextCreationError) -> WindowCreationError {
        WindowCreationError::Incompatible(err)
    }
}

/// An implementation of the `Backend` trait for glutin.
pub struct GlutinBackend {
    // dropped in this order: the surface must go before the window
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
}

unsafe impl Backend for GlutinBackend {
    fn swap_buffers(&self) {
        if let Err(err) = self.surface.swap_buffers(&self.context) {
            log::error!("failed to swap buffers: {}", err);
        }
    }

    unsafe fn get_proc_address(&self, symbol: &str) -> *const c_void {
        match CString::new(symbol) {
            Ok(symbol) => self.context.display().get_proc_address(&symbol),
            Err(_) => std::ptr::null(),
        }
    }

    #[inline]
    fn get_framebuffer_dimensions(&self) -> (u32, u32) {
        self.window.inner_size().into()
    }

    #[inline]
    fn is_current(&self) -> bool {
        self.context.is_current()
    }

    unsafe fn make_current(&self) {
        if let Err(err) = self.context.make_current(&self.surface) {
            log::error!("failed to make the context current: {}", err);
        }
    }
}

/// The window of a test program, with its context.
pub struct TestWindow {
    event_loop: EventLoop<()>,
    context: Rc<Context>,
}

impl TestWindow {
    /// Shows the window and processes its events until it is closed or Escape is pressed.
    ///
    /// `redraw` is called whenever the window needs to be drawn again.
    pub fn wait_for_close<R>(self, redraw: R)
        where R: FnMut(&Rc<Context>)
    {
        let mut handler = CloseHandler { context: self.context, redraw };

        if let Err(err) = self.event_loop.run_app(&mut handler) {
            log::warn!("event loop stopped with an error: {}", err);
        }
    }
}

impl Deref for TestWindow {
    type Target = Context;

    #[inline]
    fn deref(&self) -> &Context {
        &self.context
    }
}

impl Facade for TestWindow {
    #[inline]
    fn get_context(&self) -> &Rc<Context> {
        &self.context
    }
}

struct CloseHandler<R> {
    context: Rc<Context>,
    redraw: R,
}

impl<R: FnMut(&Rc<Context>)> ApplicationHandler for CloseHandler<R> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed &&
                   event.logical_key == Key::Named(NamedKey::Escape)
                {
                    event_loop.exit();
                }
            },
            WindowEvent::RedrawRequested => (self.redraw)(&self.context),
            _ => (),
        }
    }
}

/// Opens the test window and creates the harness context for it.
///
/// The window is visible only when `config.auto` is false. If `config.gl_version` is set, a
/// context of at least that version is requested.
pub fn build_window(config: &Config) -> Result<TestWindow, WindowCreationError> {
    let event_loop = EventLoop::new().map_err(WindowCreationError::EventLoop)?;

    let attributes = Window::default_attributes()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(config.window_width, config.window_height))
        .with_resizable(false)
        .with_visible(!config.auto);

    let display_builder = DisplayBuilder::new().with_window_attributes(Some(attributes));
    let template = ConfigTemplateBuilder::new().with_alpha_size(8);

    // glutin reports an error before calling the picker if no config matches
    let (window, gl_config) = display_builder
        .build(&event_loop, template, |configs| {
            configs
                .reduce(|best, config| {
                    if config.num_samples() < best.num_samples() { config } else { best }
                })
                .expect("at least one GL config")
        })
        .map_err(|err| WindowCreationError::Display(err.to_string()))?;

    let window = window.ok_or_else(|| {
        WindowCreationError::Display("no window was created".to_owned())
    })?;

    let raw_window_handle = window.window_handle()
        .map_err(|err| WindowCreationError::Display(err.to_string()))?
        .as_raw();

    let (width, height): (u32, u32) = window.inner_size().into();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width).ok_or(WindowCreationError::ZeroSize)?,
        NonZeroU32::new(height).ok_or(WindowCreationError::ZeroSize)?,
    );

    let mut context_attributes = ContextAttributesBuilder::new();
    if let Some((major, minor)) = config.gl_version {
        context_attributes = context_attributes
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))));
    }
    let context_attributes = context_attributes.build(Some(raw_window_handle));

    let display = gl_config.display();
    let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes)? };
    let context = unsafe { display.create_context(&gl_config, &context_attributes)? }
        .make_current(&surface)?;

    log::debug!("created a {}x{} window with {} samples", width, height,
                gl_config.num_samples());

    let backend = GlutinBackend { context, surface, window };
    let context = unsafe { Context::new(backend)? };

    Ok(TestWindow { event_loop, context })
}
