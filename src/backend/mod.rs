/*!

The `backend` module allows one to link between the harness and the OpenGL context.

There are three concepts in play:

 - The `Backend` trait describes the glue between the harness and the OpenGL context provider
   like glutin, SDL, GLFW, etc.
 - The `Context` struct is the main brick of the harness. It manages the loaded entry points,
   the detected version and extensions, and the shader entry points selected at startup.
 - The `Facade` trait. Calling `get_context` on a facade returns the `Context` the helpers
   operate on.

*/
use std::ops::Deref;
use std::os::raw::c_void;
use std::rc::Rc;

pub use crate::context::Context;

#[cfg(feature = "glutin_backend")]
pub mod glutin;

/// Trait for types that can be used as a backend for a harness context.
///
/// This trait is unsafe, as you can get undefined behaviors or crashes if you don't implement
/// the methods correctly.
pub unsafe trait Backend {
    /// Swaps buffers at the end of a frame.
    fn swap_buffers(&self);

    /// Returns the address of an OpenGL function.
    ///
    /// Must be called in the same thread and after the backend has been made current
    /// with `make_current`.
    unsafe fn get_proc_address(&self, symbol: &str) -> *const c_void;

    /// Returns the dimensions of the window, or screen, etc.
    fn get_framebuffer_dimensions(&self) -> (u32, u32);

    /// Returns true if the OpenGL context is the current one in the thread.
    fn is_current(&self) -> bool;

    /// Makes the OpenGL context the current context in the current thread.
    unsafe fn make_current(&self);
}

unsafe impl<T> Backend for Rc<T> where T: Backend {
    fn swap_buffers(&self) {
        self.deref().swap_buffers();
    }

    unsafe fn get_proc_address(&self, symbol: &str) -> *const c_void {
        self.deref().get_proc_address(symbol)
    }

    fn get_framebuffer_dimensions(&self) -> (u32, u32) {
        self.deref().get_framebuffer_dimensions()
    }

    fn is_current(&self) -> bool {
        self.deref().is_current()
    }

    unsafe fn make_current(&self) {
        self.deref().make_current();
    }
}

/// Trait for types that provide a safe access for OpenGL functions.
pub trait Facade {
    /// Returns an opaque type that contains the OpenGL state, extensions, version, etc.
    fn get_context(&self) -> &Rc<Context>;
}

impl Facade for Rc<Context> {
    #[inline]
    fn get_context(&self) -> &Rc<Context> {
        self
    }
}
