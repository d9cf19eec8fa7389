//! The `Context` holds the loaded entry points and everything detected about the
//! implementation when it was created.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use crate::backend::Backend;
use crate::enums;
use crate::gl;
use crate::program::fns::{self, ShaderFns};
use crate::result::TestError;
use crate::version::{self, Api, Version};

pub use self::capabilities::{Capabilities, IntegerAttribApi, ShaderApi};
pub use self::extensions::ExtensionsList;

pub mod capabilities;
pub mod extensions;

/// Error that can happen while creating a context.
#[derive(Clone, Debug)]
pub enum ContextCreationError {
    /// `glGetString(GL_VERSION)` returned NULL. Usually means no context is current.
    VersionUnavailable,

    /// The version string could not be understood.
    UnparsableVersion(String),
}

impl fmt::Display for ContextCreationError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextCreationError::VersionUnavailable =>
                write!(fmt, "The OpenGL implementation did not report a version"),
            ContextCreationError::UnparsableVersion(s) =>
                write!(fmt, "Unable to parse the OpenGL version string `{}`", s),
        }
    }
}

impl Error for ContextCreationError {}

/// Stores the state and information required for the test helpers to interact with OpenGL.
pub struct Context {
    gl: gl::Gl,
    version: Version,
    extensions: ExtensionsList,
    capabilities: Capabilities,
    shader_fns: Option<&'static dyn ShaderFns>,
    backend: Box<dyn Backend>,
}

impl Context {
    /// Builds a new context.
    ///
    /// The backend is made current, the entry points are loaded and the version, extensions
    /// and capabilities are detected once. The shader entry points are selected here too.
    ///
    /// # Safety
    ///
    /// The backend must implement `Backend` correctly and stay on this thread.
    pub unsafe fn new<B>(backend: B) -> Result<Rc<Context>, ContextCreationError>
        where B: Backend + 'static
    {
        backend.make_current();
        let gl = gl::Gl::load_with(|symbol| backend.get_proc_address(symbol) as *const _);

        let version_string = version::get_gl_string(&gl, gl::VERSION)
            .ok_or(ContextCreationError::VersionUnavailable)?;
        let version = version::parse_gl_version(&version_string)
            .ok_or_else(|| ContextCreationError::UnparsableVersion(version_string.clone()))?;

        let extensions = extensions::get_extensions(&gl, &version);
        let capabilities = capabilities::get_capabilities(&gl, &version, &extensions);
        let shader_fns = fns::select(capabilities.shader_api);

        log::info!("OpenGL version: {} ({})", version, version_string);
        log::debug!("{} extensions, GLSL version {:?}, shader entry points {:?}",
                    extensions.len(), capabilities.glsl_version, capabilities.shader_api);

        Ok(Rc::new(Context {
            gl,
            version,
            extensions,
            capabilities,
            shader_fns,
            backend: Box::new(backend),
        }))
    }

    /// Returns the raw entry points, after making sure the context is current.
    #[inline]
    pub fn gl(&self) -> &gl::Gl {
        self.make_current();
        &self.gl
    }

    /// Returns the OpenGL version of the context.
    #[inline]
    pub fn get_version(&self) -> &Version {
        &self.version
    }

    /// Returns the GLSL version, or `None` if shaders are not supported.
    #[inline]
    pub fn get_glsl_version(&self) -> Option<Version> {
        self.capabilities.glsl_version
    }

    /// Returns the list of extensions advertised by the implementation.
    #[inline]
    pub fn get_extensions(&self) -> &ExtensionsList {
        &self.extensions
    }

    /// Returns the capabilities resolved at creation.
    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the shader entry points selected at creation, if any.
    #[inline]
    pub fn shader_fns(&self) -> Option<&'static dyn ShaderFns> {
        self.shader_fns
    }

    /// Returns the dimensions of the default framebuffer.
    pub fn get_framebuffer_dimensions(&self) -> (u32, u32) {
        self.backend.get_framebuffer_dimensions()
    }

    /// Presents the default framebuffer.
    pub fn swap_buffers(&self) {
        self.make_current();

        unsafe { self.gl.Flush(); }
        self.backend.swap_buffers();
    }

    /// Makes the context current if it isn't already.
    pub fn make_current(&self) {
        if !self.backend.is_current() {
            unsafe { self.backend.make_current(); }
        }
    }

    /// Blocks until every previously issued command has completed.
    pub fn finish(&self) {
        unsafe { self.gl().Finish(); }
    }

    /// Returns true if the implementation advertises the extension.
    #[inline]
    pub fn is_extension_supported(&self, name: &str) -> bool {
        self.extensions.is_supported(name)
    }

    /// Skips the test unless the extension is supported.
    pub fn require_extension(&self, name: &str) -> Result<(), TestError> {
        if self.is_extension_supported(name) {
            Ok(())
        } else {
            Err(TestError::Skip(format!("Test requires {}", name)))
        }
    }

    /// Skips the test unless the extension is *not* supported.
    pub fn require_not_extension(&self, name: &str) -> Result<(), TestError> {
        if self.is_extension_supported(name) {
            Err(TestError::Skip(format!("Test requires the absence of {}", name)))
        } else {
            Ok(())
        }
    }

    /// Skips the test unless this is a desktop context of at least the given version.
    pub fn require_gl_version(&self, major: u8, minor: u8) -> Result<(), TestError> {
        if self.version >= Version(Api::Gl, major, minor) {
            Ok(())
        } else {
            Err(TestError::Skip(format!("Test requires GL version {}.{}", major, minor)))
        }
    }

    /// Pops one error from the error queue.
    pub fn get_error(&self) -> gl::types::GLenum {
        unsafe { self.gl().GetError() }
    }

    /// Checks that the next pending error is `expected`, printing a diagnostic otherwise.
    ///
    /// Use the `check_gl_error!` macro to get the location in the diagnostic.
    pub fn check_gl_error(&self, expected: gl::types::GLenum) -> bool {
        self.check_gl_error_at(expected, None)
    }

    /// Same as `check_gl_error`, with a `(file, line)` location for the diagnostic.
    pub fn check_gl_error_at(&self, expected: gl::types::GLenum,
                             location: Option<(&str, u32)>) -> bool
    {
        check_error_value(self.get_error(), expected, location)
    }

    /// Drains the error queue.
    pub fn reset_gl_error(&self) {
        while self.get_error() != gl::NO_ERROR {}
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Context")
            .field("version", &self.version)
            .field("extensions", &self.extensions.len())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Compares an error returned by `glGetError` with the expected one.
///
/// Prints `Unexpected GL error: ...` on stdout when they differ, followed by the location if
/// there is one and by the expected error if it isn't `GL_NO_ERROR`.
pub fn check_error_value(actual: gl::types::GLenum, expected: gl::types::GLenum,
                         location: Option<(&str, u32)>) -> bool
{
    if actual == expected {
        return true;
    }

    println!("Unexpected GL error: {} 0x{:x}", enums::error_name(actual), actual);
    if let Some((file, line)) = location {
        println!("(Error at {}:{})", file, line);
    }
    if expected != gl::NO_ERROR {
        println!("Expected GL error: {} 0x{:x}", enums::error_name(expected), expected);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::check_error_value;
    use crate::gl;

    #[test]
    fn matching_error() {
        assert!(check_error_value(gl::NO_ERROR, gl::NO_ERROR, None));
        assert!(check_error_value(gl::INVALID_ENUM, gl::INVALID_ENUM, Some(("a.rs", 3))));
    }

    #[test]
    fn mismatching_error() {
        assert!(!check_error_value(gl::INVALID_VALUE, gl::NO_ERROR, None));
        assert!(!check_error_value(gl::NO_ERROR, gl::INVALID_OPERATION, Some(("a.rs", 3))));
    }
}
