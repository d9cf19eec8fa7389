/*!
Shared support library for OpenGL test programs.

Each test program is a small, linear executable: it creates a context, issues a fixed sequence
of OpenGL calls exercising one behavior, inspects the resulting pixels or state, and reports a
verdict to the external test runner with one line on stdout and a process exit code.

This crate holds the pieces every test needs:

 - [`result`]: the verdict vocabulary (`pass`, `fail`, `skip`, `warn`) and the
   `PIGLIT: {'result': ...}` reporting protocol.
 - [`probe`]: reading back framebuffer pixels and comparing them to expected colors.
 - [`program`]: compiling GLSL shaders, linking programs and interpreting their status.
 - [`minmax`]: checking implementation-defined limits against required bounds.
 - [`vbo`]: describing vertex data as a small text table and uploading it.
 - [`framework`]: running a test's `init`/`display` steps and turning errors into verdicts.

# Example

```no_run
use piglit_util::framework::{self, Config, Test};
use piglit_util::result::{TestError, TestResult};
use piglit_util::Context;
use std::rc::Rc;

struct ClearTest;

impl Test for ClearTest {
    fn display(&mut self, ctxt: &Rc<Context>) -> Result<TestResult, TestError> {
        unsafe {
            ctxt.gl().ClearColor(0.0, 1.0, 0.0, 1.0);
            ctxt.gl().Clear(piglit_util::gl::COLOR_BUFFER_BIT);
        }

        let pass = piglit_util::probe::probe_pixel_rgb(ctxt, 0, 0, &[0.0, 1.0, 0.0]);
        Ok(if pass { TestResult::Pass } else { TestResult::Fail })
    }
}

fn main() {
    let config = Config::from_env_and_args(std::env::args().skip(1));
    framework::main(config, ClearTest);
}
```

*/
#![warn(missing_docs)]

pub use crate::backend::{Backend, Facade};
pub use crate::context::{Capabilities, Context, ContextCreationError, ExtensionsList};
pub use crate::result::{TestError, TestResult};
pub use crate::version::{Api, Version};

#[macro_use]
mod macros;

pub mod backend;
pub mod context;
pub mod enums;
pub mod framework;
pub mod minmax;
pub mod probe;
pub mod program;
pub mod result;
pub mod vbo;
pub mod version;

/// Raw OpenGL bindings.
///
/// Test programs issue most of their OpenGL calls directly through [`Context::gl`].
#[allow(missing_docs, clippy::all, non_upper_case_globals, unused_imports)]
pub mod gl {
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

/// Handle to a shader or a program.
///
/// Contexts that support OpenGL 2.0 or ES 2.0 hand out plain object names. Older contexts
/// exposing `GL_ARB_shader_objects` hand out `GLhandleARB` values instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
    /// A regular object name.
    Id(gl::types::GLuint),
    /// A `GL_ARB_shader_objects` handle.
    Handle(gl::types::GLhandleARB),
}

impl Handle {
    /// Returns true if this is the zero handle, which OpenGL uses to report a failed creation.
    #[inline]
    pub fn is_null(&self) -> bool {
        match *self {
            Handle::Id(id) => id == 0,
            Handle::Handle(handle) => handle == 0 as gl::types::GLhandleARB,
        }
    }
}
