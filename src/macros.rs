//! Defines useful macros for test programs.

/// Calls the `check_gl_error_at` method on a `Context` with file and line number information.
///
/// The first argument is the context and the second one the expected error. The expected
/// error defaults to `GL_NO_ERROR`.
///
/// ## Example
/// ```ignore rust
/// pass &= check_gl_error!(ctxt);
/// pass &= check_gl_error!(ctxt, gl::INVALID_VALUE);
/// ```
#[macro_export]
macro_rules! check_gl_error {
    ($ctxt: expr) => {
        $crate::check_gl_error!($ctxt, $crate::gl::NO_ERROR)
    };
    ($ctxt: expr, $expected: expr) => {
        $ctxt.check_gl_error_at($expected, Some((file!(), line!())))
    };
}
