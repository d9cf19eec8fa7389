//! Compiling GLSL shaders and linking programs.
//!
//! Compile and link failures are regular outcomes here: many tests check that some shader is
//! rejected. The `*_nothrow` and `*_quiet` helpers return the failed object and print the
//! compiler log on stdout, so that the runner doesn't flag the expected failure. The plain
//! helpers print on stderr and turn the failure into a `ProgramCreationError`.

use std::error::Error;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::backend::Facade;
use crate::result::TestError;

pub use self::program::{build_simple_program, link_check_status, link_check_status_quiet};
pub use self::program::{link_check_status_with, link_program, link_simple_program};
pub use self::program::{unuse_program, Program};
pub use self::shader::{check_stage_compatibility, compile_shader, compile_shader_text};
pub use self::shader::{compile_shader_nothrow, compile_shader_text_nothrow, shader_path};
pub use self::shader::{source_dir, Shader, ShaderStage};

pub mod fns;
mod program;
mod shader;

/// Error that can be triggered when creating a `Shader` or a `Program`.
#[derive(Clone, Debug)]
pub enum ProgramCreationError {
    /// Error while compiling a shader.
    CompilationError(String, ShaderStage),

    /// Error while linking the program.
    LinkingError(String),

    /// The requested shader stage is not supported by the context.
    ShaderTypeNotSupported,

    /// The context can't compile shaders at all.
    CompilationNotSupported,

    /// A shader file could not be read.
    SourceUnavailable(PathBuf, String),
}

impl fmt::Display for ProgramCreationError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramCreationError::CompilationError(log, stage) =>
                write!(fmt, "Failed to compile {} shader: {}", stage, log),
            ProgramCreationError::LinkingError(log) =>
                write!(fmt, "Failed to link: {}", log),
            ProgramCreationError::ShaderTypeNotSupported =>
                fmt.write_str("The requested shader stage is not supported by the context"),
            ProgramCreationError::CompilationNotSupported =>
                fmt.write_str("The context doesn't support shader compilation"),
            ProgramCreationError::SourceUnavailable(path, err) =>
                write!(fmt, "Couldn't read shader {}: {}", path.display(), err),
        }
    }
}

impl Error for ProgramCreationError {}

/// Where compiler and linker logs go.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verbosity {
    /// Print on stderr. The runner treats stderr output as suspicious.
    Loud,
    /// Print on stdout, for failures the test expects.
    Quiet,
}

impl Verbosity {
    fn emit(self, message: &str) {
        match self {
            Verbosity::Loud => {
                eprintln!("{}", message);
                let _ = io::stderr().flush();
            },
            Verbosity::Quiet => println!("{}", message),
        }
    }
}

/// Returns the GLSL version of the context as `(major, minor)`, with the minor number as
/// written in the version string (`1.30` is `(1, 30)`).
pub fn get_glsl_version<F: ?Sized + Facade>(facade: &F) -> Option<(u8, u8)> {
    facade.get_context().get_glsl_version().map(|v| (v.1, v.2))
}

/// Skips the test unless the context supports GLSL.
pub fn require_glsl<F: ?Sized + Facade>(facade: &F) -> Result<(), TestError> {
    match facade.get_context().shader_fns() {
        Some(_) => Ok(()),
        None => Err(TestError::Skip("GLSL not supported.".to_owned())),
    }
}

/// Skips the test unless the context supports at least the given GLSL version.
pub fn require_glsl_version<F: ?Sized + Facade>(facade: &F, major: u8, minor: u8)
                                                -> Result<(), TestError>
{
    require_glsl(facade)?;

    match get_glsl_version(facade) {
        Some(version) if glsl_version_at_least(version, (major, minor)) => Ok(()),
        _ => Err(TestError::Skip(format!("GLSL {}.{} not supported.", major, minor))),
    }
}

/// Compares GLSL versions whose minor numbers are written with two digits.
///
/// `(1, 3)` is understood as `1.30`.
pub fn glsl_version_at_least(version: (u8, u8), required: (u8, u8)) -> bool {
    fn normalize((major, minor): (u8, u8)) -> (u8, u8) {
        if minor < 10 && minor != 0 { (major, minor * 10) } else { (major, minor) }
    }

    normalize(version) >= normalize(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glsl_comparisons() {
        assert!(glsl_version_at_least((1, 30), (1, 30)));
        assert!(glsl_version_at_least((1, 50), (1, 30)));
        assert!(glsl_version_at_least((4, 60), (1, 10)));
        assert!(glsl_version_at_least((1, 30), (1, 3)));
        assert!(!glsl_version_at_least((1, 20), (1, 30)));
        assert!(!glsl_version_at_least((3, 0), (3, 10)));
    }

    #[test]
    fn error_messages() {
        let err = ProgramCreationError::CompilationError("0:1: syntax error".to_owned(),
                                                         ShaderStage::Fragment);
        assert_eq!(err.to_string(), "Failed to compile fragment shader: 0:1: syntax error");

        let err: TestError = ProgramCreationError::LinkingError("oops".to_owned()).into();
        assert_eq!(err, TestError::Fail("Failed to link: oops".to_owned()));
    }
}
