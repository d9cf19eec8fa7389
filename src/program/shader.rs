use std::ffi::CString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::backend::Facade;
use crate::context::Context;
use crate::gl;
use crate::version::{Api, Version};
use crate::Handle;

use super::{ProgramCreationError, Verbosity};

/// A programmable stage of the pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Tessellation control shader.
    TessControl,
    /// Tessellation evaluation shader.
    TessEvaluation,
    /// Geometry shader.
    Geometry,
    /// Fragment shader.
    Fragment,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// Returns the `GLenum` naming this stage.
    pub fn to_glenum(self) -> gl::types::GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::TessControl => gl::TESS_CONTROL_SHADER,
            ShaderStage::TessEvaluation => gl::TESS_EVALUATION_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Compute => gl::COMPUTE_SHADER,
        }
    }

    /// Returns the stage named by a `GLenum`.
    pub fn from_glenum(value: gl::types::GLenum) -> Option<ShaderStage> {
        Some(match value {
            gl::VERTEX_SHADER => ShaderStage::Vertex,
            gl::TESS_CONTROL_SHADER => ShaderStage::TessControl,
            gl::TESS_EVALUATION_SHADER => ShaderStage::TessEvaluation,
            gl::GEOMETRY_SHADER => ShaderStage::Geometry,
            gl::FRAGMENT_SHADER => ShaderStage::Fragment,
            gl::COMPUTE_SHADER => ShaderStage::Compute,
            _ => return None,
        })
    }

    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

/// A single shader object.
///
/// The object is returned whether compilation succeeded or not, since some tests check that
/// compilation fails. Use `is_compiled` to find out.
pub struct Shader {
    context: Rc<Context>,
    id: Handle,
    stage: ShaderStage,
    compiled: bool,
}

impl Shader {
    /// Returns the OpenGL handle of the shader.
    #[inline]
    pub fn get_id(&self) -> Handle {
        self.id
    }

    /// Returns the stage of the shader.
    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Returns true if the shader compiled successfully.
    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Shader")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("compiled", &self.compiled)
            .finish()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if let Some(fns) = self.context.shader_fns() {
            unsafe { fns.delete_shader(self.context.gl(), self.id); }
        }
    }
}

/// Returns true if the context can compile shaders of this stage.
pub fn check_stage_compatibility(ctxt: &Context, stage: ShaderStage) -> bool {
    let version = ctxt.get_version();
    let extensions = ctxt.get_extensions();

    match stage {
        ShaderStage::Vertex | ShaderStage::Fragment => true,
        ShaderStage::Geometry => {
            version >= &Version(Api::Gl, 3, 2) || version >= &Version(Api::GlEs, 3, 2) ||
                extensions.gl_arb_geometry_shader4 || extensions.gl_ext_geometry_shader4
        },
        ShaderStage::TessControl | ShaderStage::TessEvaluation => {
            version >= &Version(Api::Gl, 4, 0) || version >= &Version(Api::GlEs, 3, 2) ||
                extensions.gl_arb_tessellation_shader
        },
        ShaderStage::Compute => {
            version >= &Version(Api::Gl, 4, 3) || version >= &Version(Api::GlEs, 3, 1) ||
                extensions.gl_arb_compute_shader
        },
    }
}

/// Compiles a shader and prints the compiler log with the given verbosity if it fails.
///
/// A compilation failure is not an error: the returned shader reports it through
/// `is_compiled`. Errors are reserved for contexts that can't compile this stage at all.
pub fn compile_shader_text_nothrow<F: ?Sized>(facade: &F, stage: ShaderStage, source: &str,
                                              verbosity: Verbosity)
                                              -> Result<Shader, ProgramCreationError>
    where F: Facade
{
    let ctxt = facade.get_context();

    let fns = ctxt.shader_fns().ok_or(ProgramCreationError::CompilationNotSupported)?;
    if !check_stage_compatibility(ctxt, stage) {
        return Err(ProgramCreationError::ShaderTypeNotSupported);
    }

    let source_code = CString::new(source.as_bytes()).map_err(|_| {
        ProgramCreationError::CompilationError("the source contains a NUL byte".to_owned(),
                                               stage)
    })?;

    let gl = ctxt.gl();
    let id = unsafe { fns.create_shader(gl, stage.to_glenum()) };
    if id.is_null() {
        return Err(ProgramCreationError::ShaderTypeNotSupported);
    }

    let mut shader = Shader { context: ctxt.clone(), id, stage, compiled: false };

    unsafe {
        fns.shader_source(gl, id, &source_code);
        fns.compile_shader(gl, id);
        shader.compiled = fns.compile_status(gl, id);
    }

    if shader.compiled {
        log::debug!("compiled {} shader {:?}", stage, id);
    } else {
        let info = unsafe { fns.shader_info_log(gl, id) };
        verbosity.emit(&format!("Failed to compile {} shader: {}", stage, info));
        verbosity.emit(&format!("source:\n{}", source));
    }

    Ok(shader)
}

/// Compiles a shader, treating a compilation failure as an error.
///
/// The compiler log is printed on stderr before the error is returned.
pub fn compile_shader_text<F: ?Sized>(facade: &F, stage: ShaderStage, source: &str)
                                      -> Result<Shader, ProgramCreationError>
    where F: Facade
{
    let shader = compile_shader_text_nothrow(facade, stage, source, Verbosity::Loud)?;

    if shader.is_compiled() {
        Ok(shader)
    } else {
        let ctxt = facade.get_context();
        let info = match ctxt.shader_fns() {
            Some(fns) => unsafe { fns.shader_info_log(ctxt.gl(), shader.id) },
            None => String::new(),
        };
        Err(ProgramCreationError::CompilationError(info, stage))
    }
}

/// Returns the directory shader files are looked up in.
///
/// `PIGLIT_SOURCE_DIR` overrides the source tree this crate was built from.
pub fn source_dir() -> PathBuf {
    match std::env::var_os("PIGLIT_SOURCE_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")),
    }
}

/// Returns the path of a shader file, relative to the `tests` directory of the source tree.
pub fn shader_path(file: &str) -> PathBuf {
    source_dir().join("tests").join(file)
}

fn read_source(path: &Path) -> Result<String, ProgramCreationError> {
    fs::read_to_string(path)
        .map_err(|err| ProgramCreationError::SourceUnavailable(path.to_owned(), err.to_string()))
}

/// Loads a shader from the source tree and compiles it, printing the compiler log with the
/// given verbosity if it fails.
///
/// Like `compile_shader_text_nothrow`, a compilation failure is reported through
/// `is_compiled`. A missing file is an error.
pub fn compile_shader_nothrow<F: ?Sized>(facade: &F, stage: ShaderStage, file: &str,
                                         verbosity: Verbosity)
                                         -> Result<Shader, ProgramCreationError>
    where F: Facade
{
    let path = shader_path(file);
    let source = read_source(&path)?;

    log::debug!("loaded {} shader from {}", stage, path.display());
    compile_shader_text_nothrow(facade, stage, &source, verbosity)
}

/// Loads a shader from the source tree and compiles it.
pub fn compile_shader<F: ?Sized>(facade: &F, stage: ShaderStage, file: &str)
                                 -> Result<Shader, ProgramCreationError>
    where F: Facade
{
    let path = shader_path(file);
    let source = read_source(&path)?;

    log::debug!("loaded {} shader from {}", stage, path.display());
    compile_shader_text(facade, stage, &source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_enums() {
        for stage in [ShaderStage::Vertex, ShaderStage::TessControl,
                      ShaderStage::TessEvaluation, ShaderStage::Geometry,
                      ShaderStage::Fragment, ShaderStage::Compute]
        {
            assert_eq!(ShaderStage::from_glenum(stage.to_glenum()), Some(stage));
        }

        assert_eq!(ShaderStage::from_glenum(gl::TEXTURE_2D), None);
        assert_eq!(ShaderStage::TessControl.to_string(), "tessellation control");
    }

    #[test]
    fn shader_paths() {
        let path = shader_path("shaders/glsl-mat-attribute.vert");
        assert!(path.ends_with("tests/shaders/glsl-mat-attribute.vert"));
    }

    #[test]
    fn shader_sources() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        assert!(read_source(&manifest).unwrap().contains("piglit-util"));

        let missing = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/no-such-shader.vert");
        match read_source(&missing) {
            Err(ProgramCreationError::SourceUnavailable(path, _)) => assert_eq!(path, missing),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
