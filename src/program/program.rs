use std::ffi::CString;
use std::fmt;
use std::rc::Rc;

use crate::backend::Facade;
use crate::context::Context;
use crate::Handle;

use super::{ProgramCreationError, Shader, ShaderStage, Verbosity};
use super::shader::compile_shader_text;

/// A program object, linked or not.
///
/// Like shaders, programs that fail to link are still returned so that tests can check the
/// failure. Use `is_linked` or `link_check_status`.
pub struct Program {
    context: Rc<Context>,
    id: Handle,
    linked: bool,
}

impl Program {
    /// Returns the OpenGL handle of the program.
    #[inline]
    pub fn get_id(&self) -> Handle {
        self.id
    }

    /// Returns true if the last link succeeded.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Returns the location of an active vertex attribute.
    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        let fns = self.context.shader_fns()?;
        let name = CString::new(name).ok()?;

        let location = unsafe { fns.attrib_location(self.context.gl(), self.id, &name) };
        if location < 0 {
            None
        } else {
            Some(location as u32)
        }
    }

    /// Makes this program the current one.
    pub fn use_program(&self) {
        if let Some(fns) = self.context.shader_fns() {
            unsafe { fns.use_program(self.context.gl(), Some(self.id)); }
        }
    }

    /// Returns the info log of the program.
    pub fn info_log(&self) -> String {
        match self.context.shader_fns() {
            Some(fns) => unsafe { fns.program_info_log(self.context.gl(), self.id) },
            None => String::new(),
        }
    }

    fn query_link_status(&self) -> bool {
        match self.context.shader_fns() {
            Some(fns) => unsafe { fns.link_status(self.context.gl(), self.id) },
            None => false,
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Program")
            .field("id", &self.id)
            .field("linked", &self.linked)
            .finish()
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        if let Some(fns) = self.context.shader_fns() {
            unsafe { fns.delete_program(self.context.gl(), self.id); }
        }
    }
}

impl Facade for Program {
    #[inline]
    fn get_context(&self) -> &Rc<Context> {
        &self.context
    }
}

/// Unbinds the current program.
pub fn unuse_program<F: ?Sized + Facade>(facade: &F) {
    let ctxt = facade.get_context();
    if let Some(fns) = ctxt.shader_fns() {
        unsafe { fns.use_program(ctxt.gl(), None); }
    }
}

/// Attaches the shaders to a new program and links it, without printing anything.
pub fn link_program<F: ?Sized>(facade: &F, shaders: &[&Shader])
                               -> Result<Program, ProgramCreationError>
    where F: Facade
{
    let ctxt = facade.get_context();
    let fns = ctxt.shader_fns().ok_or(ProgramCreationError::CompilationNotSupported)?;
    let gl = ctxt.gl();

    let id = unsafe { fns.create_program(gl) };
    if id.is_null() {
        return Err(ProgramCreationError::LinkingError("glCreateProgram returned 0".to_owned()));
    }

    let linked = unsafe {
        for shader in shaders {
            fns.attach_shader(gl, id, shader.get_id());
        }
        fns.link_program(gl, id);
        fns.link_status(gl, id)
    };

    log::debug!("linked program {:?} from {} shaders: {}", id, shaders.len(), linked);
    Ok(Program { context: ctxt.clone(), id, linked })
}

/// Queries the link status of a program, printing the info log with the given verbosity if
/// the link failed.
pub fn link_check_status_with(program: &Program, verbosity: Verbosity) -> bool {
    let ok = program.query_link_status();
    if !ok {
        verbosity.emit(&format!("Failed to link: {}", program.info_log()));
    }
    ok
}

/// Queries the link status of a program, printing the info log on stderr on failure.
pub fn link_check_status(program: &Program) -> bool {
    link_check_status_with(program, Verbosity::Loud)
}

/// Same as `link_check_status`, but prints the log on stdout.
///
/// Meant for tests that expect the link to fail.
pub fn link_check_status_quiet(program: &Program) -> bool {
    link_check_status_with(program, Verbosity::Quiet)
}

/// Links a vertex and a fragment shader, either of which may be absent.
///
/// A link failure is printed on stderr and returned as an error.
pub fn link_simple_program<F: ?Sized>(facade: &F, vertex: Option<&Shader>,
                                      fragment: Option<&Shader>)
                                      -> Result<Program, ProgramCreationError>
    where F: Facade
{
    let shaders: Vec<&Shader> = vertex.into_iter().chain(fragment).collect();
    let program = link_program(facade, &shaders)?;

    if link_check_status(&program) {
        Ok(program)
    } else {
        Err(ProgramCreationError::LinkingError(program.info_log()))
    }
}

/// Compiles the given sources and links them into a program.
pub fn build_simple_program<F: ?Sized>(facade: &F, vertex: Option<&str>,
                                       fragment: Option<&str>)
                                       -> Result<Program, ProgramCreationError>
    where F: Facade
{
    let vertex = match vertex {
        Some(source) => Some(compile_shader_text(facade, ShaderStage::Vertex, source)?),
        None => None,
    };
    let fragment = match fragment {
        Some(source) => Some(compile_shader_text(facade, ShaderStage::Fragment, source)?),
        None => None,
    };

    // the shaders are deleted when dropped, the program keeps them alive while attached
    link_simple_program(facade, vertex.as_ref(), fragment.as_ref())
}
