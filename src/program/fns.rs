//! Shader entry points, selected once per context.
//!
//! OpenGL 2.0 and OpenGL ES 2.0 compile shaders with `glCreateShader` and friends. Older
//! desktop implementations expose the same operations through `GL_ARB_shader_objects`, with
//! `GLhandleARB` handles and `ARB`-suffixed names. The context picks one table when it is
//! created and every helper goes through it.

use std::ffi::CStr;
use std::fmt;

use crate::context::ShaderApi;
use crate::gl;
use crate::gl::types::{GLenum, GLint};
use crate::Handle;

/// Operations needed to compile, link and use shaders.
///
/// All methods are unsafe because they call OpenGL: the context owning `gl` must be current
/// and the handles must have been created by the same table.
pub trait ShaderFns: fmt::Debug {
    /// Creates a shader object of the given type.
    unsafe fn create_shader(&self, gl: &gl::Gl, ty: GLenum) -> Handle;
    /// Replaces the source of a shader.
    unsafe fn shader_source(&self, gl: &gl::Gl, shader: Handle, source: &CStr);
    /// Compiles a shader.
    unsafe fn compile_shader(&self, gl: &gl::Gl, shader: Handle);
    /// Returns the compile status of a shader.
    unsafe fn compile_status(&self, gl: &gl::Gl, shader: Handle) -> bool;
    /// Returns the info log of a shader.
    unsafe fn shader_info_log(&self, gl: &gl::Gl, shader: Handle) -> String;
    /// Deletes a shader.
    unsafe fn delete_shader(&self, gl: &gl::Gl, shader: Handle);

    /// Creates a program object.
    unsafe fn create_program(&self, gl: &gl::Gl) -> Handle;
    /// Attaches a shader to a program.
    unsafe fn attach_shader(&self, gl: &gl::Gl, program: Handle, shader: Handle);
    /// Links a program.
    unsafe fn link_program(&self, gl: &gl::Gl, program: Handle);
    /// Returns the link status of a program.
    unsafe fn link_status(&self, gl: &gl::Gl, program: Handle) -> bool;
    /// Returns the info log of a program.
    unsafe fn program_info_log(&self, gl: &gl::Gl, program: Handle) -> String;
    /// Deletes a program.
    unsafe fn delete_program(&self, gl: &gl::Gl, program: Handle);
    /// Binds a program, or unbinds the current one with `None`.
    unsafe fn use_program(&self, gl: &gl::Gl, program: Option<Handle>);
    /// Returns the location of a vertex attribute, or -1.
    unsafe fn attrib_location(&self, gl: &gl::Gl, program: Handle, name: &CStr) -> GLint;
}

/// `glCreateShader` and friends.
#[derive(Debug)]
pub struct CoreShaderFns;

/// `glCreateShaderObjectARB` and friends.
#[derive(Debug)]
pub struct ArbShaderFns;

static CORE: CoreShaderFns = CoreShaderFns;
static ARB: ArbShaderFns = ArbShaderFns;

/// Returns the table matching the shader API of a context.
pub fn select(api: Option<ShaderApi>) -> Option<&'static dyn ShaderFns> {
    match api {
        Some(ShaderApi::Core) => Some(&CORE),
        Some(ShaderApi::Arb) => Some(&ARB),
        None => None,
    }
}

/// Reads an info log whose length was queried with `length`.
unsafe fn read_log<L, R>(length: L, read: R) -> String
    where L: FnOnce(&mut GLint), R: FnOnce(GLint, &mut GLint, *mut gl::types::GLchar)
{
    let mut size: GLint = 0;
    length(&mut size);

    let mut log = vec![0u8; size.max(1) as usize];
    let mut written: GLint = 0;
    read(size.max(1), &mut written, log.as_mut_ptr() as *mut _);
    log.truncate(written.max(0) as usize);

    String::from_utf8_lossy(&log).into_owned()
}

// Handles of the other family never reach these entry points since a context only ever uses
// one table. Object 0 is ignored by every entry point below.
fn id(handle: Handle) -> gl::types::GLuint {
    match handle {
        Handle::Id(id) => id,
        Handle::Handle(_) => 0,
    }
}

fn arb(handle: Handle) -> gl::types::GLhandleARB {
    match handle {
        Handle::Handle(handle) => handle,
        Handle::Id(_) => 0 as gl::types::GLhandleARB,
    }
}

impl ShaderFns for CoreShaderFns {
    unsafe fn create_shader(&self, gl: &gl::Gl, ty: GLenum) -> Handle {
        Handle::Id(gl.CreateShader(ty))
    }

    unsafe fn shader_source(&self, gl: &gl::Gl, shader: Handle, source: &CStr) {
        gl.ShaderSource(id(shader), 1, [source.as_ptr()].as_ptr(), std::ptr::null());
    }

    unsafe fn compile_shader(&self, gl: &gl::Gl, shader: Handle) {
        gl.CompileShader(id(shader));
    }

    unsafe fn compile_status(&self, gl: &gl::Gl, shader: Handle) -> bool {
        let mut status = 0;
        gl.GetShaderiv(id(shader), gl::COMPILE_STATUS, &mut status);
        status != 0
    }

    unsafe fn shader_info_log(&self, gl: &gl::Gl, shader: Handle) -> String {
        read_log(|size| gl.GetShaderiv(id(shader), gl::INFO_LOG_LENGTH, size),
                 |size, written, buf| gl.GetShaderInfoLog(id(shader), size, written, buf))
    }

    unsafe fn delete_shader(&self, gl: &gl::Gl, shader: Handle) {
        gl.DeleteShader(id(shader));
    }

    unsafe fn create_program(&self, gl: &gl::Gl) -> Handle {
        Handle::Id(gl.CreateProgram())
    }

    unsafe fn attach_shader(&self, gl: &gl::Gl, program: Handle, shader: Handle) {
        gl.AttachShader(id(program), id(shader));
    }

    unsafe fn link_program(&self, gl: &gl::Gl, program: Handle) {
        gl.LinkProgram(id(program));
    }

    unsafe fn link_status(&self, gl: &gl::Gl, program: Handle) -> bool {
        let mut status = 0;
        gl.GetProgramiv(id(program), gl::LINK_STATUS, &mut status);
        status != 0
    }

    unsafe fn program_info_log(&self, gl: &gl::Gl, program: Handle) -> String {
        read_log(|size| gl.GetProgramiv(id(program), gl::INFO_LOG_LENGTH, size),
                 |size, written, buf| gl.GetProgramInfoLog(id(program), size, written, buf))
    }

    unsafe fn delete_program(&self, gl: &gl::Gl, program: Handle) {
        gl.DeleteProgram(id(program));
    }

    unsafe fn use_program(&self, gl: &gl::Gl, program: Option<Handle>) {
        gl.UseProgram(program.map(id).unwrap_or(0));
    }

    unsafe fn attrib_location(&self, gl: &gl::Gl, program: Handle, name: &CStr) -> GLint {
        gl.GetAttribLocation(id(program), name.as_ptr())
    }
}

impl ShaderFns for ArbShaderFns {
    unsafe fn create_shader(&self, gl: &gl::Gl, ty: GLenum) -> Handle {
        Handle::Handle(gl.CreateShaderObjectARB(ty))
    }

    unsafe fn shader_source(&self, gl: &gl::Gl, shader: Handle, source: &CStr) {
        gl.ShaderSourceARB(arb(shader), 1, [source.as_ptr()].as_ptr(), std::ptr::null());
    }

    unsafe fn compile_shader(&self, gl: &gl::Gl, shader: Handle) {
        gl.CompileShaderARB(arb(shader));
    }

    unsafe fn compile_status(&self, gl: &gl::Gl, shader: Handle) -> bool {
        let mut status = 0;
        gl.GetObjectParameterivARB(arb(shader), gl::OBJECT_COMPILE_STATUS_ARB, &mut status);
        status != 0
    }

    unsafe fn shader_info_log(&self, gl: &gl::Gl, shader: Handle) -> String {
        object_info_log(gl, arb(shader))
    }

    unsafe fn delete_shader(&self, gl: &gl::Gl, shader: Handle) {
        gl.DeleteObjectARB(arb(shader));
    }

    unsafe fn create_program(&self, gl: &gl::Gl) -> Handle {
        Handle::Handle(gl.CreateProgramObjectARB())
    }

    unsafe fn attach_shader(&self, gl: &gl::Gl, program: Handle, shader: Handle) {
        gl.AttachObjectARB(arb(program), arb(shader));
    }

    unsafe fn link_program(&self, gl: &gl::Gl, program: Handle) {
        gl.LinkProgramARB(arb(program));
    }

    unsafe fn link_status(&self, gl: &gl::Gl, program: Handle) -> bool {
        let mut status = 0;
        gl.GetObjectParameterivARB(arb(program), gl::OBJECT_LINK_STATUS_ARB, &mut status);
        status != 0
    }

    unsafe fn program_info_log(&self, gl: &gl::Gl, program: Handle) -> String {
        object_info_log(gl, arb(program))
    }

    unsafe fn delete_program(&self, gl: &gl::Gl, program: Handle) {
        gl.DeleteObjectARB(arb(program));
    }

    unsafe fn use_program(&self, gl: &gl::Gl, program: Option<Handle>) {
        gl.UseProgramObjectARB(program.map(arb).unwrap_or(0 as gl::types::GLhandleARB));
    }

    unsafe fn attrib_location(&self, gl: &gl::Gl, program: Handle, name: &CStr) -> GLint {
        gl.GetAttribLocationARB(arb(program), name.as_ptr())
    }
}

unsafe fn object_info_log(gl: &gl::Gl, object: gl::types::GLhandleARB) -> String {
    read_log(|size| gl.GetObjectParameterivARB(object, gl::OBJECT_INFO_LOG_LENGTH_ARB, size),
             |size, written, buf| gl.GetInfoLogARB(object, size, written, buf as *mut _))
}
