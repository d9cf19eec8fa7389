use crate::context::ExtensionsList;
use crate::gl;
use crate::version::{self, Api, Version};

/// Which family of entry points compiles and links shaders on this context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderApi {
    /// `glCreateShader` and friends, OpenGL 2.0 and OpenGL ES 2.0.
    Core,
    /// `glCreateShaderObjectARB` and friends, from `GL_ARB_shader_objects`.
    Arb,
}

/// Which entry point feeds integer vertex attributes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IntegerAttribApi {
    /// `glVertexAttribIPointer`, OpenGL 3.0 and OpenGL ES 3.0.
    Core,
    /// `glVertexAttribIPointerEXT`, from `GL_EXT_gpu_shader4`.
    Ext,
}

/// Represents the capabilities of the context.
///
/// Everything here is resolved once when the context is created so that the helpers never have
/// to repeat version and extension checks at their call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Version of GLSL supported by the compiler, or `None` if there is no compiler.
    pub glsl_version: Option<Version>,

    /// Entry points used to compile and link shaders. `None` if shaders are not supported.
    pub shader_api: Option<ShaderApi>,

    /// Entry point used for integer vertex attributes. `None` if not supported.
    pub integer_attribs: Option<IntegerAttribApi>,

    /// Whether `glVertexAttribLPointer` can be used for double-precision attributes.
    pub double_attribs: bool,

    /// Whether `glGetIntegeri_v` is available.
    pub indexed_queries: bool,

    /// Whether `glGetInteger64v` and `glGetInteger64i_v` are available.
    pub integer64_queries: bool,

    /// Whether occlusion queries are available.
    pub occlusion_queries: bool,

    /// Whether framebuffer objects (and `GL_MAX_RENDERBUFFER_SIZE`) are available.
    pub framebuffer_objects: bool,
}

impl Capabilities {
    /// Decides the capabilities from the version, the GLSL version and the extensions.
    pub fn resolve(version: &Version, glsl_version: Option<Version>,
                   extensions: &ExtensionsList) -> Capabilities
    {
        let shader_api = if version >= &Version(Api::Gl, 2, 0) ||
                            version >= &Version(Api::GlEs, 2, 0)
        {
            Some(ShaderApi::Core)
        } else if extensions.gl_arb_shader_objects {
            Some(ShaderApi::Arb)
        } else {
            None
        };

        let integer_attribs = if version >= &Version(Api::Gl, 3, 0) ||
                                 version >= &Version(Api::GlEs, 3, 0)
        {
            Some(IntegerAttribApi::Core)
        } else if extensions.gl_ext_gpu_shader4 {
            Some(IntegerAttribApi::Ext)
        } else {
            None
        };

        Capabilities {
            glsl_version: shader_api.and(glsl_version),
            shader_api,
            integer_attribs,
            double_attribs: version >= &Version(Api::Gl, 4, 1) ||
                            extensions.gl_arb_vertex_attrib_64bit,
            indexed_queries: version >= &Version(Api::Gl, 3, 0) ||
                             version >= &Version(Api::GlEs, 3, 0),
            integer64_queries: version >= &Version(Api::Gl, 3, 2) ||
                               version >= &Version(Api::GlEs, 3, 0),
            occlusion_queries: version >= &Version(Api::Gl, 1, 5) ||
                               extensions.gl_arb_occlusion_query,
            framebuffer_objects: version >= &Version(Api::Gl, 3, 0) ||
                                 version >= &Version(Api::GlEs, 2, 0) ||
                                 extensions.gl_ext_framebuffer_object,
        }
    }
}

/// Loads the capabilities.
///
/// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
pub unsafe fn get_capabilities(gl: &gl::Gl, version: &Version, extensions: &ExtensionsList)
                               -> Capabilities
{
    // a compiler is optional in OpenGL ES
    let has_compiler = if version.0 == Api::GlEs {
        let mut val = 0;
        gl.GetBooleanv(gl::SHADER_COMPILER, &mut val);
        val != 0
    } else {
        true
    };

    let glsl_version = if has_compiler {
        version::get_glsl_version(gl, version)
    } else {
        None
    };

    Capabilities::resolve(version, glsl_version, extensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extensions(names: &str) -> ExtensionsList {
        ExtensionsList::from_names(names.split(' '))
    }

    #[test]
    fn core_entry_points() {
        let caps = Capabilities::resolve(&Version(Api::Gl, 4, 6),
                                         Some(Version(Api::Gl, 4, 60)), &extensions(""));

        assert_eq!(caps.shader_api, Some(ShaderApi::Core));
        assert_eq!(caps.integer_attribs, Some(IntegerAttribApi::Core));
        assert!(caps.double_attribs);
        assert!(caps.indexed_queries);
        assert_eq!(caps.glsl_version, Some(Version(Api::Gl, 4, 60)));
    }

    #[test]
    fn extension_fallbacks() {
        let caps = Capabilities::resolve(&Version(Api::Gl, 1, 5), Some(Version(Api::Gl, 1, 0)),
                                         &extensions("GL_ARB_shader_objects GL_EXT_gpu_shader4"));

        assert_eq!(caps.shader_api, Some(ShaderApi::Arb));
        assert_eq!(caps.integer_attribs, Some(IntegerAttribApi::Ext));
        assert!(!caps.double_attribs);
        assert!(!caps.indexed_queries);
    }

    #[test]
    fn no_shader_support() {
        let caps = Capabilities::resolve(&Version(Api::Gl, 1, 4), Some(Version(Api::Gl, 1, 0)),
                                         &extensions(""));

        assert_eq!(caps.shader_api, None);
        assert_eq!(caps.glsl_version, None);
        assert_eq!(caps.integer_attribs, None);
    }

    #[test]
    fn gles_never_has_double_attribs() {
        let caps = Capabilities::resolve(&Version(Api::GlEs, 3, 2),
                                         Some(Version(Api::GlEs, 3, 20)), &extensions(""));

        assert_eq!(caps.integer_attribs, Some(IntegerAttribApi::Core));
        assert!(!caps.double_attribs);
    }
}
