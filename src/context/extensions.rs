use std::ffi::CStr;

use fnv::FnvHashSet;

use crate::gl;
use crate::version::{Api, Version};

/// Contains data about the list of extensions.
///
/// The named fields are the extensions the harness itself dispatches on. Every advertised
/// name is also kept so test programs can ask for arbitrary extensions.
#[derive(Debug, Clone, Default)]
pub struct ExtensionsList {
    /// GL_ARB_compute_shader
    pub gl_arb_compute_shader: bool,
    /// GL_ARB_geometry_shader4
    pub gl_arb_geometry_shader4: bool,
    /// GL_ARB_occlusion_query
    pub gl_arb_occlusion_query: bool,
    /// GL_ARB_shader_objects
    pub gl_arb_shader_objects: bool,
    /// GL_ARB_tessellation_shader
    pub gl_arb_tessellation_shader: bool,
    /// GL_ARB_vertex_attrib_64bit
    pub gl_arb_vertex_attrib_64bit: bool,
    /// GL_EXT_framebuffer_object
    pub gl_ext_framebuffer_object: bool,
    /// GL_EXT_geometry_shader4
    pub gl_ext_geometry_shader4: bool,
    /// GL_EXT_gpu_shader4
    pub gl_ext_gpu_shader4: bool,

    names: FnvHashSet<String>,
}

impl ExtensionsList {
    /// Builds the list from the extension names advertised by the implementation.
    pub fn from_names<I, S>(names: I) -> ExtensionsList
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        let mut extensions = ExtensionsList::default();

        for extension in names {
            let extension = extension.into();
            if extension.is_empty() {
                continue;
            }

            match &extension[..] {
                "GL_ARB_compute_shader" => extensions.gl_arb_compute_shader = true,
                "GL_ARB_geometry_shader4" => extensions.gl_arb_geometry_shader4 = true,
                "GL_ARB_occlusion_query" => extensions.gl_arb_occlusion_query = true,
                "GL_ARB_shader_objects" => extensions.gl_arb_shader_objects = true,
                "GL_ARB_tessellation_shader" => extensions.gl_arb_tessellation_shader = true,
                "GL_ARB_vertex_attrib_64bit" => extensions.gl_arb_vertex_attrib_64bit = true,
                "GL_EXT_framebuffer_object" => extensions.gl_ext_framebuffer_object = true,
                "GL_EXT_geometry_shader4" => extensions.gl_ext_geometry_shader4 = true,
                "GL_EXT_gpu_shader4" => extensions.gl_ext_gpu_shader4 = true,
                _ => ()
            }

            extensions.names.insert(extension);
        }

        extensions
    }

    /// Returns true if the implementation advertises the extension `name`.
    #[inline]
    pub fn is_supported(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of advertised extensions.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the implementation advertises no extension at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Returns the list of extensions supported by the backend.
///
/// The version must match the one of the backend.
///
/// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
pub unsafe fn get_extensions(gl: &gl::Gl, version: &Version) -> ExtensionsList {
    ExtensionsList::from_names(get_extensions_strings(gl, version))
}

/// Returns the list of all extension names supported by the OpenGL implementation.
///
/// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
unsafe fn get_extensions_strings(gl: &gl::Gl, version: &Version) -> Vec<String> {
    if version >= &Version(Api::Gl, 3, 0) || version >= &Version(Api::GlEs, 3, 0) {
        let mut num_extensions = 0;
        gl.GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);

        (0 .. num_extensions).filter_map(|num| {
            let ext = gl.GetStringi(gl::EXTENSIONS, num as gl::types::GLuint);
            if ext.is_null() {
                None
            } else {
                Some(CStr::from_ptr(ext as *const _).to_string_lossy().into_owned())
            }
        }).collect()

    } else {
        let list = gl.GetString(gl::EXTENSIONS);
        if list.is_null() {
            return Vec::new();
        }

        let list = CStr::from_ptr(list as *const _).to_string_lossy();
        list.split(' ').map(|e| e.to_owned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ExtensionsList;

    #[test]
    fn known_and_unknown_names() {
        let list = ExtensionsList::from_names(
            "GL_ARB_shader_objects GL_EXT_gpu_shader4 GL_MESA_pack_invert ".split(' '));

        assert!(list.gl_arb_shader_objects);
        assert!(list.gl_ext_gpu_shader4);
        assert!(!list.gl_arb_vertex_attrib_64bit);
        assert!(list.is_supported("GL_MESA_pack_invert"));
        assert!(!list.is_supported(""));
        assert_eq!(list.len(), 3);
    }
}
