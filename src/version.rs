use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;

use crate::gl;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version(Api::Gl, 3, 0) >= Version(Api::GlEs, 3, 0)` and
/// `Version(Api::GlEs, 3, 0) >= Version(Api::Gl, 3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Version(pub Api, pub u8, pub u8);

/// Describes an OpenGL-related API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Api {
    /// Regular OpenGL.
    Gl,
    /// OpenGL embedded system.
    GlEs,
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        if self.0 != other.0 {
            return None;
        }

        match self.1.cmp(&other.1) {
            Ordering::Equal => Some(self.2.cmp(&other.2)),
            a => Some(a)
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Api::Gl => write!(f, "{}.{}", self.1, self.2),
            Api::GlEs => write!(f, "ES {}.{}", self.1, self.2),
        }
    }
}

/// Parses the string returned by `glGetString(GL_VERSION)`.
///
/// Desktop strings look like `4.6.0 Mesa 23.1.0`, ES strings like `OpenGL ES 3.2 Mesa`.
pub fn parse_gl_version(version: &str) -> Option<Version> {
    let (version, api) = match version.strip_prefix("OpenGL ES ") {
        Some(rest) => (rest, Api::GlEs),
        // GLES 1.x implementations report the profile as well, e.g. "OpenGL ES-CM 1.1".
        None => match version.strip_prefix("OpenGL ES-CM ")
                             .or_else(|| version.strip_prefix("OpenGL ES-CL "))
        {
            Some(rest) => (rest, Api::GlEs),
            None => (version, Api::Gl),
        },
    };

    let (major, minor) = parse_major_minor(version)?;
    Some(Version(api, major, minor))
}

/// Parses the string returned by `glGetString(GL_SHADING_LANGUAGE_VERSION)`.
///
/// The minor number is kept as written, so `4.60` becomes `Version(Api::Gl, 4, 60)` and
/// `OpenGL ES GLSL ES 3.20` becomes `Version(Api::GlEs, 3, 20)`.
pub fn parse_glsl_version(version: &str) -> Option<Version> {
    let (version, api) = match version.strip_prefix("OpenGL ES GLSL ES ") {
        Some(rest) => (rest, Api::GlEs),
        None => (version, Api::Gl),
    };

    let (major, minor) = parse_major_minor(version)?;
    Some(Version(api, major, minor))
}

fn parse_major_minor(version: &str) -> Option<(u8, u8)> {
    let version = version.split_whitespace().next()?;

    let mut iter = version.split('.');
    let major = iter.next()?.parse().ok()?;
    let minor = iter.next()?.parse().ok()?;

    Some((major, minor))
}

/// Reads a string from `glGetString`.
///
/// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
pub(crate) unsafe fn get_gl_string(gl: &gl::Gl, name: gl::types::GLenum) -> Option<String> {
    let ptr = gl.GetString(name);
    if ptr.is_null() {
        return None;
    }

    Some(CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned())
}

/// Obtains the OpenGL version of the current context.
///
/// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
pub unsafe fn get_gl_version(gl: &gl::Gl) -> Option<Version> {
    let version = get_gl_string(gl, gl::VERSION)?;
    parse_gl_version(&version)
}

/// Obtains the GLSL version of the current context, or `None` if the implementation has no
/// shader compiler.
///
/// *Safety*: the OpenGL context corresponding to `gl` must be current in the thread.
pub unsafe fn get_glsl_version(gl: &gl::Gl, version: &Version) -> Option<Version> {
    // GLSL appeared with OpenGL 2.0 and the ARB shading language extension before that;
    // older drivers return NULL or set GL_INVALID_ENUM.
    if version.0 == Api::Gl && version < &Version(Api::Gl, 2, 0) {
        let string = get_gl_string(gl, gl::SHADING_LANGUAGE_VERSION);
        gl.GetError();
        return string.and_then(|s| parse_glsl_version(&s));
    }

    let string = get_gl_string(gl, gl::SHADING_LANGUAGE_VERSION)?;
    parse_glsl_version(&string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_versions() {
        assert_eq!(parse_gl_version("4.6.0 NVIDIA 535.54"), Some(Version(Api::Gl, 4, 6)));
        assert_eq!(parse_gl_version("3.3 (Core Profile) Mesa 23.1.0"),
                   Some(Version(Api::Gl, 3, 3)));
        assert_eq!(parse_gl_version("2.1"), Some(Version(Api::Gl, 2, 1)));
    }

    #[test]
    fn es_versions() {
        assert_eq!(parse_gl_version("OpenGL ES 3.2 Mesa 23.1.0"),
                   Some(Version(Api::GlEs, 3, 2)));
        assert_eq!(parse_gl_version("OpenGL ES-CM 1.1"), Some(Version(Api::GlEs, 1, 1)));
    }

    #[test]
    fn garbage_versions() {
        assert_eq!(parse_gl_version(""), None);
        assert_eq!(parse_gl_version("banana"), None);
        assert_eq!(parse_gl_version("4"), None);
    }

    #[test]
    fn glsl_versions() {
        assert_eq!(parse_glsl_version("4.60 NVIDIA"), Some(Version(Api::Gl, 4, 60)));
        assert_eq!(parse_glsl_version("1.10"), Some(Version(Api::Gl, 1, 10)));
        assert_eq!(parse_glsl_version("OpenGL ES GLSL ES 3.20"),
                   Some(Version(Api::GlEs, 3, 20)));
    }

    #[test]
    fn cross_api_comparisons() {
        assert!(!(Version(Api::Gl, 3, 0) >= Version(Api::GlEs, 3, 0)));
        assert!(!(Version(Api::GlEs, 3, 0) >= Version(Api::Gl, 3, 0)));
        assert!(Version(Api::Gl, 4, 1) > Version(Api::Gl, 3, 3));
        assert!(Version(Api::Gl, 3, 3) >= Version(Api::Gl, 3, 3));
    }
}
