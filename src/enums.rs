//! Symbolic names of the OpenGL enums that show up in diagnostics.

use std::borrow::Cow;

use fnv::FnvHashMap;
use lazy_static::lazy_static;

use crate::gl;
use crate::gl::types::GLenum;

macro_rules! enum_names {
    ($($name:ident),+ $(,)?) => {
        [$((gl::$name, concat!("GL_", stringify!($name)))),+]
    };
}

lazy_static! {
    static ref NAMES: FnvHashMap<GLenum, &'static str> = {
        enum_names![
            NO_ERROR,
            INVALID_ENUM,
            INVALID_VALUE,
            INVALID_OPERATION,
            STACK_OVERFLOW,
            STACK_UNDERFLOW,
            OUT_OF_MEMORY,
            INVALID_FRAMEBUFFER_OPERATION,
            CONTEXT_LOST,

            MAX_TEXTURE_SIZE,
            MAX_3D_TEXTURE_SIZE,
            MAX_CUBE_MAP_TEXTURE_SIZE,
            MAX_ARRAY_TEXTURE_LAYERS,
            MAX_RENDERBUFFER_SIZE,
            MAX_VIEWPORT_DIMS,
            MAX_VIEWPORTS,
            VIEWPORT_BOUNDS_RANGE,
            VIEWPORT_SUBPIXEL_BITS,
            MAX_VERTEX_ATTRIBS,
            MAX_VERTEX_UNIFORM_COMPONENTS,
            MAX_VERTEX_TEXTURE_IMAGE_UNITS,
            MAX_VERTEX_OUTPUT_COMPONENTS,
            MAX_FRAGMENT_UNIFORM_COMPONENTS,
            MAX_FRAGMENT_INPUT_COMPONENTS,
            MAX_TEXTURE_IMAGE_UNITS,
            MAX_COMBINED_TEXTURE_IMAGE_UNITS,
            MAX_VARYING_COMPONENTS,
            MAX_DRAW_BUFFERS,
            MAX_COLOR_ATTACHMENTS,
            MAX_SAMPLES,
            MAX_ELEMENTS_INDICES,
            MAX_ELEMENTS_VERTICES,
            MAX_TEXTURE_LOD_BIAS,
            MIN_PROGRAM_TEXEL_OFFSET,
            MAX_PROGRAM_TEXEL_OFFSET,
            MIN_FRAGMENT_INTERPOLATION_OFFSET,
            MAX_FRAGMENT_INTERPOLATION_OFFSET,
            MAX_CLIP_DISTANCES,
            MAX_UNIFORM_BLOCK_SIZE,
            MAX_UNIFORM_BUFFER_BINDINGS,
            MAX_SERVER_WAIT_TIMEOUT,
            MAX_ELEMENT_INDEX,
            MAX_TRANSFORM_FEEDBACK_SEPARATE_COMPONENTS,
            MAX_TRANSFORM_FEEDBACK_INTERLEAVED_COMPONENTS,
            MAX_TRANSFORM_FEEDBACK_SEPARATE_ATTRIBS,
            MAX_COMPUTE_WORK_GROUP_COUNT,
            MAX_COMPUTE_WORK_GROUP_SIZE,
            MAX_COMPUTE_WORK_GROUP_INVOCATIONS,
            MAX_COMPUTE_SHARED_MEMORY_SIZE,
            MAX_COMPUTE_UNIFORM_COMPONENTS,
            ALIASED_LINE_WIDTH_RANGE,
            ALIASED_POINT_SIZE_RANGE,
            SMOOTH_LINE_WIDTH_RANGE,
            SMOOTH_POINT_SIZE_RANGE,
            SUBPIXEL_BITS,
            SAMPLES_PASSED,
            QUERY_COUNTER_BITS,
        ].iter().cloned().collect()
    };
}

/// Returns the symbolic name of an enum, or its hexadecimal value if it is unknown.
pub fn enum_name(value: GLenum) -> Cow<'static, str> {
    match NAMES.get(&value) {
        Some(name) => Cow::Borrowed(*name),
        None => Cow::Owned(format!("0x{:04x}", value)),
    }
}

/// Returns the symbolic name of a value returned by `glGetError`.
pub fn error_name(value: GLenum) -> Cow<'static, str> {
    match value {
        gl::NO_ERROR |
        gl::INVALID_ENUM |
        gl::INVALID_VALUE |
        gl::INVALID_OPERATION |
        gl::STACK_OVERFLOW |
        gl::STACK_UNDERFLOW |
        gl::OUT_OF_MEMORY |
        gl::INVALID_FRAMEBUFFER_OPERATION |
        gl::CONTEXT_LOST => enum_name(value),
        _ => Cow::Borrowed("(unrecognized error)"),
    }
}
