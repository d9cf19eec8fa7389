//! Checks a few limits every desktop OpenGL 2.0 implementation must meet.

use std::rc::Rc;

use piglit_util::framework::{self, Config, Test};
use piglit_util::minmax::{self, MinmaxSession};
use piglit_util::{gl, Context, TestError, TestResult};

struct GlMinmax;

impl Test for GlMinmax {
    fn display(&mut self, ctxt: &Rc<Context>) -> Result<TestResult, TestError> {
        minmax::print_header();

        let mut session = MinmaxSession::new(&**ctxt);
        session.test_min_int(gl::MAX_TEXTURE_SIZE, 64);
        session.test_min_int(gl::MAX_3D_TEXTURE_SIZE, 16);
        session.test_min_int(gl::MAX_CUBE_MAP_TEXTURE_SIZE, 16);
        session.test_min_int(gl::MAX_VERTEX_ATTRIBS, 16);
        session.test_min_int(gl::MAX_VERTEX_UNIFORM_COMPONENTS, 512);
        session.test_min_int(gl::MAX_FRAGMENT_UNIFORM_COMPONENTS, 64);
        session.test_min_int(gl::MAX_TEXTURE_IMAGE_UNITS, 2);
        session.test_min_int(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 2);
        session.test_min_int(gl::MAX_DRAW_BUFFERS, 1);
        session.test_min_int(gl::SUBPIXEL_BITS, 4);
        session.test_range_float(gl::ALIASED_POINT_SIZE_RANGE, 1.0, 1.0);
        session.test_range_float(gl::SMOOTH_LINE_WIDTH_RANGE, 1.0, 1.0);
        session.test_min_viewport_dimensions();

        if ctxt.capabilities().occlusion_queries {
            session.test_oq_bits();
        }

        // Errors raised by queries are already part of the rows.
        ctxt.reset_gl_error();

        Ok(session.result())
    }
}

fn main() {
    env_logger::init();

    let config = Config::from_env_and_args(std::env::args().skip(1))
        .with_gl_version(2, 0)
        .with_title("gl-2.0-minmax");
    framework::main(config, GlMinmax);
}
