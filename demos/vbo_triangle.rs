//! Draws a quad described as vertex data text and checks its colors.

use std::rc::Rc;

use piglit_util::framework::{self, Config, Test};
use piglit_util::program::{self, Program};
use piglit_util::{check_gl_error, gl, probe, vbo};
use piglit_util::{Context, TestError, TestResult};

const VERTEX_SHADER: &str = "
    #version 110
    attribute vec2 pos;
    attribute vec3 color;
    varying vec3 v_color;

    void main() {
        gl_Position = vec4(pos, 0.0, 1.0);
        v_color = color;
    }
";

const FRAGMENT_SHADER: &str = "
    #version 110
    varying vec3 v_color;

    void main() {
        gl_FragColor = vec4(v_color, 1.0);
    }
";

// left half green, right half blue
const VERTEX_DATA: &str = "
    pos/vec2/2    color/vec3/3
    -1.0 -1.0     0.0 1.0 0.0    # bottom left
     0.0 -1.0     0.0 1.0 0.0
    -1.0  1.0     0.0 1.0 0.0
     0.0  1.0     0.0 1.0 0.0

     0.0 -1.0     0.0 0.0 1.0
     1.0 -1.0     0.0 0.0 1.0
     0.0  1.0     0.0 0.0 1.0
     1.0  1.0     0.0 0.0 1.0
";

#[derive(Default)]
struct VboTriangle {
    program: Option<Program>,
    rows: usize,
}

impl Test for VboTriangle {
    fn init(&mut self, ctxt: &Rc<Context>) -> Result<(), TestError> {
        program::require_glsl_version(ctxt, 1, 10)?;

        let program = program::build_simple_program(ctxt, Some(VERTEX_SHADER),
                                                    Some(FRAGMENT_SHADER))?;
        self.rows = vbo::setup_vbo_from_text(ctxt, &program, VERTEX_DATA)?;
        self.program = Some(program);

        Ok(())
    }

    fn display(&mut self, ctxt: &Rc<Context>) -> Result<TestResult, TestError> {
        let program = self.program.as_ref()
            .ok_or_else(|| TestError::Fail("init didn't run".to_owned()))?;
        let (width, height) = ctxt.get_framebuffer_dimensions();

        program.use_program();
        unsafe {
            let gl = ctxt.gl();
            gl.Viewport(0, 0, width as i32, height as i32);
            gl.ClearColor(0.5, 0.5, 0.5, 1.0);
            gl.Clear(gl::COLOR_BUFFER_BIT);
            gl.DrawArrays(gl::TRIANGLE_STRIP, 0, 4);
            gl.DrawArrays(gl::TRIANGLE_STRIP, 4, self.rows as i32 - 4);
        }

        let half = width / 2;
        let mut pass = check_gl_error!(ctxt);
        pass &= probe::probe_rect_rgb(ctxt, 0, 0, half, height, &[0.0, 1.0, 0.0]);
        pass &= probe::probe_rect_rgb(ctxt, half as i32, 0, width - half, height,
                                      &[0.0, 0.0, 1.0]);

        Ok(if pass { TestResult::Pass } else { TestResult::Fail })
    }
}

fn main() {
    env_logger::init();

    let config = Config::from_env_and_args(std::env::args().skip(1))
        .with_title("vbo-triangle");
    framework::main(config, VboTriangle::default());
}
