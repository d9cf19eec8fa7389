/*!
Test supports module.

Everything here stands in for an OpenGL implementation, so that the harness logic can be
tested without a context.

*/

#![allow(dead_code)]

use std::collections::HashMap;
use std::process::{Command, Output};

use piglit_util::gl;
use piglit_util::gl::types::GLenum;
use piglit_util::minmax::{LimitSource, Query};

/// A `LimitSource` answering from tables of canned values.
///
/// Limits missing from the tables behave like a getter that writes nothing.
#[derive(Debug, Default)]
pub struct FakeLimits {
    pub integers: HashMap<(GLenum, Option<u32>), i32>,
    pub integers64: HashMap<(GLenum, Option<u32>), i64>,
    pub floats: HashMap<GLenum, f32>,
    pub integer_pairs: HashMap<GLenum, [i32; 2]>,
    pub float_pairs: HashMap<GLenum, [f32; 2]>,
    pub counter_bits: HashMap<GLenum, i32>,
    pub errors: HashMap<GLenum, GLenum>,
    pub framebuffer: (u32, u32),
    pub framebuffer_objects: bool,
}

impl FakeLimits {
    pub fn new() -> FakeLimits {
        FakeLimits { framebuffer: (160, 160), framebuffer_objects: true, ..Default::default() }
    }

    pub fn int(mut self, pname: GLenum, value: i32) -> FakeLimits {
        self.integers.insert((pname, None), value);
        self
    }

    pub fn int_indexed(mut self, pname: GLenum, index: u32, value: i32) -> FakeLimits {
        self.integers.insert((pname, Some(index)), value);
        self
    }

    pub fn int64(mut self, pname: GLenum, value: i64) -> FakeLimits {
        self.integers64.insert((pname, None), value);
        self
    }

    pub fn float(mut self, pname: GLenum, value: f32) -> FakeLimits {
        self.floats.insert(pname, value);
        self
    }

    pub fn int_pair(mut self, pname: GLenum, value: [i32; 2]) -> FakeLimits {
        self.integer_pairs.insert(pname, value);
        self
    }

    pub fn float_pair(mut self, pname: GLenum, value: [f32; 2]) -> FakeLimits {
        self.float_pairs.insert(pname, value);
        self
    }

    pub fn counter_bits(mut self, target: GLenum, value: i32) -> FakeLimits {
        self.counter_bits.insert(target, value);
        self
    }

    /// Makes every query of `pname` raise `error`.
    pub fn error(mut self, pname: GLenum, error: GLenum) -> FakeLimits {
        self.errors.insert(pname, error);
        self
    }

    pub fn framebuffer(mut self, width: u32, height: u32) -> FakeLimits {
        self.framebuffer = (width, height);
        self
    }

    pub fn without_framebuffer_objects(mut self) -> FakeLimits {
        self.framebuffer_objects = false;
        self
    }

    fn query<T: Copy>(&self, pname: GLenum, value: Option<&T>) -> Query<T> {
        Query {
            value: value.cloned(),
            error: self.errors.get(&pname).cloned().unwrap_or(gl::NO_ERROR),
        }
    }
}

impl LimitSource for FakeLimits {
    fn get_integer(&self, pname: GLenum, index: Option<u32>) -> Query<i32> {
        self.query(pname, self.integers.get(&(pname, index)))
    }

    fn get_integer64(&self, pname: GLenum, index: Option<u32>) -> Query<i64> {
        self.query(pname, self.integers64.get(&(pname, index)))
    }

    fn get_float(&self, pname: GLenum) -> Query<f32> {
        self.query(pname, self.floats.get(&pname))
    }

    fn get_integer_pair(&self, pname: GLenum) -> Query<[i32; 2]> {
        self.query(pname, self.integer_pairs.get(&pname))
    }

    fn get_float_pair(&self, pname: GLenum) -> Query<[f32; 2]> {
        self.query(pname, self.float_pairs.get(&pname))
    }

    fn get_query_counter_bits(&self, target: GLenum) -> Query<i32> {
        self.query(target, self.counter_bits.get(&target))
    }

    fn framebuffer_dimensions(&self) -> (u32, u32) {
        self.framebuffer
    }

    fn framebuffer_objects(&self) -> bool {
        self.framebuffer_objects
    }
}

/// Builds an attribute table from `(name, location)` pairs.
pub fn attributes(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
    pairs.iter().map(|&(name, location)| (name.to_owned(), location)).collect()
}

/// Builds a `width * height` RGBA image filled with one color.
pub fn solid_rgba(width: u32, height: u32, color: [f32; 4]) -> Vec<f32> {
    color.iter().cloned().cycle().take(width as usize * height as usize * 4).collect()
}

/// Environment variable telling a re-executed test binary which child scenario to run.
pub const CHILD_ENV: &str = "PIGLIT_UTIL_TEST_CHILD";

/// Returns the scenario this process must run, if it was started by `run_child`.
pub fn child_scenario() -> Option<String> {
    std::env::var(CHILD_ENV).ok()
}

/// Runs one test of the current test binary in a separate process, with `scenario` in
/// `CHILD_ENV`.
///
/// Used to check what ends up on stdout and in the exit code of code that terminates the
/// process.
pub fn run_child(test_name: &str, scenario: &str) -> Output {
    let exe = std::env::current_exe().unwrap();

    Command::new(exe)
        .args(&["--exact", test_name, "--nocapture", "--test-threads", "1"])
        .env(CHILD_ENV, scenario)
        .output()
        .unwrap()
}
