/*!
Checking implementation-defined limits against the bounds required by the OpenGL
specifications.

A [`MinmaxSession`] runs any number of checks, prints one row per limit on stdout and
remembers whether every check passed so far. A failed check never stops the session, so one
run lists every violation.

```no_run
# use piglit_util::minmax::{self, MinmaxSession};
# use piglit_util::gl;
# fn example(ctxt: &std::rc::Rc<piglit_util::Context>) -> piglit_util::TestResult {
minmax::print_header();

let mut session = MinmaxSession::new(&**ctxt);
session.test_min_int(gl::MAX_TEXTURE_SIZE, 1024);
session.test_min_int(gl::MAX_VERTEX_ATTRIBS, 16);
session.test_range_float(gl::ALIASED_LINE_WIDTH_RANGE, 1.0, 1.0);
session.test_min_viewport_dimensions();

session.result()
# }
```

Each row holds the limit name left-justified on 50 columns, then the required bound and the
observed value right-justified on 8 columns, and ` (ERROR)` when the check failed.
*/
use std::fmt;

use crate::context::Context;
use crate::enums;
use crate::gl;
use crate::gl::types::GLenum;
use crate::result::TestResult;
use crate::version::{Api, Version};

/// Outcome of one limit query.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Query<T> {
    /// The value, or `None` if the implementation didn't write anything.
    pub value: Option<T>,
    /// The error raised by the query, `GL_NO_ERROR` if none.
    pub error: GLenum,
}

impl<T> Query<T> {
    /// A query that wrote a value and raised no error.
    pub fn ok(value: T) -> Query<T> {
        Query { value: Some(value), error: gl::NO_ERROR }
    }
}

/// Something that can report implementation limits.
///
/// `Context` queries OpenGL. Tests can provide canned values.
pub trait LimitSource {
    /// `glGetIntegerv`, or `glGetIntegeri_v` when an index is given.
    fn get_integer(&self, pname: GLenum, index: Option<u32>) -> Query<i32>;

    /// `glGetInteger64v`, or `glGetInteger64i_v` when an index is given.
    fn get_integer64(&self, pname: GLenum, index: Option<u32>) -> Query<i64>;

    /// `glGetFloatv`.
    fn get_float(&self, pname: GLenum) -> Query<f32>;

    /// `glGetIntegerv` for a limit made of two values.
    fn get_integer_pair(&self, pname: GLenum) -> Query<[i32; 2]>;

    /// `glGetFloatv` for a limit made of two values.
    fn get_float_pair(&self, pname: GLenum) -> Query<[f32; 2]>;

    /// `glGetQueryiv(target, GL_QUERY_COUNTER_BITS)`.
    fn get_query_counter_bits(&self, target: GLenum) -> Query<i32>;

    /// Dimensions of the window being rendered to.
    fn framebuffer_dimensions(&self) -> (u32, u32);

    /// Whether framebuffer objects exist, and with them `GL_MAX_RENDERBUFFER_SIZE`.
    fn framebuffer_objects(&self) -> bool;
}

/// Direction of a required bound.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The observed value must be greater than or equal to the bound.
    AtLeast,
    /// The observed value must be lower than or equal to the bound.
    AtMost,
    /// The observed value must be zero, or greater than or equal to the bound.
    ZeroOrAtLeast,
}

/// A value printed in a limit row.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LimitValue {
    /// Signed integer limit.
    Int(i64),
    /// Unsigned integer limit.
    Uint(u64),
    /// Floating-point limit, printed with one decimal.
    Float(f32),
}

impl fmt::Display for LimitValue {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match *self {
            LimitValue::Int(v) => v.to_string(),
            LimitValue::Uint(v) => v.to_string(),
            LimitValue::Float(v) => format!("{:.1}", v),
        };
        fmt.pad(&text)
    }
}

impl From<i32> for LimitValue {
    fn from(v: i32) -> LimitValue { LimitValue::Int(v as i64) }
}

impl From<i64> for LimitValue {
    fn from(v: i64) -> LimitValue { LimitValue::Int(v) }
}

impl From<u32> for LimitValue {
    fn from(v: u32) -> LimitValue { LimitValue::Uint(v as u64) }
}

impl From<u64> for LimitValue {
    fn from(v: u64) -> LimitValue { LimitValue::Uint(v) }
}

impl From<f32> for LimitValue {
    fn from(v: f32) -> LimitValue { LimitValue::Float(v) }
}

/// One checked limit.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitRecord {
    /// Name of the limit, usually the symbolic name of the queried enum.
    pub name: String,
    /// Direction of the requirement.
    pub bound: Bound,
    /// Required value.
    pub required: LimitValue,
    /// Value reported by the implementation, `None` if it didn't write one.
    pub observed: Option<LimitValue>,
    /// Error raised by the query.
    pub error: GLenum,
    /// Whether the check passed.
    pub pass: bool,
}

impl LimitRecord {
    /// Returns the row printed for this record.
    pub fn line(&self) -> String {
        let required = match self.bound {
            Bound::ZeroOrAtLeast => format!("0 / {:>2}", self.required),
            Bound::AtLeast | Bound::AtMost => self.required.to_string(),
        };
        let observed = match self.observed {
            Some(value) => value.to_string(),
            None => "unset".to_owned(),
        };

        format!("{:<50} {:>8} {:>8}{}", self.name, required, observed,
                if self.pass { "" } else { " (ERROR)" })
    }
}

/// Returns the header row.
pub fn header_line() -> String {
    format!("{:<50} {:>8} {:>8}", "token", "minimum", "value")
}

/// Prints the header row.
pub fn print_header() {
    println!("{}", header_line());
}

fn satisfies<T: PartialOrd>(bound: Bound, observed: T, required: T) -> bool {
    match bound {
        Bound::AtLeast | Bound::ZeroOrAtLeast => observed >= required,
        Bound::AtMost => observed <= required,
    }
}

/// Accumulates the outcome of limit checks.
///
/// The session passes until one check fails. It never goes back to passing.
pub struct MinmaxSession<'a, S: ?Sized> {
    source: &'a S,
    records: Vec<LimitRecord>,
    pass: bool,
}

impl<'a, S: ?Sized + LimitSource> MinmaxSession<'a, S> {
    /// Starts a session querying `source`.
    pub fn new(source: &'a S) -> MinmaxSession<'a, S> {
        MinmaxSession { source, records: Vec::new(), pass: true }
    }

    /// Returns every record so far, in order.
    #[inline]
    pub fn records(&self) -> &[LimitRecord] {
        &self.records
    }

    /// Returns true if every check so far passed.
    #[inline]
    pub fn pass(&self) -> bool {
        self.pass
    }

    /// Returns the verdict of the session.
    pub fn result(&self) -> TestResult {
        if self.pass { TestResult::Pass } else { TestResult::Fail }
    }

    /// Records a check and prints its row. Returns whether the check passed.
    pub fn record(&mut self, record: LimitRecord) -> bool {
        println!("{}", record.line());
        if record.error != gl::NO_ERROR {
            println!("Unexpected GL error: {} 0x{:x}", enums::error_name(record.error),
                     record.error);
        }

        let pass = record.pass;
        self.pass &= pass;
        self.records.push(record);
        pass
    }

    fn check<T, U>(&mut self, name: String, bound: Bound, required: T, query: Query<U>) -> bool
        where T: Copy + PartialOrd + Into<LimitValue>,
              U: Copy + Into<T>
    {
        let observed: Option<T> = query.value.map(|v| v.into());
        let pass = query.error == gl::NO_ERROR &&
                   observed.map(|v| satisfies(bound, v, required)).unwrap_or(false);

        self.record(LimitRecord {
            name,
            bound,
            required: required.into(),
            observed: observed.map(|v| v.into()),
            error: query.error,
            pass,
        })
    }

    fn indexed_name(token: GLenum, index: Option<u32>) -> String {
        match index {
            Some(index) => format!("{}[{}]", enums::enum_name(token), index),
            None => enums::enum_name(token).into_owned(),
        }
    }

    fn int(&mut self, token: GLenum, index: Option<u32>, bound: Bound, value: i32) -> bool {
        let query = self.source.get_integer(token, index);
        self.check(Self::indexed_name(token, index), bound, value, query)
    }

    fn uint(&mut self, token: GLenum, bound: Bound, value: u32) -> bool {
        let query = self.source.get_integer(token, None);
        // there is no unsigned getter, the bits are reinterpreted
        let query = Query { value: query.value.map(|v| v as u32), error: query.error };
        self.check(enums::enum_name(token).into_owned(), bound, value, query)
    }

    fn int64(&mut self, token: GLenum, index: Option<u32>, bound: Bound, value: i64) -> bool {
        let query = self.source.get_integer64(token, index);
        self.check(Self::indexed_name(token, index), bound, value, query)
    }

    fn uint64(&mut self, token: GLenum, bound: Bound, value: u64) -> bool {
        let query = self.source.get_integer64(token, None);
        let query = Query { value: query.value.map(|v| v as u64), error: query.error };
        self.check(enums::enum_name(token).into_owned(), bound, value, query)
    }

    fn float(&mut self, token: GLenum, bound: Bound, value: f32) -> bool {
        let query = self.source.get_float(token);
        self.check(enums::enum_name(token).into_owned(), bound, value, query)
    }

    /// Checks that an integer limit is at least `min`.
    pub fn test_min_int(&mut self, token: GLenum, min: i32) -> bool {
        self.int(token, None, Bound::AtLeast, min)
    }

    /// Checks that an integer limit is at most `max`.
    pub fn test_max_int(&mut self, token: GLenum, max: i32) -> bool {
        self.int(token, None, Bound::AtMost, max)
    }

    /// Checks that an indexed integer limit is at least `min`.
    pub fn test_min_int_indexed(&mut self, token: GLenum, index: u32, min: i32) -> bool {
        self.int(token, Some(index), Bound::AtLeast, min)
    }

    /// Checks that an indexed integer limit is at most `max`.
    pub fn test_max_int_indexed(&mut self, token: GLenum, index: u32, max: i32) -> bool {
        self.int(token, Some(index), Bound::AtMost, max)
    }

    /// Checks that an unsigned limit is at least `min`.
    pub fn test_min_uint(&mut self, token: GLenum, min: u32) -> bool {
        self.uint(token, Bound::AtLeast, min)
    }

    /// Checks that an unsigned limit is at most `max`.
    pub fn test_max_uint(&mut self, token: GLenum, max: u32) -> bool {
        self.uint(token, Bound::AtMost, max)
    }

    /// Checks that a 64-bit limit is at least `min`.
    pub fn test_min_int64(&mut self, token: GLenum, min: i64) -> bool {
        self.int64(token, None, Bound::AtLeast, min)
    }

    /// Checks that a 64-bit limit is at most `max`.
    pub fn test_max_int64(&mut self, token: GLenum, max: i64) -> bool {
        self.int64(token, None, Bound::AtMost, max)
    }

    /// Checks that an indexed 64-bit limit is at least `min`.
    pub fn test_min_int64_indexed(&mut self, token: GLenum, index: u32, min: i64) -> bool {
        self.int64(token, Some(index), Bound::AtLeast, min)
    }

    /// Checks that an indexed 64-bit limit is at most `max`.
    pub fn test_max_int64_indexed(&mut self, token: GLenum, index: u32, max: i64) -> bool {
        self.int64(token, Some(index), Bound::AtMost, max)
    }

    /// Checks that an unsigned 64-bit limit is at least `min`.
    pub fn test_min_uint64(&mut self, token: GLenum, min: u64) -> bool {
        self.uint64(token, Bound::AtLeast, min)
    }

    /// Checks that an unsigned 64-bit limit is at most `max`.
    pub fn test_max_uint64(&mut self, token: GLenum, max: u64) -> bool {
        self.uint64(token, Bound::AtMost, max)
    }

    /// Checks that a floating-point limit is at least `min`.
    pub fn test_min_float(&mut self, token: GLenum, min: f32) -> bool {
        self.float(token, Bound::AtLeast, min)
    }

    /// Checks that a floating-point limit is at most `max`.
    pub fn test_max_float(&mut self, token: GLenum, max: f32) -> bool {
        self.float(token, Bound::AtMost, max)
    }

    /// Checks that a range covers `[low, high]`: the first value must be at most `low` and
    /// the second one at least `high`. Produces the `NAME[0]` and `NAME[1]` rows.
    pub fn test_range_float(&mut self, token: GLenum, low: f32, high: f32) -> bool {
        let query = self.source.get_float_pair(token);
        let name = enums::enum_name(token);

        let first = Query { value: query.value.map(|v| v[0]), error: query.error };
        let second = Query { value: query.value.map(|v| v[1]), error: gl::NO_ERROR };

        let low_ok = self.check(format!("{}[0]", name), Bound::AtMost, low, first);
        let high_ok = self.check(format!("{}[1]", name), Bound::AtLeast, high, second);
        low_ok && high_ok
    }

    /// Checks that `GL_MAX_VIEWPORT_DIMS` covers both the window and, when framebuffer objects
    /// are supported, the largest renderbuffer.
    pub fn test_min_viewport_dimensions(&mut self) -> bool {
        let (width, height) = self.source.framebuffer_dimensions();

        let renderbuffer = if self.source.framebuffer_objects() {
            match self.source.get_integer(gl::MAX_RENDERBUFFER_SIZE, None) {
                Query { value: Some(size), error: gl::NO_ERROR } => size,
                _ => 0,
            }
        } else {
            0
        };

        let min_width = (width as i32).max(renderbuffer);
        let min_height = (height as i32).max(renderbuffer);

        let query = self.source.get_integer_pair(gl::MAX_VIEWPORT_DIMS);
        let first = Query { value: query.value.map(|v| v[0]), error: query.error };
        let second = Query { value: query.value.map(|v| v[1]), error: gl::NO_ERROR };

        let width_ok = self.check("GL_MAX_VIEWPORT_DIMS[0]".to_owned(), Bound::AtLeast,
                                  min_width, first);
        let height_ok = self.check("GL_MAX_VIEWPORT_DIMS[1]".to_owned(), Bound::AtLeast,
                                   min_height, second);
        width_ok && height_ok
    }

    /// Checks the number of bits of the occlusion query counter.
    ///
    /// The counter may have no bits at all. Otherwise it must be able to count two overdraws
    /// of every pixel of the largest viewport, with at most 32 bits required.
    pub fn test_oq_bits(&mut self) -> bool {
        let dims = self.source.get_integer_pair(gl::MAX_VIEWPORT_DIMS);
        let min_bits = match dims.value {
            Some([w, h]) if w > 0 && h > 0 => occlusion_query_min_bits(w as u32, h as u32),
            _ => 32,
        };

        let query = self.source.get_query_counter_bits(gl::SAMPLES_PASSED);
        let pass = query.error == gl::NO_ERROR && dims.error == gl::NO_ERROR &&
                   query.value.map(|bits| bits == 0 || bits >= min_bits).unwrap_or(false);

        self.record(LimitRecord {
            name: "GL_QUERY_COUNTER_BITS(GL_SAMPLES_PASSED)".to_owned(),
            bound: Bound::ZeroOrAtLeast,
            required: min_bits.into(),
            observed: query.value.map(|v| v.into()),
            error: if query.error != gl::NO_ERROR { query.error } else { dims.error },
            pass,
        })
    }
}

/// Minimum number of occlusion query counter bits for a maximum viewport of the given size.
pub fn occlusion_query_min_bits(max_width: u32, max_height: u32) -> i32 {
    let bits = (max_width as f64 * max_height as f64 * 2.0).log2() as i32;
    bits.min(32)
}

const POISON_I32: [i32; 2] = [0xdeadbeef_u32 as i32, 0x5eedf00d];
const POISON_I64: [i64; 2] = [0xdeadbeef_deadbeef_u64 as i64, 0x5eedf00d_5eedf00d];
const POISON_F32: [f32; 2] = [-1.0e30, 1.0e30];

/// Runs a getter into two different poison values in turn.
///
/// A value is returned as soon as one run overwrote its poison. If both poisons survive the
/// getter never wrote anything.
fn written<T, Q>(poisons: [T; 2], mut query: Q) -> Option<T>
    where T: Copy + PartialEq, Q: FnMut(&mut T)
{
    for poison in poisons.iter() {
        let mut value = *poison;
        query(&mut value);
        if value != *poison {
            return Some(value);
        }
    }

    None
}

/// Same as `written` for getters filling two values.
///
/// Each element must have overwritten its poison in one of the runs. A getter that fills only
/// the first element is treated as writing nothing.
fn written_pair<T, Q>(poisons: [T; 2], mut query: Q) -> Option<[T; 2]>
    where T: Copy + PartialEq, Q: FnMut(&mut [T; 2])
{
    let mut found = [None, None];

    for poison in poisons.iter() {
        let mut value = [*poison; 2];
        query(&mut value);

        for (slot, v) in found.iter_mut().zip(value.iter()) {
            if slot.is_none() && v != poison {
                *slot = Some(*v);
            }
        }
    }

    match found {
        [Some(first), Some(second)] => Some([first, second]),
        _ => None,
    }
}

impl LimitSource for Context {
    fn get_integer(&self, pname: GLenum, index: Option<u32>) -> Query<i32> {
        let gl = self.gl();

        let value = match index {
            None => written(POISON_I32, |v| unsafe { gl.GetIntegerv(pname, v) }),
            Some(index) if self.capabilities().indexed_queries => {
                written(POISON_I32, |v| unsafe { gl.GetIntegeri_v(pname, index, v) })
            },
            Some(_) => {
                log::warn!("indexed queries are not supported by this context");
                None
            },
        };

        Query { value, error: self.get_error() }
    }

    fn get_integer64(&self, pname: GLenum, index: Option<u32>) -> Query<i64> {
        if !self.capabilities().integer64_queries {
            let query = self.get_integer(pname, index);
            return Query { value: query.value.map(|v| v as i64), error: query.error };
        }

        let gl = self.gl();
        let value = match index {
            None => written(POISON_I64, |v| unsafe { gl.GetInteger64v(pname, v) }),
            Some(index) => {
                written(POISON_I64, |v| unsafe { gl.GetInteger64i_v(pname, index, v) })
            },
        };

        Query { value, error: self.get_error() }
    }

    fn get_float(&self, pname: GLenum) -> Query<f32> {
        let gl = self.gl();
        let value = written(POISON_F32, |v| unsafe { gl.GetFloatv(pname, v) });
        Query { value, error: self.get_error() }
    }

    fn get_integer_pair(&self, pname: GLenum) -> Query<[i32; 2]> {
        let gl = self.gl();
        let value = written_pair(POISON_I32, |v: &mut [i32; 2]| unsafe {
            gl.GetIntegerv(pname, v.as_mut_ptr())
        });
        Query { value, error: self.get_error() }
    }

    fn get_float_pair(&self, pname: GLenum) -> Query<[f32; 2]> {
        let gl = self.gl();
        let value = written_pair(POISON_F32, |v: &mut [f32; 2]| unsafe {
            gl.GetFloatv(pname, v.as_mut_ptr())
        });
        Query { value, error: self.get_error() }
    }

    fn get_query_counter_bits(&self, target: GLenum) -> Query<i32> {
        if !self.capabilities().occlusion_queries {
            log::warn!("occlusion queries are not supported by this context");
            return Query { value: None, error: gl::NO_ERROR };
        }

        let gl = self.gl();
        let core = self.get_version() >= &Version(Api::Gl, 1, 5);
        let value = written(POISON_I32, |v| unsafe {
            if core {
                gl.GetQueryiv(target, gl::QUERY_COUNTER_BITS, v)
            } else {
                gl.GetQueryivARB(target, gl::QUERY_COUNTER_BITS_ARB, v)
            }
        });

        Query { value, error: self.get_error() }
    }

    fn framebuffer_dimensions(&self) -> (u32, u32) {
        self.get_framebuffer_dimensions()
    }

    fn framebuffer_objects(&self) -> bool {
        self.capabilities().framebuffer_objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poison_detection() {
        assert_eq!(written(POISON_I32, |_| ()), None);
        assert_eq!(written(POISON_I32, |v| *v = 4), Some(4));
        // a legitimate value equal to the first poison
        assert_eq!(written(POISON_I32, |v| *v = POISON_I32[0]), Some(POISON_I32[0]));
    }

    #[test]
    fn pair_poison_detection() {
        assert_eq!(written_pair(POISON_I32, |v| *v = [16384, 8192]), Some([16384, 8192]));
        assert_eq!(written_pair(POISON_F32, |_| ()), None);
        // only the first element written
        assert_eq!(written_pair(POISON_I32, |v| v[0] = 16384), None);
        assert_eq!(written_pair(POISON_F32, |v| v[0] = 1.0), None);
        // legitimate values equal to one of the poisons
        assert_eq!(written_pair(POISON_I32, |v| *v = [POISON_I32[0], POISON_I32[1]]),
                   Some([POISON_I32[0], POISON_I32[1]]));
    }

    #[test]
    fn rows() {
        assert_eq!(header_line(), format!("{:<50}  minimum    value", "token"));

        let record = LimitRecord {
            name: "GL_MAX_TEXTURE_SIZE".to_owned(),
            bound: Bound::AtLeast,
            required: LimitValue::Int(1024),
            observed: Some(LimitValue::Int(512)),
            error: gl::NO_ERROR,
            pass: false,
        };
        assert_eq!(record.line(),
                   format!("{:<50}     1024      512 (ERROR)", "GL_MAX_TEXTURE_SIZE"));

        let record = LimitRecord {
            required: LimitValue::Float(1.0),
            observed: Some(LimitValue::Float(63.7)),
            pass: true,
            ..record
        };
        assert_eq!(record.line(),
                   format!("{:<50}      1.0     63.7", "GL_MAX_TEXTURE_SIZE"));
    }

    #[test]
    fn occlusion_query_bits() {
        assert_eq!(occlusion_query_min_bits(16384, 16384), 29);
        assert_eq!(occlusion_query_min_bits(u32::MAX, u32::MAX), 32);
        assert_eq!(occlusion_query_min_bits(1, 1), 1);
    }
}
