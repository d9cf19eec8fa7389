use piglit_util::gl;
use piglit_util::minmax::{occlusion_query_min_bits, Bound, LimitValue, MinmaxSession};
use piglit_util::TestResult;

mod support;

use support::FakeLimits;

#[test]
fn floor_is_inclusive() {
    let limits = FakeLimits::new()
        .int(gl::MAX_TEXTURE_SIZE, 1024)
        .int(gl::MAX_VERTEX_ATTRIBS, 15);

    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_min_int(gl::MAX_TEXTURE_SIZE, 1024));
    assert!(session.pass());

    assert!(!session.test_min_int(gl::MAX_VERTEX_ATTRIBS, 16));
    assert!(!session.pass());
}

#[test]
fn failure_is_sticky() {
    let limits = FakeLimits::new()
        .int(gl::MAX_TEXTURE_SIZE, 64)
        .int(gl::MAX_VIEWPORTS, 16)
        .float(gl::MAX_TEXTURE_LOD_BIAS, 4.0);

    let mut session = MinmaxSession::new(&limits);
    assert!(!session.test_min_int(gl::MAX_TEXTURE_SIZE, 1024));

    assert!(session.test_min_int(gl::MAX_VIEWPORTS, 16));
    assert!(session.test_min_float(gl::MAX_TEXTURE_LOD_BIAS, 2.0));

    assert!(!session.pass());
    assert_eq!(session.result(), TestResult::Fail);
    assert_eq!(session.records().len(), 3);
}

#[test]
fn ceilings() {
    let limits = FakeLimits::new()
        .int(gl::MIN_PROGRAM_TEXEL_OFFSET, -8)
        .float(gl::MIN_FRAGMENT_INTERPOLATION_OFFSET, -0.5);

    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_max_int(gl::MIN_PROGRAM_TEXEL_OFFSET, -8));
    assert!(!session.test_max_int(gl::MIN_PROGRAM_TEXEL_OFFSET, -9));
    assert!(session.test_max_float(gl::MIN_FRAGMENT_INTERPOLATION_OFFSET, -0.5));

    assert_eq!(session.records()[1].bound, Bound::AtMost);
}

#[test]
fn unset_value_fails() {
    let limits = FakeLimits::new();

    let mut session = MinmaxSession::new(&limits);
    assert!(!session.test_min_int(gl::MAX_TEXTURE_SIZE, 0));

    let record = &session.records()[0];
    assert_eq!(record.observed, None);
    assert!(record.line().contains("unset"));
}

#[test]
fn query_error_fails_even_when_in_range() {
    let limits = FakeLimits::new()
        .int(gl::MAX_TEXTURE_SIZE, 4096)
        .error(gl::MAX_TEXTURE_SIZE, gl::INVALID_ENUM);

    let mut session = MinmaxSession::new(&limits);
    assert!(!session.test_min_int(gl::MAX_TEXTURE_SIZE, 1024));
    assert_eq!(session.records()[0].error, gl::INVALID_ENUM);
    assert!(session.records()[0].line().ends_with(" (ERROR)"));
}

#[test]
fn unsigned_reinterprets_bits() {
    let limits = FakeLimits::new().int(gl::MAX_SERVER_WAIT_TIMEOUT, -1);

    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_min_uint(gl::MAX_SERVER_WAIT_TIMEOUT, 0));
    assert_eq!(session.records()[0].observed, Some(LimitValue::Uint(u32::MAX as u64)));
}

#[test]
fn int64_and_indexed() {
    let limits = FakeLimits::new()
        .int64(gl::MAX_ELEMENT_INDEX, (1 << 24) - 1)
        .int_indexed(gl::MAX_COMPUTE_WORK_GROUP_COUNT, 0, 65535)
        .int_indexed(gl::MAX_COMPUTE_WORK_GROUP_COUNT, 1, 1024);

    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_min_int64(gl::MAX_ELEMENT_INDEX, (1 << 24) - 1));
    assert!(session.test_min_int_indexed(gl::MAX_COMPUTE_WORK_GROUP_COUNT, 0, 65535));
    assert!(!session.test_min_int_indexed(gl::MAX_COMPUTE_WORK_GROUP_COUNT, 1, 65535));

    assert_eq!(session.records()[1].name, "GL_MAX_COMPUTE_WORK_GROUP_COUNT[0]");
}

#[test]
fn ranges() {
    let limits = FakeLimits::new()
        .float_pair(gl::ALIASED_LINE_WIDTH_RANGE, [1.0, 8.0])
        .float_pair(gl::ALIASED_POINT_SIZE_RANGE, [1.0, 32.0]);

    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_range_float(gl::ALIASED_LINE_WIDTH_RANGE, 1.0, 1.0));
    assert!(session.pass());

    // the low end is too high for the requirement
    assert!(!session.test_range_float(gl::ALIASED_POINT_SIZE_RANGE, 0.5, 1.0));

    let names: Vec<&str> = session.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["GL_ALIASED_LINE_WIDTH_RANGE[0]", "GL_ALIASED_LINE_WIDTH_RANGE[1]",
                       "GL_ALIASED_POINT_SIZE_RANGE[0]", "GL_ALIASED_POINT_SIZE_RANGE[1]"]);
    assert!(!session.records()[2].pass);
    assert!(session.records()[3].pass);
}

#[test]
fn viewport_must_cover_framebuffer_and_renderbuffers() {
    let limits = FakeLimits::new()
        .framebuffer(300, 200)
        .int(gl::MAX_RENDERBUFFER_SIZE, 256)
        .int_pair(gl::MAX_VIEWPORT_DIMS, [300, 255]);

    let mut session = MinmaxSession::new(&limits);
    assert!(!session.test_min_viewport_dimensions());

    let records = session.records();
    assert_eq!(records[0].required, LimitValue::Int(300));
    assert!(records[0].pass);
    assert_eq!(records[1].required, LimitValue::Int(256));
    assert!(!records[1].pass);
}

#[test]
fn renderbuffer_size_needs_framebuffer_objects() {
    let limits = FakeLimits::new()
        .without_framebuffer_objects()
        .framebuffer(300, 200)
        .int(gl::MAX_RENDERBUFFER_SIZE, 4096)
        .int_pair(gl::MAX_VIEWPORT_DIMS, [300, 200]);

    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_min_viewport_dimensions());

    let records = session.records();
    assert_eq!(records[0].required, LimitValue::Int(300));
    assert_eq!(records[1].required, LimitValue::Int(200));
}

#[test]
fn occlusion_query_bits() {
    assert_eq!(occlusion_query_min_bits(4096, 4096), 25);
    assert_eq!(occlusion_query_min_bits(1 << 16, 1 << 16), 32);

    let dims = [4096, 4096];

    let limits = FakeLimits::new()
        .int_pair(gl::MAX_VIEWPORT_DIMS, dims)
        .counter_bits(gl::SAMPLES_PASSED, 0);
    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_oq_bits());
    assert!(session.records()[0].line().contains("0 / 25"));

    let limits = FakeLimits::new()
        .int_pair(gl::MAX_VIEWPORT_DIMS, dims)
        .counter_bits(gl::SAMPLES_PASSED, 24);
    let mut session = MinmaxSession::new(&limits);
    assert!(!session.test_oq_bits());

    let limits = FakeLimits::new()
        .int_pair(gl::MAX_VIEWPORT_DIMS, dims)
        .counter_bits(gl::SAMPLES_PASSED, 32);
    let mut session = MinmaxSession::new(&limits);
    assert!(session.test_oq_bits());
}
