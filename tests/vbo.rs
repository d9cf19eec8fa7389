use piglit_util::framework;
use piglit_util::vbo::{parse_vbo, BaseType, Parser, VboError};
use piglit_util::{TestError, TestResult};

mod support;

fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(4).map(|c| f32::from_ne_bytes(c.try_into().unwrap())).collect()
}

fn u32s(bytes: &[u8]) -> Vec<u32> {
    bytes.chunks_exact(4).map(|c| u32::from_ne_bytes(c.try_into().unwrap())).collect()
}

#[test]
fn float_and_uint_columns() {
    let attribs = support::attributes(&[("a", 0), ("b", 1)]);
    let vbo = parse_vbo(&attribs, "a/float/3 b/uint/1\n\
                                   0.5 -1.25 2.0   7\n\
                                   3.0 4.0 5.0     0xffffffff\n").unwrap();

    assert_eq!(vbo.stride(), 16);
    assert_eq!(vbo.num_rows(), 2);
    assert_eq!(vbo.raw_data().len(), 32);

    let row = &vbo.raw_data()[.. 16];
    assert_eq!(f32s(&row[0 .. 12]), [0.5, -1.25, 2.0]);
    assert_eq!(u32s(&row[12 .. 16]), [7]);

    assert_eq!(u32s(vbo.column_data(1, 1)), [u32::MAX]);
}

#[test]
fn matrix_columns_take_consecutive_locations() {
    let attribs = support::attributes(&[("m", 3)]);
    let vbo = parse_vbo(&attribs, "m/mat2x3/3/0 m/mat2x3/3/1\n\
                                   1 2 3 4 5 6\n").unwrap();

    let columns = vbo.columns();
    assert_eq!(columns[0].location(), 3);
    assert_eq!(columns[1].location(), 4);
    assert_eq!(columns[0].offset(), 0);
    assert_eq!(columns[1].offset(), 12);
    assert_eq!(vbo.stride(), 24);

    assert_eq!(f32s(vbo.column_data(1, 0)), [4.0, 5.0, 6.0]);
}

#[test]
fn array_index_skips_whole_elements() {
    let attribs = support::attributes(&[("x", 5), ("m", 8)]);

    let vbo = parse_vbo(&attribs, "x[1]/float/2").unwrap();
    assert_eq!(vbo.columns()[0].array_index(), 1);
    assert_eq!(vbo.columns()[0].location(), 5 + 1);

    // each mat3 element takes three locations
    let vbo = parse_vbo(&attribs, "m[2]/mat3/3/1").unwrap();
    assert_eq!(vbo.columns()[0].location(), 8 + 1 + 2 * 3);
}

#[test]
fn unknown_type_fails_the_test() {
    let attribs = support::attributes(&[("foo", 0)]);

    let err = parse_vbo(&attribs, "foo/bogus/3\n1 2 3\n").unwrap_err();
    match &err {
        VboError::InvalidHeader { line, text, .. } => {
            assert_eq!(*line, 1);
            assert_eq!(text, "foo/bogus/3");
        },
        other => panic!("unexpected error: {:?}", other),
    }

    let err: TestError = err.into();
    let result = framework::resolve(Err(err));
    assert_eq!(result, TestResult::Fail);
    assert_eq!(result.exit_code(), 1);
}

#[test]
fn unknown_type_exits_with_failure() {
    if support::child_scenario().as_deref() == Some("bogus-type") {
        let attribs = support::attributes(&[("foo", 0)]);
        let outcome = parse_vbo(&attribs, "foo/bogus/3\n1 2 3\n")
            .map(|_| TestResult::Pass)
            .map_err(TestError::from);
        framework::resolve(outcome).report();
    }

    let output = support::run_child("unknown_type_exits_with_failure", "bogus-type");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("PIGLIT: {'result': 'fail' }"), "{}", stdout);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn three_colored_vertices() {
    let attribs = support::attributes(&[("pos", 0), ("color", 1)]);
    let text = "\
pos/vec2/2   color/vec3/3
0.0 0.0      1.0 0.0 0.0
1.0 0.0      0.0 1.0 0.0
1.0 1.0      0.0 0.0 1.0
";

    let vbo = parse_vbo(&attribs, text).unwrap();
    assert_eq!(vbo.num_rows(), 3);
    assert_eq!(vbo.stride(), 20);
    assert_eq!(vbo.columns()[1].name(), "color");
    assert_eq!(f32s(vbo.column_data(1, 1)), [0.0, 1.0, 0.0]);
}

#[test]
fn integer_columns() {
    let attribs = support::attributes(&[("i", 0), ("d", 1)]);
    let vbo = parse_vbo(&attribs, "i/ivec2/2 d/double/1\n-0x80000000 010 0.1\n").unwrap();

    let ints: Vec<i32> = vbo.column_data(0, 0).chunks_exact(4)
        .map(|c| i32::from_ne_bytes(c.try_into().unwrap()))
        .collect();
    assert_eq!(ints, [i32::MIN, 8]);

    assert_eq!(vbo.columns()[1].glsl_type().base, BaseType::Double);
    assert_eq!(vbo.column_data(1, 0), &0.1f64.to_ne_bytes()[..]);
    assert_eq!(vbo.stride(), 16);
}

#[test]
fn bad_numbers_report_their_line() {
    let attribs = support::attributes(&[("a", 0), ("b", 1)]);
    let text = "# leading comment\n\
                a/float/1 b/uint/1\n\
                \n\
                1.0 2\n\
                2.0 -3 # negative\n";

    match parse_vbo(&attribs, text) {
        Err(VboError::InvalidData { line, text, message }) => {
            assert_eq!(line, 5);
            assert_eq!(text, "2.0 -3");
            assert!(message.contains("-3"), "{}", message);
        },
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(parse_vbo(&attribs, "a/float/1 b/uint/1\n1.0 4294967296\n").is_err());
    assert!(parse_vbo(&attribs, "a/float/1 b/uint/1\nnope 1\n").is_err());

    // floats too large or too small for the type
    for value in &["1e40", "1e-50"] {
        let text = format!("a/float/1 b/uint/1\n1.0 1\n{} 1\n", value);
        match parse_vbo(&attribs, &text) {
            Err(VboError::InvalidData { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("out of range"), "{}", message);
            },
            other => panic!("{}: unexpected result: {:?}", value, other),
        }
    }

    let attribs = support::attributes(&[("d", 0)]);
    assert!(parse_vbo(&attribs, "d/double/1\n1e400\n").is_err());
    assert!(parse_vbo(&attribs, "d/double/1\n1e40\n").is_ok());
}

#[test]
fn row_length_must_match_header() {
    let attribs = support::attributes(&[("a", 0)]);

    let short = parse_vbo(&attribs, "a/vec3/3\n1.0 2.0\n").unwrap_err();
    assert!(short.to_string().starts_with("Not enough data"), "{}", short);

    let long = parse_vbo(&attribs, "a/vec3/3\n1.0 2.0 3.0 4.0\n").unwrap_err();
    assert!(long.to_string().starts_with("Extra data at end of line"), "{}", long);
}

#[test]
fn header_errors() {
    let attribs = support::attributes(&[("a", 0), ("m", 1)]);
    let header_error = |text: &str| match parse_vbo(&attribs, text) {
        Err(VboError::InvalidHeader { message, .. }) => message,
        other => panic!("{}: unexpected result: {:?}", text, other),
    };

    assert!(header_error("a/float/0").contains("between 1 and 4"));
    assert!(header_error("a/vec4/5").contains("between 1 and 4"));
    assert!(header_error("b/float/1").contains("Unexpected vbo column name"));
    assert!(header_error("a/float").contains("Missing attribute size"));
    assert!(header_error("a").contains("name[index]/type/count/matrix_column"));
    assert!(header_error("m/mat2/2/2").contains("Matrix column"));
    assert!(header_error("a[x]/float/1").contains("array index"));
    assert!(header_error("m[4294967295]/mat3/3/1").contains("Array index out of range"));
}

#[test]
fn missing_header() {
    let attribs = support::attributes(&[]);
    assert_eq!(parse_vbo(&attribs, "\n  # nothing here\n"), Err(VboError::MissingHeader));
}

#[test]
fn streaming_parser() {
    let attribs = support::attributes(&[("a", 2)]);
    let mut parser = Parser::new(&attribs);

    for line in &["a/float/2", "1 2", "3 4", "# done"] {
        parser.parse_line(line).unwrap();
    }

    let vbo = parser.into_vbo().unwrap();
    assert_eq!(vbo.num_rows(), 2);
    assert_eq!(f32s(vbo.column_data(0, 1)), [3.0, 4.0]);
}
