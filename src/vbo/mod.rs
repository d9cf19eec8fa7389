/*!
Vertex data described as a small text table.

The first line names the columns, the following lines hold one vertex each:

```text
vertex/float/2  color/vec3/3   # header
0.0 0.0         1.0 0.0 0.0
1.0 0.0         0.0 1.0 0.0
1.0 1.0         0.0 0.0 1.0
```

Each column header is `name[index]/type/count/matrix_column`, where `[index]` and
`/matrix_column` are optional:

 - `name` is looked up in the attributes of a linked program.
 - `[index]` selects an element of an array attribute.
 - `type` is a GLSL type: `int`, `uint`, `float`, `double`, `ivecN`, `uvecN`, `vecN`, `dvecN`,
   `matN`, `matNxM`, `dmatN` or `dmatNxM`.
 - `count` is the number of components of the column, between 1 and 4.
 - `matrix_column` selects the column of a matrix attribute supplied by this header column.

The attribute location is `base + matrix_column + index * columns_of_type`. Rows are packed
without padding: each column takes `count * 4` bytes, or `count * 8` for doubles.

`#` starts a comment. Blank and comment-only lines are ignored anywhere.

Any malformed input is a broken test, so every error here is meant to end the test with a
failure.
*/
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::hash::BuildHasher;

use crate::backend::Facade;
use crate::context::{Context, IntegerAttribApi, ShaderApi};
use crate::gl;
use crate::program::Program;
use crate::version::{Api, Version};

pub mod parse_num;

/// Error while parsing or uploading vertex data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VboError {
    /// The text has no header line.
    MissingHeader,

    /// A column header is invalid.
    InvalidHeader {
        /// What is wrong.
        message: String,
        /// 1-based line number.
        line: usize,
        /// The line, comments stripped.
        text: String,
    },

    /// A data row is invalid.
    InvalidData {
        /// What is wrong.
        message: String,
        /// 1-based line number.
        line: usize,
        /// The line, comments stripped.
        text: String,
    },

    /// The context lacks a feature the header requires.
    Unsupported(String),
}

impl fmt::Display for VboError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VboError::MissingHeader => fmt.write_str("Missing header line"),
            VboError::InvalidHeader { message, line, text } |
            VboError::InvalidData { message, line, text } => {
                write!(fmt, "{}\nAt line {} of [vertex data] section. Offending text: {}",
                       message, line, text)
            },
            VboError::Unsupported(message) => fmt.write_str(message),
        }
    }
}

impl Error for VboError {}

/// Scalar type of a column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// 32-bit signed integer.
    Int,
    /// 32-bit unsigned integer.
    Uint,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl BaseType {
    /// Size of one component in bytes.
    #[inline]
    pub fn byte_width(self) -> usize {
        match self {
            BaseType::Double => 8,
            BaseType::Int | BaseType::Uint | BaseType::Float => 4,
        }
    }

    /// The `GLenum` of the component type.
    pub fn to_glenum(self) -> gl::types::GLenum {
        match self {
            BaseType::Int => gl::INT,
            BaseType::Uint => gl::UNSIGNED_INT,
            BaseType::Float => gl::FLOAT,
            BaseType::Double => gl::DOUBLE,
        }
    }
}

/// A GLSL attribute type: a scalar, a vector or a matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GlslType {
    /// Type of the components.
    pub base: BaseType,
    /// Number of columns. Each column takes one attribute location.
    pub columns: u32,
    /// Number of rows of each column.
    pub rows: u32,
}

impl GlslType {
    /// Decodes a GLSL type name.
    pub fn from_name(name: &str) -> Option<GlslType> {
        let scalar = |base| Some(GlslType { base, columns: 1, rows: 1 });

        match name {
            "int" => return scalar(BaseType::Int),
            "uint" => return scalar(BaseType::Uint),
            "float" => return scalar(BaseType::Float),
            "double" => return scalar(BaseType::Double),
            _ => (),
        }

        let size = |s: &str| match s.parse::<u32>() {
            Ok(n) if (2 ..= 4).contains(&n) && s.len() == 1 => Some(n),
            _ => None,
        };

        let (base, rest) = match name.as_bytes().first() {
            Some(b'i') => (BaseType::Int, &name[1..]),
            Some(b'u') => (BaseType::Uint, &name[1..]),
            Some(b'd') => (BaseType::Double, &name[1..]),
            _ => (BaseType::Float, name),
        };

        if let Some(n) = rest.strip_prefix("vec") {
            return Some(GlslType { base, columns: 1, rows: size(n)? });
        }

        // integer matrices don't exist
        let mat = rest.strip_prefix("mat")?;
        if base == BaseType::Int || base == BaseType::Uint {
            return None;
        }

        match mat.split_once('x') {
            None => {
                let n = size(mat)?;
                Some(GlslType { base, columns: n, rows: n })
            },
            Some((columns, rows)) => {
                Some(GlslType { base, columns: size(columns)?, rows: size(rows)? })
            },
        }
    }

    /// Returns true for `matN` and `matNxM` types.
    #[inline]
    pub fn is_matrix(&self) -> bool {
        self.columns > 1
    }
}

/// Something that maps attribute names to locations.
pub trait AttribLookup {
    /// Returns the base location of an active attribute.
    fn attrib_location(&self, name: &str) -> Option<u32>;
}

impl AttribLookup for Program {
    fn attrib_location(&self, name: &str) -> Option<u32> {
        Program::attrib_location(self, name)
    }
}

impl<S: BuildHasher> AttribLookup for HashMap<String, u32, S> {
    fn attrib_location(&self, name: &str) -> Option<u32> {
        self.get(name).cloned()
    }
}

/// One column of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    array_index: u32,
    glsl_type: GlslType,
    count: u32,
    matrix_column: u32,
    location: u32,
    offset: usize,
}

impl Column {
    /// Name of the attribute.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Array element, 0 for non-array attributes.
    #[inline]
    pub fn array_index(&self) -> u32 {
        self.array_index
    }

    /// Declared GLSL type.
    #[inline]
    pub fn glsl_type(&self) -> GlslType {
        self.glsl_type
    }

    /// Number of components of the column.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Matrix column supplied by this column, 0 for non-matrix attributes.
    #[inline]
    pub fn matrix_column(&self) -> u32 {
        self.matrix_column
    }

    /// Attribute location the column is bound to.
    #[inline]
    pub fn location(&self) -> u32 {
        self.location
    }

    /// Byte offset of the column inside a row.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes the column takes in a row.
    #[inline]
    pub fn size(&self) -> usize {
        self.count as usize * self.glsl_type.base.byte_width()
    }
}

/// Parsed vertex data.
#[derive(Debug, Clone, PartialEq)]
pub struct Vbo {
    columns: Vec<Column>,
    raw_data: Vec<u8>,
    stride: usize,
    num_rows: usize,
}

impl Vbo {
    /// Columns in header order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Interleaved data of every row.
    #[inline]
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// Number of bytes of each row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Bytes of one column in one row.
    pub fn column_data(&self, column: usize, row: usize) -> &[u8] {
        let column = &self.columns[column];
        let start = row * self.stride + column.offset;
        &self.raw_data[start .. start + column.size()]
    }

    /// Creates a buffer holding the data and points every column's attribute at it.
    ///
    /// The buffer stays bound to `GL_ARRAY_BUFFER`. On core profiles a vertex array object
    /// must be bound by the caller.
    pub fn upload<F: ?Sized + Facade>(&self, facade: &F) -> Result<VertexBuffer, VboError> {
        let ctxt = facade.get_context();
        self.check_support(ctxt)?;

        let caps = ctxt.capabilities();
        let gl = ctxt.gl();
        let stride = self.stride as gl::types::GLsizei;

        let mut id = 0;
        unsafe {
            gl.GenBuffers(1, &mut id);
            gl.BindBuffer(gl::ARRAY_BUFFER, id);
            gl.BufferData(gl::ARRAY_BUFFER, self.raw_data.len() as gl::types::GLsizeiptr,
                          self.raw_data.as_ptr() as *const _, gl::STATIC_DRAW);

            for column in &self.columns {
                let size = column.count as gl::types::GLint;
                let ty = column.glsl_type.base.to_glenum();
                let offset = column.offset as *const _;

                match (column.glsl_type.base, caps.integer_attribs) {
                    (BaseType::Float, _) => {
                        if caps.shader_api == Some(ShaderApi::Arb) {
                            gl.VertexAttribPointerARB(column.location, size, ty, gl::FALSE,
                                                      stride, offset);
                        } else {
                            gl.VertexAttribPointer(column.location, size, ty, gl::FALSE,
                                                   stride, offset);
                        }
                    },
                    (BaseType::Double, _) => {
                        gl.VertexAttribLPointer(column.location, size, ty, stride, offset);
                    },
                    (_, Some(IntegerAttribApi::Ext)) => {
                        gl.VertexAttribIPointerEXT(column.location, size, ty, stride, offset);
                    },
                    (_, _) => {
                        gl.VertexAttribIPointer(column.location, size, ty, stride, offset);
                    },
                }

                if caps.shader_api == Some(ShaderApi::Arb) {
                    gl.EnableVertexAttribArrayARB(column.location);
                } else {
                    gl.EnableVertexAttribArray(column.location);
                }
            }
        }

        log::debug!("uploaded {} rows of {} bytes into buffer {}", self.num_rows, self.stride,
                    id);

        Ok(VertexBuffer { id, num_rows: self.num_rows, stride: self.stride })
    }

    /// Fails if the context can't feed the columns of this table.
    pub fn check_support(&self, ctxt: &Context) -> Result<(), VboError> {
        let version = ctxt.get_version();
        let caps = ctxt.capabilities();

        if !(version >= &Version(Api::Gl, 1, 5) || version >= &Version(Api::GlEs, 2, 0)) {
            return Err(VboError::Unsupported("Test requires GL version 1.5".to_owned()));
        }

        if caps.shader_api.is_none() {
            return Err(VboError::Unsupported("Test requires GL version 2.0 or \
                                              GL_ARB_vertex_shader".to_owned()));
        }

        for column in &self.columns {
            match column.glsl_type.base {
                BaseType::Double if !caps.double_attribs => {
                    return Err(VboError::Unsupported(format!(
                        "Column {} requires GL version 4.1 or GL_ARB_vertex_attrib_64bit",
                        column.name)));
                },
                BaseType::Int | BaseType::Uint if caps.integer_attribs.is_none() => {
                    return Err(VboError::Unsupported(format!(
                        "Column {} requires GL version 3.0 or GL_EXT_gpu_shader4",
                        column.name)));
                },
                _ => (),
            }
        }

        Ok(())
    }
}

impl std::str::FromStr for Vbo {
    type Err = VboError;

    /// Parses a table whose names are the locations themselves, as in `0/vec4/4`.
    fn from_str(text: &str) -> Result<Vbo, VboError> {
        parse_vbo(&NumericLocations, text)
    }
}

struct NumericLocations;

impl AttribLookup for NumericLocations {
    fn attrib_location(&self, name: &str) -> Option<u32> {
        name.parse().ok()
    }
}

/// The buffer created by `Vbo::upload`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexBuffer {
    id: gl::types::GLuint,
    num_rows: usize,
    stride: usize,
}

impl VertexBuffer {
    /// Name of the buffer object.
    #[inline]
    pub fn get_id(&self) -> gl::types::GLuint {
        self.id
    }

    /// Number of vertices in the buffer.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of bytes of each vertex.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }
}

macro_rules! invalid_header {
    ($line:expr, $text:expr, $($message:expr),+) => {
        return Err(VboError::InvalidHeader {
            message: format!($($message),+),
            line: $line,
            text: $text.to_owned(),
        })
    }
}

macro_rules! invalid_data {
    ($line:expr, $text:expr, $($message:expr),+) => {
        return Err(VboError::InvalidData {
            message: format!($($message),+),
            line: $line,
            text: $text.to_owned(),
        })
    }
}

/// Streaming parser: feed it lines, then call `into_vbo`.
pub struct Parser<'a, L: ?Sized> {
    attribs: &'a L,
    // None until the header line has been seen
    columns: Option<Vec<Column>>,
    raw_data: Vec<u8>,
    stride: usize,
    num_rows: usize,
    line_num: usize,
}

impl<'a, L: ?Sized + AttribLookup> Parser<'a, L> {
    /// Starts a parser resolving attribute names with `attribs`.
    pub fn new(attribs: &'a L) -> Parser<'a, L> {
        Parser {
            attribs,
            columns: None,
            raw_data: Vec::new(),
            stride: 0,
            num_rows: 0,
            line_num: 0,
        }
    }

    fn trim_line(line: &str) -> &str {
        let line = match line.find('#') {
            Some(end) => &line[.. end],
            None => line,
        };

        line.trim()
    }

    /// Parses the next line of the text.
    pub fn parse_line(&mut self, line: &str) -> Result<(), VboError> {
        self.line_num += 1;
        let line = Self::trim_line(line);

        if line.is_empty() {
            return Ok(());
        }

        if self.columns.is_none() {
            self.parse_header_line(line)
        } else {
            self.parse_data_line(line)
        }
    }

    fn parse_header_line(&mut self, line: &str) -> Result<(), VboError> {
        let mut columns = Vec::new();
        let mut offset = 0;

        for header in line.split_whitespace() {
            let column = self.parse_column_header(line, header, offset)?;
            offset += column.size();
            columns.push(column);
        }

        self.stride = offset;
        self.columns = Some(columns);
        Ok(())
    }

    fn parse_column_header(&self, line: &str, header: &str, offset: usize)
                           -> Result<Column, VboError>
    {
        let ln = self.line_num;
        let mut parts = header.split('/');

        let (name, array_index) = match parts.next() {
            Some(name) => match name.split_once('[') {
                None => (name, 0),
                Some((name, index)) => {
                    let index = match index.strip_suffix(']').map(parse_num::parse_u32) {
                        Some(Ok(index)) => index,
                        _ => invalid_header!(ln, line, "Invalid array index in {}", header),
                    };
                    (name, index)
                },
            },
            None => invalid_header!(ln, line, "Empty column header"),
        };

        let glsl_type = match parts.next() {
            Some(type_name) => match GlslType::from_name(type_name) {
                Some(ty) => ty,
                None => invalid_header!(ln, line, "Unrecognized GLSL type: {}", type_name),
            },
            None => {
                invalid_header!(ln, line, "Column headers must be in the form \
                                           name[index]/type/count/matrix_column. Got: {}",
                                header)
            },
        };

        let count = match parts.next().map(parse_num::parse_u32) {
            Some(Ok(count)) if (1 ..= 4).contains(&count) => count,
            Some(_) => {
                invalid_header!(ln, line, "Attribute size must be between 1 and 4. Got: {}",
                                header)
            },
            None => invalid_header!(ln, line, "Missing attribute size in {}", header),
        };

        let matrix_column = match parts.next().map(parse_num::parse_u32) {
            None => 0,
            Some(Ok(column)) if column < glsl_type.columns => column,
            Some(_) => {
                invalid_header!(ln, line, "Matrix column index out of range for {}", header)
            },
        };

        if parts.next().is_some() {
            invalid_header!(ln, line, "Extra data at end of column header: {}", header);
        }

        let base = match self.attribs.attrib_location(name) {
            Some(location) => location,
            None => invalid_header!(ln, line, "Unexpected vbo column name. Got: {}", name),
        };

        let location = array_index.checked_mul(glsl_type.columns)
            .and_then(|l| l.checked_add(matrix_column))
            .and_then(|l| l.checked_add(base));
        let location = match location {
            Some(location) => location,
            None => invalid_header!(ln, line, "Array index out of range for {}", header),
        };

        Ok(Column {
            name: name.to_owned(),
            array_index,
            glsl_type,
            count,
            matrix_column,
            location,
            offset,
        })
    }

    fn parse_data_line(&mut self, line: &str) -> Result<(), VboError> {
        let ln = self.line_num;
        let columns = match self.columns.as_ref() {
            Some(columns) => columns,
            None => return Err(VboError::MissingHeader),
        };

        let mut row = Vec::with_capacity(self.stride);
        let mut tokens = line.split_whitespace();

        for column in columns {
            for _ in 0 .. column.count {
                let token = match tokens.next() {
                    Some(token) => token,
                    None => invalid_data!(ln, line, "Not enough data for column {}",
                                          column.name),
                };

                let parsed = match column.glsl_type.base {
                    BaseType::Int => parse_num::parse_i32(token).map(|v| {
                        row.extend_from_slice(&v.to_ne_bytes())
                    }),
                    BaseType::Uint => parse_num::parse_u32(token).map(|v| {
                        row.extend_from_slice(&v.to_ne_bytes())
                    }),
                    BaseType::Float => parse_num::parse_f32(token).map(|v| {
                        row.extend_from_slice(&v.to_ne_bytes())
                    }),
                    BaseType::Double => parse_num::parse_f64(token).map(|v| {
                        row.extend_from_slice(&v.to_ne_bytes())
                    }),
                };

                if let Err(err) = parsed {
                    let kind = match column.glsl_type.base {
                        BaseType::Int => "int",
                        BaseType::Uint => "unsigned int",
                        BaseType::Float => "float",
                        BaseType::Double => "double",
                    };
                    invalid_data!(ln, line, "Couldn't parse {} as {}: {}", token, kind, err);
                }
            }
        }

        if tokens.next().is_some() {
            invalid_data!(ln, line, "Extra data at end of line");
        }

        self.raw_data.extend_from_slice(&row);
        self.num_rows += 1;
        Ok(())
    }

    /// Finishes parsing.
    pub fn into_vbo(self) -> Result<Vbo, VboError> {
        let columns = self.columns.ok_or(VboError::MissingHeader)?;

        Ok(Vbo {
            columns,
            raw_data: self.raw_data,
            stride: self.stride,
            num_rows: self.num_rows,
        })
    }
}

/// Parses a whole table.
pub fn parse_vbo<L: ?Sized + AttribLookup>(attribs: &L, text: &str) -> Result<Vbo, VboError> {
    let mut parser = Parser::new(attribs);

    for line in text.lines() {
        parser.parse_line(line)?;
    }

    parser.into_vbo()
}

/// Parses a table against the attributes of `attribs`, uploads it and sets up the attribute
/// pointers. Returns the number of rows, which is the number of vertices to draw.
pub fn setup_vbo_from_text<F, L>(facade: &F, attribs: &L, text: &str)
                                 -> Result<usize, VboError>
    where F: ?Sized + Facade, L: ?Sized + AttribLookup
{
    let vbo = parse_vbo(attribs, text)?;
    let buffer = vbo.upload(facade)?;
    Ok(buffer.num_rows())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glsl_types() {
        let ty = |name| GlslType::from_name(name);

        assert_eq!(ty("float"), Some(GlslType { base: BaseType::Float, columns: 1, rows: 1 }));
        assert_eq!(ty("uvec3"), Some(GlslType { base: BaseType::Uint, columns: 1, rows: 3 }));
        assert_eq!(ty("dvec2"), Some(GlslType { base: BaseType::Double, columns: 1, rows: 2 }));
        assert_eq!(ty("mat3"), Some(GlslType { base: BaseType::Float, columns: 3, rows: 3 }));
        assert_eq!(ty("mat2x3"), Some(GlslType { base: BaseType::Float, columns: 2, rows: 3 }));
        assert_eq!(ty("dmat4x2"),
                   Some(GlslType { base: BaseType::Double, columns: 4, rows: 2 }));

        for bad in ["vec1", "vec5", "imat2", "mat", "mat2x", "mat2x5", "bvec2", "vec22", ""] {
            assert_eq!(ty(bad), None, "{}", bad);
        }
    }

    #[test]
    fn comments_and_blank_lines() {
        let vbo: Vbo = "\n# only a comment\n0/float/1 # header\n\n1.5 # one\n   \n-2\n"
            .parse().unwrap();

        assert_eq!(vbo.num_rows(), 2);
        assert_eq!(vbo.stride(), 4);
        assert_eq!(vbo.column_data(0, 1), &(-2.0f32).to_ne_bytes()[..]);
    }

    #[test]
    fn missing_header() {
        assert_eq!("".parse::<Vbo>(), Err(VboError::MissingHeader));
        assert_eq!("# nothing\n\n".parse::<Vbo>(), Err(VboError::MissingHeader));
    }

    #[test]
    fn header_without_rows() {
        let vbo: Vbo = "0/vec4/4 1/double/1".parse().unwrap();
        assert_eq!(vbo.num_rows(), 0);
        assert_eq!(vbo.stride(), 16 + 8);
        assert_eq!(vbo.columns()[1].offset(), 16);
    }

    #[test]
    fn location_overflow() {
        for text in ["4294967295[1]/float/1", "0[4294967295]/mat3/3/1", "4294967295/mat2/2/1"] {
            match text.parse::<Vbo>() {
                Err(VboError::InvalidHeader { message, line: 1, .. }) => {
                    assert!(message.starts_with("Array index out of range"), "{}", message);
                },
                other => panic!("{}: unexpected result: {:?}", text, other),
            }
        }
    }

    #[test]
    fn ext_integer_attrib_entry_point() {
        // used by `Vbo::upload` on GL_EXT_gpu_shader4 contexts
        let _ = gl::Gl::VertexAttribIPointerEXT;
    }

    #[test]
    fn error_display() {
        let err = "0/float/1\n1.0 2.0\n".parse::<Vbo>().unwrap_err();
        assert_eq!(err.to_string(),
                   "Extra data at end of line\n\
                    At line 2 of [vertex data] section. Offending text: 1.0 2.0");
    }
}
