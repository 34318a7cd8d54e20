//! Value model
//!
//!     Every argument of a request is a [`Value`]. The variants mirror the RenderMan
//!     primitive types; each knows how to print itself in the text encoding and
//!     carries a diagnostic type name used in errors and logs.
//!
//! Numeric Reduction
//!
//!     Floats print in their shortest exact form. An integral float drops its
//!     fractional part, so `1.0` prints as `1` and `1.5` stays `1.5`. See [`reduce`].
//!
//! Brackets
//!
//!     Arrays, colors, vectors, normals, homogeneous points, matrices, bases and bounds
//!     print bracketed. A single point prints bare (`x y z`) because point arrays
//!     concatenate them inside one pair of brackets.

use std::fmt;

/// Namespaces in which string handles are interned independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandleNamespace {
    Light,
    Object,
    Shader,
}

impl HandleNamespace {
    pub const ALL: [HandleNamespace; 3] = [
        HandleNamespace::Light,
        HandleNamespace::Object,
        HandleNamespace::Shader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandleNamespace::Light => "light",
            HandleNamespace::Object => "object",
            HandleNamespace::Shader => "shader",
        }
    }
}

impl fmt::Display for HandleNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single serialisable argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw name, printed without quotes (command-like words, comment text)
    Name(String),
    Boolean(bool),
    Int(i32),
    IntArray(Vec<i32>),
    Float(f64),
    FloatArray(Vec<f64>),
    Token(String),
    TokenArray(Vec<String>),
    Color(Vec<f64>),
    Point([f64; 3]),
    PointArray(Vec<[f64; 3]>),
    Vector([f64; 3]),
    Normal([f64; 3]),
    Hpoint([f64; 4]),
    Matrix([f64; 16]),
    Basis([f64; 16]),
    Bound([f64; 6]),
    String(String),
    StringArray(Vec<String>),
    FilterFunc(String),
    ProcSubdivFunc(String),
    ProcFreeFunc(String),
    ArchiveCallback(String),
    /// Trailing annotation, printed as `#text`
    Annotation(String),
    /// Inner value tagged as a light/object/shader handle
    Handle(HandleNamespace, Box<Value>),
}

impl Value {
    pub fn name(s: impl Into<String>) -> Self {
        Value::Name(s.into())
    }

    pub fn token(s: impl Into<String>) -> Self {
        Value::Token(s.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Tag a string as a handle in the given namespace
    pub fn handle(namespace: HandleNamespace, s: impl Into<String>) -> Self {
        Value::Handle(namespace, Box::new(Value::String(s.into())))
    }

    /// Diagnostic type tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Name(_) => "name",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::IntArray(_) => "[]int",
            Value::Float(_) => "float",
            Value::FloatArray(_) => "[]float",
            Value::Token(_) => "token",
            Value::TokenArray(_) => "[]token",
            Value::Color(_) => "color",
            Value::Point(_) => "point",
            Value::PointArray(_) => "[]point",
            Value::Vector(_) => "vector",
            Value::Normal(_) => "normal",
            Value::Hpoint(_) => "hpoint",
            Value::Matrix(_) => "matrix",
            Value::Basis(_) => "basis",
            Value::Bound(_) => "bound",
            Value::String(_) => "string",
            Value::StringArray(_) => "[]string",
            Value::FilterFunc(_) => "filterfunc",
            Value::ProcSubdivFunc(_) => "procsubdivfunc",
            Value::ProcFreeFunc(_) => "procfreefunc",
            Value::ArchiveCallback(_) => "archivecallbackfunc",
            Value::Annotation(_) => "annotation",
            Value::Handle(HandleNamespace::Light, _) => "lighthandle",
            Value::Handle(HandleNamespace::Object, _) => "objecthandle",
            Value::Handle(HandleNamespace::Shader, _) => "shaderhandle",
        }
    }

    /// Text encoding of this value
    pub fn serialise(&self) -> String {
        match self {
            Value::Name(s) => s.clone(),
            Value::Boolean(true) => "1".to_string(),
            Value::Boolean(false) => "0".to_string(),
            Value::Int(i) => i.to_string(),
            Value::IntArray(a) => bracket(a.iter().map(|i| i.to_string())),
            Value::Float(f) => reduce(*f),
            Value::FloatArray(a) | Value::Color(a) => bracket(a.iter().map(|f| reduce(*f))),
            Value::Token(s)
            | Value::String(s)
            | Value::FilterFunc(s)
            | Value::ProcSubdivFunc(s)
            | Value::ProcFreeFunc(s)
            | Value::ArchiveCallback(s) => quote(s),
            Value::TokenArray(a) | Value::StringArray(a) => bracket(a.iter().map(|s| quote(s))),
            Value::Point(p) => join(p.iter().map(|f| reduce(*f))),
            Value::PointArray(points) => {
                bracket(points.iter().flat_map(|p| p.iter().map(|f| reduce(*f))))
            }
            Value::Vector(v) | Value::Normal(v) => bracket(v.iter().map(|f| reduce(*f))),
            Value::Hpoint(h) => bracket(h.iter().map(|f| reduce(*f))),
            Value::Matrix(m) | Value::Basis(m) => bracket(m.iter().map(|f| reduce(*f))),
            Value::Bound(b) => bracket(b.iter().map(|f| reduce(*f))),
            Value::Annotation(s) if s.is_empty() => String::new(),
            Value::Annotation(s) => format!("#{}", s),
            Value::Handle(_, inner) => inner.serialise(),
        }
    }

    /// Namespace if this value is tagged as a handle
    pub fn handle_namespace(&self) -> Option<HandleNamespace> {
        match self {
            Value::Handle(ns, _) => Some(*ns),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialise())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Shortest exact text for a float; integral values print without a fraction.
pub fn reduce(f: f64) -> String {
    if f == 0.0 {
        // Covers -0.0
        return "0".to_string();
    }
    // Display for f64 is already the shortest round-trip form and never adds ".0"
    format!("{}", f)
}

/// Quoted string with `\` and `"` escaped, as the tokenizer reads them back
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(" ")
}

fn bracket(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", join(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, "1")]
    #[case(1.5, "1.5")]
    #[case(-1.0, "-1")]
    #[case(30.0, "30")]
    #[case(0.25, "0.25")]
    #[case(-0.0, "0")]
    #[case(3.04, "3.04")]
    fn test_reduce(#[case] input: f64, #[case] expected: &str) {
        assert_eq!(reduce(input), expected);
    }

    #[rstest]
    #[case("C:\\out\\", r#""C:\\out\\""#)]
    #[case("say \"hi\"", r#""say \"hi\"""#)]
    #[case("plain.tif", r#""plain.tif""#)]
    fn test_quote_escapes_backslash_and_quote(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Value::string(input).serialise(), expected);
        assert_eq!(
            Value::StringArray(vec![input.to_string()]).serialise(),
            format!("[{}]", expected)
        );
    }

    #[test]
    fn test_point_array_flattens_inside_one_bracket() {
        let points = Value::PointArray(vec![
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
        ]);
        assert_eq!(points.serialise(), "[0 1 0 0 1 1 0 0 1 0 0 0]");
        assert_eq!(points.type_name(), "[]point");
    }

    #[test]
    fn test_single_point_is_bare() {
        assert_eq!(Value::Point([1.0, 2.5, -3.0]).serialise(), "1 2.5 -3");
    }

    #[rstest]
    #[case(Value::Vector([1.0, 0.0, 0.0]), "[1 0 0]", "vector")]
    #[case(Value::Normal([0.0, 1.0, 0.0]), "[0 1 0]", "normal")]
    #[case(Value::Hpoint([1.0, 2.0, 3.0, 1.0]), "[1 2 3 1]", "hpoint")]
    #[case(Value::Color(vec![1.0, 0.0, 0.0]), "[1 0 0]", "color")]
    #[case(Value::Bound([-1.0, 1.0, -1.0, 1.0, 0.0, 2.0]), "[-1 1 -1 1 0 2]", "bound")]
    #[case(Value::IntArray(vec![4, 3]), "[4 3]", "[]int")]
    #[case(Value::FloatArray(vec![0.5, 2.0]), "[0.5 2]", "[]float")]
    #[case(Value::TokenArray(vec!["a".into(), "b".into()]), "[\"a\" \"b\"]", "[]token")]
    #[case(Value::StringArray(vec!["x".into()]), "[\"x\"]", "[]string")]
    #[case(Value::token("P"), "\"P\"", "token")]
    #[case(Value::string("sphere.tif"), "\"sphere.tif\"", "string")]
    #[case(Value::name("WorldBegin"), "WorldBegin", "name")]
    #[case(Value::Boolean(true), "1", "boolean")]
    #[case(Value::Boolean(false), "0", "boolean")]
    #[case(Value::Int(-7), "-7", "int")]
    #[case(Value::FilterFunc("gaussian".into()), "\"gaussian\"", "filterfunc")]
    #[case(Value::ProcSubdivFunc("RunProgram".into()), "\"RunProgram\"", "procsubdivfunc")]
    #[case(Value::ProcFreeFunc("free".into()), "\"free\"", "procfreefunc")]
    #[case(Value::ArchiveCallback("ReadArchive".into()), "\"ReadArchive\"", "archivecallbackfunc")]
    #[case(Value::Annotation("note".into()), "#note", "annotation")]
    #[case(Value::Annotation(String::new()), "", "annotation")]
    fn test_serialise_and_type_name(
        #[case] value: Value,
        #[case] text: &str,
        #[case] type_name: &str,
    ) {
        assert_eq!(value.serialise(), text);
        assert_eq!(value.type_name(), type_name);
    }

    #[test]
    fn test_matrix_prints_sixteen_values() {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        assert_eq!(
            Value::Matrix(m).serialise(),
            "[1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1]"
        );
        assert_eq!(Value::Basis(m).type_name(), "basis");
    }

    #[test]
    fn test_handle_serialises_inner_value() {
        let named = Value::handle(HandleNamespace::Light, "key");
        assert_eq!(named.serialise(), "\"key\"");
        assert_eq!(named.type_name(), "lighthandle");
        assert_eq!(named.handle_namespace(), Some(HandleNamespace::Light));

        let numbered = Value::Handle(HandleNamespace::Object, Box::new(Value::Int(2)));
        assert_eq!(numbered.serialise(), "2");
        assert_eq!(numbered.type_name(), "objecthandle");
    }
}
