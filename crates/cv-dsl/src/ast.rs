/// Source span as a byte range.
pub type Span = std::ops::Range<usize>;

/// An AST node with source location.
#[derive(Debug, Clone)]
pub struct Spanned<T> {
    /// The wrapped AST node.
    pub node: T,
    /// The byte range of this node in the source text.
    pub span: Span,
}

/// A parsed program: the root of the AST.
#[derive(Debug, Clone)]
pub struct Program {
    /// Name from the `project` declaration.
    pub name: Spanned<String>,
    /// Component declarations in source order.
    pub components: Vec<Component>,
    /// Template declarations in source order.
    pub templates: Vec<Template>,
    /// System declarations in source order.
    pub systems: Vec<System>,
}

/// A top-level declaration, before the program is assembled.
#[derive(Debug, Clone)]
pub enum Declaration {
    /// `project "Name"`.
    Project(Spanned<String>),
    /// `component Name { ... }`.
    Component(Component),
    /// `template Name [extends Parent] { ... }`.
    Template(Template),
    /// `system Name [extends Base] { ... }`.
    System(System),
}

/// A named, ordered property list.
///
/// Used both for component declarations (properties are the defaults) and
/// for component instances inside a template (properties are overrides).
#[derive(Debug, Clone)]
pub struct Component {
    /// The component name.
    pub name: Spanned<String>,
    /// Properties in source order.
    pub properties: Vec<Property>,
}

/// A `key: value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// The key.
    pub name: String,
    /// The value.
    pub value: Value,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A number, as written in the source.
    Number(String),
    /// A string, escapes already processed.
    String(String),
    /// `true` or `false`.
    Boolean(bool),
    /// `{ key: value, ... }`. Keys may repeat.
    Object(Vec<Property>),
    /// `[value, ...]`.
    Array(Vec<Value>),
}

impl Value {
    /// Type name used in generated documentation.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Object(_) => "Object",
            Value::Array(_) => "Array",
        }
    }

    /// Whether this is a number, string or boolean.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Object(_) | Value::Array(_))
    }
}

/// An entity blueprint.
#[derive(Debug, Clone)]
pub struct Template {
    /// The template name.
    pub name: Spanned<String>,
    /// The template this one extends, if any.
    pub parent: Option<Spanned<String>>,
    /// Component instances with their property overrides.
    pub components: Vec<Component>,
}

/// A processing unit over entities holding a set of components.
#[derive(Debug, Clone)]
pub struct System {
    /// The system name.
    pub name: Spanned<String>,
    /// The declared base class name, validated by the compiler.
    pub parent: Option<Spanned<String>>,
    /// How the required components are given.
    pub requirement: Requirement,
}

/// The required-component declaration of a system.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// `components: [A, B]`: an explicit list.
    Components(Vec<Spanned<String>>),
    /// `entities: [T, U]`: the union of the named templates' components.
    Entities(Vec<Spanned<String>>),
}
