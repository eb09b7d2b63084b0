//! JavaScript rendering for the psykick runtimes.
//!
//! Every function here is a pure function of its arguments; the compiler
//! decides what to render and in which order.

use cv_core::BaseClass;
use cv_core::artifact::COMPONENTS_DIR;
use indexmap::IndexMap;

use crate::ast::{Property, Value};

/// One entry of a `var a = require(...), b = require(...);` block.
#[derive(Debug, Clone, Copy)]
pub struct RequiredModule<'a> {
    /// Local variable name.
    pub name: &'a str,
    /// Module path passed to `require`.
    pub module: &'a str,
    /// Exported attribute to pick, if any.
    pub attribute: Option<&'a str>,
}

impl<'a> RequiredModule<'a> {
    /// `name = require('module').attribute`, where the attribute is named like the variable.
    pub fn attribute_of(name: &'a str, module: &'a str) -> Self {
        Self {
            name,
            module,
            attribute: Some(name),
        }
    }

    /// `name = require('module')`.
    pub fn whole(name: &'a str, module: &'a str) -> Self {
        Self {
            name,
            module,
            attribute: None,
        }
    }
}

/// Render a single `var` statement requiring every module, one per line.
pub fn require_statements(modules: &[RequiredModule<'_>]) -> String {
    let lines: Vec<String> = modules
        .iter()
        .map(|m| {
            let mut line = format!("{} = require({})", m.name, quote_string(m.module));
            if let Some(attribute) = m.attribute {
                line.push('.');
                line.push_str(attribute);
            }
            line
        })
        .collect();
    format!("var {};", lines.join(",\n    "))
}

/// `Helper.inherit(derived, base);`
pub fn inheritance_code(derived: &str, base: &str) -> String {
    format!("Helper.inherit({derived}, {base});")
}

/// `module.exports = name;`
pub fn exports_code(name: &str) -> String {
    format!("module.exports = {name};")
}

/// Whether `key` can be written unquoted as a property name.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Single-quoted string literal with `\\`, `\'`, `\n`, `\r` and `\t` escaped.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn format_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote_string(key)
    }
}

/// `this.key` or `this['key']`.
fn member(object: &str, key: &str) -> String {
    if is_identifier(key) {
        format!("{object}.{key}")
    } else {
        format!("{object}[{}]", quote_string(key))
    }
}

/// Render a literal as JavaScript source.
///
/// Entries of a non-empty object or array go on their own lines indented by
/// `depth` tabs; the closing bracket is indented by `depth - 1` tabs.
pub fn format_value(value: &Value, depth: usize) -> String {
    let tabs = "\t".repeat(depth);
    let short_tabs = "\t".repeat(depth.saturating_sub(1));
    match value {
        Value::Number(n) => n.clone(),
        Value::String(s) => quote_string(s),
        Value::Boolean(b) => b.to_string(),
        Value::Object(properties) if properties.is_empty() => "{}".to_string(),
        Value::Object(properties) => {
            let entries: Vec<String> = properties
                .iter()
                .map(|p| {
                    format!(
                        "{tabs}{}: {}",
                        format_key(&p.name),
                        format_value(&p.value, depth + 1)
                    )
                })
                .collect();
            format!("{{\n{}\n{short_tabs}}}", entries.join(",\n"))
        }
        Value::Array(elements) if elements.is_empty() => "[]".to_string(),
        Value::Array(elements) => {
            let entries: Vec<String> = elements
                .iter()
                .map(|e| format!("{tabs}{}", format_value(e, depth + 1)))
                .collect();
            format!("[\n{}\n{short_tabs}]", entries.join(",\n"))
        }
    }
}

/// Property names in first-appearance order, repeats dropped.
fn distinct_names(properties: &[Property]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::with_capacity(properties.len());
    for p in properties {
        if !names.contains(&p.name.as_str()) {
            names.push(&p.name);
        }
    }
    names
}

/// Constructor body merging `options` over the declared defaults and
/// copying every option onto the instance.
pub fn initializer_code(properties: &[Property]) -> String {
    if properties.is_empty() {
        return "\toptions = Helper.defaults(options, {});".to_string();
    }

    let defaults: Vec<String> = properties
        .iter()
        .map(|p| {
            format!(
                "\t\t{}: {}",
                format_key(&p.name),
                format_value(&p.value, 3)
            )
        })
        .collect();
    let fields: Vec<String> = distinct_names(properties)
        .into_iter()
        .map(|name| format!("\t{} = {};", member("this", name), member("options", name)))
        .collect();

    format!(
        "\toptions = Helper.defaults(options, {{\n{}\n\t}});\n\n{}",
        defaults.join(",\n"),
        fields.join("\n")
    )
}

/// JSDoc block for a component constructor.
pub fn constructor_doc(properties: &[Property]) -> String {
    let mut lines = vec![
        "/**".to_string(),
        " * @constructor".to_string(),
        " * @param {Object} [options]".to_string(),
    ];
    for p in properties {
        let default = if p.value.is_scalar() {
            format!("={}", format_value(&p.value, 0))
        } else {
            String::new()
        };
        lines.push(format!(
            " * @param {{{}}} [options.{}{default}]",
            p.value.type_name(),
            p.name
        ));
    }
    lines.push(" */".to_string());
    lines.join("\n")
}

/// Full source of a component file.
pub fn render_component(module: &str, name: &str, properties: &[Property]) -> String {
    let requires = require_statements(&[
        RequiredModule::attribute_of("Component", module),
        RequiredModule::attribute_of("Helper", module),
    ]);

    format!(
        "{requires}\n\n{doc}\nvar {name} = function(options) {{\n\tthis.NAME = {quoted};\n\n{init}\n}};\n\n{inherit}\n\n{exports}\n",
        doc = constructor_doc(properties),
        quoted = quote_string(name),
        init = initializer_code(properties),
        inherit = inheritance_code(name, "Component"),
        exports = exports_code(name),
    )
}

fn tick_hook(system: &str, base: BaseClass) -> String {
    let (summary, method, param, param_doc, order) = match base {
        BaseClass::RenderSystem => (
            "Draws every entity in draw order.",
            "draw",
            "c",
            "{CanvasRenderingContext2D} c",
            "drawOrder",
        ),
        _ => (
            "Updates every entity in action order.",
            "update",
            "delta",
            "{number} delta - Time since last update",
            "actionOrder",
        ),
    };
    format!(
        "/**\n * {summary}\n * @param {param_doc}\n */\n\
         {system}.prototype.{method} = function({param}) {{\n\
         \tfor (var i = 0, len = this.{order}.length; i < len; i++) {{\n\
         \t\tvar entity = this.{order}[i];\n\
         \t}}\n\
         }};"
    )
}

/// Full source of a system file.
///
/// With a base class the file requires it, inherits from it and gets the
/// matching tick hook; without one it only exposes `requiredComponents`.
pub fn render_system(
    module: &str,
    name: &str,
    base: Option<BaseClass>,
    required_components: &[String],
) -> String {
    let list: Vec<String> = required_components
        .iter()
        .map(|c| format!("\t\t{}", quote_string(c)))
        .collect();
    let constructor = format!(
        "var {name} = function() {{\n\tthis.requiredComponents = [\n{}\n\t];\n}};",
        list.join(",\n")
    );

    let mut sections = Vec::with_capacity(5);
    if let Some(base) = base {
        sections.push(require_statements(&[
            RequiredModule::attribute_of(base.class_name(), module),
            RequiredModule::attribute_of("Helper", module),
        ]));
    }
    sections.push(constructor);
    if let Some(base) = base {
        sections.push(inheritance_code(name, base.class_name()));
        sections.push(tick_hook(name, base));
    }
    sections.push(exports_code(name));

    let mut source = sections.join("\n\n");
    source.push('\n');
    source
}

/// A template's resolved components, ready for the factory.
#[derive(Debug, Clone, Copy)]
pub struct FactoryEntry<'a> {
    /// Template name.
    pub template: &'a str,
    /// Component name mapped to its merged property bag.
    pub components: &'a IndexMap<String, Vec<Property>>,
}

/// `create<Template>`.
pub fn factory_function_name(template: &str) -> String {
    format!("create{template}")
}

fn factory_function(entry: &FactoryEntry<'_>) -> String {
    let mut lines = vec![
        format!("\t{}: function() {{", factory_function_name(entry.template)),
        "\t\tvar entity = World.createEntity();".to_string(),
    ];
    for (component, properties) in entry.components {
        lines.push(format!(
            "\t\tentity.addComponent(new {component}({}));",
            format_value(&Value::Object(properties.clone()), 3)
        ));
    }
    lines.push("\t\treturn entity;".to_string());
    lines.push("\t}".to_string());
    lines.join("\n")
}

/// Full source of the factory file.
///
/// `component_imports` maps each referenced component to its file name;
/// imports are emitted sorted by file name length, then lexicographically.
pub fn render_factory(
    module: &str,
    entries: &[FactoryEntry<'_>],
    component_imports: &IndexMap<String, String>,
) -> String {
    let mut imports: Vec<(&String, String)> = component_imports
        .iter()
        .map(|(name, file)| (name, format!("./{COMPONENTS_DIR}/{file}")))
        .collect();
    imports.sort_by(|(_, a), (_, b)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut modules = vec![RequiredModule::attribute_of("World", module)];
    modules.extend(
        imports
            .iter()
            .map(|(name, path)| RequiredModule::whole(name, path)),
    );

    let body = if entries.is_empty() {
        "var Factory = {};".to_string()
    } else {
        let functions: Vec<String> = entries.iter().map(factory_function).collect();
        format!("var Factory = {{\n{}\n}};", functions.join(",\n\n"))
    };

    format!(
        "{}\n\n{body}\n\n{}\n",
        require_statements(&modules),
        exports_code("Factory")
    )
}
