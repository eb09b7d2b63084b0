use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::ast::*;
use crate::lexer::Token;

type Span = SimpleSpan;

/// Parse error with source span.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Byte range of the offending input.
    pub span: std::ops::Range<usize>,
    /// Human-readable description.
    pub message: String,
}

fn spanned<T>(node: T, span: Span) -> Spanned<T> {
    Spanned {
        node,
        span: span.into_range(),
    }
}

/// Literal values: numbers, strings, booleans, objects and arrays, nested
/// to any depth.
fn value_parser<'a, I>() -> impl Parser<'a, I, Value, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let kw = |k: &'static str| select! { Token::Word(ref w) if w.as_str() == k => () }.labelled(k);
    let key = select! {
        Token::Word(w) => w,
        Token::Str(s) => s,
    }
    .labelled("property name");

    recursive(|value| {
        let property = key
            .then_ignore(just(Token::Colon))
            .then(value.clone())
            .map(|(name, value)| Property { name, value });

        let object = property
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(Value::Object);

        let array = value
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(Value::Array);

        choice((
            select! {
                Token::Number(n) => Value::Number(n),
                Token::Str(s) => Value::String(s),
            },
            kw("true").to(Value::Boolean(true)),
            kw("false").to(Value::Boolean(false)),
            object,
            array,
        ))
        .labelled("value")
    })
}

/// A braced, comma separated `key: value` list with optional trailing comma.
fn properties_parser<'a, I>() -> impl Parser<'a, I, Vec<Property>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let key = select! {
        Token::Word(w) => w,
        Token::Str(s) => s,
    }
    .labelled("property name");

    key.then_ignore(just(Token::Colon))
        .then(value_parser())
        .map(|(name, value)| Property { name, value })
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
}

/// Sequence of top-level declarations.
fn declarations_parser<'a, I>()
-> impl Parser<'a, I, Vec<Spanned<Declaration>>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = Span>,
{
    let kw = |k: &'static str| select! { Token::Word(ref w) if w.as_str() == k => () }.labelled(k);
    let ident = select! { Token::Word(w) => w }
        .labelled("identifier")
        .map_with(|w, e| spanned(w, e.span()));

    let extends = kw("extends").ignore_then(ident.clone()).or_not();

    let name_list = ident
        .clone()
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBracket), just(Token::RBracket));

    // Name { key: value, ... }
    let named_properties = ident
        .clone()
        .then(properties_parser())
        .map(|(name, properties)| Component { name, properties });

    // project "Name" | project Name
    let project_decl = kw("project")
        .ignore_then(
            select! {
                Token::Str(s) => s,
                Token::Word(w) => w,
            }
            .labelled("project name")
            .map_with(|name, e| spanned(name, e.span())),
        )
        .map(Declaration::Project)
        .labelled("project declaration");

    let component_decl = kw("component")
        .ignore_then(named_properties.clone())
        .map(Declaration::Component)
        .labelled("component declaration");

    let instances = named_properties
        .then_ignore(just(Token::Comma).or_not())
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBrace), just(Token::RBrace));

    let template_decl = kw("template")
        .ignore_then(ident.clone())
        .then(extends.clone())
        .then(instances)
        .map(|((name, parent), components)| {
            Declaration::Template(Template {
                name,
                parent,
                components,
            })
        })
        .labelled("template declaration");

    let requirement = choice((
        kw("components")
            .ignore_then(just(Token::Colon))
            .ignore_then(name_list.clone())
            .map(Requirement::Components),
        kw("entities")
            .ignore_then(just(Token::Colon))
            .ignore_then(name_list)
            .map(Requirement::Entities),
    ))
    .then_ignore(just(Token::Comma).or_not());

    let system_body = requirement
        .or_not()
        .map(|r| r.unwrap_or(Requirement::Components(Vec::new())))
        .delimited_by(just(Token::LBrace), just(Token::RBrace));

    let system_decl = kw("system")
        .ignore_then(ident)
        .then(extends)
        .then(system_body)
        .map(|((name, parent), requirement)| {
            Declaration::System(System {
                name,
                parent,
                requirement,
            })
        })
        .labelled("system declaration");

    choice((project_decl, component_decl, template_decl, system_decl))
        .map_with(|decl, e| spanned(decl, e.span()))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

fn rich_to_parse_error(e: Rich<'_, Token>) -> ParseError {
    let span = e.span();
    ParseError {
        span: span.into_range(),
        message: e.to_string(),
    }
}

/// Parse a token stream into a program.
///
/// Exactly one `project` declaration is required.
pub fn parse(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Program, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    let (output, errors) = declarations_parser().parse(stream).into_output_errors();

    if !errors.is_empty() {
        return Err(errors.into_iter().map(rich_to_parse_error).collect());
    }
    match output {
        Some(declarations) => assemble(declarations, len),
        None => Err(vec![ParseError {
            span: len..len,
            message: "could not parse program".to_string(),
        }]),
    }
}

/// Parse a token stream holding exactly one literal value.
pub fn parse_value(tokens: &[(Token, std::ops::Range<usize>)]) -> Result<Value, Vec<ParseError>> {
    let token_iter = tokens
        .iter()
        .map(|(tok, span)| (tok.clone(), Span::from(span.clone())));

    let len = tokens.last().map_or(0, |(_, s)| s.end);
    let eoi: Span = (len..len).into();
    let stream = Stream::from_iter(token_iter).map(eoi, |(t, s): (_, _)| (t, s));

    value_parser()
        .then_ignore(end())
        .parse(stream)
        .into_result()
        .map_err(|errors| errors.into_iter().map(rich_to_parse_error).collect())
}

/// Sort declarations into a program, checking the single `project`.
fn assemble(declarations: Vec<Spanned<Declaration>>, eoi: usize) -> Result<Program, Vec<ParseError>> {
    let mut name: Option<Spanned<String>> = None;
    let mut components = Vec::new();
    let mut templates = Vec::new();
    let mut systems = Vec::new();
    let mut errors = Vec::new();

    for decl in declarations {
        match decl.node {
            Declaration::Project(project) => {
                if let Some(first) = &name {
                    errors.push(ParseError {
                        span: decl.span,
                        message: format!(
                            "duplicate project declaration (project '{}' already declared)",
                            first.node
                        ),
                    });
                } else {
                    name = Some(project);
                }
            }
            Declaration::Component(c) => components.push(c),
            Declaration::Template(t) => templates.push(t),
            Declaration::System(s) => systems.push(s),
        }
    }

    let Some(name) = name else {
        errors.push(ParseError {
            span: eoi..eoi,
            message: "missing project declaration".to_string(),
        });
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Program {
        name,
        components,
        templates,
        systems,
    })
}
