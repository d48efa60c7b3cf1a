//! Declaration parsers (keyword-dispatched).

use std::str::FromStr;

use cto_core::ClassKind;

use super::{ParseError, TokenStream};
use crate::ast::{
    ClassDeclaration, ClassMember, Declaration, Decorator, DecoratorArgument, EnumDeclaration,
    EnumMember, FieldDeclaration, ImportDecl, ModelFile, RangeClause, RelationshipDeclaration,
    SYNTHETIC_ID_FIELD,
};
use crate::lexer::Token;

/// `namespace a.b  import*  declaration*`
pub(super) fn parse_model(stream: &mut TokenStream<'_>) -> Result<ModelFile, ParseError> {
    stream.expect_keyword("namespace")?;
    let namespace = parse_dotted(stream, false)?;

    let mut imports = Vec::new();
    while stream.eat_keyword("import") {
        imports.push(parse_import(stream)?);
    }

    let mut body = Vec::new();
    while !stream.at_end() {
        body.push(parse_declaration(stream)?);
    }

    Ok(ModelFile {
        namespace,
        imports,
        body,
    })
}

/// Dotted path `a.b.c`, optionally ending in `.*`.
fn parse_dotted(stream: &mut TokenStream<'_>, allow_star: bool) -> Result<String, ParseError> {
    let mut path = stream.expect_ident("namespace segment")?;
    while stream.eat(&Token::Dot) {
        path.push('.');
        if allow_star && stream.eat(&Token::Star) {
            path.push('*');
            break;
        }
        path.push_str(&stream.expect_ident("namespace segment")?);
    }
    Ok(path)
}

fn parse_import(stream: &mut TokenStream<'_>) -> Result<ImportDecl, ParseError> {
    let namespace = parse_dotted(stream, true)?;
    if !namespace.contains('.') {
        return Err(stream.error_here(format!(
            "import path {namespace:?} must name a namespace and a type or '*'"
        )));
    }
    let uri = if stream.eat_keyword("from") {
        match stream.advance() {
            Some(Token::Uri(uri)) => Some(uri.clone()),
            _ => return Err(stream.error_here("expected a URI after 'from'")),
        }
    } else {
        None
    };
    Ok(ImportDecl { namespace, uri })
}

fn parse_declaration(stream: &mut TokenStream<'_>) -> Result<Declaration, ParseError> {
    let decorators = parse_decorators(stream)?;
    let is_abstract = stream.eat_keyword("abstract");

    let keyword = match stream.peek() {
        Some(Token::Ident(k)) => k.as_str(),
        _ => return Err(stream.error_expected("a declaration")),
    };

    if keyword == "enum" {
        stream.advance();
        if is_abstract {
            return Err(stream.error_here("an enum cannot be abstract"));
        }
        return parse_enum(stream, decorators).map(Declaration::Enum);
    }

    match ClassKind::from_str(keyword) {
        Ok(kind) => {
            stream.advance();
            parse_class(stream, kind, is_abstract, decorators).map(Declaration::Class)
        }
        Err(_) => Err(stream.error_expected(
            "'asset', 'concept', 'enum', 'event', 'participant' or 'transaction'",
        )),
    }
}

fn parse_class(
    stream: &mut TokenStream<'_>,
    kind: ClassKind,
    is_abstract: bool,
    decorators: Vec<Decorator>,
) -> Result<ClassDeclaration, ParseError> {
    let id = stream.expect_ident("a declaration name")?;
    let mut class_extension = None;
    let mut id_field = None;

    loop {
        if stream.eat_keyword("extends") {
            if class_extension.is_some() {
                return Err(stream.error_here(format!("{id} has more than one 'extends'")));
            }
            class_extension = Some(stream.expect_ident("a super type name")?);
        } else if stream.eat_keyword("identified") {
            if id_field.is_some() {
                return Err(stream.error_here(format!("{id} has more than one 'identified'")));
            }
            id_field = Some(if stream.eat_keyword("by") {
                stream.expect_ident("an identifying field name")?
            } else {
                SYNTHETIC_ID_FIELD.to_string()
            });
        } else {
            break;
        }
    }

    stream.expect(Token::LBrace)?;
    let mut body = Vec::new();
    while !stream.eat(&Token::RBrace) {
        body.push(parse_member(stream)?);
    }

    Ok(ClassDeclaration {
        kind,
        id,
        is_abstract,
        class_extension,
        id_field,
        decorators,
        body,
    })
}

fn parse_member(stream: &mut TokenStream<'_>) -> Result<ClassMember, ParseError> {
    let decorators = parse_decorators(stream)?;

    if stream.eat(&Token::Arrow) {
        let property_type = stream.expect_ident("a relationship type")?;
        let array = stream.eat_array_marker();
        let id = stream.expect_ident("a field name")?;
        let optional = stream.eat_keyword("optional");
        return Ok(ClassMember::Relationship(RelationshipDeclaration {
            id,
            property_type,
            array,
            optional,
            decorators,
        }));
    }

    if !stream.eat_keyword("o") {
        return Err(stream.error_expected("'o', '-->' or '}'"));
    }
    let property_type = stream.expect_ident("a field type")?;
    let array = stream.eat_array_marker();
    let id = stream.expect_ident("a field name")?;

    let mut field = FieldDeclaration {
        id,
        property_type,
        array,
        optional: false,
        default: None,
        range: None,
        regex: None,
        decorators,
    };
    parse_field_modifiers(stream, &mut field)?;
    Ok(ClassMember::Field(field))
}

/// `optional`, `default=`, `range=` and `regex=` in any order, each at most once.
fn parse_field_modifiers(
    stream: &mut TokenStream<'_>,
    field: &mut FieldDeclaration,
) -> Result<(), ParseError> {
    loop {
        if stream.eat_keyword("optional") {
            if field.optional {
                return Err(repeated(stream, field, "optional"));
            }
            field.optional = true;
        } else if stream.eat_keyword("default") {
            if field.default.is_some() {
                return Err(repeated(stream, field, "default"));
            }
            stream.expect(Token::Eq)?;
            field.default = Some(parse_default_literal(stream)?);
        } else if stream.eat_keyword("range") {
            if field.range.is_some() {
                return Err(repeated(stream, field, "range"));
            }
            stream.expect(Token::Eq)?;
            field.range = Some(parse_range(stream)?);
        } else if stream.eat_keyword("regex") {
            if field.regex.is_some() {
                return Err(repeated(stream, field, "regex"));
            }
            stream.expect(Token::Eq)?;
            match stream.advance() {
                Some(Token::Regex(parts)) => field.regex = Some(parts.clone()),
                _ => return Err(stream.error_here("expected a /regex/ literal")),
            }
        } else {
            return Ok(());
        }
    }
}

fn repeated(stream: &TokenStream<'_>, field: &FieldDeclaration, modifier: &str) -> ParseError {
    stream.error_here(format!("field {} repeats '{modifier}'", field.id))
}

fn parse_default_literal(stream: &mut TokenStream<'_>) -> Result<String, ParseError> {
    match stream.peek() {
        Some(Token::Str(s)) | Some(Token::Number(s)) | Some(Token::Ident(s)) => {
            stream.advance();
            Ok(s.clone())
        }
        _ => Err(stream.error_expected("a default value")),
    }
}

fn parse_range(stream: &mut TokenStream<'_>) -> Result<RangeClause, ParseError> {
    stream.expect(Token::LBracket)?;
    let lower = parse_optional_number(stream);
    stream.expect(Token::Comma)?;
    let upper = parse_optional_number(stream);
    stream.expect(Token::RBracket)?;
    Ok(RangeClause { lower, upper })
}

fn parse_optional_number(stream: &mut TokenStream<'_>) -> Option<String> {
    match stream.peek() {
        Some(Token::Number(n)) => {
            stream.advance();
            Some(n.clone())
        }
        _ => None,
    }
}

fn parse_enum(
    stream: &mut TokenStream<'_>,
    decorators: Vec<Decorator>,
) -> Result<EnumDeclaration, ParseError> {
    let id = stream.expect_ident("an enum name")?;
    stream.expect(Token::LBrace)?;
    let mut body = Vec::new();
    while !stream.eat(&Token::RBrace) {
        let decorators = parse_decorators(stream)?;
        if !stream.eat_keyword("o") {
            return Err(stream.error_expected("'o' or '}'"));
        }
        let member = stream.expect_ident("an enum value")?;
        body.push(EnumMember {
            id: member,
            decorators,
        });
    }
    Ok(EnumDeclaration {
        id,
        decorators,
        body,
    })
}

fn parse_decorators(stream: &mut TokenStream<'_>) -> Result<Vec<Decorator>, ParseError> {
    let mut decorators = Vec::new();
    while stream.eat(&Token::At) {
        let name = stream.expect_ident("a decorator name")?;
        let arguments = if stream.eat(&Token::LParen) {
            let mut args = Vec::new();
            if !stream.eat(&Token::RParen) {
                loop {
                    args.push(parse_decorator_argument(stream)?);
                    if !stream.eat(&Token::Comma) {
                        break;
                    }
                }
                stream.expect(Token::RParen)?;
            }
            Some(args)
        } else {
            None
        };
        decorators.push(Decorator { name, arguments });
    }
    Ok(decorators)
}

fn parse_decorator_argument(stream: &mut TokenStream<'_>) -> Result<DecoratorArgument, ParseError> {
    match stream.peek() {
        Some(Token::Str(s)) => {
            stream.advance();
            Ok(DecoratorArgument::String(s.clone()))
        }
        Some(Token::Number(n)) => {
            stream.advance();
            n.parse::<f64>()
                .map(DecoratorArgument::Number)
                .map_err(|_| stream.error_here(format!("number {n} is out of range")))
        }
        Some(Token::Ident(word)) => {
            stream.advance();
            Ok(match word.as_str() {
                "true" => DecoratorArgument::Boolean(true),
                "false" => DecoratorArgument::Boolean(false),
                _ => DecoratorArgument::Identifier {
                    name: word.clone(),
                    array: stream.eat_array_marker(),
                },
            })
        }
        _ => Err(stream.error_expected("a decorator argument")),
    }
}
