//! Recursive descent parser for GraphQL.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{DirectiveLocation, Token, TokenKind};
use gqlc_core::{diagnostics::codes, DiagnosticBag, FileId, Interner, Span};

/// Parser for GraphQL documents.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// End of the last consumed token.
    prev_end: u32,
    diagnostics: DiagnosticBag,
}

/// Result of parsing.
pub struct ParseResult {
    pub document: Document,
    pub diagnostics: DiagnosticBag,
}

/// Parses the whole text of a file.
pub fn parse(source: &str, file: FileId, interner: &Interner) -> ParseResult {
    parse_with_base(source, file, 0, interner)
}

/// Parses text that starts `base` bytes into `file`.
pub fn parse_with_base(source: &str, file: FileId, base: u32, interner: &Interner) -> ParseResult {
    let mut parser = Parser::new(Lexer::with_base(source, file, base, interner));
    let document = parser.parse_document();
    ParseResult {
        document,
        diagnostics: parser.diagnostics,
    }
}

impl<'a> Parser<'a> {
    /// Creates a new parser.
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let prev_end = lexer.pos();
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            prev_end,
            diagnostics: DiagnosticBag::new(),
        }
    }

    #[inline]
    fn at(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn advance(&mut self) {
        self.prev_end = self.current.span.end;
        self.current = self.lexer.next_token();
    }

    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            self.error_expected(kind);
            false
        }
    }

    /// Consumes `kind` if it is the current token.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_text(&self) -> &'a str {
        self.lexer.span_text(self.current.span)
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(self.lexer.file(), start, self.prev_end.max(start))
    }

    /// Skips the current token if the last parse step consumed nothing.
    fn ensure_progress(&mut self, before: u32) {
        if self.current.span.start == before && !self.at_kind(TokenKind::Eof) {
            self.advance();
        }
    }

    fn error(&mut self, message: &str) {
        let found = self.at();
        self.diagnostics.error(
            codes::INVALID_SYNTAX,
            message,
            self.current.span,
            format!("found {found}"),
        );
    }

    fn error_expected(&mut self, expected: TokenKind) {
        let code = if self.at_kind(TokenKind::Eof) {
            codes::UNEXPECTED_EOF
        } else {
            codes::UNEXPECTED_TOKEN
        };
        self.diagnostics.error(
            code,
            "unexpected token",
            self.current.span,
            format!("expected {}, found {}", expected, self.at()),
        );
    }

    /// Parses a document.
    pub fn parse_document(&mut self) -> Document {
        let start = self.current.span.start;
        let mut definitions = Vec::new();

        while !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            }
            self.ensure_progress(before);
        }

        Document {
            definitions,
            span: self.span_from(start),
        }
    }

    fn parse_definition(&mut self) -> Option<Definition> {
        let description = self.try_parse_description();

        match self.at() {
            TokenKind::Schema => Some(Definition::Schema(
                self.parse_schema_definition(description),
            )),
            TokenKind::Type
            | TokenKind::Interface
            | TokenKind::Union
            | TokenKind::Enum
            | TokenKind::Input
            | TokenKind::Scalar => self.parse_type_definition(description).map(Definition::Type),
            TokenKind::Extend => {
                self.advance();
                if self.at_kind(TokenKind::Schema) {
                    Some(Definition::SchemaExtension(self.parse_schema_definition(None)))
                } else {
                    self.parse_type_definition(None)
                        .map(Definition::TypeExtension)
                }
            }
            TokenKind::Directive => Some(Definition::Directive(
                self.parse_directive_definition(description),
            )),
            TokenKind::Query
            | TokenKind::Mutation
            | TokenKind::Subscription
            | TokenKind::LBrace => Some(Definition::Operation(self.parse_operation())),
            TokenKind::Fragment => Some(Definition::Fragment(self.parse_fragment_definition())),
            _ => {
                self.error("expected definition");
                None
            }
        }
    }

    fn parse_type_definition(&mut self, description: Option<Description>) -> Option<TypeDefinition> {
        match self.at() {
            TokenKind::Type => Some(TypeDefinition::Object(self.parse_object_type(description))),
            TokenKind::Interface => Some(TypeDefinition::Interface(
                self.parse_interface_type(description),
            )),
            TokenKind::Union => Some(TypeDefinition::Union(self.parse_union_type(description))),
            TokenKind::Enum => Some(TypeDefinition::Enum(self.parse_enum_type(description))),
            TokenKind::Input => Some(TypeDefinition::Input(
                self.parse_input_object_type(description),
            )),
            TokenKind::Scalar => Some(TypeDefinition::Scalar(self.parse_scalar_type(description))),
            _ => {
                self.error("expected type definition");
                None
            }
        }
    }

    fn try_parse_description(&mut self) -> Option<Description> {
        match self.at() {
            TokenKind::StringLiteral | TokenKind::BlockStringLiteral => {
                let span = self.current.span;
                let value = self.string_value();
                self.advance();
                Some(Description::new(value, span))
            }
            _ => None,
        }
    }

    /// Decodes the current string token.
    fn string_value(&self) -> String {
        let text = self.current_text();
        if self.at_kind(TokenKind::BlockStringLiteral) {
            block_string_value(&text[3..text.len() - 3])
        } else {
            unescape(&text[1..text.len() - 1])
        }
    }

    fn parse_name(&mut self) -> Name {
        let span = self.current.span;
        if self.at().is_name() {
            let value = self.lexer.intern_span(span);
            self.advance();
            Name::new(value, span)
        } else {
            self.error("expected name");
            Name::new(self.lexer.intern_span(Span::empty(span.file, span.start)), span)
        }
    }

    fn parse_schema_definition(&mut self, description: Option<Description>) -> SchemaDefinition {
        let start = self.current.span.start;
        self.advance(); // schema

        let directives = self.parse_directives();
        let mut operations = Vec::new();

        if self.eat(TokenKind::LBrace) {
            while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                let op_start = self.current.span.start;
                let operation = match self.at() {
                    TokenKind::Query => OperationType::Query,
                    TokenKind::Mutation => OperationType::Mutation,
                    TokenKind::Subscription => OperationType::Subscription,
                    _ => {
                        self.error("expected operation type");
                        self.advance();
                        continue;
                    }
                };
                self.advance();
                self.expect(TokenKind::Colon);
                let type_name = self.parse_name();
                operations.push(OperationTypeDefinition {
                    operation,
                    type_name,
                    span: self.span_from(op_start),
                });
            }
            self.expect(TokenKind::RBrace);
        }

        SchemaDefinition {
            description,
            directives,
            operations,
            span: self.span_from(start),
        }
    }

    fn parse_object_type(&mut self, description: Option<Description>) -> ObjectTypeDefinition {
        let start = self.current.span.start;
        self.advance(); // type

        let name = self.parse_name();
        let implements = self.parse_implements();
        let directives = self.parse_directives();
        let fields = self.parse_fields_block();

        ObjectTypeDefinition {
            description,
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    fn parse_interface_type(&mut self, description: Option<Description>) -> InterfaceTypeDefinition {
        let start = self.current.span.start;
        self.advance(); // interface

        let name = self.parse_name();
        let implements = self.parse_implements();
        let directives = self.parse_directives();
        let fields = self.parse_fields_block();

        InterfaceTypeDefinition {
            description,
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    fn parse_union_type(&mut self, description: Option<Description>) -> UnionTypeDefinition {
        let start = self.current.span.start;
        self.advance(); // union

        let name = self.parse_name();
        let directives = self.parse_directives();

        let mut members = Vec::new();
        if self.eat(TokenKind::Eq) {
            self.eat(TokenKind::Pipe);
            members.push(self.parse_name());
            while self.eat(TokenKind::Pipe) {
                members.push(self.parse_name());
            }
        }

        UnionTypeDefinition {
            description,
            name,
            directives,
            members,
            span: self.span_from(start),
        }
    }

    fn parse_enum_type(&mut self, description: Option<Description>) -> EnumTypeDefinition {
        let start = self.current.span.start;
        self.advance(); // enum

        let name = self.parse_name();
        let directives = self.parse_directives();

        let mut values = Vec::new();
        if self.eat(TokenKind::LBrace) {
            while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                let before = self.current.span.start;
                let description = self.try_parse_description();
                let value_start = self.current.span.start;
                let name = self.parse_name();
                let directives = self.parse_directives();
                values.push(EnumValueDefinition {
                    description,
                    name,
                    directives,
                    span: self.span_from(value_start),
                });
                self.ensure_progress(before);
            }
            self.expect(TokenKind::RBrace);
        }

        EnumTypeDefinition {
            description,
            name,
            directives,
            values,
            span: self.span_from(start),
        }
    }

    fn parse_input_object_type(
        &mut self,
        description: Option<Description>,
    ) -> InputObjectTypeDefinition {
        let start = self.current.span.start;
        self.advance(); // input

        let name = self.parse_name();
        let directives = self.parse_directives();

        let fields = if self.eat(TokenKind::LBrace) {
            let fields = self.parse_input_value_definitions(TokenKind::RBrace);
            self.expect(TokenKind::RBrace);
            fields
        } else {
            Vec::new()
        };

        InputObjectTypeDefinition {
            description,
            name,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    fn parse_scalar_type(&mut self, description: Option<Description>) -> ScalarTypeDefinition {
        let start = self.current.span.start;
        self.advance(); // scalar

        let name = self.parse_name();
        let directives = self.parse_directives();

        ScalarTypeDefinition {
            description,
            name,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_directive_definition(&mut self, description: Option<Description>) -> DirectiveDefinition {
        let start = self.current.span.start;
        self.advance(); // directive
        self.expect(TokenKind::At);
        let name = self.parse_name();

        let arguments = if self.eat(TokenKind::LParen) {
            let args = self.parse_input_value_definitions(TokenKind::RParen);
            self.expect(TokenKind::RParen);
            args
        } else {
            Vec::new()
        };

        let repeatable = self.eat(TokenKind::Repeatable);
        self.expect(TokenKind::On);
        self.eat(TokenKind::Pipe);

        let mut locations = Vec::new();
        loop {
            let text = self.current_text();
            match DirectiveLocation::parse(text) {
                Some(location) if self.at().is_name() => {
                    locations.push(location);
                    self.advance();
                }
                _ => {
                    self.error("expected directive location");
                    break;
                }
            }
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }

        DirectiveDefinition {
            description,
            name,
            arguments,
            repeatable,
            locations,
            span: self.span_from(start),
        }
    }

    /// Parses `implements A & B`. A leading `&` is allowed.
    fn parse_implements(&mut self) -> Vec<Name> {
        let mut implements = Vec::new();
        if self.eat(TokenKind::Implements) {
            self.eat(TokenKind::Amp);
            implements.push(self.parse_name());
            while self.eat(TokenKind::Amp) {
                implements.push(self.parse_name());
            }
        }
        implements
    }

    /// Parses an optional `{ field: Type ... }` block.
    fn parse_fields_block(&mut self) -> Vec<FieldDefinition> {
        let mut fields = Vec::new();
        if !self.eat(TokenKind::LBrace) {
            return fields;
        }
        while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let description = self.try_parse_description();
            fields.push(self.parse_field_definition(description));
            self.ensure_progress(before);
        }
        self.expect(TokenKind::RBrace);
        fields
    }

    fn parse_field_definition(&mut self, description: Option<Description>) -> FieldDefinition {
        let start = self.current.span.start;
        let name = self.parse_name();

        let arguments = if self.eat(TokenKind::LParen) {
            let args = self.parse_input_value_definitions(TokenKind::RParen);
            self.expect(TokenKind::RParen);
            args
        } else {
            Vec::new()
        };

        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let directives = self.parse_directives();

        FieldDefinition {
            description,
            name,
            arguments,
            ty,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_input_value_definitions(&mut self, close: TokenKind) -> Vec<InputValueDefinition> {
        let mut fields = Vec::new();
        while !self.at_kind(close) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let description = self.try_parse_description();
            fields.push(self.parse_input_value_definition(description));
            self.ensure_progress(before);
        }
        fields
    }

    fn parse_input_value_definition(&mut self, description: Option<Description>) -> InputValueDefinition {
        let start = self.current.span.start;
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();

        let default_value = if self.eat(TokenKind::Eq) {
            Some(self.parse_value())
        } else {
            None
        };

        let directives = self.parse_directives();

        InputValueDefinition {
            description,
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
        }
    }

    /// Parses a type: `Name`, `[Type]`, either followed by `!`.
    fn parse_type(&mut self) -> Type {
        let start = self.current.span.start;

        let ty = if self.eat(TokenKind::LBracket) {
            let inner = self.parse_type();
            self.expect(TokenKind::RBracket);
            Type::List(Box::new(inner), self.span_from(start))
        } else {
            let name = self.parse_name();
            Type::Named(NamedType {
                name: name.value,
                span: name.span,
            })
        };

        if self.eat(TokenKind::Bang) {
            Type::NonNull(Box::new(ty), self.span_from(start))
        } else {
            ty
        }
    }

    fn parse_directives(&mut self) -> Vec<Directive> {
        let mut directives = Vec::new();
        while self.at_kind(TokenKind::At) {
            directives.push(self.parse_directive());
        }
        directives
    }

    fn parse_directive(&mut self) -> Directive {
        let start = self.current.span.start;
        self.advance(); // @

        let name = self.parse_name();
        let arguments = self.parse_arguments();

        Directive {
            name,
            arguments,
            span: self.span_from(start),
        }
    }

    /// Parses an optional `(name: value ...)` list.
    fn parse_arguments(&mut self) -> Vec<Argument> {
        let mut args = Vec::new();
        if !self.eat(TokenKind::LParen) {
            return args;
        }
        while !self.at_kind(TokenKind::RParen) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let start = self.current.span.start;
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let value = self.parse_value();
            args.push(Argument {
                name,
                value,
                span: self.span_from(start),
            });
            self.ensure_progress(before);
        }
        self.expect(TokenKind::RParen);
        args
    }

    fn parse_value(&mut self) -> Value {
        let start = self.current.span.start;

        match self.at() {
            TokenKind::Dollar => {
                self.advance();
                let name = self.parse_name();
                Value::Variable(Name::new(name.value, self.span_from(start)))
            }
            TokenKind::IntLiteral => {
                let value = match self.current_text().parse() {
                    Ok(value) => value,
                    Err(_) => {
                        self.error("integer literal out of range");
                        0
                    }
                };
                self.advance();
                Value::Int(value, self.span_from(start))
            }
            TokenKind::FloatLiteral => {
                let value = self.current_text().parse().unwrap_or(0.0);
                self.advance();
                Value::Float(value, self.span_from(start))
            }
            TokenKind::StringLiteral | TokenKind::BlockStringLiteral => {
                let value = self.string_value();
                self.advance();
                Value::String(value, self.span_from(start))
            }
            TokenKind::True => {
                self.advance();
                Value::Boolean(true, self.span_from(start))
            }
            TokenKind::False => {
                self.advance();
                Value::Boolean(false, self.span_from(start))
            }
            TokenKind::Null => {
                self.advance();
                Value::Null(self.span_from(start))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut values = Vec::new();
                while !self.at_kind(TokenKind::RBracket) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    values.push(self.parse_value());
                    self.ensure_progress(before);
                }
                self.expect(TokenKind::RBracket);
                Value::List(values, self.span_from(start))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut fields = Vec::new();
                while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    let name = self.parse_name();
                    self.expect(TokenKind::Colon);
                    let value = self.parse_value();
                    fields.push((name, value));
                    self.ensure_progress(before);
                }
                self.expect(TokenKind::RBrace);
                Value::Object(fields, self.span_from(start))
            }
            kind if kind.is_name() => Value::Enum(self.parse_name()),
            _ => {
                self.error("expected value");
                Value::Null(Span::empty(self.lexer.file(), start))
            }
        }
    }

    fn parse_operation(&mut self) -> OperationDefinition {
        let start = self.current.span.start;

        let (operation, name) = if self.at_kind(TokenKind::LBrace) {
            (OperationType::Query, None)
        } else {
            let op = match self.at() {
                TokenKind::Mutation => OperationType::Mutation,
                TokenKind::Subscription => OperationType::Subscription,
                _ => OperationType::Query,
            };
            self.advance();

            let name = if self.at().is_name() {
                Some(self.parse_name())
            } else {
                None
            };

            (op, name)
        };

        let variables = if self.eat(TokenKind::LParen) {
            let mut vars = Vec::new();
            while !self.at_kind(TokenKind::RParen) && !self.at_kind(TokenKind::Eof) {
                let before = self.current.span.start;
                vars.push(self.parse_variable_definition());
                self.ensure_progress(before);
            }
            self.expect(TokenKind::RParen);
            vars
        } else {
            Vec::new()
        };

        let directives = self.parse_directives();
        let selection_set = self.parse_selection_set();

        OperationDefinition {
            operation,
            name,
            variables,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_variable_definition(&mut self) -> VariableDefinition {
        let start = self.current.span.start;
        self.expect(TokenKind::Dollar);
        let name = self.parse_name();
        self.expect(TokenKind::Colon);
        let ty = self.parse_type();

        let default_value = if self.eat(TokenKind::Eq) {
            Some(self.parse_value())
        } else {
            None
        };

        let directives = self.parse_directives();

        VariableDefinition {
            name,
            ty,
            default_value,
            directives,
            span: self.span_from(start),
        }
    }

    fn parse_fragment_definition(&mut self) -> FragmentDefinition {
        let start = self.current.span.start;
        self.advance(); // fragment

        let name = self.parse_name();
        self.expect(TokenKind::On);
        let type_condition = self.parse_name();
        let directives = self.parse_directives();
        let selection_set = self.parse_selection_set();

        FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }

    fn parse_selection_set(&mut self) -> SelectionSet {
        let start = self.current.span.start;
        self.expect(TokenKind::LBrace);

        let mut selections = Vec::new();
        while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            selections.push(self.parse_selection());
            self.ensure_progress(before);
        }
        self.expect(TokenKind::RBrace);

        SelectionSet {
            selections,
            span: self.span_from(start),
        }
    }

    fn parse_selection(&mut self) -> Selection {
        if !self.at_kind(TokenKind::Spread) {
            return Selection::Field(self.parse_field_selection());
        }

        let start = self.current.span.start;
        self.advance(); // ...

        if self.eat(TokenKind::On) {
            let type_condition = Some(self.parse_name());
            let directives = self.parse_directives();
            let selection_set = self.parse_selection_set();
            Selection::InlineFragment(InlineFragment {
                type_condition,
                directives,
                selection_set,
                span: self.span_from(start),
            })
        } else if self.at_kind(TokenKind::LBrace) || self.at_kind(TokenKind::At) {
            let directives = self.parse_directives();
            let selection_set = self.parse_selection_set();
            Selection::InlineFragment(InlineFragment {
                type_condition: None,
                directives,
                selection_set,
                span: self.span_from(start),
            })
        } else {
            let name = self.parse_name();
            let directives = self.parse_directives();
            Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                span: self.span_from(start),
            })
        }
    }

    fn parse_field_selection(&mut self) -> FieldSelection {
        let start = self.current.span.start;

        let first_name = self.parse_name();
        let (alias, name) = if self.eat(TokenKind::Colon) {
            (Some(first_name), self.parse_name())
        } else {
            (None, first_name)
        };

        let arguments = self.parse_arguments();
        let directives = self.parse_directives();

        let selection_set = if self.at_kind(TokenKind::LBrace) {
            Some(self.parse_selection_set())
        } else {
            None
        };

        FieldSelection {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            span: self.span_from(start),
        }
    }
}

/// Resolves escape sequences in a quoted string body.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Applies the block string rules: common indentation and blank
/// leading/trailing lines are removed.
fn block_string_value(raw: &str) -> String {
    let raw = raw.replace("\\\"\"\"", "\"\"\"");
    let lines: Vec<&str> = raw.lines().collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            (indent < line.len()).then_some(indent)
        })
        .min()
        .unwrap_or(0);

    let mut dedented: Vec<&str> = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.len() < common_indent {
                line
            } else {
                &line[common_indent..]
            }
        })
        .collect();

    while dedented.first().is_some_and(|line| line.trim().is_empty()) {
        dedented.remove(0);
    }
    while dedented.last().is_some_and(|line| line.trim().is_empty()) {
        dedented.pop();
    }

    dedented.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlc_core::Text;
    use indoc::indoc;

    fn parse_ok(source: &str, interner: &Interner) -> Document {
        let result = parse(source, FileId::default(), interner);
        assert!(
            !result.diagnostics.has_errors(),
            "unexpected errors: {:?}",
            result.diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>()
        );
        result.document
    }

    #[test]
    fn test_parse_schema_types() {
        let interner = Interner::new();
        let document = parse_ok(
            indoc! {r#"
                schema { query: Query mutation: Mutation }
                type Query { hero(episode: Episode = NEWHOPE): Character }
                interface Character { id: ID! friends: [Character] }
                type Droid implements Character & Node { id: ID! friends: [Character] }
                union SearchResult = | Human | Droid
                enum Episode { NEWHOPE EMPIRE JEDI }
                input ReviewInput { stars: Int! commentary: String }
                scalar Date
                directive @cached(ttl: Int) repeatable on FIELD | QUERY
            "#},
            &interner,
        );
        assert_eq!(document.definitions.len(), 9);
        match &document.definitions[4] {
            Definition::Type(TypeDefinition::Union(union)) => assert_eq!(union.members.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
        match &document.definitions[8] {
            Definition::Directive(directive) => {
                assert!(directive.repeatable);
                assert_eq!(
                    directive.locations,
                    vec![DirectiveLocation::Field, DirectiveLocation::Query]
                );
            }
            other => panic!("expected directive, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_wrapped_types() {
        let interner = Interner::new();
        let document = parse_ok("type Query { a: [Int!]! }", &interner);
        let Definition::Type(TypeDefinition::Object(query)) = &document.definitions[0] else {
            panic!("expected object type");
        };
        let ty = &query.fields[0].ty;
        assert!(ty.is_non_null());
        let Type::NonNull(list, _) = ty else { unreachable!() };
        let Type::List(item, _) = list.as_ref() else {
            panic!("expected list");
        };
        assert!(item.is_non_null());
        assert_eq!(interner.get(ty.named().name), "Int");
    }

    #[test]
    fn test_parse_operation_with_fragments() {
        let interner = Interner::new();
        let document = parse_ok(
            indoc! {r#"
                query Hero($episode: Episode = JEDI, $withFriends: Boolean!) {
                  hero(episode: $episode) {
                    name
                    kind: __typename
                    ...HeroDetails @include(if: $withFriends)
                    ... on Droid { primaryFunction }
                    ... @skip(if: false) { id }
                  }
                }
                fragment HeroDetails on Character { id }
            "#},
            &interner,
        );
        let operation = document.operations().next().expect("operation");
        assert_eq!(operation.variables.len(), 2);
        assert_eq!(interner.get(operation.name.expect("name").value), "Hero");

        let Selection::Field(hero) = &operation.selection_set.selections[0] else {
            panic!("expected field");
        };
        let selections = &hero.selection_set.as_ref().expect("selection set").selections;
        assert_eq!(selections.len(), 5);
        let Selection::Field(kind) = &selections[1] else {
            panic!("expected field");
        };
        assert_eq!(kind.name.value, Text::TYPENAME);
        assert_eq!(interner.get(kind.response_key().value), "kind");
        assert!(matches!(selections[2], Selection::FragmentSpread(_)));
        assert!(matches!(
            &selections[4],
            Selection::InlineFragment(InlineFragment { type_condition: None, .. })
        ));
        assert_eq!(document.fragments().count(), 1);
    }

    #[test]
    fn test_parse_anonymous_query() {
        let interner = Interner::new();
        let document = parse_ok("{ hero { name } }", &interner);
        let operation = document.operations().next().expect("operation");
        assert!(operation.name.is_none());
        assert_eq!(operation.operation, OperationType::Query);
    }

    #[test]
    fn test_operation_span_covers_text() {
        let interner = Interner::new();
        let source = "  query A { a }  ";
        let document = parse_ok(source, &interner);
        let span = document.operations().next().expect("operation").span;
        assert_eq!(&source[span.range()], "query A { a }");
    }

    #[test]
    fn test_parse_values() {
        let interner = Interner::new();
        let document = parse_ok(
            r#"query Q { a(i: -3, f: 1.5, s: "x\ty", b: true, n: null, e: RED, l: [1 2], o: {k: "v"}) }"#,
            &interner,
        );
        let operation = document.operations().next().expect("operation");
        let Selection::Field(field) = &operation.selection_set.selections[0] else {
            panic!("expected field");
        };
        assert_eq!(field.arguments.len(), 8);
        assert!(matches!(field.arguments[0].value, Value::Int(-3, _)));
        match &field.arguments[2].value {
            Value::String(s, _) => assert_eq!(s, "x\ty"),
            other => panic!("expected string, got {other:?}"),
        }
        assert!(matches!(field.arguments[4].value, Value::Null(_)));
        assert!(matches!(field.arguments[5].value, Value::Enum(_)));
        assert!(matches!(&field.arguments[6].value, Value::List(items, _) if items.len() == 2));
    }

    #[test]
    fn test_keywords_as_field_names() {
        let interner = Interner::new();
        let document = parse_ok("query Q { type query: on }", &interner);
        let operation = document.operations().next().expect("operation");
        assert_eq!(operation.selection_set.selections.len(), 2);
    }

    #[test]
    fn test_type_extension() {
        let interner = Interner::new();
        let document = parse_ok("type Query { a: Int } extend type Query { b: Int }", &interner);
        assert!(matches!(document.definitions[1], Definition::TypeExtension(_)));
    }

    #[test]
    fn test_block_string_description() {
        let interner = Interner::new();
        let document = parse_ok(
            "\"\"\"\n    The hero.\n      Indented.\n\"\"\"\ntype Hero { a: Int }",
            &interner,
        );
        let Definition::Type(TypeDefinition::Object(hero)) = &document.definitions[0] else {
            panic!("expected object type");
        };
        assert_eq!(
            hero.description.as_ref().map(|d| d.value.as_str()),
            Some("The hero.\n  Indented.")
        );
    }

    #[test]
    fn test_syntax_error_recovers() {
        let interner = Interner::new();
        let result = parse("query A { a ", FileId::default(), &interner);
        assert!(result.diagnostics.has_errors());
        assert_eq!(result.document.operations().count(), 1);
    }

    #[test]
    fn test_garbage_does_not_loop() {
        let interner = Interner::new();
        let result = parse("query A { ) ) } ; fragment", FileId::default(), &interner);
        assert!(result.diagnostics.has_errors());
    }
}
