//! Recursive descent parser for proto2, proto3 and editions files
//!
//! Keywords are contextual: `message`, `option`, `map` and friends only act as
//! keywords where the following tokens make that reading unambiguous, so they
//! remain usable as field and type names.

use super::ast::*;
use super::lexer::{tokenize, LexError, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{line}:{column}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
}

type PResult<T> = Result<T, ParseError>;

/// Parses a complete `.proto` source
pub fn parse(source: &str) -> PResult<ProtoFile> {
    let tokens = tokenize(source)?;
    Parser { tokens, pos: 0 }.file()
}

enum FieldOrGroup {
    Field(Field),
    Group(Group),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn peek(&self) -> &TokenKind {
        self.peek_nth(0)
    }

    fn at_eof(&self) -> bool {
        *self.peek() == TokenKind::Eof
    }

    fn nth_is_symbol(&self, n: usize, c: char) -> bool {
        *self.peek_nth(n) == TokenKind::Symbol(c)
    }

    fn nth_is_ident(&self, n: usize) -> bool {
        matches!(self.peek_nth(n), TokenKind::Ident(_))
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(word) if word == keyword)
    }

    fn eat_symbol(&mut self, c: char) -> bool {
        if self.nth_is_symbol(0, c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected<T>(&self, expected: impl Into<String>) -> PResult<T> {
        let token = self.current();
        Err(ParseError::Unexpected {
            expected: expected.into(),
            found: token.kind.to_string(),
            line: token.line,
            column: token.column,
        })
    }

    fn expect_symbol(&mut self, c: char) -> PResult<()> {
        if self.eat_symbol(c) {
            Ok(())
        } else {
            self.unexpected(format!("'{}'", c))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        if self.is_keyword(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            self.unexpected(format!("'{}'", keyword))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<String> {
        if let TokenKind::Ident(word) = self.peek().clone() {
            self.pos += 1;
            Ok(word)
        } else {
            self.unexpected(what)
        }
    }

    fn expect_int(&mut self) -> PResult<String> {
        if let TokenKind::Int(text) = self.peek().clone() {
            self.pos += 1;
            Ok(text)
        } else {
            self.unexpected("integer")
        }
    }

    fn signed_int(&mut self) -> PResult<String> {
        if self.eat_symbol('-') {
            Ok(format!("-{}", self.expect_int()?))
        } else {
            self.expect_int()
        }
    }

    /// `.`? ident (`.` ident)*
    fn type_name(&mut self) -> PResult<String> {
        let mut name = String::new();
        if self.eat_symbol('.') {
            name.push('.');
        }
        name.push_str(&self.expect_ident("type name")?);
        while self.nth_is_symbol(0, '.') && self.nth_is_ident(1) {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.expect_ident("type name")?);
        }
        Ok(name)
    }

    fn string_lit(&mut self) -> PResult<StringLit> {
        let mut parts = Vec::new();
        while let TokenKind::Str(raw) = self.peek().clone() {
            self.pos += 1;
            parts.push(raw);
        }
        if parts.is_empty() {
            return self.unexpected("string literal");
        }
        Ok(StringLit { parts })
    }

    fn file(mut self) -> PResult<ProtoFile> {
        let mut file = ProtoFile::default();

        if (self.is_keyword("syntax") || self.is_keyword("edition")) && self.nth_is_symbol(1, '=')
        {
            let keyword = if self.is_keyword("syntax") {
                SyntaxKeyword::Syntax
            } else {
                SyntaxKeyword::Edition
            };
            self.pos += 2;
            let value = self.string_lit()?;
            self.expect_symbol(';')?;
            file.syntax = Some(Syntax { keyword, value });
        }

        while !self.at_eof() {
            if self.eat_symbol(';') {
                continue;
            }
            let word = match self.peek() {
                TokenKind::Ident(word) => word.clone(),
                _ => return self.unexpected("top-level declaration"),
            };
            let item = match word.as_str() {
                "import" => FileItem::Import(self.import()?),
                "package" => {
                    self.pos += 1;
                    let name = self.type_name()?;
                    self.expect_symbol(';')?;
                    FileItem::Package(name)
                }
                "option" => FileItem::Option(self.option_decl()?),
                "message" => FileItem::Message(self.message()?),
                "enum" => FileItem::Enum(self.enum_decl()?),
                "extend" => FileItem::Extend(self.extend()?),
                "service" => FileItem::Service(self.service()?),
                _ => return self.unexpected("top-level declaration"),
            };
            file.items.push(item);
        }

        Ok(file)
    }

    fn import(&mut self) -> PResult<Import> {
        self.expect_keyword("import")?;
        let modifier = match self.peek() {
            TokenKind::Ident(word) if word == "weak" => Some(ImportModifier::Weak),
            TokenKind::Ident(word) if word == "public" => Some(ImportModifier::Public),
            _ => None,
        };
        if modifier.is_some() {
            self.pos += 1;
        }
        let path = self.string_lit()?;
        self.expect_symbol(';')?;
        Ok(Import { modifier, path })
    }

    fn option_decl(&mut self) -> PResult<OptionDecl> {
        self.expect_keyword("option")?;
        let name = self.option_name()?;
        self.expect_symbol('=')?;
        let value = self.option_value()?;
        self.expect_symbol(';')?;
        Ok(OptionDecl { name, value })
    }

    fn option_name(&mut self) -> PResult<OptionName> {
        let mut parts = Vec::new();
        loop {
            if self.eat_symbol('(') {
                let name = self.type_name()?;
                self.expect_symbol(')')?;
                parts.push(OptionNamePart::Extension(name));
            } else {
                parts.push(OptionNamePart::Simple(self.expect_ident("option name")?));
            }
            if !self.eat_symbol('.') {
                return Ok(OptionName { parts });
            }
        }
    }

    fn option_value(&mut self) -> PResult<OptionValue> {
        if self.eat_symbol('{') {
            Ok(OptionValue::Message(self.message_literal('}')?))
        } else {
            Ok(OptionValue::Scalar(self.scalar()?))
        }
    }

    fn compact_options(&mut self) -> PResult<Vec<CompactOption>> {
        let mut options = Vec::new();
        if !self.eat_symbol('[') {
            return Ok(options);
        }
        loop {
            let name = self.option_name()?;
            self.expect_symbol('=')?;
            let value = self.option_value()?;
            options.push(CompactOption { name, value });
            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(']')?;
        Ok(options)
    }

    fn scalar(&mut self) -> PResult<Scalar> {
        match self.peek().clone() {
            TokenKind::Str(_) => Ok(Scalar::String(self.string_lit()?)),
            TokenKind::Int(text) | TokenKind::Float(text) => {
                self.pos += 1;
                Ok(Scalar::Number(text))
            }
            TokenKind::Ident(word) => {
                self.pos += 1;
                Ok(Scalar::Ident(word))
            }
            TokenKind::Symbol(sign @ ('-' | '+')) => {
                self.pos += 1;
                match self.peek().clone() {
                    TokenKind::Int(text) | TokenKind::Float(text) => {
                        self.pos += 1;
                        Ok(Scalar::Number(format!("{}{}", sign, text)))
                    }
                    TokenKind::Ident(word) => {
                        self.pos += 1;
                        Ok(Scalar::Ident(format!("{}{}", sign, word)))
                    }
                    _ => self.unexpected("number"),
                }
            }
            _ => self.unexpected("option value"),
        }
    }

    /// Text-format body up to and including `close`
    fn message_literal(&mut self, close: char) -> PResult<MessageLiteral> {
        let mut fields = Vec::new();
        while !self.eat_symbol(close) {
            if self.at_eof() {
                return self.unexpected(format!("'{}'", close));
            }
            let name = if self.eat_symbol('[') {
                let mut name = self.type_name()?;
                if self.eat_symbol('/') {
                    name.push('/');
                    name.push_str(&self.type_name()?);
                }
                self.expect_symbol(']')?;
                LiteralFieldName::Bracketed(name)
            } else {
                LiteralFieldName::Simple(self.expect_ident("field name")?)
            };
            self.eat_symbol(':');
            let value = self.literal_value()?;
            fields.push(LiteralField { name, value });
            if !self.eat_symbol(',') {
                self.eat_symbol(';');
            }
        }
        Ok(MessageLiteral { fields })
    }

    fn literal_value(&mut self) -> PResult<LiteralValue> {
        if self.eat_symbol('{') {
            return Ok(LiteralValue::Message(self.message_literal('}')?));
        }
        if self.eat_symbol('<') {
            return Ok(LiteralValue::Message(self.message_literal('>')?));
        }
        if self.eat_symbol('[') {
            let mut items = Vec::new();
            while !self.eat_symbol(']') {
                if self.at_eof() {
                    return self.unexpected("']'");
                }
                items.push(self.literal_value()?);
                self.eat_symbol(',');
            }
            return Ok(LiteralValue::List(items));
        }
        Ok(LiteralValue::Scalar(self.scalar()?))
    }

    fn message(&mut self) -> PResult<Message> {
        self.expect_keyword("message")?;
        let name = self.expect_ident("message name")?;
        self.expect_symbol('{')?;
        let elements = self.message_body()?;
        Ok(Message { name, elements })
    }

    fn message_body(&mut self) -> PResult<Vec<MessageElement>> {
        let mut elements = Vec::new();
        loop {
            if self.eat_symbol('}') {
                return Ok(elements);
            }
            if self.eat_symbol(';') {
                continue;
            }
            if self.at_eof() {
                return self.unexpected("'}'");
            }
            elements.push(self.message_element()?);
        }
    }

    fn message_element(&mut self) -> PResult<MessageElement> {
        let word = match self.peek() {
            TokenKind::Ident(word) => word.clone(),
            _ => return self.unexpected("message element"),
        };
        let declares_block = self.nth_is_ident(1) && self.nth_is_symbol(2, '{');

        let element = match word.as_str() {
            "message" if declares_block => MessageElement::Message(self.message()?),
            "enum" if declares_block => MessageElement::Enum(self.enum_decl()?),
            "oneof" if declares_block => MessageElement::Oneof(self.oneof()?),
            "extend" if !self.nth_is_symbol(2, '=') => MessageElement::Extend(self.extend()?),
            "option" => MessageElement::Option(self.option_decl()?),
            "map" if self.nth_is_symbol(1, '<') => MessageElement::Map(self.map_field()?),
            "reserved" if self.starts_reserved() => MessageElement::Reserved(self.reserved()?),
            "extensions" if matches!(self.peek_nth(1), TokenKind::Int(_)) => {
                MessageElement::Extensions(self.extensions()?)
            }
            _ => match self.field_or_group()? {
                FieldOrGroup::Field(field) => MessageElement::Field(field),
                FieldOrGroup::Group(group) => MessageElement::Group(group),
            },
        };
        Ok(element)
    }

    fn starts_reserved(&self) -> bool {
        match self.peek_nth(1) {
            TokenKind::Int(_) | TokenKind::Str(_) => true,
            TokenKind::Symbol('-') => true,
            TokenKind::Ident(_) => self.nth_is_symbol(2, ',') || self.nth_is_symbol(2, ';'),
            _ => false,
        }
    }

    fn field_or_group(&mut self) -> PResult<FieldOrGroup> {
        let cardinality = match self.peek() {
            TokenKind::Ident(word) if !self.nth_is_symbol(2, '=') => Cardinality::from_keyword(word),
            _ => None,
        };
        if cardinality.is_some() {
            self.pos += 1;
        }

        if self.is_keyword("group") && self.nth_is_ident(1) && self.nth_is_symbol(2, '=') {
            self.pos += 1;
            let name = self.expect_ident("group name")?;
            self.expect_symbol('=')?;
            let number = self.expect_int()?;
            let options = self.compact_options()?;
            if self.eat_symbol('{') {
                let elements = self.message_body()?;
                return Ok(FieldOrGroup::Group(Group {
                    cardinality,
                    name,
                    number,
                    options,
                    elements,
                }));
            }
            self.expect_symbol(';')?;
            return Ok(FieldOrGroup::Field(Field {
                cardinality,
                type_name: "group".to_string(),
                name,
                number,
                options,
            }));
        }

        let type_name = self.type_name()?;
        let name = self.expect_ident("field name")?;
        self.expect_symbol('=')?;
        let number = self.expect_int()?;
        let options = self.compact_options()?;
        self.expect_symbol(';')?;
        Ok(FieldOrGroup::Field(Field {
            cardinality,
            type_name,
            name,
            number,
            options,
        }))
    }

    fn map_field(&mut self) -> PResult<MapField> {
        self.expect_keyword("map")?;
        self.expect_symbol('<')?;
        let key_type = self.type_name()?;
        self.expect_symbol(',')?;
        let value_type = self.type_name()?;
        self.expect_symbol('>')?;
        let name = self.expect_ident("field name")?;
        self.expect_symbol('=')?;
        let number = self.expect_int()?;
        let options = self.compact_options()?;
        self.expect_symbol(';')?;
        Ok(MapField {
            key_type,
            value_type,
            name,
            number,
            options,
        })
    }

    fn oneof(&mut self) -> PResult<Oneof> {
        self.expect_keyword("oneof")?;
        let name = self.expect_ident("oneof name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            if self.eat_symbol('}') {
                return Ok(Oneof { name, elements });
            }
            if self.eat_symbol(';') {
                continue;
            }
            if self.at_eof() {
                return self.unexpected("'}'");
            }
            let element = if self.is_keyword("option") {
                OneofElement::Option(self.option_decl()?)
            } else {
                match self.field_or_group()? {
                    FieldOrGroup::Field(field) => OneofElement::Field(field),
                    FieldOrGroup::Group(group) => OneofElement::Group(group),
                }
            };
            elements.push(element);
        }
    }

    fn tag_ranges(&mut self) -> PResult<Vec<TagRange>> {
        let mut ranges = Vec::new();
        loop {
            let start = self.signed_int()?;
            let end = if self.is_keyword("to") {
                self.pos += 1;
                if self.is_keyword("max") {
                    self.pos += 1;
                    Some(RangeEnd::Max)
                } else {
                    Some(RangeEnd::Number(self.signed_int()?))
                }
            } else {
                None
            };
            ranges.push(TagRange { start, end });
            if !self.eat_symbol(',') {
                return Ok(ranges);
            }
        }
    }

    fn reserved(&mut self) -> PResult<Reserved> {
        self.expect_keyword("reserved")?;
        let by_name = matches!(self.peek(), TokenKind::Str(_) | TokenKind::Ident(_));
        let reserved = if by_name {
            let mut names = Vec::new();
            loop {
                if matches!(self.peek(), TokenKind::Str(_)) {
                    names.push(self.string_lit()?.to_string());
                } else {
                    names.push(self.expect_ident("reserved name")?);
                }
                if !self.eat_symbol(',') {
                    break;
                }
            }
            Reserved::Names(names)
        } else {
            Reserved::Ranges(self.tag_ranges()?)
        };
        self.expect_symbol(';')?;
        Ok(reserved)
    }

    fn extensions(&mut self) -> PResult<Extensions> {
        self.expect_keyword("extensions")?;
        let ranges = self.tag_ranges()?;
        let options = self.compact_options()?;
        self.expect_symbol(';')?;
        Ok(Extensions { ranges, options })
    }

    fn enum_decl(&mut self) -> PResult<Enum> {
        self.expect_keyword("enum")?;
        let name = self.expect_ident("enum name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            if self.eat_symbol('}') {
                return Ok(Enum { name, elements });
            }
            if self.eat_symbol(';') {
                continue;
            }
            if self.at_eof() {
                return self.unexpected("'}'");
            }
            let is_value = self.nth_is_symbol(1, '=');
            let element = if self.is_keyword("option") && !is_value {
                EnumElement::Option(self.option_decl()?)
            } else if self.is_keyword("reserved") && !is_value {
                EnumElement::Reserved(self.reserved()?)
            } else {
                let name = self.expect_ident("enum value name")?;
                self.expect_symbol('=')?;
                let number = self.signed_int()?;
                let options = self.compact_options()?;
                self.expect_symbol(';')?;
                EnumElement::Value(EnumValue {
                    name,
                    number,
                    options,
                })
            };
            elements.push(element);
        }
    }

    fn extend(&mut self) -> PResult<Extend> {
        self.expect_keyword("extend")?;
        let extendee = self.type_name()?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            if self.eat_symbol('}') {
                return Ok(Extend { extendee, elements });
            }
            if self.eat_symbol(';') {
                continue;
            }
            if self.at_eof() {
                return self.unexpected("'}'");
            }
            elements.push(match self.field_or_group()? {
                FieldOrGroup::Field(field) => ExtendElement::Field(field),
                FieldOrGroup::Group(group) => ExtendElement::Group(group),
            });
        }
    }

    fn service(&mut self) -> PResult<Service> {
        self.expect_keyword("service")?;
        let name = self.expect_ident("service name")?;
        self.expect_symbol('{')?;
        let mut elements = Vec::new();
        loop {
            if self.eat_symbol('}') {
                return Ok(Service { name, elements });
            }
            if self.eat_symbol(';') {
                continue;
            }
            let element = if self.is_keyword("option") {
                ServiceElement::Option(self.option_decl()?)
            } else if self.is_keyword("rpc") {
                ServiceElement::Method(self.method()?)
            } else {
                return self.unexpected("'rpc', 'option' or '}'");
            };
            elements.push(element);
        }
    }

    fn method(&mut self) -> PResult<Method> {
        self.expect_keyword("rpc")?;
        let name = self.expect_ident("method name")?;
        let input = self.message_type()?;
        self.expect_keyword("returns")?;
        let output = self.message_type()?;

        let mut options = Vec::new();
        let has_body = self.eat_symbol('{');
        if has_body {
            loop {
                if self.eat_symbol('}') {
                    break;
                }
                if self.eat_symbol(';') {
                    continue;
                }
                if self.is_keyword("option") {
                    options.push(self.option_decl()?);
                } else {
                    return self.unexpected("'option' or '}'");
                }
            }
            self.eat_symbol(';');
        } else {
            self.expect_symbol(';')?;
        }

        Ok(Method {
            name,
            input,
            output,
            options,
            has_body,
        })
    }

    fn message_type(&mut self) -> PResult<MessageType> {
        self.expect_symbol('(')?;
        let stream = self.is_keyword("stream") && !self.nth_is_symbol(1, ')');
        if stream {
            self.pos += 1;
        }
        let type_name = self.type_name()?;
        self.expect_symbol(')')?;
        Ok(MessageType { stream, type_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_message(file: &ProtoFile) -> &Message {
        match &file.items[..] {
            [FileItem::Message(message)] => message,
            other => panic!("expected one message, got {:?}", other),
        }
    }

    #[test]
    fn test_header_declarations() {
        let file = parse(
            r#"
            syntax = "proto3";
            package acme.billing.v1;
            import public "acme/common.proto";
            import "google/protobuf/timestamp.proto";
            option java_package = "com.acme.billing";
            option (acme.file_level) = true;
            "#,
        )
        .unwrap();

        let syntax = file.syntax.as_ref().unwrap();
        assert_eq!(syntax.keyword, SyntaxKeyword::Syntax);
        assert_eq!(syntax.value.value(), "proto3");
        assert_eq!(file.package(), "acme.billing.v1");

        let imports: Vec<_> = file.imports().collect();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].modifier, Some(ImportModifier::Public));
        assert_eq!(imports[0].path(), "acme/common.proto");
        assert_eq!(imports[1].modifier, None);

        match &file.items[4] {
            FileItem::Option(option) => {
                assert_eq!(option.name.to_string(), "(acme.file_level)");
                assert_eq!(
                    option.value,
                    OptionValue::Scalar(Scalar::Ident("true".into()))
                );
            }
            other => panic!("expected option, got {:?}", other),
        }
    }

    #[test]
    fn test_edition_declaration() {
        let file = parse("edition = \"2023\";").unwrap();
        let syntax = file.syntax.unwrap();
        assert_eq!(syntax.keyword, SyntaxKeyword::Edition);
        assert_eq!(syntax.value.value(), "2023");
    }

    #[test]
    fn test_message_elements() {
        let file = parse(
            r#"
            message Invoice {
              option deprecated = true;
              string id = 1;
              repeated .acme.common.Money lines = 2 [packed = false, (acme.sensitive) = true];
              map<string, Customer> customers = 3;
              oneof payer {
                Customer person = 4;
                Company company = 5;
              }
              reserved 6, 8 to 10, 100 to max;
              reserved "legacy", "old_total";
              extensions 1000 to 1999;
              message Line { int64 cents = 1; }
              enum State { STATE_UNSPECIFIED = 0; }
              ;
            }
            "#,
        )
        .unwrap();

        let message = only_message(&file);
        assert_eq!(message.name, "Invoice");
        assert_eq!(message.elements.len(), 10);

        match &message.elements[2] {
            MessageElement::Field(field) => {
                assert_eq!(field.cardinality, Some(Cardinality::Repeated));
                assert_eq!(field.type_name, ".acme.common.Money");
                assert_eq!(field.options.len(), 2);
                assert_eq!(field.options[1].name.extension_name(), "acme.sensitive");
            }
            other => panic!("expected field, got {:?}", other),
        }
        match &message.elements[3] {
            MessageElement::Map(map) => {
                assert_eq!(map.key_type, "string");
                assert_eq!(map.value_type, "Customer");
            }
            other => panic!("expected map, got {:?}", other),
        }
        match &message.elements[4] {
            MessageElement::Oneof(oneof) => assert_eq!(oneof.elements.len(), 2),
            other => panic!("expected oneof, got {:?}", other),
        }
        match &message.elements[5] {
            MessageElement::Reserved(Reserved::Ranges(ranges)) => {
                assert_eq!(ranges.len(), 3);
                assert_eq!(ranges[2].end, Some(RangeEnd::Max));
            }
            other => panic!("expected reserved ranges, got {:?}", other),
        }
        match &message.elements[6] {
            MessageElement::Reserved(Reserved::Names(names)) => {
                assert_eq!(names, &vec!["\"legacy\"".to_string(), "\"old_total\"".to_string()]);
            }
            other => panic!("expected reserved names, got {:?}", other),
        }
        assert!(matches!(message.elements[7], MessageElement::Extensions(_)));
        assert!(matches!(message.elements[8], MessageElement::Message(_)));
        assert!(matches!(message.elements[9], MessageElement::Enum(_)));
    }

    #[test]
    fn test_keywords_as_field_names() {
        let file = parse(
            r#"
            message Weird {
              string message = 1;
              int32 option = 2;
              bool map = 3;
              optional int32 reserved = 4;
              string syntax = 5;
            }
            "#,
        )
        .unwrap();
        let message = only_message(&file);
        let names: Vec<_> = message
            .elements
            .iter()
            .map(|e| match e {
                MessageElement::Field(f) => f.name.as_str(),
                other => panic!("expected field, got {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["message", "option", "map", "reserved", "syntax"]);
    }

    #[test]
    fn test_proto2_groups() {
        let file = parse(
            r#"
            syntax = "proto2";
            message Search {
              repeated group Result = 1 {
                required string url = 2;
              }
            }
            "#,
        )
        .unwrap();
        match &only_message(&file).elements[0] {
            MessageElement::Group(group) => {
                assert_eq!(group.cardinality, Some(Cardinality::Repeated));
                assert_eq!(group.name, "Result");
                assert_eq!(group.elements.len(), 1);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_with_negative_values_and_options() {
        let file = parse(
            r#"
            enum Level {
              option allow_alias = true;
              LEVEL_UNSPECIFIED = 0;
              LEVEL_LOW = -1 [deprecated = true];
              reserved -5 to -3, 9;
              reserved "LEVEL_OLD";
            }
            "#,
        )
        .unwrap();
        match &file.items[0] {
            FileItem::Enum(e) => {
                assert_eq!(e.elements.len(), 5);
                match &e.elements[2] {
                    EnumElement::Value(v) => {
                        assert_eq!(v.number, "-1");
                        assert_eq!(v.options.len(), 1);
                    }
                    other => panic!("expected value, got {:?}", other),
                }
            }
            other => panic!("expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_service_methods() {
        let file = parse(
            r#"
            service Billing {
              option (acme.service_owner) = "payments";
              rpc Get(GetRequest) returns (Invoice);
              rpc Watch(stream WatchRequest) returns (stream .acme.Event) {
                option (acme.api.public) = true;
                option (google.api.http) = {
                  post: "/v1/watch"
                  body: "*"
                  additional_bindings { get: "/v1/watch/{id}" }
                };
              };
              rpc Empty(stream) returns (Ack) {}
            }
            "#,
        )
        .unwrap();

        let service = file.services().next().unwrap();
        let methods: Vec<_> = service.methods().collect();
        assert_eq!(methods.len(), 3);

        assert!(!methods[0].has_body);
        assert!(!methods[0].input.stream);

        assert!(methods[1].input.stream);
        assert!(methods[1].output.stream);
        assert_eq!(methods[1].output.type_name, ".acme.Event");
        assert_eq!(methods[1].options.len(), 2);
        match &methods[1].options[1].value {
            OptionValue::Message(literal) => {
                assert_eq!(literal.fields.len(), 3);
                assert!(matches!(
                    literal.fields[2].value,
                    LiteralValue::Message(_)
                ));
            }
            other => panic!("expected message literal, got {:?}", other),
        }

        // `stream` alone is a type name
        assert!(!methods[2].input.stream);
        assert_eq!(methods[2].input.type_name, "stream");
        assert!(methods[2].has_body);
    }

    #[test]
    fn test_text_format_literals() {
        let file = parse(
            r#"
            option (acme.defaults) = {
              [acme.ext.flag]: true,
              [type.googleapis.com/acme.Any] < value: -inf >;
              names: ["a", "b"]
              nested: [{ x: 1 }, { x: -2.5 }]
              ratio: +0.5
            };
            "#,
        )
        .unwrap();
        match &file.items[0] {
            FileItem::Option(OptionDecl {
                value: OptionValue::Message(literal),
                ..
            }) => {
                assert_eq!(literal.fields.len(), 5);
                assert_eq!(
                    literal.fields[0].name,
                    LiteralFieldName::Bracketed("acme.ext.flag".into())
                );
                assert_eq!(
                    literal.fields[1].name,
                    LiteralFieldName::Bracketed("type.googleapis.com/acme.Any".into())
                );
                match &literal.fields[3].value {
                    LiteralValue::List(items) => assert_eq!(items.len(), 2),
                    other => panic!("expected list, got {:?}", other),
                }
                assert_eq!(
                    literal.fields[4].value,
                    LiteralValue::Scalar(Scalar::Number("+0.5".into()))
                );
            }
            other => panic!("expected message option, got {:?}", other),
        }
    }

    #[test]
    fn test_extend_block() {
        let file = parse(
            r#"
            extend google.protobuf.MethodOptions {
              optional Visibility visibility = 50001;
            }
            "#,
        )
        .unwrap();
        match &file.items[0] {
            FileItem::Extend(extend) => {
                assert_eq!(extend.extendee, "google.protobuf.MethodOptions");
                assert_eq!(extend.elements.len(), 1);
            }
            other => panic!("expected extend, got {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_strings() {
        let file = parse("option go_package = \"a\" \"b\";").unwrap();
        match &file.items[0] {
            FileItem::Option(OptionDecl {
                value: OptionValue::Scalar(Scalar::String(s)),
                ..
            }) => assert_eq!(s.value(), "ab"),
            other => panic!("expected string option, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_token_reports_position() {
        let err = parse("message A {\n  string name = ;\n}").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                expected: "integer".into(),
                found: "';'".into(),
                line: 2,
                column: 17,
            }
        );
    }

    #[test]
    fn test_unterminated_message() {
        let err = parse("message A { string name = 1;").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { ref found, .. } if found == "end of file"));
    }

    #[test]
    fn test_lex_errors_propagate() {
        let err = parse("message A { # }").unwrap_err();
        assert!(matches!(err, ParseError::Lex(LexError::UnexpectedChar { ch: '#', .. })));
    }

    #[test]
    fn test_unknown_top_level() {
        let err = parse("struct A {}").unwrap_err();
        assert!(err.to_string().contains("top-level declaration"));
    }
}
