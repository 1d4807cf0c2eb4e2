//! Syntax tree for a single `.proto` file
//!
//! Literal values (numbers, strings) keep their source spelling. Type names are
//! kept as written, including a leading `.` for fully qualified references.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoFile {
    pub syntax: Option<Syntax>,
    pub items: Vec<FileItem>,
}

impl ProtoFile {
    /// Package declared by the file, or an empty string
    pub fn package(&self) -> &str {
        self.items
            .iter()
            .find_map(|item| match item {
                FileItem::Package(name) => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or("")
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.items.iter().filter_map(|item| match item {
            FileItem::Import(import) => Some(import),
            _ => None,
        })
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.items.iter().filter_map(|item| match item {
            FileItem::Service(service) => Some(service),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKeyword {
    Syntax,
    Edition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Syntax {
    pub keyword: SyntaxKeyword,
    pub value: StringLit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileItem {
    Import(Import),
    Package(String),
    Option(OptionDecl),
    Message(Message),
    Enum(Enum),
    Extend(Extend),
    Service(Service),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportModifier {
    Weak,
    Public,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub modifier: Option<ImportModifier>,
    pub path: StringLit,
}

impl Import {
    /// Import path with quotes removed
    pub fn path(&self) -> String {
        self.path.value()
    }
}

/// One or more adjacent string literals, each stored with its quotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    pub parts: Vec<String>,
}

impl StringLit {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            parts: vec![raw.into()],
        }
    }

    /// Concatenated contents with quotes stripped and simple escapes resolved
    pub fn value(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            let inner = ['"', '\''].iter().find_map(|&quote| {
                part.strip_prefix(quote)
                    .and_then(|rest| rest.strip_suffix(quote))
            });
            let inner = inner.unwrap_or(part.as_str());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c != '\\' {
                    out.push(c);
                    continue;
                }
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(other) => out.push(other),
                    None => {}
                }
            }
        }
        out
    }
}

impl fmt::Display for StringLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionNamePart {
    Simple(String),
    /// Parenthesized extension name, stored without the parentheses
    Extension(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionName {
    pub parts: Vec<OptionNamePart>,
}

impl OptionName {
    /// Name used to match option filters
    ///
    /// `(my.opt).field` yields `my.opt`; `deprecated` yields `deprecated`.
    pub fn extension_name(&self) -> String {
        match self.parts.first() {
            Some(OptionNamePart::Extension(name)) => name.trim_start_matches('.').to_string(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match part {
                OptionNamePart::Simple(name) => write!(f, "{}", name)?,
                OptionNamePart::Extension(name) => write!(f, "({})", name)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionDecl {
    pub name: OptionName,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Scalar(Scalar),
    Message(MessageLiteral),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(StringLit),
    /// Integer or float, sign included
    Number(String),
    /// Identifier such as `true`, an enum value or `-inf`
    Ident(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "{}", s),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Ident(i) => write!(f, "{}", i),
        }
    }
}

/// Text-format message literal used as an option value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageLiteral {
    pub fields: Vec<LiteralField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralField {
    pub name: LiteralFieldName,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralFieldName {
    Simple(String),
    /// `[pkg.ext]` or `[host/pkg.Type]`, stored without brackets
    Bracketed(String),
}

impl fmt::Display for LiteralFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralFieldName::Simple(name) => write!(f, "{}", name),
            LiteralFieldName::Bracketed(name) => write!(f, "[{}]", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Scalar(Scalar),
    Message(MessageLiteral),
    List(Vec<LiteralValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompactOption {
    pub name: OptionName,
    pub value: OptionValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Optional,
    Required,
    Repeated,
}

impl Cardinality {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "optional" => Some(Cardinality::Optional),
            "required" => Some(Cardinality::Required),
            "repeated" => Some(Cardinality::Repeated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Optional => "optional",
            Cardinality::Required => "required",
            Cardinality::Repeated => "repeated",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub name: String,
    pub elements: Vec<MessageElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageElement {
    Field(Field),
    Map(MapField),
    Group(Group),
    Oneof(Oneof),
    Option(OptionDecl),
    Reserved(Reserved),
    Extensions(Extensions),
    Message(Message),
    Enum(Enum),
    Extend(Extend),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub cardinality: Option<Cardinality>,
    pub type_name: String,
    pub name: String,
    pub number: String,
    pub options: Vec<CompactOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    pub key_type: String,
    pub value_type: String,
    pub name: String,
    pub number: String,
    pub options: Vec<CompactOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub cardinality: Option<Cardinality>,
    pub name: String,
    pub number: String,
    pub options: Vec<CompactOption>,
    pub elements: Vec<MessageElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Oneof {
    pub name: String,
    pub elements: Vec<OneofElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OneofElement {
    Option(OptionDecl),
    Field(Field),
    Group(Group),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeEnd {
    Number(String),
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRange {
    pub start: String,
    pub end: Option<RangeEnd>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reserved {
    Ranges(Vec<TagRange>),
    /// Reserved names as written: quoted strings, or bare identifiers in editions
    Names(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extensions {
    pub ranges: Vec<TagRange>,
    pub options: Vec<CompactOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub elements: Vec<EnumElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumElement {
    Option(OptionDecl),
    Value(EnumValue),
    Reserved(Reserved),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub number: String,
    pub options: Vec<CompactOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extend {
    pub extendee: String,
    pub elements: Vec<ExtendElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtendElement {
    Field(Field),
    Group(Group),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub elements: Vec<ServiceElement>,
}

impl Service {
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.elements.iter().filter_map(|element| match element {
            ServiceElement::Method(method) => Some(method),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceElement {
    Option(OptionDecl),
    Method(Method),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    pub stream: bool,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub input: MessageType,
    pub output: MessageType,
    pub options: Vec<OptionDecl>,
    /// Declared with `{ ... }` rather than `;`
    pub has_body: bool,
}
