//! Canonical text rendering of a parsed file
//!
//! Output uses two-space indentation, one declaration per line and a blank line
//! between top-level sections. What survives is decided by a [`Retain`]
//! implementation; only top-level messages and enums, service methods and
//! imports are subject to it.

use super::ast::*;

/// Decides which declarations are rendered
pub trait Retain {
    fn keep_import(&self, _path: &str) -> bool {
        true
    }

    fn keep_message(&self, _package: &str, _name: &str) -> bool {
        true
    }

    fn keep_enum(&self, _package: &str, _name: &str) -> bool {
        true
    }

    fn keep_method(&self, _package: &str, _service: &str, _method: &str) -> bool {
        true
    }
}

/// Retains everything; printing with it reformats a file
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl Retain for KeepAll {}

pub fn print_file(file: &ProtoFile, retain: &dyn Retain) -> String {
    let mut printer = Printer {
        out: String::new(),
        indent: 0,
    };
    printer.file(file, retain);
    printer.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Syntax,
    Package,
    Import,
    Option,
    Definition,
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{} {{", header));
        self.indent += 1;
    }

    fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    fn file(&mut self, file: &ProtoFile, retain: &dyn Retain) {
        let package = file.package();
        let mut previous: Option<Section> = None;

        if let Some(syntax) = &file.syntax {
            let keyword = match syntax.keyword {
                SyntaxKeyword::Syntax => "syntax",
                SyntaxKeyword::Edition => "edition",
            };
            self.line(&format!("{} = {};", keyword, syntax.value));
            previous = Some(Section::Syntax);
        }

        for item in &file.items {
            let section = match item {
                FileItem::Import(import) if !retain.keep_import(&import.path()) => continue,
                FileItem::Message(m) if !retain.keep_message(package, &m.name) => continue,
                FileItem::Enum(e) if !retain.keep_enum(package, &e.name) => continue,
                FileItem::Import(_) => Section::Import,
                FileItem::Package(_) => Section::Package,
                FileItem::Option(_) => Section::Option,
                _ => Section::Definition,
            };

            let separate = match previous {
                None => false,
                Some(prev) => prev != section || section == Section::Definition,
            };
            if separate {
                self.out.push('\n');
            }
            previous = Some(section);

            match item {
                FileItem::Import(import) => self.import(import),
                FileItem::Package(name) => self.line(&format!("package {};", name)),
                FileItem::Option(option) => self.option_decl(option),
                FileItem::Message(message) => self.message(message),
                FileItem::Enum(e) => self.enum_decl(e),
                FileItem::Extend(extend) => self.extend(extend),
                FileItem::Service(service) => self.service(package, service, retain),
            }
        }
    }

    fn import(&mut self, import: &Import) {
        let modifier = match import.modifier {
            Some(ImportModifier::Weak) => "weak ",
            Some(ImportModifier::Public) => "public ",
            None => "",
        };
        self.line(&format!("import {}{};", modifier, import.path));
    }

    fn option_decl(&mut self, option: &OptionDecl) {
        match &option.value {
            OptionValue::Scalar(scalar) => {
                self.line(&format!("option {} = {};", option.name, scalar));
            }
            OptionValue::Message(literal) => {
                self.line(&format!("option {} = {{", option.name));
                self.indent += 1;
                self.literal_fields(literal);
                self.indent -= 1;
                self.line("};");
            }
        }
    }

    fn literal_fields(&mut self, literal: &MessageLiteral) {
        for field in &literal.fields {
            match &field.value {
                LiteralValue::Message(nested) => {
                    self.open(&field.name.to_string());
                    self.literal_fields(nested);
                    self.close();
                }
                value => {
                    let rendered = inline_value(value);
                    self.line(&format!("{}: {}", field.name, rendered));
                }
            }
        }
    }

    fn message(&mut self, message: &Message) {
        self.open(&format!("message {}", message.name));
        self.message_elements(&message.elements);
        self.close();
    }

    fn message_elements(&mut self, elements: &[MessageElement]) {
        for element in elements {
            match element {
                MessageElement::Field(field) => self.field(field),
                MessageElement::Map(map) => self.line(&format!(
                    "map<{}, {}> {} = {}{};",
                    map.key_type,
                    map.value_type,
                    map.name,
                    map.number,
                    compact_options(&map.options)
                )),
                MessageElement::Group(group) => self.group(group),
                MessageElement::Oneof(oneof) => self.oneof(oneof),
                MessageElement::Option(option) => self.option_decl(option),
                MessageElement::Reserved(reserved) => self.reserved(reserved),
                MessageElement::Extensions(extensions) => self.line(&format!(
                    "extensions {}{};",
                    tag_ranges(&extensions.ranges),
                    compact_options(&extensions.options)
                )),
                MessageElement::Message(nested) => self.message(nested),
                MessageElement::Enum(e) => self.enum_decl(e),
                MessageElement::Extend(extend) => self.extend(extend),
            }
        }
    }

    fn field(&mut self, field: &Field) {
        let label = field
            .cardinality
            .map(|c| format!("{} ", c.as_str()))
            .unwrap_or_default();
        self.line(&format!(
            "{}{} {} = {}{};",
            label,
            field.type_name,
            field.name,
            field.number,
            compact_options(&field.options)
        ));
    }

    fn group(&mut self, group: &Group) {
        let label = group
            .cardinality
            .map(|c| format!("{} ", c.as_str()))
            .unwrap_or_default();
        self.open(&format!(
            "{}group {} = {}{}",
            label,
            group.name,
            group.number,
            compact_options(&group.options)
        ));
        self.message_elements(&group.elements);
        self.close();
    }

    fn oneof(&mut self, oneof: &Oneof) {
        self.open(&format!("oneof {}", oneof.name));
        for element in &oneof.elements {
            match element {
                OneofElement::Option(option) => self.option_decl(option),
                OneofElement::Field(field) => self.field(field),
                OneofElement::Group(group) => self.group(group),
            }
        }
        self.close();
    }

    fn reserved(&mut self, reserved: &Reserved) {
        let body = match reserved {
            Reserved::Ranges(ranges) => tag_ranges(ranges),
            Reserved::Names(names) => names.join(", "),
        };
        self.line(&format!("reserved {};", body));
    }

    fn enum_decl(&mut self, e: &Enum) {
        self.open(&format!("enum {}", e.name));
        for element in &e.elements {
            match element {
                EnumElement::Option(option) => self.option_decl(option),
                EnumElement::Value(value) => self.line(&format!(
                    "{} = {}{};",
                    value.name,
                    value.number,
                    compact_options(&value.options)
                )),
                EnumElement::Reserved(reserved) => self.reserved(reserved),
            }
        }
        self.close();
    }

    fn extend(&mut self, extend: &Extend) {
        self.open(&format!("extend {}", extend.extendee));
        for element in &extend.elements {
            match element {
                ExtendElement::Field(field) => self.field(field),
                ExtendElement::Group(group) => self.group(group),
            }
        }
        self.close();
    }

    fn service(&mut self, package: &str, service: &Service, retain: &dyn Retain) {
        self.open(&format!("service {}", service.name));
        for element in &service.elements {
            match element {
                ServiceElement::Option(option) => self.option_decl(option),
                ServiceElement::Method(method) => {
                    if retain.keep_method(package, &service.name, &method.name) {
                        self.method(method);
                    }
                }
            }
        }
        self.close();
    }

    fn method(&mut self, method: &Method) {
        let signature = format!(
            "rpc {}({}) returns ({})",
            method.name,
            message_type(&method.input),
            message_type(&method.output)
        );
        if !method.has_body {
            self.line(&format!("{};", signature));
        } else if method.options.is_empty() {
            self.line(&format!("{} {{}}", signature));
        } else {
            self.open(&signature);
            for option in &method.options {
                self.option_decl(option);
            }
            self.close();
        }
    }
}

fn message_type(message_type: &MessageType) -> String {
    if message_type.stream {
        format!("stream {}", message_type.type_name)
    } else {
        message_type.type_name.clone()
    }
}

fn compact_options(options: &[CompactOption]) -> String {
    if options.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = options
        .iter()
        .map(|option| format!("{} = {}", option.name, inline_option_value(&option.value)))
        .collect();
    format!(" [{}]", rendered.join(", "))
}

fn inline_option_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Scalar(scalar) => scalar.to_string(),
        OptionValue::Message(literal) => inline_literal(literal),
    }
}

fn inline_literal(literal: &MessageLiteral) -> String {
    if literal.fields.is_empty() {
        return "{}".to_string();
    }
    let fields: Vec<String> = literal
        .fields
        .iter()
        .map(|field| match &field.value {
            LiteralValue::Message(nested) => format!("{} {}", field.name, inline_literal(nested)),
            value => format!("{}: {}", field.name, inline_value(value)),
        })
        .collect();
    format!("{{ {} }}", fields.join(" "))
}

fn inline_value(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Scalar(scalar) => scalar.to_string(),
        LiteralValue::Message(literal) => inline_literal(literal),
        LiteralValue::List(items) => {
            let items: Vec<String> = items.iter().map(inline_value).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn tag_ranges(ranges: &[TagRange]) -> String {
    ranges
        .iter()
        .map(|range| match &range.end {
            None => range.start.clone(),
            Some(RangeEnd::Max) => format!("{} to max", range.start),
            Some(RangeEnd::Number(end)) => format!("{} to {}", range.start, end),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
