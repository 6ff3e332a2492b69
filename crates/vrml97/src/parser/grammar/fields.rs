//! Node bodies: fields, IS connections and nested statements.

use std::collections::HashSet;

use vrml97_core::{FieldDescriptor, FieldType, InterfaceKind, NodeSpec, spelling, vrml97};

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::Parser;
use crate::scene::{ElementId, ElementKind, FieldData, IsData, MarkerKind, NodeOrigin, TokenSpan};
use crate::tokens::TokenKind;
use crate::values::is_default_value;

/// How the fields of a node body are looked up.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Body {
    BuiltIn(&'static NodeSpec),
    /// Built-in fields plus interface declarations.
    Script(&'static NodeSpec),
    /// Fields declared by a PROTO or EXTERNPROTO.
    Instance(ElementId),
}

/// A field name resolved against a node type.
struct Resolved {
    name: String,
    kind: InterfaceKind,
    data_type: FieldType,
    descriptor: Option<&'static FieldDescriptor>,
}

impl Parser<'_> {
    /// Fields and statements up to the node's closing `}`, an enclosing `]`
    /// or the end of input.
    pub(super) fn parse_node_body(&mut self, node: ElementId, body: Body) {
        let mut seen: HashSet<String> = HashSet::new();
        while !self.eof() && !self.at_closer() {
            let before = self.pos();
            let field = if self.at_word("ROUTE") {
                self.parse_route(node);
                None
            } else if self.at_word("PROTO") || self.at_word("EXTERNPROTO") {
                let external = self.at_word("EXTERNPROTO");
                self.parse_proto(node, external);
                None
            } else {
                match body {
                    Body::Script(spec) => self.parse_script_item(node, spec),
                    _ => self.parse_field(node, body),
                }
            };

            if let Some(field) = field {
                self.check_repeated(field, &mut seen);
            }
            if self.pos() == before {
                self.unexpected(node);
            }
        }

        if let Body::Script(_) = body {
            self.check_script_declarations(node);
        }
    }

    /// One field or Script declaration of an already built node.
    pub(crate) fn parse_field_of(&mut self, node: ElementId) -> Option<ElementId> {
        let body = match self.scene[node].as_node()?.origin {
            NodeOrigin::BuiltIn => Body::BuiltIn(self.scene.node_spec(node)?),
            NodeOrigin::Script => Body::Script(self.scene.node_spec(node)?),
            NodeOrigin::Proto(proto) | NodeOrigin::ExternProto(proto) => Body::Instance(proto),
        };
        match body {
            Body::Script(spec) => self.parse_script_item(node, spec),
            _ => self.parse_field(node, body),
        }
    }

    fn check_repeated(&mut self, field: ElementId, seen: &mut HashSet<String>) {
        let name = match &self.scene[field].kind {
            ElementKind::Field(data) => data.name.clone(),
            ElementKind::Interface(data) => data.name.clone(),
            _ => return,
        };
        if !seen.insert(name.clone()) {
            self.report(field, DiagnosticKind::RepeatedField).detail(name).emit();
        }
    }

    /// One `name value` or `name IS interface` pair.
    pub(super) fn parse_field(&mut self, node: ElementId, body: Body) -> Option<ElementId> {
        if !self.at_id() {
            self.expected_field_name(node);
            return None;
        }
        let start = self.pos();
        let written = self.text().to_owned();
        if written == "DEF" || written == "USE" {
            self.misplaced_statement(node, &written);
            return None;
        }

        let (resolved, corrected) = match self.resolve_field(body, &written) {
            Some(resolved) => (resolved, false),
            None => match self.correct_field(body, &written) {
                Some(resolved) => (resolved, true),
                None => {
                    self.unknown_field(node, start, &written);
                    return None;
                }
            },
        };

        let field = self.start(
            node,
            ElementKind::Field(FieldData {
                name: resolved.name.clone(),
                kind: resolved.kind,
                data_type: resolved.data_type,
            }),
        );
        if corrected {
            self.report(field, DiagnosticKind::MisspelledField)
                .detail(format!("\"{written}\", assuming \"{}\"", resolved.name))
                .emit();
        }
        self.bump();

        if self.at_word("IS") {
            self.parse_is(field, resolved.kind, resolved.data_type);
        } else if resolved.kind.takes_value() {
            let value = self.parse_value(field, resolved.data_type, resolved.descriptor, &resolved.name);
            if let Some(descriptor) = resolved.descriptor {
                self.check_default(field, value, descriptor);
            }
        } else {
            self.report(field, DiagnosticKind::EventWithValue)
                .detail(resolved.name.as_str())
                .emit();
            self.skip_value();
        }
        self.finish(field);
        Some(field)
    }

    fn resolve_field(&self, body: Body, name: &str) -> Option<Resolved> {
        match body {
            Body::BuiltIn(spec) | Body::Script(spec) => {
                let resolved = spec.resolve(name)?;
                Some(Resolved {
                    name: name.to_owned(),
                    kind: resolved.kind,
                    data_type: resolved.descriptor.data_type,
                    descriptor: Some(resolved.descriptor),
                })
            }
            Body::Instance(proto) => {
                let (_, kind, data_type) = self.proto_field(proto, name)?;
                Some(Resolved {
                    name: name.to_owned(),
                    kind,
                    data_type,
                    descriptor: None,
                })
            }
        }
    }

    fn correct_field(&self, body: Body, name: &str) -> Option<Resolved> {
        let good = match body {
            Body::BuiltIn(spec) | Body::Script(spec) => spec
                .closest_field(name)
                .filter(|&(_, score)| spelling::is_accepted(name, score))?
                .0
                .to_owned(),
            Body::Instance(proto) => {
                let names = self.interface_names(proto);
                spelling::suggest(name, names.iter().map(String::as_str))?.to_owned()
            }
        };
        self.resolve_field(body, &good)
    }

    /// Interface declared by `proto` under `name`, including the implicit
    /// `set_`/`_changed` events of exposed fields.
    pub(super) fn proto_field(
        &self,
        proto: ElementId,
        name: &str,
    ) -> Option<(ElementId, InterfaceKind, FieldType)> {
        let declared = |wanted: &str| {
            self.scene[proto].children.iter().copied().find_map(|child| {
                let data = self.scene[child].as_interface()?;
                (data.name == wanted).then_some((child, data.kind, data.data_type))
            })
        };
        if let Some(found) = declared(name) {
            return Some(found);
        }
        let (base, kind) = vrml97_core::table::split_event_name(name)?;
        let (id, declared_kind, data_type) = declared(base)?;
        (declared_kind == InterfaceKind::ExposedField).then_some((id, kind, data_type))
    }

    pub(super) fn interface_names(&self, proto: ElementId) -> Vec<String> {
        self.scene[proto]
            .children
            .iter()
            .filter_map(|&child| self.scene[child].as_interface())
            .map(|data| data.name.clone())
            .collect()
    }

    fn expected_field_name(&mut self, node: ElementId) {
        let start = self.pos();
        if matches!(
            self.current(),
            Some(TokenKind::LeftBrace | TokenKind::LeftBracket)
        ) {
            self.skip_group();
        } else {
            self.bump();
        }
        let span = TokenSpan::new(start, self.pos());
        self.marker_over(node, MarkerKind::Unexpected, span, DiagnosticKind::ExpectedFieldName, None);
    }

    /// A name that is no field. A node type written where a field belongs
    /// is parsed as a node; anything else is skipped with its value.
    fn unknown_field(&mut self, node: ElementId, start: usize, name: &str) {
        let is_node = vrml97().is_built_in_node(name, self.scene.config.nurbs())
            || self.lookup_proto(name).is_some();
        if is_node && self.nth(1) == Some(TokenKind::LeftBrace) {
            if let Some(misplaced) = self.parse_node(node) {
                self.report(misplaced, DiagnosticKind::MisplacedNode).detail(name).emit();
            }
            return;
        }
        self.bump();
        self.skip_value();
        let span = TokenSpan::new(start, self.pos());
        self.marker_over(
            node,
            MarkerKind::Unexpected,
            span,
            DiagnosticKind::UnknownField,
            Some(name.to_owned()),
        );
    }

    /// A `DEF` or `USE` statement where a field belongs, kept as a child of
    /// `node`.
    fn misplaced_statement(&mut self, node: ElementId, keyword: &str) {
        let statement = if keyword == "DEF" {
            self.parse_def(node)
        } else {
            self.parse_use(node)
        };
        let Some(statement) = statement else {
            return;
        };
        let name = self
            .scene
            .resolve_node(statement)
            .and_then(|held| self.scene.node_name(held))
            .unwrap_or(keyword)
            .to_owned();
        self.report(statement, DiagnosticKind::MisplacedNode).detail(name).emit();
    }

    /// Skips whatever looks like a field value at the current position.
    pub(super) fn skip_value(&mut self) {
        match self.current() {
            Some(TokenKind::LeftBracket | TokenKind::LeftBrace) => self.skip_group(),
            Some(TokenKind::Number) => {
                while self.at_number() {
                    self.bump();
                }
            }
            Some(TokenKind::QuotedString | TokenKind::UnterminatedString) => {
                self.bump();
                while self.currently_is(TokenKind::ContinuationString) {
                    self.bump();
                }
            }
            Some(TokenKind::Id) => {
                if self.at_word("TRUE") || self.at_word("FALSE") || self.at_word("NULL") {
                    self.bump();
                } else if self.at_word("IS") {
                    self.bump();
                    if self.at_id() {
                        self.bump();
                    }
                } else if self.nth(1) == Some(TokenKind::LeftBrace) {
                    self.bump();
                    self.skip_group();
                }
            }
            _ => {}
        }
    }

    /// `IS name`: connects `field` to an interface of the enclosing PROTO.
    pub(super) fn parse_is(&mut self, field: ElementId, kind: InterfaceKind, data_type: FieldType) {
        let is = self.start(
            field,
            ElementKind::Is(IsData {
                name: String::new(),
                interface: None,
            }),
        );
        self.bump();
        if !self.at_id() {
            self.marker(is, MarkerKind::Unexpected, DiagnosticKind::ExpectedName);
            self.finish(is);
            return;
        }
        let name = self.text().to_owned();
        self.bump();
        self.finish(is);
        if let ElementKind::Is(data) = self.scene.kind_mut(is) {
            data.name.clone_from(&name);
        }

        let Some(&proto) = self.protos.last() else {
            self.report(is, DiagnosticKind::IsOutsideProto).emit();
            return;
        };
        self.mark_has_is(field);

        let Some((interface, interface_kind, interface_type)) = self.declared_interface(proto, &name) else {
            let names = self.interface_names(proto);
            let detail = match spelling::suggest(&name, names.iter().map(String::as_str)) {
                Some(good) => format!("\"{name}\", did you mean \"{good}\""),
                None => format!("\"{name}\""),
            };
            self.report(is, DiagnosticKind::UnknownInterface).detail(detail).emit();
            return;
        };

        if let ElementKind::Is(data) = self.scene.kind_mut(is) {
            data.interface = Some(interface);
        }
        if let ElementKind::Interface(data) = self.scene.kind_mut(interface) {
            data.used = true;
        }

        if !kind.connects_to(interface_kind) {
            self.report(is, DiagnosticKind::IsKindMismatch)
                .detail(format!("{kind} to {interface_kind} \"{name}\""))
                .emit();
        } else if data_type != interface_type {
            self.report(is, DiagnosticKind::IsTypeMismatch)
                .detail(format!("{data_type} to {interface_type} \"{name}\""))
                .emit();
        }
    }

    /// Interface declared under exactly `name`; IS does not take implicit
    /// event names.
    fn declared_interface(
        &self,
        proto: ElementId,
        name: &str,
    ) -> Option<(ElementId, InterfaceKind, FieldType)> {
        self.scene[proto].children.iter().copied().find_map(|child| {
            let data = self.scene[child].as_interface()?;
            (data.name == name).then_some((child, data.kind, data.data_type))
        })
    }

    /// Flags every node between `field` and the PROTO body as IS-connected.
    fn mark_has_is(&mut self, field: ElementId) {
        let chain: Vec<ElementId> = self
            .scene
            .ancestors(field)
            .take_while(|&a| !matches!(self.scene[a].kind, ElementKind::Scene))
            .collect();
        for id in chain {
            if let ElementKind::Node(node) = self.scene.kind_mut(id) {
                node.has_is = true;
            }
        }
    }

    fn check_default(&mut self, field: ElementId, value: ElementId, descriptor: &FieldDescriptor) {
        if !self.scene.config.default_value_warnings() || descriptor.data_type.is_node() {
            return;
        }
        let Some(default) = descriptor.default_text.as_deref() else {
            return;
        };
        let span = self.scene[value].span;
        if span.is_empty() || self.scene[value].as_value().is_some_and(|v| !v.is_valid()) {
            return;
        }
        let stream = &self.scene.stream;
        let tokens = span
            .range()
            .filter_map(|pos| Some((stream.peek_kind(pos)?, stream.text(pos))));
        if is_default_value(default, tokens) {
            self.report(field, DiagnosticKind::DefaultValue)
                .detail(descriptor.name.as_str())
                .emit();
        }
    }
}
