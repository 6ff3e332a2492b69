//! PROTO and EXTERNPROTO declarations.

use vrml97_core::limits::MAX_PROTO_NESTING;
use vrml97_core::{FieldType, InterfaceKind, spelling, vrml97};

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::Parser;
use crate::scene::{
    ElementId, ElementKind, InterfaceData, MarkerKind, NodeOrigin, ProtoData, Scope, TokenSpan,
};
use crate::tokens::TokenKind;

impl Parser<'_> {
    /// `PROTO name [ interfaces ] { body }` or
    /// `EXTERNPROTO name [ interfaces ] url`.
    pub(super) fn parse_proto(&mut self, parent: ElementId, external: bool) -> Option<ElementId> {
        let proto = self.start(
            parent,
            ElementKind::Proto(ProtoData {
                name: String::new(),
                external,
                builtin_type: None,
                body: None,
            }),
        );
        self.bump();

        let name = if self.at_id() {
            let name = self.text().to_owned();
            self.bump();
            Some(name)
        } else {
            self.marker(proto, MarkerKind::Unexpected, DiagnosticKind::ExpectedName);
            None
        };
        if let (Some(name), ElementKind::Proto(data)) = (&name, self.scene.kind_mut(proto)) {
            data.name.clone_from(name);
        }

        if self.protos.len() == MAX_PROTO_NESTING {
            self.report(proto, DiagnosticKind::ProtoNesting)
                .detail(format!("PROTO nesting deeper than {MAX_PROTO_NESTING}"))
                .emit();
        }

        if self.enter(proto) {
            self.parse_interfaces(proto, external);
            if external {
                self.parse_extern_url(proto);
            } else {
                self.parse_proto_body(proto);
            }
            self.exit();
        }
        self.finish(proto);

        // Registered only now, so the body cannot instantiate its own PROTO.
        if let Some(name) = name {
            self.register_proto(proto, name);
        }
        Some(proto)
    }

    fn register_proto(&mut self, proto: ElementId, name: String) {
        let scope = self.current_scope();
        let taken = self
            .scene
            .scopes
            .get(&scope)
            .is_some_and(|registry| registry.protos.contains_key(&name));
        if taken {
            self.report(proto, DiagnosticKind::DuplicateProto).detail(name).emit();
            return;
        }
        log::trace!("register_proto: {name}");
        if let Some(registry) = self.scene.scopes.get_mut(&scope) {
            registry.protos.insert(name, proto);
        }
    }

    fn parse_interfaces(&mut self, proto: ElementId, external: bool) {
        if !self.expect(proto, TokenKind::LeftBracket) {
            return;
        }
        while !self.eof() && !self.at_closer() {
            let before = self.pos();
            if self.at_interface_kind() {
                let interface = self.parse_interface(proto, !external);
                if let Some(interface) = interface {
                    self.check_duplicate_interface(proto, interface);
                }
            } else {
                self.expected_interface_kind(proto);
            }
            if self.pos() == before {
                self.unexpected(proto);
            }
        }
        self.expect(proto, TokenKind::RightBracket);
    }

    pub(super) fn at_interface_kind(&self) -> bool {
        self.at_id() && InterfaceKind::from_name(self.text()).is_some()
    }

    fn expected_interface_kind(&mut self, proto: ElementId) {
        let start = self.bump();
        let span = TokenSpan::single(start);
        let word = self.text_at(start).to_owned();
        let detail = spelling::suggest(&word, ["eventIn", "eventOut", "field", "exposedField"])
            .map(|kind| format!("\"{word}\", did you mean \"{kind}\""));
        self.marker_over(
            proto,
            MarkerKind::Unexpected,
            span,
            DiagnosticKind::ExpectedInterfaceKind,
            detail,
        );
    }

    /// `kind type name [value]`, shared by PROTO, EXTERNPROTO and Script.
    ///
    /// With `with_value`, fields and exposedFields take a default value.
    pub(super) fn parse_interface(&mut self, parent: ElementId, with_value: bool) -> Option<ElementId> {
        let start = self.pos();
        let kind = InterfaceKind::from_name(self.text())?;
        self.bump();

        let written = self.text().to_owned();
        let (data_type, corrected) = match FieldType::from_name(&written) {
            Some(data_type) => (data_type, false),
            None => {
                let good = vrml97()
                    .closest_type(&written)
                    .filter(|&(_, score)| self.at_id() && spelling::is_accepted(&written, score))
                    .and_then(|(good, _)| FieldType::from_name(good));
                match good {
                    Some(data_type) => (data_type, true),
                    None => {
                        let detail = format!("\"{written}\"");
                        self.skip_interface(parent, start, DiagnosticKind::UnknownType, Some(detail));
                        return None;
                    }
                }
            }
        };
        self.bump();

        if !self.at_id() {
            self.skip_interface(parent, start, DiagnosticKind::ExpectedName, None);
            return None;
        }
        let name = self.text().to_owned();
        let interface = self.scene.push(
            parent,
            ElementKind::Interface(InterfaceData {
                kind,
                data_type,
                name: name.clone(),
                used: false,
            }),
            TokenSpan::empty(start),
        );
        if corrected {
            self.report(interface, DiagnosticKind::UnknownType)
                .detail(format!("\"{written}\", assuming \"{data_type}\""))
                .emit();
        }
        self.bump();

        if self.at_word("IS") {
            self.parse_is(interface, kind, data_type);
        } else if with_value && kind.takes_value() {
            self.parse_value(interface, data_type, None, &name);
        }
        self.finish(interface);
        Some(interface)
    }

    /// Skips a declaration whose type or name is unusable.
    fn skip_interface(
        &mut self,
        parent: ElementId,
        start: usize,
        kind: DiagnosticKind,
        detail: Option<String>,
    ) {
        if self.at_id() && !self.at_interface_kind() {
            self.bump();
        }
        if self.at_id() && !self.at_interface_kind() {
            self.bump();
        }
        self.skip_value();
        let span = TokenSpan::new(start, self.pos());
        self.marker_over(parent, MarkerKind::Unexpected, span, kind, detail);
    }

    pub(super) fn check_duplicate_interface(&mut self, parent: ElementId, interface: ElementId) {
        let Some(name) = self.scene[interface].as_interface().map(|i| i.name.clone()) else {
            return;
        };
        let duplicate = self.scene[parent].children.iter().any(|&child| {
            child != interface && self.scene[child].as_interface().is_some_and(|i| i.name == name)
        });
        if duplicate {
            self.report(interface, DiagnosticKind::DuplicateInterface).detail(name).emit();
        }
    }

    /// `{ statements }` in a scope of its own.
    fn parse_proto_body(&mut self, proto: ElementId) {
        self.expect(proto, TokenKind::LeftBrace);
        let body = self.start(proto, ElementKind::Scene);
        self.scene.scopes.insert(body, Scope::default());
        if let ElementKind::Proto(data) = self.scene.kind_mut(proto) {
            data.body = Some(body);
        }

        self.scopes.push(body);
        self.protos.push(proto);
        self.parse_body_statements(body);
        self.protos.pop();
        self.scopes.pop();
        self.finish(body);

        if self.currently_is(TokenKind::RightBrace) {
            self.bump();
        } else {
            self.marker(proto, MarkerKind::RightBrace, DiagnosticKind::MissingRightBrace);
        }

        let has_node = self.scene[body].children.iter().any(|&child| {
            matches!(
                self.scene[child].kind,
                ElementKind::Node(_) | ElementKind::Def(_) | ElementKind::Use(_)
            )
        });
        if !has_node {
            self.report(proto, DiagnosticKind::ProtoMissingNode).emit();
            return;
        }
        let builtin = self.first_builtin_type(body);
        if let ElementKind::Proto(data) = self.scene.kind_mut(proto) {
            data.builtin_type = builtin;
        }
    }

    /// Built-in type the first node of a body stands for, following nested
    /// PROTO instances.
    fn first_builtin_type(&self, body: ElementId) -> Option<String> {
        let first = self.scene[body].children.iter().copied().find(|&child| {
            matches!(
                self.scene[child].kind,
                ElementKind::Node(_) | ElementKind::Def(_) | ElementKind::Use(_)
            )
        })?;
        let node = self.scene.resolve_node(first)?;
        match self.scene[node].as_node()?.origin {
            NodeOrigin::BuiltIn | NodeOrigin::Script => self.scene.node_name(node).map(str::to_owned),
            NodeOrigin::Proto(inner) => self.scene[inner].as_proto()?.builtin_type.clone(),
            NodeOrigin::ExternProto(_) => None,
        }
    }

    /// The url list of an EXTERNPROTO.
    fn parse_extern_url(&mut self, proto: ElementId) {
        if self.at_string() || self.currently_is(TokenKind::LeftBracket) {
            self.parse_value(proto, FieldType::MfString, None, "url");
        } else {
            let span = TokenSpan::empty(self.pos());
            self.marker_over(
                proto,
                MarkerKind::Short,
                span,
                DiagnosticKind::ExpectedValue,
                Some("EXTERNPROTO url".to_owned()),
            );
        }
    }
}
