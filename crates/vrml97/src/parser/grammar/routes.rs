//! ROUTE statements.

use vrml97_core::{FieldType, InterfaceKind, spelling};

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::Parser;
use crate::scene::{ElementId, ElementKind, EndpointData, MarkerKind, NodeOrigin, RouteKey, TokenSpan};
use crate::tokens::TokenKind;

impl Parser<'_> {
    /// `ROUTE node.field TO node.field`
    pub(super) fn parse_route(&mut self, parent: ElementId) -> Option<ElementId> {
        let route = self.start(parent, ElementKind::Route);
        self.bump();

        let from = self.parse_endpoint(route);
        if self.at_word("TO") {
            self.bump();
        } else {
            self.marker(route, MarkerKind::Unexpected, DiagnosticKind::ExpectedTo);
        }
        let to = self.parse_endpoint(route);
        self.finish(route);

        if let (Some(from), Some(to)) = (from, to) {
            self.check_route(route, from, to);
        }
        Some(route)
    }

    /// `node.field`. Returns the endpoint only when both names resolved.
    fn parse_endpoint(&mut self, route: ElementId) -> Option<ElementId> {
        let well_formed = self.at_id()
            && !self.at_word("TO")
            && self.nth(1) == Some(TokenKind::Period)
            && self.nth(2) == Some(TokenKind::Id);
        if !well_formed {
            let start = self.pos();
            // Whatever part of `node.field` is there.
            for _ in 0..3 {
                if self.at_word("TO") || !matches!(self.current(), Some(TokenKind::Id | TokenKind::Period)) {
                    break;
                }
                self.bump();
            }
            let span = TokenSpan::new(start, self.pos());
            self.marker_over(route, MarkerKind::Unexpected, span, DiagnosticKind::ExpectedEndpoint, None);
            return None;
        }

        let start = self.pos();
        let node_name = self.text().to_owned();
        let field = self.text_at(start + 2).to_owned();
        self.bump();
        self.bump();
        self.bump();
        let endpoint = self.scene.push(
            route,
            ElementKind::Endpoint(EndpointData {
                node_name: node_name.clone(),
                field: field.clone(),
                def: None,
                kind: None,
                data_type: None,
            }),
            TokenSpan::new(start, self.pos()),
        );

        let Some(def) = self.lookup_def(&node_name) else {
            self.report(endpoint, DiagnosticKind::NoDef).detail(node_name).emit();
            return None;
        };
        if let ElementKind::Def(data) = self.scene.kind_mut(def) {
            data.used = true;
            data.used_by_route = true;
        }
        if let ElementKind::Endpoint(data) = self.scene.kind_mut(endpoint) {
            data.def = Some(def);
        }

        let node = self.scene.resolve_node(def)?;
        let Some((kind, data_type)) = self.endpoint_field(node, &field) else {
            let names = self.event_names(node);
            let detail = match spelling::suggest(&field, names.iter().map(String::as_str)) {
                Some(good) => format!("\"{field}\", did you mean \"{good}\""),
                None => format!("\"{field}\""),
            };
            self.report(endpoint, DiagnosticKind::RouteUnknownField).detail(detail).emit();
            return None;
        };
        if let ElementKind::Endpoint(data) = self.scene.kind_mut(endpoint) {
            data.kind = Some(kind);
            data.data_type = Some(data_type);
        }
        Some(endpoint)
    }

    /// Kind and type of `field` on `node`: built-in fields, Script
    /// declarations, or the interface of the node's PROTO.
    fn endpoint_field(&self, node: ElementId, field: &str) -> Option<(InterfaceKind, FieldType)> {
        match self.scene[node].as_node()?.origin {
            NodeOrigin::BuiltIn => {
                let resolved = self.scene.node_spec(node)?.resolve(field)?;
                Some((resolved.kind, resolved.descriptor.data_type))
            }
            NodeOrigin::Script => {
                if let Some(resolved) = self.scene.node_spec(node).and_then(|spec| spec.resolve(field)) {
                    return Some((resolved.kind, resolved.descriptor.data_type));
                }
                self.scene[node].children.iter().find_map(|&child| {
                    let data = self.scene[child].as_interface()?;
                    (data.name == field).then_some((data.kind, data.data_type))
                })
            }
            NodeOrigin::Proto(proto) | NodeOrigin::ExternProto(proto) => {
                let (_, kind, data_type) = self.proto_field(proto, field)?;
                Some((kind, data_type))
            }
        }
    }

    fn event_names(&self, node: ElementId) -> Vec<String> {
        let Some(data) = self.scene[node].as_node() else {
            return Vec::new();
        };
        match data.origin {
            NodeOrigin::BuiltIn => self
                .scene
                .node_spec(node)
                .map(|spec| spec.fields.keys().cloned().collect())
                .unwrap_or_default(),
            NodeOrigin::Script => self.interface_names(node),
            NodeOrigin::Proto(proto) | NodeOrigin::ExternProto(proto) => self.interface_names(proto),
        }
    }

    fn check_route(&mut self, route: ElementId, from: ElementId, to: ElementId) {
        let (Some(source), Some(destination)) = (
            self.scene[from].as_endpoint().cloned(),
            self.scene[to].as_endpoint().cloned(),
        ) else {
            return;
        };
        let (Some(from_kind), Some(from_type), Some(to_kind), Some(to_type)) = (
            source.kind,
            source.data_type,
            destination.kind,
            destination.data_type,
        ) else {
            return;
        };

        if !from_kind.is_source() {
            self.report(from, DiagnosticKind::RouteBadSource).emit();
        }
        if !to_kind.is_destination() {
            self.report(to, DiagnosticKind::RouteBadDestination).emit();
        }
        if from_type != to_type {
            self.report(route, DiagnosticKind::RouteTypeMismatch)
                .detail(format!("{from_type} to {to_type}"))
                .emit();
        }

        let key = RouteKey {
            scope: self.current_scope(),
            from_node: source.node_name,
            from_field: source.field,
            to_node: destination.node_name,
            to_field: destination.field.clone(),
        };
        if !self.scene.routes.insert(key) {
            self.report(route, DiagnosticKind::RepeatedRoute).emit();
        }

        self.check_script_function(destination.def, to_kind, &destination.field);
    }

    /// An eventIn of a Script with inline code needs a function of the same
    /// name.
    fn check_script_function(&mut self, def: Option<ElementId>, kind: InterfaceKind, field: &str) {
        if kind != InterfaceKind::EventIn {
            return;
        }
        let Some(script) = def.and_then(|def| self.scene.resolve_node(def)) else {
            return;
        };
        let missing = self.scene[script].as_node().is_some_and(|node| {
            node.origin == NodeOrigin::Script
                && node.inline_script
                && !node.functions.iter().any(|f| f == field)
        });
        // Built-in Script events are handled by the browser.
        let declared = self.scene[script]
            .children
            .iter()
            .any(|&child| self.scene[child].as_interface().is_some_and(|i| i.name == field));
        if missing && declared {
            self.report(script, DiagnosticKind::MissingFunction).detail(field).emit();
        }
    }
}
