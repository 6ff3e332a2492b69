//! DEF, USE and node statements.

use std::sync::LazyLock;

use regex::Regex;
use vrml97_core::{NodeClass, NodeSpec, spelling, vrml97};

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::{Parser, Slot};
use crate::scene::{
    DefData, ElementId, ElementKind, MarkerKind, NodeData, NodeOrigin, TokenSpan, UseData,
};
use crate::tokens::TokenKind;

static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(").expect("function pattern is valid")
});

/// The type a node name resolves to.
#[derive(Debug, Clone, Copy)]
enum Target {
    BuiltIn(&'static NodeSpec),
    Proto(ElementId),
}

impl Parser<'_> {
    pub(super) fn parse_def(&mut self, parent: ElementId) -> Option<ElementId> {
        let def = self.start(
            parent,
            ElementKind::Def(DefData {
                name: String::new(),
                used: false,
                used_by_route: false,
            }),
        );
        self.bump();

        if self.at_id() {
            let name = self.text().to_owned();
            self.bump();
            self.register_def(def, &name);
            if let ElementKind::Def(data) = self.scene.kind_mut(def) {
                data.name = name;
            }
        } else {
            self.marker(def, MarkerKind::Unexpected, DiagnosticKind::ExpectedName);
        }

        self.parse_node(def);
        self.finish(def);
        Some(def)
    }

    /// Registers `name` in the current scope. A clash warns on both DEFs and
    /// keeps the earlier one.
    fn register_def(&mut self, def: ElementId, name: &str) {
        let scope = self.current_scope();
        let existing = self
            .scene
            .scopes
            .get(&scope)
            .and_then(|s| s.defs.get(name).copied());
        match existing {
            Some(old) => {
                self.report(old, DiagnosticKind::DuplicateDef).detail(name).emit();
                self.report(def, DiagnosticKind::DuplicateDef).detail(name).emit();
            }
            None => {
                if let Some(s) = self.scene.scopes.get_mut(&scope) {
                    s.defs.insert(name.to_owned(), def);
                }
            }
        }
    }

    pub(super) fn parse_use(&mut self, parent: ElementId) -> Option<ElementId> {
        let use_id = self.start(
            parent,
            ElementKind::Use(UseData {
                name: String::new(),
                target: None,
                loops: false,
            }),
        );
        self.bump();

        if !self.at_id() {
            self.marker(use_id, MarkerKind::Unexpected, DiagnosticKind::ExpectedName);
            self.finish(use_id);
            return Some(use_id);
        }
        let name = self.text().to_owned();
        self.bump();
        self.finish(use_id);

        let target = self.lookup_def(&name);
        let loops = target.is_some_and(|def| self.scene.is_ancestor(def, use_id));
        if let ElementKind::Use(data) = self.scene.kind_mut(use_id) {
            data.name.clone_from(&name);
            data.target = target;
            data.loops = loops;
        }

        let Some(def) = target else {
            self.report(use_id, DiagnosticKind::NoDef).detail(&name).emit();
            return Some(use_id);
        };
        if let ElementKind::Def(data) = self.scene.kind_mut(def) {
            data.used = true;
        }
        if loops && !self.loop_through_event_node(use_id, def) {
            self.report(use_id, DiagnosticKind::UseLoop).emit();
        }
        Some(use_id)
    }

    /// A Script or PROTO instance between a USE and its DEF ancestor makes the
    /// reference an event connection rather than a containment loop.
    fn loop_through_event_node(&self, use_id: ElementId, def: ElementId) -> bool {
        self.scene
            .ancestors(use_id)
            .take_while(|&a| a != def)
            .any(|a| {
                self.scene[a].as_node().is_some_and(|n| {
                    matches!(
                        n.origin,
                        NodeOrigin::Script | NodeOrigin::Proto(_) | NodeOrigin::ExternProto(_)
                    )
                })
            })
    }

    /// A node: type name, `{`, fields, `}`.
    ///
    /// Unknown type names are skipped together with their body.
    pub(super) fn parse_node(&mut self, parent: ElementId) -> Option<ElementId> {
        if !self.at_id() || self.at_word("NULL") {
            self.expected_node(parent);
            return None;
        }

        let start = self.pos();
        let written = self.text().to_owned();
        let target = match self.resolve_node_type(&written) {
            Some(target) => target,
            None => {
                self.bump();
                if self.currently_is(TokenKind::LeftBrace) {
                    self.skip_group();
                }
                let span = TokenSpan::new(start, self.pos());
                log::trace!("parse_node: unknown node {written:?}");
                self.marker_over(
                    parent,
                    MarkerKind::Unexpected,
                    span,
                    DiagnosticKind::UnknownNode,
                    Some(written),
                );
                return None;
            }
        };

        if self.auto_def(parent, start, target) {
            return self.parse_def(parent);
        }

        let (type_name, origin) = match target {
            Target::BuiltIn(spec) if spec.name == "Script" => (spec.name.clone(), NodeOrigin::Script),
            Target::BuiltIn(spec) => (spec.name.clone(), NodeOrigin::BuiltIn),
            Target::Proto(proto) => {
                let data = self.scene[proto].as_proto();
                let name = data.map(|p| p.name.clone()).unwrap_or_default();
                let origin = if data.is_some_and(|p| p.external) {
                    NodeOrigin::ExternProto(proto)
                } else {
                    NodeOrigin::Proto(proto)
                };
                (name, origin)
            }
        };
        let symbol = self.scene.intern(&type_name);
        let node = self.start(
            parent,
            ElementKind::Node(NodeData {
                name: symbol,
                origin,
                has_is: false,
                from_is: false,
                inline_script: false,
                functions: Vec::new(),
            }),
        );
        if written != type_name {
            self.report(node, DiagnosticKind::MisspelledNode)
                .detail(format!("\"{written}\", assuming \"{type_name}\""))
                .emit();
        }
        self.bump();

        if self.enter(node) {
            self.expect(node, TokenKind::LeftBrace);
            self.parse_node_body(node, target_body(target));
            if self.currently_is(TokenKind::RightBrace) {
                self.bump();
            } else {
                self.marker(node, MarkerKind::RightBrace, DiagnosticKind::MissingRightBrace);
            }
            self.exit();
        }
        self.finish(node);

        match origin {
            NodeOrigin::Script => self.scan_script_functions(node),
            NodeOrigin::Proto(proto) => self.scene.instantiate(node, proto),
            _ => {}
        }
        Some(node)
    }

    fn expected_node(&mut self, parent: ElementId) {
        if self.eof() || self.at_closer() {
            self.marker(parent, MarkerKind::Unexpected, DiagnosticKind::ExpectedNode);
            return;
        }
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
        self.marker_over(parent, MarkerKind::Unexpected, span, DiagnosticKind::ExpectedNode, None);
    }

    /// Built-in types first, then PROTOs in scope, then the closest spelling
    /// of either. A built-in wins a tie.
    fn resolve_node_type(&self, name: &str) -> Option<Target> {
        let nurbs = self.scene.config.nurbs();
        if let Some(spec) = vrml97().node(name, nurbs) {
            return Some(Target::BuiltIn(spec));
        }
        if let Some(proto) = self.lookup_proto(name) {
            return Some(Target::Proto(proto));
        }

        let builtin = vrml97()
            .closest_node(name, nurbs)
            .filter(|&(_, score)| spelling::is_accepted(name, score));
        let names = self.proto_names();
        let proto = spelling::best_match(name, names.iter().map(String::as_str))
            .filter(|&(_, score)| spelling::is_accepted(name, score))
            .map(|(good, score)| (good.to_owned(), score));

        match (builtin, proto) {
            (Some((good, b)), Some((_, p))) if b >= p => vrml97().node(good, nurbs).map(Target::BuiltIn),
            (_, Some((good, _))) => self.lookup_proto(&good).map(Target::Proto),
            (Some((good, _)), None) => vrml97().node(good, nurbs).map(Target::BuiltIn),
            (None, None) => None,
        }
    }

    /// Inserts `DEF <name> ` before an undecorated node when a name generator
    /// is configured. Returns whether the parse should restart at the DEF.
    fn auto_def(&mut self, parent: ElementId, start: usize, target: Target) -> bool {
        if !self.scene.config.has_def_names() || matches!(self.scene[parent].kind, ElementKind::Def(_)) {
            return false;
        }
        let type_name = match target {
            Target::BuiltIn(spec) => spec.name.clone(),
            Target::Proto(proto) => self.scene[proto]
                .as_proto()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
        };
        let Some(def_name) = self.scene.config.create_def_name(&type_name) else {
            return false;
        };

        // Elements still under construction that begin at the node must keep
        // covering the inserted DEF.
        let open: Vec<ElementId> = self
            .scene
            .ancestors(parent)
            .filter(|&a| self.scene[a].span.start == start)
            .collect();
        match self.scene.insert_text(start, &format!("DEF {def_name} ")) {
            Ok(delta) => {
                for id in open {
                    self.scene.element_mut(id).span.start = start;
                }
                self.scene.stream.set_state(start);
                log::debug!("auto_def: DEF {def_name} for {type_name}, {delta} tokens");
                true
            }
            Err(err) => {
                self.report(parent, DiagnosticKind::NodeConstruction)
                    .detail(err.to_string())
                    .emit();
                false
            }
        }
    }

    /// Collects function names from a Script's inline `javascript:` or
    /// `vrmlscript:` urls.
    fn scan_script_functions(&mut self, node: ElementId) {
        let Some(url) = self.scene.field_value(node, "url") else {
            return;
        };
        let mut inline = false;
        let mut functions = Vec::new();
        for text in self.scene.strings(url) {
            let lower = text.trim_start().to_ascii_lowercase();
            if !lower.starts_with("javascript:") && !lower.starts_with("vrmlscript:") {
                continue;
            }
            inline = true;
            functions.extend(FUNCTION.captures_iter(&text).map(|c| c[1].to_owned()));
        }
        if let ElementKind::Node(data) = self.scene.kind_mut(node) {
            data.inline_script = inline;
            data.functions = functions;
        }
    }

    /// Flags a statement whose node does not fit where it was written.
    pub(super) fn check_slot(&mut self, statement: ElementId, slot: Slot<'_>) {
        let Some(node) = self.scene.resolve_node(statement) else {
            return;
        };
        let Some(classes) = self.node_classes(node) else {
            return;
        };
        let type_name = self.scene.node_name(node).unwrap_or_default().to_owned();
        match slot {
            Slot::ProtoBody => {}
            Slot::Top => {
                if !classes.contains(&NodeClass::Child) {
                    self.report(statement, DiagnosticKind::NodeNotAllowedAtTop)
                        .detail(type_name)
                        .emit();
                }
            }
            Slot::Field { name, accepts } => {
                let Some(accepts) = accepts else {
                    return;
                };
                if !classes.contains(&accepts) {
                    self.report(statement, DiagnosticKind::NodeNotAllowed)
                        .detail(format!("\"{type_name}\" not allowed in field \"{name}\""))
                        .emit();
                }
            }
        }
    }

    /// Classes a node can stand in for. `None` when anything goes.
    fn node_classes(&self, node: ElementId) -> Option<Vec<NodeClass>> {
        let data = self.scene[node].as_node()?;
        match data.origin {
            NodeOrigin::BuiltIn | NodeOrigin::Script => {
                Some(self.scene.node_spec(node)?.classes.clone())
            }
            NodeOrigin::Proto(proto) => {
                let builtin = self.scene[proto].as_proto()?.builtin_type.as_deref()?;
                Some(vrml97().node(builtin, true)?.classes.clone())
            }
            NodeOrigin::ExternProto(_) => None,
        }
    }
}

fn target_body(target: Target) -> super::fields::Body {
    match target {
        Target::BuiltIn(spec) if spec.name == "Script" => super::fields::Body::Script(spec),
        Target::BuiltIn(spec) => super::fields::Body::BuiltIn(spec),
        Target::Proto(proto) => super::fields::Body::Instance(proto),
    }
}
