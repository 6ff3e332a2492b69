//! Programmatic tree edits.
//!
//! Every edit validates before touching anything, so a rejected edit leaves
//! the scene as it was. An accepted edit splices the token stream, shifts
//! the offsets of every element behind the splice, parses the new text in
//! place and reruns verification.

use std::collections::HashSet;

use vrml97_core::{FieldType, InterfaceKind, NodeClass};

use super::{ElementId, ElementKind, NodeOrigin, RouteKey, Scene};
use crate::config::ParseConfig;
use crate::parser::Parser;
use crate::tokens::{TokenKind, lex};
use crate::values::FieldValue;
use crate::{EditError, Result};

/// Declared shape of a field on a node type.
struct FieldSignature {
    data_type: FieldType,
    kind: InterfaceKind,
    accepts: Option<NodeClass>,
}

impl Scene {
    /// Removes a node statement, field or ROUTE together with its text.
    ///
    /// A DEF that is still referenced from outside the removed subtree blocks
    /// the removal.
    pub fn remove_element(&mut self, id: ElementId) -> Result<()> {
        self.check_editable(id)?;
        let target = match &self[id].kind {
            ElementKind::Node(_) => match self[id].parent {
                Some(parent) if matches!(self[parent].kind, ElementKind::Def(_)) => parent,
                _ => id,
            },
            ElementKind::Def(_) | ElementKind::Use(_) | ElementKind::Field(_) | ElementKind::Route => id,
            _ => return Err(EditError::NotRemovable(id).into()),
        };

        let subtree = self.subtree(target);
        let defs: HashSet<ElementId> = subtree
            .iter()
            .copied()
            .filter(|&e| matches!(self[e].kind, ElementKind::Def(_)))
            .collect();
        if let Some(name) = self.outside_reference(&defs, &subtree) {
            return Err(EditError::StillReferenced { name }.into());
        }

        // An SFNode keeps a NULL in place of the removed node.
        let holder = self[target].parent.filter(|&p| matches!(self[p].kind, ElementKind::Value(_)));
        let single_node = holder.is_some_and(|v| matches!(self[v].kind, ElementKind::Value(FieldValue::Node(_))));
        let replacement = if single_node { "NULL" } else { "" };

        let span = self[target].span;
        let delta = self.replace_text(span.start, span.end, replacement)?;
        self.stretch_ancestors(target, span.end, delta);
        self.detach(target);

        if let Some(value) = holder {
            match self.kind_mut(value) {
                ElementKind::Value(FieldValue::Multi(multi)) => {
                    multi.count = multi.count.saturating_sub(1);
                }
                ElementKind::Value(FieldValue::Node(count)) => *count = 0,
                _ => {}
            }
        }
        for scope in self.scopes.values_mut() {
            scope.defs.retain(|_, def| !defs.contains(def));
        }
        self.rebuild_routes();
        log::debug!("edit: removed {target:?}, {} tokens", -delta);
        crate::verify::run(self);
        Ok(())
    }

    /// Adds a node statement to the SFNode/MFNode field `field` of `parent`,
    /// or to the file root when `parent` is the root.
    ///
    /// Returns the new statement element.
    pub fn add_node(&mut self, parent: ElementId, field: &str, text: &str) -> Result<ElementId> {
        self.check_editable(parent)?;
        check_statement_text(text)?;

        if parent == self.root {
            let pos = self.stream.len();
            self.insert_text(pos, &format!("\n{text}\n"))?;
            let statement = Parser::at(self, pos).parse_top_statement();
            return self.finish_edit(statement, parent);
        }

        let node = self.editable_node(parent)?;
        let signature = self.field_signature(node, field)?;
        if !signature.data_type.is_node() {
            return Err(EditError::NotANodeField { field: field.to_owned() }.into());
        }

        let Some(value) = self.field_value(node, field) else {
            // The field is not written yet: append `field text` to the body.
            let pos = self.closing_brace(node)?;
            self.insert_text(pos, &format!("{field} {text} "))?;
            let written = Parser::at(self, pos).parse_field_of(node);
            let statement = written
                .and_then(|f| self.value_of(f))
                .and_then(|v| self.resolve_statement(v));
            return self.finish_edit(statement, node);
        };

        let statement = match self[value].kind {
            ElementKind::Value(FieldValue::Node(count)) => {
                if count > 0 {
                    return Err(EditError::FieldOccupied { field: field.to_owned() }.into());
                }
                // Replace the NULL (or nothing) the field holds.
                let span = self[value].span;
                let delta = self.replace_text(span.start, span.end, text)?;
                self.stretch_ancestors(value, span.end, delta);
                let statement = Parser::at(self, span.start).parse_node_into(value, field, signature.accepts);
                if let ElementKind::Value(FieldValue::Node(count)) = self.kind_mut(value) {
                    *count = usize::from(statement.is_some());
                }
                statement
            }
            _ => {
                let pos = self.open_list(value)?;
                self.insert_text(pos, &format!(" {text} "))?;
                let statement = Parser::at(self, pos).parse_node_into(value, field, signature.accepts);
                if let (Some(_), ElementKind::Value(FieldValue::Multi(multi))) =
                    (statement, self.kind_mut(value))
                {
                    multi.count += 1;
                }
                statement
            }
        };
        self.finish_edit(statement, node)
    }

    /// Sets a non-node field of `node` to `value`, replacing what is written
    /// or appending the field to the body. Returns the new Field element.
    pub fn set_field(&mut self, node: ElementId, field: &str, value: &str) -> Result<ElementId> {
        self.check_editable(node)?;
        let node = self.editable_node(node)?;
        let signature = self.field_signature(node, field)?;
        if signature.data_type.is_node() {
            return Err(EditError::NodeField { field: field.to_owned() }.into());
        }
        if !signature.kind.takes_value() {
            return Err(EditError::InvalidText {
                reason: format!("`{field}` is an event and takes no value"),
            }
            .into());
        }
        self.check_value_text(signature.data_type, value)?;

        // Script declarations are rewritten whole, other fields as `name value`.
        let existing = self.field(node, field).or_else(|| {
            self[node]
                .children
                .iter()
                .copied()
                .find(|&c| self[c].as_interface().is_some_and(|i| i.name == field))
        });
        let text = match existing.and_then(|e| self[e].as_interface()) {
            Some(interface) => format!(
                "{} {} {field} {value}",
                interface.kind, interface.data_type
            ),
            None => format!("{field} {value}"),
        };

        let Some(existing) = existing else {
            let pos = self.closing_brace(node)?;
            self.insert_text(pos, &format!("{text} "))?;
            let written = Parser::at(self, pos).parse_field_of(node);
            return self.finish_edit(written, node);
        };
        let span = self[existing].span;
        let index = self[node].children.iter().position(|&c| c == existing);
        self.replace_text(span.start, span.end, &text)?;
        self.detach(existing);
        let written = Parser::at(self, span.start).parse_field_of(node);
        if let (Some(written), Some(index)) = (written, index) {
            self.move_child(node, written, index);
        }
        self.finish_edit(written, node)
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn check_editable(&self, id: ElementId) -> Result<()> {
        let element = self.get(id).ok_or(EditError::NoSuchElement(id))?;
        if self.ancestors(id).last() != Some(self.root) {
            return Err(EditError::NoSuchElement(id).into());
        }
        if element.generated {
            return Err(EditError::Generated(id).into());
        }
        if self.ancestors(id).any(|a| matches!(self[a].kind, ElementKind::Proto(_))) {
            return Err(EditError::InsidePrototype(id).into());
        }
        Ok(())
    }

    /// The Node for `id` (itself or a DEF's node), with a closing `}`.
    fn editable_node(&self, id: ElementId) -> Result<ElementId> {
        let node = match &self[id].kind {
            ElementKind::Node(_) => Some(id),
            ElementKind::Def(_) => self.resolve_node(id),
            _ => None,
        };
        node.filter(|&n| !self[n].generated)
            .ok_or_else(|| EditError::NotANode(id).into())
    }

    fn field_signature(&self, node: ElementId, field: &str) -> Result<FieldSignature> {
        let unknown = || EditError::UnknownField {
            node: self.node_name(node).unwrap_or_default().to_owned(),
            field: field.to_owned(),
        };
        let data = self[node].as_node().ok_or(EditError::NotANode(node))?;
        match data.origin {
            NodeOrigin::BuiltIn | NodeOrigin::Script => {
                if let Some(descriptor) = self.node_spec(node).and_then(|spec| spec.field(field)) {
                    return Ok(FieldSignature {
                        data_type: descriptor.data_type,
                        kind: descriptor.kind,
                        accepts: descriptor.accepts,
                    });
                }
                // Script fields declared in the body.
                self.declared_field(node, field).ok_or_else(|| unknown().into())
            }
            NodeOrigin::Proto(proto) | NodeOrigin::ExternProto(proto) => {
                self.declared_field(proto, field).ok_or_else(|| unknown().into())
            }
        }
    }

    fn declared_field(&self, declarer: ElementId, field: &str) -> Option<FieldSignature> {
        let interface = self[declarer]
            .children
            .iter()
            .find_map(|&c| self[c].as_interface().filter(|i| i.name == field))?;
        Some(FieldSignature {
            data_type: interface.data_type,
            kind: interface.kind,
            accepts: None,
        })
    }

    /// Parses `text` as a `data_type` value on its own and rejects it when
    /// that produces an error.
    fn check_value_text(&self, data_type: FieldType, text: &str) -> Result<()> {
        let source = format!(
            "{}\nPROTO Scratch [ field {data_type} value {text} ] {{ WorldInfo {{}} }}\n",
            crate::tokens::HEADER
        );
        let config = ParseConfig::new().with_nurbs(self.config.nurbs());
        let scratch = Scene::parse(&source, config);
        match scratch.diagnostics().errors().next() {
            Some(error) => Err(EditError::InvalidText {
                reason: error.message.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Tree surgery
    // ------------------------------------------------------------------

    fn subtree(&self, id: ElementId) -> HashSet<ElementId> {
        let mut out = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if out.insert(current) {
                stack.extend(self[current].children.iter().copied());
            }
        }
        out
    }

    /// Name of a DEF in `defs` used by a USE or ROUTE outside `subtree`.
    fn outside_reference(&self, defs: &HashSet<ElementId>, subtree: &HashSet<ElementId>) -> Option<String> {
        if defs.is_empty() {
            return None;
        }
        let root_tree = self.subtree(self.root);
        root_tree
            .iter()
            .copied()
            .filter(|id| !subtree.contains(id) && !self[*id].generated)
            .find_map(|id| {
                let def = match &self[id].kind {
                    ElementKind::Use(data) => data.target,
                    ElementKind::Endpoint(data) => data.def,
                    _ => None,
                }?;
                defs.contains(&def)
                    .then(|| self[def].as_def().map(|d| d.name.clone()))
                    .flatten()
            })
    }

    /// Token position of the `}` closing `node`.
    fn closing_brace(&self, node: ElementId) -> Result<usize> {
        let span = self[node].span;
        span.end
            .checked_sub(1)
            .filter(|&pos| pos > span.start && self.stream.is_right_brace(pos))
            .ok_or_else(|| EditError::NotANode(node).into())
    }

    /// Insert position for a new MF item: before `]`, after wrapping an
    /// unbracketed item into `[ item ]` when needed.
    fn open_list(&mut self, value: ElementId) -> Result<usize> {
        let span = self[value].span;
        let bracketed = span.len() >= 2
            && self.stream.is_left_bracket(span.start)
            && self.stream.is_right_bracket(span.end - 1);
        if bracketed {
            return Ok(span.end - 1);
        }
        self.insert_text(span.start, "[ ")?;
        self.element_mut(value).span.start = span.start;
        let end = self[value].span.end;
        let delta = self.insert_text(end, " ]")?;
        self.stretch_ancestors(value, end, delta);
        Ok(end)
    }

    /// Moves the end of every element from `id` up whose span ends at
    /// `boundary`, so text spliced there counts as theirs.
    fn stretch_ancestors(&mut self, id: ElementId, boundary: usize, delta: isize) {
        let chain: Vec<ElementId> = self.ancestors(id).collect();
        for a in chain {
            let span = &mut self.element_mut(a).span;
            if span.end == boundary {
                span.end = span.end.saturating_add_signed(delta).max(span.start);
            }
        }
    }

    fn move_child(&mut self, parent: ElementId, child: ElementId, index: usize) {
        let children = &mut self.element_mut(parent).children;
        if let Some(current) = children.iter().position(|&c| c == child) {
            children.remove(current);
            children.insert(index.min(children.len()), child);
        }
    }

    /// First node statement held by a value.
    fn resolve_statement(&self, value: ElementId) -> Option<ElementId> {
        self[value].children.iter().copied().find(|&c| {
            matches!(
                self[c].kind,
                ElementKind::Node(_) | ElementKind::Def(_) | ElementKind::Use(_)
            )
        })
    }

    /// Recomputes the ROUTE registry from the attached tree.
    fn rebuild_routes(&mut self) {
        let mut routes = HashSet::new();
        for id in self.subtree(self.root) {
            if !matches!(self[id].kind, ElementKind::Route) || self[id].generated {
                continue;
            }
            let endpoints: Vec<_> = self[id]
                .children
                .iter()
                .filter_map(|&c| self[c].as_endpoint())
                .filter(|e| e.kind.is_some())
                .collect();
            let [from, to] = endpoints.as_slice() else {
                continue;
            };
            let scope = self
                .ancestors(id)
                .find(|&a| matches!(self[a].kind, ElementKind::Scene))
                .unwrap_or(self.root);
            routes.insert(RouteKey {
                scope,
                from_node: from.node_name.clone(),
                from_field: from.field.clone(),
                to_node: to.node_name.clone(),
                to_field: to.field.clone(),
            });
        }
        self.routes = routes;
    }

    /// Refreshes a PROTO instance's copy, reruns verification and hands back
    /// the element the edit produced.
    fn finish_edit(&mut self, produced: Option<ElementId>, node: ElementId) -> Result<ElementId> {
        if let Some(NodeOrigin::Proto(proto)) = self[node].as_node().map(|n| n.origin) {
            let copies: Vec<ElementId> = self[node]
                .children
                .iter()
                .copied()
                .filter(|&c| matches!(self[c].kind, ElementKind::InstanceBody))
                .collect();
            for copy in copies {
                self.detach(copy);
            }
            self.instantiate(node, proto);
        }
        crate::verify::run(self);
        log::debug!("edit: parsed {produced:?} into {node:?}");
        produced.ok_or_else(|| EditError::InvalidText {
            reason: "text did not parse as the expected construct".to_owned(),
        }
        .into())
    }
}

/// Cheap shape check for statement text: something to parse, and balanced
/// brackets so the splice cannot swallow the surrounding source.
fn check_statement_text(text: &str) -> Result<()> {
    let tokens = lex(text);
    let Some(first) = tokens.first() else {
        return Err(EditError::InvalidText {
            reason: "empty text".to_owned(),
        }
        .into());
    };
    if first.kind != TokenKind::Id {
        return Err(EditError::InvalidText {
            reason: format!("`{}` does not start a node", first.text(text)),
        }
        .into());
    }
    let mut stack = Vec::new();
    for token in &tokens {
        match token.kind {
            TokenKind::LeftBrace | TokenKind::LeftBracket => stack.push(token.kind),
            TokenKind::RightBrace | TokenKind::RightBracket => {
                let opener = match token.kind {
                    TokenKind::RightBrace => TokenKind::LeftBrace,
                    _ => TokenKind::LeftBracket,
                };
                if stack.pop() != Some(opener) {
                    return Err(EditError::InvalidText {
                        reason: format!("unbalanced `{}`", token.text(text)),
                    }
                    .into());
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(EditError::InvalidText {
            reason: "unclosed bracket".to_owned(),
        }
        .into());
    }
    Ok(())
}
