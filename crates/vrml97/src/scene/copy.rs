//! PROTO instantiation: copying a declaration body into an instance.
//!
//! Copies are marked generated. They keep the token spans of what they were
//! copied from, so verifiers can read their numbers, but report no source
//! position of their own. IS-connected fields take the instance's value, or
//! the interface default when the instance does not set the field.
//!
//! An instance nested in a PROTO body is expanded again for every copy of
//! that body, so values passed to the outer instance reach the inner one.

use super::{ElementId, ElementKind, NodeOrigin, Scene, TokenSpan};

/// Nested instances deeper than this are not expanded.
const MAX_COPY_DEPTH: usize = 64;

impl Scene {
    /// Fills `instance` with a generated copy of `proto`'s body.
    pub(crate) fn instantiate(&mut self, instance: ElementId, proto: ElementId) {
        self.instantiate_at(instance, proto, 0);
    }

    fn instantiate_at(&mut self, instance: ElementId, proto: ElementId, depth: usize) {
        let Some(body) = self[proto].as_proto().and_then(|p| p.body) else {
            return;
        };
        let statements: Vec<ElementId> = self[body]
            .children
            .iter()
            .copied()
            .filter(|&child| {
                matches!(
                    self[child].kind,
                    ElementKind::Node(_) | ElementKind::Def(_) | ElementKind::Use(_)
                )
            })
            .collect();
        if statements.is_empty() {
            return;
        }

        let copy_root = self.push(instance, ElementKind::InstanceBody, TokenSpan::default());
        self.element_mut(copy_root).generated = true;
        for statement in statements {
            self.copy_subtree(statement, copy_root, instance, depth);
        }
        log::trace!(
            "instantiate: {} from PROTO {:?}",
            self.node_name(instance).unwrap_or("?"),
            self[proto].as_proto().map(|p| p.name.as_str())
        );
    }

    fn copy_subtree(&mut self, source: ElementId, parent: ElementId, instance: ElementId, depth: usize) {
        // Never copy something into itself.
        if depth > MAX_COPY_DEPTH || self.is_ancestor(source, parent) {
            return;
        }
        let element = &self[source];
        if element.is_marker() || element.verified {
            return;
        }

        let mut kind = element.kind.clone();
        if let ElementKind::Node(node) = &mut kind {
            node.from_is = node.has_is;
            node.has_is = false;
        }
        let nested = match &kind {
            ElementKind::Node(node) => match node.origin {
                NodeOrigin::Proto(proto) => Some(proto),
                _ => None,
            },
            _ => None,
        };
        let span = element.span;
        let children = element.children.clone();
        let copy = self.push(parent, kind, span);
        self.element_mut(copy).generated = true;

        let connected = children
            .iter()
            .copied()
            .find(|&child| matches!(self[child].kind, ElementKind::Is(_)));
        match connected {
            Some(is) => {
                // Still IS-connected in the instance: the value is not known
                // here, so nothing up to the copy root gets verified.
                if self.forwarded(is, instance) {
                    self.mark_unresolved(parent);
                }
                if let Some(value) = self.substitute(is, instance) {
                    self.copy_subtree(value, copy, instance, depth + 1);
                }
            }
            None => {
                for child in children {
                    // A nested instance is expanded from its copied fields instead.
                    if nested.is_some() && matches!(self[child].kind, ElementKind::InstanceBody) {
                        continue;
                    }
                    self.copy_subtree(child, copy, instance, depth + 1);
                }
            }
        }
        if let Some(proto) = nested {
            self.instantiate_at(copy, proto, depth + 1);
        }
    }

    fn mark_unresolved(&mut self, from: ElementId) {
        let chain: Vec<ElementId> = self
            .ancestors(from)
            .take_while(|&a| !matches!(self[a].kind, ElementKind::InstanceBody))
            .collect();
        for id in chain {
            if let ElementKind::Node(node) = self.kind_mut(id) {
                node.has_is = true;
            }
        }
    }

    /// The instance field an IS element refers to, if the instance sets it.
    fn instance_field(&self, is: ElementId, instance: ElementId) -> Option<ElementId> {
        let ElementKind::Is(data) = &self[is].kind else {
            return None;
        };
        // The last one set wins.
        self[instance]
            .children
            .iter()
            .rev()
            .copied()
            .find(|&child| self[child].as_field().is_some_and(|f| f.name == data.name))
    }

    /// Whether the instance passes the field on with an IS of its own.
    fn forwarded(&self, is: ElementId, instance: ElementId) -> bool {
        self.instance_field(is, instance).is_some_and(|field| {
            self[field]
                .children
                .iter()
                .any(|&c| matches!(self[c].kind, ElementKind::Is(_)))
        })
    }

    /// Value an IS element stands for inside `instance`.
    fn substitute(&self, is: ElementId, instance: ElementId) -> Option<ElementId> {
        let ElementKind::Is(data) = &self[is].kind else {
            return None;
        };
        // Instance fields take precedence over the interface default.
        let from_instance = self
            .instance_field(is, instance)
            .and_then(|field| self.value_of(field));
        from_instance.or_else(|| self.value_of(data.interface?))
    }
}
