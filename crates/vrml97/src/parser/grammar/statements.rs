//! File root and statement dispatch.

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::{Parser, Slot};
use crate::scene::{ElementId, MarkerKind, TokenSpan};

impl Parser<'_> {
    pub(crate) fn parse_root(&mut self) {
        let root = self.scene.root();
        if !self.scene.stream.has_header() {
            self.marker_over(
                root,
                MarkerKind::Header,
                TokenSpan::empty(0),
                DiagnosticKind::MissingHeader,
                None,
            );
        }

        while !self.eof() {
            if self.at_closer() {
                self.unexpected(root);
                continue;
            }
            let before = self.pos();
            self.parse_statement(root, Slot::Top);
            if self.pos() == before {
                self.unexpected(root);
            }
        }
    }

    /// One statement at the file root, for edits that append to it.
    pub(crate) fn parse_top_statement(&mut self) -> Option<ElementId> {
        let root = self.scene.root();
        self.parse_statement(root, Slot::Top)
    }

    /// Statements of a PROTO body, up to its closing `}` or `]`.
    pub(super) fn parse_body_statements(&mut self, body: ElementId) {
        while !self.eof() && !self.at_closer() {
            let before = self.pos();
            self.parse_statement(body, Slot::ProtoBody);
            if self.pos() == before {
                self.unexpected(body);
            }
        }
    }

    /// `DEF`, `USE`, `PROTO`, `EXTERNPROTO`, `ROUTE` or a node.
    pub(super) fn parse_statement(&mut self, parent: ElementId, slot: Slot<'_>) -> Option<ElementId> {
        if self.at_word("PROTO") {
            self.parse_proto(parent, false)
        } else if self.at_word("EXTERNPROTO") {
            self.parse_proto(parent, true)
        } else if self.at_word("ROUTE") {
            self.parse_route(parent)
        } else {
            self.parse_node_statement(parent, slot)
        }
    }

    /// `DEF`, `USE` or a node, as allowed in field values.
    pub(super) fn parse_node_statement(&mut self, parent: ElementId, slot: Slot<'_>) -> Option<ElementId> {
        let statement = if self.at_word("DEF") {
            self.parse_def(parent)
        } else if self.at_word("USE") {
            self.parse_use(parent)
        } else {
            self.parse_node(parent)
        }?;
        self.check_slot(statement, slot);
        Some(statement)
    }
}
