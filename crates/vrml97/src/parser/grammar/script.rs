//! Script bodies: built-in fields mixed with interface declarations.

use vrml97_core::limits::MAX_SCRIPT_DECLARATIONS;
use vrml97_core::{InterfaceKind, NodeSpec};

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::Parser;
use crate::parser::grammar::fields::Body;
use crate::scene::ElementId;

impl Parser<'_> {
    pub(super) fn parse_script_item(&mut self, node: ElementId, spec: &'static NodeSpec) -> Option<ElementId> {
        if !self.at_interface_kind() {
            return self.parse_field(node, Body::Script(spec));
        }
        let exposed = self.at_word("exposedField");
        let interface = self.parse_interface(node, true)?;
        self.check_duplicate_interface(node, interface);
        if exposed {
            self.report(interface, DiagnosticKind::ExposedFieldInScript).emit();
        }
        Some(interface)
    }

    /// Warns once per kind past the base-profile declaration count.
    pub(super) fn check_script_declarations(&mut self, node: ElementId) {
        for kind in [InterfaceKind::EventIn, InterfaceKind::EventOut, InterfaceKind::Field] {
            let over = self.scene[node]
                .children
                .iter()
                .copied()
                .filter(|&child| self.scene[child].as_interface().is_some_and(|i| i.kind == kind))
                .nth(MAX_SCRIPT_DECLARATIONS);
            if let Some(interface) = over {
                self.report(interface, DiagnosticKind::TooManyDeclarations)
                    .detail(format!("more than {MAX_SCRIPT_DECLARATIONS} {kind} declarations"))
                    .emit();
            }
        }
    }
}
