//! Parser state and low-level token operations.

use vrml97_core::NodeClass;

use crate::diagnostics::{DiagnosticKind, Report};
use crate::scene::{ElementId, ElementKind, MarkerKind, Scene, TokenSpan};
use crate::tokens::TokenKind;

/// Where a node statement appears; decides which node classes fit.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Slot<'a> {
    /// File root: children nodes only.
    Top,
    /// PROTO body: the first node decides the PROTO's type, anything goes.
    ProtoBody,
    /// SFNode/MFNode field value.
    Field {
        name: &'a str,
        accepts: Option<NodeClass>,
    },
}

pub(crate) struct Parser<'s> {
    pub(super) scene: &'s mut Scene,
    /// Scene elements receiving DEF and PROTO names, innermost last.
    pub(super) scopes: Vec<ElementId>,
    /// Enclosing PROTO declarations, innermost last.
    pub(super) protos: Vec<ElementId>,
    pub(super) depth: u32,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(scene: &'s mut Scene) -> Self {
        let root = scene.root();
        Self {
            scene,
            scopes: vec![root],
            protos: Vec::new(),
            depth: 0,
        }
    }

    /// Parser positioned at `pos`, resolving names in the file root.
    pub(crate) fn at(scene: &'s mut Scene, pos: usize) -> Self {
        scene.stream.set_state(pos);
        Self::new(scene)
    }

    // ------------------------------------------------------------------
    // Tokens
    // ------------------------------------------------------------------

    pub(super) fn pos(&self) -> usize {
        self.scene.stream.state()
    }

    pub(super) fn eof(&self) -> bool {
        self.scene.stream.at_end()
    }

    pub(super) fn current(&self) -> Option<TokenKind> {
        self.scene.stream.peek_kind(self.pos())
    }

    pub(super) fn nth(&self, lookahead: usize) -> Option<TokenKind> {
        self.scene.stream.peek_kind(self.pos() + lookahead)
    }

    pub(super) fn currently_is(&self, kind: TokenKind) -> bool {
        self.current() == Some(kind)
    }

    /// Text of the current token, `""` at end of input.
    pub(super) fn text(&self) -> &str {
        self.scene.stream.text(self.pos())
    }

    pub(super) fn text_at(&self, pos: usize) -> &str {
        self.scene.stream.text(pos)
    }

    pub(super) fn at_word(&self, word: &str) -> bool {
        self.scene.stream.is_word(self.pos(), word)
    }

    pub(super) fn at_id(&self) -> bool {
        self.currently_is(TokenKind::Id)
    }

    pub(super) fn at_number(&self) -> bool {
        self.currently_is(TokenKind::Number)
    }

    pub(super) fn at_string(&self) -> bool {
        self.scene.stream.is_quoted_string(self.pos())
    }

    /// `]` or `}`: tokens that end an enclosing construct.
    pub(super) fn at_closer(&self) -> bool {
        matches!(
            self.current(),
            Some(TokenKind::RightBracket | TokenKind::RightBrace)
        )
    }

    /// Advances one token and returns its position.
    pub(super) fn bump(&mut self) -> usize {
        let pos = self.pos();
        self.scene.stream.next_token();
        pos
    }

    /// Skips a balanced `{...}` or `[...]` group starting at the current
    /// token, or a single token otherwise.
    pub(super) fn skip_group(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.current() {
            match kind {
                TokenKind::LeftBrace | TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBrace | TokenKind::RightBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    // ------------------------------------------------------------------
    // Elements
    // ------------------------------------------------------------------

    /// New child of `parent` starting at the current token.
    pub(super) fn start(&mut self, parent: ElementId, kind: ElementKind) -> ElementId {
        let pos = self.pos();
        self.scene.push(parent, kind, TokenSpan::empty(pos))
    }

    /// Closes `id` at the current position.
    pub(super) fn finish(&mut self, id: ElementId) {
        let pos = self.pos();
        self.scene.set_end(id, pos);
    }

    pub(super) fn report(&mut self, id: ElementId, kind: DiagnosticKind) -> Report<'_> {
        self.scene.report(id, kind)
    }

    /// Marker over `span` carrying a diagnostic.
    pub(super) fn marker_over(
        &mut self,
        parent: ElementId,
        marker: MarkerKind,
        span: TokenSpan,
        kind: DiagnosticKind,
        detail: Option<String>,
    ) -> ElementId {
        let id = self.scene.push(parent, ElementKind::Marker(marker), span);
        let report = self.scene.report(id, kind);
        match detail {
            Some(detail) => report.detail(detail).emit(),
            None => report.emit(),
        };
        id
    }

    /// Zero-width marker before the current token.
    pub(super) fn marker(&mut self, parent: ElementId, marker: MarkerKind, kind: DiagnosticKind) -> ElementId {
        let span = TokenSpan::empty(self.pos());
        self.marker_over(parent, marker, span, kind, None)
    }

    /// Consumes the current token as unusable.
    pub(super) fn unexpected(&mut self, parent: ElementId) -> ElementId {
        let pos = self.bump();
        let detail = format!("\"{}\"", self.text_at(pos));
        self.marker_over(
            parent,
            MarkerKind::Unexpected,
            TokenSpan::single(pos),
            DiagnosticKind::UnexpectedToken,
            Some(detail),
        )
    }

    /// Consumes `kind` or synthesizes a missing-delimiter marker.
    pub(super) fn expect(&mut self, parent: ElementId, kind: TokenKind) -> bool {
        if self.currently_is(kind) {
            self.bump();
            return true;
        }
        let (marker, diagnostic) = match kind {
            TokenKind::LeftBracket => (MarkerKind::LeftBracket, DiagnosticKind::MissingLeftBracket),
            TokenKind::RightBracket => (MarkerKind::RightBracket, DiagnosticKind::MissingRightBracket),
            TokenKind::LeftBrace => (MarkerKind::LeftBrace, DiagnosticKind::MissingLeftBrace),
            _ => (MarkerKind::RightBrace, DiagnosticKind::MissingRightBrace),
        };
        self.marker(parent, marker, diagnostic);
        false
    }

    /// Enters one nesting level. At the limit, the current group is skipped
    /// as a marker and `false` is returned.
    pub(super) fn enter(&mut self, parent: ElementId) -> bool {
        if self.depth >= self.scene.config.recursion_limit() {
            let start = self.pos();
            self.skip_group();
            let span = TokenSpan::new(start, self.pos());
            self.marker_over(parent, MarkerKind::Unexpected, span, DiagnosticKind::RecursionLimit, None);
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    pub(super) fn current_scope(&self) -> ElementId {
        self.scopes.last().copied().unwrap_or(self.scene.root)
    }

    /// DEF visible from the current scope. PROTO bodies do not see DEFs of
    /// the enclosing file.
    pub(super) fn lookup_def(&self, name: &str) -> Option<ElementId> {
        self.scene
            .scopes
            .get(&self.current_scope())?
            .defs
            .get(name)
            .copied()
    }

    /// PROTO visible from the current scope, innermost declaration first.
    pub(super) fn lookup_proto(&self, name: &str) -> Option<ElementId> {
        self.scopes.iter().rev().find_map(|scope| {
            self.scene
                .scopes
                .get(scope)?
                .protos
                .get(name)
                .copied()
        })
    }

    /// PROTO names visible from the current scope.
    pub(super) fn proto_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for scope in self.scopes.iter().rev() {
            if let Some(scope) = self.scene.scopes.get(scope) {
                names.extend(scope.protos.keys().cloned());
            }
        }
        names
    }
}
