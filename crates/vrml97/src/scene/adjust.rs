//! Offset adjustment after the token stream changes.

use super::Scene;

impl Scene {
    /// Shifts every element position at or after `boundary` by `delta`.
    ///
    /// Runs over the whole arena after each splice. Generated elements are
    /// shifted too, since they still point at the tokens they were copied from.
    pub(crate) fn shift_offsets(&mut self, boundary: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for element in &mut self.elements {
            element.span.shift(boundary, delta);
        }
        self.clear_number_index();
        log::debug!("adjust: shifted offsets from token {boundary} by {delta}");
    }

    /// Inserts `text` before token `pos` and shifts the tree to match.
    pub(crate) fn insert_text(&mut self, pos: usize, text: &str) -> Result<isize, crate::TokenError> {
        let delta = self.stream.insert(pos, text)?;
        self.shift_offsets(pos, delta);
        self.fix_root_span();
        Ok(delta)
    }

    /// Replaces tokens `start..end` with `text` and shifts the tree to match.
    pub(crate) fn replace_text(
        &mut self,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<isize, crate::TokenError> {
        let delta = self.stream.replace_range(start..end, text)?;
        // Tokens inside the replaced range are gone; anything from `end` on moves.
        self.shift_offsets(end, delta);
        self.fix_root_span();
        Ok(delta)
    }

    fn fix_root_span(&mut self) {
        let len = self.stream.len();
        let root = self.root;
        let span = &mut self.element_mut(root).span;
        span.start = 0;
        span.end = len;
    }
}
