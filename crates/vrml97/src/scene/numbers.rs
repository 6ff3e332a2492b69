//! Reading numbers back out of value elements.
//!
//! MF values keep no per-value storage, so numbers are re-read from the token
//! stream. Random access goes through a sparse checkpoint index built on first
//! use so that long arrays are not rescanned from their start on every call.

use super::{ElementId, Scene};
use crate::tokens::TokenKind;
use crate::{Result, TokenError};

/// Checkpoints kept per value element.
const CHECKPOINTS: usize = 20;

impl Scene {
    /// Token positions of the numbers inside `value`, in order.
    pub fn number_positions(&self, value: ElementId) -> impl Iterator<Item = usize> + '_ {
        let span = self.get(value).map(|e| e.span.range()).unwrap_or(0..0);
        span.filter(|&pos| self.stream.peek_kind(pos) == Some(TokenKind::Number))
    }

    pub fn number_count(&self, value: ElementId) -> usize {
        self.number_positions(value).count()
    }

    /// Every number of `value` as an int, `None` where conversion fails.
    pub fn ints(&self, value: ElementId) -> Vec<(usize, Option<i32>)> {
        self.number_positions(value)
            .map(|pos| (pos, self.stream.int_value(pos).ok()))
            .collect()
    }

    /// Every number of `value` as a float, `None` where conversion fails.
    pub fn floats(&self, value: ElementId) -> Vec<(usize, Option<f64>)> {
        self.number_positions(value)
            .map(|pos| (pos, self.stream.float_value(pos).ok()))
            .collect()
    }

    /// Token position of the `offset`-th number in `value`.
    pub fn number_token(&self, value: ElementId, offset: usize) -> Option<usize> {
        let (mut logical, mut pos) = self.checkpoint_before(value, offset)?;
        let end = self.get(value)?.span.end;
        while pos < end {
            if self.stream.peek_kind(pos) == Some(TokenKind::Number) {
                if logical == offset {
                    return Some(pos);
                }
                logical += 1;
            }
            pos += 1;
        }
        None
    }

    pub fn float_at(&self, value: ElementId, offset: usize) -> Result<f64> {
        let pos = self.number_token(value, offset).ok_or(TokenError::OutOfRange {
            pos: offset,
            len: self.number_count(value),
        })?;
        Ok(self.stream.float_value(pos)?)
    }

    pub fn int_at(&self, value: ElementId, offset: usize) -> Result<i32> {
        let pos = self.number_token(value, offset).ok_or(TokenError::OutOfRange {
            pos: offset,
            len: self.number_count(value),
        })?;
        Ok(self.stream.int_value(pos)?)
    }

    /// Closest checkpoint at or before `offset`, building the index lazily.
    fn checkpoint_before(&self, value: ElementId, offset: usize) -> Option<(usize, usize)> {
        let start = self.get(value)?.span.start;
        let mut index = self.number_index.borrow_mut();
        let checkpoints = index.entry(value).or_insert_with(|| {
            let positions: Vec<usize> = self.number_positions(value).collect();
            let step = positions.len().div_ceil(CHECKPOINTS).max(1);
            positions
                .iter()
                .enumerate()
                .step_by(step)
                .map(|(logical, &pos)| (logical, pos))
                .collect()
        });
        let found = checkpoints.partition_point(|&(logical, _)| logical <= offset);
        Some(
            found
                .checked_sub(1)
                .map_or((0, start), |i| checkpoints[i]),
        )
    }

    /// Forgets all checkpoints. Token positions move on every edit.
    pub(crate) fn clear_number_index(&self) {
        self.number_index.borrow_mut().clear();
    }

    /// Number of checkpoints currently cached for `value`.
    #[cfg(test)]
    pub(crate) fn checkpoint_count(&self, value: ElementId) -> usize {
        self.number_index
            .borrow()
            .get(&value)
            .map_or(0, Vec::len)
    }
}
