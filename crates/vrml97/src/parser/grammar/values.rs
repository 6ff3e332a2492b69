//! Field values.
//!
//! MF values keep valid items as plain tokens: only items with a problem get
//! an element of their own, so large coordinate arrays stay cheap.

use vrml97_core::limits::{MAX_IMAGE_DEPTH, MAX_IMAGE_DIMENSION, MAX_STRING_LENGTH, mf_limit};
use vrml97_core::{FieldDescriptor, FieldType, NodeClass, ValueConstraint};

use crate::diagnostics::DiagnosticKind;
use crate::parser::core::{Parser, Slot};
use crate::scene::{ElementId, ElementKind, MarkerKind, TokenSpan};
use crate::tokens::{TokenKind, parse_int};
use crate::values::{FieldValue, Image, MultiValue, is_color_component, is_float, is_int, pixel_value, unquote};

impl Parser<'_> {
    /// Value of `data_type` for the field or interface `parent`.
    pub(super) fn parse_value(
        &mut self,
        parent: ElementId,
        data_type: FieldType,
        descriptor: Option<&'static FieldDescriptor>,
        field_name: &str,
    ) -> ElementId {
        if data_type.is_multi() {
            return self.parse_multi(parent, data_type, descriptor, field_name);
        }
        let value = self.start(parent, ElementKind::Value(FieldValue::empty(data_type)));
        let parsed = match data_type {
            FieldType::SfNode => {
                let accepts = descriptor.and_then(|d| d.accepts);
                self.parse_sf_node(value, field_name, accepts)
            }
            _ => self.parse_single(value, data_type, descriptor.and_then(|d| d.constraint), false),
        };
        *self.scene.kind_mut(value) = ElementKind::Value(parsed);
        self.finish(value);
        value
    }

    fn parse_single(
        &mut self,
        holder: ElementId,
        data_type: FieldType,
        constraint: Option<ValueConstraint>,
        in_multi: bool,
    ) -> FieldValue {
        match data_type {
            FieldType::SfBool => self.parse_bool(holder),
            FieldType::SfString => self.parse_string(holder),
            FieldType::SfImage => self.parse_image(holder),
            _ => self.parse_numbers(holder, data_type, constraint, in_multi),
        }
    }

    fn expected_value(&mut self, holder: ElementId, data_type: FieldType) {
        let span = TokenSpan::empty(self.pos());
        self.marker_over(
            holder,
            MarkerKind::Short,
            span,
            DiagnosticKind::ExpectedValue,
            Some(data_type.name().to_owned()),
        );
    }

    /// Consumes the current token as an invalid `data_type` value.
    fn invalid_token(&mut self, holder: ElementId, data_type: FieldType, kind: DiagnosticKind) {
        let pos = self.bump();
        let detail = match kind {
            DiagnosticKind::InvalidValue => Some(format!("{data_type} \"{}\"", self.text_at(pos))),
            _ => None,
        };
        self.marker_over(holder, MarkerKind::Invalid, TokenSpan::single(pos), kind, detail);
    }

    fn parse_bool(&mut self, holder: ElementId) -> FieldValue {
        if self.at_word("TRUE") {
            self.bump();
            return FieldValue::Bool(Some(true));
        }
        if self.at_word("FALSE") {
            self.bump();
            return FieldValue::Bool(Some(false));
        }
        let near_miss = self.at_id() && {
            let upper = self.text().to_ascii_uppercase();
            upper == "TRUE" || upper == "FALSE"
        };
        if near_miss || self.at_number() {
            self.invalid_token(holder, FieldType::SfBool, DiagnosticKind::InvalidValue);
        } else {
            self.expected_value(holder, FieldType::SfBool);
        }
        FieldValue::Bool(None)
    }

    fn parse_string(&mut self, holder: ElementId) -> FieldValue {
        if !self.at_string() {
            self.expected_value(holder, FieldType::SfString);
            return FieldValue::String(None);
        }
        let terminated = self.currently_is(TokenKind::QuotedString);
        let start = self.bump();
        let mut raw = self.text_at(start).to_owned();
        while self.currently_is(TokenKind::ContinuationString) {
            let pos = self.bump();
            raw.push('\n');
            raw.push_str(self.text_at(pos));
        }
        let span = TokenSpan::new(start, self.pos());

        if !terminated {
            self.marker_over(holder, MarkerKind::Invalid, span, DiagnosticKind::UnterminatedString, None);
            return FieldValue::String(None);
        }
        let text = unquote(&raw);
        if text.chars().count() > MAX_STRING_LENGTH {
            self.marker_over(
                holder,
                MarkerKind::Limit,
                span,
                DiagnosticKind::StringTooLong,
                Some(format!("string longer than {MAX_STRING_LENGTH} characters")),
            );
        }
        FieldValue::String(Some(text))
    }

    /// A fixed run of numbers: one SFFloat, three SFColor components, ...
    fn parse_numbers(
        &mut self,
        holder: ElementId,
        data_type: FieldType,
        constraint: Option<ValueConstraint>,
        in_multi: bool,
    ) -> FieldValue {
        let arity = data_type.arity();
        let mut numbers = Vec::with_capacity(arity);
        let mut positions = Vec::with_capacity(arity);
        let mut valid = true;

        while positions.len() < arity {
            if !self.at_number() {
                // A partial color right before `]` is left alone.
                let partial_color = in_multi
                    && data_type == FieldType::SfColor
                    && self.currently_is(TokenKind::RightBracket);
                if partial_color {
                    return FieldValue::empty(data_type);
                }
                if positions.is_empty() && !in_multi {
                    self.expected_value(holder, data_type);
                } else {
                    self.marker(holder, MarkerKind::Short, DiagnosticKind::NotEnoughValues);
                }
                return FieldValue::empty(data_type);
            }
            let pos = self.pos();
            match number_value(data_type, self.text()) {
                Some(number) => {
                    self.bump();
                    numbers.push(number);
                }
                None => {
                    let kind = if data_type == FieldType::SfColor && is_float(self.text()) {
                        DiagnosticKind::ColorOutOfRange
                    } else {
                        DiagnosticKind::InvalidValue
                    };
                    self.invalid_token(holder, data_type, kind);
                    valid = false;
                }
            }
            positions.push(pos);
        }

        if !valid {
            return FieldValue::empty(data_type);
        }
        self.check_constraint(holder, constraint, &numbers, &positions);
        build_value(data_type, &numbers)
    }

    fn check_constraint(
        &mut self,
        holder: ElementId,
        constraint: Option<ValueConstraint>,
        numbers: &[f64],
        positions: &[usize],
    ) {
        let flagged: Vec<(usize, DiagnosticKind)> = match constraint {
            None => return,
            Some(ValueConstraint::Positive) => numbers
                .iter()
                .zip(positions)
                .filter(|&(&n, _)| n <= 0.0)
                .map(|(_, &pos)| (pos, DiagnosticKind::NotPositive))
                .collect(),
            Some(ValueConstraint::BboxSize) => {
                if numbers.iter().all(|&n| n == -1.0) {
                    return;
                }
                let has_unset = numbers.contains(&-1.0);
                numbers
                    .iter()
                    .zip(positions)
                    .filter(|&(&n, _)| (n < 0.0 && n != -1.0) || (has_unset && n >= 0.0))
                    .map(|(_, &pos)| (pos, DiagnosticKind::BadBboxSize))
                    .collect()
            }
        };
        for (pos, kind) in flagged {
            self.marker_over(holder, MarkerKind::Invalid, TokenSpan::single(pos), kind, None);
        }
    }

    /// `width height depth` followed by `width * height` pixels.
    fn parse_image(&mut self, holder: ElementId) -> FieldValue {
        let mut header = [0i64; 3];
        let mut header_pos = [0usize; 3];
        for (value, slot) in header.iter_mut().zip(header_pos.iter_mut()) {
            if !self.at_number() {
                self.marker(holder, MarkerKind::Short, DiagnosticKind::NotEnoughValues);
                return FieldValue::Image(None);
            }
            let text = self.text();
            let parsed = parse_int(text).filter(|_| is_int(text));
            let Some(parsed) = parsed else {
                self.invalid_token(holder, FieldType::SfImage, DiagnosticKind::InvalidValue);
                return FieldValue::Image(None);
            };
            *slot = self.bump();
            *value = i64::from(parsed);
        }
        let [width, height, depth] = header;

        let mut usable = true;
        for (size, pos) in [(width, header_pos[0]), (height, header_pos[1])] {
            if size < 0 {
                let span = TokenSpan::single(pos);
                self.marker_over(holder, MarkerKind::Invalid, span, DiagnosticKind::BadImageSize, None);
                usable = false;
            } else if size > MAX_IMAGE_DIMENSION {
                let span = TokenSpan::single(pos);
                let detail = format!("image larger than {MAX_IMAGE_DIMENSION}x{MAX_IMAGE_DIMENSION}");
                self.marker_over(holder, MarkerKind::Limit, span, DiagnosticKind::ImageTooLarge, Some(detail));
            }
        }
        if !(0..=MAX_IMAGE_DEPTH).contains(&depth) {
            let span = TokenSpan::single(header_pos[2]);
            self.marker_over(holder, MarkerKind::Invalid, span, DiagnosticKind::BadImageDepth, None);
            usable = false;
        }
        if !usable {
            while self.at_number() {
                self.bump();
            }
            return FieldValue::Image(None);
        }

        let expected = (width * height) as usize;
        let mut pixels = 0usize;
        let mut run = 0usize;
        let mut longest_run = 0usize;
        let mut previous = None;
        let mut valid = true;
        while pixels < expected {
            if !self.at_number() {
                self.marker(holder, MarkerKind::Short, DiagnosticKind::NotEnoughValues);
                valid = false;
                break;
            }
            match pixel_value(self.text()) {
                Some(pixel) => {
                    self.bump();
                    run = if previous == Some(pixel) { run + 1 } else { 1 };
                    longest_run = longest_run.max(run);
                    previous = Some(pixel);
                }
                None => {
                    self.invalid_token(holder, FieldType::SfImage, DiagnosticKind::InvalidValue);
                    valid = false;
                }
            }
            pixels += 1;
        }

        if !valid {
            return FieldValue::Image(None);
        }
        FieldValue::Image(Some(Image {
            width: width as i32,
            height: height as i32,
            depth: depth as i32,
            pixels,
            longest_run,
        }))
    }

    /// `NULL` or one node statement.
    fn parse_sf_node(&mut self, value: ElementId, field_name: &str, accepts: Option<NodeClass>) -> FieldValue {
        if self.at_word("NULL") {
            self.bump();
            return FieldValue::Node(0);
        }
        if !self.at_id() {
            self.expected_value(value, FieldType::SfNode);
            return FieldValue::Node(0);
        }
        let slot = Slot::Field {
            name: field_name,
            accepts,
        };
        FieldValue::Node(usize::from(self.parse_node_statement(value, slot).is_some()))
    }

    /// A node statement added to an existing SFNode/MFNode value.
    pub(crate) fn parse_node_into(
        &mut self,
        value: ElementId,
        field_name: &str,
        accepts: Option<NodeClass>,
    ) -> Option<ElementId> {
        let slot = Slot::Field {
            name: field_name,
            accepts,
        };
        self.parse_node_statement(value, slot)
    }

    /// `[ item ... ]`, or a single item without brackets.
    fn parse_multi(
        &mut self,
        parent: ElementId,
        data_type: FieldType,
        descriptor: Option<&'static FieldDescriptor>,
        field_name: &str,
    ) -> ElementId {
        let value = self.start(parent, ElementKind::Value(FieldValue::empty(data_type)));
        let single = data_type.single();
        let limit = descriptor.and_then(|d| d.limit).or_else(|| mf_limit(data_type));
        let mut count = 0usize;
        let mut limited = false;

        if self.currently_is(TokenKind::LeftBracket) {
            self.bump();
            loop {
                if self.currently_is(TokenKind::RightBracket) {
                    self.bump();
                    break;
                }
                // Anything else that is not an item is reported and skipped.
                if self.eof() || self.currently_is(TokenKind::RightBrace) {
                    self.marker(value, MarkerKind::RightBracket, DiagnosticKind::MissingRightBracket);
                    break;
                }

                let before = self.pos();
                let counted = if self.starts_item(single) {
                    self.parse_item(value, single, descriptor, field_name, count, true)
                } else {
                    self.invalid_token(value, single, DiagnosticKind::InvalidValue);
                    true
                };
                if counted {
                    count += 1;
                    if !limited && limit.is_some_and(|l| !l.allows(count)) {
                        limited = true;
                        let max = limit.map_or(0, |l| l.max * l.per_unit.max(1));
                        let span = TokenSpan::new(before, self.pos());
                        self.marker_over(
                            value,
                            MarkerKind::Limit,
                            span,
                            DiagnosticKind::TooManyValues,
                            Some(format!("more than {max} values in {field_name}")),
                        );
                    }
                }
                if self.pos() == before {
                    self.unexpected(value);
                }
            }
        } else if self.starts_item(single) {
            count = usize::from(self.parse_item(value, single, descriptor, field_name, 0, false));
        } else {
            self.expected_value(value, data_type);
        }

        *self.scene.kind_mut(value) = ElementKind::Value(FieldValue::Multi(MultiValue {
            field_type: data_type,
            count,
        }));
        self.finish(value);
        value
    }

    fn starts_item(&self, single: FieldType) -> bool {
        match single {
            FieldType::SfNode => self.at_id(),
            FieldType::SfString => self.at_string(),
            FieldType::SfBool => self.at_word("TRUE") || self.at_word("FALSE"),
            _ => self.at_number(),
        }
    }

    /// One MF item. Returns whether it counts as a value.
    fn parse_item(
        &mut self,
        value: ElementId,
        single: FieldType,
        descriptor: Option<&'static FieldDescriptor>,
        field_name: &str,
        count: usize,
        bracketed: bool,
    ) -> bool {
        match single {
            FieldType::SfNode => {
                let accepts = descriptor.and_then(|d| d.accepts);
                self.parse_node_item(value, field_name, accepts, count, bracketed)
            }
            FieldType::SfBool => {
                self.bump();
                true
            }
            _ => {
                let constraint = descriptor.and_then(|d| d.constraint);
                if let Some(len) = self.clean_item_len(single, constraint) {
                    let pos = self.pos();
                    self.scene.stream.set_state(pos + len);
                    return true;
                }
                let item = self.start(value, ElementKind::Value(FieldValue::empty(single)));
                let parsed = self.parse_single(item, single, constraint, true);
                *self.scene.kind_mut(item) = ElementKind::Value(parsed);
                self.finish(item);
                true
            }
        }
    }

    /// Token count of the item at the current position when it has no
    /// problem at all.
    fn clean_item_len(&self, single: FieldType, constraint: Option<ValueConstraint>) -> Option<usize> {
        let stream = &self.scene.stream;
        let pos = self.pos();
        if single == FieldType::SfString {
            if stream.peek_kind(pos) != Some(TokenKind::QuotedString) {
                return None;
            }
            let mut len = 1;
            let mut chars = stream.text(pos).len();
            while stream.is_continuation(pos + len) {
                chars += stream.text(pos + len).len() + 1;
                len += 1;
            }
            return (chars <= MAX_STRING_LENGTH).then_some(len);
        }

        let arity = single.arity();
        let clean = (pos..pos + arity).all(|p| {
            stream.is_number(p)
                && number_value(single, stream.text(p)).is_some_and(|n| match constraint {
                    None => true,
                    Some(ValueConstraint::Positive) => n > 0.0,
                    Some(ValueConstraint::BboxSize) => false,
                })
        });
        clean.then_some(arity)
    }

    /// `NULL`, a tolerated ROUTE, or a node statement.
    fn parse_node_item(
        &mut self,
        value: ElementId,
        field_name: &str,
        accepts: Option<NodeClass>,
        count: usize,
        bracketed: bool,
    ) -> bool {
        if self.at_word("NULL") {
            let pos = self.bump();
            let alone = count == 0 && (!bracketed || self.currently_is(TokenKind::RightBracket));
            if !alone {
                let span = TokenSpan::single(pos);
                self.marker_over(value, MarkerKind::Invalid, span, DiagnosticKind::MisplacedNull, None);
            }
            return false;
        }
        if self.at_word("ROUTE") {
            self.parse_route(value);
            return false;
        }
        let slot = Slot::Field {
            name: field_name,
            accepts,
        };
        self.parse_node_statement(value, slot).is_some()
    }
}

/// Numeric value of a token read as `data_type`, `None` when lexically bad.
fn number_value(data_type: FieldType, text: &str) -> Option<f64> {
    match data_type.single() {
        FieldType::SfInt32 => parse_int(text).filter(|_| is_int(text)).map(f64::from),
        FieldType::SfColor => is_color_component(text)
            .then(|| text.parse::<f64>().ok())
            .flatten(),
        _ => is_float(text)
            .then(|| text.parse::<f64>().ok())
            .flatten()
            .filter(|n| n.is_finite()),
    }
}

fn build_value(data_type: FieldType, n: &[f64]) -> FieldValue {
    let f = |i: usize| n.get(i).copied().unwrap_or_default() as f32;
    match data_type {
        FieldType::SfFloat => FieldValue::Float(Some(f(0))),
        FieldType::SfInt32 => FieldValue::Int32(n.first().map(|&v| v as i32)),
        FieldType::SfTime => FieldValue::Time(n.first().copied()),
        FieldType::SfColor => FieldValue::Color(Some([f(0), f(1), f(2)])),
        FieldType::SfVec2f => FieldValue::Vec2f(Some([f(0), f(1)])),
        FieldType::SfVec3f => FieldValue::Vec3f(Some([f(0), f(1), f(2)])),
        FieldType::SfRotation => FieldValue::Rotation(Some([f(0), f(1), f(2), f(3)])),
        other => FieldValue::empty(other),
    }
}
