/// Every problem the parser and the verifiers can attach to an element.
///
/// The kind fixes the severity and the message template. Warnings render
/// with the `Warning, ` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Structure
    MissingHeader,
    MissingLeftBracket,
    MissingRightBracket,
    MissingLeftBrace,
    MissingRightBrace,
    UnexpectedToken,
    RecursionLimit,
    NodeConstruction,

    // Nodes
    ExpectedNode,
    UnknownNode,
    MisspelledNode,
    MisplacedNode,
    NodeNotAllowed,
    NodeNotAllowedAtTop,
    MisplacedNull,

    // Fields
    ExpectedFieldName,
    UnknownField,
    MisspelledField,
    EventWithValue,
    ExposedFieldInScript,

    // Values
    ExpectedValue,
    InvalidValue,
    ColorOutOfRange,
    NotPositive,
    BadBboxSize,
    NotEnoughValues,
    UnterminatedString,
    BadImageSize,
    BadImageDepth,

    // DEF/USE
    ExpectedName,
    NoDef,
    UseLoop,

    // PROTO and IS
    ExpectedInterfaceKind,
    UnknownType,
    DuplicateInterface,
    ProtoMissingNode,
    IsOutsideProto,
    UnknownInterface,
    IsKindMismatch,
    IsTypeMismatch,

    // ROUTE
    ExpectedEndpoint,
    ExpectedTo,
    RouteUnknownField,
    RouteBadSource,
    RouteBadDestination,
    RouteTypeMismatch,
    MissingFunction,

    // Verifiers
    IndexOutOfRange,
    RepeatedIndex,
    ShortFace,
    CountMismatch,
    KeysDecreasing,
    NotIncreasing,
    GridTooSmall,

    // Warnings
    DuplicateDef,
    DuplicateProto,
    RepeatedRoute,
    RepeatedField,
    UnusedDef,
    UnusedInterface,
    UnusedValue,
    ExtraValues,
    UnnecessaryKey,
    DefaultValue,
    TooManyValues,
    StringTooLong,
    ImageTooLarge,
    ProtoNesting,
    TooManyFaces,
    TooManyVertices,
    TooManyDeclarations,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        if *self >= Self::DuplicateDef {
            Severity::Warning
        } else {
            Severity::Error
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }

    /// Base message for this kind, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing \"#VRML V2.0 utf8\" header",
            Self::MissingLeftBracket => "expected \"[\"",
            Self::MissingRightBracket => "expected \"]\"",
            Self::MissingLeftBrace => "expected \"{\"",
            Self::MissingRightBrace => "expected \"}\"",
            Self::UnexpectedToken => "unexpected token",
            Self::RecursionLimit => "nesting too deep",
            Self::NodeConstruction => "could not build node",

            Self::ExpectedNode => "expected node",
            Self::UnknownNode | Self::MisspelledNode => "unknown node or PROTO",
            Self::MisplacedNode => "misplaced node",
            Self::NodeNotAllowed => "node not allowed in this field",
            Self::NodeNotAllowedAtTop => "node not allowed at top level",
            Self::MisplacedNull => "NULL must be the only value",

            Self::ExpectedFieldName => "expected field name",
            Self::UnknownField | Self::MisspelledField => "unknown field",
            Self::EventWithValue => "event cannot have a value",
            Self::ExposedFieldInScript => "exposedField not allowed in Script",

            Self::ExpectedValue => "expected value",
            Self::InvalidValue => "invalid value",
            Self::ColorOutOfRange => "color component must be between 0 and 1",
            Self::NotPositive => "value must be positive",
            Self::BadBboxSize => "bboxSize must be -1 -1 -1 or non-negative",
            Self::NotEnoughValues => "not enough values",
            Self::UnterminatedString => "unterminated string",
            Self::BadImageSize => "image size must not be negative",
            Self::BadImageDepth => "image depth must be between 0 and 4",

            Self::ExpectedName => "expected name",
            Self::NoDef => "No DEF for name",
            Self::UseLoop => "USE referring to parent node",

            Self::ExpectedInterfaceKind => "expected eventIn, eventOut, field or exposedField",
            Self::UnknownType => "unknown field type",
            Self::DuplicateInterface => "duplicate interface field",
            Self::ProtoMissingNode => "node missing from PROTO body",
            Self::IsOutsideProto => "IS outside PROTO",
            Self::UnknownInterface => "unknown interface field",
            Self::IsKindMismatch => "IS connects incompatible kinds",
            Self::IsTypeMismatch => "IS connects different types",

            Self::ExpectedEndpoint => "expected NODE.field",
            Self::ExpectedTo => "expected TO",
            Self::RouteUnknownField => "unknown field in ROUTE",
            Self::RouteBadSource => "ROUTE source must be an eventOut or exposedField",
            Self::RouteBadDestination => "ROUTE destination must be an eventIn or exposedField",
            Self::RouteTypeMismatch => "ROUTE connects different types",
            Self::MissingFunction => "no such function in Script",

            Self::IndexOutOfRange => "index out of range",
            Self::RepeatedIndex => "repeated index in face",
            Self::ShortFace => "face must have at least 3 edges",
            Self::CountMismatch => "wrong number of values",
            Self::KeysDecreasing => "key values must be non-decreasing",
            Self::NotIncreasing => "values must be increasing",
            Self::GridTooSmall => "grid dimension must be at least 2",

            Self::DuplicateDef => "duplicate DEF",
            Self::DuplicateProto => "duplicate PROTO",
            Self::RepeatedRoute => "repeated ROUTE",
            Self::RepeatedField => "repeated field",
            Self::UnusedDef => "unused DEF",
            Self::UnusedInterface => "unused interface field",
            Self::UnusedValue => "value not used",
            Self::ExtraValues => "more values than needed",
            Self::UnnecessaryKey => "unnecessary key",
            Self::DefaultValue => "value equals the default",
            Self::TooManyValues => "more values than the base profile allows",
            Self::StringTooLong => "string longer than the base profile allows",
            Self::ImageTooLarge => "image larger than the base profile allows",
            Self::ProtoNesting => "PROTO nesting deeper than the base profile allows",
            Self::TooManyFaces => "more faces than the base profile allows",
            Self::TooManyVertices => "face with more vertices than the base profile allows",
            Self::TooManyDeclarations => "more Script declarations than the base profile allows",
        }
    }

    /// Template for messages with caller-provided detail in place of `{}`.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownNode => "unknown node or PROTO \"{}\"".to_string(),
            Self::MisspelledNode => "unknown node or PROTO {}".to_string(),
            Self::MisplacedNode => "misplaced node \"{}\"".to_string(),
            Self::NodeNotAllowed => "node {}".to_string(),
            Self::NodeNotAllowedAtTop => "node \"{}\" not allowed at top level".to_string(),
            Self::UnknownField => "unknown field \"{}\"".to_string(),
            Self::MisspelledField => "unknown field {}".to_string(),
            Self::EventWithValue => "event \"{}\" cannot have a value".to_string(),
            Self::ExpectedValue => "expected {} value".to_string(),
            Self::InvalidValue => "invalid {}".to_string(),
            Self::NoDef => "No DEF for {}".to_string(),
            Self::UnknownType => "unknown field type {}".to_string(),
            Self::DuplicateInterface => "duplicate interface field \"{}\"".to_string(),
            Self::UnknownInterface => "unknown interface field {}".to_string(),
            Self::RouteUnknownField => "unknown field {} in ROUTE".to_string(),
            Self::MissingFunction => "no function \"{}\" in Script".to_string(),
            Self::CountMismatch | Self::ExtraValues => "{}".to_string(),
            Self::NotIncreasing => "{} values must be increasing".to_string(),
            Self::GridTooSmall => "{} must be at least 2".to_string(),
            Self::DuplicateDef => "duplicate DEF \"{}\"".to_string(),
            Self::DuplicateProto => "duplicate PROTO \"{}\"".to_string(),
            Self::RepeatedField => "repeated field \"{}\"".to_string(),
            Self::UnusedDef => "unused DEF \"{}\"".to_string(),
            Self::UnusedInterface => "unused interface field \"{}\"".to_string(),
            Self::UnusedValue => "{} not used".to_string(),
            Self::UnnecessaryKey => "unnecessary {}".to_string(),
            Self::DefaultValue => "{} equals the default value".to_string(),
            Self::TooManyValues
            | Self::StringTooLong
            | Self::ImageTooLarge
            | Self::ProtoNesting
            | Self::TooManyFaces
            | Self::TooManyVertices
            | Self::TooManyDeclarations => "{} (base profile)".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message, `Warning, ` prefix included.
    ///
    /// - `None` uses [`fallback_message`](Self::fallback_message)
    /// - `Some(detail)` fills the [`custom_message`](Self::custom_message) template
    pub fn message(&self, detail: Option<&str>) -> String {
        let body = match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        };
        match self.severity() {
            Severity::Warning => format!("{WARNING_PREFIX}{body}"),
            Severity::Error => body,
        }
    }
}

/// Prefix that marks a message as a warning.
pub const WARNING_PREFIX: &str = "Warning, ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}
