//! Parse configuration and the collaborators a host can plug in.

use std::fmt;

use crate::diagnostics::DiagnosticKind;

/// Default maximum nesting of nodes and PROTO bodies. Each level costs
/// several parser and visitor frames; sized for a 2 MiB thread stack.
pub const DEFAULT_RECURSION_LIMIT: u32 = 128;

/// Supplies DEF names for nodes the source left unnamed.
pub trait DefNameGenerator {
    /// A name for the next node of type `type_name`, or `None` to leave it
    /// unnamed.
    fn create_def_name(&mut self, type_name: &str) -> Option<String>;
}

impl<F> DefNameGenerator for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn create_def_name(&mut self, type_name: &str) -> Option<String> {
        self(type_name)
    }
}

/// Caps how many warnings of one kind get attached.
pub trait WarningBudget {
    /// Called once per warning about to be attached. Returning `false`
    /// drops it.
    fn count_warning(&mut self, kind: DiagnosticKind) -> bool;
}

impl<F> WarningBudget for F
where
    F: FnMut(DiagnosticKind) -> bool,
{
    fn count_warning(&mut self, kind: DiagnosticKind) -> bool {
        self(kind)
    }
}

/// Options for [`Scene::parse`](crate::Scene::parse).
///
/// ```
/// use vrml97::ParseConfig;
///
/// let mut counter = 0;
/// let config = ParseConfig::new()
///     .with_nurbs(true)
///     .with_def_names(move |_: &str| {
///         counter += 1;
///         Some(format!("N{counter}"))
///     });
/// assert!(config.nurbs());
/// ```
pub struct ParseConfig {
    nurbs: bool,
    recursion_limit: u32,
    unused_def_warnings: bool,
    default_value_warnings: bool,
    pub(crate) def_names: Option<Box<dyn DefNameGenerator>>,
    pub(crate) warning_budget: Option<Box<dyn WarningBudget>>,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self {
            nurbs: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            unused_def_warnings: true,
            default_value_warnings: false,
            def_names: None,
            warning_budget: None,
        }
    }

    /// Enables the NURBS extension nodes.
    pub fn with_nurbs(mut self, enabled: bool) -> Self {
        self.nurbs = enabled;
        self
    }

    /// Names every unnamed node through `generator` (auto-DEF).
    pub fn with_def_names(mut self, generator: impl DefNameGenerator + 'static) -> Self {
        self.def_names = Some(Box::new(generator));
        self
    }

    pub fn with_warning_budget(mut self, budget: impl WarningBudget + 'static) -> Self {
        self.warning_budget = Some(Box::new(budget));
        self
    }

    /// Maximum nesting of nodes and values before the parser gives up on a
    /// body.
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_unused_def_warnings(mut self, enabled: bool) -> Self {
        self.unused_def_warnings = enabled;
        self
    }

    /// Warns about field values equal to the field's default.
    pub fn with_default_value_warnings(mut self, enabled: bool) -> Self {
        self.default_value_warnings = enabled;
        self
    }

    pub fn nurbs(&self) -> bool {
        self.nurbs
    }

    pub fn recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    pub fn unused_def_warnings(&self) -> bool {
        self.unused_def_warnings
    }

    pub fn default_value_warnings(&self) -> bool {
        self.default_value_warnings
    }

    pub(crate) fn create_def_name(&mut self, type_name: &str) -> Option<String> {
        self.def_names.as_mut()?.create_def_name(type_name)
    }

    pub(crate) fn has_def_names(&self) -> bool {
        self.def_names.is_some()
    }

    /// Whether a warning of `kind` may still be attached.
    pub(crate) fn allow_warning(&mut self, kind: DiagnosticKind) -> bool {
        self.warning_budget
            .as_mut()
            .is_none_or(|budget| budget.count_warning(kind))
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("nurbs", &self.nurbs)
            .field("recursion_limit", &self.recursion_limit)
            .field("unused_def_warnings", &self.unused_def_warnings)
            .field("default_value_warnings", &self.default_value_warnings)
            .field("def_names", &self.def_names.is_some())
            .field("warning_budget", &self.warning_budget.is_some())
            .finish()
    }
}
