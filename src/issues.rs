//! Diagnostic types for extraction results.
//!
//! Every problem found while compiling a file is a [`Diagnostic`]. Errors block
//! emission of the translation unit they belong to; warnings are advisory.
//! Diagnostics are always collected into lists, never thrown, so one bad marker
//! or one bad file does not stop analysis of everything else.

use indexmap::IndexSet;

use crate::core::SourceLocation;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
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

/// Rule identifier for each diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// Dynamic expression used as translatable content without a variable component.
    UnwrappedExpression,
    /// `id`, `context` or `maxChars` bound to something that isn't static.
    InvalidMetadata,
    /// `<Static>` child that is neither whitespace nor a function invocation.
    InvalidStaticChild,
    /// Function used inside `<Static>` returns something that can't be inlined.
    InvalidStaticReturn,
    /// Function used inside `<Static>` eventually calls itself.
    RecursiveStaticCall,
    /// Translation marker nested inside another marker.
    NestedMarker,
    /// Function used inside `<Static>` could not be located.
    UnresolvedFunction,
    /// String passed to a translation call is not valid ICU MessageFormat.
    InvalidIcu,
    /// String translation call with content that could change at runtime.
    DynamicString,
    /// File could not be read or parsed.
    ParseError,
}

impl Rule {
    pub fn severity(self) -> Severity {
        match self {
            Rule::NestedMarker | Rule::UnresolvedFunction => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::UnwrappedExpression => write!(f, "unwrapped-expression"),
            Rule::InvalidMetadata => write!(f, "invalid-metadata"),
            Rule::InvalidStaticChild => write!(f, "invalid-static-child"),
            Rule::InvalidStaticReturn => write!(f, "invalid-static-return"),
            Rule::RecursiveStaticCall => write!(f, "recursive-static-call"),
            Rule::NestedMarker => write!(f, "nested-marker"),
            Rule::UnresolvedFunction => write!(f, "unresolved-function"),
            Rule::InvalidIcu => write!(f, "invalid-icu"),
            Rule::DynamicString => write!(f, "dynamic-string"),
            Rule::ParseError => write!(f, "parse-error"),
        }
    }
}

// ============================================================
// Diagnostic
// ============================================================

/// A single problem found during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: Severity,
    pub rule: Rule,
    pub location: SourceLocation,
    pub message: String,
    /// The source line containing `location`, for display.
    pub source_line: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic whose severity is implied by its rule.
    pub fn new(rule: Rule, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity: rule.severity(),
            rule,
            location,
            message: message.into(),
            source_line: None,
        }
    }

    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

// ============================================================
// Diagnostics
// ============================================================

/// Errors in the order they were found, warnings de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: IndexSet<Diagnostic>,
}

impl Diagnostics {
    /// File the diagnostic by its severity.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.insert(diagnostic);
        }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
