//! Eligibility Filter
//!
//! Decides whether a module is a candidate for refresh instrumentation
//! at all. Every check here is a pure predicate over the file id and the
//! build context; ineligible files are left for the rest of the pipeline
//! untouched.

use glob::{Pattern, PatternError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the transformable source suffixes: `.js`, `.jsx`, `.ts`, `.tsx`.
static TRANSFORM_TARGET_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[tj]sx?$").unwrap());

/// Dependency directory segment; third-party modules are never instrumented.
const DEPENDENCY_DIR_SEGMENT: &str = "node_modules";

/// Query marker for worker modules, which have no hot context to wire into.
const WORKER_QUERY_MARKER: &str = "?worker";

/// Process-wide build-mode state, resolved once per build session from the
/// host's command/production pair and read on every transform call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildContext {
    /// When set, the transform stage is disabled for the whole session.
    pub skip_transformation: bool,
}

impl BuildContext {
    /// Resolve the context from the host's build-mode signal. Production
    /// output and one-shot build commands never carry refresh wiring.
    pub fn resolve(is_build_command: bool, is_production: bool) -> Self {
        Self {
            skip_transformation: is_build_command || is_production,
        }
    }
}

/// Include/exclude predicate over file ids, compiled from glob-style
/// pattern strings. Exclude patterns win over include patterns; an empty
/// include list accepts everything.
#[derive(Debug, Default)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, PatternError> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    /// Whether the filter accepts the given file id.
    pub fn accepts(&self, file_id: &str) -> bool {
        if self.exclude.iter().any(|p| p.matches(file_id)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(file_id))
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, PatternError> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

/// Whether the file id carries a transformable source suffix
/// (case-sensitive).
pub fn has_transform_target_suffix(file_id: &str) -> bool {
    TRANSFORM_TARGET_REGEXP.is_match(file_id)
}

/// Gate for the whole transform stage.
///
/// Returns `false` when the build context disables the stage, the file id
/// has no transformable suffix, the id points into a dependency directory,
/// the id is a worker module, the path filter rejects it, or the module is
/// being transformed for server-side rendering.
pub fn should_transform(
    file_id: &str,
    context: &BuildContext,
    ssr: bool,
    path_filter: &PathFilter,
) -> bool {
    if context.skip_transformation
        || !has_transform_target_suffix(file_id)
        || file_id.contains(DEPENDENCY_DIR_SEGMENT)
        || file_id.contains(WORKER_QUERY_MARKER)
        || !path_filter.accepts(file_id)
        || ssr
    {
        return false;
    }
    true
}
