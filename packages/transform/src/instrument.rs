//! Instrumentation Adapter
//!
//! Boundary to the external code-instrumentation service that rewrites
//! component-like declarations into registration/signature call sites.
//! This module only translates pipeline inputs into the service's call
//! shape; the rewrite itself lives behind the [`Instrumenter`] trait.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Matches typed-source suffixes (`.ts`, `.tsx`).
static TYPED_SOURCE_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.tsx?$").unwrap());

/// Component syntax extension, always enabled.
pub const PLUGIN_JSX: &str = "jsx";
/// Class field syntax extensions, always enabled.
pub const PLUGIN_CLASS_PROPERTIES: &str = "classProperties";
pub const PLUGIN_CLASS_PRIVATE_PROPERTIES: &str = "classPrivateProperties";
pub const PLUGIN_CLASS_PRIVATE_METHODS: &str = "classPrivateMethods";
/// Typed syntax extension, enabled only for typed sources.
pub const PLUGIN_TYPESCRIPT: &str = "typescript";

/// Rewritten module produced by the instrumentation service: position
/// preserving output plus an opaque position map for the host's debugger.
#[derive(Debug, Clone)]
pub struct InstrumentedResult {
    pub code: String,
    pub map: Option<serde_json::Value>,
}

/// Call shape handed to the instrumentation service for one module.
#[derive(Debug, Clone)]
pub struct InstrumentOptions {
    /// File id the rewrite reports positions against.
    pub source_file_name: String,
    /// Ordered syntax-extension names selecting the parse dialect.
    pub parser_plugins: Vec<String>,
    /// A position map must be produced alongside the rewritten text.
    pub source_maps: bool,
    /// The rewrite must not probe the environment; eligibility has already
    /// been decided by the filter stage.
    pub skip_env_check: bool,
}

impl InstrumentOptions {
    /// Build the options for one file: dialect derived from the file id
    /// plus any caller-supplied extensions.
    pub fn for_file(file_id: &str, extra_plugins: &[String]) -> Self {
        Self {
            source_file_name: file_id.to_string(),
            parser_plugins: parser_plugins_for(file_id, extra_plugins),
            source_maps: true,
            skip_env_check: true,
        }
    }
}

/// Syntax dialect selection.
///
/// Component and class-field syntax are always on; the typed-syntax
/// extension is added for `.ts`/`.tsx` ids; caller-supplied names are
/// appended verbatim, without de-duplication.
pub fn parser_plugins_for(file_id: &str, extra_plugins: &[String]) -> Vec<String> {
    let mut plugins = vec![
        PLUGIN_JSX.to_string(),
        PLUGIN_CLASS_PROPERTIES.to_string(),
        PLUGIN_CLASS_PRIVATE_PROPERTIES.to_string(),
        PLUGIN_CLASS_PRIVATE_METHODS.to_string(),
    ];
    if TYPED_SOURCE_REGEXP.is_match(file_id) {
        plugins.push(PLUGIN_TYPESCRIPT.to_string());
    }
    plugins.extend(extra_plugins.iter().cloned());
    plugins
}

/// Failure of the external instrumentation service. Propagates to the
/// host bundler unmodified; no partial output is emitted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstrumentationError {
    /// The input could not be parsed under the selected dialect.
    #[error("{file_id}:{line}:{column}: {message}")]
    Parse {
        file_id: String,
        line: u32,
        column: u32,
        message: String,
    },
    /// The rewrite itself failed without a source position.
    #[error("{file_id}: {message}")]
    Transform { file_id: String, message: String },
}

/// External code-instrumentation service.
///
/// Implementations rewrite component-like declarations into
/// `$RefreshReg$`/`$RefreshSig$` call sites. The returned code must be
/// position-preserving source text, never an AST-only result.
pub trait Instrumenter {
    fn instrument(
        &self,
        source_code: &str,
        options: &InstrumentOptions,
    ) -> Result<InstrumentedResult, InstrumentationError>;
}
