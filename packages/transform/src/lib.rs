#![deny(clippy::all)]

/**
 * Prefresh Transform - Rust Implementation
 *
 * Dev-server transform stage that wires component-level hot reloading
 * into a bundler pipeline: eligibility filtering, instrumentation
 * dialect selection, marker classification and runtime wrapping.
 */
pub mod classify;
pub mod filter;
pub mod instrument;
pub mod logging;
pub mod plugin;
pub mod wrap;

// Re-exports
pub use classify::{classify, MarkerClassification};
pub use filter::{should_transform, BuildContext, PathFilter};
pub use instrument::{
    parser_plugins_for, InstrumentOptions, InstrumentationError, InstrumentedResult, Instrumenter,
};
pub use plugin::{RefreshPlugin, RefreshPluginOptions};
pub use wrap::{assemble, module_epilogue, module_prelude, EmittedModule, TransformOutcome};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
