//! Refresh Plugin
//!
//! Ties the pipeline stages together the way the host bundler drives
//! them: configuration resolution, then one synchronous `transform` per
//! module. Filter gates entry, the adapter produces instrumented code,
//! the classifier reads it and the assembler emits the final module.

use glob::PatternError;
use serde::Deserialize;

use crate::classify::classify;
use crate::filter::{should_transform, BuildContext, PathFilter};
use crate::instrument::{
    parser_plugins_for, InstrumentOptions, InstrumentationError, Instrumenter,
};
use crate::logging::{Logger, NullLogger};
use crate::wrap::{assemble, TransformOutcome};

/// Stage name reported to the host.
pub const PLUGIN_NAME: &str = "prefresh";

/// Host-facing plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshPluginOptions {
    /// Glob patterns of file ids to include; empty means all.
    pub include: Vec<String>,
    /// Glob patterns of file ids to exclude; wins over `include`.
    pub exclude: Vec<String>,
    /// Extra syntax-extension names forwarded verbatim to the
    /// instrumentation service.
    pub parser_plugins: Vec<String>,
}

/// Per-build-session transform stage.
pub struct RefreshPlugin {
    path_filter: PathFilter,
    parser_plugins: Vec<String>,
    context: BuildContext,
    logger: Box<dyn Logger>,
}

impl RefreshPlugin {
    /// Create the plugin, compiling the include/exclude filter. Fails on
    /// a malformed glob pattern.
    pub fn new(options: RefreshPluginOptions) -> Result<Self, PatternError> {
        Ok(Self {
            path_filter: PathFilter::new(&options.include, &options.exclude)?,
            parser_plugins: options.parser_plugins,
            context: BuildContext::default(),
            logger: Box::new(NullLogger::new()),
        })
    }

    /// Replace the default null logger.
    pub fn with_logger(mut self, logger: Box<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Stage name for host diagnostics.
    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Resolve the build context. The host calls this exactly once, when
    /// its configuration is final and before any module is transformed.
    pub fn config_resolved(&mut self, is_build_command: bool, is_production: bool) {
        self.context = BuildContext::resolve(is_build_command, is_production);
    }

    /// Whether a module would be transformed at all.
    pub fn is_eligible(&self, file_id: &str, ssr: bool) -> bool {
        should_transform(file_id, &self.context, ssr, &self.path_filter)
    }

    /// Syntax dialect the instrumentation service must parse this file
    /// with.
    pub fn parser_plugins_for_file(&self, file_id: &str) -> Vec<String> {
        parser_plugins_for(file_id, &self.parser_plugins)
    }

    /// Transform one module.
    ///
    /// Ineligible files are skipped without touching the instrumenter;
    /// instrumentation failures propagate to the host as build errors.
    pub fn transform(
        &self,
        source_code: &str,
        file_id: &str,
        ssr: bool,
        instrumenter: &dyn Instrumenter,
    ) -> Result<TransformOutcome, InstrumentationError> {
        if !self.is_eligible(file_id, ssr) {
            self.logger.debug(&format!("skipping {}", file_id));
            return Ok(TransformOutcome::Skipped);
        }

        let options = InstrumentOptions::for_file(file_id, &self.parser_plugins);
        let instrumented = instrumenter.instrument(source_code, &options)?;

        let classification = classify(&instrumented.code);
        self.logger
            .debug(&format!("{}: {:?} markers", file_id, classification));

        Ok(assemble(classification, instrumented, source_code, file_id))
    }
}
