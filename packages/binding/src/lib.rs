#![deny(clippy::all)]

use napi_derive::napi;

use prefresh_transform::classify::classify;
use prefresh_transform::instrument::InstrumentedResult;
use prefresh_transform::plugin::{RefreshPlugin, RefreshPluginOptions};
use prefresh_transform::wrap::{assemble, TransformOutcome};

/// Emitted module handed back to the bundler.
#[napi(object)]
pub struct TransformOutput {
    pub code: String,
    /// Position map as a JSON string, untouched from the instrumenter.
    pub map: Option<String>,
}

#[napi]
pub struct RefreshTransform {
    plugin: RefreshPlugin,
}

#[napi]
impl RefreshTransform {
    /// Create the transform stage. `options` is a JSON object string with
    /// optional `include`, `exclude` and `parserPlugins` arrays.
    #[napi(constructor)]
    pub fn new(options: Option<String>) -> napi::Result<Self> {
        let options = match options {
            Some(raw) => serde_json::from_str::<RefreshPluginOptions>(&raw)
                .map_err(|e| napi::Error::from_reason(format!("Invalid options: {}", e)))?,
            None => RefreshPluginOptions::default(),
        };

        let plugin = RefreshPlugin::new(options)
            .map_err(|e| napi::Error::from_reason(format!("Invalid filter pattern: {}", e)))?;

        Ok(RefreshTransform { plugin })
    }

    /// Forward the host's resolved configuration. Must be called once,
    /// before any transform.
    #[napi]
    pub fn config_resolved(&mut self, command: String, is_production: bool) {
        self.plugin.config_resolved(command == "build", is_production);
    }

    /// Whether the module should go through instrumentation at all.
    #[napi]
    pub fn should_transform(&self, id: String, ssr: bool) -> bool {
        self.plugin.is_eligible(&id, ssr)
    }

    /// Syntax-extension names the host must parse this module with when
    /// running the instrumentation service.
    #[napi]
    pub fn parser_plugins(&self, id: String) -> Vec<String> {
        self.plugin.parser_plugins_for_file(&id)
    }

    /// Classify the instrumented output and wrap it with the runtime
    /// prelude/epilogue. Returns `null` when the module has no markers,
    /// in which case the host keeps the original source.
    #[napi]
    pub fn finalize(
        &self,
        source: String,
        instrumented_code: String,
        map: Option<String>,
        id: String,
    ) -> napi::Result<Option<TransformOutput>> {
        let map = match map {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .map_err(|e| napi::Error::from_reason(format!("Invalid source map: {}", e)))?,
            ),
            None => None,
        };

        let instrumented = InstrumentedResult {
            code: instrumented_code,
            map,
        };

        let classification = classify(&instrumented.code);
        match assemble(classification, instrumented, &source, &id) {
            TransformOutcome::Emitted(module) => Ok(Some(TransformOutput {
                code: module.code,
                map: module.map.map(|m| m.to_string()),
            })),
            _ => Ok(None),
        }
    }
}
