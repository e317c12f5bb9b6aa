//! Transform Pipeline Tests
//!
//! End-to-end coverage of the plugin pipeline with a mock
//! instrumentation service standing in for the external rewrite.

use std::cell::RefCell;

use pretty_assertions::assert_eq;

use prefresh_transform::instrument::{
    InstrumentOptions, InstrumentationError, InstrumentedResult, Instrumenter,
};
use prefresh_transform::plugin::{RefreshPlugin, RefreshPluginOptions};
use prefresh_transform::wrap::TransformOutcome;
use serde_json::json;

/// Instrumenter double that appends configured marker call sites to the
/// source, the way the real rewrite appends them after declarations.
struct MockInstrumenter {
    appended_markers: &'static str,
}

impl MockInstrumenter {
    fn inert() -> Self {
        Self {
            appended_markers: "",
        }
    }

    fn signing() -> Self {
        Self {
            appended_markers: "\nvar _s = $RefreshSig$();\n",
        }
    }

    fn registering() -> Self {
        Self {
            appended_markers: "\nvar _s = $RefreshSig$();\n_c = App;\n$RefreshReg$(_c, \"App\");\n",
        }
    }
}

impl Instrumenter for MockInstrumenter {
    fn instrument(
        &self,
        source_code: &str,
        _options: &InstrumentOptions,
    ) -> Result<InstrumentedResult, InstrumentationError> {
        Ok(InstrumentedResult {
            code: format!("{}{}", source_code, self.appended_markers),
            map: Some(json!({ "version": 3, "mappings": "" })),
        })
    }
}

/// Instrumenter double that records the options it was invoked with.
struct RecordingInstrumenter {
    seen: RefCell<Vec<InstrumentOptions>>,
}

impl RecordingInstrumenter {
    fn new() -> Self {
        Self {
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Instrumenter for RecordingInstrumenter {
    fn instrument(
        &self,
        source_code: &str,
        options: &InstrumentOptions,
    ) -> Result<InstrumentedResult, InstrumentationError> {
        self.seen.borrow_mut().push(options.clone());
        Ok(InstrumentedResult {
            code: source_code.to_string(),
            map: None,
        })
    }
}

/// Instrumenter double that must never be reached.
struct UnreachableInstrumenter;

impl Instrumenter for UnreachableInstrumenter {
    fn instrument(
        &self,
        _source_code: &str,
        options: &InstrumentOptions,
    ) -> Result<InstrumentedResult, InstrumentationError> {
        panic!(
            "instrumenter invoked for ineligible file {}",
            options.source_file_name
        );
    }
}

/// Instrumenter double that fails like a syntax error in the rewrite.
struct FailingInstrumenter;

impl Instrumenter for FailingInstrumenter {
    fn instrument(
        &self,
        _source_code: &str,
        options: &InstrumentOptions,
    ) -> Result<InstrumentedResult, InstrumentationError> {
        Err(InstrumentationError::Parse {
            file_id: options.source_file_name.clone(),
            line: 1,
            column: 5,
            message: "Unexpected token".to_string(),
        })
    }
}

fn plugin() -> RefreshPlugin {
    RefreshPlugin::new(RefreshPluginOptions::default()).unwrap()
}

#[test]
fn should_pass_marker_free_modules_through_verbatim() {
    let source = "export const x = 1;";

    let outcome = plugin()
        .transform(source, "/src/constants.js", false, &MockInstrumenter::inert())
        .unwrap();

    assert_eq!(outcome, TransformOutcome::Passthrough(source.to_string()));
}

#[test]
fn should_wrap_hook_helpers_with_prelude_only() {
    let source = "export function useCounter() { return useState(0); }";

    let outcome = plugin()
        .transform(source, "/src/hooks.js", false, &MockInstrumenter::signing())
        .unwrap();

    let module = match outcome {
        TransformOutcome::Emitted(module) => module,
        other => panic!("expected emitted module, got {:?}", other),
    };

    assert!(module.code.contains("import '@prefresh/vite/runtime';"));
    assert!(module.code.contains(source));
    assert!(!module.code.contains("import.meta.hot.accept"));
}

#[test]
fn should_wrap_registered_components_with_full_lifecycle() {
    let source = "export function App() { return h(\"div\", null); }";

    let outcome = plugin()
        .transform(
            source,
            "/src/App.jsx",
            false,
            &MockInstrumenter::registering(),
        )
        .unwrap();

    let module = match outcome {
        TransformOutcome::Emitted(module) => module,
        other => panic!("expected emitted module, got {:?}", other),
    };

    let prelude_at = module.code.find("import '@prefresh/vite/runtime';").unwrap();
    let body_at = module.code.find(source).unwrap();
    let accept_at = module.code.find("import.meta.hot.accept(").unwrap();
    assert!(prelude_at < body_at);
    assert!(body_at < accept_at);
    assert!(module.code.contains(r#""/src/App.jsx" + " " + id"#));
    assert_eq!(module.map, Some(json!({ "version": 3, "mappings": "" })));
}

#[test]
fn should_skip_ineligible_files_without_invoking_the_instrumenter() {
    let plugin = plugin();

    let css = plugin
        .transform("body {}", "/src/styles.css", false, &UnreachableInstrumenter)
        .unwrap();
    assert_eq!(css, TransformOutcome::Skipped);

    let vendored = plugin
        .transform(
            "export default 1;",
            "/node_modules/preact/compat.js",
            false,
            &UnreachableInstrumenter,
        )
        .unwrap();
    assert_eq!(vendored, TransformOutcome::Skipped);

    let ssr = plugin
        .transform("export default 1;", "/src/App.jsx", true, &UnreachableInstrumenter)
        .unwrap();
    assert_eq!(ssr, TransformOutcome::Skipped);
}

#[test]
fn should_skip_everything_after_build_or_production_configuration() {
    let mut plugin = plugin();
    plugin.config_resolved(true, false);

    let outcome = plugin
        .transform(
            "export default 1;",
            "/src/App.jsx",
            false,
            &UnreachableInstrumenter,
        )
        .unwrap();

    assert_eq!(outcome, TransformOutcome::Skipped);
}

#[test]
fn should_request_typed_syntax_only_for_typed_sources() {
    let plugin = plugin();
    let instrumenter = RecordingInstrumenter::new();

    plugin
        .transform("export default 1;", "/src/App.tsx", false, &instrumenter)
        .unwrap();
    plugin
        .transform("export default 1;", "/src/App.jsx", false, &instrumenter)
        .unwrap();

    let seen = instrumenter.seen.borrow();
    assert!(seen[0].parser_plugins.contains(&"typescript".to_string()));
    assert!(!seen[1].parser_plugins.contains(&"typescript".to_string()));
}

#[test]
fn should_build_the_service_call_shape_for_each_file() {
    let plugin = RefreshPlugin::new(RefreshPluginOptions {
        parser_plugins: vec!["decorators".to_string(), "jsx".to_string()],
        ..Default::default()
    })
    .unwrap();
    let instrumenter = RecordingInstrumenter::new();

    plugin
        .transform("export default 1;", "/src/App.tsx", false, &instrumenter)
        .unwrap();

    let seen = instrumenter.seen.borrow();
    let options = &seen[0];
    assert_eq!(options.source_file_name, "/src/App.tsx");
    assert!(options.source_maps);
    assert!(options.skip_env_check);
    // Base dialect, typed extension, then extras verbatim (duplicates kept).
    assert_eq!(
        options.parser_plugins,
        vec![
            "jsx",
            "classProperties",
            "classPrivateProperties",
            "classPrivateMethods",
            "typescript",
            "decorators",
            "jsx",
        ]
    );
}

#[test]
fn should_propagate_instrumentation_failures_to_the_host() {
    let err = plugin()
        .transform("const = ;", "/src/broken.jsx", false, &FailingInstrumenter)
        .unwrap_err();

    assert_eq!(
        err,
        InstrumentationError::Parse {
            file_id: "/src/broken.jsx".to_string(),
            line: 1,
            column: 5,
            message: "Unexpected token".to_string(),
        }
    );
    assert_eq!(err.to_string(), "/src/broken.jsx:1:5: Unexpected token");
}

#[test]
fn should_honor_include_and_exclude_options() {
    let plugin = RefreshPlugin::new(RefreshPluginOptions {
        include: vec!["*.jsx".to_string()],
        exclude: vec!["*.stories.jsx".to_string()],
        ..Default::default()
    })
    .unwrap();

    assert!(plugin.is_eligible("app.jsx", false));
    assert!(!plugin.is_eligible("app.stories.jsx", false));
    assert!(!plugin.is_eligible("app.tsx", false));
}

#[test]
fn should_parse_host_options_from_camel_case_json() {
    let options: RefreshPluginOptions = serde_json::from_str(
        r#"{ "include": ["src/**"], "exclude": [], "parserPlugins": ["decorators"] }"#,
    )
    .unwrap();

    assert_eq!(options.include, vec!["src/**"]);
    assert!(options.exclude.is_empty());
    assert_eq!(options.parser_plugins, vec!["decorators"]);
}

#[test]
fn should_reject_malformed_filter_patterns_at_construction() {
    let result = RefreshPlugin::new(RefreshPluginOptions {
        include: vec!["src/[".to_string()],
        ..Default::default()
    });

    assert!(result.is_err());
}

#[test]
fn should_report_a_stable_stage_name() {
    assert_eq!(plugin().name(), "prefresh");
}
