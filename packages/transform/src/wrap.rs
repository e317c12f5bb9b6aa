//! Wrapper Assembler
//!
//! Produces the final emitted module from the marker classification: a
//! fixed runtime prelude, the instrumented body and, for fully registered
//! modules, an epilogue that restores the previous global hooks and wires
//! the update-acceptance callback into the hot context.
//!
//! The generated hook protocol (`$RefreshReg$`/`$RefreshSig$` slots, the
//! `__PREFRESH__` registry operations, `<file id> <local id>` composite
//! keys) is an external runtime contract and is emitted verbatim.

use crate::classify::MarkerClassification;
use crate::instrument::InstrumentedResult;

/// Final output handed back to the bundler for one module.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedModule {
    pub code: String,
    pub map: Option<serde_json::Value>,
}

/// Result of one transform invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome {
    /// The file is not a candidate; the host leaves the module untouched.
    Skipped,
    /// Instrumentation found no reloadable unit; the original source
    /// passes through unchanged and the rewrite output is discarded.
    Passthrough(String),
    /// Instrumented and wrapped module.
    Emitted(EmittedModule),
}

const PRELUDE_HEAD: &str = r#"import '@prefresh/vite/runtime';
import { flushUpdates } from '@prefresh/vite/utils';

let prevRefreshReg;
let prevRefreshSig;

if (import.meta.hot) {
  prevRefreshReg = self.$RefreshReg$ || (() => {});
  prevRefreshSig = self.$RefreshSig$ || (() => (type) => type);

  self.$RefreshReg$ = (type, id) => {
    self.__PREFRESH__.register(type, "#;

const PRELUDE_TAIL: &str = r#" + " " + id);
  };

  self.$RefreshSig$ = () => {
    let status = 'begin';
    let savedType;
    return (type, key, forceReset, getCustomHooks) => {
      if (!savedType) savedType = type;
      status = self.__PREFRESH__.sign(type || savedType, key, forceReset, getCustomHooks, status);
      return type;
    };
  };
}
"#;

const EPILOGUE: &str = r#"if (import.meta.hot) {
  self.$RefreshReg$ = prevRefreshReg;
  self.$RefreshSig$ = prevRefreshSig;
  import.meta.hot.accept((m) => {
    try {
      flushUpdates();
    } catch (e) {
      self.location.reload();
    }
  });
}
"#;

/// Runtime prelude prepended to every instrumented module.
///
/// Imports the refresh runtime and the flush utility, then, under an
/// active hot context, saves the previous global hook bindings and
/// installs replacements. The registration hook forwards to the registry
/// under a composite key built from the JSON-escaped file id and the
/// rewrite-supplied local id; the signature hook threads an opaque status
/// token through the registry's `sign` operation, starting from `'begin'`
/// and keeping the first type it saw.
pub fn module_prelude(file_id: &str) -> String {
    // JSON escaping makes the file id a valid JS string literal.
    let file_key = serde_json::Value::from(file_id).to_string();
    format!("{}{}{}", PRELUDE_HEAD, file_key, PRELUDE_TAIL)
}

/// Runtime epilogue appended to fully registered modules.
///
/// Restores the previous global hooks before registering the acceptance
/// callback, so this module's hooks cannot clobber modules initialized
/// after it. The callback flushes pending updates and degrades to a full
/// page reload when the flush throws.
pub fn module_epilogue() -> &'static str {
    EPILOGUE
}

/// Assemble the emitted module for one classification outcome.
///
/// `None` discards the instrumented output entirely; `SignatureOnly` gets
/// the prelude without an acceptance epilogue; `Full` gets both.
pub fn assemble(
    classification: MarkerClassification,
    instrumented: InstrumentedResult,
    original_source: &str,
    file_id: &str,
) -> TransformOutcome {
    match classification {
        MarkerClassification::None => TransformOutcome::Passthrough(original_source.to_string()),
        MarkerClassification::SignatureOnly => TransformOutcome::Emitted(EmittedModule {
            code: format!("{}\n{}", module_prelude(file_id), instrumented.code),
            map: instrumented.map,
        }),
        MarkerClassification::Full => TransformOutcome::Emitted(EmittedModule {
            code: format!(
                "{}\n{}\n{}",
                module_prelude(file_id),
                instrumented.code,
                module_epilogue()
            ),
            map: instrumented.map,
        }),
    }
}
