//! Marker Classifier
//!
//! Inspects instrumented output for the two marker call forms and reduces
//! them to a closed classification, so the assembler's state machine never
//! re-tests raw text.

/// Registration marker call site inserted by the instrumentation service.
pub const REGISTRATION_MARKER: &str = "$RefreshReg$(";

/// Signature marker call site inserted by the instrumentation service.
pub const SIGNATURE_MARKER: &str = "$RefreshSig$(";

/// Which instrumentation markers are present in a rewritten module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerClassification {
    /// No markers; the module defines no reloadable unit and must pass
    /// through unmodified.
    None,
    /// Signature calls only (e.g. a module exporting hook-producing
    /// helpers). Installing an acceptance handler here would force a full
    /// reload on every edit, so such modules get the prelude only.
    SignatureOnly,
    /// Registration calls present; the module gets the full
    /// register/accept lifecycle.
    Full,
}

/// Classify instrumented output by literal marker search.
///
/// Registration wins over signature: a module containing both forms is
/// always `Full`, regardless of marker order in the text.
pub fn classify(instrumented_code: &str) -> MarkerClassification {
    let has_registration = instrumented_code.contains(REGISTRATION_MARKER);
    let has_signature = instrumented_code.contains(SIGNATURE_MARKER);

    if has_registration {
        MarkerClassification::Full
    } else if has_signature {
        MarkerClassification::SignatureOnly
    } else {
        MarkerClassification::None
    }
}
