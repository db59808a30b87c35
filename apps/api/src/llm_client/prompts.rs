// Cross-cutting prompt fragments for the LLM client.
// Task templates live in analysis::catalog; this file only holds what every call shares.

/// System instruction sent with every analysis and chat request.
pub const ANALYZER_SYSTEM: &str = "\
You are a professional resume analyzer and career counselor.
Provide detailed, actionable feedback. Use clear formatting with bullet points.
For strengths, start bullet points with [STRENGTH].
For weaknesses, start bullet points with [WEAKNESS].
Be specific and provide concrete examples.";

/// Marker the model is told to put in front of strengths.
pub const STRENGTH_TAG: &str = "[STRENGTH]";

/// Marker the model is told to put in front of weaknesses.
pub const WEAKNESS_TAG: &str = "[WEAKNESS]";

/// Message used by the startup reachability probe.
pub const PROBE_MESSAGE: &str = "Hello";
