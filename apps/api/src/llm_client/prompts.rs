// Cross-cutting prompt fragments. Services that build prompts keep their own
// prompts.rs alongside them.

/// System prompt sent with every provider call.
pub const ANALYST_SYSTEM: &str = "You are an expert at parsing and analyzing \
    hiring documents. When asked for JSON, return valid JSON only, \
    without markdown formatting.";

/// Suffix appended to caller-supplied requests that expect a JSON object back.
pub const JSON_ONLY_SUFFIX: &str = "\n\nRespond with a single valid JSON object and nothing else.";
