//! Prompt-injection screening for inbound messages.
//!
//! Flags patterns used to hijack model behavior:
//! - Role impersonation tags
//! - Action markers typed by the customer
//! - Instruction override attempts
//!
//! Text is never rewritten; the history keeps exactly what was sent.

/// Inspect user input and describe every suspicious pattern found.
///
/// An empty result means nothing was flagged.
pub fn scan(input: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let role_tags = [
        "[System]",
        "[SYSTEM]",
        "[Assistant]",
        "[ASSISTANT]",
        "<|system|>",
        "<|assistant|>",
        "<|im_start|>",
        "<|im_end|>",
        "<<SYS>>",
        "<</SYS>>",
        "### System:",
    ];

    for tag in &role_tags {
        if input.contains(tag) {
            warnings.push(format!("role tag: {tag}"));
        }
    }

    // Markers are upper-case literals.
    if input.contains("ACTION_") {
        warnings.push("action marker in user text".to_string());
    }

    let override_phrases = [
        "ignore all previous instructions",
        "ignore your instructions",
        "ignore the above",
        "disregard all previous",
        "forget your instructions",
        "new instructions:",
        "override system prompt",
        "your new role is",
        "system prompt:",
    ];

    let lower = input.to_lowercase();
    for phrase in &override_phrases {
        if lower.contains(phrase) {
            warnings.push(format!("override attempt: \"{phrase}\""));
        }
    }

    warnings
}
