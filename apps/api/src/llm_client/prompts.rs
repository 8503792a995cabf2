// Shared prompt constants and prompt-building utilities.
// Each assistant defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output for structured replies.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Fills `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user text that happens to contain
/// `{draft_text}` stays literal. Braces that do not name a variable (JSON examples
/// inside templates) are copied through unchanged.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = vars.iter().find_map(|(name, value)| {
            tail.strip_prefix(name)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_known_placeholders() {
        let out = render("Hello {name}, you are {age}.", &[("name", "Ada"), ("age", "36")]);
        assert_eq!(out, "Hello Ada, you are 36.");
    }

    #[test]
    fn test_render_keeps_json_braces() {
        let out = render(r#"{"id": 1} idea: {idea}"#, &[("idea", "x")]);
        assert_eq!(out, r#"{"id": 1} idea: x"#);
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let out = render(
            "A:{reference_text} B:{draft_text}",
            &[("reference_text", "{draft_text}"), ("draft_text", "draft")],
        );
        assert_eq!(out, "A:{draft_text} B:draft");
    }

    #[test]
    fn test_render_unknown_placeholder_left_alone() {
        assert_eq!(render("{unknown}", &[("name", "x")]), "{unknown}");
    }
}
