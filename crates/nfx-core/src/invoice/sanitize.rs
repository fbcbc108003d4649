//! Stripping conversational wrapping from model replies.

/// Return the span from the first `{` to the last `}` inclusive.
///
/// Replies such as `Here you go: {...} Anything else?` become `{...}`.
/// When either brace is missing, or the last `}` comes before the first `{`,
/// the reply is returned unchanged. Braces are not balanced or repaired.
pub fn sanitize_reply(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_commentary() {
        assert_eq!(
            sanitize_reply(r#"Sure! Here you go: {"numero_nf":"7"} Hope that helps."#),
            r#"{"numero_nf":"7"}"#
        );
    }

    #[test]
    fn test_markdown_fence() {
        let raw = "```json\n{\"numero_nf\": \"1\", \"itens\": [{\"descricao\": \"x\"}]}\n```";
        assert_eq!(
            sanitize_reply(raw),
            "{\"numero_nf\": \"1\", \"itens\": [{\"descricao\": \"x\"}]}"
        );
    }

    #[test]
    fn test_without_braces_unchanged() {
        assert_eq!(sanitize_reply("no json here"), "no json here");
        assert_eq!(sanitize_reply("only { open"), "only { open");
        assert_eq!(sanitize_reply("only } close"), "only } close");
        assert_eq!(sanitize_reply(""), "");
    }

    #[test]
    fn test_reversed_braces_unchanged() {
        assert_eq!(sanitize_reply("} backwards {"), "} backwards {");
    }

    #[test]
    fn test_multibyte_surroundings() {
        assert_eq!(sanitize_reply("Aqui está: {\"a\":\"ção\"} é isso"), "{\"a\":\"ção\"}");
    }

    #[test]
    fn test_already_clean() {
        let clean = r#"{"numero_nf":"123"}"#;
        assert_eq!(sanitize_reply(clean), clean);
    }
}
