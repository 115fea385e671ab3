//! TwiML messaging response envelope.

/// Content type Twilio expects for a TwiML reply.
pub const CONTENT_TYPE: &str = "application/xml";

/// Escape text for inclusion in an XML element body.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a reply in a `<Response><Message>` envelope.
pub fn message_response(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_envelope() {
        assert_eq!(
            message_response("Memory cleared!"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>Memory cleared!</Message></Response>"
        );
    }

    #[test]
    fn test_escape_xml_special_chars() {
        assert_eq!(
            escape_xml(r#"Fees <R950> & "tips" aren't"#),
            "Fees &lt;R950&gt; &amp; &quot;tips&quot; aren&apos;t"
        );
    }

    #[test]
    fn test_escape_xml_keeps_unicode() {
        assert_eq!(escape_xml("Howzit 😁 *Monday*"), "Howzit 😁 *Monday*");
    }
}
