use ammonia;

/// Clean free-text fields using the ammonia library.
///
/// Whitelist-based sanitization: safe tags (like <b>, <p>) survive,
/// dangerous tags (<script>, <iframe>) and attributes (onclick) are
/// stripped. Question text, option text and user bios pass through here
/// before they are stored, since other users will see them.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_html("What is <script>alert(1)</script>Rust?");
        assert!(!cleaned.contains("script"));
        assert!(cleaned.contains("Rust?"));
    }
}
