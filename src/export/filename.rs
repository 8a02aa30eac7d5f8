/// Sanitize a filename for cross-platform compatibility
/// Removes/replaces characters that are invalid on Windows, macOS, or Linux
pub fn sanitize_filename(name: &str) -> String {
    // Invalid characters for Windows: < > : " / \ | ? *
    // Also remove control characters (0-31)
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if (c as u32) < 0x20 => '_',
            c => c,
        })
        .collect();

    // Trim leading/trailing spaces and dots (problematic on Windows)
    let sanitized = sanitized.trim_matches(|c| c == ' ' || c == '.');

    // Handle reserved Windows names (CON, PRN, AUX, NUL, COM1-9, LPT1-9)
    let upper = sanitized.to_ascii_uppercase();
    let reserved = matches!(
        upper.as_str(),
        "CON" | "PRN" | "AUX" | "NUL"
    ) || (upper.len() == 4
        && (upper.starts_with("COM") || upper.starts_with("LPT"))
        && upper[3..].chars().all(|c| c.is_ascii_digit() && c != '0'));
    if reserved {
        return format!("_{sanitized}");
    }

    // Limit length to 200 bytes (leave room for extensions and numbering)
    let mut sanitized = sanitized.to_string();
    if sanitized.len() > 200 {
        let mut cut = 200;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
    }

    // If empty after sanitization, use a default
    if sanitized.is_empty() {
        "untitled".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_filename("Normal Doc"), "Normal Doc");
        assert_eq!(sanitize_filename("Doc: A Tale"), "Doc_ A Tale");
        assert_eq!(sanitize_filename("Doc/Page"), "Doc_Page");
        assert_eq!(sanitize_filename("Doc\\Page"), "Doc_Page");
        assert_eq!(sanitize_filename("Doc|Page"), "Doc_Page");
    }

    #[test]
    fn test_sanitize_special_chars() {
        assert_eq!(sanitize_filename("Doc<>Test"), "Doc__Test");
        assert_eq!(sanitize_filename("Doc?*Test"), "Doc__Test");
        assert_eq!(sanitize_filename("Doc\"Test"), "Doc_Test");
    }

    #[test]
    fn test_sanitize_reserved() {
        assert_eq!(sanitize_filename("CON"), "_CON");
        assert_eq!(sanitize_filename("con"), "_con");
        assert_eq!(sanitize_filename("COM1"), "_COM1");
        assert_eq!(sanitize_filename("LPT9"), "_LPT9");
        assert_eq!(sanitize_filename("AUX"), "_AUX");
        // Not reserved: COM0, COMX, CONSOLE
        assert_eq!(sanitize_filename("COM0"), "COM0");
        assert_eq!(sanitize_filename("CONSOLE"), "CONSOLE");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename("..."), "untitled");
        assert_eq!(sanitize_filename("   "), "untitled");
        assert_eq!(sanitize_filename(" . "), "untitled");
    }

    #[test]
    fn test_sanitize_trim() {
        assert_eq!(sanitize_filename("  Doc  "), "Doc");
        assert_eq!(sanitize_filename("..Doc.."), "Doc");
    }

    #[test]
    fn test_sanitize_long_name() {
        let long_name = "a".repeat(250);
        let result = sanitize_filename(&long_name);
        assert_eq!(result.len(), 200);
    }

    #[test]
    fn test_sanitize_unicode() {
        assert_eq!(sanitize_filename("Doc 📖 Test"), "Doc 📖 Test");
        assert_eq!(sanitize_filename("日本語"), "日本語");
    }

    #[test]
    fn test_sanitize_control_chars() {
        assert_eq!(sanitize_filename("Doc\x00Test"), "Doc_Test");
        assert_eq!(sanitize_filename("Doc\x1FTest"), "Doc_Test");
    }
}
