//! File extension to highlighting language names.

/// Extensions whose highlighter name differs from the extension itself.
const EXT_TO_LANG: &[(&str, &str)] = &[
    ("as", "actionscript3"),
    ("bas", "gwbasic"),
    ("h", "c"),
    ("hpp", "cpp"),
    ("hs", "haskell"),
    ("htm", "html5"),
    ("html", "html5"),
    ("js", "javascript"),
    ("pas", "pascal"),
    ("pl", "perl6"),
    ("py", "python"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("yml", "yaml"),
];

/// Language name for `extension`; unknown extensions are returned verbatim.
pub fn language_for(extension: &str) -> &str {
    EXT_TO_LANG
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map_or(extension, |(_, lang)| *lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_extensions() {
        assert_eq!(language_for("py"), "python");
        assert_eq!(language_for("h"), "c");
        assert_eq!(language_for("yml"), "yaml");
        assert_eq!(language_for("htm"), "html5");
    }

    #[test]
    fn test_unknown_extension_is_verbatim() {
        assert_eq!(language_for("rs"), "rs");
        assert_eq!(language_for("php"), "php");
        assert_eq!(language_for(""), "");
    }
}
