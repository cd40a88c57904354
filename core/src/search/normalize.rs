//! Text normalization for names, paths and tags
//!
//! Names are canonicalized before comparison: trimmed, composed to NFC so that
//! combining-mark input and precomposed input compare equal, lowercased, and
//! stripped of every character outside the allowed alphabet.

use unicode_normalization::UnicodeNormalization;

/// Lowercase Vietnamese letters outside ASCII: every vowel with each tone mark, plus đ
const VIETNAMESE_LETTERS: &str = concat!(
    "àáảãạăằắẳẵặâầấẩẫậ",
    "èéẻẽẹêềếểễệ",
    "ìíỉĩị",
    "òóỏõọôồốổỗộơờớởỡợ",
    "ùúủũụưừứửữự",
    "ỳýỷỹỵ",
    "đ",
);

/// Check if a character survives [`normalize_name`]
///
/// Expects an already lowercased character.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || c == '_'
        || c == '-'
        || (!c.is_ascii() && VIETNAMESE_LETTERS.contains(c))
}

/// Check if a character survives [`normalize_path`]
pub fn is_path_char(c: char) -> bool {
    c == '/' || is_name_char(c)
}

/// Normalize a bare name or tag
///
/// Never fails: characters outside the alphabet are dropped.
pub fn normalize_name(text: &str) -> String {
    normalize_with(text, is_name_char)
}

/// Normalize a path-like name, keeping `/` separators
pub fn normalize_path(text: &str) -> String {
    normalize_with(text, is_path_char)
}

fn normalize_with(text: &str, keep: fn(char) -> bool) -> String {
    let composed: String = text.trim().nfc().collect();
    // Lowercasing can decompose (e.g. 'İ'), so compose again before filtering
    composed.to_lowercase().nfc().filter(|c| keep(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_basic() {
        assert_eq!(normalize_name("  Hello World  "), "helloworld");
        assert_eq!(normalize_name("Tag_1-x"), "tag_1-x");
        assert_eq!(normalize_name("a/b.png"), "abpng");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("!!!"), "");
    }

    #[test]
    fn test_normalize_path_keeps_separators() {
        assert_eq!(normalize_path(" Banners/Summer Hero.PNG "), "banners/summerheropng");
        assert_eq!(normalize_path("a//b"), "a//b");
    }

    #[test]
    fn test_vietnamese_letters_survive() {
        assert_eq!(normalize_name("Đường Phố"), "đườngphố");
        assert_eq!(normalize_name("HỌC SINH"), "họcsinh");
        assert_eq!(normalize_name("Ảnh_Đẹp"), "ảnh_đẹp");
    }

    #[test]
    fn test_combining_forms_match_precomposed() {
        // "ệ" written as e + circumflex + dot below
        let decomposed = "Vi\u{0065}\u{0302}\u{0323}t";
        let precomposed = "Việt";
        assert_eq!(normalize_name(decomposed), normalize_name(precomposed));
        assert_eq!(normalize_name(decomposed), "việt");
    }

    #[test]
    fn test_unsupported_marks_are_dropped() {
        // q has no precomposed acute form, so the mark is stripped
        assert_eq!(normalize_name("q\u{0301}"), "q");
        assert_eq!(normalize_name("naïve"), "nave");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "  Mixed CASE name ",
            "Đường/Phố.jpg",
            "e\u{0301}te\u{0301}",
            "İstanbul",
            "tag, with; symbols!",
            "",
            "___--",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "name: {input:?}");
            let once = normalize_path(input);
            assert_eq!(normalize_path(&once), once, "path: {input:?}");
        }
    }

    #[test]
    fn test_allowed_text_only_lowercases() {
        for input in ["ABC_def-09", "ĐẸP", "Thành_Phố", "x"] {
            assert_eq!(normalize_name(input), input.to_lowercase());
        }
    }
}
