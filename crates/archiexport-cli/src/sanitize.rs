//! Filesystem-safe view names

use std::path::{Path, PathBuf};

use archiexport_render::OutputFormat;

/// Replace every character outside ASCII `[A-Za-z0-9]` with `_`
///
/// Length is counted in UTF-16 code units, the way Archi's scripting
/// engine measures strings: a character outside the Basic Multilingual
/// Plane (most emoji) becomes `__`. Distinct names can map to the same
/// result (`"Layer 1"` and `"Layer_1"`).
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.extend(std::iter::repeat('_').take(c.len_utf16()));
        }
    }
    out
}

/// `<dir>/<file_stem>.<ext>`
pub fn output_path(dir: &Path, file_stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", file_stem, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize_name("Layer 1"), "Layer_1");
        assert_eq!(sanitize_name("Layer-2!"), "Layer_2_");
        assert_eq!(sanitize_name("Layer_1"), "Layer_1");
        assert_eq!(sanitize_name("Default View"), "Default_View");
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn test_first_and_third_collide() {
        let names = ["Layer 1", "Layer-2!", "Layer_1"];
        let sanitized: Vec<String> = names.iter().map(|n| sanitize_name(n)).collect();
        assert_eq!(sanitized, vec!["Layer_1", "Layer_2_", "Layer_1"]);
        assert_eq!(sanitized[0], sanitized[2]);
    }

    #[test]
    fn test_unicode_replaced_per_code_unit() {
        assert_eq!(sanitize_name("Café ☕"), "Caf___");
        assert_eq!(sanitize_name("日本"), "__");
        assert_eq!(sanitize_name("a/b\\c.d"), "a_b_c_d");
    }

    #[test]
    fn test_astral_characters_take_two_underscores() {
        assert_eq!(sanitize_name("a🚀b"), "a__b");
        assert_eq!(sanitize_name("𝔘ser 🚀"), "__ser___");
    }

    #[test]
    fn test_same_length_and_positional() {
        let samples = [
            "Layer 1",
            "Über-View (v2)",
            "../../etc/passwd",
            "tab\there",
            "emoji 🚀 view",
            "ÅÄÖ åäö",
            "",
        ];

        for name in samples {
            let out = sanitize_name(name);
            let original: Vec<u16> = name.encode_utf16().collect();
            let mapped: Vec<u16> = out.encode_utf16().collect();
            assert_eq!(mapped.len(), original.len(), "length of {:?}", name);
            for (o, m) in original.iter().zip(&mapped) {
                let ascii_alnum = u8::try_from(*o).map_or(false, |b| b.is_ascii_alphanumeric());
                if ascii_alnum {
                    assert_eq!(m, o);
                } else {
                    assert_eq!(*m, u16::from(b'_'));
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for name in ["Layer-2!", "Sales & Marketing", "x", "日本 語", "___"] {
            let once = sanitize_name(name);
            assert_eq!(sanitize_name(&once), once);
        }
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/out/diagrams"), "Layer_1", OutputFormat::Png);
        assert_eq!(path, PathBuf::from("/out/diagrams/Layer_1.png"));

        let path = output_path(Path::new("out"), "Layer_1", OutputFormat::Svg);
        assert_eq!(path, PathBuf::from("out/Layer_1.svg"));
    }
}
