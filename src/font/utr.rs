//! UTR (Unicode translation) file parsing (spec §4.1, §6 "UTR file";
//! grounded in `font.c`'s UTR-loading loop).

use crate::error::PmwError;
use std::collections::HashMap;

use super::FONTWIDTHS_SIZE;

pub const MAX_UTRANSLATE: usize = 4096;

/// Escaped-marker codes substituted for the underlay special characters
/// `#`, `=`, `-` when they appear as a UTR *target* code (spec §4.1:
/// "Characters #, =, - as target codes are rewritten to the internal
/// escaped markers").
pub const SS_ESCAPED_SHARP: u32 = 0xE000;
pub const SS_ESCAPED_EQUALS: u32 = 0xE001;
pub const SS_ESCAPED_HYPHEN: u32 = 0xE002;

fn escape_target(code: u32) -> u32 {
    match code {
        c if c == b'#' as u32 => SS_ESCAPED_SHARP,
        c if c == b'=' as u32 => SS_ESCAPED_EQUALS,
        c if c == b'-' as u32 => SS_ESCAPED_HYPHEN,
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtrTranslation {
    pub unicode: u32,
    pub pscode: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedUtr {
    /// `/name code` encoding-vector entries, consulted while scanning the
    /// companion AFM file's `N name` fields.
    pub encoding: HashMap<String, u32>,
    /// `?code` override of the "unknown character" substitute.
    pub unknown_override: Option<u32>,
    /// `U+hhhh code` translations, sorted by Unicode and deduplicated.
    pub translations: Vec<UtrTranslation>,
}

fn parse_int(tok: &str, radix: u32) -> Option<u32> {
    let tok = tok.trim();
    let tok = tok.strip_prefix("0x").unwrap_or(tok);
    u32::from_str_radix(tok, radix).ok()
}

/// Parse a UTR file's text, returning the encoding/override/translation
/// data plus any soft-error messages (spec §7: "duplicate character
/// encoding in UTR", "out-of-range code in UTR", reported and discarded,
/// not fatal).
pub fn parse_utr(path: &str, text: &str) -> Result<(ParsedUtr, Vec<String>), PmwError> {
    let mut result = ParsedUtr::default();
    let mut softerrors = Vec::new();
    let mut raw: Vec<UtrTranslation> = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let lineno = lineno + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('/') {
            let name_end = rest.find(|c: char| !c.is_alphanumeric()).unwrap_or(rest.len());
            let (name, tail) = rest.split_at(name_end);
            let code_tok = tail.split_whitespace().next();
            let Some(code_tok) = code_tok else {
                softerrors.push(format!("{path}:{lineno}: expected code after /{name}"));
                continue;
            };
            let Some(code) = parse_int(code_tok, 10) else {
                softerrors.push(format!("{path}:{lineno}: bad integer '{code_tok}'"));
                continue;
            };
            if code as usize >= FONTWIDTHS_SIZE {
                softerrors.push(format!(
                    "{path}:{lineno}: code {code} out of range (max {FONTWIDTHS_SIZE})"
                ));
                continue;
            }
            if result.encoding.values().any(|&v| v == code) {
                softerrors.push(format!("{path}:{lineno}: duplicate encoding for code {code}"));
                continue;
            }
            result.encoding.insert(name.to_string(), code);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('?') {
            let code_tok = rest.split_whitespace().next();
            let Some(code_tok) = code_tok else {
                softerrors.push(format!("{path}:{lineno}: expected code after ?"));
                continue;
            };
            let Some(code) = parse_int(code_tok, 10) else {
                softerrors.push(format!("{path}:{lineno}: bad integer '{code_tok}'"));
                continue;
            };
            if code as usize >= FONTWIDTHS_SIZE {
                softerrors.push(format!(
                    "{path}:{lineno}: code {code} out of range (max {FONTWIDTHS_SIZE})"
                ));
                continue;
            }
            result.unknown_override = Some(escape_target(code));
            continue;
        }

        if raw.len() >= MAX_UTRANSLATE {
            softerrors.push(format!(
                "{path}: too many UTR translations, limit {MAX_UTRANSLATE} exceeded"
            ));
            break;
        }

        let mut it = trimmed.split_whitespace();
        let Some(utok) = it.next() else { continue };
        let utok_hex = utok.strip_prefix("U+").unwrap_or(utok);
        let Some(unicode) = parse_int(utok_hex, 16) else {
            softerrors.push(format!("{path}:{lineno}: bad Unicode value '{utok}'"));
            continue;
        };
        let Some(code_tok) = it.next() else {
            softerrors.push(format!("{path}:{lineno}: expected font code after {utok}"));
            continue;
        };
        let Some(pscode) = parse_int(code_tok, 10) else {
            softerrors.push(format!("{path}:{lineno}: bad integer '{code_tok}'"));
            continue;
        };
        if pscode as usize >= FONTWIDTHS_SIZE {
            softerrors.push(format!(
                "{path}:{lineno}: code {pscode} out of range (max {FONTWIDTHS_SIZE})"
            ));
            continue;
        }
        raw.push(UtrTranslation {
            unicode,
            pscode: escape_target(pscode),
        });
    }

    raw.sort_by_key(|t| t.unicode);
    let mut i = 1;
    while i < raw.len() {
        if raw[i].unicode == raw[i - 1].unicode {
            softerrors.push(format!("{path}: duplicate Unicode translation U+{:04X}", raw[i].unicode));
            while i < raw.len() - 1 && raw[i].unicode == raw[i + 1].unicode {
                i += 1;
            }
        }
        i += 1;
    }
    result.translations = raw;

    Ok((result, softerrors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encoding_override_and_unknown() {
        let text = "# comment\n/Aacute 193\n?63\nU+00C1 193\n";
        let (parsed, errs) = parse_utr("t.utr", text).unwrap();
        assert!(errs.is_empty());
        assert_eq!(parsed.encoding.get("Aacute"), Some(&193));
        assert_eq!(parsed.unknown_override, Some(63));
        assert_eq!(parsed.translations.len(), 1);
        assert_eq!(parsed.translations[0].unicode, 0x00C1);
    }

    #[test]
    fn translations_sorted_and_deduped_with_softerror() {
        let text = "U+0041 70\nU+0020 80\nU+0041 71\n";
        let (parsed, errs) = parse_utr("t.utr", text).unwrap();
        assert_eq!(parsed.translations[0].unicode, 0x0020);
        assert_eq!(parsed.translations[1].unicode, 0x0041);
        assert!(errs.iter().any(|e| e.contains("duplicate")));
    }

    #[test]
    fn special_target_chars_are_escaped() {
        let text = "U+0041 45\n"; // '-' as a target code (ascii 45)
        let (parsed, _) = parse_utr("t.utr", text).unwrap();
        assert_eq!(parsed.translations[0].pscode, SS_ESCAPED_HYPHEN);
    }
}
