//! Text-level C declaration cleanup shared by every extractor: comment
//! stripping, whitespace normalization, and attribute/calling-convention
//! removal so downstream regexes see a uniform declaration shape.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*?$").unwrap());
static CALLING_CONVENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:__cdecl|__stdcall|__fastcall|__vectorcall|__thiscall)\b").unwrap());
static BOOL_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b_Bool\b").unwrap());
static ATTRIBUTE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b__attribute__\b").unwrap());
static DECLSPEC_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b__declspec\b").unwrap());

#[must_use]
pub fn normalize_ws(value: &str) -> String {
    WHITESPACE.replace_all(value, " ").trim().to_string()
}

/// Strip a balanced-paren macro call like `__attribute__((...))`, replacing
/// it with a single space. Repeats until no more calls to `token` remain.
fn strip_balanced_macro_calls(payload: &str, token: &Regex) -> String {
    let mut out = payload.to_string();
    loop {
        let Some(m) = token.find(&out) else { break };
        let Some(open_rel) = out[m.end()..].find('(') else {
            out = format!("{} {}", &out[..m.start()], &out[m.end()..]);
            continue;
        };
        let open_idx = m.end() + open_rel;
        let mut depth = 0i32;
        let mut end_idx = None;
        for (idx, ch) in out[open_idx..].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        end_idx = Some(open_idx + idx + 1);
                        break;
                    }
                }
                _ => {}
            }
        }
        match end_idx {
            Some(end_idx) => out = format!("{} {}", &out[..m.start()], &out[end_idx..]),
            None => out = format!("{} {}", &out[..m.start()], &out[m.end()..]),
        }
    }
    out
}

#[must_use]
pub fn strip_c_decl_attributes(value: &str) -> String {
    let mut text = strip_balanced_macro_calls(value, &ATTRIBUTE_TOKEN);
    text = strip_balanced_macro_calls(&text, &DECLSPEC_TOKEN);
    text = CALLING_CONVENTION.replace_all(&text, " ").to_string();
    normalize_ws(&text)
}

#[must_use]
pub fn sanitize_c_decl_text(value: &str) -> String {
    let text = strip_c_decl_attributes(value);
    let text = BOOL_KEYWORD.replace_all(&text, "bool").to_string();
    normalize_ws(&text)
}

#[must_use]
pub fn strip_c_comments(content: &str) -> String {
    let without_block = BLOCK_COMMENT.replace_all(content, "");
    LINE_COMMENT.replace_all(&without_block, "").to_string()
}

#[must_use]
pub fn normalize_c_type(value: &str) -> String {
    let text = sanitize_c_decl_text(value);
    let text = Regex::new(r"\s*\*\s*").unwrap().replace_all(&text, "*").to_string();
    normalize_ws(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_ws_collapses_runs_and_trims() {
        assert_eq!(normalize_ws("  a\t\tb\n c "), "a b c");
    }

    #[test]
    fn strip_c_comments_removes_block_and_line_comments() {
        let input = "int a; /* block\ncomment */ int b; // trailing\nint c;";
        let out = strip_c_comments(input);
        assert!(!out.contains("block"));
        assert!(!out.contains("trailing"));
        assert!(out.contains("int c;"));
    }

    #[test]
    fn strip_c_decl_attributes_removes_attribute_macro() {
        let input = "int foo(void) __attribute__((deprecated));";
        let out = strip_c_decl_attributes(input);
        assert!(!out.contains("__attribute__"));
        assert!(out.contains("int foo(void)"));
    }

    #[test]
    fn strip_c_decl_attributes_removes_calling_convention() {
        let input = "int __cdecl foo(void);";
        assert_eq!(strip_c_decl_attributes(input), "int foo(void);");
    }

    #[test]
    fn sanitize_c_decl_text_rewrites_bool_keyword() {
        assert_eq!(sanitize_c_decl_text("_Bool flag"), "bool flag");
    }

    #[test]
    fn normalize_c_type_collapses_pointer_spacing() {
        assert_eq!(normalize_c_type("const char * *"), "const char**");
    }
}
