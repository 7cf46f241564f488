//! Splits and classifies a function's raw C parameter list into
//! [`IdlParameter`]-shaped records (name, C type, pointer depth, variadic).

use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_types::IdlParameter;

use crate::lexical::{normalize_c_type, normalize_ws};

static FUNCTION_PTR_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\*\s*(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*\)").unwrap());
static ARRAY_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<left>.+?)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<array>(?:\[[^\]]*\])+)\s*$").unwrap()
});
static REGULAR_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<left>.+?)\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s*$").unwrap());

/// Split a raw parameter list on top-level commas, respecting nested
/// `()`/`[]` so function-pointer and array parameters stay intact.
#[must_use]
pub fn split_c_parameters(parameters: &str) -> Vec<String> {
    let raw = parameters.trim();
    if raw.is_empty() || raw == "void" {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut token = String::new();
    let mut depth = 0i32;

    for ch in raw.chars() {
        if ch == ',' && depth == 0 {
            let piece = normalize_ws(&token);
            if !piece.is_empty() {
                parts.push(piece);
            }
            token.clear();
            continue;
        }
        token.push(ch);
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = (depth - 1).max(0),
            _ => {}
        }
    }
    let tail = normalize_ws(&token);
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

fn pointer_depth(c_type: &str) -> usize {
    c_type.chars().filter(|&c| c == '*').count()
}

#[must_use]
pub fn parse_c_parameter_decl(declaration: &str, index: usize) -> IdlParameter {
    let decl = normalize_ws(declaration);
    if decl == "..." {
        return IdlParameter {
            name: format!("arg{index}"),
            c_type: "...".to_string(),
            pointer_depth: 0,
            variadic: true,
        };
    }

    if let Some(caps) = FUNCTION_PTR_PARAM.captures(&decl) {
        let name = caps["name"].to_string();
        let c_type = normalize_c_type(&decl.replacen(&name, "", 1));
        return IdlParameter {
            name,
            c_type: c_type.clone(),
            pointer_depth: pointer_depth(&c_type),
            variadic: false,
        };
    }

    if let Some(caps) = ARRAY_PARAM.captures(&decl) {
        let left = normalize_c_type(&caps["left"]);
        let c_type = normalize_c_type(&format!("{left}*"));
        return IdlParameter {
            name: caps["name"].to_string(),
            c_type: c_type.clone(),
            pointer_depth: pointer_depth(&c_type),
            variadic: false,
        };
    }

    if let Some(caps) = REGULAR_PARAM.captures(&decl) {
        let c_type = normalize_c_type(&caps["left"]);
        return IdlParameter {
            name: caps["name"].to_string(),
            c_type: c_type.clone(),
            pointer_depth: pointer_depth(&c_type),
            variadic: false,
        };
    }

    let c_type = normalize_c_type(&decl);
    IdlParameter {
        name: format!("arg{index}"),
        c_type: c_type.clone(),
        pointer_depth: pointer_depth(&c_type),
        variadic: false,
    }
}

#[must_use]
pub fn parse_c_function_parameters(parameters: &str) -> Vec<IdlParameter> {
    split_c_parameters(parameters)
        .iter()
        .enumerate()
        .map(|(idx, chunk)| parse_c_parameter_decl(chunk, idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_parameter_list_is_empty() {
        assert!(split_c_parameters("void").is_empty());
        assert!(split_c_parameters("").is_empty());
    }

    #[test]
    fn splits_on_top_level_commas_only() {
        let parts = split_c_parameters("int a, void (*cb)(int, int), char b[4]");
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn parses_pointer_parameter() {
        let p = parse_c_parameter_decl("const char *name", 0);
        assert_eq!(p.name, "name");
        assert_eq!(p.c_type, "const char*");
        assert_eq!(p.pointer_depth, 1);
    }

    #[test]
    fn parses_variadic_parameter() {
        let p = parse_c_parameter_decl("...", 3);
        assert!(p.variadic);
        assert_eq!(p.name, "arg3");
    }

    #[test]
    fn parses_array_parameter_as_pointer() {
        let p = parse_c_parameter_decl("int values[16]", 0);
        assert_eq!(p.name, "values");
        assert_eq!(p.c_type, "int*");
        assert_eq!(p.pointer_depth, 1);
    }

    #[test]
    fn parses_function_pointer_parameter() {
        let p = parse_c_parameter_decl("void (*cb)(int)", 0);
        assert_eq!(p.name, "cb");
    }
}
