//! Symbol include/exclude filtering applied before a function is emitted
//! into the IDL payload.

use std::collections::BTreeSet;

use regex::Regex;

/// Name-set and pattern-based filter controlling which header symbols are
/// emitted as IDL functions. All fields are optional and default permissive:
/// an empty `include_symbols`/`include_patterns` matches everything.
#[derive(Debug, Clone, Default)]
pub struct CodegenSymbolFilter {
    pub include_symbols: BTreeSet<String>,
    pub exclude_symbols: BTreeSet<String>,
    pub include_patterns: Vec<Regex>,
    pub exclude_patterns: Vec<Regex>,
}

#[must_use]
pub fn include_symbol_for_codegen(symbol: &str, filter: &CodegenSymbolFilter) -> bool {
    if !filter.include_symbols.is_empty() && !filter.include_symbols.contains(symbol) {
        return false;
    }
    if filter.exclude_symbols.contains(symbol) {
        return false;
    }
    if !filter.include_patterns.is_empty() && !filter.include_patterns.iter().any(|p| p.is_match(symbol)) {
        return false;
    }
    if filter.exclude_patterns.iter().any(|p| p.is_match(symbol)) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_allows_everything() {
        let filter = CodegenSymbolFilter::default();
        assert!(include_symbol_for_codegen("rtc_session_create", &filter));
    }

    #[test]
    fn include_symbols_restricts_to_named_set() {
        let mut filter = CodegenSymbolFilter::default();
        filter.include_symbols.insert("rtc_session_create".to_string());
        assert!(include_symbol_for_codegen("rtc_session_create", &filter));
        assert!(!include_symbol_for_codegen("rtc_session_destroy", &filter));
    }

    #[test]
    fn exclude_symbols_wins_even_if_included() {
        let mut filter = CodegenSymbolFilter::default();
        filter.include_symbols.insert("rtc_session_create".to_string());
        filter.exclude_symbols.insert("rtc_session_create".to_string());
        assert!(!include_symbol_for_codegen("rtc_session_create", &filter));
    }

    #[test]
    fn exclude_pattern_rejects_matching_symbol() {
        let mut filter = CodegenSymbolFilter::default();
        filter.exclude_patterns.push(Regex::new(r"_internal$").unwrap());
        assert!(!include_symbol_for_codegen("rtc_session_internal", &filter));
        assert!(include_symbol_for_codegen("rtc_session_create", &filter));
    }

    #[test]
    fn include_pattern_requires_a_match() {
        let mut filter = CodegenSymbolFilter::default();
        filter.include_patterns.push(Regex::new(r"^rtc_session_").unwrap());
        assert!(include_symbol_for_codegen("rtc_session_create", &filter));
        assert!(!include_symbol_for_codegen("rtc_stream_create", &filter));
    }
}
