use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("rule '{rule_id}': invalid regex '{pattern}': {source}")]
    InvalidRulePattern {
        rule_id: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("waiver '{waiver_id}': invalid pattern regex '{pattern}': {source}")]
    InvalidWaiverPattern {
        waiver_id: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("waiver '{waiver_id}': invalid target regex '{pattern}': {source}")]
    InvalidWaiverTarget {
        waiver_id: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
