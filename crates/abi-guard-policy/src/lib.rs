//! Rule and waiver engine (C5): evaluates configured [`PolicyRule`]s and
//! [`PolicyWaiver`]s against a compatibility [`Report`] and decides its
//! final pass/fail status.

pub mod error;
pub mod gate;
pub mod rules;
pub mod waivers;

pub use error::PolicyError;
pub use gate::apply_policy_to_report;
pub use rules::apply_policy_rules;
pub use waivers::apply_policy_waivers;
