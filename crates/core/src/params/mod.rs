//! Parameter shape checking: the rule algebra describing which keys a
//! command accepts, and the per-key validators run once the shape is right.

mod rules;
mod validation;

pub use rules::{Rule, RuleError, SuggestMode};
pub use validation::{
    is_cidr, is_filepath, is_in_enum_ignore_case, is_ip, max_length_of, min_length_of,
    ValidationError, ValidatorFn, Validators,
};
