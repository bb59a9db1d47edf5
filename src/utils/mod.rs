pub mod logging;
pub mod parsing;

pub use logging::truncate_text;
pub use parsing::{extract_json, parse_generated_problem_set};
