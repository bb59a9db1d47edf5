pub mod quiz;
pub mod unit;

pub use quiz::{GenerateRequest, GenerateResponse, GeneratedResult, Problem, ProblemSet, Selection};
pub use unit::{BatchId, PageText, RequestKey, WorkUnit};
