//! Incident AI Common Library
//!
//! CLIとテストで共有される型と純粋ロジック

pub mod types;
pub mod error;
pub mod classifier;
pub mod prompts;
pub mod parser;

pub use types::{
    ResolutionCategory, Verdict,
    COL_REQUEST_TYPE, COL_SUBJECT, COL_DESCRIPTION, COL_RESOLUTION,
    INCIDENT_REQUEST_TYPE, COL_IS_CANDIDATE, COL_REASON, COL_RESOLUTION_GROUP,
    DERIVED_COLUMNS, OUTPUT_SHEET_NAME,
};
pub use error::{Error, Result};
pub use classifier::categorize_resolution;
pub use prompts::build_candidate_prompt;
pub use parser::{parse_verdict, MISSING_REASON};
