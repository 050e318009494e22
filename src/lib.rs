//! 障害チケットを Gemini で解析し、恒久対策候補と解決分類を Excel に書き戻す

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod pipeline;
