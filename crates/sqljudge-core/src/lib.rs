pub mod config;
pub mod database;
pub mod engine;
pub mod errors;
pub mod model;
pub mod report;
pub mod result_set;
pub mod statement;
pub mod translator;

pub use config::{load_config, parse_config, JudgeConfig};
pub use engine::judge;
pub use model::Verdict;
