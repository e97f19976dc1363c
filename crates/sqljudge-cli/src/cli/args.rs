use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sqljudge",
    version,
    about = "Judges SQL submissions against a model solution on SQLite seed databases"
)]
pub struct Cli {
    /// platform config (JSON); read from stdin when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// tracing filter, e.g. "info" or "sqljudge_core=debug"
    #[arg(long, env = "SQLJUDGE_LOG", default_value = "warn")]
    pub log_level: String,
}
