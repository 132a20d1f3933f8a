use clap::{Parser, Subcommand};

/// scrywarden: learns per-actor behavioral profiles from a JSON event
/// stream and surfaces clusters of scored anomalies that plausibly
/// represent malicious activity (§6).
#[derive(Parser, Debug)]
#[command(name = "scrywarden", about = "Anomaly detection pipeline and investigator")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the YAML config file.
    #[arg(long, global = true, default_value = "scrywarden.yml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Starts the pipeline process: ingests messages, scores anomalies.
    Collect,
    /// Starts the investigator/curator process: finds malicious clusters
    /// and ships findings.
    Investigate,
}
