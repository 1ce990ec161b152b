use std::path::PathBuf;

use vid_dedup_lib::definitions::{MATCH_DISTANCE, MATCH_THRESHOLD};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppCfg {
    /// None when the directory was not given on the command line.
    pub target_dir: Option<PathBuf>,
    pub decoder_path: PathBuf,

    pub match_threshold: f64,
    pub tolerance: u32,

    pub verbosity: ReportVerbosity,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            target_dir: None,
            decoder_path: PathBuf::from("ffmpeg"),
            match_threshold: MATCH_THRESHOLD,
            tolerance: MATCH_DISTANCE,
            verbosity: ReportVerbosity::Default,
        }
    }
}
