use std::{
    error::Error,
    io::{self, IsTerminal},
    path::Path,
};

use simplelog::LevelFilter;

use vid_dedup_lib::*;

use crate::app::*;

const MISSING_ARGUMENTS: &str = "Missing arguments";

pub fn run_app() -> i32 {
    // stdout carries only events. All logging goes to stderr.
    let mut reporter = JsonLinesReporter::stdout();

    let cfg = match arg_parse::parse_args() {
        Ok(cfg) => cfg,
        Err(e) => {
            configure_logs(ReportVerbosity::Default);
            report_usage_error(&e, &mut reporter);
            return 1;
        }
    };
    configure_logs(cfg.verbosity);

    let ret = match run_app_inner(&cfg, &mut reporter) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(fatal_error, cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg, reporter: &mut dyn EventSink) -> eyre::Result<()> {
    let Some(target_dir) = &cfg.target_dir else {
        reporter.emit(&Event::Error {
            message: MISSING_ARGUMENTS.to_string(),
        });
        return Err(eyre::Report::msg(MISSING_ARGUMENTS));
    };

    warn_if_decoder_unusable(&cfg.decoder_path);

    let dedup_cfg = dedup_cfg(cfg, target_dir);
    let decoder = FfmpegDecoder::new(&cfg.decoder_path);

    // the error event has already been emitted by the run itself.
    let summary = vid_dedup_lib::run(&dedup_cfg, decoder, reporter)?;

    info!(
        "Scanned {} videos ({} usable), moved {} duplicates",
        summary.scanned,
        summary.usable,
        summary.moved()
    );

    Ok(())
}

fn report_usage_error(e: &clap::Error, reporter: &mut dyn EventSink) {
    let message = arg_parse::usage_error_message(e);
    error!(target: "app-errorlog", "{message}");
    reporter.emit(&Event::Error { message });
}

fn dedup_cfg(cfg: &AppCfg, target_dir: &Path) -> DedupCfg {
    let mut dedup_cfg = DedupCfg::new(target_dir);
    dedup_cfg.match_threshold = cfg.match_threshold;
    dedup_cfg.score.match_distance = cfg.tolerance;
    dedup_cfg
}

fn warn_if_decoder_unusable(decoder_path: &Path) {
    if let Err(e) = ffmpeg_cmdline_utils::check_ffmpeg_callable(decoder_path) {
        warn!(
            "Cannot run the decoder at {}: {e}. No video will be hashed.",
            decoder_path.display()
        );
    }
}

fn print_fatal_err(fatal_err: eyre::Report, verbosity: ReportVerbosity) {
    error!(target: "app-errorlog", "{}", fatal_err);

    if verbosity == ReportVerbosity::Verbose {
        let mut source: Option<&(dyn Error + 'static)> = fatal_err.source();
        while let Some(e) = source {
            error!(target: "app-errorlog", "    caused by: {}", e);
            source = e.source();
        }
    }
}

// When stdout is piped into a host process, that process usually treats any stderr output as
// an error, so routine progress logging is left out unless asked for.
fn min_loglevel(verbosity: ReportVerbosity, stdout_is_terminal: bool) -> LevelFilter {
    match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default if stdout_is_terminal => LevelFilter::Info,
        ReportVerbosity::Default => LevelFilter::Warn,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_target_level(LevelFilter::Error);

    let min_loglevel = min_loglevel(verbosity, io::stdout().is_terminal());

    // only fails if a logger is already installed.
    let _ = TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}
