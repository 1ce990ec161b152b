use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use clap::{error::ErrorKind, value_parser, ArgAction::*};

use crate::app::*;

// file specification
const TARGET_DIR: &str = "Directory to deduplicate";
const DECODER_PATH: &str = "Decoder executable";
const EXTRA_ARGS: &str = "Ignored arguments";

// search configuration
const THRESHOLD: &str = "Match threshold";
const TOLERANCE: &str = "Frame tolerance";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 7] = [
    //
    // file specification
    TARGET_DIR,
    DECODER_PATH,
    EXTRA_ARGS,
    //
    //search modifiers
    THRESHOLD,
    TOLERANCE,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    let default_cfg = AppCfg::default();

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Video duplicate quarantine")
        .version(clap::crate_version!())
        .about("Move near-duplicate videos in a directory into a quarantine subdirectory. Progress is written to stdout as JSON lines.");

    // Not required here: a missing directory is reported as an error event rather than a usage message.
    clap_app = clap_app.arg(
        clap::Arg::new(TARGET_DIR)
            .index(1)
            .value_name("targetDirectory")
            .value_parser(value_parser!(PathBuf))
            .help("Directory containing the videos. Subdirectories are not searched.")
            .display_order(get_ordering(TARGET_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(DECODER_PATH)
            .index(2)
            .value_name("decoderExecutablePath")
            .value_parser(value_parser!(PathBuf))
            .help("Path to the ffmpeg executable. Defaults to ffmpeg on the PATH")
            .display_order(get_ordering(DECODER_PATH)),
    );

    // Anything after the decoder path is accepted and ignored.
    clap_app = clap_app.arg(
        clap::Arg::new(EXTRA_ARGS)
            .index(3)
            .num_args(1..)
            .action(Append)
            .value_parser(value_parser!(OsString))
            .hide(true)
            .display_order(get_ordering(EXTRA_ARGS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(THRESHOLD)
            .long("threshold")
            .num_args(1)
            .value_parser(parse_threshold)
            .default_value(default_cfg.match_threshold.to_string())
            .help("Similarity score (0 to 100) at or above which two videos are duplicates")
            .display_order(get_ordering(THRESHOLD)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(TOLERANCE)
            .long("tolerance")
            .num_args(1)
            .value_parser(value_parser!(u32).range(0..=64))
            .default_value(default_cfg.tolerance.to_string())
            .help("Two frames match when their hashes differ in fewer than this many bits")
            .display_order(get_ordering(TOLERANCE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .short('q')
            .long("quiet")
            .action(SetTrue)
            .conflicts_with(VERBOSITY_VERBOSE)
            .help("Only log warnings and errors to stderr")
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .short('v')
            .long("verbose")
            .action(SetTrue)
            .help("Log everything to stderr, including the ffmpeg command lines")
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let threshold = s.parse::<f64>().map_err(|e| e.to_string())?;
    if (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("{threshold} is not between 0 and 100"))
    }
}

/// Parse the command line. Help and version requests are printed and exit the process here;
/// every other parse failure is returned to the caller.
pub fn parse_args() -> Result<AppCfg, clap::Error> {
    let args = match build_app().try_get_matches() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return Err(e),
    };

    //if the cwd cannot be read, relative paths are left as they are.
    let cwd = std::env::current_dir().unwrap_or_default();

    Ok(cfg_from_matches(&args, &cwd))
}

/// One-line description of a command line error, without clap's usage text.
pub fn usage_error_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first_line = rendered.lines().next().unwrap_or_default().trim();
    first_line.strip_prefix("error: ").unwrap_or(first_line).to_string()
}

fn cfg_from_matches(args: &clap::ArgMatches, cwd: &Path) -> AppCfg {
    let default_cfg = AppCfg::default();

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    AppCfg {
        target_dir: args
            .get_one::<PathBuf>(TARGET_DIR)
            .map(|p| absolutify_path(cwd, p)),
        decoder_path: args
            .get_one::<PathBuf>(DECODER_PATH)
            .cloned()
            .unwrap_or(default_cfg.decoder_path),
        match_threshold: args
            .get_one::<f64>(THRESHOLD)
            .copied()
            .unwrap_or(default_cfg.match_threshold),
        tolerance: args
            .get_one::<u32>(TOLERANCE)
            .copied()
            .unwrap_or(default_cfg.tolerance),
        verbosity,
    }
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    let path = if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    };

    //canonicalizing fails for paths that do not exist. Those are reported later, when the
    //quarantine directory cannot be created.
    let p = path.canonicalize().unwrap_or(path);

    p
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppCfg, clap::Error> {
        let cmdline = std::iter::once("vid_dedup").chain(args.iter().copied());
        let matches = build_app().try_get_matches_from(cmdline)?;
        Ok(cfg_from_matches(&matches, Path::new("/home/me")))
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&["/definitely/not/here"]).unwrap();
        assert_eq!(
            cfg,
            AppCfg {
                target_dir: Some(PathBuf::from("/definitely/not/here")),
                ..AppCfg::default()
            }
        );
    }

    #[test]
    fn test_missing_directory_is_not_a_usage_error() {
        let cfg = parse(&[]).unwrap();
        assert_eq!(cfg.target_dir, None);
    }

    #[test]
    fn test_relative_directory_is_made_absolute() {
        let cfg = parse(&["no such videos"]).unwrap();
        assert_eq!(cfg.target_dir, Some(PathBuf::from("/home/me/no such videos")));
    }

    #[test]
    fn test_decoder_and_options() {
        let cfg = parse(&[
            "/vids",
            "/opt/ffmpeg/bin/ffmpeg",
            "--threshold",
            "95.5",
            "--tolerance",
            "8",
            "-v",
        ])
        .unwrap();

        assert_eq!(cfg.decoder_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(cfg.match_threshold, 95.5);
        assert_eq!(cfg.tolerance, 8);
        assert_eq!(cfg.verbosity, ReportVerbosity::Verbose);
    }

    #[test]
    fn test_extra_positionals_are_ignored() {
        let cfg = parse(&["/vids", "ffmpeg", "extra"]).unwrap();
        assert_eq!(cfg.target_dir, Some(PathBuf::from("/vids")));
        assert_eq!(cfg.decoder_path, PathBuf::from("ffmpeg"));

        let cfg = parse(&["/vids", "ffmpeg", "one", "two", "three"]).unwrap();
        assert_eq!(cfg.decoder_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_usage_error_message_is_one_line() {
        let e = parse(&["/vids", "--threshold", "101"]).unwrap_err();
        let message = usage_error_message(&e);
        assert!(!message.contains('\n'));
        assert!(!message.starts_with("error:"));
        assert!(message.contains("101"));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        assert!(parse(&["/vids", "--threshold", "101"]).is_err());
        assert!(parse(&["/vids", "--threshold", "ninety"]).is_err());
        assert!(parse(&["/vids", "--tolerance", "65"]).is_err());
        assert!(parse(&["/vids", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_display_ordering_is_complete() {
        build_app().debug_assert();
    }
}
