#![allow(clippy::len_without_is_empty)]

//! # Overview
//! vid_dedup_lib finds near-duplicate video files within a single directory and moves
//! the redundant copies into a quarantine subdirectory instead of deleting them.
//!
//! # How it works
//! * Every video is decoded by ffmpeg into 64x64 grayscale frames at 8 frames per second.
//! * Each frame is reduced to a 64 bit [difference hash](https://www.hackerfactor.com/blog/index.php?/archives/529-Kind-of-Like-That.html).
//!   The time-ordered sequence of these hashes is the fingerprint of the video ([`HashedVideo`]).
//! * Two fingerprints are compared position by position from the start (sampling roughly 100
//!   positions for long videos). A position "matches" when the two frame hashes differ in fewer
//!   than 12 bits. The similarity score is the percentage of matching positions ([`SimilarityScorer`]).
//! * Videos are ranked longest first and swept pairwise. Whenever a pair scores at least 90, the shorter
//!   video is moved into the quarantine directory and takes no further part in the sweep ([`DuplicateResolver`]).
//!
//! # High Level API
//! ```rust,no_run
//! use vid_dedup_lib::{DedupCfg, FfmpegDecoder, JsonLinesReporter};
//!
//! let cfg = DedupCfg::new("/home/me/videos");
//! let mut reporter = JsonLinesReporter::stdout();
//!
//! // Emits progress/match events as JSON lines, and finishes with exactly one
//! // "done" or "error" event.
//! let summary = vid_dedup_lib::run(&cfg, FfmpegDecoder::default(), &mut reporter).unwrap();
//! println!("moved {} files", summary.moved());
//! ```
//!
//! # Limitations
//! Comparison is index-aligned from the first frame. A duplicate that has been retimed,
//! trimmed at the start, or reversed will not score highly. Deduplication is a greedy,
//! order-dependent sweep and does not attempt to find globally minimal removals.
//!
//! # Prerequisites
//! This crate calls ffmpeg from the command line. Either make ffmpeg available on the
//! PATH, or pass the path of the executable to [`FfmpegDecoder::new`].

pub mod definitions;
pub(crate) mod dedup_run;
pub(crate) mod dhash;
pub(crate) mod events;
pub(crate) mod quarantine;
pub(crate) mod video_hashing;

pub use dedup_run::{find_candidates, run, DedupCfg, DedupError, RunOutcome, RunSummary};
pub use dhash::{dhash, hamming_distance};
pub use events::{Event, EventLog, EventSink, JsonLinesReporter, Phase};
pub use quarantine::{move_to_quarantine, quarantine_destination, MoveError};
pub use video_hashing::{
    hash_creation_error_kind::HashCreationError,
    hashed_video::HashedVideo,
    matches::match_decision::MatchDecision,
    resolver::{rank, DuplicateResolver, Entry, EntryStatus, Resolution, ResolverCfg},
    sampler::{FfmpegDecoder, FrameSource, HashSampler, SamplerCfg},
    similarity::{ScoreCfg, SimilarityScorer},
};

pub use ffmpeg_cmdline_utils::FfmpegError;
