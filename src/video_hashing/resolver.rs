use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    definitions::MATCH_THRESHOLD, move_to_quarantine, Event, EventSink, HashedVideo, MatchDecision, Phase,
    SimilarityScorer,
};

/// Whether a video still takes part in the sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Active,
    /// The file was moved into quarantine, to the contained path.
    Relocated(PathBuf),
}

/// A video in the resolver's working list. Relocated entries stay in the list and are
/// skipped by all later comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub video: HashedVideo,
    pub status: EntryStatus,
}

impl Entry {
    pub fn is_relocated(&self) -> bool {
        matches!(self.status, EntryStatus::Relocated(_))
    }
}

impl From<HashedVideo> for Entry {
    fn from(video: HashedVideo) -> Self {
        Self {
            video,
            status: EntryStatus::Active,
        }
    }
}

/// Result of a sweep: every entry (in sweep order) and a decision for every file that was moved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub entries: Vec<Entry>,
    pub decisions: Vec<MatchDecision>,
}

impl Resolution {
    pub fn moved(&self) -> usize {
        self.decisions.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverCfg {
    /// Pairs scoring at least this much are duplicates.
    pub match_threshold: f64,
    /// Directory that duplicates are moved into. Must already exist.
    pub quarantine_dir: PathBuf,
}

impl ResolverCfg {
    pub fn new(quarantine_dir: impl AsRef<Path>) -> Self {
        Self {
            match_threshold: MATCH_THRESHOLD,
            quarantine_dir: quarantine_dir.as_ref().to_path_buf(),
        }
    }
}

/// Sort videos longest first. Videos of equal duration keep their relative order.
pub fn rank(videos: &mut [HashedVideo]) {
    videos.sort_by(|a, b| b.duration().total_cmp(&a.duration()));
}

/// Decides which videos are duplicates of each other and moves the redundant ones into quarantine.
#[derive(Debug, Clone)]
pub struct DuplicateResolver {
    scorer: SimilarityScorer,
    cfg: ResolverCfg,
}

impl DuplicateResolver {
    pub fn new(scorer: SimilarityScorer, cfg: ResolverCfg) -> Self {
        Self { scorer, cfg }
    }

    pub fn cfg(&self) -> &ResolverCfg {
        &self.cfg
    }

    /// Rank the videos longest first, then sweep them. See [`Self::resolve_in_order`].
    pub fn resolve(&self, mut videos: Vec<HashedVideo>, sink: &mut dyn EventSink) -> Resolution {
        rank(&mut videos);
        self.resolve_in_order(videos, sink)
    }

    /// Greedy pairwise sweep over the videos in the given order.
    ///
    /// Each active video is compared with every later active video. When a pair scores at
    /// least the match threshold, the strictly shorter video is moved into quarantine (the later
    /// one if durations are equal). Once the earlier video of a pair has been chosen for
    /// removal it is not compared any further.
    ///
    /// The outcome depends on the order: chains of videos that are only transitively similar
    /// are not clustered.
    pub fn resolve_in_order(&self, videos: Vec<HashedVideo>, sink: &mut dyn EventSink) -> Resolution {
        let mut entries = videos.into_iter().map(Entry::from).collect::<Vec<_>>();
        let mut decisions = vec![];
        let total = entries.len();

        for i in 0..total {
            if entries[i].is_relocated() {
                continue;
            }

            for j in (i + 1)..total {
                if entries[j].is_relocated() {
                    continue;
                }

                if j % 10 == 0 {
                    sink.emit(&Event::progress(
                        Phase::Comparing,
                        i + 1,
                        total,
                        format!("Checking {}...", entries[i].video.filename()),
                    ));
                }

                let score = self.scorer.score(&entries[i].video, &entries[j].video);
                if score < self.cfg.match_threshold {
                    continue;
                }

                let outer_is_victim = entries[i].video.duration() < entries[j].video.duration();
                let (keeper, victim) = if outer_is_victim { (j, i) } else { (i, j) };

                match move_to_quarantine(entries[victim].video.path(), &self.cfg.quarantine_dir) {
                    Ok(destination) => {
                        let decision = MatchDecision::new(
                            entries[keeper].video.path(),
                            entries[victim].video.path(),
                            score,
                            &destination,
                        );

                        info!(target: "dedup_resolve",
                            "Moved {} to {} (duplicate of {}, score {:.2})",
                            entries[victim].video.filename(),
                            self.cfg.quarantine_dir.display(),
                            entries[keeper].video.filename(),
                            score
                        );
                        sink.emit(&Event::matched(
                            entries[keeper].video.filename(),
                            decision.destination_name(),
                            score,
                        ));

                        entries[victim].status = EntryStatus::Relocated(destination);
                        decisions.push(decision);
                    }
                    Err(e) => {
                        warn!(target: "dedup_resolve", "{e}");
                        sink.emit(&Event::progress(
                            Phase::Comparing,
                            i + 1,
                            total,
                            format!("Failed to move {}: {e}", entries[victim].video.filename()),
                        ));
                    }
                }

                if outer_is_victim {
                    break;
                }
            }
        }

        Resolution { entries, decisions }
    }
}
