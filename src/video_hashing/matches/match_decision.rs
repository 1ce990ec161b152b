use std::path::{Path, PathBuf};

/// The outcome of one detected duplicate pair: which file was kept, which was moved,
/// and where it was moved to.
#[derive(Clone, PartialEq, Debug)]
pub struct MatchDecision {
    keeper: PathBuf,
    victim: PathBuf,
    score: f64,
    destination: PathBuf,
}

impl MatchDecision {
    pub fn new(keeper: impl AsRef<Path>, victim: impl AsRef<Path>, score: f64, destination: impl AsRef<Path>) -> Self {
        Self {
            keeper: keeper.as_ref().to_path_buf(),
            victim: victim.as_ref().to_path_buf(),
            score,
            destination: destination.as_ref().to_path_buf(),
        }
    }

    /// The file that was left in place.
    pub fn keeper(&self) -> &Path {
        &self.keeper
    }

    /// The original location of the file that was moved.
    pub fn victim(&self) -> &Path {
        &self.victim
    }

    /// Similarity score of the pair, 0..=100.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Where the victim now lives, inside the quarantine directory.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// File name of the victim inside the quarantine directory. Differs from the original
    /// file name if a timestamp suffix had to be added to avoid a collision.
    pub fn destination_name(&self) -> String {
        file_name_of(&self.destination)
    }

    pub fn keeper_name(&self) -> String {
        file_name_of(&self.keeper)
    }
}

fn file_name_of(p: &Path) -> String {
    p.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
