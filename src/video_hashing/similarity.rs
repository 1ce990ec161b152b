use crate::{
    definitions::{EXHAUSTIVE_COMPARE_BELOW, MATCH_DISTANCE, TARGET_COMPARISONS},
    dhash::hamming_distance,
    HashedVideo,
};

/// Parameters of the similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCfg {
    /// Two frame hashes match when their hamming distance is strictly below this value.
    pub match_distance: u32,
    /// Sequences shorter than this are compared at every position.
    pub exhaustive_below: usize,
    /// Longer sequences are sampled at a stride giving roughly this many comparisons.
    pub target_comparisons: usize,
}

impl Default for ScoreCfg {
    fn default() -> Self {
        Self {
            match_distance: MATCH_DISTANCE,
            exhaustive_below: EXHAUSTIVE_COMPARE_BELOW,
            target_comparisons: TARGET_COMPARISONS,
        }
    }
}

/// Scores the similarity of two frame hash sequences in the range 0..=100.
///
/// Positions are compared index-aligned from the start of both sequences, up to the length
/// of the shorter one. Anything past that in the longer sequence is ignored, so a video is
/// a perfect match for any longer video that starts with the same content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimilarityScorer {
    cfg: ScoreCfg,
}

impl SimilarityScorer {
    pub fn new(cfg: ScoreCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &ScoreCfg {
        &self.cfg
    }

    /// Distance between compared positions for sequences whose shorter length is `min_len`.
    pub fn stride(&self, min_len: usize) -> usize {
        if min_len < self.cfg.exhaustive_below {
            1
        } else {
            (min_len / self.cfg.target_comparisons.max(1)).max(1)
        }
    }

    pub fn score(&self, a: &HashedVideo, b: &HashedVideo) -> f64 {
        self.score_hashes(a.hashes(), b.hashes())
    }

    /// Percentage of sampled positions at which the two sequences match. Empty input scores 0.
    pub fn score_hashes(&self, a: &[u64], b: &[u64]) -> f64 {
        let min_len = a.len().min(b.len());
        if min_len == 0 {
            return 0.0;
        }

        let (matches, comparisons) = (0..min_len)
            .step_by(self.stride(min_len))
            .fold((0u32, 0u32), |(matches, comparisons), i| {
                let is_match = hamming_distance(a[i], b[i]) < self.cfg.match_distance;
                (matches + u32::from(is_match), comparisons + 1)
            });

        if comparisons == 0 {
            return 0.0;
        }
        f64::from(matches) / f64::from(comparisons) * 100.0
    }
}

#[cfg(test)]
mod test {
    use rand::prelude::*;

    use super::*;

    fn random_hashes(rng: &mut StdRng, len: usize) -> Vec<u64> {
        (0..len).map(|_| rng.gen()).collect()
    }

    // flip the lowest `bits` bits of every hash
    fn with_flipped_bits(hashes: &[u64], bits: u32) -> Vec<u64> {
        let mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
        hashes.iter().map(|h| h ^ mask).collect()
    }

    #[test]
    fn test_identical_sequences_score_100() {
        let mut rng = StdRng::seed_from_u64(1);
        let scorer = SimilarityScorer::default();
        for len in [1, 5, 9, 10, 57, 100, 1_000, 4_321] {
            let hashes = random_hashes(&mut rng, len);
            assert_eq!(scorer.score_hashes(&hashes, &hashes.clone()), 100.0);
        }
    }

    #[test]
    fn test_identical_videos_score_100() {
        let a = HashedVideo::from_hashes("a.mp4", vec![7, 8, 9, 10], 8).unwrap();
        let b = HashedVideo::from_hashes("b.mp4", vec![7, 8, 9, 10], 8).unwrap();
        assert_eq!(SimilarityScorer::default().score(&a, &b), 100.0);
    }

    #[test]
    fn test_empty_sequences_score_0() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.score_hashes(&[], &[]), 0.0);
        assert_eq!(scorer.score_hashes(&[1, 2, 3], &[]), 0.0);
        assert_eq!(scorer.score_hashes(&[], &[1, 2, 3]), 0.0);
    }

    #[test]
    fn test_short_sequences_are_compared_exhaustively() {
        let scorer = SimilarityScorer::default();
        for min_len in 0..10 {
            assert_eq!(scorer.stride(min_len), 1);
        }
    }

    #[test]
    fn test_long_sequences_are_sampled() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.stride(10), 1);
        assert_eq!(scorer.stride(199), 1);
        assert_eq!(scorer.stride(200), 2);
        assert_eq!(scorer.stride(1_050), 10);
    }

    #[test]
    fn test_match_tolerance_is_strict() {
        let mut rng = StdRng::seed_from_u64(2);
        let scorer = SimilarityScorer::default();
        let hashes = random_hashes(&mut rng, 20);

        assert_eq!(scorer.score_hashes(&hashes, &with_flipped_bits(&hashes, 11)), 100.0);
        assert_eq!(scorer.score_hashes(&hashes, &with_flipped_bits(&hashes, 12)), 0.0);
    }

    #[test]
    fn test_custom_tolerance() {
        let mut rng = StdRng::seed_from_u64(3);
        let scorer = SimilarityScorer::new(ScoreCfg {
            match_distance: 13,
            ..ScoreCfg::default()
        });
        let hashes = random_hashes(&mut rng, 20);
        assert_eq!(scorer.score_hashes(&hashes, &with_flipped_bits(&hashes, 12)), 100.0);
    }

    #[test]
    fn test_only_shared_prefix_is_compared() {
        let scorer = SimilarityScorer::default();
        let short = vec![0u64; 8];
        let mut long = vec![0u64; 8];
        long.extend(std::iter::repeat(u64::MAX).take(500));

        assert_eq!(scorer.score_hashes(&short, &long), 100.0);
    }

    #[test]
    fn test_partial_match_percentage() {
        let scorer = SimilarityScorer::default();
        let a = vec![0u64; 4];
        let b = vec![0, 0, 0, u64::MAX];
        assert_eq!(scorer.score_hashes(&a, &b), 75.0);
    }

    #[test]
    fn test_symmetry() {
        let mut rng = StdRng::seed_from_u64(4);
        let scorer = SimilarityScorer::default();
        for _i in 0..1_000 {
            let len_a = rng.gen_range(1..300);
            let len_b = rng.gen_range(1..300);
            let a = random_hashes(&mut rng, len_a);
            // make the sequences similar enough that the score is not always 0
            let b = a
                .iter()
                .cycle()
                .take(len_b)
                .map(|h| h ^ (rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>()))
                .collect::<Vec<_>>();

            assert_eq!(scorer.score_hashes(&a, &b), scorer.score_hashes(&b, &a));
        }
    }
}
