// Frame definitions (pre hashing)
pub const FRAME_SIZE: u32 = 64;
pub const SAMPLE_FPS: u32 = 8;

// Hash definitions. A grid of 8 gives 8x8 = 64 gradient bits per frame.
pub const HASH_GRID: u32 = 8;

// Similarity definitions
pub const MATCH_DISTANCE: u32 = 12;
pub const EXHAUSTIVE_COMPARE_BELOW: usize = 10;
pub const TARGET_COMPARISONS: usize = 100;
pub const MATCH_THRESHOLD: f64 = 90.0;

// Directory scanning
pub const QUARANTINE_DIR_NAME: &str = "Delete duplicate";
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "mov", "mkv", "avi", "flv", "wmv", "webm"];
