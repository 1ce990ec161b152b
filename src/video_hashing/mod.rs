pub mod hash_creation_error_kind;
pub mod hashed_video;
pub mod resolver;
pub mod sampler;
pub mod similarity;

pub mod matches {
    pub mod match_decision;
}
