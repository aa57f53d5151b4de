pub mod normalize;
pub mod snapshot;
