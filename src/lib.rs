pub mod error;
pub mod export;
pub mod normalize;
pub mod parse;
pub mod playback;
pub mod resolve;
pub mod retarget;
pub mod schema;
pub mod settings;
pub mod skeleton;
pub mod types;
pub mod utils;

#[cfg(feature = "visualize")]
pub mod visualize;
