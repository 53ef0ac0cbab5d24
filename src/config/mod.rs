//! Configuration: where data lives and the user's preferences

pub mod paths;
pub mod settings;

pub use paths::TrackerPaths;
pub use settings::Settings;
