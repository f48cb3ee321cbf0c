mod create;

pub use create::{EpisodeOptions, EpisodeType, NewEpisode};
