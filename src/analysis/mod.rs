pub mod analyzer;
pub mod processor;
pub mod tracker;

pub use analyzer::{analyze_song, melody_from_samples, melody_path_for};
pub use processor::{SongReport, SongStatus, collect_songs, process_songs_parallel};
