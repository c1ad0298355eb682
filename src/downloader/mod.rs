pub mod batch;
pub mod error;
pub mod http;
pub mod likes;
pub mod playlist;
pub mod single;

pub use batch::BatchDownloader;
pub use likes::{LikesDownloader, LikesSource, StopReason};
pub use playlist::PlaylistDownloader;
