pub mod manager;
pub mod models;

pub use manager::{group_profile_rows, PlaylistManager};
pub use models::{Playlist, ProfilePlaylist, ProfileRow, ProfileSong};
