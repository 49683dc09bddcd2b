mod songs;
mod users;

pub use songs::{
    cmd_add_song, cmd_delete_song, cmd_list_songs, cmd_play_song, cmd_search_songs,
    cmd_song_stats, cmd_update_song,
};
pub use users::{cmd_create_user, cmd_list_users, cmd_set_user_active};
