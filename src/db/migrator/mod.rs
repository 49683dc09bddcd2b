use sea_orm_migration::prelude::*;

mod m20250301_create_users;
mod m20250301_create_songs;
mod m20250412_add_song_play_tracking;
mod m20250520_unique_song_per_owner;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_create_users::Migration),
            Box::new(m20250301_create_songs::Migration),
            Box::new(m20250412_add_song_play_tracking::Migration),
            Box::new(m20250520_unique_song_per_owner::Migration),
        ]
    }
}
