#![allow(elided_lifetimes_in_paths)]
#![allow(clippy::wildcard_imports)]
pub use sea_orm_migration::prelude::*;
mod m20220101_000001_users;
mod m20250301_100001_trips;
mod m20250301_100152_trip_members;
mod m20250301_100318_albums;
mod m20250301_100544_photos;
mod m20250301_101027_persons;
mod m20250301_101212_faces;
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_users::Migration),
            Box::new(m20250301_100001_trips::Migration),
            Box::new(m20250301_100152_trip_members::Migration),
            Box::new(m20250301_100318_albums::Migration),
            Box::new(m20250301_100544_photos::Migration),
            Box::new(m20250301_101027_persons::Migration),
            Box::new(m20250301_101212_faces::Migration),
            // inject-above (do not remove this comment)
        ]
    }
}
