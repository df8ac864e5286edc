pub mod _entities;
pub mod albums;
pub mod faces;
pub mod persons;
pub mod photos;
pub mod trips;
pub mod users;
