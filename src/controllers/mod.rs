pub mod albums;
pub mod auth;
pub mod download;
pub mod people;
pub mod photos;
pub mod trips;
