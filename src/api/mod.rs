pub mod face_comparison;
pub mod face_detection;
pub mod oracle_client;
pub mod oracle_structs;
