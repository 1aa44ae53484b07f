pub mod face;
pub mod face_attributes;
pub mod icao_warnings;
