pub mod analysis;
pub mod binding;
pub mod display;
pub mod replay;
pub mod shared;
