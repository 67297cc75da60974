pub mod event;
pub mod properties;
