pub mod constants;
pub mod frame;
pub mod layout;
pub mod resolution;
