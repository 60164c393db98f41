pub mod padding;
pub mod split_assignment;
pub mod split_error;
