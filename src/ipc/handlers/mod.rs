pub mod core;
pub mod sessions;
pub mod students;
pub mod subjects;
pub mod teams;
