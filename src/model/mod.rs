pub mod attendance;
pub mod batch;
pub mod role;
pub mod student;
pub mod subject;
pub mod user;
