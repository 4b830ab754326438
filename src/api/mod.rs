pub mod attendance;
pub mod batch;
pub mod institute;
pub mod master_data;
pub mod student;
pub mod subject;
