pub mod assignments;
pub mod core;
pub mod grades;
pub mod query;
pub mod submissions;
pub mod users;
