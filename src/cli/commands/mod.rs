pub mod serve;
pub mod task;
pub mod token;
