pub mod cli;
pub mod http;
pub mod jobs;
pub mod source;
