pub mod handlers;
pub mod options;
pub mod prompts;
