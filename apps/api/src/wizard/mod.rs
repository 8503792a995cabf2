pub mod handlers;
pub mod machine;
pub mod models;
pub mod prompts;
