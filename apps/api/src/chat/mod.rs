// Chat turns: attachment enrichment, upstream or canned replies, message
// persistence and the background history log.

pub mod attachments;
pub mod canned;
pub mod category;
pub mod handlers;
pub mod history;
pub mod orchestrator;
pub mod prompts;
