//! Summarization collaborator: message types, protocol and the
//! chat-completion implementation.

mod chat;
mod messages;
mod protocols;

pub use chat::{ChatCompletionSummarizer, SummarizerConfig};
pub use messages::{
    join_documents, SummarizeRequest, SummarizeResponse, TermsContent, DOCUMENT_SEPARATOR,
    SUMMARIZE_TERMS_ACTION,
};
pub use protocols::{handle_summarize_request, Summarizer};
