//! Content producers.

mod snippets;
mod template;

pub use template::TemplateContentProducer;
