pub mod docx_text;
pub mod extractor;
pub mod pdf_text;
pub mod qa_llm;
pub mod qa_local;

pub use extractor::DocumentTextExtractor;
pub use qa_llm::OpenAiQaAdapter;
pub use qa_local::LexicalQaModel;
