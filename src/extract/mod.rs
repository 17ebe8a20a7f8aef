pub mod dom_analysis;
pub mod extractor;
