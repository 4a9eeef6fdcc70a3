pub mod sequence;
pub mod text;
pub mod tfidf;
