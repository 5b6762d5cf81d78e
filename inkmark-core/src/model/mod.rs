pub mod annotation;
pub mod document;
pub mod mark;
pub mod text_range;

pub use annotation::Annotation;
pub use document::Document;
pub use mark::{Mark, MarkId};
pub use text_range::TextRange;
