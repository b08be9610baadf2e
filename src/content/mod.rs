//! Content module - front-matter, validation, slugs and post loading

mod frontmatter;
pub mod loader;
mod post;
pub mod slug;
mod validate;

pub use frontmatter::{split, Body, FieldValue, FrontMatter, RawDocument};
pub use loader::{ContentLoader, FileOutcome};
pub use post::{BodyRef, PostRecord};
pub use validate::{ValidatedFields, Validator};
