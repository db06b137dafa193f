pub mod catalog;
pub mod chat;
pub mod cite;
pub mod filter;
pub mod select;

pub use catalog::{Catalog, CatalogError, Product};
pub use chat::{ChatError, ChatHistory, Message, Role};
pub use select::SelectionSet;
