//! Blog listing: post index, search/category filtering and pagination

pub mod index;
pub mod pagination;
pub mod search;

pub use index::{BlogIndex, BlogPost};
pub use pagination::{ITEMS_PER_PAGE, PageLink, Paginator};
pub use search::{BlogParams, Category, CategoryFilter, SearchQuery};
