pub mod controller;
pub mod dashboard;
pub mod debounce;
pub mod export;
pub mod html;
pub mod page;
pub mod search;

pub use crate::domain::model::{DomPatch, PageState};
pub use crate::domain::ports::{ConfigProvider, PageFetcher, Storage};
pub use crate::utils::error::Result;
