pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::{LocalStorage, ReqwestFetcher};
pub use config::ClientConfig;
pub use crate::core::{
    controller::PageController, dashboard::DashboardPoller, debounce::Debouncer,
    export::ExportClient, search::SearchClient,
};
pub use domain::identity::{validate, IdentityNumber};
pub use domain::phone::format_phone;
pub use utils::error::{ClientError, Result};
