pub mod app_config;
pub mod draft_repo;

pub use app_config::Config;
pub use draft_repo::{DraftStore, DraftStoreError, SessionDraftStore};
