//! Study service endpoint bindings

pub mod study_api;

pub use study_api::StudyApi;
