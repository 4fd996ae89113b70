//! Core types and configuration for imgship.
//!
//! This crate defines the `imgship.toml` schema ([`ImgshipConfig`]),
//! registry-qualified image references ([`ImageRef`]), and shared error types.

pub mod config;
pub mod error;
pub mod image_ref;

pub use config::{
    CONFIG_FILE, DockerConfig, ImageConfig, ImgshipConfig, RecipeConfig, RegistryConfig,
};
pub use error::{Error, Result};
pub use image_ref::{ImageRef, Registry};
