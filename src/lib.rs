//! Headless core of a product-gallery lightbox: a thumbnail strip that opens
//! into a full-screen slide viewer through a FLIP hero transition.

pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod geometry;
pub mod replay;
pub mod strip;
pub mod viewer;

pub use error::{Error, Result};
