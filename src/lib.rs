//! Dress-up doll maker: drag part images from category drawers onto a
//! canvas, arrange and select them, and save the result as a PNG.
#![allow(clippy::too_many_arguments)]

pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod composition;
pub mod drawers;
pub mod error;
pub mod export;
pub mod interaction;
pub mod io;
pub mod loader;
pub mod manifest;
pub mod render;
pub mod settings;
pub mod text;
