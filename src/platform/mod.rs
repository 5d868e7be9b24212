//! Platform abstraction layer
//!
//! The simulation is platform-free; this is where hosts plug in.
//! - `web`: wasm-bindgen facade driven from the browser's requestAnimationFrame

#[cfg(target_arch = "wasm32")]
pub mod web;
