//! GPU orchestration for the presentation window.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds swapchain
//!   state when the window resizes.
//! - `pipeline` compiles the built-in GLSL into full-screen pipelines.
//! - `uniforms` mirrors the std140 uniform blocks and the cover-fit maths.
//! - `backdrop` uploads the background frames and cross-fades between them
//!   using the `timeline` envelopes.
//! - `layer` is the off-screen animator surface that the overlay draws into
//!   and that gets blended additively on top of the backdrop.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod backdrop;
mod context;
mod layer;
mod pipeline;
mod state;
mod timeline;
mod uniforms;

pub(crate) use state::GpuState;
