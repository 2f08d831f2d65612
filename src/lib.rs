//! Interaction core for a single-user vector whiteboard.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! document (shapes, selection, active tool, camera), turns raw pointer,
//! wheel and keyboard events into gestures (draw, select, drag, resize, pan,
//! zoom), hit-tests shapes, and redraws the scene. The host JavaScript layer
//! wires DOM events to the engine, applies the returned [`engine::Action`]s
//! (cursor changes, redraw requests, property panel refreshes), and renders
//! the toolbar and property forms.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Shape types and the in-memory document store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against shapes and resize handles |
//! | [`render`] | Scene rendering through the [`render::Surface`] trait |
//! | [`props`] | Selection projection and edits for property editors |
//! | [`config`] | Tunable thresholds and limits |
//! | [`consts`] | Default constants (zoom limits, minimum sizes, colors) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod props;
pub mod render;
