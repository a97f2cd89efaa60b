//! Outfit collage builder engine.
//!
//! A free-form board where images of wardrobe items are placed, arranged,
//! layered, transformed, cropped, and flattened into a single PNG. The engine
//! owns the whole editing lifecycle: translating raw pointer, wheel, and
//! keyboard input into item mutations, keeping snapshot-based undo history,
//! tracking the pan/zoom viewport, running the crop sub-editor, and painting
//! the scene. The host is responsible only for forwarding input, honoring the
//! returned [`engine::Action`]s, and supplying image loading and saving.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`]: input routing, toolbar commands, save flow |
//! | [`store`] | Canvas item collection, selection, and z-order |
//! | [`history`] | Bounded linear undo/redo over snapshots |
//! | [`viewport`] | Pan/zoom state and coordinate conversions |
//! | [`crop`] | Crop modal session and rectangle editing |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing items and their handles |
//! | [`geometry`] | Points, rects, and pure coordinate math |
//! | [`loader`] | Image loading, decoding, and the decoded-image cache |
//! | [`render`] | Scene painting with `tiny-skia` |
//! | [`export`] | Flatten the canvas to PNG and hand it to a save sink |
//! | [`config`] | Builder configuration with environment overrides |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod config;
pub mod consts;
pub mod crop;
pub mod engine;
pub mod export;
pub mod geometry;
pub mod hit;
pub mod history;
pub mod input;
pub mod loader;
pub mod render;
pub mod store;
pub mod viewport;
