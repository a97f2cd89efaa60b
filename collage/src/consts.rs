//! Shared numeric constants for the collage crate.

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots retained by the undo history.
pub const MAX_HISTORY: usize = 30;

// ── Items ───────────────────────────────────────────────────────

/// Width, in canvas pixels, given to a freshly added item.
pub const BASE_ITEM_WIDTH: f64 = 180.0;

/// Position delta applied to a duplicate so it does not sit exactly on top of the original.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Lowest opacity reachable from the opacity control.
pub const MIN_OPACITY: f64 = 0.1;

/// Highest opacity.
pub const MAX_OPACITY: f64 = 1.0;

/// Smallest on-canvas width/height an item can be resized to.
pub const MIN_ITEM_SIZE: f64 = 20.0;

/// Grid pitch used by snap-to-grid, in canvas pixels.
pub const GRID_SIZE: f64 = 20.0;

/// Rotation step used by the toolbar rotate buttons, in degrees.
pub const ROTATE_STEP_DEG: f64 = 90.0;

/// Rotation snap increment while shift is held during a rotate gesture.
pub const ROTATE_SNAP_DEG: f64 = 15.0;

// ── Canvas ──────────────────────────────────────────────────────

/// Default logical canvas width in pixels.
pub const CANVAS_WIDTH: f64 = 600.0;

/// Default logical canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 800.0;

// ── Viewport ────────────────────────────────────────────────────

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 3.0;

/// Zoom change per wheel tick or zoom button press.
pub const ZOOM_STEP: f64 = 0.1;

/// Total padding subtracted from the container when fitting the canvas.
pub const FIT_MARGIN: f64 = 40.0;

// ── Crop ────────────────────────────────────────────────────────

/// Smallest crop rectangle side, in natural image pixels.
pub const MIN_CROP_SIZE: f64 = 50.0;

/// Screen-space slop in pixels for crop overlay handles.
pub const CROP_HANDLE_RADIUS_PX: f64 = 10.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the top edge to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Export ──────────────────────────────────────────────────────

/// Supersampling factor applied when flattening the canvas.
pub const EXPORT_SCALE: f64 = 2.0;

/// File name handed to the save sink.
pub const EXPORT_FILE_NAME: &str = "collage.png";
