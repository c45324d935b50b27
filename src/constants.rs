//! Centralized constants for viewer behavior, intake defaults, UI sizing, and colors.

use eframe::egui::Color32;

// =============================================================================
// VIEWER CONSTANTS
// =============================================================================

/// Multiplicative factor applied by one zoom-in or zoom-out step.
pub const ZOOM_STEP: f32 = 1.5;

/// Smallest scale the viewer can zoom out to.
pub const MIN_VIEWER_SCALE: f32 = 0.5;

/// Largest scale the viewer can zoom in to.
pub const MAX_VIEWER_SCALE: f32 = 5.0;

// =============================================================================
// INTAKE DEFAULTS
// =============================================================================

/// Maximum number of files accepted from a single pick or drop.
pub const DEFAULT_MAX_FILES: usize = 50;

/// Accept filter that lets every file through.
pub const ACCEPT_ALL: &str = "*/*";

/// Longest edge, in pixels, of decoded card thumbnails.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 320;

/// Longest edge, in pixels, of textures shown in the viewer.
pub const DEFAULT_VIEWER_MAX_DIMENSION: u32 = 4096;

// =============================================================================
// WINDOW CONSTANTS
// =============================================================================

pub const INITIAL_WINDOW_WIDTH: f32 = 1100.0;

pub const INITIAL_WINDOW_HEIGHT: f32 = 760.0;

// =============================================================================
// LAYOUT CONSTANTS
// =============================================================================

/// Width of one card in the grid.
pub const CARD_WIDTH: f32 = 200.0;

/// Height of the preview area inside a card.
pub const CARD_PREVIEW_HEIGHT: f32 = 150.0;

/// Inner padding of a card.
pub const CARD_PADDING: f32 = 10.0;

/// Horizontal and vertical spacing between cards.
pub const GRID_SPACING: f32 = 20.0;

/// Corner radius for cards and the drop zone.
pub const CARD_CORNER_RADIUS: f32 = 10.0;

/// Size of the remove button in the card corner.
pub const REMOVE_BUTTON_SIZE: f32 = 22.0;

/// Height of the upload drop zone.
pub const DROP_ZONE_HEIGHT: f32 = 140.0;

/// Maximum width of the upload drop zone.
pub const DROP_ZONE_MAX_WIDTH: f32 = 640.0;

/// Margin between the viewer overlays and the window edge.
pub const VIEWER_OVERLAY_MARGIN: f32 = 16.0;

/// Size of the round viewer buttons (close, previous, next).
pub const VIEWER_BUTTON_SIZE: f32 = 44.0;

/// Font size of large type icons (fallback previews).
pub const ICON_FONT_SIZE: f32 = 40.0;

// =============================================================================
// COLORS
// =============================================================================

pub const COLOR_PAGE_BG: Color32 = Color32::from_rgb(249, 250, 251);

pub const COLOR_CARD_BG: Color32 = Color32::WHITE;

pub const COLOR_PREVIEW_BG: Color32 = Color32::from_rgb(243, 244, 246);

pub const COLOR_TEXT_PRIMARY: Color32 = Color32::from_rgb(17, 24, 39);

pub const COLOR_TEXT_MUTED: Color32 = Color32::from_rgb(107, 114, 128);

pub const COLOR_DROP_ZONE_BORDER: Color32 = Color32::from_rgb(209, 213, 219);

pub const COLOR_DROP_ZONE_ACTIVE_BORDER: Color32 = Color32::from_rgb(59, 130, 246);

pub const COLOR_DROP_ZONE_ACTIVE_BG: Color32 = Color32::from_rgb(239, 246, 255);

pub const COLOR_DANGER: Color32 = Color32::from_rgb(220, 38, 38);

pub const COLOR_DANGER_HOVER: Color32 = Color32::from_rgb(185, 28, 28);

pub const COLOR_ACCENT: Color32 = Color32::from_rgb(37, 99, 235);

/// Alpha of the viewer backdrop.
pub const VIEWER_BACKDROP_ALPHA: u8 = 230;

/// Alpha of the viewer's translucent overlay panels.
pub const VIEWER_PANEL_ALPHA: u8 = 128;

/// Opacity multiplier applied to a card while it is being dragged.
pub const DRAGGED_CARD_OPACITY: f32 = 0.5;
