//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`summary`]: statistics panel plus one row per city, worst first
//! - [`detail`]: modal overlay with the full reading and health advice
//! - [`common`]: shared components (header, status bar, help overlay)
//! - [`theme`]: light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Stats (summary::render_stats)        │
//! ├──────────────────────────────────────┤
//! │ City cards (summary::render)         │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod common;
pub mod detail;
pub mod summary;
pub mod theme;

pub use theme::Theme;
