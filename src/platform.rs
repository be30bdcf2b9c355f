//! Platform-specific key bindings

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for copy/draft shortcuts
/// - macOS: SUPER (Cmd key)
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const COPY_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Continue shortcut display for form help text
/// Ctrl+S works on all platforms (Enter also continues)
pub const CONTINUE_SHORTCUT: &str = "Ctrl+S";

/// Save as draft shortcut display
/// - macOS: "Cmd+D"
/// - Linux/Windows: "Ctrl+D"
#[cfg(target_os = "macos")]
pub const DRAFT_SHORTCUT: &str = "Cmd+D";

#[cfg(not(target_os = "macos"))]
pub const DRAFT_SHORTCUT: &str = "Ctrl+D";

/// Start-over shortcut display
pub const RESET_SHORTCUT: &str = "Ctrl+R";

/// Calculator shortcut display, available from every view
pub const CALCULATOR_SHORTCUT: &str = "Ctrl+K";
