//! Active-mode bitmask constants shared with the tab manager

/// Bit set in the active-mode mask when the passive DOM Snitch component runs.
pub const PASSIVE: u32 = 1;

/// Component name in configuration documents that maps to [`PASSIVE`].
pub const DOM_SNITCH_COMPONENT: &str = "DOMSnitch";

/// Returns true when the passive bit is set in `mode`.
pub fn is_passive(mode: u32) -> bool {
    mode & PASSIVE != 0
}
