//! Shared UI icons and emojis.
//!
//! Each icon carries a plain fallback for terminals without emoji support.

use console::Emoji;

// Message prefixes
pub static SUCCESS: Emoji<'_, '_> = Emoji("✓", "+");
pub static FAILURE: Emoji<'_, '_> = Emoji("✗", "x");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠", "!");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ", "i");

// Section headings
pub static BOOT: Emoji<'_, '_> = Emoji("🚀 ", "");
pub static WORK: Emoji<'_, '_> = Emoji("📋 ", "");
pub static LANDMINE: Emoji<'_, '_> = Emoji("💣 ", "");
pub static DEFECT: Emoji<'_, '_> = Emoji("🐛 ", "");
pub static SUMMARY: Emoji<'_, '_> = Emoji("📊 ", "");

// Priority markers
pub static PRIORITY_CRITICAL: Emoji<'_, '_> = Emoji("🔴 ", "");
pub static PRIORITY_HIGH: Emoji<'_, '_> = Emoji("🟠 ", "");
pub static PRIORITY_MEDIUM: Emoji<'_, '_> = Emoji("🟡 ", "");
pub static PRIORITY_LOW: Emoji<'_, '_> = Emoji("🟢 ", "");
