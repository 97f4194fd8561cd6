//! Input sanitizing
//!
//! Settings and user-entered text arrive from storage, imports and the CLI;
//! everything is normalized here before it reaches the scheduler.

use crate::types::{Settings, MAX_DAILY_GOAL, MAX_GRADUATION_STREAK};

/// Clamp the daily goal into `[1, MAX_DAILY_GOAL]`
pub fn sanitize_daily_goal(value: i64) -> u32 {
    value.clamp(1, MAX_DAILY_GOAL as i64) as u32
}

/// Clamp the graduation streak into `[1, MAX_GRADUATION_STREAK]`
pub fn sanitize_graduation_streak(value: i64) -> u32 {
    value.clamp(1, MAX_GRADUATION_STREAK as i64) as u32
}

/// Return settings with every field inside its valid range
pub fn sanitize_settings(settings: Settings) -> Settings {
    Settings {
        daily_goal: sanitize_daily_goal(settings.daily_goal as i64),
        graduation_streak: sanitize_graduation_streak(settings.graduation_streak as i64),
    }
}

/// Check settings without modifying them
pub fn validate_settings(settings: &Settings) -> Result<(), String> {
    if settings.daily_goal == 0 || settings.daily_goal > MAX_DAILY_GOAL {
        return Err(format!(
            "daily goal must be between 1 and {MAX_DAILY_GOAL}, got {}",
            settings.daily_goal
        ));
    }
    if settings.graduation_streak == 0 || settings.graduation_streak > MAX_GRADUATION_STREAK {
        return Err(format!(
            "graduation streak must be between 1 and {MAX_GRADUATION_STREAK}, got {}",
            settings.graduation_streak
        ));
    }
    Ok(())
}

/// Trim a required text field; `None` when nothing is left
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim an optional text field, mapping blank input to `None`
pub fn clean_optional_text(raw: Option<&str>) -> Option<String> {
    raw.and_then(clean_text)
}
