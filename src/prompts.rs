//! Prompts sent to the vision model.
//!
//! Callers can override either prompt via
//! [`crate::config::RenameConfig::system_instruction`] and
//! [`crate::config::RenameConfig::instruction`]; the constants here are used
//! only when no override is provided.

/// System instruction attached to every generate request.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an image analysis expert. \
Analyze the image and respond with ONLY a single descriptive filename (no bullets, no explanations). \
The filename should be concise, relevant, and use hyphens between words. \
Do not include file extensions.";

/// User-turn text sent just before the uploaded image.
pub const DEFAULT_INSTRUCTION: &str =
    "Analyze this image and respond with a single descriptive filename (no explanations, no bullets).";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_forbids_extensions() {
        assert!(DEFAULT_SYSTEM_INSTRUCTION.contains("hyphens"));
        assert!(DEFAULT_SYSTEM_INSTRUCTION.contains("Do not include file extensions"));
    }
}
