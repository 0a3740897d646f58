use std::fs;
use std::path::Path;

use tracing::warn;

use crate::config::CONFIG;

/// Load a prompt template from the configured prompts directory, falling back
/// to the caller's built-in default when the file is missing or blank.
pub fn load_prompt(name: &str, default: &str) -> String {
    load_prompt_from(&CONFIG.prompts_dir, name, default)
}

pub fn load_prompt_from(dir: &Path, name: &str, default: &str) -> String {
    let path = dir.join(format!("{name}.txt"));
    match fs::read_to_string(&path) {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                warn!(
                    "Prompt file {} is empty, using built-in default",
                    path.display()
                );
                default.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(err) => {
            warn!(
                "Prompt file {} not readable ({err}), using built-in default",
                path.display()
            );
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = PathBuf::from("/nonexistent-prompts-dir");
        assert_eq!(load_prompt_from(&dir, "eval-style", "fallback"), "fallback");
    }

    #[test]
    fn existing_file_is_read_and_trimmed() {
        let dir = std::env::temp_dir().join("style-assistant-prompt-test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("greeting.txt"), "  hello there\n").unwrap();
        assert_eq!(load_prompt_from(&dir, "greeting", "fallback"), "hello there");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_file_falls_back_to_default() {
        let dir = std::env::temp_dir().join("style-assistant-blank-prompt-test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("blank.txt"), "   \n").unwrap();
        assert_eq!(load_prompt_from(&dir, "blank", "fallback"), "fallback");
        let _ = fs::remove_dir_all(&dir);
    }
}
