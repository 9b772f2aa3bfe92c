use crate::Result;
use std::fs;
use std::path::Path;

pub const DESCRIBE: &str = include_str!("../data/prompts/describe.txt");
pub const IMAGE_EXAMPLES: &str = include_str!("../data/prompts/image_examples.txt");
pub const VIDEO_EXAMPLES: &str = include_str!("../data/prompts/video_examples.txt");

pub const IMAGE_OVERRIDE_FILE: &str = "image_describe.txt";
pub const VIDEO_OVERRIDE_FILE: &str = "video_describe.txt";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Fixed instructions sent when the caller supplies no query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub image_describe: String,
    pub video_describe: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            image_describe: render(DESCRIBE, &[("media", "image"), ("examples", IMAGE_EXAMPLES)]),
            video_describe: render(DESCRIBE, &[("media", "video"), ("examples", VIDEO_EXAMPLES)]),
        }
    }
}

impl Prompts {
    /// Load the built-in prompts, replacing each one found in `dir`.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut prompts = Self::default();

        let Some(dir) = dir else {
            return Ok(prompts);
        };

        if let Some(text) = read_override(dir, IMAGE_OVERRIDE_FILE)? {
            prompts.image_describe = text;
        }
        if let Some(text) = read_override(dir, VIDEO_OVERRIDE_FILE)? {
            prompts.video_describe = text;
        }

        Ok(prompts)
    }
}

fn read_override(dir: &Path, file_name: &str) -> Result<Option<String>> {
    let path = dir.join(file_name);
    if !path.is_file() {
        tracing::debug!("No prompt override at {}", path.display());
        return Ok(None);
    }

    let text = fs::read_to_string(&path)?;
    tracing::info!("Loaded prompt override from {}", path.display());
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_describe_has_placeholders() {
        assert!(DESCRIBE.contains("{{media}}"));
        assert!(DESCRIBE.contains("{{examples}}"));
    }

    #[test]
    fn test_default_prompts_are_fully_rendered() {
        let prompts = Prompts::default();

        for text in [&prompts.image_describe, &prompts.video_describe] {
            assert!(!text.contains("{{"));
            assert!(text.contains("{Danger, Title, Description}"));
            assert!(text.contains("visually impaired"));
        }
        assert!(prompts.image_describe.contains("Describe the image"));
        assert!(prompts.image_describe.contains("Cozy Coffee Shop"));
        assert!(prompts.video_describe.contains("Describe the video"));
        assert!(prompts.video_describe.contains("Quiet Library Reading Room"));
    }

    #[test]
    fn test_load_without_dir_uses_defaults() {
        assert_eq!(Prompts::load(None).unwrap(), Prompts::default());
    }

    #[test]
    fn test_load_applies_present_overrides_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VIDEO_OVERRIDE_FILE), "Summarize the clip as JSON").unwrap();

        let prompts = Prompts::load(Some(dir.path())).unwrap();

        assert_eq!(prompts.video_describe, "Summarize the clip as JSON");
        assert_eq!(prompts.image_describe, Prompts::default().image_describe);
    }
}
