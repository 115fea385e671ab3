use std::collections::HashMap;
use tracing::{info, warn};

use super::shellexpand;

/// Bundled system prompt, embedded at compile time.
const BUNDLED_SYSTEM_PROMPT: &str = include_str!("../../../../prompts/SYSTEM_PROMPT.md");

/// Instruction prompt sections, loaded from `{data_dir}/prompts/SYSTEM_PROMPT.md`.
///
/// Missing files or sections fall back to the bundled defaults.
#[derive(Debug, Clone)]
pub struct Prompts {
    /// Who the assistant is and who it works for.
    pub identity: String,
    /// Business facts: location, hours, services, pricing, policies.
    pub practice: String,
    /// Behavioral rules, including when to emit action markers.
    pub rules: String,
}

impl Default for Prompts {
    fn default() -> Self {
        let sections = parse_markdown_sections(BUNDLED_SYSTEM_PROMPT);
        let take = |key: &str| sections.get(key).cloned().unwrap_or_default();
        Self {
            identity: take("Identity"),
            practice: take("Practice"),
            rules: take("Rules"),
        }
    }
}

/// Deploy the bundled prompt to `{data_dir}/prompts/`, creating the directory if needed.
///
/// Never overwrites an existing file so user edits are preserved.
pub fn install_bundled_prompts(data_dir: &str) {
    let expanded = shellexpand(data_dir);
    let dir = std::path::Path::new(&expanded).join("prompts");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("prompts: failed to create {}: {e}", dir.display());
        return;
    }

    let dest = dir.join("SYSTEM_PROMPT.md");
    if !dest.exists() {
        if let Err(e) = std::fs::write(&dest, BUNDLED_SYSTEM_PROMPT) {
            warn!("prompts: failed to write {}: {e}", dest.display());
        } else {
            info!("prompts: deployed bundled SYSTEM_PROMPT.md");
        }
    }
}

impl Prompts {
    /// Load prompts from `{data_dir}/prompts/SYSTEM_PROMPT.md`.
    pub fn load(data_dir: &str) -> Self {
        let mut prompts = Self::default();
        let dir = shellexpand(data_dir);

        let prompt_path = format!("{dir}/prompts/SYSTEM_PROMPT.md");
        if let Ok(content) = std::fs::read_to_string(&prompt_path) {
            let sections = parse_markdown_sections(&content);
            if let Some(v) = sections.get("Identity") {
                prompts.identity = v.clone();
            }
            if let Some(v) = sections.get("Practice") {
                prompts.practice = v.clone();
            }
            if let Some(v) = sections.get("Rules") {
                prompts.rules = v.clone();
            }
            info!("loaded prompts from {prompt_path}");
        }

        prompts
    }

    /// The static instruction prompt: non-empty sections joined by blank lines.
    pub fn instructions(&self) -> String {
        [&self.identity, &self.practice, &self.rules]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Instructions followed by the live availability block.
    pub fn render(&self, availability: &str) -> String {
        format!(
            "{}\n--- LIVE AVAILABILITY ---\n{}\n-------------------------",
            self.instructions(),
            availability
        )
    }
}

/// Parse a markdown file with `## Section` headers into a map of section name -> body.
fn parse_markdown_sections(content: &str) -> HashMap<String, String> {
    let mut sections = HashMap::new();
    let mut current_key: Option<String> = None;
    let mut current_body = String::new();

    for line in content.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            if let Some(key) = current_key.take() {
                let trimmed = current_body.trim().to_string();
                if !trimmed.is_empty() {
                    sections.insert(key, trimmed);
                }
            }
            current_key = Some(header.trim().to_string());
            current_body.clear();
        } else if current_key.is_some() {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }

    if let Some(key) = current_key {
        let trimmed = current_body.trim().to_string();
        if !trimmed.is_empty() {
            sections.insert(key, trimmed);
        }
    }

    sections
}
