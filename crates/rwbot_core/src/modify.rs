use anyhow::{Result, bail};
use similar::{ChangeTag, TextDiff};

use crate::client::{WikiReadApi, WikiWriteApi};

/// A proposed, previewable, committable change to one page.
///
/// Previews must not mutate wiki state. Commit applies exactly one wiki
/// write; it carries no double-commit protection, the review loop consumes
/// each modification at most once.
pub trait Modification {
    fn change_description(&self) -> &str;
    /// Render an operator-facing preview against current wiki state.
    fn preview(&self, api: &mut dyn WikiReadApi) -> Result<String>;
    /// Apply the change through the wiki collaborator.
    fn commit(&self, api: &mut dyn WikiWriteApi) -> Result<()>;
}

/// Replace the full text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePageText {
    title: String,
    new_text: String,
    change_description: String,
}

impl ChangePageText {
    pub fn new(title: &str, new_text: &str, change_description: &str) -> Result<Self> {
        if title.trim().is_empty() {
            bail!("page title cannot be empty");
        }
        Ok(Self {
            title: title.to_string(),
            new_text: new_text.to_string(),
            change_description: change_description.to_string(),
        })
    }
}

impl Modification for ChangePageText {
    fn change_description(&self) -> &str {
        &self.change_description
    }

    fn preview(&self, api: &mut dyn WikiReadApi) -> Result<String> {
        let old_text = api.get_page_text(&self.title)?;
        Ok(format!(
            "{}:\n{}\n(changes above on page \"{}\")",
            self.title,
            render_line_diff(&old_text, &self.new_text),
            self.title
        ))
    }

    fn commit(&self, api: &mut dyn WikiWriteApi) -> Result<()> {
        api.edit_page(&self.title, &self.new_text, &self.change_description)
    }
}

/// Line-oriented diff showing only removed and added lines. Context lines
/// are suppressed.
pub fn render_line_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut lines = Vec::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "- ",
            ChangeTag::Insert => "+ ",
            ChangeTag::Equal => continue,
        };
        lines.push(format!(
            "{sign}{}",
            change.value().trim_end_matches(['\r', '\n'])
        ));
    }
    lines.join("\n")
}
