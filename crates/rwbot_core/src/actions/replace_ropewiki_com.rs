use anyhow::{Context, Result};
use regex::Regex;

use crate::actions::BotAction;
use crate::client::WikiReadApi;
use crate::modify::{ChangePageText, Modification};

const CHANGE_DESCRIPTION: &str = "Replace ropewiki.com with SERVER and SERVERNAME magic words";

// Subdomains whose pages intentionally link to the literal host.
const EXCLUSIONS: &[&str] = &["luca."];

/// Finds instances of "ropewiki.com" and replaces them with {{SERVER}} or
/// {{SERVERNAME}}.
pub struct ReplaceRopewikiCom;

pub fn create() -> Box<dyn BotAction> {
    Box::new(ReplaceRopewikiCom)
}

impl BotAction for ReplaceRopewikiCom {
    fn propose_modifications(
        &self,
        api: &mut dyn WikiReadApi,
    ) -> Result<Vec<Box<dyn Modification>>> {
        let hits = api.search_text("ropewiki.com")?;
        let mut changes: Vec<Box<dyn Modification>> = Vec::new();
        for hit in hits {
            let old_text = api.get_page_text(&hit.title)?;
            let new_text = replace_ropewiki(&old_text)?;
            if new_text != old_text {
                changes.push(Box::new(ChangePageText::new(
                    &hit.title,
                    &new_text,
                    CHANGE_DESCRIPTION,
                )?));
            }
        }
        Ok(changes)
    }
}

pub fn replace_ropewiki(text: &str) -> Result<String> {
    let server =
        Regex::new(r"http://ropewiki\.com").context("invalid {{SERVER}} pattern")?;
    let text = server.replace_all(text, "{{SERVER}}").into_owned();

    let servername =
        Regex::new(r"(?i)ropewiki\.com").context("invalid {{SERVERNAME}} pattern")?;
    let mut output = String::with_capacity(text.len());
    let mut last = 0usize;
    for found in servername.find_iter(&text) {
        output.push_str(&text[last..found.start()]);
        if is_excluded(&text, found.start()) {
            output.push_str(found.as_str());
        } else {
            output.push_str("{{SERVERNAME}}");
        }
        last = found.end();
    }
    output.push_str(&text[last..]);
    Ok(output)
}

fn is_excluded(text: &str, match_start: usize) -> bool {
    EXCLUSIONS
        .iter()
        .any(|exclude| text[..match_start].ends_with(exclude))
}
