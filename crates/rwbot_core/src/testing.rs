use std::collections::BTreeMap;

use anyhow::Result;

use crate::client::{SearchHit, WikiReadApi, WikiWriteApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEdit {
    pub title: String,
    pub text: String,
    pub summary: String,
}

/// In-memory wiki used by unit tests in place of the HTTP client.
#[derive(Default)]
pub struct MockWiki {
    pub pages: BTreeMap<String, String>,
    pub search_hits: Vec<SearchHit>,
    pub edits: Vec<RecordedEdit>,
    pub login_required: bool,
    pub logged_in: bool,
}

impl MockWiki {
    pub fn hit(title: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            namespace: 0,
            page_id: 1,
            snippet: String::new(),
        }
    }
}

impl WikiReadApi for MockWiki {
    fn search_text(&mut self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(self.search_hits.clone())
    }

    fn get_page_text(&mut self, title: &str) -> Result<String> {
        Ok(self.pages.get(title).cloned().unwrap_or_default())
    }
}

impl WikiWriteApi for MockWiki {
    fn login(&mut self, _username: &str, _password: &str) -> Result<()> {
        self.logged_in = true;
        Ok(())
    }

    fn edit_page(&mut self, title: &str, text: &str, summary: &str) -> Result<()> {
        if self.login_required && !self.logged_in {
            anyhow::bail!("not logged in");
        }
        self.edits.push(RecordedEdit {
            title: title.to_string(),
            text: text.to_string(),
            summary: summary.to_string(),
        });
        self.pages.insert(title.to_string(), text.to_string());
        Ok(())
    }
}
