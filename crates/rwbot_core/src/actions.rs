use anyhow::Result;

use crate::client::WikiReadApi;
use crate::modify::Modification;

pub mod replace_ropewiki_com;

/// A strategy that inspects the wiki and proposes a batch of modifications.
///
/// Proposal performs only reads; writes happen later, one at a time, after
/// operator confirmation.
pub trait BotAction {
    fn propose_modifications(&self, api: &mut dyn WikiReadApi)
    -> Result<Vec<Box<dyn Modification>>>;
}

type ActionConstructor = fn() -> Box<dyn BotAction>;

static REGISTRY: &[(&str, ActionConstructor)] = &[(
    "replace_ropewiki_com",
    replace_ropewiki_com::create,
)];

/// Instantiate a registered action by its CLI name.
pub fn create_action(name: &str) -> Option<Box<dyn BotAction>> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, constructor)| constructor())
}

pub fn action_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}
