//! First-match-wins keyword matcher

use std::sync::Arc;

use serde::Serialize;

use super::RoutingProfile;
use crate::{Error, Result};

/// How the reply text was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selection {
    /// A route matched; carries its id
    Route(String),
    /// No route matched; carries the fallback pool index
    Fallback(usize),
}

/// A display flag evaluated for a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveFlag {
    pub name: String,
    pub active: bool,
}

/// Matcher output for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub selection: Selection,
    /// One flag per profile directive, in declaration order
    pub directives: Vec<DirectiveFlag>,
}

impl Reply {
    /// Value of a directive, if the profile declares it
    #[must_use]
    pub fn directive(&self, name: &str) -> Option<bool> {
        self.directives
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.active)
    }
}

/// Selects canned replies for chat messages
///
/// Stateless; clones share the same profile.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    profile: Arc<RoutingProfile>,
}

impl IntentMatcher {
    /// Create a matcher over a validated profile
    #[must_use]
    pub fn new(profile: RoutingProfile) -> Self {
        Self {
            profile: Arc::new(profile),
        }
    }

    /// Active profile
    #[must_use]
    pub fn profile(&self) -> &RoutingProfile {
        &self.profile
    }

    /// Choose the reply for `message`
    ///
    /// Routes are tried in table order and the first whose triggers occur in
    /// the lowercased message wins. Without a match the fallback pool is
    /// indexed by message length. Directives are evaluated separately against
    /// the same lowercased text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the message is empty or whitespace
    pub fn respond(&self, message: &str) -> Result<Reply> {
        if message.trim().is_empty() {
            return Err(Error::InvalidRequest("No message provided"));
        }

        let normalized = message.to_lowercase();

        let (text, selection) = if let Some(route) = self.profile.routes.first_match(&normalized)
        {
            tracing::debug!(route = route.id(), "route matched");
            (route.response.render(), Selection::Route(route.id().to_string()))
        } else {
            let (index, text) = self.profile.fallback.select(message);
            tracing::debug!(index, "no route matched, using fallback");
            (text.to_string(), Selection::Fallback(index))
        };

        let directives = self
            .profile
            .directives
            .iter()
            .map(|group| DirectiveFlag {
                name: group.id.clone(),
                active: group.matches(&normalized),
            })
            .collect();

        Ok(Reply {
            text,
            selection,
            directives,
        })
    }
}
