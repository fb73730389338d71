//! Routing profiles: the keyword tables a deployment answers with
//!
//! A profile is plain data. The same matcher serves every tenant; only the
//! profile differs between deployments.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Profile used when nothing else is configured
pub const DEFAULT_PROFILE_ID: &str = "academia";

/// A named set of trigger substrings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub id: String,
    pub triggers: Vec<String>,
}

impl KeywordGroup {
    /// Whether any trigger occurs in `normalized` (already lowercased input)
    #[must_use]
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t.as_str()))
    }

    fn normalize(&mut self) {
        for trigger in &mut self.triggers {
            *trigger = trigger.to_lowercase();
        }
    }

    fn validate(&self, kind: &str) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Config(format!("{kind} with empty id")));
        }
        if self.triggers.is_empty() {
            return Err(Error::Config(format!("{kind} '{}' has no triggers", self.id)));
        }
        // A blank substring would match nearly every message
        if self.triggers.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::Config(format!(
                "{kind} '{}' has an empty trigger",
                self.id
            )));
        }
        Ok(())
    }
}

/// Canned answer for a route
///
/// A list renders as one message with a line break between entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseTemplate {
    Text(String),
    Lines(Vec<String>),
}

impl ResponseTemplate {
    /// Render to the text sent to the widget
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Lines(lines) => lines.iter().all(|l| l.trim().is_empty()),
        }
    }
}

/// One row of the routing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(flatten)]
    pub group: KeywordGroup,
    pub response: ResponseTemplate,
}

impl Route {
    /// Route identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.group.id
    }
}

/// Ordered routes, evaluated top to bottom
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable(Vec<Route>);

impl RoutingTable {
    /// Build a table from routes in evaluation order
    #[must_use]
    pub const fn new(routes: Vec<Route>) -> Self {
        Self(routes)
    }

    /// First route whose group matches, in table order
    #[must_use]
    pub fn first_match(&self, normalized: &str) -> Option<&Route> {
        self.0.iter().find(|route| route.group.matches(normalized))
    }

    /// Routes in evaluation order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Replies used when no route matches
///
/// Never empty: construction rejects an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FallbackPool(Vec<String>);

impl FallbackPool {
    /// Create a pool
    ///
    /// # Errors
    ///
    /// Returns error if `replies` is empty
    pub fn new(replies: Vec<String>) -> Result<Self> {
        if replies.is_empty() {
            return Err(Error::Config("fallback pool is empty".to_string()));
        }
        Ok(Self(replies))
    }

    /// Pick the reply for `input`: index is the input's character count
    /// modulo the pool size, so equal-length inputs share a reply
    #[must_use]
    pub fn select(&self, input: &str) -> (usize, &str) {
        let index = input.chars().count() % self.0.len();
        (index, &self.0[index])
    }

    /// Replies in pool order
    #[must_use]
    pub fn replies(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for FallbackPool {
    type Error = Error;

    fn try_from(replies: Vec<String>) -> Result<Self> {
        Self::new(replies)
    }
}

impl From<FallbackPool> for Vec<String> {
    fn from(pool: FallbackPool) -> Self {
        pool.0
    }
}

/// Everything a deployment needs to answer chat messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub fallback: FallbackPool,
    #[serde(default)]
    pub routes: RoutingTable,
    /// Display flags, each evaluated independently of the chosen route
    #[serde(default)]
    pub directives: Vec<KeywordGroup>,
}

impl RoutingProfile {
    /// Parse, normalize and validate a profile from TOML
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or the profile is invalid
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut profile: Self = toml::from_str(content)?;
        profile.normalize();
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file from disk
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let profile = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            profile = %profile.id,
            routes = profile.routes.len(),
            "loaded routing profile"
        );
        Ok(profile)
    }

    /// Load a profile compiled into the binary
    ///
    /// # Errors
    ///
    /// Returns error if no embedded profile has this id
    pub fn embedded(id: &str) -> Result<Self> {
        let (_, content) = Self::embedded_profiles()
            .iter()
            .find(|(name, _)| *name == id)
            .ok_or_else(|| Error::ProfileNotFound(id.to_string()))?;
        Self::from_toml(content)
    }

    /// Resolve a profile reference: an existing file path wins, otherwise an
    /// embedded profile id
    ///
    /// # Errors
    ///
    /// Returns error if the reference is neither a valid file nor an embedded id
    pub fn resolve(reference: &str) -> Result<Self> {
        let path = Path::new(reference);
        if path.is_file() {
            return Self::load(path);
        }
        Self::embedded(reference)
    }

    /// Embedded profiles as (id, TOML source)
    #[must_use]
    pub const fn embedded_profiles() -> &'static [(&'static str, &'static str)] {
        &[
            ("academia", include_str!("../../profiles/academia.toml")),
            ("soporte", include_str!("../../profiles/soporte.toml")),
        ]
    }

    /// Display name, falling back to the id
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    fn normalize(&mut self) {
        for route in &mut self.routes.0 {
            route.group.normalize();
        }
        for directive in &mut self.directives {
            directive.normalize();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Config("profile id is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for route in self.routes.routes() {
            route.group.validate("route")?;
            if route.response.is_empty() {
                return Err(Error::Config(format!(
                    "route '{}' has an empty response",
                    route.id()
                )));
            }
            if !seen.insert(route.id()) {
                return Err(Error::Config(format!("duplicate route '{}'", route.id())));
            }
        }

        let mut seen = HashSet::new();
        for directive in &self.directives {
            directive.validate("directive")?;
            if !seen.insert(directive.id.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate directive '{}'",
                    directive.id
                )));
            }
        }

        Ok(())
    }
}
