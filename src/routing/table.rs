//! Routing table built from `functionality:destination` tokens.
//!
//! We validate every token before anything is spawned:
//! - the token must contain a ':' separator (split on the first one)
//! - the destination must be `stdout` or `stderr`
//! - a functionality may be routed at most once
//! - the functionality must be one of the known names

use crate::routing::{Destination, Functionality};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("malformed routing token '{0}': expected functionality:destination")]
    MissingSeparator(String),

    #[error("unknown stream '{0}'")]
    UnknownDestination(String),

    #[error("{0} is directed to more than one output stream")]
    Duplicate(String),

    #[error("invalid functionality '{0}'")]
    UnknownFunctionality(String),
}

/// Validated functionality -> destination mapping. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoutingTable {
    routes: BTreeMap<Functionality, Destination>,
}

impl RoutingTable {
    /// Build a table from command-line tokens, stopping at the first bad one.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, RoutingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut routes = BTreeMap::new();

        for token in tokens {
            let token = token.as_ref();
            let (func, dest) = token
                .split_once(':')
                .ok_or_else(|| RoutingError::MissingSeparator(token.to_string()))?;

            let dest = Destination::parse(dest)
                .ok_or_else(|| RoutingError::UnknownDestination(dest.to_string()))?;

            // An alias and its canonical name are the same functionality.
            let parsed = Functionality::parse(func);
            if parsed.is_some_and(|f| routes.contains_key(&f)) {
                return Err(RoutingError::Duplicate(func.to_string()));
            }

            let func =
                parsed.ok_or_else(|| RoutingError::UnknownFunctionality(func.to_string()))?;
            routes.insert(func, dest);
        }

        Ok(Self { routes })
    }

    pub fn get(&self, func: Functionality) -> Option<Destination> {
        self.routes.get(&func).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}
