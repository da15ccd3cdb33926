//! Entity path arguments: `<section>~<type>/<name>[/<task>[/<version>]]`
//!
//! `assets~character/hero/modeling/v0003` names version 3 of the modeling
//! task of the `hero` character in the `assets` section.

use crate::version::Version;
use procedure::{Expander, ProcedureContext, ProcessError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Section that holds assets; every other section holds shots or sequences
pub const ASSET_SECTION: &str = "assets";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntityPathError {
    #[error("'{0}' is not an entity path (expected <section>~<type>/<name>)")]
    Malformed(String),

    #[error("entity path '{path}' has an empty {part}")]
    Empty { path: String, part: &'static str },

    #[error("entity path '{0}' has too many parts")]
    TooLong(String),

    #[error(transparent)]
    Version(#[from] crate::version::InvalidVersion),
}

/// Parsed entity path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPath {
    pub section: String,
    pub entity_type: String,
    pub name: String,
    pub task: Option<String>,
    pub version: Option<Version>,
}

impl EntityPath {
    pub fn is_asset(&self) -> bool {
        self.section == ASSET_SECTION
    }

    /// Write the parsed fields into the run's path context
    pub fn fill(&self, ctx: &mut ProcedureContext) {
        ctx.set_path("section", self.section.as_str());
        ctx.set_path("entity_type", self.entity_type.as_str());
        ctx.set_path("entity_name", self.name.as_str());
        if let Some(task) = &self.task {
            ctx.set_path("task", task.as_str());
        }
        if let Some(version) = self.version {
            ctx.set_path("version", version.to_string());
        }
    }
}

impl FromStr for EntityPath {
    type Err = EntityPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (section, entity) = s
            .split_once('~')
            .ok_or_else(|| EntityPathError::Malformed(s.to_string()))?;

        let empty = |part| EntityPathError::Empty {
            path: s.to_string(),
            part,
        };

        if section.is_empty() {
            return Err(empty("section"));
        }

        let parts: Vec<&str> = entity.split('/').collect();
        if parts.len() < 2 {
            return Err(EntityPathError::Malformed(s.to_string()));
        }
        if parts.len() > 4 {
            return Err(EntityPathError::TooLong(s.to_string()));
        }

        for (part, label) in parts.iter().zip(["type", "name", "task", "version"]) {
            if part.is_empty() {
                return Err(empty(label));
            }
        }

        Ok(Self {
            section: section.to_string(),
            entity_type: parts[0].to_string(),
            name: parts[1].to_string(),
            task: parts.get(2).map(ToString::to_string),
            version: parts.get(3).map(|v| v.parse()).transpose()?,
        })
    }
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}/{}", self.section, self.entity_type, self.name)?;
        if let Some(task) = &self.task {
            write!(f, "/{task}")?;
        }
        if let Some(version) = self.version {
            write!(f, "/{version}")?;
        }
        Ok(())
    }
}

/// Before-check expander that fills the path context from the run argument
///
/// Arguments that are not entity paths leave the context untouched.
pub fn entity_expander() -> impl Expander + 'static {
    |ctx: &mut ProcedureContext| -> Result<(), ProcessError> {
        match ctx.argument().parse::<EntityPath>() {
            Ok(entity) => {
                log::debug!(
                    "Argument is {} entity {}",
                    if entity.is_asset() { "an asset" } else { "a shot" },
                    entity
                );
                entity.fill(ctx);
            }
            Err(err) => log::debug!("Argument not used as entity path: {}", err),
        }
        Ok(())
    }
}
