//! Query templates with `$VARIABLE$` placeholders
//!
//! A [`QueryBuilder`] collects the parts of a query template through repeated
//! [`QueryBuilder::push`] calls. [`QueryBuilder::build`] then replaces every
//! `$NAME$` placeholder with the literal form of the bound value, or with the
//! free variable `?name` when the caller did not bind it.

use crate::entity::literal::LiteralRegistry;
use crate::entity::traits::PropertyTypes;
use crate::entity::types::{EntityError, EntityResult, Params};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::trace;

// at most one placeholder per part is recognized
static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Z]+)\$").expect("variable pattern is valid"));

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    entity_type: &'static str,
    parts: Vec<String>,
    variable_types: PropertyTypes,
    literals: Arc<LiteralRegistry>,
}

impl QueryBuilder {
    /// Create a builder that can bind the variables declared in `variable_types`
    pub fn new(entity_type: &'static str, variable_types: PropertyTypes, literals: Arc<LiteralRegistry>) -> Self {
        Self {
            entity_type,
            parts: Vec::new(),
            variable_types,
            literals,
        }
    }

    /// Append one part of the template
    pub fn push<P: Into<String>>(&mut self, part: P) -> &mut Self {
        self.parts.push(part.into());
        self
    }

    /// Substitute placeholders using `bindings` and join the parts with single spaces
    pub fn build(self, bindings: &Params) -> EntityResult<String> {
        let parts = self
            .parts
            .iter()
            .map(|part| self.bind_part(part, bindings))
            .collect::<EntityResult<Vec<_>>>()?;

        let query = parts.join(" ");
        trace!(entity = self.entity_type, %query, "built query");
        Ok(query)
    }

    fn bind_part(&self, part: &str, bindings: &Params) -> EntityResult<String> {
        let Some(captures) = VARIABLE_RE.captures(part) else {
            return Ok(part.to_string());
        };
        let token = &captures[0];
        let variable = captures[1].to_lowercase();

        let replacement = match bindings.get(&variable) {
            Some(value) => {
                let literal_type = self
                    .variable_types
                    .get(&variable)
                    .ok_or_else(|| EntityError::undeclared_variable(self.entity_type, &variable))?;
                self.literals
                    .to_literal(Some(value), literal_type)?
                    .unwrap_or_default()
            }
            None => format!("?{}", variable),
        };

        Ok(part.replacen(token, &replacement, 1))
    }
}
