//! Extraction rule registry.
//!
//! Method rules match calls by simple method name only: `tr` matches
//! `i18n.tr(..)`, `Messages.tr(..)` and a local `tr(..)` alike, whatever the
//! parameter types. Annotation rules match by qualified annotation name.

use std::{
    collections::HashMap,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ANNOTATION_FIELD: &str = "value";

/// A translatable method signature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MethodRule {
    pub name: String,
    /// 0-based index of the singular text argument.
    #[serde(default)]
    pub singular_index: usize,
    /// 0-based index of the plural text argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural_index: Option<usize>,
}

impl MethodRule {
    pub fn new(
        name: impl Into<String>,
        singular_index: usize,
        plural_index: Option<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            singular_index,
            plural_index,
        }
    }
}

/// Parses xgettext keyword syntax with 1-based indexes: `tr`, `trc:2`, `trn:1,2`.
impl FromStr for MethodRule {
    type Err = RuleError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = || RuleError::InvalidKeyword(spec.to_string());
        let (name, indexes) = match spec.split_once(':') {
            Some((name, indexes)) => (name, Some(indexes)),
            None => (spec, None),
        };
        let parse_index = |s: &str| -> Result<usize, RuleError> {
            match s.trim().parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(invalid()),
            }
        };
        let (singular_index, plural_index) = match indexes {
            None => (0, None),
            Some(indexes) => match indexes.split_once(',') {
                Some((singular, plural)) => (parse_index(singular)?, Some(parse_index(plural)?)),
                None => (parse_index(indexes)?, None),
            },
        };
        let rule = MethodRule::new(name.trim(), singular_index, plural_index);
        rule.validate()?;
        Ok(rule)
    }
}

/// A translatable annotation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnnotationRule {
    /// Fully qualified annotation name.
    pub name: String,
    #[serde(default = "default_annotation_fields")]
    pub fields: Vec<String>,
}

fn default_annotation_fields() -> Vec<String> {
    vec![DEFAULT_ANNOTATION_FIELD.to_string()]
}

impl AnnotationRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: default_annotation_fields(),
        }
    }

    pub fn with_fields(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Parses `org.example.Tr` or `org.example.Tr:value,label`.
impl FromStr for AnnotationRule {
    type Err = RuleError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let rule = match spec.split_once(':') {
            Some((name, fields)) => AnnotationRule {
                name: name.trim().to_string(),
                fields: fields
                    .split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect(),
            },
            None => AnnotationRule::new(spec.trim()),
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("keyword rule has an empty method name")]
    EmptyMethodName,
    #[error("keyword '{name}' uses argument {index} for both singular and plural")]
    SamePluralIndex { name: String, index: usize },
    #[error("keyword '{0}' is defined more than once")]
    DuplicateMethod(String),
    #[error("invalid keyword specification '{0}' (expected name[:S[,P]])")]
    InvalidKeyword(String),
    #[error("annotation rule has an empty name")]
    EmptyAnnotationName,
    #[error("annotation '{0}' has no fields to extract")]
    NoAnnotationFields(String),
    #[error("annotation '{0}' is defined more than once")]
    DuplicateAnnotation(String),
}

impl MethodRule {
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name.trim().is_empty() {
            return Err(RuleError::EmptyMethodName);
        }
        if self.plural_index == Some(self.singular_index) {
            return Err(RuleError::SamePluralIndex {
                name: self.name.clone(),
                index: self.singular_index,
            });
        }
        Ok(())
    }
}

impl AnnotationRule {
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name.trim().is_empty() {
            return Err(RuleError::EmptyAnnotationName);
        }
        if self.fields.is_empty() || self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(RuleError::NoAnnotationFields(self.name.clone()));
        }
        Ok(())
    }
}

/// Validated, immutable lookup tables for method and annotation rules.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    methods: HashMap<String, MethodRule>,
    annotations: HashMap<String, AnnotationRule>,
}

impl RuleRegistry {
    pub fn new(
        methods: impl IntoIterator<Item = MethodRule>,
        annotations: impl IntoIterator<Item = AnnotationRule>,
    ) -> Result<Self, RuleError> {
        let mut registry = Self::default();
        for rule in methods {
            rule.validate()?;
            if registry.methods.contains_key(&rule.name) {
                return Err(RuleError::DuplicateMethod(rule.name));
            }
            registry.methods.insert(rule.name.clone(), rule);
        }
        for rule in annotations {
            rule.validate()?;
            if registry.annotations.contains_key(&rule.name) {
                return Err(RuleError::DuplicateAnnotation(rule.name));
            }
            registry.annotations.insert(rule.name.clone(), rule);
        }
        Ok(registry)
    }

    pub fn find_method_rule(&self, name: &str) -> Option<&MethodRule> {
        self.methods.get(name)
    }

    pub fn find_annotation_rule(&self, qualified_name: &str) -> Option<&AnnotationRule> {
        self.annotations.get(qualified_name)
    }
}
