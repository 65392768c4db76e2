//! Parse options
//!
//! Element and attribute filters are plain predicates over the tag or
//! attribute name. They must be `Send + Sync` so one options value can be
//! shared by conversions running on several threads.

use std::collections::HashSet;
use std::fmt;

/// Predicate deciding whether a tag or attribute name is kept
pub type NameFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Deepest element nesting accepted by default
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Options recognized by the tokenizer and the AST builder
pub struct ParseOptions {
    known_element: Option<NameFilter>,
    known_attribute: Option<NameFilter>,
    strict_close_tags: bool,
    max_depth: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            known_element: None,
            known_attribute: None,
            strict_close_tags: false,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ParseOptions {
    /// Options with no filters and position-based close-tag matching
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only elements (other than the document root) accepted by `filter`
    pub fn with_known_element<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.known_element = Some(Box::new(filter));
        self
    }

    /// Keep only attributes accepted by `filter`
    pub fn with_known_attribute<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.known_attribute = Some(Box::new(filter));
        self
    }

    /// Require `</name>` to repeat the name of the element it closes
    pub fn with_strict_close_tags(mut self, strict: bool) -> Self {
        self.strict_close_tags = strict;
        self
    }

    /// Limit how deeply kept elements may nest; `None` removes the limit
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build membership filters from optional name lists (`None` keeps everything)
    pub fn from_name_lists(elements: Option<Vec<String>>, attributes: Option<Vec<String>>) -> Self {
        let mut options = Self::new();
        if let Some(names) = elements {
            let names: HashSet<String> = names.into_iter().collect();
            options = options.with_known_element(move |name| names.contains(name));
        }
        if let Some(names) = attributes {
            let names: HashSet<String> = names.into_iter().collect();
            options = options.with_known_attribute(move |name| names.contains(name));
        }
        options
    }

    /// Whether an element with this tag name is kept
    #[inline]
    pub fn is_known_element(&self, tag_name: &str) -> bool {
        self.known_element.as_ref().map_or(true, |f| f(tag_name))
    }

    /// Whether an attribute with this name is kept
    #[inline]
    pub fn is_known_attribute(&self, name: &str) -> bool {
        self.known_attribute.as_ref().map_or(true, |f| f(name))
    }

    pub fn strict_close_tags(&self) -> bool {
        self.strict_close_tags
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("known_element", &self.known_element.is_some())
            .field("known_attribute", &self.known_attribute.is_some())
            .field("strict_close_tags", &self.strict_close_tags)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
