//! Allow-lists for function calls inside style values and selectors.

/// Which function names a style may call.
///
/// `url(...)` is not listed: it is always parsed, and whether its target is
/// acceptable is a policy decision made by the consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionPolicy {
    /// Functions allowed in property values, such as `rgb(...)`.
    pub terms: Vec<String>,
    /// Functional pseudo-classes allowed in selectors, such as `:lang(...)`.
    pub pseudo_classes: Vec<String>,
}

impl Default for FunctionPolicy {
    fn default() -> Self {
        Self {
            terms: vec!["rgb".to_string(), "counter".to_string()],
            pseudo_classes: vec!["lang".to_string()],
        }
    }
}

impl FunctionPolicy {
    /// A policy that allows no functions besides `url`.
    pub fn none() -> Self {
        Self {
            terms: Vec::new(),
            pseudo_classes: Vec::new(),
        }
    }

    pub fn allows_term(&self, name: &str) -> bool {
        contains_folded(&self.terms, name)
    }

    pub fn allows_pseudo_class(&self, name: &str) -> bool {
        contains_folded(&self.pseudo_classes, name)
    }
}

fn contains_folded(list: &[String], name: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(name))
}
