//! View and explore naming.

/// Prefixes applied to generated view and explore names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    pub view_prefix: String,
    pub explore_prefix: String,
}

impl Naming {
    pub fn new(view_prefix: impl Into<String>, explore_prefix: impl Into<String>) -> Self {
        Self {
            view_prefix: view_prefix.into(),
            explore_prefix: explore_prefix.into(),
        }
    }

    /// Name of the view generated for a semantic model.
    pub fn view_name(&self, model: &str) -> String {
        format!("{}{}", self.view_prefix, model)
    }

    /// Name of the explore generated for a fact model.
    pub fn explore_name(&self, model: &str) -> String {
        format!("{}{}", self.explore_prefix, model)
    }
}
