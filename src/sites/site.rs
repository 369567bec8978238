// src/sites/site.rs
// =============================================================================
// A Site is one row of the site list: a display name plus a URL template.
//
// The template may contain the placeholder `$`. Resolving a site swaps every
// placeholder for the username we are searching for:
//
//   "https://github.com/$"  +  "bob"  ->  "https://github.com/bob"
//
// Resolution always starts from the template, never from a previous result,
// so resolving twice with the same identity gives the same URL.
// =============================================================================

/// The marker in a URL template that is replaced by the identity.
pub const PLACEHOLDER: &str = "$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    name: String,
    url_template: String,
    /// Equal to the template until the site is resolved
    resolved_url: String,
}

impl Site {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        let url_template = url_template.into();
        Self {
            name: name.into(),
            resolved_url: url_template.clone(),
            url_template,
        }
    }

    // Returns a copy of this site with the placeholder replaced by `identity`.
    //
    // An empty identity is legal and simply removes the placeholder.
    // A template without a placeholder resolves to itself.
    pub fn resolve(&self, identity: &str) -> Site {
        Site {
            name: self.name.clone(),
            url_template: self.url_template.clone(),
            resolved_url: self.url_template.replace(PLACEHOLDER, identity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn resolved_url(&self) -> &str {
        &self.resolved_url
    }

    pub fn has_placeholder(&self) -> bool {
        self.url_template.contains(PLACEHOLDER)
    }
}
