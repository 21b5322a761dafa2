//! Embedded email templates
//!
//! Every template is a pair of Handlebars sources, `subject` and `body`, read
//! from `templates/<name>/` at build time. Templates render in strict mode, so
//! a field the template references but the data lacks is an error rather than
//! an empty string.

use std::fmt;

use handlebars::{no_escape, Handlebars};
use serde_json::Value;
use tracing::debug;

use crate::domain::communication::errors::MailError;

macro_rules! embedded_template {
    ($name:literal) => {
        TemplateSource {
            name: $name,
            subject: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/templates/",
                $name,
                "/subject.hbs"
            )),
            body: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/templates/",
                $name,
                "/body.hbs"
            )),
        }
    };
}

/// Templates compiled into the crate, sorted by name
pub const EMBEDDED_TEMPLATES: &[TemplateSource] = &[
    embedded_template!("password_reset"),
    embedded_template!("user_invitation"),
    embedded_template!("welcome"),
];

/// Raw sources of a single template
#[derive(Debug, Clone, Copy)]
pub struct TemplateSource {
    /// Name callers use to select the template
    pub name: &'static str,

    /// Source of the `subject` section
    pub subject: &'static str,

    /// Source of the `body` section
    pub body: &'static str,
}

/// A named, independently renderable part of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The message subject line
    Subject,

    /// The HTML message body
    Body,
}

impl Section {
    /// The section name as it appears on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject and body rendered from one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// Rendered subject, trimmed of surrounding whitespace
    pub subject: String,

    /// Rendered HTML body
    pub body: String,
}

/// A compiled set of templates
pub struct TemplateSet {
    names: Vec<&'static str>,
    subjects: Handlebars<'static>,
    bodies: Handlebars<'static>,
}

impl TemplateSet {
    /// Compiles the templates embedded in the crate.
    pub fn embedded() -> Result<Self, MailError> {
        Self::from_sources(EMBEDDED_TEMPLATES)
    }

    /// Compiles the given template sources.
    ///
    /// Subjects are rendered without escaping since they end up in a header,
    /// bodies are HTML-escaped. A body that has to embed pre-rendered HTML from
    /// the data uses a triple-stash, `{{{field}}}`, which skips escaping.
    pub fn from_sources(sources: &[TemplateSource]) -> Result<Self, MailError> {
        let mut subjects = Handlebars::new();
        subjects.set_strict_mode(true);
        subjects.register_escape_fn(no_escape);

        let mut bodies = Handlebars::new();
        bodies.set_strict_mode(true);

        let mut names = Vec::with_capacity(sources.len());

        for source in sources {
            let invalid = |e| MailError::InvalidTemplate {
                template: source.name.to_string(),
                source: Box::new(e),
            };

            subjects
                .register_template_string(source.name, source.subject)
                .map_err(invalid)?;
            bodies
                .register_template_string(source.name, source.body)
                .map_err(invalid)?;

            names.push(source.name);
        }

        names.sort_unstable();
        names.dedup();

        debug!(templates = ?names, "compiled email templates");

        Ok(Self {
            names,
            subjects,
            bodies,
        })
    }

    /// Returns `true` if a template with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| *known == name)
    }

    /// Names of all templates in the set, sorted.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Renders one section of a template.
    ///
    /// # Errors
    /// - [`MailError::TemplateNotFound`] if `name` is not in the set.
    /// - [`MailError::RenderError`] if the data does not satisfy the section.
    pub fn render_section(
        &self,
        name: &str,
        section: Section,
        data: &Value,
    ) -> Result<String, MailError> {
        if !self.contains(name) {
            return Err(MailError::TemplateNotFound(name.to_string()));
        }

        let registry = match section {
            Section::Subject => &self.subjects,
            Section::Body => &self.bodies,
        };

        let rendered = registry
            .render(name, data)
            .map_err(|source| MailError::RenderError {
                template: name.to_string(),
                section,
                source,
            })?;

        Ok(match section {
            Section::Subject => rendered.trim().to_string(),
            Section::Body => rendered,
        })
    }

    /// Renders the subject and then the body of a template.
    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate, MailError> {
        let subject = self.render_section(name, Section::Subject, data)?;
        let body = self.render_section(name, Section::Body, data)?;

        Ok(RenderedTemplate { subject, body })
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("templates", &self.names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_embedded_templates_are_listed_by_name() -> TestResult {
        let templates = TemplateSet::embedded()?;

        assert_eq!(
            templates.names(),
            &["password_reset", "user_invitation", "welcome"]
        );
        assert!(templates.contains("welcome"));
        assert!(!templates.contains("welcome.hbs"));

        Ok(())
    }

    #[test]
    fn test_render_welcome() -> TestResult {
        let templates = TemplateSet::embedded()?;

        let rendered = templates.render("welcome", &json!({ "Name": "Alice" }))?;

        assert_eq!(rendered.subject, "Welcome, Alice!");
        assert!(rendered.body.contains("<p>Hi Alice,</p>"));

        Ok(())
    }

    #[test]
    fn test_render_user_invitation() -> TestResult {
        let templates = TemplateSet::embedded()?;

        let rendered = templates.render(
            "user_invitation",
            &json!({
                "Username": "bob",
                "ActivationURL": "https://example.com/confirm/abc123",
            }),
        )?;

        assert_eq!(rendered.subject, "Finish your registration, bob");
        assert!(rendered.body.contains("https://example.com/confirm/abc123"));

        Ok(())
    }

    #[test]
    fn test_render_is_deterministic() -> TestResult {
        let templates = TemplateSet::embedded()?;
        let data = json!({ "Username": "carol", "ResetURL": "https://example.com/reset/xyz" });

        let first = templates.render("password_reset", &data)?;
        let second = templates.render("password_reset", &data)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    fn test_unknown_template() -> TestResult {
        let templates = TemplateSet::embedded()?;

        let result = templates.render("goodbye", &json!({}));

        assert!(matches!(result, Err(MailError::TemplateNotFound(name)) if name == "goodbye"));

        Ok(())
    }

    #[test]
    fn test_missing_field_is_a_render_error() -> TestResult {
        let templates = TemplateSet::embedded()?;

        let result = templates.render("welcome", &json!({ "Username": "Alice" }));

        assert!(matches!(
            result,
            Err(MailError::RenderError {
                section: Section::Subject,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn test_missing_body_field_is_a_render_error() -> TestResult {
        let templates = TemplateSet::from_sources(&[TemplateSource {
            name: "receipt",
            subject: "Your receipt",
            body: "<p>Total: {{total}}</p>",
        }])?;

        let result = templates.render("receipt", &json!({ "amount": 3 }));

        assert!(matches!(
            result,
            Err(MailError::RenderError {
                section: Section::Body,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn test_nested_field_access() -> TestResult {
        let templates = TemplateSet::from_sources(&[TemplateSource {
            name: "digest",
            subject: "{{user.name}}, you have {{count}} new posts",
            body: "<ul>{{#each posts}}<li>{{title}}</li>{{/each}}</ul>",
        }])?;

        let rendered = templates.render(
            "digest",
            &json!({
                "user": { "name": "Dana" },
                "count": 2,
                "posts": [{ "title": "One" }, { "title": "Two" }],
            }),
        )?;

        assert_eq!(rendered.subject, "Dana, you have 2 new posts");
        assert_eq!(rendered.body, "<ul><li>One</li><li>Two</li></ul>");

        Ok(())
    }

    #[test]
    fn test_body_is_escaped_and_subject_is_not() -> TestResult {
        let templates = TemplateSet::embedded()?;

        let rendered = templates.render("welcome", &json!({ "Name": "Tom & <Jerry>" }))?;

        assert_eq!(rendered.subject, "Welcome, Tom & <Jerry>!");
        assert!(rendered.body.contains("Tom &amp; &lt;Jerry&gt;"));

        Ok(())
    }

    #[test]
    fn test_triple_stash_keeps_html_in_body() -> TestResult {
        let templates = TemplateSet::from_sources(&[TemplateSource {
            name: "digest",
            subject: "Your digest",
            body: "<div>{{{summary}}}</div><p>{{note}}</p>",
        }])?;

        let rendered = templates.render(
            "digest",
            &json!({ "summary": "<b>3 new posts</b>", "note": "<i>hi</i>" }),
        )?;

        assert_eq!(
            rendered.body,
            "<div><b>3 new posts</b></div><p>&lt;i&gt;hi&lt;/i&gt;</p>"
        );

        Ok(())
    }

    #[test]
    fn test_invalid_template_source() {
        let result = TemplateSet::from_sources(&[TemplateSource {
            name: "broken",
            subject: "{{#if Name}}unterminated",
            body: "",
        }]);

        assert!(matches!(
            result,
            Err(MailError::InvalidTemplate { template, .. }) if template == "broken"
        ));
    }
}
