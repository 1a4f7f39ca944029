//! Description escaping and link markup per output syntax
//!
//! Raw description text is escaped exactly once, when a page view is built.

use apidocs_gen_common::Definition;

/// Target markup of a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Html,
    Markdown,
}

impl Syntax {
    /// Escape raw description text for this syntax
    ///
    /// HTML gets entity escaping. Markdown additionally protects quoted
    /// asterisks (`'*'`, `'*/*'`, ...) from being read as emphasis.
    pub fn escape(self, text: &str) -> String {
        match self {
            Syntax::Html => escape_html(text),
            Syntax::Markdown => escape_html(&escape_asterisks(text)),
        }
    }

    /// Link to a definition as used inside field types
    pub fn definition_link(self, definition: &Definition) -> String {
        match self {
            Syntax::Html => href_link(definition),
            Syntax::Markdown => md_link(definition),
        }
    }

    /// Replace the kind inside a display type with a link to its definition
    pub fn type_link(self, type_name: &str, definition: Option<&Definition>) -> String {
        match definition {
            Some(d) => type_name.replace(&d.name, &self.definition_link(d)),
            None => type_name.to_string(),
        }
    }
}

/// Entity-escape `<`, `>`, `&`, `'` and `"`
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&#34;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Backslash-escape quoted asterisks: `'*'`, `'a/*'`, `'*/b'` and `'*/*'`
pub fn escape_asterisks(text: &str) -> String {
    text.replace("'*'", r"'\*'")
        .replace("/*'", r"/\*'")
        .replace("'*/", r"'\*/")
        .replace("'*/*'", r"'\*/\*'")
}

/// Anchor form of a heading: dots and spaces become dashes, lowercased
pub fn anchor(text: &str) -> String {
    text.replace(|c| c == '.' || c == ' ', "-").to_lowercase()
}

pub fn md_link(d: &Definition) -> String {
    format!("[{}](#{})", d.name, d.link_id())
}

pub fn href_link(d: &Definition) -> String {
    format!("<a href=\"#{}\">{}</a>", d.link_id(), d.name)
}

/// Link showing the group and version next to the kind
pub fn full_href_link(d: &Definition) -> String {
    format!(
        "<a href=\"#{}\">{} [{}/{}]</a>",
        d.link_id(),
        d.name,
        d.group,
        d.version
    )
}

/// Link labelled with the version only
pub fn version_link(d: &Definition) -> String {
    format!("<a href=\"#{}\">{}</a>", d.link_id(), d.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidocs_gen_common::ApiVersion;

    fn role() -> Definition {
        Definition {
            name: "Role".to_string(),
            group: "rbac".to_string(),
            group_full_name: "rbac.authorization.k8s.io".to_string(),
            version: ApiVersion::new("v1"),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape_asterisks() {
        assert_eq!(escape_asterisks("'*' means all"), r"'\*' means all");
        assert_eq!(escape_asterisks("'apps/*'"), r"'apps/\*'");
        assert_eq!(escape_asterisks("'*/scale'"), r"'\*/scale'");
        assert_eq!(escape_asterisks("'*/*'"), r"'\*/\*'");
        assert_eq!(escape_asterisks("a * b"), "a * b");
    }

    #[test]
    fn test_escape_per_syntax() {
        let text = "Use '*' for <all> & \"any\"";
        assert_eq!(
            Syntax::Html.escape(text),
            "Use &#39;*&#39; for &lt;all&gt; &amp; &#34;any&#34;"
        );
        assert_eq!(
            Syntax::Markdown.escape(text),
            r"Use &#39;\*&#39; for &lt;all&gt; &amp; &#34;any&#34;"
        );
    }

    #[test]
    fn test_links() {
        let d = role();
        assert_eq!(md_link(&d), "[Role](#role-v1-rbac-authorization-k8s-io)");
        assert_eq!(
            full_href_link(&d),
            "<a href=\"#role-v1-rbac-authorization-k8s-io\">Role [rbac/v1]</a>"
        );
        assert_eq!(
            version_link(&d),
            "<a href=\"#role-v1-rbac-authorization-k8s-io\">v1</a>"
        );
        assert_eq!(
            Syntax::Markdown.type_link("Role array", Some(&d)),
            "[Role](#role-v1-rbac-authorization-k8s-io) array"
        );
        assert_eq!(Syntax::Html.type_link("string", None), "string");
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("Role v1 rbac.authorization.k8s.io"), "role-v1-rbac-authorization-k8s-io");
        assert_eq!(anchor("Write Operations"), "write-operations");
    }
}
