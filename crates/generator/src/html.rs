//! Single-page HTML backend
//!
//! Every section is written as a fragment under `includes/`. On finalize the
//! fragments are concatenated in ToC order into `build/index.html`, next to a
//! sidebar navigation and `build/navData.js` for the scroll-spy script.

use crate::escape::{anchor, Syntax};
use crate::templates::{load_templates, render};
use crate::views::ViewBuilder;
use crate::writer::{
    concept_file_name, definition_file_name, write_include, write_static_file, DocWriter, TocItem,
};
use apidocs_gen_common::{Definition, Resource, Result, RunOptions};
use apidocs_gen_parser::ApiReference;
use serde::Serialize;
use std::fs;
use tera::{Context, Tera};
use tracing::{info, warn};

/// Entry of the navigation data consumed by `scroll.js`
#[derive(Debug, Serialize, PartialEq, Eq)]
struct NavSection {
    section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subsections: Option<Vec<NavSection>>,
}

#[derive(Debug, Serialize)]
struct NavData {
    toc: Vec<NavSection>,
    #[serde(rename = "flatToc")]
    flat_toc: Vec<String>,
}

pub struct HtmlWriter<'a> {
    reference: &'a ApiReference,
    options: &'a RunOptions,
    views: ViewBuilder<'a>,
    tera: Tera,
    toc: Vec<TocItem>,
}

impl<'a> HtmlWriter<'a> {
    pub fn new(reference: &'a ApiReference, options: &'a RunOptions) -> Result<Self> {
        Ok(Self {
            reference,
            options,
            views: ViewBuilder::new(reference, Syntax::Html),
            tera: load_templates()?,
            toc: Vec::new(),
        })
    }

    fn write_section_page(&mut self, file: &str, title: &str, toc_title: &str) -> Result<()> {
        write_static_file(self.options, file, &self.default_static_content(title))?;
        self.toc.push(
            toc_item(1, toc_title, format!("-strong-{}-strong-", anchor(title))).with_file(file),
        );
        Ok(())
    }

    /// Fragments in ToC order
    fn page_content(&self) -> Result<String> {
        let includes = self.options.includes_dir();
        let mut content = String::new();
        for section in &self.toc {
            let items = std::iter::once(section)
                .chain(section.sub_sections.iter())
                .chain(section.sub_sections.iter().flat_map(|s| s.sub_sections.iter()));
            for item in items {
                if let Some(file) = &item.file {
                    content.push_str(&fs::read_to_string(includes.join(file))?);
                }
            }
        }
        Ok(content)
    }
}

/// Sidebar markup: one list per top-level section, children hidden until expanded
fn nav_content(toc: &[TocItem]) -> String {
    let mut nav = String::new();
    for section in toc {
        nav.push_str("<UL>\n");
        nav_entry(&mut nav, " ", section);
        if !section.sub_sections.is_empty() {
            nav.push_str(&format!(
                " <UL id=\"{}-nav\" style=\"display: none;\">\n",
                section.link
            ));
            for sub in &section.sub_sections {
                nav_entry(&mut nav, "  ", sub);
                if !sub.sub_sections.is_empty() {
                    nav.push_str(&format!(
                        "  <UL id=\"{}-nav\" style=\"display: none;\">\n",
                        sub.link
                    ));
                    for subsub in &sub.sub_sections {
                        nav_entry(&mut nav, "   ", subsub);
                    }
                    nav.push_str("  </UL>\n");
                }
            }
            nav.push_str(" </UL>\n");
        }
        nav.push_str("</UL>\n");
    }
    nav
}

fn nav_entry(nav: &mut String, indent: &str, item: &TocItem) {
    if item.is_strong() {
        nav.push_str(&format!(
            "{indent}<LI class=\"strong-nav\"><A href=\"#{}\" class=\"nav-link\"><STRONG>{}</STRONG></A></LI>\n",
            item.link, item.title
        ));
    } else {
        nav.push_str(&format!(
            "{indent}<LI class=\"nav-level-{}\"><A href=\"#{}\" class=\"nav-link\">{}</A></LI>\n",
            item.level, item.link, item.title
        ));
    }
}

/// ToC entry with its title escaped for the sidebar
fn toc_item(level: u8, title: &str, link: impl Into<String>) -> TocItem {
    TocItem::new(level, Syntax::Html.escape(title), link)
}

/// Navigation data in scroll-spy order
///
/// Both lists are built back to front. Children of a bold section are
/// hoisted to its level, ahead of the section itself.
fn nav_data(toc: &[TocItem]) -> NavData {
    let mut sections: Vec<NavSection> = Vec::new();
    let mut flat_toc: Vec<String> = Vec::new();

    for section in toc {
        flat_toc.insert(0, section.link.clone());
        let mut subsections = Vec::new();
        for sub in &section.sub_sections {
            flat_toc.insert(0, sub.link.clone());
            let mut subsubsections = Vec::new();
            for subsub in &sub.sub_sections {
                flat_toc.insert(0, subsub.link.clone());
                subsubsections.insert(
                    0,
                    NavSection {
                        section: subsub.link.clone(),
                        subsections: None,
                    },
                );
            }
            subsections.insert(
                0,
                NavSection {
                    section: sub.link.clone(),
                    subsections: Some(subsubsections),
                },
            );
        }

        if section.is_strong() {
            subsections.push(NavSection {
                section: section.link.clone(),
                subsections: Some(Vec::new()),
            });
            subsections.append(&mut sections);
            sections = subsections;
        } else {
            sections.insert(
                0,
                NavSection {
                    section: section.link.clone(),
                    subsections: Some(subsections),
                },
            );
        }
    }

    NavData {
        toc: sections,
        flat_toc,
    }
}

impl DocWriter for HtmlWriter<'_> {
    fn extension(&self) -> &'static str {
        ".html"
    }

    fn default_static_content(&self, title: &str) -> String {
        format!(
            "<H1 id=\"-strong-{}-strong-\"><STRONG>{}</STRONG></H1>\n",
            anchor(title),
            Syntax::Html.escape(title)
        )
    }

    fn write_overview(&mut self) -> Result<()> {
        self.write_section_page("_overview.html", "API Overview", "API Overview")
    }

    fn write_resource_category(&mut self, name: &str, file: &str) -> Result<()> {
        let file = format!("_{file}.html");
        self.write_section_page(&file, name, &name.to_uppercase())
    }

    fn write_resource(&mut self, resource: &Resource) -> Result<()> {
        let Some(id) = resource.definition else {
            warn!(resource = %resource.name, "Missing definition for item in TOC");
            return Ok(());
        };
        let reference = self.reference;
        let definition = reference.definitions.get(id);
        let view = self.views.resource(resource, definition);

        let mut context = Context::new();
        context.insert("r", &view);
        let page = render(&self.tera, "html/resource.html", &context)?;

        let name = concept_file_name(definition);
        write_include(self.options, &name, self.extension(), &page)?;

        let mut item = toc_item(1, &view.title, anchor(&view.title))
            .with_file(format!("_{name}.html"));
        for category in &view.categories {
            let mut sub = toc_item(2, &category.name, category.anchor.clone());
            for op in &category.operations {
                sub.sub_sections
                    .push(toc_item(3, &op.type_name, op.anchor.clone()));
            }
            item.sub_sections.push(sub);
        }
        self.toc.push(item);
        Ok(())
    }

    fn write_definitions_overview(&mut self) -> Result<()> {
        self.write_section_page("_definitions.html", "Definitions", "DEFINITIONS")
    }

    fn write_definition(&mut self, definition: &Definition) -> Result<()> {
        let view = self.views.definition(definition);
        let mut context = Context::new();
        context.insert("d", &view);
        let page = render(&self.tera, "html/definition.html", &context)?;

        let name = definition_file_name(definition);
        write_include(self.options, &name, self.extension(), &page)?;

        let item = toc_item(2, &view.title, anchor(&view.title))
            .with_file(format!("_{name}.html"));
        match self.toc.last_mut() {
            Some(section) => section.sub_sections.push(item),
            None => self.toc.push(item),
        }
        Ok(())
    }

    fn write_old_versions_overview(&mut self) -> Result<()> {
        self.write_section_page("_oldversions.html", "Old API Versions", "OLD API VERSIONS")
    }

    fn finalize(&mut self) -> Result<()> {
        let build = self.options.build_dir();
        fs::create_dir_all(&build)?;

        let nav_data = serde_json::to_string(&nav_data(&self.toc))?;
        fs::write(
            build.join("navData.js"),
            format!("(function(){{navData={nav_data};}})();"),
        )?;

        let mut context = Context::new();
        context.insert("title", &self.options.title());
        context.insert("copyright", &self.options.copyright);
        context.insert("nav", &nav_content(&self.toc));
        context.insert("content", &self.page_content()?);
        let index = render(&self.tera, "html/index.html", &context)?;

        let path = build.join("index.html");
        fs::write(&path, index)?;
        info!(path = %path.display(), sections = self.toc.len(), "wrote html reference");
        Ok(())
    }
}
