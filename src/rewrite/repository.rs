//! Jackrabbit `repository.xml` rewriter
//!
//! Both the `Workspace` and `Versioning` sections carry a database-backed
//! `FileSystem` and a `PersistenceManager`, each configured through
//! `<param name="..." value="..."/>` children. The file system keeps its class
//! and gets PostgreSQL connection parameters; the persistence manager is
//! switched to the PostgreSQL implementation as well.

use super::embedded::{self, POSTGRES_PERSISTENCE_MANAGER};
use super::{TargetOutcome, rewrite_file};
use crate::connection::{ConnectionConfig, POSTGRES_DRIVER};
use crate::locator::{self, REPOSITORY_XML};
use crate::xml::{self, XmlEditor, child_elements, descendants_below_root};
use anyhow::Result;
use roxmltree::{Document, Node};
use std::path::Path;

pub const SECTIONS: [&str; 2] = ["Workspace", "Versioning"];

const FILESYSTEM_TAG: &str = "FileSystem";
const PERSISTENCE_MANAGER_TAG: &str = "PersistenceManager";
const PARAM_TAG: &str = "param";
const DATABASE_TYPE: &str = "postgresql";

/// What was found and changed in one section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionReport {
    pub section: &'static str,
    pub filesystem: bool,
    pub persistence_manager: bool,
    /// The persistence manager's class attribute was replaced
    pub class_upgraded: bool,
}

#[derive(Debug, Clone)]
pub struct RepositoryRewrite {
    pub output: String,
    pub sections: Vec<SectionReport>,
    pub fields: usize,
}

/// Rewrite a repository descriptor's text
///
/// Missing sections or elements are skipped; the result is still written.
pub fn rewrite_repository(source: &str, config: &ConnectionConfig) -> Result<RepositoryRewrite> {
    let source = xml::strip_bom(source);
    let doc = xml::parse(source)?;
    let mut editor = XmlEditor::new(source);
    let mut sections = Vec::with_capacity(SECTIONS.len());

    for section in SECTIONS {
        let mut report = SectionReport {
            section,
            ..SectionReport::default()
        };

        match find_in_section(&doc, section, FILESYSTEM_TAG, |class| {
            class.is_some_and(embedded::is_default_db_filesystem)
        }) {
            Some(filesystem) => {
                report.filesystem = true;
                rewrite_params(&mut editor, filesystem, config, false);
            }
            None => log::debug!("No database file system in <{}>", section),
        }

        let mut manager = find_in_section(&doc, section, PERSISTENCE_MANAGER_TAG, |class| {
            class.is_some_and(embedded::is_postgres_persistence_manager)
        });
        if manager.is_none() {
            manager = find_in_section(&doc, section, PERSISTENCE_MANAGER_TAG, |_| true);
            if let Some(found) = manager {
                log::debug!(
                    "Switching <{}> persistence manager from {:?}",
                    section,
                    found.attribute("class")
                );
                editor.set_attribute(found, "class", POSTGRES_PERSISTENCE_MANAGER);
                report.class_upgraded = true;
            }
        }
        match manager {
            Some(manager) => {
                report.persistence_manager = true;
                rewrite_params(&mut editor, manager, config, true);
            }
            None => log::debug!("No persistence manager in <{}>", section),
        }

        sections.push(report);
    }

    let fields = editor.len();
    Ok(RepositoryRewrite {
        output: editor.finish(),
        sections,
        fields,
    })
}

/// Locate, back up and rewrite `repository.xml` under `root`
pub fn configure(root: &Path, config: &ConnectionConfig) -> Result<TargetOutcome> {
    let Some(path) = locator::locate(root, &[REPOSITORY_XML]) else {
        return Ok(TargetOutcome::NotFound(root.join(REPOSITORY_XML)));
    };

    let change = rewrite_file(&path, |content| {
        let rewrite = rewrite_repository(content, config)?;
        Ok((rewrite.output, rewrite.fields))
    })?;
    Ok(TargetOutcome::configured(vec![change]))
}

/// First `<section>/<tag>` below the root element, in document order, whose
/// class attribute satisfies `accept`
fn find_in_section<'a, 'input>(
    doc: &'a Document<'input>,
    section: &str,
    tag: &str,
    accept: impl Fn(Option<&str>) -> bool,
) -> Option<Node<'a, 'input>> {
    let root = doc.root_element();
    descendants_below_root(doc).find(|node| {
        node.has_tag_name(tag)
            && node
                .parent_element()
                .is_some_and(|parent| parent != root && parent.has_tag_name(section))
            && accept(node.attribute("class"))
    })
}

/// Value a recognised `<param>` should carry, if the name is one we manage
fn param_value(name: &str, config: &ConnectionConfig, with_database_type: bool) -> Option<String> {
    let credentials = &config.jackrabbit;
    match name {
        "driver" => Some(POSTGRES_DRIVER.to_string()),
        "url" => Some(config.jdbc_url(credentials)),
        "user" => Some(credentials.username.clone()),
        "password" => Some(credentials.password.clone()),
        "databaseType" if with_database_type => Some(DATABASE_TYPE.to_string()),
        _ => None,
    }
}

fn rewrite_params<'input>(
    editor: &mut XmlEditor<'input>,
    element: Node<'_, 'input>,
    config: &ConnectionConfig,
    with_database_type: bool,
) {
    for param in child_elements(element, PARAM_TAG) {
        let Some(name) = param.attribute("name") else {
            continue;
        };
        if let Some(value) = param_value(name, config, with_database_type) {
            log::trace!("Setting param {} in <{}>", name, element.tag_name().name());
            editor.set_attribute(param, "value", &value);
        }
    }
}
