//! Template inheritance
//!
//! A child declares `[% extends 'parent' %]` and overrides named blocks. The
//! resolver walks the ancestor chain, merges overriding blocks into the
//! parent text, substitutes `[% super %]` with the overridden parent body and
//! finally strips every inheritance marker. The result is plain template
//! source ready for the compiler.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::blocks::{all_blocks, find_extends, replace_super, strip_markers, top_level_blocks};
use super::error::TemplateError;
use crate::error::{Result, StanzaError};
use crate::path::{PathResolver, ResolveError};

/// Merged source and the ancestor files it was built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub source: String,
    /// Every ancestor file, nearest parent first. The template's own file is
    /// not included.
    pub dependencies: Vec<PathBuf>,
}

/// One visited template in the inheritance chain
struct ChainLink {
    name: String,
    path: PathBuf,
}

pub struct InheritanceResolver<'r> {
    paths: &'r dyn PathResolver,
}

impl<'r> InheritanceResolver<'r> {
    pub fn new(paths: &'r dyn PathResolver) -> Self {
        Self { paths }
    }

    /// Resolve the full ancestor chain of `name`
    ///
    /// `path` and `source` belong to `name` itself. Fails with
    /// `CircularInheritance` if any template reappears in the chain; the
    /// reported chain starts and ends with the repeated name.
    pub fn resolve(&self, name: &str, path: &Path, source: &str) -> Result<ResolvedTemplate> {
        let mut chain = vec![ChainLink {
            name: name.to_string(),
            path: path.to_path_buf(),
        }];
        let mut dependencies = Vec::new();

        let merged = self.resolve_chain(source, &mut chain, &mut dependencies)?;
        let source = strip_markers(&merged).map_err(|e| e.in_template(name))?;

        debug!(template = name, ancestors = dependencies.len(), "resolved inheritance");
        Ok(ResolvedTemplate {
            source,
            dependencies,
        })
    }

    /// Merge `source` (the last link of `chain`) into its ancestors
    ///
    /// Returns text that still contains block markers so further descendants
    /// can keep overriding.
    fn resolve_chain(
        &self,
        source: &str,
        chain: &mut Vec<ChainLink>,
        dependencies: &mut Vec<PathBuf>,
    ) -> Result<String> {
        let child = chain
            .last()
            .map(|link| link.name.clone())
            .unwrap_or_default();
        let in_child = |e: TemplateError| e.in_template(&child);

        let Some(parent) = find_extends(source).map_err(in_child)? else {
            return Ok(source.to_string());
        };

        if chain.iter().any(|link| link.name == parent) {
            return Err(circular(chain, parent));
        }

        // Later definitions of the same block name win
        let overrides: HashMap<&str, &str> = all_blocks(source)
            .map_err(in_child)?
            .into_iter()
            .map(|region| (region.name, &source[region.body]))
            .collect();

        let parent_path = match self.paths.resolve(parent) {
            Ok(path) => path,
            Err(ResolveError::NotFound { .. }) => {
                return Err(StanzaError::ParentNotFound {
                    parent: parent.to_string(),
                    child,
                })
            }
            Err(err) => return Err(err.into()),
        };

        // Different spellings of one file (`base` and `base.tpl`) are the same link
        if chain.iter().any(|link| link.path == parent_path) {
            return Err(circular(chain, parent));
        }

        if !dependencies.contains(&parent_path) {
            dependencies.push(parent_path.clone());
        }
        let parent_source = fs::read_to_string(&parent_path)?;

        chain.push(ChainLink {
            name: parent.to_string(),
            path: parent_path,
        });
        let resolved_parent = self.resolve_chain(&parent_source, chain, dependencies)?;
        chain.pop();

        merge_blocks(&resolved_parent, &overrides).map_err(|e| e.in_template(parent))
    }
}

fn circular(chain: &[ChainLink], repeated: &str) -> StanzaError {
    let mut names: Vec<String> = chain.iter().map(|link| link.name.clone()).collect();
    names.push(repeated.to_string());
    StanzaError::CircularInheritance { chain: names }
}

/// Replace overridden blocks in `text`, descending into blocks that are kept
///
/// Block markers are preserved around each region so the result can itself be
/// overridden by a further descendant. An override that pulls in its parent
/// body through `[% super %]` is merged again, minus its own name, so nested
/// blocks the same child overrides are substituted too.
fn merge_blocks(
    text: &str,
    overrides: &HashMap<&str, &str>,
) -> std::result::Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for region in top_level_blocks(text)? {
        out.push_str(&text[cursor..region.outer.start]);

        let parent_body = &text[region.body.clone()];
        let content = match overrides.get(region.name) {
            Some(child_body) => {
                let expanded = replace_super(child_body, parent_body)?;
                let mut remaining = overrides.clone();
                remaining.remove(region.name);
                merge_blocks(&expanded, &remaining)?
            }
            None => merge_blocks(parent_body, overrides)?,
        };

        out.push_str("[% block ");
        out.push_str(region.name);
        out.push_str(" %]");
        out.push_str(&content);
        out.push_str("[% endblock %]");
        cursor = region.outer.end;
    }

    out.push_str(&text[cursor..]);
    Ok(out)
}
