use serde::Serialize;
use serde_json::Value;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{SourceNode, SourceTree};

pub const ARCH_SUFFIX: &str = "架构";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub url: String,
}

impl Entry {
    pub fn for_arch(arch: &str, url: &str) -> Self {
        Entry {
            name: arch_label(arch),
            url: url.trim().to_string(),
        }
    }
}

pub fn arch_label(arch: &str) -> String {
    format!("{} {}", arch, ARCH_SUFFIX)
}

/// A version group. Serializes as the inline layout (`name` + `children`).
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    #[serde(rename = "children")]
    pub entries: Vec<Entry>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    #[serde(rename = "nextUrl")]
    pub next_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub groups: Vec<Group>,
}

impl Catalog {
    /// Keeps source order. Nodes that are not directories (or, inside one,
    /// not files) are skipped; a known node with a missing or mistyped field
    /// is a schema error.
    pub fn from_tree(tree: &SourceTree) -> ConvertResult<Self> {
        let mut groups = Vec::new();
        for (index, node) in tree.nodes().enumerate() {
            if !node.is_directory() {
                tracing::debug!(index, "skipping non-directory node");
                continue;
            }
            let at = || format!("第 {} 个目录节点", index + 1);
            let name = text(node, "name", at)?.to_string();
            let children = match node.field("children") {
                None => &[][..],
                Some(Value::Array(children)) => children.as_slice(),
                Some(_) => return Err(ConvertError::Schema(format!("{}的children字段不是数组", at()))),
            };
            let entries = children
                .iter()
                .map(SourceNode)
                .enumerate()
                .filter(|(_, child)| child.is_file())
                .map(|(child_index, child)| file_entry(&name, child_index, child))
                .collect::<ConvertResult<Vec<_>>>()?;
            groups.push(Group { name, entries });
        }
        Ok(Catalog { groups })
    }

    pub fn links(&self) -> Vec<Link> {
        self.groups
            .iter()
            .map(|group| Link {
                name: group.name.clone(),
                next_url: format!("{}/index.json", group.name),
            })
            .collect()
    }
}

fn file_entry(dir_name: &str, index: usize, node: SourceNode) -> ConvertResult<Entry> {
    let at = || format!("目录 {} 的第 {} 个子节点", dir_name, index + 1);
    let arch = text(node, "arch", at)?;
    let link = text(node, "download_link", at)?;
    Ok(Entry::for_arch(arch, link))
}

fn text<'a>(node: SourceNode<'a>, key: &str, at: impl Fn() -> String) -> ConvertResult<&'a str> {
    match node.field(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(ConvertError::Schema(format!("{}的{}字段不是字符串", at(), key))),
        None => Err(ConvertError::Schema(format!("{}缺少{}字段", at(), key))),
    }
}
