use serde::Deserialize;
use serde_json::Value;

/// Root of the old mdui-site data file. Nodes stay raw until their `type`
/// says they matter, so odd fields on ignored nodes never fail a load.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SourceTree {
    pub children: Vec<Value>,
}

impl SourceTree {
    pub fn nodes(&self) -> impl Iterator<Item = SourceNode<'_>> {
        self.children.iter().map(SourceNode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
    Other,
}

/// Borrowed view of one node of the old tree.
#[derive(Debug, Clone, Copy)]
pub struct SourceNode<'a>(pub &'a Value);

impl<'a> SourceNode<'a> {
    pub fn kind(self) -> NodeKind {
        match self.0.get("type").and_then(Value::as_str) {
            Some("directory") => NodeKind::Directory,
            Some("file") => NodeKind::File,
            _ => NodeKind::Other,
        }
    }

    pub fn is_directory(self) -> bool {
        self.kind() == NodeKind::Directory
    }

    pub fn is_file(self) -> bool {
        self.kind() == NodeKind::File
    }

    pub fn field(self, key: &str) -> Option<&'a Value> {
        self.0.get(key)
    }
}
