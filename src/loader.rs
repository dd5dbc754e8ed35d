use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ConvertError, ConvertResult};
use crate::models::SourceTree;

/// Reads and validates an old-format data file.
pub fn load_tree(path: &Path) -> ConvertResult<SourceTree> {
    let text = fs::read_to_string(path).map_err(|e| ConvertError::from_io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ConvertError::MalformedInput {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tree(value)
}

/// Checks the single required top-level key and converts the document.
pub fn parse_tree(value: Value) -> ConvertResult<SourceTree> {
    match value.get("children") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(ConvertError::Schema("children字段不是数组".to_string())),
        None => return Err(ConvertError::Schema("缺少children字段".to_string())),
    }
    serde_json::from_value(value).map_err(|e| ConvertError::Schema(format!("节点结构错误：{e}")))
}
