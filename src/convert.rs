use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::ConvertResult;
use crate::fsutil;
use crate::loader;
use crate::models::SourceTree;

pub const LINKED_ROOT_FILE: &str = "index.json";
pub const INLINE_ROOT_FILE: &str = "root.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// One index per version, linked from the root with `nextUrl`.
    Linked,
    /// Everything nested under `children` in a single file.
    Inline,
}

impl ConversionMode {
    pub fn root_file(self) -> &'static str {
        match self {
            ConversionMode::Linked => LINKED_ROOT_FILE,
            ConversionMode::Inline => INLINE_ROOT_FILE,
        }
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionMode::Linked => write!(f, "多级目录结构"),
            ConversionMode::Inline => write!(f, "单文件内联结构"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub relative_path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub output_dir: PathBuf,
    pub root_file: PathBuf,
    pub mode: ConversionMode,
}

/// Renders the output documents for `mode` without touching the disk.
/// The root document always comes first.
pub fn render(tree: &SourceTree, mode: ConversionMode) -> ConvertResult<Vec<OutputDocument>> {
    let catalog = Catalog::from_tree(tree)?;
    match mode {
        ConversionMode::Linked => render_linked(&catalog),
        ConversionMode::Inline => Ok(vec![OutputDocument {
            relative_path: PathBuf::from(INLINE_ROOT_FILE),
            contents: fsutil::to_json_string(&catalog.groups)?,
        }]),
    }
}

fn render_linked(catalog: &Catalog) -> ConvertResult<Vec<OutputDocument>> {
    let mut documents = vec![OutputDocument {
        relative_path: PathBuf::from(LINKED_ROOT_FILE),
        contents: fsutil::to_json_string(&catalog.links())?,
    }];
    for group in &catalog.groups {
        let dir = fsutil::relative_subpath(&group.name)?;
        documents.push(OutputDocument {
            relative_path: dir.join(LINKED_ROOT_FILE),
            contents: fsutil::to_json_string(&group.entries)?,
        });
    }
    Ok(documents)
}

pub fn write_documents(output_dir: &Path, documents: &[OutputDocument]) -> ConvertResult<()> {
    fsutil::create_dir(output_dir)?;
    for document in documents {
        let path = output_dir.join(&document.relative_path);
        fsutil::write_file(&path, &document.contents)?;
        tracing::debug!(path = %path.display(), bytes = document.contents.len(), "wrote document");
    }
    Ok(())
}

/// Loads `input`, renders it in `mode` and writes the result under `output_dir`.
/// Nothing is written when loading or rendering fails.
pub fn convert_file(input: &Path, output_dir: &Path, mode: ConversionMode) -> ConvertResult<ConversionResult> {
    let tree = loader::load_tree(input)?;
    let documents = render(&tree, mode)?;
    write_documents(output_dir, &documents)?;
    tracing::info!(
        input = %input.display(),
        output = %output_dir.display(),
        ?mode,
        files = documents.len(),
        "conversion finished"
    );
    Ok(ConversionResult {
        output_dir: output_dir.to_path_buf(),
        root_file: output_dir.join(mode.root_file()),
        mode,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::{json, Value};

    use super::*;
    use crate::error::ConvertError;

    const SAMPLE: &str = r#"{"children":[
        {"type":"directory","name":"1.2.0","description":"latest","children":[
            {"type":"file","name":"legacy-all","arch":"all","download_link":"http://d/1.2.0/all.apk\n","description":"x"},
            {"type":"file","name":"legacy-arm","arch":"arm64-v8a","download_link":" http://d/1.2.0/arm64.apk "}
        ]},
        {"type":"file","name":"readme","arch":"x86","download_link":"http://d/readme"},
        {"type":"directory","name":"1.1.0","children":[
            {"type":"file","arch":"x86_64","download_link":"http://d/1.1.0/x86_64.apk"}
        ]}
    ]}"#;

    fn sample() -> SourceTree {
        serde_json::from_str(SAMPLE).unwrap()
    }

    fn parse(document: &OutputDocument) -> Value {
        serde_json::from_str(&document.contents).unwrap()
    }

    #[test]
    fn worked_example_in_linked_mode() {
        let tree: SourceTree = serde_json::from_str(
            r#"{"children":[{"type":"directory","name":"1.0","children":[{"type":"file","arch":"arm64-v8a","download_link":"http://a/b.apk"}]}]}"#,
        )
        .unwrap();
        let documents = render(&tree, ConversionMode::Linked).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].relative_path, PathBuf::from("index.json"));
        assert_eq!(parse(&documents[0]), json!([{"name": "1.0", "nextUrl": "1.0/index.json"}]));
        assert_eq!(documents[1].relative_path, Path::new("1.0").join("index.json"));
        assert_eq!(parse(&documents[1]), json!([{"name": "arm64-v8a 架构", "url": "http://a/b.apk"}]));
    }

    #[test]
    fn root_index_lists_directories_in_order() {
        let documents = render(&sample(), ConversionMode::Linked).unwrap();
        assert_eq!(
            parse(&documents[0]),
            json!([
                {"name": "1.2.0", "nextUrl": "1.2.0/index.json"},
                {"name": "1.1.0", "nextUrl": "1.1.0/index.json"}
            ])
        );
        assert_eq!(documents.len(), 3);
    }

    #[test]
    fn linked_and_inline_describe_the_same_catalog() {
        let linked = render(&sample(), ConversionMode::Linked).unwrap();
        let inline = render(&sample(), ConversionMode::Inline).unwrap();
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].relative_path, PathBuf::from("root.json"));

        let groups = parse(&inline[0]);
        let groups = groups.as_array().unwrap();
        let links = parse(&linked[0]);
        assert_eq!(groups.len(), links.as_array().unwrap().len());
        for (group, link) in groups.iter().zip(links.as_array().unwrap()) {
            assert_eq!(group["name"], link["name"]);
            let next_url = link["nextUrl"].as_str().unwrap();
            let linked_doc = linked
                .iter()
                .find(|doc| doc.relative_path == Path::new(next_url))
                .expect("nextUrl must point at a rendered document");
            assert_eq!(group["children"], parse(linked_doc));
        }
    }

    #[test]
    fn output_omits_description_and_uses_arch_names() {
        let inline = render(&sample(), ConversionMode::Inline).unwrap();
        assert!(!inline[0].contents.contains("description"));
        assert!(!inline[0].contents.contains("legacy"));
        assert_eq!(
            parse(&inline[0])[0]["children"],
            json!([
                {"name": "all 架构", "url": "http://d/1.2.0/all.apk"},
                {"name": "arm64-v8a 架构", "url": "http://d/1.2.0/arm64.apk"}
            ])
        );
        assert!(inline[0].contents.contains("\"all 架构\""));
    }

    #[test]
    fn escaping_directory_names_are_rejected_in_linked_mode() {
        for name in ["..", "", "../evil", "/abs"] {
            let tree = SourceTree {
                children: vec![json!({"type": "directory", "name": name})],
            };
            assert!(matches!(render(&tree, ConversionMode::Linked), Err(ConvertError::Schema(_))), "{name}");
            assert!(render(&tree, ConversionMode::Inline).is_ok());
        }
    }

    #[test]
    fn ignored_nodes_with_odd_fields_do_not_fail_a_conversion() {
        for doc in [
            r#"{"children":[{"type":"directory","name":"1.0","children":[]},{"type":1,"name":"x"}]}"#,
            r#"{"children":[{"type":"directory","name":"1.0","children":[]},{"type":"link","name":7}]}"#,
            r#"{"children":[{"type":"directory","name":"1.0","children":[{"type":"note","name":{"zh":"x"}}]}]}"#,
        ] {
            let documents = crate::loader::parse_tree(serde_json::from_str(doc).unwrap())
                .and_then(|tree| render(&tree, ConversionMode::Linked))
                .unwrap();
            assert_eq!(documents.len(), 2, "{doc}");
            assert_eq!(parse(&documents[1]), json!([]));
        }
    }

    #[test]
    fn convert_file_writes_linked_tree() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("old.json");
        fs::write(&input, SAMPLE).unwrap();
        let out = dir.path().join("out");

        let result = convert_file(&input, &out, ConversionMode::Linked).unwrap();
        assert_eq!(result.root_file, out.join("index.json"));
        assert_eq!(result.mode, ConversionMode::Linked);
        assert!(out.join("1.2.0").join("index.json").is_file());
        assert!(out.join("1.1.0").join("index.json").is_file());
    }

    #[test]
    fn repeated_conversion_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("old.json");
        fs::write(&input, SAMPLE).unwrap();
        let out = dir.path().join("out");

        convert_file(&input, &out, ConversionMode::Inline).unwrap();
        let first = fs::read(out.join("root.json")).unwrap();
        convert_file(&input, &out, ConversionMode::Inline).unwrap();
        assert_eq!(first, fs::read(out.join("root.json")).unwrap());

        convert_file(&input, &out, ConversionMode::Linked).unwrap();
        let first = fs::read(out.join("1.2.0").join("index.json")).unwrap();
        convert_file(&input, &out, ConversionMode::Linked).unwrap();
        assert_eq!(first, fs::read(out.join("1.2.0").join("index.json")).unwrap());
    }

    #[test]
    fn schema_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("old.json");
        fs::write(&input, r#"{"versions":[]}"#).unwrap();
        let out = dir.path().join("out");

        let err = convert_file(&input, &out, ConversionMode::Linked).unwrap_err();
        assert!(matches!(err, ConvertError::Schema(_)));
        assert!(!out.exists());
    }

    #[test]
    fn non_directory_top_level_nodes_contribute_nothing() {
        let tree: SourceTree = serde_json::from_str(
            r#"{"children":[{"type":"file","arch":"x86","download_link":"u"},{"type":"other","name":"z"}]}"#,
        )
        .unwrap();
        let linked = render(&tree, ConversionMode::Linked).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].contents, "[]");
        assert_eq!(render(&tree, ConversionMode::Inline).unwrap()[0].contents, "[]");
    }
}
