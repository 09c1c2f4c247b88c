//! IGV manifest XML rendering.
//!
//! Output is pretty-printed with one tab per nesting level:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <Global name="Demo" version="1">
//!     <Category name="bams">
//!         <Resource name="a.bam" path="..." index="..." coverage="."/>
//!     </Category>
//! </Global>
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::tree::{ManifestNode, ManifestTree};
use super::{ManifestError, ManifestResult};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Extension of manifest files.
pub const MANIFEST_EXTENSION: &str = "xml";

/// Escape a string for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    out
}

fn open_tag(out: &mut String, depth: usize, element: &str, attrs: &[(&str, &str)], empty: bool) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push('<');
    out.push_str(element);
    for (key, value) in attrs {
        // Writing to a String cannot fail.
        let _ = write!(out, r#" {}="{}""#, key, escape_attribute(value));
    }
    out.push_str(if empty { "/>\n" } else { ">\n" });
}

fn close_tag(out: &mut String, depth: usize, element: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    let _ = writeln!(out, "</{}>", element);
}

fn render_nodes(out: &mut String, depth: usize, nodes: &[ManifestNode]) {
    for node in nodes {
        match node {
            ManifestNode::Category(category) => {
                let attrs = [("name", category.name.as_str())];
                let empty = category.children.is_empty();
                open_tag(out, depth, "Category", &attrs, empty);
                if !empty {
                    render_nodes(out, depth + 1, &category.children);
                    close_tag(out, depth, "Category");
                }
            }
            ManifestNode::Resource(resource) => {
                open_tag(out, depth, "Resource", &resource.attributes(), true);
            }
        }
    }
}

/// Render a manifest as a pretty-printed XML document.
pub fn render(tree: &ManifestTree) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');

    let attrs = [("name", tree.name.as_str()), ("version", tree.version.as_str())];
    let empty = tree.children.is_empty();
    open_tag(&mut out, 0, "Global", &attrs, empty);
    if !empty {
        render_nodes(&mut out, 1, &tree.children);
        close_tag(&mut out, 0, "Global");
    }
    out
}

/// Path of the manifest for `project_name` inside `dir`.
pub fn manifest_path(dir: &Path, project_name: &str) -> PathBuf {
    dir.join(format!("{}.{}", project_name, MANIFEST_EXTENSION))
}

/// Render `tree` and write it to `<dir>/<project name>.xml`.
pub fn write_manifest(tree: &ManifestTree, dir: &Path) -> ManifestResult<PathBuf> {
    if tree.name.is_empty() || tree.name.contains('/') {
        return Err(ManifestError::InvalidName(tree.name.clone()));
    }

    let path = manifest_path(dir, &tree.name);
    fs::write(&path, render(tree)).map_err(|e| ManifestError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;

    info!("'{}' successfully created!", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::tree::{Category, Resource, PLACEHOLDER};
    use tempfile::TempDir;

    fn bam_resource() -> Resource {
        Resource {
            name: "a.bam".to_string(),
            path: "https://dl/a.bam?x=1&y=2".to_string(),
            index: Some("https://dl/a.bam.bai".to_string()),
            coverage: Some(PLACEHOLDER.to_string()),
            mapping: None,
        }
    }

    #[test]
    fn test_render_empty_tree() {
        let tree = ManifestTree::new("Demo", Vec::new());
        assert_eq!(
            render(&tree),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Global name=\"Demo\" version=\"1\"/>\n"
        );
    }

    #[test]
    fn test_render_nested_with_tabs() {
        let tree = ManifestTree::new(
            "Demo",
            vec![
                ManifestNode::Category(Category::new(
                    "bams",
                    vec![ManifestNode::Resource(bam_resource())],
                )),
                ManifestNode::Category(Category::new("empty", Vec::new())),
                ManifestNode::Resource(Resource::track("t.bw", "https://dl/t.bw")),
            ],
        );

        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<Global name=\"Demo\" version=\"1\">\n",
            "\t<Category name=\"bams\">\n",
            "\t\t<Resource name=\"a.bam\" path=\"https://dl/a.bam?x=1&amp;y=2\" ",
            "index=\"https://dl/a.bam.bai\" coverage=\".\"/>\n",
            "\t</Category>\n",
            "\t<Category name=\"empty\"/>\n",
            "\t<Resource name=\"t.bw\" path=\"https://dl/t.bw\"/>\n",
            "</Global>\n",
        );
        assert_eq!(render(&tree), expected);
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute("a<b>&\"c\"\td"),
            "a&lt;b&gt;&amp;&quot;c&quot;&#9;d"
        );
    }

    #[test]
    fn test_write_manifest() {
        let temp = TempDir::new().unwrap();
        let tree = ManifestTree::new("NA12878 public", Vec::new());

        let path = write_manifest(&tree, temp.path()).unwrap();
        assert_eq!(path, temp.path().join("NA12878 public.xml"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("name=\"NA12878 public\""));
    }

    #[test]
    fn test_write_manifest_rejects_slash() {
        let temp = TempDir::new().unwrap();
        let tree = ManifestTree::new("a/b", Vec::new());
        assert!(matches!(
            write_manifest(&tree, temp.path()),
            Err(ManifestError::InvalidName(_))
        ));
    }
}
