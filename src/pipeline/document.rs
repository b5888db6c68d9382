//! Composite Markdown document

use crate::context::ProjectTree;
use crate::Result;

pub const DOCUMENT_TITLE: &str = "# Project Documentation";

/// Assemble the final document.
///
/// Section order is fixed: contents, project summary, one subsection per file
/// summary in the order given, then the tree as JSON.
pub fn assemble_document<'a, I>(summaries: I, tree: &ProjectTree, project_summary: &str) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let summaries: Vec<(&str, &str)> = summaries.into_iter().collect();
    let structure = tree.to_json_pretty()?;

    let mut doc = format!("{}\n\n", DOCUMENT_TITLE);

    doc.push_str("## Contents\n\n");
    doc.push_str("- [Project Summary](#project-summary)\n");
    doc.push_str("- [File Summaries](#file-summaries)\n");
    for (index, (path, _)) in summaries.iter().enumerate() {
        doc.push_str(&format!("  - [{}](#{})\n", path, file_anchor(index)));
    }
    doc.push_str("- [Project Structure](#project-structure)\n\n");

    doc.push_str("## Project Summary\n\n");
    doc.push_str(project_summary.trim());
    doc.push_str("\n\n");

    doc.push_str("## File Summaries\n\n");
    for (index, (path, summary)) in summaries.iter().enumerate() {
        doc.push_str(&format!(
            "<a id=\"{}\"></a>\n### {}\n\n{}\n\n",
            file_anchor(index),
            path,
            summary.trim()
        ));
    }

    doc.push_str("## Project Structure\n\n");
    doc.push_str(&format!("```json\n{}\n```\n", structure));

    Ok(doc)
}

fn file_anchor(index: usize) -> String {
    format!("file-{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_in_fixed_order() {
        let tree = ProjectTree::build(["src/a.ts", "README.md"]);
        let pairs = [("src/a.ts", "Alpha."), ("README.md", "Readme.")];
        let doc = assemble_document(pairs, &tree, "Whole project.").unwrap();

        let positions: Vec<usize> = [
            "## Contents",
            "## Project Summary",
            "Whole project.",
            "## File Summaries",
            "### src/a.ts",
            "### README.md",
            "## Project Structure",
            "```json",
        ]
        .iter()
        .map(|marker| doc.find(marker).unwrap_or_else(|| panic!("missing {marker}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{doc}");
        assert!(doc.starts_with(DOCUMENT_TITLE));
    }

    #[test]
    fn test_contents_link_each_file() {
        let tree = ProjectTree::build(["a.rs", "b.rs"]);
        let doc = assemble_document([("a.rs", "A"), ("b.rs", "B")], &tree, "P").unwrap();
        assert!(doc.contains("  - [a.rs](#file-1)"));
        assert!(doc.contains("  - [b.rs](#file-2)"));
        assert!(doc.contains("<a id=\"file-2\"></a>\n### b.rs\n\nB\n"));
    }

    #[test]
    fn test_summaries_are_trimmed_and_separated() {
        let tree = ProjectTree::build(["a.rs"]);
        let doc = assemble_document([("a.rs", "\n  Alpha.  \n\n")], &tree, "  Project.\n").unwrap();
        assert!(doc.contains("## Project Summary\n\nProject.\n\n## File Summaries"));
        assert!(doc.contains("### a.rs\n\nAlpha.\n\n## Project Structure"));
    }

    #[test]
    fn test_structure_is_tree_json() {
        let tree = ProjectTree::build(["dir/b.txt"]);
        let doc = assemble_document([("dir/b.txt", "B")], &tree, "P").unwrap();
        let json = tree.to_json_pretty().unwrap();
        assert!(doc.ends_with(&format!("```json\n{}\n```\n", json)));
    }

    #[test]
    fn test_empty_run_still_has_every_section() {
        let doc = assemble_document(Vec::new(), &ProjectTree::default(), "Nothing here.").unwrap();
        assert!(doc.contains("## File Summaries\n\n## Project Structure"));
        assert!(doc.contains("Nothing here."));
    }
}
