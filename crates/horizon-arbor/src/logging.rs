//! Logging targets and layout debugging.
//!
//! The tree widget logs through `tracing`. Install a subscriber in the host
//! application to see the output, and filter by the constants in [`targets`]:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_max_level(tracing::Level::DEBUG)
//!     .init();
//! ```
//!
//! [`LayoutDump`] renders the visible rows of one layout pass as an indented
//! outline.

use std::fmt;

use crate::layout::LayoutRecord;
use crate::model::{Tree, VisibleRow};

/// Target names for log filtering.
pub mod targets {
    /// Node and column lifecycle.
    pub const MODEL: &str = "horizon_arbor::model";
    /// Layout passes.
    pub const LAYOUT: &str = "horizon_arbor::layout";
    /// Row painting and paint sessions.
    pub const RENDER: &str = "horizon_arbor::render";
    /// Pointer handling.
    pub const INPUT: &str = "horizon_arbor::input";
}

/// Branch characters used by [`LayoutDump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpStyle {
    Ascii,
    #[default]
    Unicode,
}

/// What a [`LayoutDump`] includes.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpOptions {
    pub style: DumpStyle,
    pub show_ids: bool,
    pub show_bounds: bool,
    /// Rows deeper than this are skipped.
    pub max_depth: Option<usize>,
    /// Spaces per level under a branch line.
    pub indent_size: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            style: DumpStyle::default(),
            show_ids: false,
            show_bounds: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl DumpOptions {
    /// Everything, including node ids.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Self::default()
        }
    }

    /// Labels only.
    pub fn minimal() -> Self {
        Self {
            show_bounds: false,
            ..Self::default()
        }
    }
}

/// Human-readable outline of a layout pass.
///
/// ```text
/// Layout (3 rows, content 52x54):
/// [+] root0 @ (0, 0, 52x18)
/// [-] root1 @ (0, 18, 52x18)
/// └── child @ (0, 36, 52x18)
/// ```
pub struct LayoutDump<'a> {
    tree: &'a Tree,
    rows: &'a [VisibleRow],
    record: &'a LayoutRecord,
    options: DumpOptions,
}

impl<'a> LayoutDump<'a> {
    pub fn new(tree: &'a Tree, rows: &'a [VisibleRow], record: &'a LayoutRecord) -> Self {
        Self {
            tree,
            rows,
            record,
            options: DumpOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }

    fn prefix(&self, row: &VisibleRow) -> String {
        if row.depth == 0 {
            return String::new();
        }
        let (branch, tee, corner) = match self.options.style {
            DumpStyle::Ascii => ("|", "+-- ", "`-- "),
            DumpStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
        };
        let mut prefix = String::new();
        for _ in 1..row.depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if row.is_last_child { corner } else { tee });
        prefix
    }

    fn write_row(&self, f: &mut fmt::Formatter<'_>, index: usize, row: &VisibleRow) -> fmt::Result {
        write!(f, "{}", self.prefix(row))?;
        if row.has_children {
            f.write_str(if row.expanded { "[-] " } else { "[+] " })?;
        }
        if self.tree.style().checkable && self.tree.is_checked(row.node).unwrap_or(false) {
            f.write_str("[x] ")?;
        }
        match self.tree.text(row.node, 0) {
            Ok(text) if !text.trim().is_empty() => f.write_str(text)?,
            _ => f.write_str("(blank)")?,
        }
        if self.options.show_ids {
            write!(f, " [{:?}]", row.node)?;
        }
        if self.options.show_bounds
            && let Some(record) = self.record.row(index)
        {
            let b = record.bounds;
            write!(
                f,
                " @ ({}, {}, {}x{})",
                b.left(),
                b.top(),
                b.width(),
                b.height()
            )?;
        }
        if self.tree.is_selected(row.node) {
            f.write_str(" *")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for LayoutDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let content = self.record.content_size();
        writeln!(
            f,
            "Layout ({} rows, content {}x{}):",
            self.rows.len(),
            content.width,
            content.height
        )?;
        if self.rows.is_empty() {
            return writeln!(f, "  (empty)");
        }
        for (index, row) in self.rows.iter().enumerate() {
            if self.options.max_depth.is_some_and(|max| row.depth > max) {
                continue;
            }
            self.write_row(f, index, row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use horizon_arbor_render::{Point, Size};

    use super::*;
    use crate::config::TreeStyle;
    use crate::layout::LayoutEngine;

    fn sample() -> (Tree, Vec<VisibleRow>, LayoutRecord) {
        let mut tree = Tree::new(TreeStyle::default());
        let root = tree.create_node(None, None).unwrap();
        let a = tree.create_node(Some(root), None).unwrap();
        let b = tree.create_node(Some(root), None).unwrap();
        let deep = tree.create_node(Some(a), None).unwrap();
        tree.set_text(root, 0, "root").unwrap();
        tree.set_text(a, 0, "a").unwrap();
        tree.set_text(b, 0, "b").unwrap();
        tree.set_text(deep, 0, "deep").unwrap();
        tree.expand_all().unwrap();
        let rows = tree.flatten();
        let sizes = vec![Size::new(40.0, 18.0); rows.len()];
        let record = LayoutEngine::layout(&sizes, Point::ZERO);
        (tree, rows, record)
    }

    #[test]
    fn test_unicode_dump() {
        let (tree, rows, record) = sample();
        let dump = LayoutDump::new(&tree, &rows, &record).to_string();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "Layout (4 rows, content 40x72):");
        assert_eq!(lines[1], "[-] root @ (0, 0, 40x18)");
        assert_eq!(lines[2], "\u{251c}\u{2500}\u{2500} [-] a @ (0, 18, 40x18)");
        assert_eq!(lines[3], "\u{2502}  \u{2514}\u{2500}\u{2500} deep @ (0, 36, 40x18)");
        assert_eq!(lines[4], "\u{2514}\u{2500}\u{2500} b @ (0, 54, 40x18)");
    }

    #[test]
    fn test_minimal_ascii_with_depth_limit() {
        let (tree, rows, record) = sample();
        let options = DumpOptions {
            style: DumpStyle::Ascii,
            max_depth: Some(1),
            ..DumpOptions::minimal()
        };
        let dump = LayoutDump::new(&tree, &rows, &record)
            .with_options(options)
            .to_string();
        assert_eq!(
            dump,
            "Layout (4 rows, content 40x72):\n[-] root\n+-- [-] a\n`-- b\n"
        );
    }

    #[test]
    fn test_empty_dump() {
        let tree = Tree::new(TreeStyle::default());
        let record = LayoutEngine::layout(&[], Point::ZERO);
        let dump = LayoutDump::new(&tree, &[], &record).to_string();
        assert_eq!(dump, "Layout (0 rows, content 0x0):\n  (empty)\n");
    }
}
