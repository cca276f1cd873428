//! Text rendering of trees for the terminal

use termtree::Tree;

use crate::domain::Node;

/// Conversion into a printable `termtree::Tree`.
pub trait ToTermTree {
    fn to_term_tree(&self) -> Tree<String>;
}

impl<P> ToTermTree for Node<P> {
    fn to_term_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_term_tree()).collect();
        Tree::new(format_value(self.value)).with_leaves(leaves)
    }
}

/// Integral values without a trailing `.0`.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
