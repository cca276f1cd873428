//! Tree modes and their descriptions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Insertion discipline applied to the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    #[default]
    Bst,
    Avl,
    Binary,
    Custom,
}

impl TreeMode {
    pub const ALL: [TreeMode; 4] = [
        TreeMode::Avl,
        TreeMode::Binary,
        TreeMode::Bst,
        TreeMode::Custom,
    ];

    /// Modes whose children are ordered by value.
    pub fn is_ordered(self) -> bool {
        matches!(self, TreeMode::Bst | TreeMode::Avl)
    }

    /// Modes that maintain a single root with at most two children per node.
    pub fn is_structured(self) -> bool {
        !matches!(self, TreeMode::Custom)
    }

    pub fn title(self) -> &'static str {
        match self {
            TreeMode::Bst => "BST (Binary search tree)",
            TreeMode::Avl => "AVL tree (Adelson-Velsky and Landis tree)",
            TreeMode::Binary => "Binary tree",
            TreeMode::Custom => "Custom tree",
        }
    }

    pub fn description(self) -> &'static [&'static str] {
        match self {
            TreeMode::Bst => &[
                "Binary tree sorted to speed up operations",
                "Lesser values go to the left subtree, greater values to the right",
                "Duplicate values are not inserted",
            ],
            TreeMode::Avl => &[
                "Binary search tree that balances itself after every insertion",
                "Rotations lift the taller subtree into the parent's spot and reinsert the parent",
                "Sibling subtrees never differ in height by more than one",
                "Duplicate values are not inserted",
            ],
            TreeMode::Binary => &[
                "Each node has up to two children",
                "New nodes fill the first open slot in breadth-first order",
                "Values are not ordered and may repeat",
            ],
            TreeMode::Custom => &[
                "Build your own forest",
                "Connect nodes by dragging a handle onto another node",
                "Remove a connection by clicking it, a node (and its subtree) by clicking the node",
            ],
        }
    }

    /// Operation costs as (operation, average, worst, measure).
    pub fn complexity(self) -> [Complexity; 4] {
        let (insert, search, delete) = match self {
            TreeMode::Avl => (
                ("Θ(log(n))", "O(log(n))"),
                ("Θ(log(n))", "O(log(n))"),
                ("Θ(log(n))", "O(log(n))"),
            ),
            TreeMode::Bst => (
                ("Θ(log(n))", "O(n)"),
                ("Θ(log(n))", "O(n)"),
                ("Θ(log(n))", "O(n)"),
            ),
            TreeMode::Binary => (("Θ(log(n))", "O(n)"), ("Θ(n)", "O(n)"), ("Θ(n)", "O(n)")),
            TreeMode::Custom => (
                ("Θ(1) manual / Θ(n) automated", "O(1) manual / O(n) automated"),
                ("Θ(n)", "O(n)"),
                ("Θ(n)", "O(n)"),
            ),
        };
        [
            Complexity::time("Insert", insert),
            Complexity::time("Search", search),
            Complexity::time("Delete", delete),
            Complexity {
                operation: "Space",
                average: "Θ(n)",
                worst: "O(n)",
                measure: "Memory",
            },
        ]
    }
}

/// One row of a mode's complexity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complexity {
    pub operation: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
    pub measure: &'static str,
}

impl Complexity {
    fn time(operation: &'static str, (average, worst): (&'static str, &'static str)) -> Self {
        Self {
            operation,
            average,
            worst,
            measure: "Time",
        }
    }
}

impl fmt::Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeMode::Bst => "bst",
            TreeMode::Avl => "avl",
            TreeMode::Binary => "binary",
            TreeMode::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for TreeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bst" => Ok(TreeMode::Bst),
            "avl" => Ok(TreeMode::Avl),
            "binary" => Ok(TreeMode::Binary),
            "custom" => Ok(TreeMode::Custom),
            other => Err(format!(
                "unknown tree mode '{other}' (expected bst, avl, binary or custom)"
            )),
        }
    }
}
