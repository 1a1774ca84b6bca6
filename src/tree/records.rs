//! Assemble a nested tree from a flat `(id, parent_id)` table.
//!
//! Spreadsheet exports list one row per node with an `ID` and `PARENT_ID`
//! column. The rows are loaded into a petgraph `StableGraph`, reachability
//! from the single root is checked with a DFS, and the nested record is then
//! produced with depths counted from the root. Children keep row order.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::Dfs;
use petgraph::{Directed, Direction};
use tracing::{debug, instrument};

use super::builder::{RawNode, TreeBuilder};
use super::node::{NodeId, TreeNode};
use crate::error::{MalformedTreeError, Result};

impl TreeBuilder {
    /// Build a tree from `(id, parent_id)` rows; exactly one row has no parent.
    #[instrument(level = "debug", skip_all, fields(rows = records.len()))]
    pub fn from_records<I>(&self, records: &[(I, Option<I>)]) -> Result<TreeNode>
    where
        I: Clone + Into<NodeId>,
    {
        let rows: Vec<(NodeId, Option<NodeId>)> = records
            .iter()
            .map(|(id, parent)| (id.clone().into(), parent.clone().map(Into::into)))
            .collect();

        // Node weight is the row index, so children can be put back in row order.
        let mut graph: StableGraph<usize, (), Directed> =
            StableGraph::with_capacity(rows.len(), rows.len());
        let mut index_of: HashMap<&NodeId, NodeIndex> = HashMap::with_capacity(rows.len());

        for (row, (id, _)) in rows.iter().enumerate() {
            let index = graph.add_node(row);
            if index_of.insert(id, index).is_some() {
                return Err(MalformedTreeError::DuplicateId { id: id.clone() }.into());
            }
        }

        let mut root: Option<(&NodeId, NodeIndex)> = None;
        for (id, parent) in &rows {
            let index = index_of[id];
            match parent {
                None => {
                    if let Some((first, _)) = root {
                        return Err(MalformedTreeError::MultipleRoots {
                            first: first.clone(),
                            second: id.clone(),
                        }
                        .into());
                    }
                    root = Some((id, index));
                }
                Some(parent_id) => {
                    let Some(&parent_index) = index_of.get(parent_id) else {
                        return Err(MalformedTreeError::UnknownParent {
                            id: id.clone(),
                            parent_id: parent_id.clone(),
                        }
                        .into());
                    };
                    graph.add_edge(parent_index, index, ());
                }
            }
        }
        let Some((root_id, root_index)) = root else {
            return Err(MalformedTreeError::NoRoot.into());
        };

        // Every row has one parent, so unreachable rows can only sit on a cycle.
        let mut reached = vec![false; rows.len()];
        let mut dfs = Dfs::new(&graph, root_index);
        while let Some(index) = dfs.next(&graph) {
            reached[graph[index]] = true;
        }
        if let Some(row) = reached.iter().position(|&r| !r) {
            return Err(MalformedTreeError::Unreachable {
                id: rows[row].0.clone(),
            }
            .into());
        }

        debug!(root = %root_id, "assembled tree from table");
        let raw = Self::assemble(&graph, &rows, root_index);
        self.build(&raw)
    }

    /// Nested record for the subtree under `root`, children in row order.
    fn assemble(
        graph: &StableGraph<usize, (), Directed>,
        rows: &[(NodeId, Option<NodeId>)],
        root: NodeIndex,
    ) -> RawNode {
        let open = |index: NodeIndex, depth: u32| {
            let (id, parent_id) = &rows[graph[index]];
            let mut children: Vec<NodeIndex> = graph
                .neighbors_directed(index, Direction::Outgoing)
                .collect();
            // Popped from the back, so the last row comes first.
            children.sort_by_key(|&child| std::cmp::Reverse(graph[child]));
            let node = RawNode::new(id.clone(), parent_id.clone(), f64::from(depth));
            (node, children)
        };

        let mut ancestors: Vec<(RawNode, Vec<NodeIndex>)> = Vec::new();
        let mut current = open(root, 0);
        loop {
            if let Some(child) = current.1.pop() {
                let depth = ancestors.len() as u32 + 1;
                ancestors.push(current);
                current = open(child, depth);
                continue;
            }
            let (node, _) = current;
            match ancestors.pop() {
                Some(mut parent) => {
                    parent.0.children.push(node);
                    current = parent;
                }
                None => return node,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn malformed(result: Result<TreeNode>) -> MalformedTreeError {
        match result {
            Err(Error::Malformed(err)) => err,
            other => panic!("expected a malformed tree error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_records_assigns_depths() {
        let rows = [
            (1u32, None),
            (2, Some(1)),
            (3, Some(1)),
            (4, Some(2)),
            (5, Some(4)),
        ];
        let tree = TreeBuilder::new().from_records(&rows).unwrap();

        assert_eq!(tree.id().as_str(), "1");
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.find("4").unwrap().depth(), 2);
        assert_eq!(tree.find("5").unwrap().depth(), 3);
        assert_eq!(tree.max_depth(), 3);
    }

    #[test]
    fn test_from_records_keeps_row_order() {
        // Children listed before their parent row are still attached in row order.
        let rows = [
            ("c", Some("root")),
            ("a", Some("root")),
            ("root", None),
            ("b", Some("root")),
        ];
        let tree = TreeBuilder::new().from_records(&rows).unwrap();
        let ids: Vec<&str> = tree.children().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_from_records_rejects_bad_tables() {
        let builder = TreeBuilder::new();

        assert_eq!(
            malformed(builder.from_records(&[("a", Some("b")), ("b", Some("a"))])),
            MalformedTreeError::NoRoot
        );
        assert!(matches!(
            malformed(builder.from_records(&[("a", None), ("b", None)])),
            MalformedTreeError::MultipleRoots { .. }
        ));
        assert!(matches!(
            malformed(builder.from_records(&[("a", None), ("b", Some("zz"))])),
            MalformedTreeError::UnknownParent { .. }
        ));
        assert!(matches!(
            malformed(builder.from_records(&[("a", None), ("a", Some("a"))])),
            MalformedTreeError::DuplicateId { .. }
        ));
    }

    #[test]
    fn test_from_records_rejects_cycles() {
        let rows = [
            ("root", None),
            ("a", Some("root")),
            ("x", Some("y")),
            ("y", Some("x")),
        ];
        let err = malformed(TreeBuilder::new().from_records(&rows));
        assert_eq!(err, MalformedTreeError::Unreachable { id: "x".into() });

        let self_parent = [("root", None), ("s", Some("s"))];
        let err = malformed(TreeBuilder::new().from_records(&self_parent));
        assert_eq!(err, MalformedTreeError::Unreachable { id: "s".into() });
    }

    #[test]
    fn test_from_records_deep_chain() {
        let rows: Vec<(u32, Option<u32>)> = (0..20_000u32)
            .map(|i| (i, i.checked_sub(1)))
            .collect();
        let tree = TreeBuilder::new().from_records(&rows).unwrap();
        assert_eq!(tree.len(), 20_000);
        assert_eq!(tree.max_depth(), 19_999);
        assert_eq!(tree.find("19999").unwrap().parent_id().unwrap().as_str(), "19998");
    }
}
