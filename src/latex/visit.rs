//! AST traversal and mutation
//!
//! [`walk`] drives a depth-first, left-to-right traversal: `enter` is
//! called pre-order and returns an [`Action`]; `exit` is called
//! post-order. Mutations requested from `enter` take effect before the
//! children are visited: `Replace` swaps in the new subtree and visits
//! its children, `Remove` excises the node (no `exit`) and continues
//! with the next sibling.
//!
//! Child sequences are iterated by index with explicit adjustment, so
//! removing or replacing a node can never skip or repeat a sibling.
//! Argument contents are traversed like children, before the node's
//! own content.

use super::ast::Node;

/// What to do with the node just entered.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Visit the node's children, then `exit`.
    Continue,
    /// Skip the children; `exit` still runs.
    SkipChildren,
    /// Swap in the new subtree, then visit its children.
    Replace(Node),
    /// Excise the node and continue with the next sibling. `exit` does
    /// not run for removed nodes. Ignored for the root node, which has
    /// no parent to splice from.
    Remove,
}

/// A traversal callback. Only override what you need.
pub trait Visitor {
    fn enter(&mut self, _node: &Node) -> Action {
        Action::Continue
    }

    fn exit(&mut self, _node: &Node) {}
}

/// Walk a tree, applying the visitor's actions.
pub fn walk(root: &mut Node, visitor: &mut dyn Visitor) {
    match visitor.enter(root) {
        Action::Continue => {
            walk_into(root, visitor);
            visitor.exit(root);
        }
        Action::SkipChildren => visitor.exit(root),
        Action::Replace(new_node) => {
            *root = new_node;
            walk_into(root, visitor);
            visitor.exit(root);
        }
        // The root has no parent to splice from; traverse anyway
        Action::Remove => {
            walk_into(root, visitor);
            visitor.exit(root);
        }
    }
}

/// Walk a sibling sequence in place.
pub fn walk_nodes(nodes: &mut Vec<Node>, visitor: &mut dyn Visitor) {
    let mut i = 0;
    while i < nodes.len() {
        match visitor.enter(&nodes[i]) {
            Action::Continue => {
                walk_into(&mut nodes[i], visitor);
                visitor.exit(&nodes[i]);
                i += 1;
            }
            Action::SkipChildren => {
                visitor.exit(&nodes[i]);
                i += 1;
            }
            Action::Replace(new_node) => {
                nodes[i] = new_node;
                walk_into(&mut nodes[i], visitor);
                visitor.exit(&nodes[i]);
                i += 1;
            }
            Action::Remove => {
                nodes.remove(i);
            }
        }
    }
}

fn walk_into(node: &mut Node, visitor: &mut dyn Visitor) {
    if let Some(args) = node.args_mut() {
        for arg in args {
            walk_nodes(&mut arg.content, visitor);
        }
    }
    if let Some(children) = node.children_mut() {
        walk_nodes(children, visitor);
    }
}
