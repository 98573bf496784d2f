//! Bounded-depth projection of a reply forest for display.
//!
//! Threads nest arbitrarily deep in the store, but the UI only renders two
//! reply levels. Instead of truncating, every node deeper than the second
//! level is promoted to a level-two sibling with its replies cleared; its
//! `parent_id` still names its real structural parent, so "reply to this
//! comment" keeps working from the flattened view.

use crate::api::Comment;

/// Pure projection: the input forest is unchanged, every node of it appears
/// exactly once in the output, and the output never nests more than two
/// reply levels below a root. Idempotent.
pub fn flatten_replies(forest: &[Comment]) -> Vec<Comment> {
    forest.iter().map(flatten_root).collect()
}

fn flatten_root(root: &Comment) -> Comment {
    let mut out = root.clone();
    out.children = root
        .children
        .iter()
        .map(|reply| {
            let mut reply = reply.clone();
            let mut leveled = Vec::new();
            for nested in &reply.children {
                promote(nested, &mut leveled);
            }
            reply.children = leveled;
            reply
        })
        .collect();
    out
}

// Depth-first pre-order, so a promoted node still appears right before its
// own former replies.
fn promote(node: &Comment, out: &mut Vec<Comment>) {
    let mut lifted = node.clone();
    lifted.children = Vec::new();
    out.push(lifted);
    for child in &node.children {
        promote(child, out);
    }
}
