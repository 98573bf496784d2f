//! Pure operations over a comment forest.
//!
//! Every function here takes the current forest by reference and hands back
//! a fresh one, leaving the input untouched. Callers compare input and
//! output to detect a no-op apply, which is also what makes duplicate and
//! out-of-order feed events safe: operating on an id that is not in the
//! forest returns a forest equal to the input.

use crate::api::{Comment, CommentId, CommentPatch};

/// Depth-first search over every subtree.
pub fn contains(forest: &[Comment], id: CommentId) -> bool {
    forest.iter().any(|c| c.id == id || contains(&c.children, id))
}

fn find_mut(forest: &mut [Comment], id: CommentId) -> Option<&mut Comment> {
    for c in forest.iter_mut() {
        if c.id == id {
            return Some(c);
        }
        if let Some(found) = find_mut(&mut c.children, id) {
            return Some(found);
        }
    }
    None
}

/// Append `node` at top level for a root comment, or to the `children` of
/// the node matching its `parent_id`, wherever that node sits in the forest.
///
/// A reply whose parent is nowhere in the forest is dropped: the result
/// compares equal to the input, and it is up to the caller to decide what
/// that silence means.
pub fn insert(forest: &[Comment], node: Comment) -> Vec<Comment> {
    let mut next = forest.to_vec();
    match node.parent_id {
        None => next.push(node),
        Some(parent_id) => {
            if let Some(parent) = find_mut(&mut next, parent_id) {
                parent.children.push(node);
            }
        }
    }
    next
}

/// Replace the scalar fields of the node matching `patch.id`, preserving its
/// reply subtree. No-op if the id is not in the forest.
pub fn update(forest: &[Comment], patch: &CommentPatch) -> Vec<Comment> {
    let mut next = forest.to_vec();
    if let Some(c) = find_mut(&mut next, patch.id) {
        c.content = patch.content.clone();
        c.updated_at = patch.updated_at;
        c.is_edited = patch.is_edited;
        // c.children deliberately untouched: a patch never carries replies
    }
    next
}

/// Filter `id` out of whichever sequence directly holds it; the removed
/// node's subtree goes with it. No-op if the id is not in the forest.
pub fn remove(forest: &[Comment], id: CommentId) -> Vec<Comment> {
    forest
        .iter()
        .filter(|c| c.id != id)
        .map(|c| {
            let mut c = c.clone();
            c.children = remove(&c.children, id);
            c
        })
        .collect()
}

/// Total number of comments in the forest, replies included.
pub fn node_count(forest: &[Comment]) -> usize {
    forest.iter().map(|c| 1 + node_count(&c.children)).sum()
}

/// Number of levels in the deepest subtree (a lone root counts as 1).
pub fn max_depth(forest: &[Comment]) -> usize {
    forest
        .iter()
        .map(|c| 1 + max_depth(&c.children))
        .max()
        .unwrap_or(0)
}
