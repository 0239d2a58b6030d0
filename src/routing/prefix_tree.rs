//! Literal-prefix tree over pattern bodies.
//!
//! Groups routes that share a literal prefix under one alternation branch
//! so a combined pattern does not repeat shared prefixes; compiled size
//! then tracks the distinct literal content instead of routes x pattern
//! length.
//!
//! Ordering invariant: a new entry may only merge with the immediately
//! preceding sibling. Entries are never reordered, so depth-first
//! traversal of the tree yields routes in declaration order.

/// Payload attached to each leaf: the index of the route within the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LeafId(pub usize);

#[derive(Debug)]
pub(crate) enum TreeItem {
    Group(PrefixTree),
    Leaf { regex: String, id: LeafId },
}

/// One node of the tree. `prefix` is the full shared literal prefix from
/// the root, not the increment over the parent.
#[derive(Debug)]
pub(crate) struct PrefixTree {
    pub prefix: String,
    pub items: Vec<TreeItem>,
}

impl PrefixTree {
    pub fn root() -> Self {
        Self {
            prefix: String::new(),
            items: Vec::new(),
        }
    }

    fn with_prefix(prefix: String) -> Self {
        Self {
            prefix,
            items: Vec::new(),
        }
    }

    /// Add a pattern body. `regex` must start with `self.prefix`.
    pub fn add(&mut self, regex: &str, id: LeafId) {
        debug_assert!(regex.starts_with(&self.prefix));

        enum Placement {
            Append,
            Descend,
            /// Wrap the previous sibling and the new leaf under a fresh
            /// node sharing this many prefix bytes.
            Wrap(usize),
        }

        let placement = match self.items.last() {
            None => Placement::Append,
            Some(item) => {
                let last_key = match item {
                    TreeItem::Group(group) => group.prefix.as_str(),
                    TreeItem::Leaf { regex, .. } => regex.as_str(),
                };
                let common = common_literal_prefix(last_key, regex).len();
                if common <= self.prefix.len() {
                    Placement::Append
                } else if matches!(item, TreeItem::Group(group) if group.prefix.len() == common) {
                    Placement::Descend
                } else {
                    Placement::Wrap(common)
                }
            }
        };

        let leaf = TreeItem::Leaf {
            regex: regex.to_string(),
            id,
        };
        match placement {
            Placement::Append => self.items.push(leaf),
            Placement::Descend => {
                if let Some(TreeItem::Group(group)) = self.items.last_mut() {
                    group.add(regex, id);
                }
            }
            Placement::Wrap(common) => {
                let mut group = PrefixTree::with_prefix(regex[..common].to_string());
                if let Some(previous) = self.items.pop() {
                    group.items.push(previous);
                }
                group.items.push(leaf);
                self.items.push(TreeItem::Group(group));
            }
        }
    }
}

/// Longest common prefix of two pattern bodies that is safe to factor out
/// of an alternation: plain literal text only. The scan stops at the
/// first group or class opening and never splits an escape pair or a
/// multi-byte character.
fn common_literal_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    let mut end = 0;

    loop {
        if end >= a_bytes.len() || end >= b_bytes.len() {
            break;
        }
        let byte = a_bytes[end];
        if byte == b'(' || byte == b'[' {
            break;
        }
        let unit = if byte == b'\\' {
            // Escape pair; the escaped byte is ASCII for escaped
            // metacharacters, which is all the escaper produces.
            2
        } else {
            match a[end..].chars().next() {
                Some(c) => c.len_utf8(),
                None => break,
            }
        };
        if end + unit > a_bytes.len() || end + unit > b_bytes.len() {
            break;
        }
        if a_bytes[end..end + unit] != b_bytes[end..end + unit] {
            break;
        }
        end += unit;
    }

    &a[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(tree: &PrefixTree) -> Vec<usize> {
        let mut out = Vec::new();
        fn walk(tree: &PrefixTree, out: &mut Vec<usize>) {
            for item in &tree.items {
                match item {
                    TreeItem::Group(group) => walk(group, out),
                    TreeItem::Leaf { id, .. } => out.push(id.0),
                }
            }
        }
        walk(tree, &mut out);
        out
    }

    #[test]
    fn test_shared_prefix_grouped() {
        let mut tree = PrefixTree::root();
        tree.add("/users/(?P<id>[0-9]+)", LeafId(0));
        tree.add("/users/(?P<id>[0-9]+)/edit", LeafId(1));
        tree.add("/users/new", LeafId(2));

        assert_eq!(tree.items.len(), 1);
        let TreeItem::Group(group) = &tree.items[0] else {
            panic!("expected a group");
        };
        assert_eq!(group.prefix, "/users/");
        assert_eq!(leaves(&tree), vec![0, 1, 2]);
    }

    #[test]
    fn test_unrelated_patterns_share_only_the_slash() {
        let mut tree = PrefixTree::root();
        tree.add("/a/(?P<x>[^/]+)", LeafId(0));
        tree.add("/b/(?P<x>[^/]+)", LeafId(1));

        let TreeItem::Group(group) = &tree.items[0] else {
            panic!("expected a group");
        };
        assert_eq!(group.prefix, "/");
        assert_eq!(group.items.len(), 2);
        assert_eq!(leaves(&tree), vec![0, 1]);
    }

    #[test]
    fn test_order_is_never_broken() {
        // /a/static cannot jump over /b/y to join the first /a leaf.
        let mut tree = PrefixTree::root();
        tree.add("/a/(?P<x>[^/]+)", LeafId(0));
        tree.add("/b/(?P<y>[^/]+)", LeafId(1));
        tree.add("/a/static", LeafId(2));

        assert_eq!(leaves(&tree), vec![0, 1, 2]);
    }

    #[test]
    fn test_factoring_stops_at_groups() {
        let mut tree = PrefixTree::root();
        tree.add("/v/(?P<a>[0-9]+)/x", LeafId(0));
        tree.add("/v/(?P<a>[0-9]+)/y", LeafId(1));

        let TreeItem::Group(group) = &tree.items[0] else {
            panic!("expected a group");
        };
        // The capture group is opaque; only the literal head is shared.
        assert_eq!(group.prefix, "/v/");
    }

    #[test]
    fn test_escape_pairs_not_split() {
        let mut tree = PrefixTree::root();
        tree.add(r"/f\.json/(?P<a>[^/]+)", LeafId(0));
        tree.add(r"/f\.xml/(?P<b>[^/]+)", LeafId(1));

        let TreeItem::Group(group) = &tree.items[0] else {
            panic!("expected a group");
        };
        assert_eq!(group.prefix, r"/f\.");
    }

    #[test]
    fn test_nested_groups() {
        let mut tree = PrefixTree::root();
        tree.add("/api/v1/(?P<a>[^/]+)", LeafId(0));
        tree.add("/api/v1/users/(?P<b>[^/]+)", LeafId(1));
        tree.add("/api/status", LeafId(2));

        let TreeItem::Group(outer) = &tree.items[0] else {
            panic!("expected a group");
        };
        assert_eq!(outer.prefix, "/api/");
        assert_eq!(leaves(&tree), vec![0, 1, 2]);
    }
}
