use crate::{Token, TokenKind, TreeNode};
use ptree::TreeItem;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

impl TreeNode {
    /// Create a named internal node with no children yet.
    pub fn internal(name: impl Into<String>) -> Self {
        TreeNode::Internal {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn internal_with(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode::Internal {
            name: name.into(),
            children,
        }
    }

    /// Create a construction-time node whose children get spliced into
    /// whatever parent it is added to.
    pub fn transparent() -> Self {
        TreeNode::Transparent {
            children: Vec::new(),
        }
    }

    pub fn leaf(kind: TokenKind, value: impl Into<String>) -> Self {
        TreeNode::Leaf {
            kind,
            value: value.into(),
        }
    }

    pub fn from_token(token: &Token) -> Self {
        TreeNode::leaf(token.kind, token.text.clone())
    }

    /// Add a child node. A [Transparent](TreeNode::Transparent) child is not
    /// added itself; its children are spliced into the receiver in order.
    pub fn add_child(&mut self, child: TreeNode) {
        let receiver = match self {
            TreeNode::Internal { children, .. } => children,
            TreeNode::Transparent { children } => children,
            TreeNode::Leaf { .. } => unreachable!("leaf nodes cannot have children"),
        };
        match child {
            TreeNode::Transparent { children } => receiver.extend(children),
            other => receiver.push(other),
        }
    }

    /// The node name: the nonterminal name for internal nodes, the token
    /// kind name for leaves.
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Internal { name, .. } => name,
            TreeNode::Leaf { kind, .. } => kind.name(),
            TreeNode::Transparent { .. } => "(transparent)",
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Internal { children, .. } => children,
            TreeNode::Transparent { children } => children,
            TreeNode::Leaf { .. } => &[],
        }
    }

    pub fn as_leaf(&self) -> Option<(TokenKind, &str)> {
        match self {
            TreeNode::Leaf { kind, value } => Some((*kind, value.as_str())),
            _ => None,
        }
    }

    /// Collect the leaf tokens of the tree in source order.
    pub fn leaves(&self) -> Vec<(TokenKind, &str)> {
        let mut collected = Vec::new();
        self.walk_leaves(&mut collected);
        collected
    }

    fn walk_leaves<'this>(&'this self, collected: &mut Vec<(TokenKind, &'this str)>) {
        match self {
            TreeNode::Leaf { kind, value } => collected.push((*kind, value.as_str())),
            _ => {
                for child in self.children() {
                    child.walk_leaves(collected);
                }
            }
        }
    }

    /// Find a node with the given name searching through all nested
    /// children.
    pub fn find_tree(&self, name: &str) -> Option<&TreeNode> {
        if self.name() == name {
            Some(self)
        } else {
            self.children()
                .iter()
                .find_map(|child| child.find_tree(name))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_tree(name).is_some()
    }

    pub fn print(&self) -> Result<(), std::io::Error> {
        ptree::print_tree(self)
    }
}

impl Display for TreeNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeNode::Leaf { kind, value } => write!(f, "{}:'{}'", kind.name(), value),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl TreeItem for TreeNode {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self)
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(TreeNode::children(self))
    }
}
