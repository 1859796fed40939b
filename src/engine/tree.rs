//! Command trees produced by the grammar parser.

use std::fmt;

/// Type of a command variable such as `<name:string>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Any single token.
    String,
    /// A signed 64-bit decimal integer (`int`, `int64`).
    Int,
    Int8,
    Int16,
    Int32,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    /// `true` or `false`.
    Bool,
}

impl VarType {
    /// Look up a type by its grammar-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "int" | "int64" => Some(Self::Int),
            "int8" => Some(Self::Int8),
            "int16" => Some(Self::Int16),
            "int32" => Some(Self::Int32),
            "uint8" => Some(Self::Uint8),
            "uint16" => Some(Self::Uint16),
            "uint32" => Some(Self::Uint32),
            "uint64" => Some(Self::Uint64),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// Whether a token is a valid value of this type. Integers must fit
    /// the type's width.
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            Self::String => !token.is_empty(),
            Self::Int => token.parse::<i64>().is_ok(),
            Self::Int8 => token.parse::<i8>().is_ok(),
            Self::Int16 => token.parse::<i16>().is_ok(),
            Self::Int32 => token.parse::<i32>().is_ok(),
            Self::Uint8 => token.parse::<u8>().is_ok(),
            Self::Uint16 => token.parse::<u16>().is_ok(),
            Self::Uint32 => token.parse::<u32>().is_ok(),
            Self::Uint64 => token.parse::<u64>().is_ok(),
            Self::Bool => matches!(token, "true" | "false"),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A callback reference attached to a command: `name("arg", ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    /// Callback name, resolved by the dispatcher.
    pub name: String,
    /// Literal string arguments.
    pub args: Vec<String>,
}

impl Callback {
    /// Create a callback without arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Add a literal argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// What a node matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A literal keyword.
    Keyword(String),
    /// A typed variable bound to `name`.
    Variable { name: String, var_type: VarType },
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(word) => f.write_str(word),
            Self::Variable { name, var_type } => write!(f, "<{}:{}>", name, var_type),
        }
    }
}

/// One node in a command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNode {
    pub kind: NodeKind,
    pub help: Option<String>,
    pub callback: Option<Callback>,
    pub children: ParseTree,
}

impl CommandNode {
    /// Create a keyword node.
    pub fn keyword(word: impl Into<String>) -> Self {
        Self::with_kind(NodeKind::Keyword(word.into()))
    }

    /// Create a variable node.
    pub fn variable(name: impl Into<String>, var_type: VarType) -> Self {
        Self::with_kind(NodeKind::Variable {
            name: name.into(),
            var_type,
        })
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            help: None,
            callback: None,
            children: ParseTree::new(),
        }
    }

    /// Set the help text.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Set the callback.
    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Add a child node.
    pub fn child(mut self, node: CommandNode) -> Self {
        self.children.insert(node);
        self
    }

    /// The keyword text, if this is a keyword node.
    pub fn as_keyword(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Keyword(word) => Some(word),
            NodeKind::Variable { .. } => None,
        }
    }
}

/// An ordered set of sibling command nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<CommandNode>,
}

impl ParseTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes in declaration order.
    pub fn nodes(&self) -> &[CommandNode] {
        &self.nodes
    }

    /// Insert a node, merging it into an existing sibling of the same kind.
    ///
    /// On merge the existing help text and callback are kept when present
    /// and the children are merged recursively.
    pub fn insert(&mut self, node: CommandNode) {
        match self.nodes.iter_mut().find(|n| n.kind == node.kind) {
            Some(existing) => {
                if existing.help.is_none() {
                    existing.help = node.help;
                }
                if existing.callback.is_none() {
                    existing.callback = node.callback;
                }
                existing.children.merge(node.children);
            }
            None => self.nodes.push(node),
        }
    }

    /// Merge all nodes of another tree into this one.
    pub fn merge(&mut self, other: ParseTree) {
        for node in other.nodes {
            self.insert(node);
        }
    }

    /// Find a top-level keyword node by exact name.
    pub fn keyword(&self, word: &str) -> Option<&CommandNode> {
        self.nodes.iter().find(|n| n.as_keyword() == Some(word))
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Global assignments collected from a grammar file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    vars: Vec<(String, String)>,
}

impl Globals {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the last value assigned to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Record an assignment.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.push((name.into(), value.into()));
    }

    /// Append all assignments of another collection.
    pub fn extend(&mut self, other: Globals) {
        self.vars.extend(other.vars);
    }

    /// Iterate over assignments in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if there are no assignments.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
