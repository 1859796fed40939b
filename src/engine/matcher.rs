//! Command line matching against a parse tree.

use super::tree::{Callback, NodeKind, ParseTree};

/// A successfully matched command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    /// Canonical path: full keywords and variable values.
    pub words: Vec<String>,
    /// Callback of the final node.
    pub callback: Callback,
    /// Variable bindings in line order.
    pub vars: Vec<(String, String)>,
}

impl CommandMatch {
    /// Value bound to a variable.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Result of matching one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(CommandMatch),
    Unknown,
    Ambiguous,
    Incomplete,
}

impl MatchOutcome {
    /// Diagnostic text for a failed match.
    pub fn diagnostic(&self) -> Option<&'static str> {
        match self {
            Self::Matched(_) => None,
            Self::Unknown => Some("Unknown command"),
            Self::Ambiguous => Some("Ambiguous command"),
            Self::Incomplete => Some("Incomplete command"),
        }
    }
}

/// Split a command line into tokens.
///
/// Whitespace separates tokens; double quotes group words, and an
/// unterminated quote runs to the end of the line.
pub fn split_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
}

/// Match tokens against a tree.
///
/// At each level an exact keyword wins, then a unique keyword prefix, then
/// the first variable whose type accepts the token. Several keywords
/// sharing the prefix with no exact hit is ambiguous.
pub fn match_tokens(tree: &ParseTree, tokens: &[String]) -> MatchOutcome {
    let mut level = tree;
    let mut words = Vec::with_capacity(tokens.len());
    let mut vars = Vec::new();
    let mut callback = None;

    if tokens.is_empty() {
        return MatchOutcome::Incomplete;
    }

    for token in tokens {
        let nodes = level.nodes();

        let exact = nodes
            .iter()
            .find(|n| n.as_keyword() == Some(token.as_str()));
        let node = match exact {
            Some(node) => node,
            None => {
                let prefixed: Vec<_> = nodes
                    .iter()
                    .filter(|n| n.as_keyword().is_some_and(|k| k.starts_with(token.as_str())))
                    .collect();
                match prefixed.len() {
                    1 => prefixed[0],
                    0 => {
                        let var = nodes.iter().find(|n| match &n.kind {
                            NodeKind::Variable { var_type, .. } => var_type.accepts(token),
                            NodeKind::Keyword(_) => false,
                        });
                        match var {
                            Some(node) => node,
                            None => return MatchOutcome::Unknown,
                        }
                    }
                    _ => return MatchOutcome::Ambiguous,
                }
            }
        };

        match &node.kind {
            NodeKind::Keyword(word) => words.push(word.clone()),
            NodeKind::Variable { name, .. } => {
                words.push(token.clone());
                vars.push((name.clone(), token.clone()));
            }
        }
        callback = node.callback.as_ref();
        level = &node.children;
    }

    match callback {
        Some(cb) => MatchOutcome::Matched(CommandMatch {
            words,
            callback: cb.clone(),
            vars,
        }),
        None => MatchOutcome::Incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tree::{CommandNode, VarType};

    fn tokens(line: &str) -> Vec<String> {
        split_line(line)
    }

    fn sample_tree() -> ParseTree {
        let mut tree = ParseTree::new();
        tree.insert(
            CommandNode::keyword("show")
                .child(CommandNode::keyword("version").callback(Callback::new("show_version")))
                .child(CommandNode::keyword("vlan").callback(Callback::new("show_vlan")))
                .child(
                    CommandNode::keyword("interface").child(
                        CommandNode::variable("name", VarType::String)
                            .callback(Callback::new("show_interface")),
                    ),
                ),
        );
        tree.insert(
            CommandNode::keyword("mtu").child(
                CommandNode::variable("size", VarType::Int).callback(Callback::new("set_mtu")),
            ),
        );
        tree
    }

    #[test]
    fn test_split_line() {
        assert_eq!(tokens("  show   version "), vec!["show", "version"]);
        assert_eq!(
            tokens(r#"set description "uplink to core""#),
            vec!["set", "description", "uplink to core"]
        );
        assert_eq!(tokens(r#"say """#), vec!["say", ""]);
        assert!(tokens("   ").is_empty());
    }

    #[test]
    fn test_exact_match() {
        let outcome = match_tokens(&sample_tree(), &tokens("show version"));
        match outcome {
            MatchOutcome::Matched(m) => {
                assert_eq!(m.words, vec!["show", "version"]);
                assert_eq!(m.callback.name, "show_version");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_unique_prefix() {
        let outcome = match_tokens(&sample_tree(), &tokens("sh int eth0"));
        match outcome {
            MatchOutcome::Matched(m) => {
                assert_eq!(m.words, vec!["show", "interface", "eth0"]);
                assert_eq!(m.var("name"), Some("eth0"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_prefix() {
        let outcome = match_tokens(&sample_tree(), &tokens("show v"));
        assert_eq!(outcome, MatchOutcome::Ambiguous);
        assert_eq!(outcome.diagnostic(), Some("Ambiguous command"));
    }

    #[test]
    fn test_unknown_and_incomplete() {
        let tree = sample_tree();
        assert_eq!(match_tokens(&tree, &tokens("reboot")), MatchOutcome::Unknown);
        assert_eq!(match_tokens(&tree, &tokens("show")), MatchOutcome::Incomplete);
        assert_eq!(match_tokens(&tree, &[]), MatchOutcome::Incomplete);
    }

    #[test]
    fn test_variable_type_checked() {
        let tree = sample_tree();
        assert_eq!(match_tokens(&tree, &tokens("mtu large")), MatchOutcome::Unknown);
        match match_tokens(&tree, &tokens("mtu 1500")) {
            MatchOutcome::Matched(m) => assert_eq!(m.var("size"), Some("1500")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_sized_variable_rejects_out_of_range() {
        let mut tree = ParseTree::new();
        tree.insert(
            CommandNode::keyword("vlan").child(
                CommandNode::variable("id", VarType::Uint16).callback(Callback::new("set_vlan")),
            ),
        );

        assert_eq!(match_tokens(&tree, &tokens("vlan -5")), MatchOutcome::Unknown);
        assert_eq!(match_tokens(&tree, &tokens("vlan 99999")), MatchOutcome::Unknown);
        assert!(matches!(
            match_tokens(&tree, &tokens("vlan 4094")),
            MatchOutcome::Matched(_)
        ));
    }
}
