/*!
Bracket parser.

Turns a flat token list into a tree of invocations:

```text
foo [ bar a b ] [ baz c ] -o z
  -> foo, [bar a b], [baz c], -o, z
```

Only the literal tokens `[` and `]` are structural; `[a` or `b]` are plain
text. Besides balance, only the nesting depth is checked here, so no tree
deeper than the limit is ever built.
*/

use crate::error::ToolboxError;

pub const OPEN: &str = "[";
pub const CLOSE: &str = "]";

/// One element of a parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Plain token.
    Leaf(String),
    /// `[ command args... ]`
    Nested(Vec<Node>),
}

impl Node {
    pub fn leaf(s: impl Into<String>) -> Self {
        Node::Leaf(s.into())
    }
}

/// Convert a token list with balanced brackets into nested nodes.
///
/// A `]` with nothing open fails at its own index; an unclosed `[` fails at
/// `tokens.len()`. A `[` opening more than `max_depth` levels fails with
/// `NestingTooDeep`.
pub fn unbracket<S: AsRef<str>>(
    tokens: &[S],
    max_depth: usize,
) -> Result<Vec<Node>, ToolboxError> {
    let mut current: Vec<Node> = Vec::new();
    let mut stack: Vec<Vec<Node>> = Vec::new();
    for (position, token) in tokens.iter().enumerate() {
        match token.as_ref() {
            OPEN => {
                if stack.len() >= max_depth {
                    return Err(ToolboxError::NestingTooDeep { limit: max_depth });
                }
                stack.push(std::mem::take(&mut current));
            }
            CLOSE => {
                let Some(mut parent) = stack.pop() else {
                    return Err(ToolboxError::BracketMismatch { position });
                };
                parent.push(Node::Nested(std::mem::take(&mut current)));
                current = parent;
            }
            other => current.push(Node::leaf(other)),
        }
    }
    if !stack.is_empty() {
        return Err(ToolboxError::BracketMismatch {
            position: tokens.len(),
        });
    }
    Ok(current)
}

/// Inverse of [`unbracket`]: tokens back in order, brackets included.
pub fn rebracket(nodes: &[Node]) -> Vec<String> {
    let mut out = Vec::new();
    push_tokens(nodes, &mut out, true);
    out
}

/// All leaf tokens in order, bracket markers dropped.
pub fn flatten(nodes: &[Node]) -> Vec<String> {
    let mut out = Vec::new();
    push_tokens(nodes, &mut out, false);
    out
}

fn push_tokens(nodes: &[Node], out: &mut Vec<String>, brackets: bool) {
    for node in nodes {
        match node {
            Node::Leaf(s) => out.push(s.clone()),
            Node::Nested(children) => {
                if brackets {
                    out.push(OPEN.to_string());
                }
                push_tokens(children, out, brackets);
                if brackets {
                    out.push(CLOSE.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate::DEFAULT_MAX_DEPTH;

    fn words(s: &str) -> Vec<String> {
        shell_words::split(s).unwrap()
    }

    fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Node>, ToolboxError> {
        unbracket(tokens, DEFAULT_MAX_DEPTH)
    }

    #[test]
    fn single_nesting() {
        let nodes = parse(&["a", "[", "b", "]", "c"]).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::leaf("a"),
                Node::Nested(vec![Node::leaf("b")]),
                Node::leaf("c")
            ]
        );
    }

    #[test]
    fn sibling_groups() {
        let nodes = parse(&words("foo [ bar a b ] [ baz c ] -o z")).unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::leaf("foo"),
                Node::Nested(vec![Node::leaf("bar"), Node::leaf("a"), Node::leaf("b")]),
                Node::Nested(vec![Node::leaf("baz"), Node::leaf("c")]),
                Node::leaf("-o"),
                Node::leaf("z"),
            ]
        );
    }

    #[test]
    fn deep_nesting() {
        let nodes = parse(&words("a [ b [ c [ d ] ] ]")).unwrap();
        let expected = vec![
            Node::leaf("a"),
            Node::Nested(vec![
                Node::leaf("b"),
                Node::Nested(vec![Node::leaf("c"), Node::Nested(vec![Node::leaf("d")])]),
            ]),
        ];
        assert_eq!(nodes, expected);
    }

    #[test]
    fn stray_close_reports_its_index() {
        let err = parse(&["a", "]"]).unwrap_err();
        assert!(matches!(err, ToolboxError::BracketMismatch { position: 1 }));
    }

    #[test]
    fn unclosed_open_reports_end() {
        let err = parse(&["a", "["]).unwrap_err();
        assert!(matches!(err, ToolboxError::BracketMismatch { position: 2 }));
    }

    #[test]
    fn glued_brackets_are_text() {
        let nodes = parse(&["[a", "b]"]).unwrap();
        assert_eq!(nodes, vec![Node::leaf("[a"), Node::leaf("b]")]);
    }

    #[test]
    fn empty_group_allowed_at_parse_time() {
        let nodes = parse(&["[", "]"]).unwrap();
        assert_eq!(nodes, vec![Node::Nested(vec![])]);
    }

    #[test]
    fn flatten_preserves_token_order() {
        for line in [
            "cmd a b",
            "outer [ inner x ] y",
            "a [ b [ c d ] e ] [ f ] g",
            "[ [ [ deep ] ] ]",
        ] {
            let tokens = words(line);
            let nodes = parse(&tokens).unwrap();
            let without: Vec<String> = tokens
                .iter()
                .filter(|t| *t != OPEN && *t != CLOSE)
                .cloned()
                .collect();
            assert_eq!(flatten(&nodes), without, "{line}");
            assert_eq!(rebracket(&nodes), tokens, "{line}");
        }
    }

    #[test]
    fn depth_limit_counts_open_groups() {
        assert!(unbracket(&words("a [ b [ c ] ]"), 2).is_ok());
        let err = unbracket(&words("a [ b [ c ] ]"), 1).unwrap_err();
        assert!(matches!(err, ToolboxError::NestingTooDeep { limit: 1 }));
        assert!(unbracket(&words("a [ b ] [ c ]"), 1).is_ok());
    }

    #[test]
    fn very_deep_input_stops_at_the_limit() {
        let levels = 200_000;
        let mut tokens = vec!["describe".to_string()];
        tokens.extend((0..levels).flat_map(|_| [OPEN.to_string(), "describe".to_string()]));
        tokens.push("x.json".to_string());
        tokens.extend((0..levels).map(|_| CLOSE.to_string()));
        let err = parse(&tokens).unwrap_err();
        assert!(
            matches!(err, ToolboxError::NestingTooDeep { limit } if limit == DEFAULT_MAX_DEPTH)
        );
    }
}
