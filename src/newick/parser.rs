//! Structs and logic to parse Newick strings into n-ary trees.
//!
//! This module provides the [NewickParser] struct, which parses a single
//! Newick string into a [PhyloTree] together with its [ParseStats].

use crate::model::{BranchLength, PhyloTree, VertexIndex};
use crate::newick::defs::{DEFAULT_MAX_DEPTH, DEFAULT_NUM_VERTICES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::ParsingError;

/// How the label following the closing parenthesis of an internal vertex
/// is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InternalLabels {
    /// Finite numeric labels are bootstrap values, any other label is a name.
    #[default]
    Auto,
    /// Internal labels are always names.
    Name,
    /// Internal labels are always bootstrap values.
    Bootstrap,
}

/// Counts gathered while parsing a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// Total number of vertices (root, internal, and leaves)
    pub node_count: usize,
    /// Number of vertices without children
    pub leaf_count: usize,
}

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for a single n-ary Newick tree.
///
/// # Configuration
/// * [`with_num_vertices(n)`](Self::with_num_vertices)
///     - Pre-allocates the vertex arena, otherwise a small default is used.
/// * [`with_max_depth(n)`](Self::with_max_depth)
///     - Limits nesting of parentheses (default 1000); deeper trees are
///       rejected with [ParsingErrorType::NestingTooDeep](crate::parser::ParsingErrorType)
///       instead of exhausting the stack.
/// * [`with_internal_labels(mode)`](Self::with_internal_labels)
///     - Decides whether internal labels are names or bootstrap values,
///       see [InternalLabels].
///
/// # Example
/// ```
/// use newick_graph::newick::NewickParser;
/// use newick_graph::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("((A:1,B:2)95:0.5,C:3);");
/// let (tree, stats) = NewickParser::new().parse_str(&mut byte_parser).unwrap();
///
/// assert_eq!(stats.node_count, 5);
/// assert_eq!(tree.root().num_children(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    num_vertices: usize,
    max_depth: usize,
    internal_labels: InternalLabels,
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] with default settings.
    pub fn new() -> Self {
        Self {
            num_vertices: DEFAULT_NUM_VERTICES_GUESS,
            max_depth: DEFAULT_MAX_DEPTH,
            internal_labels: InternalLabels::default(),
        }
    }

    /// Sets the expected number of vertices, used to pre-allocate the tree.
    pub fn with_num_vertices(mut self, num_vertices: usize) -> Self {
        self.num_vertices = num_vertices;
        self
    }

    /// Sets the maximum nesting depth of parentheses.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets how labels of internal vertices are interpreted.
    pub fn with_internal_labels(mut self, internal_labels: InternalLabels) -> Self {
        self.internal_labels = internal_labels;
        self
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Parses a single Newick tree from the given [ByteParser],
    /// up to and including its terminating `;`.
    ///
    /// # Returns
    /// * `Ok((PhyloTree, ParseStats))` - The parsed tree and its counts
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_str(&self, parser: &mut ByteParser<'_>) -> Result<(PhyloTree, ParseStats), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::empty_input(parser));
        }

        let mut tree = PhyloTree::with_capacity(self.num_vertices);
        let root_index = self.parse_vertex(parser, &mut tree, 0)?;

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            return Err(match parser.peek() {
                None => ParsingError::unexpected_eof(parser),
                Some(b) => ParsingError::invalid_newick_string(
                    parser,
                    format!("Expected ';' at end of tree but found {:?}", char::from(b)),
                ),
            });
        }

        tree.set_root(root_index);
        let stats = ParseStats {
            node_count: tree.num_vertices(),
            leaf_count: tree.num_leaves(),
        };

        Ok((tree, stats))
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser {
    /// Parses a vertex (either internal vertex or leaf) and returns its index:
    /// - Skips leading comments and whitespace
    /// - Dispatches to `parse_internal_vertex` if starts with `(`, otherwise `parse_leaf`
    fn parse_vertex(
        &self,
        parser: &mut ByteParser<'_>,
        tree: &mut PhyloTree,
        depth: usize,
    ) -> Result<VertexIndex, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.peek_is(b'(') {
            self.parse_internal_vertex(parser, tree, depth)
        } else {
            self.parse_leaf(parser, tree)
        }
    }

    /// Parses internal vertex, adds it to tree, and returns its index:
    /// - `(child[,child]*)[label][:branch_length]`
    fn parse_internal_vertex(
        &self,
        parser: &mut ByteParser<'_>,
        tree: &mut PhyloTree,
        depth: usize,
    ) -> Result<VertexIndex, ParsingError> {
        if depth >= self.max_depth {
            return Err(ParsingError::nesting_too_deep(parser, self.max_depth));
        }
        let children = self.parse_children(parser, tree, depth)?;

        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        let (name, bootstrap) = self.interpret_internal_label(label);
        let branch_length = self.parse_branch_length(parser)?;

        Ok(tree.add_internal(children, name, bootstrap, branch_length))
    }

    /// Parses the children list `(child[,child]*)` and returns their indices:
    /// - Expects parser at opening `(`
    fn parse_children(
        &self,
        parser: &mut ByteParser<'_>,
        tree: &mut PhyloTree,
        depth: usize,
    ) -> Result<Vec<VertexIndex>, ParsingError> {
        if !parser.consume_if(b'(') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {:?}", next_char),
            ));
        }

        let mut children = Vec::new();
        loop {
            children.push(self.parse_vertex(parser, tree, depth + 1)?);

            parser.skip_comment_and_whitespace()?;
            match parser.next_byte() {
                Some(b',') => continue,
                Some(b')') => break,
                None => return Err(ParsingError::unexpected_eof(parser)),
                Some(b) => {
                    return Err(ParsingError::invalid_newick_string(
                        parser,
                        format!("Expected ',' or ')' after child but found {:?}", char::from(b)),
                    ));
                }
            }
        }

        Ok(children)
    }

    /// Parses leaf vertex and adds it to tree:
    /// - `[label][:branch_length]`
    fn parse_leaf(&self, parser: &mut ByteParser<'_>, tree: &mut PhyloTree) -> Result<VertexIndex, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        let name = if label.is_empty() { None } else { Some(label) };
        let branch_length = self.parse_branch_length(parser)?;

        Ok(tree.add_leaf(name, branch_length))
    }

    /// Splits the label of an internal vertex into name and bootstrap value.
    fn interpret_internal_label(&self, label: String) -> (Option<String>, Option<String>) {
        if label.is_empty() {
            return (None, None);
        }

        match self.internal_labels {
            InternalLabels::Name => (Some(label), None),
            InternalLabels::Bootstrap => (None, Some(label)),
            InternalLabels::Auto => {
                if label.parse::<f64>().is_ok_and(f64::is_finite) {
                    (None, Some(label))
                } else {
                    (Some(label), None)
                }
            }
        }
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if found a valid branch length
    /// - `Ok(None)` if no branch length found
    /// - [ParsingError] if the value is not a finite number
    fn parse_branch_length(&self, parser: &mut ByteParser<'_>) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let literal = parser.parse_number_literal();
        literal
            .parse::<f64>()
            .ok()
            .and_then(BranchLength::try_new)
            .map(Some)
            .ok_or_else(|| ParsingError::invalid_branch_length(parser, literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parsing_error::ParsingErrorType;

    fn parse(newick: &str) -> (PhyloTree, ParseStats) {
        NewickParser::new().parse_str(&mut ByteParser::for_str(newick)).unwrap()
    }

    #[test]
    fn test_internal_label_auto() {
        let (tree, _) = parse("((A,B)86,(C,D)clade_x)root;");
        let root = tree.root();
        assert_eq!(root.name(), Some("root"));

        let left = tree.vertex(root.children()[0]);
        assert_eq!(left.bootstrap(), Some("86"));
        assert_eq!(left.name(), None);

        let right = tree.vertex(root.children()[1]);
        assert_eq!(right.name(), Some("clade_x"));
        assert_eq!(right.bootstrap(), None);
    }

    #[test]
    fn test_non_finite_internal_labels_are_names() {
        let (tree, _) = parse("((A,B)NaN,(C,D)Inf,(E,F)infinity,G);");
        let labels: Vec<_> = tree
            .root()
            .children()
            .iter()
            .take(3)
            .map(|&c| (tree.vertex(c).name(), tree.vertex(c).bootstrap()))
            .collect();
        assert_eq!(
            labels,
            vec![(Some("NaN"), None), (Some("Inf"), None), (Some("infinity"), None)]
        );
    }

    #[test]
    fn test_internal_label_modes() {
        let newick = "((A,B)86,C);";

        let (tree, _) = NewickParser::new()
            .with_internal_labels(InternalLabels::Name)
            .parse_str(&mut ByteParser::for_str(newick))
            .unwrap();
        let inner = tree.vertex(tree.root().children()[0]);
        assert_eq!(inner.name(), Some("86"));
        assert_eq!(inner.bootstrap(), None);

        let (tree, _) = NewickParser::new()
            .with_internal_labels(InternalLabels::Bootstrap)
            .parse_str(&mut ByteParser::for_str("((A,B)strong,C);"))
            .unwrap();
        let inner = tree.vertex(tree.root().children()[0]);
        assert_eq!(inner.name(), None);
        assert_eq!(inner.bootstrap(), Some("strong"));
    }

    #[test]
    fn test_multifurcation_keeps_child_order() {
        let (tree, stats) = parse("(A,B,C,D);");
        assert_eq!(stats, ParseStats { node_count: 5, leaf_count: 4 });

        let names: Vec<_> = tree
            .root()
            .children()
            .iter()
            .map(|&c| tree.vertex(c).name().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_negative_branch_length_kept() {
        let (tree, _) = parse("(A:-1,B:2);");
        let a = tree.vertex(tree.root().children()[0]);
        assert_eq!(*a.branch_length().unwrap(), -1.0);
    }

    #[test]
    fn test_overflowing_branch_length_rejected() {
        let result = NewickParser::new().parse_str(&mut ByteParser::for_str("(A:1e999,B:2);"));
        assert!(result.is_err());
    }

    fn nested(levels: usize) -> String {
        format!("{}A,B{};", "(".repeat(levels), ",C)".repeat(levels))
    }

    #[test]
    fn test_nesting_limit() {
        let parser = NewickParser::new().with_max_depth(50);

        let (tree, stats) = parser.parse_str(&mut ByteParser::for_str(&nested(50))).unwrap();
        assert_eq!(stats.leaf_count, 52);
        assert!(tree.is_valid());

        let err = parser.parse_str(&mut ByteParser::for_str(&nested(51))).unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::NestingTooDeep(50));
    }
}
