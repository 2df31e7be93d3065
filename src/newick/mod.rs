//! Newick format parser for phylogenetic trees.
//!
//! This module provides [NewickParser] to parse a Newick string into an
//! n-ary [PhyloTree] plus [ParseStats].
//!
//! # Quick API
//! * [`parse_str`] - parses a string holding exactly one tree
//!
//! # Format
//! The (n-ary) Newick format has the following simple grammar:
//! * `tree ::= vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= [label] [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Labels are unquoted or single-quoted (`''` is an escaped quote)
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * A label after the closing parenthesis of an internal vertex is a bootstrap
//!   value if it is a finite number and a name otherwise (see [InternalLabels])
//! * Parentheses nest at most 1000 levels deep by default
//!   (see [NewickParser::with_max_depth])
//!
//! Extended Newick annotations (`[&rate=0.5]`) are treated as comments.

mod defs;
pub mod parser;

pub use parser::{InternalLabels, NewickParser, ParseStats};

use crate::model::PhyloTree;
use crate::parser::ParsingError;
use crate::parser::byte_parser::ByteParser;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a string holding a single Newick tree using default settings.
///
/// Only whitespace and comments may follow the terminating `;`.
///
/// # Example
/// ```
/// use newick_graph::newick::parse_str;
///
/// let (tree, stats) = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));")?;
/// assert_eq!(stats.node_count, 5);
/// assert_eq!(stats.leaf_count, 3);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<(PhyloTree, ParseStats), ParsingError> {
    parse_str_with(&NewickParser::new(), newick.as_ref())
}

/// Parses a string holding a single Newick tree with the given parser configuration.
///
/// Only whitespace and comments may follow the terminating `;`.
pub fn parse_str_with(newick_parser: &NewickParser, newick: &str) -> Result<(PhyloTree, ParseStats), ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick);
    let parsed = newick_parser.parse_str(&mut byte_parser)?;

    byte_parser.skip_comment_and_whitespace()?;
    if !byte_parser.is_eof() {
        return Err(ParsingError::invalid_newick_string(
            &byte_parser,
            "Expected end of input after ';'".to_string(),
        ));
    }

    Ok(parsed)
}
