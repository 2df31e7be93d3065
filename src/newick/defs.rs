/// Newick label delimiters: parentheses, comma, colon, semicolon, comment start, whitespace
pub(crate) const NEWICK_LABEL_DELIMITERS: &[u8] = b"(),:;[ \n\t\r";

/// Default maximum nesting depth of parentheses; the parser recurses once per level
pub(crate) const DEFAULT_MAX_DEPTH: usize = 1000;

/// Default guess for number of vertices, when unknown
pub(crate) const DEFAULT_NUM_VERTICES_GUESS: usize = 32;
