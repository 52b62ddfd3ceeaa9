use snafu::Snafu;

/// Errors that can occur when querying the context tree.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
pub enum QueryError {
    /// A query expected to find exactly one node found none.
    #[snafu(display("Query '{}' matched no nodes.", query))]
    NoMatch {
        /// The query that was executed.
        query: String,
    },

    /// A query expected to find exactly one node found several.
    #[snafu(display("Query '{}' matched {} nodes, expected exactly one.", query, matches))]
    MultipleMatches {
        /// The query that was executed.
        query: String,

        /// The number of nodes that matched.
        matches: usize,
    },
}
