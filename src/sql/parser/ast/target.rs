/// The projection of a SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectList<'src> {
    /// `*`
    Star,
    /// Column names in the order they were requested.
    Columns(Vec<&'src str>),
}
