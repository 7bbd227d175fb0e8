use strum::{Display, EnumString};

/// SQL keywords recognized by the parser.
///
/// These keywords are case-insensitive and reserved for SQL syntax. Column
/// types (`INT`, `VARCHAR`) are not keywords; column definitions are
/// classified from their raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Keyword {
    Create,
    Table,
    Index,
    On,

    Select,
    From,
    Where,

    Insert,
    Into,
    Values,

    Delete,
}
