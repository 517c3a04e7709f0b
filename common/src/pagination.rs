//! Cursor-based pagination primitives.
//!
//! Lists are paged by an opaque cursor, either forward (`first`/`after`) or
//! backward (`last`/`before`). Passing the same cursor as both `after` and
//! `before` selects a page starting at (and including) that cursor.

use std::fmt;

/// Page of nodes with their cursors.
#[derive(Clone, Debug)]
pub struct Connection<C, I> {
    /// [`Edge`]s on this page, in the order they were selected.
    pub edges: Vec<Edge<C, I>>,

    /// [`Kind`] of pagination this page was selected with.
    pub kind: Kind,

    /// Indicator whether more nodes follow this page in its direction.
    pub has_more: bool,
}

/// A page in a [`Connection`].
pub type Page<C, I> = Connection<C, I>;

impl<C, I> Connection<C, I> {
    /// Creates a new [`Connection`] out of the [`Edge`]s selected with the
    /// provided [`Arguments`].
    #[must_use]
    pub fn new(
        args: &Arguments<C>,
        edges: impl IntoIterator<Item = impl Into<Edge<C, I>>>,
        has_more: bool,
    ) -> Self {
        Self {
            edges: edges.into_iter().map(Into::into).collect(),
            kind: args.kind(),
            has_more,
        }
    }

    /// Returns [`PageInfo`] of this [`Connection`].
    #[must_use]
    pub fn page_info(&self) -> PageInfo<C>
    where
        C: Clone,
    {
        PageInfo {
            end_cursor: self.edges.last().map(|e| e.cursor.clone()),
            has_next_page: self.has_more && self.kind.is_forward(),
            has_previous_page: self.has_more && self.kind.is_backward(),
        }
    }
}

/// Information about a page in a [`Connection`].
#[derive(Clone, Copy, Debug)]
pub struct PageInfo<C> {
    /// Cursor of the last [`Edge`] on the page.
    pub end_cursor: Option<C>,

    /// Indicator whether a forward page is followed by more nodes.
    pub has_next_page: bool,

    /// Indicator whether a backward page is preceded by more nodes.
    pub has_previous_page: bool,
}

/// Node with its cursor.
#[derive(Clone, Copy, Debug)]
pub struct Edge<C, I> {
    /// Cursor of this [`Edge`].
    pub cursor: C,

    /// Node of this [`Edge`].
    pub node: I,
}

impl<C, I> From<(C, I)> for Edge<C, I> {
    fn from((cursor, node): (C, I)) -> Self {
        Self { cursor, node }
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug)]
pub enum Arguments<C> {
    /// Forward pagination.
    Forward {
        /// Maximum number of nodes to select.
        first: usize,

        /// Cursor to select nodes after.
        after: Option<C>,

        /// Indicator whether the `after` cursor itself is selected too.
        including: bool,
    },

    /// Backward pagination.
    Backward {
        /// Maximum number of nodes to select.
        last: usize,

        /// Cursor to select nodes before.
        before: Option<C>,

        /// Indicator whether the `before` cursor itself is selected too.
        including: bool,
    },
}

impl<C> Arguments<C> {
    /// Resolves the provided raw pagination arguments.
    ///
    /// [`None`] is returned if the arguments are ambiguous, or any of the
    /// counts is negative.
    pub fn new<Num>(
        first: Option<Num>,
        after: Option<C>,
        last: Option<Num>,
        before: Option<C>,
        default: Num,
    ) -> Option<Self>
    where
        C: PartialEq + fmt::Debug,
        Num: TryInto<usize> + fmt::Debug,
    {
        let count = |n: Num| n.try_into().ok();

        Some(match (first, after, last, before) {
            (first, after, None, None) if first.is_some() || after.is_none() => {
                Self::Forward {
                    first: count(first.unwrap_or(default))?,
                    after,
                    including: false,
                }
            }
            (None, None, Some(last), before) => Self::Backward {
                last: count(last)?,
                before,
                including: false,
            },
            (first, Some(after), None, Some(before)) if after == before => {
                Self::Forward {
                    first: first.map_or(Some(1), count)?,
                    after: Some(after),
                    including: true,
                }
            }
            (None, Some(after), Some(last), Some(before)) if after == before => {
                Self::Backward {
                    last: count(last)?,
                    before: Some(before),
                    including: true,
                }
            }
            _ => return None,
        })
    }

    /// Returns the cursor these [`Arguments`] select nodes relatively to.
    #[must_use]
    pub fn cursor(&self) -> Option<&C> {
        match self {
            Self::Forward { after, .. } => after.as_ref(),
            Self::Backward { before, .. } => before.as_ref(),
        }
    }

    /// Returns [`Kind`] of pagination these [`Arguments`] request.
    pub fn kind(&self) -> Kind {
        match *self {
            Self::Forward { including: false, .. } => Kind::Forward,
            Self::Forward { including: true, .. } => Kind::ForwardIncluding,
            Self::Backward { including: false, .. } => Kind::Backward,
            Self::Backward { including: true, .. } => Kind::BackwardIncluding,
        }
    }

    /// Returns the maximum number of nodes these [`Arguments`] select.
    #[must_use]
    pub fn limit(&self) -> usize {
        match *self {
            Self::Forward { first, .. } => first,
            Self::Backward { last, .. } => last,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Copy, Debug)]
pub struct Selector<C, F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments<C>,

    /// Filter narrowing the paginated nodes.
    pub filter: F,
}

/// Kind of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Forward pagination.
    Forward,

    /// Forward pagination including the cursor.
    ForwardIncluding,

    /// Backward pagination.
    Backward,

    /// Backward pagination including the cursor.
    BackwardIncluding,
}

impl Kind {
    /// Returns whether this [`Kind`] is forward.
    #[must_use]
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward | Self::ForwardIncluding)
    }

    /// Returns whether this [`Kind`] is backward.
    #[must_use]
    pub fn is_backward(&self) -> bool {
        !self.is_forward()
    }

    /// Returns the operator comparing a node with the cursor.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Forward => ">",
            Self::ForwardIncluding => ">=",
            Self::Backward => "<",
            Self::BackwardIncluding => "<=",
        }
    }

    /// Returns [`Order`] nodes are selected in.
    #[must_use]
    pub const fn order(&self) -> Order {
        match self {
            Self::Forward | Self::ForwardIncluding => Order::Ascending,
            Self::Backward | Self::BackwardIncluding => Order::Descending,
        }
    }
}

/// Order of pagination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Order {
    /// Ascending order.
    Ascending,

    /// Descending order.
    Descending,
}

impl Order {
    /// Returns SQL keyword of this [`Order`].
    #[cfg(feature = "postgres")]
    #[must_use]
    pub const fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Defines pagination types of a list.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($cursor:ty, $node:ty, $filter:ty) => {
        #[doc = "Edge of a [`Connection`]."]
        pub type Edge = $crate::pagination::Edge<$cursor, $node>;

        #[doc = "A [`Connection`] of [`$node`]s."]
        pub type Connection = $crate::pagination::Connection<$cursor, $node>;

        #[doc = "A [`Page`] of [`$node`]s."]
        pub type Page = $crate::pagination::Page<$cursor, $node>;

        #[doc = "An information about a [`Page`]."]
        pub type PageInfo = $crate::pagination::PageInfo<$cursor>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments<$cursor>;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$cursor, $filter>;
    };
}

#[cfg(test)]
mod tests {
    use super::{Arguments, Connection, Kind};

    type Args = Arguments<u32>;

    #[test]
    fn defaults_to_forward_page() {
        let args = Args::new(None, None, None, None, 20).unwrap();

        assert_eq!(args.kind(), Kind::Forward);
        assert_eq!(args.limit(), 20);
        assert_eq!(args.cursor(), None);
    }

    #[test]
    fn resolves_forward_and_backward() {
        let args = Args::new(Some(5), Some(7), None, None, 20).unwrap();
        assert_eq!(args.kind(), Kind::Forward);
        assert_eq!(args.limit(), 5);
        assert_eq!(args.cursor(), Some(&7));

        let args = Args::new(None, None, Some(3), Some(9), 20).unwrap();
        assert_eq!(args.kind(), Kind::Backward);
        assert_eq!(args.limit(), 3);
        assert_eq!(args.cursor(), Some(&9));
    }

    #[test]
    fn includes_cursor_given_twice() {
        let args = Args::new(None, Some(4), None, Some(4), 20).unwrap();
        assert_eq!(args.kind(), Kind::ForwardIncluding);
        assert_eq!(args.limit(), 1);

        let args = Args::new(None, Some(4), Some(2), Some(4), 20).unwrap();
        assert_eq!(args.kind(), Kind::BackwardIncluding);
        assert_eq!(args.limit(), 2);
    }

    #[test]
    fn rejects_ambiguous_arguments() {
        assert!(Args::new(Some(1), None, Some(1), None, 20).is_none());
        assert!(Args::new(None, Some(1), None, None, 20).is_none());
        assert!(Args::new(None, Some(1), None, Some(2), 20).is_none());
        assert!(Args::new(Some(-1), None, None, None, 20).is_none());
    }

    #[test]
    fn reports_more_pages_in_direction() {
        let forward = Args::new(Some(2), None, None, None, 20).unwrap();
        let page = Connection::<u32, u32>::new(&forward, [(1, 1), (2, 2)], true);
        let info = page.page_info();
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);
        assert_eq!(info.end_cursor, Some(2));

        let backward = Args::new(None, None, Some(2), None, 20).unwrap();
        let page = Connection::<u32, u32>::new(&backward, [(9, 9)], true);
        let info = page.page_info();
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }
}
