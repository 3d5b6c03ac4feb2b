use std::fmt::Display;

/// The screens that show a list of properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingView {
    /// The public search: available listings matching the filter, newest first.
    Public,
    /// Everything the signed-in user has listed, newest first.
    MyListings,
    /// The signed-in user's favorites, in no particular order.
    Liked,
    /// A few available listings for the landing page.
    Featured,
}

impl ListingView {
    /// Views that only make sense for a signed-in user.
    pub fn requires_session(self) -> bool {
        matches!(self, ListingView::MyListings | ListingView::Liked)
    }

    /// Whether the filter criteria take part in the query.
    pub fn uses_criteria(self) -> bool {
        self == ListingView::Public
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ListingView::Public => "public",
            ListingView::MyListings => "my_listings",
            ListingView::Liked => "liked",
            ListingView::Featured => "featured",
        }
    }
}

impl Display for ListingView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
