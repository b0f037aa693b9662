use crate::models::JobPosting;

pub const EMPTY_BOOKMARKS_MESSAGE: &str = "No bookmarks added yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Jobs,
    Bookmarks,
}

impl Tab {
    pub fn toggled(self) -> Self {
        match self {
            Tab::Jobs => Tab::Bookmarks,
            Tab::Bookmarks => Tab::Jobs,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Jobs => "Jobs",
            Tab::Bookmarks => "Bookmarks",
        }
    }
}

/// What the list area should show for the active tab.
#[derive(Debug, PartialEq)]
pub enum ActiveList<'a> {
    Items(&'a [JobPosting]),
    /// Bookmarks tab with nothing bookmarked.
    NoBookmarks,
}

impl<'a> ActiveList<'a> {
    pub fn items(&self) -> &'a [JobPosting] {
        match *self {
            ActiveList::Items(items) => items,
            ActiveList::NoBookmarks => &[],
        }
    }
}

pub fn active_list<'a>(
    tab: Tab,
    all_jobs: &'a [JobPosting],
    bookmarks: &'a [JobPosting],
) -> ActiveList<'a> {
    match tab {
        Tab::Jobs => ActiveList::Items(all_jobs),
        Tab::Bookmarks if bookmarks.is_empty() => ActiveList::NoBookmarks,
        Tab::Bookmarks => ActiveList::Items(bookmarks),
    }
}

pub fn bookmark_label(is_bookmarked: bool) -> &'static str {
    if is_bookmarked {
        "Remove Bookmark"
    } else {
        "Add Bookmark"
    }
}
