use tracing::{debug, info, warn};

use crate::bookmarks::BookmarkStore;
use crate::models::JobPosting;
use crate::view::{self, ActiveList, Tab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    NotStarted,
    Loading,
    Success,
    Failure,
}

#[derive(Debug)]
pub enum Action {
    PageRequested(u32),
    PageSucceeded { page: u32, jobs: Vec<JobPosting> },
    PageFailed { page: u32 },
    BookmarkToggled(JobPosting),
    TabToggled,
    Disposed,
}

/// All session state for the browser. Mutated only through `reduce`.
#[derive(Debug)]
pub struct Store {
    jobs: Vec<JobPosting>,
    bookmarks: BookmarkStore,
    status: FetchStatus,
    next_page: u32,
    last_loaded_page: Option<u32>,
    // Page currently being fetched; doubles as the loading flag.
    in_flight: Option<u32>,
    tab: Tab,
    disposed: bool,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            bookmarks: BookmarkStore::new(),
            status: FetchStatus::NotStarted,
            next_page: 1,
            last_loaded_page: None,
            in_flight: None,
            tab: Tab::Jobs,
            disposed: false,
        }
    }

    /// Applies an action. Returns false when the action was refused or
    /// ignored (page already in flight, stale result, store disposed).
    pub fn reduce(&mut self, action: Action) -> bool {
        if self.disposed {
            debug!(?action, "store disposed, ignoring action");
            return false;
        }

        match action {
            Action::PageRequested(page) => {
                if let Some(current) = self.in_flight {
                    debug!(page, current, "page request refused, fetch already in flight");
                    return false;
                }
                if page != self.next_page {
                    warn!(page, next = self.next_page, "page request out of sequence");
                    return false;
                }
                self.in_flight = Some(page);
                self.status = FetchStatus::Loading;
                true
            }

            Action::PageSucceeded { page, jobs } => {
                if self.in_flight != Some(page) {
                    warn!(page, in_flight = ?self.in_flight, "dropping stale page result");
                    return false;
                }
                info!(page, count = jobs.len(), "page loaded");
                self.jobs.extend(jobs);
                self.last_loaded_page = Some(page);
                self.next_page = page + 1;
                self.in_flight = None;
                self.status = FetchStatus::Success;
                true
            }

            Action::PageFailed { page } => {
                if self.in_flight != Some(page) {
                    warn!(page, in_flight = ?self.in_flight, "dropping stale page failure");
                    return false;
                }
                self.in_flight = None;
                self.status = FetchStatus::Failure;
                true
            }

            Action::BookmarkToggled(job) => {
                let marked = self.bookmarks.toggle(&job);
                debug!(id = ?job.id, marked, "bookmark toggled");
                true
            }

            Action::TabToggled => {
                self.tab = self.tab.toggled();
                true
            }

            Action::Disposed => {
                self.disposed = true;
                self.in_flight = None;
                true
            }
        }
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, job: &JobPosting) -> bool {
        self.bookmarks.is_bookmarked(job.id.as_ref())
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    /// The cursor: page to request next.
    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn last_loaded_page(&self) -> Option<u32> {
        self.last_loaded_page
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn active_list(&self) -> ActiveList<'_> {
        view::active_list(self.tab, &self.jobs, self.bookmarks.as_slice())
    }
}
