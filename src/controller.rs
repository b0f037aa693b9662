use std::sync::Arc;

use crossterm::event::Event;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::JobSource;
use crate::error::FetchError;
use crate::models::JobPosting;
use crate::scroll::{ScrollMetrics, ScrollTrigger};
use crate::store::{Action, Store};

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum Message {
    Input(Event),
    PageLoaded {
        page: u32,
        result: Result<Vec<JobPosting>, FetchError>,
    },
}

/// Feeds events into the store and runs page fetches as background tasks.
/// Fetch results come back as `Message::PageLoaded` on the loop's channel,
/// so state is only ever touched from the loop.
pub struct Controller<S: JobSource> {
    store: Store,
    trigger: ScrollTrigger,
    source: Arc<S>,
    tx: UnboundedSender<Message>,
    fetch_task: Option<JoinHandle<()>>,
}

impl<S: JobSource> Controller<S> {
    pub fn new(source: S, threshold: u16, tx: UnboundedSender<Message>) -> Self {
        Self {
            store: Store::new(),
            trigger: ScrollTrigger::new(threshold),
            source: Arc::new(source),
            tx,
            fetch_task: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Loads the first page.
    pub fn start(&mut self) -> bool {
        self.request_next_page()
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        if self.trigger.on_scroll(metrics, self.store.is_loading()) {
            self.request_next_page()
        } else {
            false
        }
    }

    fn request_next_page(&mut self) -> bool {
        let page = self.store.next_page();
        if !self.store.reduce(Action::PageRequested(page)) {
            return false;
        }
        info!(page, "requesting job page");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch_page(page).await;
            // Receiver is gone once the loop has shut down.
            let _ = tx.send(Message::PageLoaded { page, result });
        }));
        true
    }

    pub fn page_loaded(&mut self, page: u32, result: Result<Vec<JobPosting>, FetchError>) {
        let action = match result {
            Ok(jobs) => Action::PageSucceeded { page, jobs },
            Err(e) => {
                warn!(page, error = %e, "job page fetch failed");
                Action::PageFailed { page }
            }
        };
        if self.store.reduce(action) {
            self.fetch_task = None;
        }
    }

    pub fn toggle_bookmark(&mut self, job: JobPosting) {
        self.store.reduce(Action::BookmarkToggled(job));
    }

    pub fn toggle_tab(&mut self) {
        self.store.reduce(Action::TabToggled);
    }

    /// Tears the view down: no more scroll triggers, the pending fetch is
    /// aborted, and any result that still arrives is ignored.
    pub fn dispose(&mut self) {
        self.trigger.detach();
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        self.store.reduce(Action::Disposed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobId, RawJobRecord};
    use crate::store::FetchStatus;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    enum Reply {
        Jobs(Vec<JobPosting>),
        Fail,
        Hang,
    }

    struct ScriptedSource {
        replies: Mutex<VecDeque<Reply>>,
        requested: Arc<Mutex<Vec<u32>>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Reply>) -> (Self, Arc<Mutex<Vec<u32>>>) {
            let requested = Arc::new(Mutex::new(Vec::new()));
            let source = Self {
                replies: Mutex::new(replies.into()),
                requested: Arc::clone(&requested),
            };
            (source, requested)
        }
    }

    impl JobSource for ScriptedSource {
        async fn fetch_page(&self, page: u32) -> Result<Vec<JobPosting>, FetchError> {
            self.requested.lock().unwrap().push(page);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Jobs(jobs)) => Ok(jobs),
                Some(Reply::Hang) => std::future::pending().await,
                Some(Reply::Fail) | None => {
                    Err(FetchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        }
    }

    fn jobs(start: i64, count: i64) -> Vec<JobPosting> {
        (start..start + count)
            .map(|id| {
                JobPosting::from(RawJobRecord {
                    id: Some(JobId::Int(id)),
                    ..Default::default()
                })
            })
            .collect()
    }

    fn bottom() -> ScrollMetrics {
        ScrollMetrics {
            viewport_height: 40,
            scroll_top: 200,
            content_height: 240,
        }
    }

    async fn deliver(controller: &mut Controller<ScriptedSource>, rx: &mut UnboundedReceiver<Message>) {
        match rx.recv().await {
            Some(Message::PageLoaded { page, result }) => controller.page_loaded(page, result),
            other => panic!("expected PageLoaded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_loads_first_page() {
        let (source, requested) = ScriptedSource::new(vec![Reply::Jobs(jobs(0, 5))]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = Controller::new(source, 100, tx);

        assert!(controller.start());
        assert_eq!(controller.store().status(), FetchStatus::Loading);

        deliver(&mut controller, &mut rx).await;
        assert_eq!(controller.store().status(), FetchStatus::Success);
        assert_eq!(controller.store().jobs().len(), 5);
        assert_eq!(controller.store().next_page(), 2);
        assert_eq!(*requested.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_scroll_guard_while_loading() {
        let (source, requested) =
            ScriptedSource::new(vec![Reply::Jobs(jobs(0, 5)), Reply::Jobs(jobs(5, 5))]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = Controller::new(source, 100, tx);

        controller.start();
        for _ in 0..10 {
            assert!(!controller.on_scroll(bottom()));
        }
        deliver(&mut controller, &mut rx).await;

        assert!(controller.on_scroll(bottom()));
        assert!(!controller.on_scroll(bottom()));
        deliver(&mut controller, &mut rx).await;

        assert_eq!(*requested.lock().unwrap(), vec![1, 2]);
        assert_eq!(controller.store().jobs().len(), 10);
        assert_eq!(controller.store().next_page(), 3);
    }

    #[tokio::test]
    async fn test_scroll_above_threshold_does_nothing() {
        let (source, requested) = ScriptedSource::new(vec![Reply::Jobs(jobs(0, 5))]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = Controller::new(source, 10, tx);
        controller.start();
        deliver(&mut controller, &mut rx).await;

        let top = ScrollMetrics {
            viewport_height: 40,
            scroll_top: 0,
            content_height: 500,
        };
        assert!(!controller.on_scroll(top));
        assert_eq!(requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_then_retry_same_page() {
        let (source, requested) = ScriptedSource::new(vec![
            Reply::Jobs(jobs(0, 3)),
            Reply::Fail,
            Reply::Jobs(jobs(3, 3)),
        ]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = Controller::new(source, 100, tx);

        controller.start();
        deliver(&mut controller, &mut rx).await;

        assert!(controller.on_scroll(bottom()));
        deliver(&mut controller, &mut rx).await;
        assert_eq!(controller.store().status(), FetchStatus::Failure);
        assert!(!controller.store().is_loading());
        assert_eq!(controller.store().jobs().len(), 3);

        assert!(controller.on_scroll(bottom()));
        deliver(&mut controller, &mut rx).await;
        assert_eq!(controller.store().status(), FetchStatus::Success);
        assert_eq!(controller.store().jobs().len(), 6);
        assert_eq!(*requested.lock().unwrap(), vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_dispose_stops_pagination_and_drops_results() {
        let (source, _requested) = ScriptedSource::new(vec![Reply::Hang]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut controller = Controller::new(source, 100, tx);

        controller.start();
        controller.dispose();
        assert!(controller.store().is_disposed());
        assert!(!controller.on_scroll(bottom()));

        controller.page_loaded(1, Ok(jobs(0, 5)));
        assert!(controller.store().jobs().is_empty());
    }

    #[tokio::test]
    async fn test_bookmark_and_tab_do_not_fetch() {
        let (source, requested) = ScriptedSource::new(vec![Reply::Jobs(jobs(0, 2))]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = Controller::new(source, 100, tx);
        controller.start();
        deliver(&mut controller, &mut rx).await;

        let job = controller.store().jobs()[0].clone();
        controller.toggle_bookmark(job.clone());
        controller.toggle_tab();
        assert!(controller.store().is_bookmarked(&job));
        assert_eq!(controller.store().active_list().items().len(), 1);
        assert_eq!(requested.lock().unwrap().len(), 1);
    }
}
