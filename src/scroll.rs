use tracing::debug;

pub const DEFAULT_THRESHOLD: u16 = 100;

/// Scroll position of the job list, in terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub viewport_height: u32,
    pub scroll_top: u32,
    pub content_height: u32,
}

impl ScrollMetrics {
    /// True once the bottom of the viewport is within `threshold` rows of the
    /// end of the content.
    pub fn near_bottom(&self, threshold: u32) -> bool {
        let seen = self.viewport_height as u64 + self.scroll_top as u64 + threshold as u64;
        seen >= self.content_height as u64
    }
}

/// Decides whether a scroll event should advance pagination. Holds no
/// pagination state of its own; the caller supplies the loading flag.
#[derive(Debug)]
pub struct ScrollTrigger {
    threshold: u32,
    attached: bool,
}

impl ScrollTrigger {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold: threshold as u32,
            attached: true,
        }
    }

    pub fn on_scroll(&self, metrics: ScrollMetrics, loading: bool) -> bool {
        if !self.attached || loading {
            return false;
        }
        let fire = metrics.near_bottom(self.threshold);
        if fire {
            debug!(?metrics, threshold = self.threshold, "scroll crossed pagination threshold");
        }
        fire
    }

    /// Stops the trigger from ever firing again.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
