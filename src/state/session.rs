use chrono::{DateTime, Utc};
use super::data::{Annotation, AnnotationMap, Quality};

/// Position of the current image, 1-based for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl Progress {
    /// Text shown next to the progress bar, e.g. "1 / 3"
    pub fn label(&self) -> String {
        format!("{} / {}", self.position, self.total)
    }

    /// Percentage in 0.0..=100.0
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.position as f32 / self.total as f32 * 100.0
    }
}

/// Result of a successful `mark`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marked {
    /// Path that was annotated
    pub path: String,
    pub quality: Quality,
    /// Session epoch the mark belongs to (for the delayed auto-advance)
    pub epoch: u64,
    /// False when the mark was made on the last image
    pub advance: bool,
}

/// The labeling session: one loaded folder's images and annotations.
///
/// All mutation goes through methods here so the UI shell never touches
/// the list, the index or the map directly.
#[derive(Debug, Default)]
pub struct Session {
    images: Vec<String>,
    current: usize,
    annotations: AnnotationMap,
    /// Bumped on every load so timers from an older session can be dropped
    epoch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the image list, rewind to the first image and forget all annotations
    pub fn load(&mut self, images: Vec<String>) {
        self.images = images;
        self.current = 0;
        self.annotations.clear();
        self.epoch += 1;
    }

    /// A session is active once a non-empty list is loaded
    pub fn is_active(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current index, `None` while inactive
    pub fn index(&self) -> Option<usize> {
        self.is_active().then_some(self.current)
    }

    pub fn current_path(&self) -> Option<&str> {
        self.images.get(self.current).map(String::as_str)
    }

    pub fn current_annotation(&self) -> Option<&Annotation> {
        self.current_path().and_then(|path| self.annotations.get(path))
    }

    pub fn annotations(&self) -> &AnnotationMap {
        &self.annotations
    }

    pub fn progress(&self) -> Option<Progress> {
        self.is_active().then(|| Progress {
            position: self.current + 1,
            total: self.images.len(),
        })
    }

    fn is_last(&self) -> bool {
        self.current + 1 >= self.images.len()
    }

    /// Step forward. Returns false (and does nothing) on the last image.
    pub fn next(&mut self) -> bool {
        if !self.is_active() || self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Step back. Returns false (and does nothing) on the first image.
    pub fn previous(&mut self) -> bool {
        if !self.is_active() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Annotate the current image with the current time
    pub fn mark(&mut self, quality: Quality) -> Option<Marked> {
        self.mark_at(quality, Utc::now())
    }

    /// Annotate the current image, overwriting any earlier label for it
    pub fn mark_at(&mut self, quality: Quality, now: DateTime<Utc>) -> Option<Marked> {
        let path = self.current_path()?.to_string();

        self.annotations
            .insert(path.clone(), Annotation::new(quality, now));

        Some(Marked {
            path,
            quality,
            epoch: self.epoch,
            advance: !self.is_last(),
        })
    }

    /// Delayed step after a mark. Ignored if the folder was reloaded meanwhile.
    pub fn auto_advance(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::iso_timestamp;
    use chrono::TimeZone;

    fn abc() -> Session {
        let mut session = Session::new();
        session.load(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()]);
        session
    }

    #[test]
    fn test_load_starts_at_first_image() {
        let session = abc();

        assert_eq!(session.index(), Some(0));
        assert_eq!(session.current_path(), Some("a.jpg"));
        assert_eq!(session.progress().unwrap().label(), "1 / 3");
    }

    #[test]
    fn test_navigation_clamps_at_both_ends() {
        let mut session = abc();

        assert!(!session.previous());
        assert_eq!(session.index(), Some(0));

        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.index(), Some(2));

        // Any mix of moves keeps the index in range
        for step in 0..50 {
            if step % 3 == 0 {
                session.previous();
            } else {
                session.next();
            }
            let index = session.index().unwrap();
            assert!(index < session.len());
        }
    }

    #[test]
    fn test_mark_then_auto_advance() {
        let mut session = abc();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let marked = session.mark_at(Quality::Good, now).unwrap();

        assert_eq!(marked.path, "a.jpg");
        assert!(marked.advance);
        assert_eq!(session.annotations().len(), 1);
        assert_eq!(
            session.annotations()["a.jpg"],
            Annotation {
                quality: Quality::Good,
                timestamp: iso_timestamp(now),
            }
        );

        assert!(session.auto_advance(marked.epoch));
        assert_eq!(session.index(), Some(1));
    }

    #[test]
    fn test_mark_on_last_image_stays_put() {
        let mut session = abc();
        session.next();
        session.next();

        let marked = session.mark(Quality::Bad).unwrap();

        assert_eq!(marked.path, "c.jpg");
        assert!(!marked.advance);
        assert!(session.annotations().contains_key("c.jpg"));

        assert!(!session.auto_advance(marked.epoch));
        assert_eq!(session.index(), Some(2));
    }

    #[test]
    fn test_remark_overwrites() {
        let mut session = abc();
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 9).unwrap();

        session.mark_at(Quality::Good, first);
        session.mark_at(Quality::Bad, second);

        let annotation = session.current_annotation().unwrap();
        assert_eq!(annotation.quality, Quality::Bad);
        assert_eq!(annotation.timestamp, iso_timestamp(second));
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn test_mark_is_noop_when_inactive() {
        let mut session = Session::new();

        assert!(session.mark(Quality::Good).is_none());
        assert!(session.annotations().is_empty());
        assert!(!session.next());
        assert!(!session.previous());
    }

    #[test]
    fn test_reload_resets_index_and_annotations() {
        let mut session = abc();
        session.mark(Quality::Good);
        session.next();

        session.load(vec!["x.jpg".into(), "y.jpg".into()]);

        assert_eq!(session.index(), Some(0));
        assert!(session.annotations().is_empty());
        assert_eq!(session.progress().unwrap().label(), "1 / 2");
    }

    #[test]
    fn test_empty_load_deactivates() {
        let mut session = abc();

        session.load(Vec::new());

        assert!(!session.is_active());
        assert_eq!(session.index(), None);
        assert_eq!(session.progress(), None);
        assert!(!session.next());
    }

    #[test]
    fn test_stale_auto_advance_is_dropped() {
        let mut session = abc();
        let marked = session.mark(Quality::Good).unwrap();

        session.load(vec!["x.jpg".into(), "y.jpg".into()]);

        assert!(!session.auto_advance(marked.epoch));
        assert_eq!(session.index(), Some(0));
    }

    #[test]
    fn test_progress_percent() {
        let mut session = abc();
        session.next();

        let progress = session.progress().unwrap();
        assert_eq!(progress.position, 2);
        assert!((progress.percent() - 66.666_67).abs() < 0.01);
    }
}
