//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractProgressCallback>`] via
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to receive
//! events as the page loop advances. The callback approach keeps the
//! library ignorant of how the host communicates — forward events to a
//! terminal progress bar, a WebSocket, or a log sink as you see fit.
//!
//! Pages never hard-fail in this pipeline (failures degrade into inline
//! notes), so there is no per-page error event; `on_page_complete` reports
//! whether OCR ran and how many images were extracted instead.

use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// The page loop is strictly sequential, so events for page N+1 never
/// arrive before page N's `on_page_complete`. All methods have default
/// no-op implementations.
pub trait ExtractProgressCallback: Send + Sync {
    /// Called once, after the document has been opened and validated.
    fn on_extract_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page's direct text extraction begins.
    ///
    /// `page_num` is 1-indexed.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when the OCR engine is about to run on a page.
    fn on_page_ocr(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page finishes, with the final text length, whether
    /// OCR ran, and the number of images written.
    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        text_len: usize,
        ocr_applied: bool,
        images: usize,
    ) {
        let _ = (page_num, total_pages, text_len, ocr_applied, images);
    }

    /// Called once after the last page.
    fn on_extract_complete(&self, total_pages: usize, ocr_pages: usize, images: usize) {
        let _ = (total_pages, ocr_pages, images);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractConfig`].
pub type ProgressCallback = Arc<dyn ExtractProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        ocrs: AtomicUsize,
        completes: AtomicUsize,
        final_images: AtomicUsize,
    }

    impl ExtractProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page_num: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_page_ocr(&self, _page_num: usize, _total: usize) {
            self.ocrs.fetch_add(1, Ordering::SeqCst);
        }
        fn on_page_complete(
            &self,
            _page_num: usize,
            _total: usize,
            _text_len: usize,
            _ocr: bool,
            _images: usize,
        ) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_extract_complete(&self, _total: usize, _ocr_pages: usize, images: usize) {
            self.final_images.store(images, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extract_start(3);
        cb.on_page_start(1, 3);
        cb.on_page_ocr(1, 3);
        cb.on_page_complete(1, 3, 120, true, 2);
        cb.on_extract_complete(3, 1, 2);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = TrackingCallback {
            starts: AtomicUsize::new(0),
            ocrs: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            final_images: AtomicUsize::new(0),
        };
        t.on_extract_start(2);
        t.on_page_start(1, 2);
        t.on_page_ocr(1, 2);
        t.on_page_complete(1, 2, 10, true, 0);
        t.on_page_start(2, 2);
        t.on_page_complete(2, 2, 500, false, 3);
        t.on_extract_complete(2, 1, 3);

        assert_eq!(t.starts.load(Ordering::SeqCst), 2);
        assert_eq!(t.ocrs.load(Ordering::SeqCst), 1);
        assert_eq!(t.completes.load(Ordering::SeqCst), 2);
        assert_eq!(t.final_images.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_extract_start(10);
        cb.on_page_complete(1, 10, 0, false, 0);
    }
}
