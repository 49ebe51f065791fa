use crate::crawlers::ScanEvent;

// Define a base trait for page sources
pub trait Crawler {
    /// Walk the source and hand every event to `emit` in discovery order.
    ///
    /// Stops early once `emit` returns false.
    fn crawl(&self, emit: &mut dyn FnMut(ScanEvent) -> bool);
}
