//! Scroll-depth milestones and CTA section lookup.

/// Sections CTA clicks are attributed to, in lookup order.
pub const PAGE_SECTIONS: [&str; 6] = ["hero", "features", "solutions", "pricing", "about", "contact"];

const MILESTONES: [u32; 4] = [25, 50, 75, 100];

/// Tracks the deepest scroll position seen on a page.
#[derive(Debug, Clone, Default)]
pub struct ScrollDepthTracker {
    max_percent: u32,
}

impl ScrollDepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_percent(&self) -> u32 {
        self.max_percent
    }

    /// Records a scroll position and returns the milestones crossed for the first time.
    ///
    /// A page shorter than the viewport counts as fully scrolled.
    pub fn observe(&mut self, scroll_y: f64, document_height: f64, viewport_height: f64) -> Vec<u32> {
        let scrollable = document_height - viewport_height;
        let percent = if scrollable <= 0.0 {
            100
        } else {
            ((scroll_y / scrollable) * 100.0).round().clamp(0.0, 100.0) as u32
        };

        if percent <= self.max_percent {
            return Vec::new();
        }

        let previous = self.max_percent;
        self.max_percent = percent;
        MILESTONES
            .iter()
            .copied()
            .filter(|m| *m > previous && *m <= percent)
            .collect()
    }
}

/// First page section among an element's ancestor ids/classes, or `"unknown"`.
pub fn section_for<'a, I>(ancestors: I) -> &'static str
where
    I: IntoIterator<Item = &'a str>,
{
    let ancestors: Vec<&str> = ancestors.into_iter().collect();
    PAGE_SECTIONS
        .iter()
        .find(|section| ancestors.contains(*section))
        .copied()
        .unwrap_or("unknown")
}
