use crate::catalogue::Narrative;

/// Position within a chapter's story pages. Moves are clamped at both ends.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeCursor<'a> {
    narrative: &'a Narrative,
    index: usize,
}

impl<'a> NarrativeCursor<'a> {
    pub fn new(narrative: &'a Narrative) -> Self {
        Self {
            narrative,
            index: 0,
        }
    }

    /// Open at `index`, clamped to the last page.
    pub fn at(narrative: &'a Narrative, index: usize) -> Self {
        let last = narrative.pages.len().saturating_sub(1);
        Self {
            narrative,
            index: index.min(last),
        }
    }

    pub fn title(&self) -> &'a str {
        &self.narrative.title
    }

    pub fn page(&self) -> &'a str {
        self.narrative
            .pages
            .get(self.index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.narrative.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.narrative.pages.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len()
    }

    /// Returns false when already on the last page.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }
}
