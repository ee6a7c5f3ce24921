//! Editor state: the single owner of the live presentation.
//!
//! An explicit application-state struct, passed by reference from the
//! top-level controller and mutated only through the operations below.
//! Every mutating operation pushes exactly one history record before the
//! next mutation is accepted, so history granularity is one user-visible
//! action, and schedules a debounced re-synthesis notification.

use std::time::Instant;

use deck_core::text;
use deck_core::types::{Background, Presentation, Slide, SlideElement};
use deck_html::{HtmlImporter, HtmlSynthesizer};

use crate::history::History;
use crate::resynth::ResynthDebounce;

/// Live editing state around a single presentation.
pub struct EditorState {
    presentation: Presentation,
    current_slide: usize,
    history: History,
    resynth: ResynthDebounce,
}

impl EditorState {
    /// Wrap a presentation, recording it as the initial history snapshot.
    pub fn new(presentation: Presentation) -> Self {
        let mut history = History::new();
        history.record(&presentation);
        Self {
            presentation,
            current_slide: 0,
            history,
            resynth: ResynthDebounce::new(),
        }
    }

    /// Import an HTML document and start editing it.
    pub fn import_html(html: &str, title: &str) -> Self {
        Self::new(HtmlImporter::new().import(html, title))
    }

    /// Replace the live presentation, resetting history to the new state.
    pub fn load(&mut self, presentation: Presentation) {
        self.presentation = presentation;
        self.current_slide = 0;
        self.history.clear();
        self.history.record(&self.presentation);
        self.resynth.schedule(Instant::now());
    }

    /// The live presentation.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Index of the selected slide.
    pub fn current_slide(&self) -> usize {
        self.current_slide
    }

    /// The history engine (read-only).
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Change the selection. View state only, so no history record.
    pub fn select_slide(&mut self, index: usize) {
        self.current_slide = index.min(self.presentation.slide_count().saturating_sub(1));
    }

    /// Append a slide and select it; returns its index.
    pub fn add_slide(&mut self, title: Option<String>) -> usize {
        let title = title
            .unwrap_or_else(|| text::default_slide_title(self.presentation.slide_count() + 1));
        let index = self.presentation.add_slide(Slide::new(title));
        self.current_slide = index;
        self.committed();
        index
    }

    /// Delete the slide at `index`, clamping the selection.
    pub fn delete_slide(&mut self, index: usize) -> bool {
        if self.presentation.delete_slide(index).is_none() {
            return false;
        }
        self.clamp_selection();
        self.committed();
        true
    }

    /// Move a slide, keeping the selection on it.
    pub fn move_slide(&mut self, from: usize, to: usize) -> bool {
        if !self.presentation.move_slide(from, to) {
            return false;
        }
        if self.current_slide == from {
            self.current_slide = to;
        }
        self.clamp_selection();
        self.committed();
        true
    }

    /// Duplicate the slide at `index` and select the copy.
    pub fn duplicate_slide(&mut self, index: usize) -> Option<usize> {
        let at = self.presentation.duplicate_slide(index)?;
        self.current_slide = at;
        self.committed();
        Some(at)
    }

    /// Add an element to a slide; returns the element id.
    pub fn add_element(&mut self, slide_index: usize, element: SlideElement) -> Option<String> {
        let slide = self.presentation.slide_mut(slide_index)?;
        let id = slide.add_element(element);
        self.presentation.touch();
        self.committed();
        Some(id)
    }

    /// Apply an edit to one element. The position is re-clamped afterwards,
    /// so callers cannot push an element outside the slide area.
    pub fn update_element<F>(&mut self, slide_index: usize, element_id: &str, edit: F) -> bool
    where
        F: FnOnce(&mut SlideElement),
    {
        let element = match self
            .presentation
            .slide_mut(slide_index)
            .and_then(|s| s.element_mut(element_id))
        {
            Some(element) => element,
            None => return false,
        };

        edit(element);
        element.position.clamp();
        self.presentation.touch();
        self.committed();
        true
    }

    /// Remove an element from a slide.
    pub fn delete_element(&mut self, slide_index: usize, element_id: &str) -> bool {
        let removed = self
            .presentation
            .slide_mut(slide_index)
            .and_then(|s| s.remove_element(element_id));
        if removed.is_none() {
            return false;
        }
        self.presentation.touch();
        self.committed();
        true
    }

    /// Duplicate an element in place; returns the copy's id.
    pub fn duplicate_element(&mut self, slide_index: usize, element_id: &str) -> Option<String> {
        let copy_id = self
            .presentation
            .slide_mut(slide_index)?
            .duplicate_element(element_id)?;
        self.presentation.touch();
        self.committed();
        Some(copy_id)
    }

    /// Replace a slide's speaker notes.
    pub fn set_slide_notes(&mut self, slide_index: usize, notes: impl Into<String>) -> bool {
        match self.presentation.slide_mut(slide_index) {
            Some(slide) => {
                slide.set_notes(notes);
                self.presentation.touch();
                self.committed();
                true
            }
            None => false,
        }
    }

    /// Replace a slide's background descriptor.
    pub fn set_slide_background(
        &mut self,
        slide_index: usize,
        background: Option<Background>,
    ) -> bool {
        match self.presentation.slide_mut(slide_index) {
            Some(slide) => {
                slide.set_background(background);
                self.presentation.touch();
                self.committed();
                true
            }
            None => false,
        }
    }

    /// Apply a different theme to the whole presentation.
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.presentation.set_theme(theme);
        self.committed();
    }

    /// Rename the presentation.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.presentation.title = title.into();
        self.presentation.touch();
        self.committed();
    }

    /// Step back in history, swapping in the previous snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.presentation = snapshot;
                self.clamp_selection();
                self.resynth.schedule(Instant::now());
                true
            }
            None => false,
        }
    }

    /// Step forward in history, swapping in the next snapshot.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.presentation = snapshot;
                self.clamp_selection();
                self.resynth.schedule(Instant::now());
                true
            }
            None => false,
        }
    }

    /// True when an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// True when a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Synthesize the current state on demand.
    pub fn export_html(&self) -> String {
        HtmlSynthesizer::new().synthesize(&self.presentation)
    }

    /// Debounced export: yields the synthesized document once per burst of
    /// edits, after the trailing delay has elapsed. Intermediate states are
    /// never synthesized.
    pub fn poll_export(&mut self, now: Instant) -> Option<String> {
        if self.resynth.take_due(now) {
            Some(self.export_html())
        } else {
            None
        }
    }

    fn clamp_selection(&mut self) {
        self.current_slide = self
            .current_slide
            .min(self.presentation.slide_count().saturating_sub(1));
    }

    /// Seal a completed mutation: one history record, one scheduled
    /// re-synthesis.
    fn committed(&mut self) {
        self.history.record(&self.presentation);
        self.resynth.schedule(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::types::{ElementType, Position};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn editor_with(n: usize) -> EditorState {
        let mut editor = EditorState::new(Presentation::new("deck"));
        for _ in 0..n {
            editor.add_slide(None);
        }
        editor
    }

    #[test]
    fn test_each_operation_records_once() {
        let mut editor = editor_with(0);
        let before = editor.history().len();

        editor.add_slide(None);
        assert_eq!(editor.history().len(), before + 1);

        editor.duplicate_slide(0);
        assert_eq!(editor.history().len(), before + 2);

        editor.delete_slide(1);
        assert_eq!(editor.history().len(), before + 3);
    }

    #[test]
    fn test_delete_clamps_selection() {
        let mut editor = editor_with(3);
        editor.select_slide(2);

        assert!(editor.delete_slide(2));
        assert_eq!(editor.current_slide(), 1);

        let orders: Vec<usize> = editor.presentation().slides.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_delete_middle_slide_keeps_dense_order() {
        let mut editor = editor_with(3);
        assert!(editor.delete_slide(1));

        let orders: Vec<usize> = editor.presentation().slides.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_selection_follows_moved_slide() {
        let mut editor = editor_with(3);
        editor.select_slide(0);
        assert!(editor.move_slide(0, 2));
        assert_eq!(editor.current_slide(), 2);
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut editor = editor_with(1);
        let title_before = editor.presentation().slides[0].title.clone();

        editor.add_slide(Some("added".to_string()));
        assert_eq!(editor.presentation().slide_count(), 2);

        assert!(editor.undo());
        assert_eq!(editor.presentation().slide_count(), 1);
        assert_eq!(editor.presentation().slides[0].title, title_before);

        assert!(editor.redo());
        assert_eq!(editor.presentation().slide_count(), 2);
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut editor = editor_with(0);
        assert!(!editor.undo());
        assert!(!editor.redo());
    }

    #[test]
    fn test_element_lifecycle() {
        let mut editor = editor_with(1);
        let id = editor
            .add_element(
                0,
                SlideElement::new(ElementType::Paragraph, "text", Position::default()),
            )
            .unwrap();

        assert!(editor.update_element(0, &id, |e| {
            e.content = "edited".to_string();
            e.position = Position {
                x: 90.0,
                y: 90.0,
                width: 50.0,
                height: 50.0,
            };
        }));

        let element = editor.presentation().slides[0].element(&id).unwrap();
        assert_eq!(element.content, "edited");
        // clamped back inside the slide area
        assert!(element.position.x + element.position.width <= 100.0);
        assert!(element.position.y + element.position.height <= 100.0);

        let copy_id = editor.duplicate_element(0, &id).unwrap();
        assert_ne!(copy_id, id);
        assert!(editor.delete_element(0, &id));
        assert!(editor.presentation().slides[0].element(&id).is_none());
    }

    #[test]
    fn test_invalid_targets_do_not_record() {
        let mut editor = editor_with(1);
        let before = editor.history().len();

        assert!(editor
            .add_element(
                9,
                SlideElement::new(ElementType::Paragraph, "x", Position::default())
            )
            .is_none());
        assert!(!editor.update_element(0, "missing", |_| {}));
        assert!(!editor.delete_slide(9));

        assert_eq!(editor.history().len(), before);
    }

    #[test]
    fn test_redundant_save_is_deduplicated() {
        let mut editor = editor_with(1);
        let before = editor.history().len();

        editor.set_slide_notes(0, "same");
        editor.set_slide_notes(0, "same");

        assert_eq!(editor.history().len(), before + 1);
    }

    #[test]
    fn test_import_and_export_through_editor() {
        let editor = EditorState::import_html("<h1>A</h1><p>x</p>", "Imported");
        assert_eq!(editor.presentation().slide_count(), 1);

        let html = editor.export_html();
        assert!(html.contains("data-slide-id"));
        assert!(html.contains("data-element-type=\"heading\""));
    }

    #[test]
    fn test_poll_export_fires_once_per_burst() {
        let mut editor = editor_with(1);
        editor.set_slide_notes(0, "burst edit");

        let later = Instant::now() + Duration::from_secs(1);
        let html = editor.poll_export(later).expect("export should be due");
        assert!(html.contains("burst edit"));

        // consumed: nothing further to export until the next edit
        assert!(editor.poll_export(later + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_load_resets_history() {
        let mut editor = editor_with(3);
        assert!(editor.can_undo());

        editor.load(Presentation::new("fresh"));
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert_eq!(editor.presentation().title, "fresh");
        assert_eq!(editor.current_slide(), 0);
    }
}
