//! Per-element enhancement state machine.

use std::collections::{BTreeMap, HashMap};

use folio_renderer::{Behavior, Enhancement, RenderedDocument, TargetId};

use crate::code::CodeWindow;
use crate::guard::MountGuard;
use crate::preview::{LinkMount, LinkPreview, PreviewData, PreviewFetchError, PreviewRequest};

/// Processing state of one (element, behavior) pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ElementState {
    #[default]
    Unprocessed,
    /// Terminal until teardown.
    Processed,
}

/// Overlay zoom controller for content images.
pub trait ZoomController {
    fn attach(&mut self, target: TargetId, src: &str);
    fn detach(&mut self, target: TargetId);
}

/// What one [`Enhancer::enhance`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    pub zoom_attached: usize,
    pub links_mounted: usize,
    pub code_windows: usize,
    /// Entries already processed by an earlier call.
    pub skipped: usize,
}

impl EnhanceReport {
    /// Whether the call changed anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.zoom_attached == 0 && self.links_mounted == 0 && self.code_windows == 0
    }
}

/// Enhancement state for one mounted page view.
///
/// Each manifest entry is marked processed before its work runs, so
/// calling [`enhance`](Self::enhance) again with the same document is a
/// no-op.
#[derive(Debug, Default)]
pub struct Enhancer {
    states: HashMap<(TargetId, Behavior), ElementState>,
    zoomed: Vec<TargetId>,
    links: BTreeMap<TargetId, LinkMount>,
    code_windows: BTreeMap<TargetId, CodeWindow>,
    guard: MountGuard,
}

impl Enhancer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, target: TargetId, behavior: Behavior) -> ElementState {
        self.states
            .get(&(target, behavior))
            .copied()
            .unwrap_or_default()
    }

    /// Process every unprocessed entry of the document's manifest.
    pub fn enhance(
        &mut self,
        doc: &RenderedDocument,
        zoom: &mut dyn ZoomController,
    ) -> EnhanceReport {
        if !self.guard.is_mounted() {
            self.guard = MountGuard::new();
        }

        let mut report = EnhanceReport::default();
        for enhancement in &doc.enhancements {
            let slot = (enhancement.target(), enhancement.behavior());
            if self.states.get(&slot) == Some(&ElementState::Processed) {
                report.skipped += 1;
                continue;
            }
            self.states.insert(slot, ElementState::Processed);

            match enhancement {
                Enhancement::Zoom { target, src, .. } => {
                    zoom.attach(*target, src);
                    self.zoomed.push(*target);
                    report.zoom_attached += 1;
                }
                Enhancement::LinkPreview {
                    target,
                    href,
                    inner_html,
                    class,
                } => {
                    let mount = LinkMount::for_anchor(*target, href, inner_html, class, &self.guard);
                    self.links.insert(*target, mount);
                    report.links_mounted += 1;
                }
                Enhancement::CodeWindow {
                    target,
                    language,
                    raw,
                } => {
                    self.code_windows.insert(
                        *target,
                        CodeWindow::new(*target, language.clone(), raw.clone()),
                    );
                    report.code_windows += 1;
                }
            }
        }

        tracing::debug!(
            zoom = report.zoom_attached,
            links = report.links_mounted,
            code = report.code_windows,
            skipped = report.skipped,
            "Enhanced document"
        );
        report
    }

    /// Mounted anchors, in document order.
    pub fn links(&self) -> impl Iterator<Item = &LinkMount> {
        self.links.values()
    }

    #[must_use]
    pub fn link(&self, target: TargetId) -> Option<&LinkMount> {
        self.links.get(&target)
    }

    pub fn link_mut(&mut self, target: TargetId) -> Option<&mut LinkMount> {
        self.links.get_mut(&target)
    }

    /// Hover over a mounted external anchor.
    pub fn hover(&mut self, target: TargetId) -> Option<PreviewRequest> {
        self.links
            .get_mut(&target)
            .and_then(LinkMount::as_preview_mut)
            .and_then(LinkPreview::hover)
    }

    /// Deliver a preview fetch result. Returns `false` if it was stale.
    pub fn complete(
        &mut self,
        request: &PreviewRequest,
        result: Result<PreviewData, PreviewFetchError>,
    ) -> bool {
        match self
            .links
            .get_mut(&request.target)
            .and_then(LinkMount::as_preview_mut)
        {
            Some(preview) => preview.complete(request, result),
            None => {
                tracing::debug!(key = %request.target, "Preview result for unmounted link");
                false
            }
        }
    }

    /// Decorated code blocks, in document order.
    pub fn code_windows(&self) -> impl Iterator<Item = &CodeWindow> {
        self.code_windows.values()
    }

    #[must_use]
    pub fn code_window(&self, target: TargetId) -> Option<&CodeWindow> {
        self.code_windows.get(&target)
    }

    pub fn code_window_mut(&mut self, target: TargetId) -> Option<&mut CodeWindow> {
        self.code_windows.get_mut(&target)
    }

    /// Images currently attached to the zoom controller.
    #[must_use]
    pub fn zoomed(&self) -> &[TargetId] {
        &self.zoomed
    }

    /// Unmount: detach every zoomed image, invalidate in-flight previews
    /// and reset all elements to unprocessed.
    pub fn teardown(&mut self, zoom: &mut dyn ZoomController) {
        for target in self.zoomed.drain(..) {
            zoom.detach(target);
        }
        self.guard.unmount();
        self.states.clear();
        self.links.clear();
        self.code_windows.clear();
    }
}
