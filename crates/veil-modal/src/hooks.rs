//! Lifecycle hooks.
//!
//! `on_open` and `on_close` replace default behavior rather than decorating
//! it, so each is modeled as a behavior chosen once when the dialog opens:
//!
//! | Phase | Default | Delegated |
//! |-------|---------|-----------|
//! | open  | reveal backdrop, container, content | hook reveals what it wants |
//! | close | restore content, remove fragments | hook tears down, see [`CloseFlow`] |
//!
//! `on_show` runs after the open phase in both cases.

use veil_core::ConfigOverrides;

use crate::dialog::DialogState;

/// Hook invoked with the dialog and the host document.
pub type Hook<D> = Box<dyn FnMut(&DialogState, &mut D)>;

/// Close hook; the returned [`CloseFlow`] says whether teardown finished.
pub type CloseHook<D> = Box<dyn FnMut(&DialogState, &mut D) -> CloseFlow>;

/// How the open phase reveals the dialog.
pub enum OpenBehavior<D> {
    /// Show backdrop, container, and content, in that order.
    Reveal,
    /// Hand the hidden fragments to a hook. The blocking frame is shown
    /// before the hook runs.
    Delegate(Hook<D>),
}

/// How `close` tears the dialog down.
pub enum CloseBehavior<D> {
    /// Restore page content and remove fragments.
    Restore,
    /// Hand teardown to a hook. The hook fires at most once per dialog.
    Delegate(CloseHook<D>),
}

/// Result of a delegated close hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseFlow {
    /// The hook removed the fragments and restored the page itself (for
    /// example via [`DialogState::dismantle`]). The controller only forgets
    /// the dialog.
    Complete,
    /// The hook started a deferred teardown (an exit animation, a
    /// confirmation). The dialog stays active; the next `close` call runs
    /// the default restoration.
    Pending,
}

/// Per-dialog options: config overrides plus lifecycle hooks.
pub struct ModalOptions<D> {
    pub(crate) overrides: ConfigOverrides,
    pub(crate) open: OpenBehavior<D>,
    pub(crate) show: Option<Hook<D>>,
    pub(crate) close: CloseBehavior<D>,
}

impl<D> Default for ModalOptions<D> {
    fn default() -> Self {
        Self {
            overrides: ConfigOverrides::default(),
            open: OpenBehavior::Reveal,
            show: None,
            close: CloseBehavior::Restore,
        }
    }
}

impl<D> ModalOptions<D> {
    /// Defaults with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Replace the default reveal.
    #[must_use]
    pub fn on_open(mut self, hook: impl FnMut(&DialogState, &mut D) + 'static) -> Self {
        self.open = OpenBehavior::Delegate(Box::new(hook));
        self
    }

    /// Run after the dialog is open.
    #[must_use]
    pub fn on_show(mut self, hook: impl FnMut(&DialogState, &mut D) + 'static) -> Self {
        self.show = Some(Box::new(hook));
        self
    }

    /// Replace the default teardown.
    #[must_use]
    pub fn on_close(
        mut self,
        hook: impl FnMut(&DialogState, &mut D) -> CloseFlow + 'static,
    ) -> Self {
        self.close = CloseBehavior::Delegate(Box::new(hook));
        self
    }
}
