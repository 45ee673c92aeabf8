//! One exchange, step by step
//!
//! [`Panel`] owns the session, the refresh queue and the rendering settings.
//! An exchange driver calls, in order: [`Panel::prepare_request`], the
//! network, [`Panel::swap_response`], [`Panel::take_refreshes`] and
//! [`Panel::on_request_complete`]. Refresh entries are then run as exchanges
//! of their own.

use crate::config::PanelSettings;
use crate::hooks::{self, CompletionOutcome};
use crate::page::{Page, SwapTarget};
use crate::refresh::{RefreshEntry, RefreshQueue};
use crate::render::{self, Effect, Localizer, SwapDecision, TransportResponse};
use crate::request::{self, PreparedRequest, RequestDescriptor};
use crate::session::SessionContext;
use crate::store::KeyValueStore;
use crate::PanelResult;
use std::time::Duration;

/// Client-side pipeline bound to one session
#[derive(Debug)]
pub struct Panel<S: KeyValueStore> {
    session: SessionContext<S>,
    refresh: RefreshQueue,
    localizer: Localizer,
    redirect_delay: Duration,
}

impl<S: KeyValueStore> Panel<S> {
    pub fn new(store: S, settings: &PanelSettings) -> Self {
        Self::with_session(SessionContext::new(store, settings), settings)
    }

    pub fn with_session(session: SessionContext<S>, settings: &PanelSettings) -> Self {
        Self {
            session,
            refresh: RefreshQueue::new(),
            localizer: Localizer::system(),
            redirect_delay: settings.redirect_delay(),
        }
    }

    /// Override the timezone used for rendered timestamps
    #[must_use]
    pub fn with_localizer(mut self, localizer: Localizer) -> Self {
        self.localizer = localizer;
        self
    }

    pub fn session(&self) -> &SessionContext<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext<S> {
        &mut self.session
    }

    /// # Errors
    ///
    /// Returns an error if a credential cannot be encoded as a header value
    pub fn prepare_request(&self, descriptor: RequestDescriptor) -> PanelResult<PreparedRequest> {
        request::prepare_request(&self.session, descriptor)
    }

    /// Decide what `response` turns into for `target` and apply the renderer's
    /// page effects
    ///
    /// The returned decision still has to be swapped in; see
    /// [`Panel::swap_response`] for the complete step.
    pub fn render_response(
        &mut self,
        response: &TransportResponse,
        target: &SwapTarget,
        page: &mut dyn Page,
    ) -> SwapDecision {
        let mut decision = render::render_response(
            response,
            target,
            &*page,
            self.localizer,
            self.redirect_delay,
        );

        if let SwapDecision::Render(rendered) = &mut decision {
            for effect in std::mem::take(&mut rendered.effects) {
                self.apply(effect, target, page);
            }
        }

        decision
    }

    /// Render `response` into the element matched by `selector`
    ///
    /// Returns whether anything was swapped. A missing element swaps nothing.
    pub fn swap_response(
        &mut self,
        selector: &str,
        response: &TransportResponse,
        page: &mut dyn Page,
    ) -> bool {
        let Some(target) = page.element(selector) else {
            tracing::debug!(selector, "Swap target not on the page");
            return false;
        };

        let decision = self.render_response(response, &target, page);
        match decision.content(response) {
            Some(html) => page.swap(selector, html),
            None => {
                tracing::debug!(selector, status = response.status, "Swap suppressed");
                false
            }
        }
    }

    /// Refreshes queued so far whose element is still on the page
    pub fn take_refreshes(&mut self, page: &dyn Page) -> Vec<RefreshEntry> {
        self.refresh.drain_ready(page)
    }

    pub fn pending_refreshes(&self) -> usize {
        self.refresh.len()
    }

    /// # Errors
    ///
    /// Returns an error if the session store rejects the update
    pub fn on_request_complete(
        &mut self,
        path: &str,
        response: &TransportResponse,
        page: &mut dyn Page,
    ) -> PanelResult<CompletionOutcome> {
        hooks::on_request_complete(&mut self.session, path, response, page)
    }

    /// Handle a click on the logout control
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed from the store
    pub fn logout(&mut self, page: &mut dyn Page) -> PanelResult<()> {
        Ok(self.session.logout(page)?)
    }

    fn apply(&mut self, effect: Effect, target: &SwapTarget, page: &mut dyn Page) {
        match effect {
            Effect::EnqueueRefresh(entry) => self.refresh.enqueue(entry),
            Effect::ResetEnclosingForm => page.reset_enclosing_form(target),
            Effect::Navigate { url, delay } => page.navigate(&url, delay),
            Effect::SetField { form, name, value } => page.set_field(&form, &name, &value),
            Effect::HideTarget => page.hide(target),
        }
    }
}
