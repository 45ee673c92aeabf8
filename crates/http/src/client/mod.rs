//! Exchange driver
//!
//! Runs the pipeline around the network call. Exchanges are strictly
//! sequential: the refresh queue is only touched between awaits.

pub mod error;
pub mod transport;

pub use transport::{HttpTransport, HttpTransportBuilder, Transport};

use error::ClientError;
use pm_panel_core::{
    CompletionOutcome, KeyValueStore, Page, Panel, RefreshEntry, RequestDescriptor,
};
use std::collections::VecDeque;

/// A request issued by the page together with the element it swaps into
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub descriptor: RequestDescriptor,
    /// Selector of the swap target
    pub target: String,
}

impl ExchangeRequest {
    pub fn new(descriptor: RequestDescriptor, target: impl Into<String>) -> Self {
        Self {
            descriptor,
            target: target.into(),
        }
    }
}

/// What happened during an exchange and the refreshes it triggered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeReport {
    /// Status of the primary response
    pub status: u16,
    /// Whether the primary response was swapped into its target
    pub swapped: bool,
    /// Selectors reloaded after the primary swap, in order
    pub refreshed: Vec<String>,
    /// Refreshes skipped because their element had left the page
    pub dropped_refreshes: usize,
    /// Post-request hook outcome, accumulated over every request
    pub completion: CompletionOutcome,
}

struct Step {
    status: u16,
    swapped: bool,
    ready: Vec<RefreshEntry>,
    dropped: usize,
    completion: CompletionOutcome,
}

/// Drives exchanges for one session over a [`Transport`]
pub struct PanelClient<S: KeyValueStore, T: Transport> {
    panel: Panel<S>,
    transport: T,
}

impl<S: KeyValueStore, T: Transport> PanelClient<S, T> {
    pub fn new(panel: Panel<S>, transport: T) -> Self {
        Self { panel, transport }
    }

    pub fn panel(&self) -> &Panel<S> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel<S> {
        &mut self.panel
    }

    pub fn into_panel(self) -> Panel<S> {
        self.panel
    }

    /// Run `request` against `page`, then every refresh it queued
    ///
    /// Refreshes run after the primary exchange's hooks, first in first out;
    /// a refresh may queue further refreshes, which join the end of the line.
    ///
    /// # Errors
    ///
    /// Returns an error if a request cannot be prepared or sent, or if the
    /// session store rejects an update. Refreshes still pending are discarded.
    pub async fn exchange(
        &mut self,
        page: &mut dyn Page,
        request: ExchangeRequest,
    ) -> Result<ExchangeReport, ClientError> {
        let primary = self.step(page, request.descriptor, &request.target).await?;

        let mut report = ExchangeReport {
            status: primary.status,
            swapped: primary.swapped,
            refreshed: Vec::new(),
            dropped_refreshes: primary.dropped,
            completion: primary.completion,
        };

        let mut pending: VecDeque<RefreshEntry> = primary.ready.into();
        while let Some(entry) = pending.pop_front() {
            if page.element(&entry.selector).is_none() {
                report.dropped_refreshes += 1;
                continue;
            }

            tracing::debug!(selector = %entry.selector, endpoint = %entry.endpoint, "Refreshing");
            let step = self
                .step(page, RequestDescriptor::get(&entry.endpoint), &entry.selector)
                .await?;

            report.refreshed.push(entry.selector);
            report.dropped_refreshes += step.dropped;
            report.completion.token_stored |= step.completion.token_stored;
            report.completion.forced_logout |= step.completion.forced_logout;
            pending.extend(step.ready);
        }

        Ok(report)
    }

    async fn step(
        &mut self,
        page: &mut dyn Page,
        descriptor: RequestDescriptor,
        target: &str,
    ) -> Result<Step, ClientError> {
        let prepared = self.panel.prepare_request(descriptor)?;
        let response = self.transport.send(&prepared).await?;

        let swapped = self.panel.swap_response(target, &response, page);

        let queued = self.panel.pending_refreshes();
        let ready = self.panel.take_refreshes(&*page);
        let dropped = queued - ready.len();

        let completion = self.panel.on_request_complete(&prepared.url, &response, page)?;

        Ok(Step {
            status: response.status,
            swapped,
            ready,
            dropped,
            completion,
        })
    }
}
