//! Reset-vs-append pagination with stale-response protection.
//!
//! Every request is issued against a [`Ticket`] that records the generation
//! it belongs to. Resetting bumps the generation, so any reply to an older
//! request (including an in-flight append) is discarded on arrival.

use kanime_api::{CatalogError, Page};

use crate::sanitize::{sanitize, Displayable};

/// Monotonic request epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    LoadingMore,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Reset,
    Append,
}

/// Identifies one outstanding page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: Generation,
    pub page: u32,
    pub mode: FetchMode,
}

/// What happened to a completion handed to [`Paginator::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    current_page: u32,
    has_next_page: bool,
    phase: Phase,
    generation: Generation,
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            has_next_page: false,
            phase: Phase::Idle,
            generation: Generation::default(),
        }
    }
}

impl<T: Displayable> Paginator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from page 1. Valid from any phase.
    pub fn reset(&mut self) -> Ticket {
        self.generation = self.generation.next();
        self.items.clear();
        self.current_page = 1;
        self.has_next_page = false;
        self.phase = Phase::Loading;
        Ticket {
            generation: self.generation,
            page: 1,
            mode: FetchMode::Reset,
        }
    }

    /// Request the next page. Only allowed when idle-ready with more pages.
    pub fn load_more(&mut self) -> Option<Ticket> {
        if self.phase != Phase::Ready || !self.has_next_page {
            return None;
        }
        self.phase = Phase::LoadingMore;
        Some(Ticket {
            generation: self.generation,
            page: self.current_page + 1,
            mode: FetchMode::Append,
        })
    }

    /// Apply a response. Replies from an older generation are ignored.
    pub fn complete(&mut self, ticket: Ticket, result: Result<Page<T>, CatalogError>) -> Outcome {
        if ticket.generation != self.generation || !self.is_pending() {
            tracing::debug!(page = ticket.page, "discarding stale page");
            return Outcome::Stale;
        }

        match result {
            Ok(page) => {
                let items = sanitize(page.items);
                match ticket.mode {
                    FetchMode::Reset => {
                        self.items = items;
                        self.current_page = 1;
                    }
                    FetchMode::Append => {
                        self.items.extend(items);
                        self.current_page += 1;
                    }
                }
                self.has_next_page = page.has_next_page;
                self.phase = Phase::Ready;
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(page = ticket.page, error = %e, "page fetch failed");
                self.phase = Phase::Ready;
                Outcome::Failed
            }
        }
    }

    /// Invalidate any outstanding request without starting a new one.
    pub fn abandon(&mut self) {
        self.generation = self.generation.next();
        if self.is_pending() {
            self.phase = Phase::Ready;
        }
    }
}

impl<T> Paginator<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.phase == Phase::LoadingMore
    }

    fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::LoadingMore)
    }
}
