//! Catalog page store: the materialized, append-growing product sequence plus
//! its pagination cursor.
//!
//! State machine:
//!
//! ```text
//! Idle ──begin──▶ Fetching ──ok, has_more──▶ Loaded ──load-more──▶ Fetching
//!                    │      ──ok, !has_more─▶ Exhausted
//!                    └──────err────────────▶ Errored ──retry──▶ Fetching
//! (any settled state) ──reload (search change)──▶ Fetching
//! ```
//!
//! `begin_fetch` sets the in-flight flag synchronously and hands out a
//! [`FetchTicket`]; `complete` is the single completion path and always clears
//! the flag for the matching ticket, whatever the outcome. A ticket whose
//! search generation no longer matches is discarded as stale.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use forca_core::{Entity, ProductCode, ProductRecord};

use crate::fetcher::{FetchError, FetchedPage, PRODUCT_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogState {
    Idle,
    Fetching,
    Loaded,
    Exhausted,
    Errored,
}

/// Why a fetch is being started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchIntent {
    /// Page 1 for the active search term (mount or search change).
    Reload,
    /// The page after the current one. Only from `Loaded`.
    LoadMore,
    /// Re-issue the request that just failed.
    Retry,
}

/// Handle for one in-flight fetch. Carries the originating search term and
/// page so the response can be checked for staleness before it is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    generation: u64,
    search: String,
    page: u32,
    intent: FetchIntent,
}

impl FetchTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn intent(&self) -> FetchIntent {
        self.intent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeginFetchError {
    /// Another fetch is still in flight. Callers should not get here; the UI
    /// gates triggers on `is_fetching()`.
    #[error("a fetch for page {in_flight_page} is already in flight")]
    ConcurrencyViolation { in_flight_page: u32 },
    #[error("catalog is exhausted after page {current_page}")]
    Exhausted { current_page: u32 },
    #[error("load-more needs a loaded catalog (state: {state:?})")]
    NotLoaded { state: CatalogState },
    #[error("no failed fetch to retry")]
    NothingToRetry,
}

/// What `complete` did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Page 1 replaced the sequence.
    Replaced { items: usize },
    /// A later page was appended. `duplicates` counts codes already present.
    Appended { added: usize, duplicates: usize },
    /// The fetch failed; the sequence is untouched.
    Failed(FetchError),
    /// The response no longer matches the active search (or an unknown
    /// ticket was presented) and was dropped.
    Stale,
}

/// Read-only snapshot of the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    pub current_page: u32,
    pub has_more: bool,
    pub is_fetching: bool,
    pub search_term: String,
    pub state: CatalogState,
}

#[derive(Debug, Clone)]
pub struct CatalogPageStore {
    page_size: usize,
    items: Vec<ProductRecord>,
    visible: HashSet<ProductCode>,
    /// Every record seen this session, first-seen order, latest version wins.
    known: Vec<ProductRecord>,
    known_index: HashMap<ProductCode, usize>,
    current_page: u32,
    has_more: bool,
    search_term: String,
    state: CatalogState,
    settled_state: CatalogState,
    generation: u64,
    next_ticket: u64,
    in_flight: Option<FetchTicket>,
    needs_reload: bool,
    failed_page: Option<u32>,
    last_error: Option<FetchError>,
    loaded_at: Option<DateTime<Utc>>,
}

impl Default for CatalogPageStore {
    fn default() -> Self {
        Self::new(PRODUCT_PAGE_SIZE)
    }
}

impl CatalogPageStore {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            items: Vec::new(),
            visible: HashSet::new(),
            known: Vec::new(),
            known_index: HashMap::new(),
            current_page: 1,
            has_more: true,
            search_term: String::new(),
            state: CatalogState::Idle,
            settled_state: CatalogState::Idle,
            generation: 0,
            next_ticket: 0,
            in_flight: None,
            needs_reload: true,
            failed_page: None,
            last_error: None,
            loaded_at: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The materialized catalog sequence, in fetch order.
    pub fn items(&self) -> &[ProductRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every product seen during this session (including ones a later search
    /// removed from the visible sequence), in first-seen order.
    pub fn known_products(&self) -> &[ProductRecord] {
        &self.known
    }

    pub fn find_known(&self, code: &ProductCode) -> Option<&ProductRecord> {
        self.known_index.get(code).map(|&i| &self.known[i])
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    /// True when the visible sequence does not belong to the active search
    /// term yet (never loaded, or the term changed since).
    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn cursor(&self) -> PageCursor {
        PageCursor {
            current_page: self.current_page,
            has_more: self.has_more,
            is_fetching: self.is_fetching(),
            search_term: self.search_term.clone(),
            state: self.state,
        }
    }

    /// Make `term` the active search. Returns `false` if it already was.
    ///
    /// Resets the cursor to page 1 and invalidates any in-flight response; the
    /// visible sequence is only replaced once the new page 1 arrives.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search_term {
            return false;
        }

        tracing::debug!(from = %self.search_term, to = %term, "catalog search term changed");
        self.search_term = term;
        self.generation += 1;
        self.current_page = 1;
        self.has_more = true;
        self.needs_reload = true;
        self.failed_page = None;
        true
    }

    /// Start a fetch. Sets the in-flight flag before returning.
    pub fn begin_fetch(&mut self, intent: FetchIntent) -> Result<FetchTicket, BeginFetchError> {
        if let Some(t) = &self.in_flight {
            return Err(BeginFetchError::ConcurrencyViolation { in_flight_page: t.page });
        }

        let page = match intent {
            FetchIntent::Reload => 1,
            FetchIntent::LoadMore => {
                if self.needs_reload {
                    return Err(BeginFetchError::NotLoaded { state: self.state });
                }
                match self.state {
                    CatalogState::Loaded if self.has_more => self.current_page + 1,
                    CatalogState::Loaded | CatalogState::Exhausted => {
                        return Err(BeginFetchError::Exhausted {
                            current_page: self.current_page,
                        });
                    }
                    state => return Err(BeginFetchError::NotLoaded { state }),
                }
            }
            FetchIntent::Retry => match (self.state, self.failed_page) {
                (CatalogState::Errored, Some(page)) => page,
                _ => return Err(BeginFetchError::NothingToRetry),
            },
        };

        self.next_ticket += 1;
        let ticket = FetchTicket {
            id: self.next_ticket,
            generation: self.generation,
            search: self.search_term.clone(),
            page,
            intent,
        };

        tracing::debug!(
            ticket = ticket.id,
            page,
            search = %ticket.search,
            ?intent,
            "catalog fetch started"
        );

        self.settled_state = self.state;
        self.state = CatalogState::Fetching;
        self.in_flight = Some(ticket.clone());
        Ok(ticket)
    }

    /// Commit the result of a fetch started with `begin_fetch`.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<FetchedPage, FetchError>,
    ) -> CommitOutcome {
        match &self.in_flight {
            Some(t) if t.id == ticket.id => {
                self.in_flight = None;
            }
            _ => {
                tracing::warn!(ticket = ticket.id, "ignoring completion for unknown fetch ticket");
                return CommitOutcome::Stale;
            }
        }

        if ticket.generation != self.generation {
            tracing::warn!(
                ticket = ticket.id,
                page = ticket.page,
                stale_search = %ticket.search,
                active_search = %self.search_term,
                "discarding stale catalog response"
            );
            self.state = self.settled_state;
            return CommitOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let outcome = if ticket.page == 1 {
                    self.replace(page.items)
                } else {
                    self.append(page.items)
                };

                self.current_page = ticket.page;
                self.has_more = page.has_more;
                self.state = if page.has_more {
                    CatalogState::Loaded
                } else {
                    CatalogState::Exhausted
                };
                self.needs_reload = false;
                self.failed_page = None;
                self.last_error = None;
                self.loaded_at = Some(Utc::now());

                tracing::debug!(
                    ticket = ticket.id,
                    page = ticket.page,
                    total = self.items.len(),
                    has_more = self.has_more,
                    "catalog page committed"
                );
                outcome
            }
            Err(err) => {
                tracing::error!(
                    ticket = ticket.id,
                    page = ticket.page,
                    search = %ticket.search,
                    error = %err,
                    "catalog fetch failed"
                );
                self.state = CatalogState::Errored;
                self.failed_page = Some(ticket.page);
                self.last_error = Some(err.clone());
                CommitOutcome::Failed(err)
            }
        }
    }

    fn replace(&mut self, records: Vec<ProductRecord>) -> CommitOutcome {
        self.items.clear();
        self.visible.clear();
        let (added, _) = self.extend(records);
        CommitOutcome::Replaced { items: added }
    }

    fn append(&mut self, records: Vec<ProductRecord>) -> CommitOutcome {
        let (added, duplicates) = self.extend(records);
        if duplicates > 0 {
            tracing::debug!(duplicates, "skipped product codes already in the catalog");
        }
        CommitOutcome::Appended { added, duplicates }
    }

    fn extend(&mut self, records: Vec<ProductRecord>) -> (usize, usize) {
        let mut added = 0;
        let mut duplicates = 0;
        for record in records {
            self.remember(&record);
            if self.visible.insert(record.id().clone()) {
                self.items.push(record);
                added += 1;
            } else {
                duplicates += 1;
            }
        }
        (added, duplicates)
    }

    fn remember(&mut self, record: &ProductRecord) {
        match self.known_index.get(record.id()) {
            Some(&i) => self.known[i] = record.clone(),
            None => {
                self.known_index.insert(record.id().clone(), self.known.len());
                self.known.push(record.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> ProductRecord {
        ProductRecord {
            code: code.parse().unwrap(),
            description: format!("Produto {code}"),
            unit: "UN".to_string(),
            family: "GERAL".to_string(),
            stock: "10".to_string(),
            price: "1,00".to_string(),
        }
    }

    fn page_of(prefix: &str, range: std::ops::Range<usize>, page_size: usize) -> FetchedPage {
        let items = range.map(|i| record(&format!("{prefix}{i:04}"))).collect();
        FetchedPage::from_items(items, page_size)
    }

    fn codes(store: &CatalogPageStore) -> Vec<String> {
        store.items().iter().map(|r| r.code.to_string()).collect()
    }

    fn load(store: &mut CatalogPageStore, intent: FetchIntent, page: FetchedPage) -> CommitOutcome {
        let ticket = store.begin_fetch(intent).unwrap();
        store.complete(&ticket, Ok(page))
    }

    #[test]
    fn starts_idle_on_page_one() {
        let store = CatalogPageStore::default();
        assert_eq!(store.state(), CatalogState::Idle);
        assert_eq!(store.current_page(), 1);
        assert_eq!(store.page_size(), PRODUCT_PAGE_SIZE);
        assert!(!store.is_fetching());
        assert!(store.needs_reload());
    }

    #[test]
    fn begin_fetch_sets_in_flight_flag_synchronously() {
        let mut store = CatalogPageStore::default();
        let ticket = store.begin_fetch(FetchIntent::Reload).unwrap();
        assert!(store.is_fetching());
        assert_eq!(store.state(), CatalogState::Fetching);
        assert_eq!(ticket.page(), 1);
        assert_eq!(store.in_flight(), Some(&ticket));
    }

    #[test]
    fn second_fetch_while_in_flight_is_rejected() {
        let mut store = CatalogPageStore::default();
        let _ticket = store.begin_fetch(FetchIntent::Reload).unwrap();
        let err = store.begin_fetch(FetchIntent::Reload).unwrap_err();
        assert_eq!(err, BeginFetchError::ConcurrencyViolation { in_flight_page: 1 });
    }

    #[test]
    fn page_one_then_page_two_appends() {
        let mut store = CatalogPageStore::default();
        let outcome = load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        assert_eq!(outcome, CommitOutcome::Replaced { items: 50 });
        assert_eq!(store.state(), CatalogState::Loaded);

        let outcome = load(&mut store, FetchIntent::LoadMore, page_of("P", 50..80, 50));
        assert_eq!(outcome, CommitOutcome::Appended { added: 30, duplicates: 0 });
        assert_eq!(store.len(), 80);
        assert_eq!(store.current_page(), 2);
        assert_eq!(store.state(), CatalogState::Exhausted);
        assert!(!store.has_more());
    }

    #[test]
    fn exactly_full_last_page_reports_more_then_empty_page_exhausts() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        assert!(store.has_more());

        let outcome = load(&mut store, FetchIntent::LoadMore, FetchedPage::from_items(Vec::new(), 50));
        assert_eq!(outcome, CommitOutcome::Appended { added: 0, duplicates: 0 });
        assert!(!store.has_more());
        assert_eq!(store.state(), CatalogState::Exhausted);
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn load_more_after_exhaustion_is_a_no_op() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..3, 50));
        let err = store.begin_fetch(FetchIntent::LoadMore).unwrap_err();
        assert_eq!(err, BeginFetchError::Exhausted { current_page: 1 });
        assert!(!store.is_fetching());
        assert_eq!(store.state(), CatalogState::Exhausted);
    }

    #[test]
    fn load_more_requires_a_loaded_catalog() {
        let mut store = CatalogPageStore::default();
        let err = store.begin_fetch(FetchIntent::LoadMore).unwrap_err();
        assert_eq!(err, BeginFetchError::NotLoaded { state: CatalogState::Idle });
    }

    #[test]
    fn search_change_on_page_three_replaces_with_new_first_page() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        load(&mut store, FetchIntent::LoadMore, page_of("P", 50..100, 50));
        load(&mut store, FetchIntent::LoadMore, page_of("P", 100..150, 50));
        assert_eq!(store.current_page(), 3);

        assert!(store.set_search_term("parafuso"));
        assert_eq!(store.current_page(), 1);
        assert!(store.needs_reload());

        let ticket = store.begin_fetch(FetchIntent::Reload).unwrap();
        assert_eq!(ticket.search(), "parafuso");
        store.complete(&ticket, Ok(page_of("S", 0..4, 50)));

        assert_eq!(codes(&store), vec!["S0000", "S0001", "S0002", "S0003"]);
        assert_eq!(store.current_page(), 1);
        // Products from the old pages stay known for the session.
        assert!(store.find_known(&"P0120".parse().unwrap()).is_some());
        assert_eq!(store.known_products().len(), 154);
    }

    #[test]
    fn same_search_term_is_not_a_change() {
        let mut store = CatalogPageStore::default();
        assert!(store.set_search_term("abc"));
        assert!(!store.set_search_term("abc"));
    }

    #[test]
    fn load_more_is_blocked_until_new_search_loads() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        store.set_search_term("x");
        let err = store.begin_fetch(FetchIntent::LoadMore).unwrap_err();
        assert!(matches!(err, BeginFetchError::NotLoaded { .. }));
    }

    #[test]
    fn failure_leaves_sequence_intact_and_retry_succeeds() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        let before = store.items().to_vec();

        let ticket = store.begin_fetch(FetchIntent::LoadMore).unwrap();
        let outcome = store.complete(&ticket, Err(FetchError::Network("timeout".into())));
        assert!(matches!(outcome, CommitOutcome::Failed(FetchError::Network(_))));
        assert!(!store.is_fetching());
        assert_eq!(store.state(), CatalogState::Errored);
        assert_eq!(store.items(), before.as_slice());
        assert_eq!(store.current_page(), 1);
        assert!(store.last_error().is_some());

        let retry = store.begin_fetch(FetchIntent::Retry).unwrap();
        assert_eq!(retry.page(), 2);
        store.complete(&retry, Ok(page_of("P", 50..60, 50)));
        assert_eq!(store.len(), 60);
        assert!(store.last_error().is_none());
        assert_eq!(store.state(), CatalogState::Exhausted);
    }

    #[test]
    fn failed_first_page_can_be_reissued_identically() {
        let mut store = CatalogPageStore::default();
        let ticket = store.begin_fetch(FetchIntent::Reload).unwrap();
        store.complete(&ticket, Err(FetchError::Server { status: 500, message: "down".into() }));
        assert!(!store.is_fetching());

        let again = store.begin_fetch(FetchIntent::Reload).unwrap();
        assert_eq!(again.page(), ticket.page());
        assert_eq!(again.search(), ticket.search());
        store.complete(&again, Ok(page_of("P", 0..5, 50)));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn retry_without_failure_is_rejected() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        assert_eq!(store.begin_fetch(FetchIntent::Retry).unwrap_err(), BeginFetchError::NothingToRetry);
    }

    #[test]
    fn response_for_superseded_search_is_discarded() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));

        let ticket = store.begin_fetch(FetchIntent::LoadMore).unwrap();
        store.set_search_term("novo");

        let outcome = store.complete(&ticket, Ok(page_of("P", 50..100, 50)));
        assert_eq!(outcome, CommitOutcome::Stale);
        assert!(!store.is_fetching());
        assert_eq!(store.len(), 50);
        assert_eq!(store.state(), CatalogState::Loaded);
        assert!(store.needs_reload());
    }

    #[test]
    fn unknown_ticket_does_not_clear_the_real_in_flight_fetch() {
        let mut store = CatalogPageStore::default();
        let first = store.begin_fetch(FetchIntent::Reload).unwrap();
        store.complete(&first, Ok(page_of("P", 0..50, 50)));

        let current = store.begin_fetch(FetchIntent::LoadMore).unwrap();
        assert_eq!(store.complete(&first, Ok(page_of("Z", 0..1, 50))), CommitOutcome::Stale);
        assert!(store.is_fetching());
        assert_eq!(store.in_flight(), Some(&current));
    }

    #[test]
    fn duplicate_codes_are_not_materialized_twice() {
        let mut store = CatalogPageStore::default();
        load(&mut store, FetchIntent::Reload, page_of("P", 0..50, 50));
        let outcome = load(&mut store, FetchIntent::LoadMore, page_of("P", 45..60, 50));
        assert_eq!(outcome, CommitOutcome::Appended { added: 10, duplicates: 5 });
        assert_eq!(store.len(), 60);
    }

    #[test]
    fn cursor_reflects_store() {
        let mut store = CatalogPageStore::default();
        store.set_search_term("cabo");
        let _ticket = store.begin_fetch(FetchIntent::Reload).unwrap();
        let cursor = store.cursor();
        assert!(cursor.is_fetching);
        assert_eq!(cursor.search_term, "cabo");
        assert_eq!(cursor.state, CatalogState::Fetching);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: disjoint pages append to exactly the sum of their lengths.
            #[test]
            fn disjoint_pages_append_lengths(first in 1usize..=20, second in 0usize..=20) {
                let mut store = CatalogPageStore::new(20);
                load(&mut store, FetchIntent::Reload, page_of("P", 0..first, 20));
                if store.has_more() {
                    load(&mut store, FetchIntent::LoadMore, page_of("P", first..first + second, 20));
                    prop_assert_eq!(store.len(), first + second);
                } else {
                    prop_assert_eq!(store.len(), first);
                }
            }

            /// Property: no code appears twice in the materialized sequence.
            #[test]
            fn codes_are_unique(pages in proptest::collection::vec(proptest::collection::vec(0u8..30, 5), 1..6)) {
                let mut store = CatalogPageStore::new(5);
                for (i, page) in pages.iter().enumerate() {
                    let intent = if i == 0 { FetchIntent::Reload } else { FetchIntent::LoadMore };
                    let Ok(ticket) = store.begin_fetch(intent) else { break };
                    let items = page.iter().map(|c| record(&format!("C{c}"))).collect();
                    store.complete(&ticket, Ok(FetchedPage::from_items(items, 5)));
                }
                let mut seen = HashSet::new();
                for r in store.items() {
                    prop_assert!(seen.insert(r.code.clone()));
                }
            }
        }
    }
}
