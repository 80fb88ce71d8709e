//! One product-browsing session: catalog pages, quote overlay, search debounce
//! and payment selection, scoped to a single visit of the product screen.
//!
//! Fetches are split into [`ProductSession::begin`] (synchronous, sets the
//! in-flight flag) and [`ProductSession::commit`] (the single completion
//! path). [`ProductSession::fetch`] runs both around one network call; the
//! [`worker`](crate::worker) runs the call on a separate task instead.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forca_catalog::{
    BeginFetchError, CatalogPageStore, CatalogState, CommitOutcome, FetchError, FetchIntent, FetchRequest,
    FetchTicket, FetchedPage, PageCursor, ProductFetcher, SearchDebouncer,
};
use forca_core::{Money, ProductCode, ProductRecord};
use forca_quote::{QuoteAggregate, QuoteLine, QuoteOverlay, QuoteReview, compute};

use crate::config::ClientConfig;
use crate::navigation::ProductsRoute;
use crate::payment::{PaymentCondition, PaymentMethod, PaymentTerms};

/// Identifier of one browsing session (UUIDv7, time-ordered).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// What the product screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub route: ProductsRoute,
    pub products: Vec<ProductRecord>,
    pub cursor: PageCursor,
    pub total_value: Money,
    pub item_count: usize,
    /// Generic user-facing message for the last failed fetch.
    pub error: Option<String>,
    pub payment: PaymentTerms,
}

pub struct ProductSession {
    id: SessionId,
    route: ProductsRoute,
    fetcher: Arc<dyn ProductFetcher>,
    store: CatalogPageStore,
    overlay: QuoteOverlay,
    debouncer: SearchDebouncer,
    payment: PaymentTerms,
}

impl ProductSession {
    pub fn new(route: ProductsRoute, fetcher: Arc<dyn ProductFetcher>, config: &ClientConfig) -> Self {
        let id = SessionId::new();
        tracing::info!(session = %id, client = %route.cliente_codigo, "product session opened");
        Self {
            id,
            route,
            fetcher,
            store: CatalogPageStore::new(config.page_size),
            overlay: QuoteOverlay::new(),
            debouncer: SearchDebouncer::new(config.search_debounce),
            payment: PaymentTerms::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn route(&self) -> &ProductsRoute {
        &self.route
    }

    pub fn fetcher(&self) -> Arc<dyn ProductFetcher> {
        self.fetcher.clone()
    }

    // -------------------------
    // Catalog
    // -------------------------

    /// Visible catalog, in fetch order.
    pub fn products(&self) -> &[ProductRecord] {
        self.store.items()
    }

    pub fn store(&self) -> &CatalogPageStore {
        &self.store
    }

    pub fn is_fetching(&self) -> bool {
        self.store.is_fetching()
    }

    pub fn cursor(&self) -> PageCursor {
        self.store.cursor()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        self.store.last_error().map(FetchError::user_message)
    }

    /// Start a fetch: marks the store in flight and returns the request to send.
    pub fn begin(&mut self, intent: FetchIntent) -> Result<(FetchTicket, FetchRequest), BeginFetchError> {
        let ticket = self.store.begin_fetch(intent)?;
        let request = FetchRequest::new(
            self.route.cliente_codigo.clone(),
            ticket.search(),
            ticket.page(),
            self.store.page_size(),
        );
        Ok((ticket, request))
    }

    /// Commit a response for a ticket from [`begin`](Self::begin).
    pub fn commit(&mut self, ticket: &FetchTicket, result: Result<FetchedPage, FetchError>) -> CommitOutcome {
        self.store.complete(ticket, result)
    }

    /// Begin, await the fetcher, commit.
    pub async fn fetch(&mut self, intent: FetchIntent) -> Result<CommitOutcome, BeginFetchError> {
        let (ticket, request) = self.begin(intent)?;
        let result = self.fetcher.fetch_page(&request).await;
        Ok(self.commit(&ticket, result))
    }

    /// Load page 1 for the active search.
    pub async fn start(&mut self) -> Result<CommitOutcome, BeginFetchError> {
        self.fetch(FetchIntent::Reload).await
    }

    /// Intent for the "load more" trigger: re-issue the failed page after an
    /// error, page 1 if a search change is still unfetched, otherwise the next
    /// page.
    pub fn load_more_intent(&self) -> FetchIntent {
        if self.store.needs_reload() {
            FetchIntent::Reload
        } else if self.store.state() == CatalogState::Errored {
            FetchIntent::Retry
        } else {
            FetchIntent::LoadMore
        }
    }

    pub async fn load_more(&mut self) -> Result<CommitOutcome, BeginFetchError> {
        let intent = self.load_more_intent();
        self.fetch(intent).await
    }

    // -------------------------
    // Search
    // -------------------------

    pub fn search_term(&self) -> &str {
        self.store.search_term()
    }

    /// Record a keystroke. Nothing is fetched until the input has been quiet
    /// for the debounce delay.
    pub fn search_input(&mut self, term: impl Into<String>, now: Instant) {
        self.debouncer.input(term, now);
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Apply the pending term if its quiet period has elapsed. Returns `true`
    /// when page 1 must be (re)loaded.
    pub fn apply_due_search(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(term) => self.apply_search(term),
            None => false,
        }
    }

    /// Apply the pending term immediately. Returns `true` when page 1 must be
    /// (re)loaded.
    pub fn apply_pending_search(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(term) => self.apply_search(term),
            None => false,
        }
    }

    fn apply_search(&mut self, term: String) -> bool {
        self.store.set_search_term(term) || self.store.needs_reload()
    }

    /// Debounced search: fetch page 1 if the pending term is due at `now`.
    pub async fn poll_search(&mut self, now: Instant) -> Option<Result<CommitOutcome, BeginFetchError>> {
        if self.apply_due_search(now) {
            Some(self.fetch(FetchIntent::Reload).await)
        } else {
            None
        }
    }

    /// Skip the debounce and search now.
    pub async fn flush_search(&mut self) -> Option<Result<CommitOutcome, BeginFetchError>> {
        if self.apply_pending_search() {
            Some(self.fetch(FetchIntent::Reload).await)
        } else {
            None
        }
    }

    // -------------------------
    // Quote
    // -------------------------

    pub fn line(&self, code: &ProductCode) -> QuoteLine {
        self.overlay.get(code)
    }

    pub fn overlay(&self) -> &QuoteOverlay {
        &self.overlay
    }

    pub fn set_quantity(&mut self, code: &ProductCode, quantity: i64) -> QuoteLine {
        self.overlay.set_quantity(code, quantity)
    }

    /// Quantity typed as free text; coerced, never rejected.
    pub fn set_quantity_input(&mut self, code: &ProductCode, input: &str) -> QuoteLine {
        self.overlay.set_quantity_input(code, input)
    }

    pub fn toggle_included(&mut self, code: &ProductCode) -> QuoteLine {
        self.overlay.toggle_included(code)
    }

    /// Totals over every product seen this session, so lines included before a
    /// search change still count.
    pub fn aggregate(&self) -> QuoteAggregate {
        compute(self.store.known_products(), &self.overlay)
    }

    pub fn review(&self) -> QuoteReview {
        QuoteReview::build(self.store.known_products(), &self.overlay)
    }

    pub fn remove_from_quote(&mut self, code: &ProductCode) -> bool {
        forca_quote::remove(&mut self.overlay, code)
    }

    pub fn clear_quote(&mut self) {
        self.overlay.clear();
    }

    // -------------------------
    // Payment
    // -------------------------

    pub fn payment(&self) -> PaymentTerms {
        self.payment
    }

    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) {
        self.payment.method = method;
    }

    pub fn set_payment_condition(&mut self, condition: Option<PaymentCondition>) {
        self.payment.condition = condition;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let aggregate = self.aggregate();
        SessionSnapshot {
            session_id: self.id,
            route: self.route.clone(),
            products: self.store.items().to_vec(),
            cursor: self.store.cursor(),
            total_value: aggregate.total_value,
            item_count: aggregate.item_count,
            error: self.error_message().map(str::to_string),
            payment: self.payment,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    pub(crate) fn record(code: &str, price: &str) -> ProductRecord {
        ProductRecord {
            code: code.parse().unwrap(),
            description: format!("Produto {code}"),
            unit: "UN".to_string(),
            family: "GERAL".to_string(),
            stock: "1".to_string(),
            price: price.to_string(),
        }
    }

    pub(crate) fn full_page(prefix: &str, n: usize) -> Vec<ProductRecord> {
        (0..n).map(|i| record(&format!("{prefix}{i:03}"), "1,00")).collect()
    }

    /// Answers from a per-(search, page) script; unscripted requests get an
    /// empty page. Queued errors are returned first.
    #[derive(Default)]
    pub(crate) struct ScriptedFetcher {
        pages: Mutex<HashMap<(String, u32), Vec<ProductRecord>>>,
        errors: Mutex<VecDeque<FetchError>>,
        pub(crate) calls: Mutex<Vec<FetchRequest>>,
    }

    impl ScriptedFetcher {
        pub(crate) fn page(self, search: &str, page: u32, items: Vec<ProductRecord>) -> Self {
            self.pages.lock().unwrap().insert((search.to_string(), page), items);
            self
        }

        pub(crate) fn fail_next(&self, err: FetchError) {
            self.errors.lock().unwrap().push_back(err);
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProductFetcher for ScriptedFetcher {
        async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
            self.calls.lock().unwrap().push(request.clone());
            if let Some(err) = self.errors.lock().unwrap().pop_front() {
                return Err(err);
            }
            let items = self
                .pages
                .lock()
                .unwrap()
                .get(&(request.search.clone(), request.page))
                .cloned()
                .unwrap_or_default();
            Ok(FetchedPage::from_items(items, request.page_size))
        }
    }

    fn route() -> ProductsRoute {
        ProductsRoute::new("C001", "Padaria Lua", None).unwrap()
    }

    fn session(fetcher: Arc<ScriptedFetcher>) -> ProductSession {
        ProductSession::new(route(), fetcher, &ClientConfig::default())
    }

    fn code(s: &str) -> ProductCode {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn start_loads_page_one_for_the_route_client() {
        let fetcher = Arc::new(ScriptedFetcher::default().page("", 1, vec![record("A01", "10,50")]));
        let mut s = session(fetcher.clone());

        let outcome = s.start().await.unwrap();
        assert_eq!(outcome, CommitOutcome::Replaced { items: 1 });
        assert!(!s.is_fetching());
        assert_eq!(s.cursor().state, CatalogState::Exhausted);

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls[0].client.as_str(), "C001");
        assert_eq!(calls[0].page, 1);
        assert_eq!(calls[0].page_size, 50);
    }

    #[tokio::test]
    async fn quantity_and_toggle_produce_the_expected_total() {
        let fetcher = Arc::new(ScriptedFetcher::default().page("", 1, vec![record("A01", "10,50")]));
        let mut s = session(fetcher);
        s.start().await.unwrap();

        s.set_quantity(&code("A01"), 3);
        s.toggle_included(&code("A01"));

        let aggregate = s.aggregate();
        assert_eq!(aggregate.total_value, Money::from_cents(3150));
        assert_eq!(aggregate.item_count, 1);
    }

    #[tokio::test]
    async fn exactly_full_page_then_empty_page_exhausts_the_catalog() {
        let fetcher = Arc::new(ScriptedFetcher::default().page("", 1, full_page("P", 50)));
        let mut s = session(fetcher);

        s.start().await.unwrap();
        assert!(s.cursor().has_more);

        let outcome = s.load_more().await.unwrap();
        assert_eq!(outcome, CommitOutcome::Appended { added: 0, duplicates: 0 });
        assert!(!s.cursor().has_more);
        assert_eq!(s.products().len(), 50);

        assert!(matches!(s.load_more().await, Err(BeginFetchError::Exhausted { .. })));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_state_and_load_more_retries_the_same_page() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("", 1, full_page("P", 50))
                .page("", 2, vec![record("Q001", "2,00")]),
        );
        let mut s = session(fetcher.clone());
        s.start().await.unwrap();
        s.set_quantity(&code("P000"), 2);

        fetcher.fail_next(FetchError::Network("timeout".into()));
        let outcome = s.load_more().await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Failed(_)));
        assert!(!s.is_fetching());
        assert_eq!(s.products().len(), 50);
        assert_eq!(s.line(&code("P000")).quantity, 2);
        assert_eq!(s.error_message(), Some("Ocorreu um erro ao buscar os produtos."));

        assert_eq!(s.load_more_intent(), FetchIntent::Retry);
        let outcome = s.load_more().await.unwrap();
        assert_eq!(outcome, CommitOutcome::Appended { added: 1, duplicates: 0 });
        assert_eq!(fetcher.calls.lock().unwrap().last().unwrap().page, 2);
        assert_eq!(s.error_message(), None);
    }

    #[tokio::test]
    async fn debounced_search_fires_once_with_the_last_term() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("", 1, full_page("P", 50))
                .page("par", 1, vec![record("PAR1", "0,35")]),
        );
        let mut s = session(fetcher.clone());
        s.start().await.unwrap();

        let t0 = Instant::now();
        s.search_input("p", t0);
        s.search_input("pa", t0 + Duration::from_millis(100));
        s.search_input("par", t0 + Duration::from_millis(200));

        assert!(s.poll_search(t0 + Duration::from_millis(600)).await.is_none());
        let outcome = s.poll_search(t0 + Duration::from_millis(700)).await.unwrap().unwrap();
        assert_eq!(outcome, CommitOutcome::Replaced { items: 1 });

        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(s.search_term(), "par");
        assert_eq!(s.products().len(), 1);
    }

    #[tokio::test]
    async fn included_lines_survive_a_search_change() {
        let fetcher = Arc::new(
            ScriptedFetcher::default()
                .page("", 1, vec![record("A01", "10,50"), record("B02", "1,00")])
                .page("b", 1, vec![record("B02", "1,00")]),
        );
        let mut s = session(fetcher);
        s.start().await.unwrap();
        s.set_quantity(&code("A01"), 2);
        s.toggle_included(&code("A01"));

        s.search_input("b", Instant::now());
        s.flush_search().await.unwrap().unwrap();

        let visible: Vec<_> = s.products().iter().map(|r| r.code.as_str()).collect();
        assert_eq!(visible, vec!["B02"]);
        assert_eq!(s.aggregate().total_value, Money::from_cents(2100));

        let review = s.review();
        assert_eq!(review.lines.len(), 1);
        assert_eq!(review.lines[0].description.as_deref(), Some("Produto A01"));

        assert!(s.remove_from_quote(&code("A01")));
        assert_eq!(s.aggregate().item_count, 0);
        assert!(!s.remove_from_quote(&code("A01")));
    }

    #[tokio::test]
    async fn same_term_does_not_refetch() {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let mut s = session(fetcher.clone());
        s.start().await.unwrap();

        s.search_input("", Instant::now());
        assert!(s.flush_search().await.is_none());
        assert_eq!(fetcher.call_count(), 1);
    }

    #[test]
    fn payment_terms_are_independent_of_totals() {
        let mut s = session(Arc::new(ScriptedFetcher::default()));
        s.set_payment_method(Some(PaymentMethod::Pix));
        s.set_payment_condition(Some(PaymentCondition::Days14));

        let snapshot = s.snapshot();
        assert!(snapshot.payment.is_complete());
        assert_eq!(snapshot.total_value, Money::ZERO);
        assert_eq!(snapshot.route.cliente_nome, "Padaria Lua");
    }
}
