//! Product catalog: paginated, search-filtered product pages.
//!
//! This crate holds the catalog side of the product screen as deterministic
//! state (no IO): the fetcher contract the network layer implements, the page
//! store state machine that owns materialized records, and the search debounce
//! gate.

pub mod debounce;
pub mod fetcher;
pub mod store;

pub use debounce::{SEARCH_DEBOUNCE, SearchDebouncer};
pub use fetcher::{
    FetchError, FetchRequest, FetchedPage, PRODUCT_PAGE_SIZE, ProductFetcher, USER_FETCH_ERROR_MESSAGE,
};
pub use store::{
    BeginFetchError, CatalogPageStore, CatalogState, CommitOutcome, FetchIntent, FetchTicket, PageCursor,
};
