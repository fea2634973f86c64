use async_trait::async_trait;
use pitlane_http::ClientError;
use pitlane_types::{ListItem, Page};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, instrument};

/// Source of pages for a [`PaginatedLoader`]
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<T>, ClientError>;
}

/// Adapts an async closure `(page, limit) -> Result<Page<T>>` into a [`PageFetcher`]
pub struct FnFetcher<F>(F);

pub fn fetch_with<F>(fetch: F) -> FnFetcher<F> {
    FnFetcher(fetch)
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(u32, u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, ClientError>> + Send,
{
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<T>, ClientError> {
        (self.0)(page, limit).await
    }
}

/// How a list view asks for its next page. A loader only accepts the calls
/// of the mode it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Next page loads when the sentinel scrolls into view
    Infinite,
    /// Numbered page controls replace the visible page
    Numbered,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Infinite => "infinite",
            TriggerMode::Numbered => "numbered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Initial,
    More,
    Jump(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub kind: LoadKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page arrived; `added` items went into the list
    Loaded { added: usize },
    /// Guard rejected the call, nothing was requested
    Skipped,
    /// The view was refreshed or unmounted while the request was out
    Discarded,
    /// Request failed; see [`PageState::error`]
    Failed,
}

#[derive(Debug, Clone)]
pub struct PageState<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: Option<u32>,
    pub has_more: bool,
    pub is_loading_initial: bool,
    pub is_loading_more: bool,
    pub error: Option<LoadError>,
    pub loaded: bool,
    generation: u64,
    mounted: bool,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        PageState {
            items: Vec::new(),
            current_page: 1,
            total_pages: None,
            has_more: false,
            is_loading_initial: false,
            is_loading_more: false,
            error: None,
            loaded: false,
            generation: 0,
            mounted: true,
        }
    }
}

impl<T> PageState<T> {
    pub fn is_loading(&self) -> bool {
        self.is_loading_initial || self.is_loading_more
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

fn append_unique<T: ListItem>(items: &mut Vec<T>, fetched: Vec<T>) -> usize {
    let mut seen: HashSet<String> = items.iter().map(|item| item.id().to_string()).collect();
    let before = items.len();

    for item in fetched {
        if seen.insert(item.id().to_string()) {
            items.push(item);
        } else {
            debug!("Dropping duplicate item {} from page", item.id());
        }
    }

    items.len() - before
}

/// Accumulates pages of a remote list behind a single-flight guard.
///
/// Cloning is cheap and every clone shares the same list state, so a view can
/// hand one clone to its scroll handler and keep another for rendering.
pub struct PaginatedLoader<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    page_size: u32,
    mode: TriggerMode,
    state: Arc<Mutex<PageState<T>>>,
}

impl<T> Clone for PaginatedLoader<T> {
    fn clone(&self) -> Self {
        PaginatedLoader {
            fetcher: self.fetcher.clone(),
            page_size: self.page_size,
            mode: self.mode,
            state: self.state.clone(),
        }
    }
}

impl<T> PaginatedLoader<T>
where
    T: ListItem + Clone + Send + 'static,
{
    pub fn new(fetcher: impl PageFetcher<T> + 'static, page_size: u32, mode: TriggerMode) -> Self {
        PaginatedLoader {
            fetcher: Arc::new(fetcher),
            page_size: page_size.max(1),
            mode,
            state: Arc::new(Mutex::new(PageState::default())),
        }
    }

    pub fn infinite(fetcher: impl PageFetcher<T> + 'static, page_size: u32) -> Self {
        Self::new(fetcher, page_size, TriggerMode::Infinite)
    }

    pub fn numbered(fetcher: impl PageFetcher<T> + 'static, page_size: u32) -> Self {
        Self::new(fetcher, page_size, TriggerMode::Numbered)
    }

    fn lock(&self) -> MutexGuard<'_, PageState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_mode(
        &self,
        expected: TriggerMode,
        operation: &'static str,
    ) -> Result<(), ClientError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidTrigger(operation, self.mode.as_str()))
        }
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn snapshot(&self) -> PageState<T> {
        self.lock().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    /// True once a load finished with nothing to show
    pub fn show_empty_state(&self) -> bool {
        let state = self.lock();
        state.loaded && state.items.is_empty() && !state.is_loading() && state.error.is_none()
    }

    /// Whether the view should render the load-more sentinel.
    ///
    /// A failed load hides it until [`PaginatedLoader::retry`].
    pub fn sentinel_visible(&self) -> bool {
        let state = self.lock();
        self.mode == TriggerMode::Infinite
            && state.mounted
            && state.has_more
            && state.error.is_none()
            && !state.is_loading_initial
    }

    async fn run(&self, kind: LoadKind, page: u32, generation: u64) -> LoadOutcome {
        let result = self.fetcher.fetch_page(page, self.page_size).await;

        let mut state = self.lock();
        if state.generation != generation || !state.mounted {
            debug!("Discarding stale result for page {}", page);
            return LoadOutcome::Discarded;
        }

        match kind {
            LoadKind::More => state.is_loading_more = false,
            LoadKind::Initial | LoadKind::Jump(_) => state.is_loading_initial = false,
        }

        match result {
            Ok(fetched) => {
                let has_more = fetched.has_more(self.page_size);
                let total_pages = fetched.total_pages;

                let added = match kind {
                    LoadKind::More => append_unique(&mut state.items, fetched.items),
                    LoadKind::Initial | LoadKind::Jump(_) => {
                        state.items.clear();
                        append_unique(&mut state.items, fetched.items)
                    }
                };

                state.current_page = page;
                state.total_pages = Some(total_pages);
                state.has_more = has_more;
                state.loaded = true;
                state.error = None;

                debug!(
                    "Loaded page {} of {} ({} items, has_more: {})",
                    page, total_pages, added, has_more
                );
                LoadOutcome::Loaded { added }
            }
            Err(e) => {
                error!("Failed to load page {}: {}", page, e);
                state.error = Some(LoadError {
                    kind,
                    message: e.to_string(),
                });
                LoadOutcome::Failed
            }
        }
    }

    /// Requests page 1 and replaces the list with it.
    ///
    /// Any load-more still in flight is discarded when it lands.
    #[instrument(skip_all)]
    pub async fn load_initial(&self) -> LoadOutcome {
        let generation = {
            let mut state = self.lock();
            if !state.mounted || state.is_loading_initial {
                return LoadOutcome::Skipped;
            }
            state.generation += 1;
            state.is_loading_initial = true;
            state.is_loading_more = false;
            state.error = None;
            state.generation
        };

        self.run(LoadKind::Initial, 1, generation).await
    }

    /// Reloads from page 1, e.g. after the user created a post
    pub async fn refresh(&self) -> LoadOutcome {
        self.load_initial().await
    }

    /// Appends the next page. A no-op while any load is in flight, after a
    /// failure, or once the list is exhausted.
    #[instrument(skip_all)]
    pub async fn load_more(&self) -> Result<LoadOutcome, ClientError> {
        self.check_mode(TriggerMode::Infinite, "load_more")?;

        let (page, generation) = {
            let mut state = self.lock();
            if !state.mounted
                || state.is_loading_more
                || state.is_loading_initial
                || !state.has_more
                || state.error.is_some()
            {
                debug!("Skipping load more");
                return Ok(LoadOutcome::Skipped);
            }
            state.is_loading_more = true;
            (state.current_page + 1, state.generation)
        };

        Ok(self.run(LoadKind::More, page, generation).await)
    }

    /// Called by the view when the sentinel element intersects the viewport
    pub async fn on_sentinel_visible(&self) -> Result<LoadOutcome, ClientError> {
        self.check_mode(TriggerMode::Infinite, "on_sentinel_visible")?;
        self.load_more().await
    }

    /// Replaces the list with page `page` of a numbered view
    #[instrument(skip_all, fields(page = page))]
    pub async fn go_to_page(&self, page: u32) -> Result<LoadOutcome, ClientError> {
        self.check_mode(TriggerMode::Numbered, "go_to_page")?;
        if page == 0 {
            return Err(ClientError::InvalidPage(page));
        }

        let generation = {
            let mut state = self.lock();
            if !state.mounted || state.is_loading() {
                return Ok(LoadOutcome::Skipped);
            }
            state.is_loading_initial = true;
            state.error = None;
            state.generation
        };

        Ok(self.run(LoadKind::Jump(page), page, generation).await)
    }

    pub async fn next_page(&self) -> Result<LoadOutcome, ClientError> {
        self.check_mode(TriggerMode::Numbered, "next_page")?;
        let (has_more, current) = {
            let state = self.lock();
            (state.has_more, state.current_page)
        };
        if !has_more {
            return Ok(LoadOutcome::Skipped);
        }
        self.go_to_page(current + 1).await
    }

    pub async fn previous_page(&self) -> Result<LoadOutcome, ClientError> {
        self.check_mode(TriggerMode::Numbered, "previous_page")?;
        let current = self.lock().current_page;
        if current <= 1 {
            return Ok(LoadOutcome::Skipped);
        }
        self.go_to_page(current - 1).await
    }

    /// Re-runs whichever load failed last
    pub async fn retry(&self) -> Result<LoadOutcome, ClientError> {
        let failed = {
            let mut state = self.lock();
            match state.error.take() {
                Some(error) => error.kind,
                None => return Ok(LoadOutcome::Skipped),
            }
        };

        debug!("Retrying failed {:?} load", failed);
        match failed {
            LoadKind::Initial => Ok(self.load_initial().await),
            LoadKind::More => self.load_more().await,
            LoadKind::Jump(page) => self.go_to_page(page).await,
        }
    }

    /// Detaches the loader from its view; late results are dropped
    pub fn unmount(&self) {
        let mut state = self.lock();
        state.mounted = false;
        state.generation += 1;
        state.is_loading_initial = false;
        state.is_loading_more = false;
    }

    pub fn update_item(&self, id: &str, update: impl FnOnce(&mut T)) -> bool {
        let mut state = self.lock();
        match state.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                update(item);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&self, id: &str) -> Option<T> {
        let mut state = self.lock();
        let index = state.items.iter().position(|item| item.id() == id)?;
        Some(state.items.remove(index))
    }

    /// Puts a freshly created item at the head of the list
    pub fn prepend(&self, item: T) {
        let mut state = self.lock();
        state.items.retain(|existing| existing.id() != item.id());
        state.items.insert(0, item);
    }
}
