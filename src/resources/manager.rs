use std::cell::{Cell, RefCell};

/// Lifecycle notifications of a batch of asset loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    /// The first item of a batch started loading.
    Started {
        url: String,
        loaded: usize,
        total: usize,
    },
    /// An item ended, successfully or not.
    Progress {
        url: String,
        loaded: usize,
        total: usize,
    },
    /// An item failed. Nothing is retried.
    Error { url: String },
    /// Every started item has ended.
    Finished,
}

type Listener = Box<dyn FnMut(&LoadEvent)>;

/// Tracks outstanding loads and notifies listeners about their progress.
///
/// Loads share the manager by reference; all notifications happen on the
/// thread that drives the load futures.
pub struct LoadingManager {
    loaded: Cell<usize>,
    total: Cell<usize>,
    loading: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl LoadingManager {
    /// A manager without listeners.
    pub fn new() -> Self {
        Self {
            loaded: Cell::new(0),
            total: Cell::new(0),
            loading: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// A manager that logs every transition.
    pub fn with_logging() -> Self {
        let manager = Self::new();
        manager.on_event(log_event);
        manager
    }

    pub fn on_event(&self, listener: impl FnMut(&LoadEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn items_loaded(&self) -> usize {
        self.loaded.get()
    }

    pub fn items_total(&self) -> usize {
        self.total.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub(crate) fn item_start(&self, url: &str) {
        self.total.set(self.total.get() + 1);
        if !self.loading.replace(true) {
            self.emit(LoadEvent::Started {
                url: url.to_string(),
                loaded: self.loaded.get(),
                total: self.total.get(),
            });
        }
    }

    pub(crate) fn item_error(&self, url: &str) {
        self.emit(LoadEvent::Error {
            url: url.to_string(),
        });
    }

    pub(crate) fn item_end(&self, url: &str) {
        self.loaded.set(self.loaded.get() + 1);
        self.emit(LoadEvent::Progress {
            url: url.to_string(),
            loaded: self.loaded.get(),
            total: self.total.get(),
        });
        if self.loaded.get() == self.total.get() {
            self.loading.set(false);
            self.emit(LoadEvent::Finished);
        }
    }

    fn emit(&self, event: LoadEvent) {
        for listener in self.listeners.borrow_mut().iter_mut() {
            listener(&event);
        }
    }
}

impl Default for LoadingManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoadingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingManager")
            .field("loaded", &self.loaded.get())
            .field("total", &self.total.get())
            .field("loading", &self.loading.get())
            .finish()
    }
}

fn log_event(event: &LoadEvent) {
    match event {
        LoadEvent::Started { .. } => log::info!("loading started"),
        LoadEvent::Progress { url, loaded, total } => {
            log::info!("loading progressing ({loaded}/{total}): {url}")
        }
        LoadEvent::Error { url } => log::error!("loading error: {url}"),
        LoadEvent::Finished => log::info!("loading finished"),
    }
}
