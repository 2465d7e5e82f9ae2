use crate::bundle::{LanguageBundle, LocaleDocument};
use crate::landing::LandingClient;
use crate::store::PreferenceStore;
use std::sync::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One snapshot of the language session.
///
/// `bundle` stays absent until the initial fetch succeeds; consumers must
/// treat an absent bundle (or an absent current document) as "render nothing"
/// rather than an error.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Active language code; never empty once the session exists
    pub language: String,
    /// All locale documents from the initial fetch, if it has succeeded
    pub bundle: Option<LanguageBundle>,
    /// True while the initial bundle fetch is in flight
    pub loading: bool,
    /// Human-readable description of the last fetch failure
    pub error: Option<String>,
}

impl SessionState {
    /// The locale document for the active language.
    ///
    /// Always re-derived from the bundle on read; never stored separately,
    /// so it can never drift from `language`.
    pub fn current_document(&self) -> Option<&LocaleDocument> {
        self.bundle.as_ref().and_then(|bundle| bundle.get(&self.language))
    }

    /// True once the bundle has loaded and the active language resolved
    pub fn is_ready(&self) -> bool {
        !self.loading && self.current_document().is_some()
    }
}

/// The language session: single owner and single writer of `SessionState`.
///
/// State transitions are published over a `tokio::sync::watch` channel;
/// consumers call [`subscribe`](Self::subscribe) and pull the latest snapshot
/// after each change, or [`snapshot`](Self::snapshot) for a one-shot read.
/// All mutation goes through this type, so readers never observe a partially
/// applied transition.
pub struct LanguageSession {
    state: watch::Sender<SessionState>,
    store: PreferenceStore,
    client: LandingClient,
    init_task: Mutex<Option<JoinHandle<()>>>,
}

impl LanguageSession {
    /// Create a session with the persisted language preference, falling back
    /// to `default_language` when none is stored. No fetch happens yet.
    pub fn new(client: LandingClient, store: PreferenceStore, default_language: &str) -> Self {
        let language = store
            .language()
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| default_language.to_string());

        let (state, _) = watch::channel(SessionState {
            language,
            bundle: None,
            loading: false,
            error: None,
        });

        Self {
            state,
            store,
            client,
            init_task: Mutex::new(None),
        }
    }

    /// Subscribe to state transitions. The receiver's `changed()` resolves
    /// after every published transition; `borrow_and_update()` pulls the
    /// latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// One-shot copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The active language code
    pub fn language(&self) -> String {
        self.state.borrow().language.clone()
    }

    /// Fetch the full bundle and publish the result.
    ///
    /// Failures land in `SessionState::error`; this never returns an error
    /// because consumers read outcomes from the published state.
    pub async fn initialize(&self) {
        Self::run_initialize(&self.state, &self.client).await;
    }

    /// Run [`initialize`](Self::initialize) on the runtime.
    ///
    /// The spawned work is aborted when the session is dropped, so a response
    /// arriving after teardown is discarded instead of applied.
    pub fn spawn_initialize(&self) {
        let state = self.state.clone();
        let client = self.client.clone();
        let handle = tokio::spawn(async move {
            Self::run_initialize(&state, &client).await;
        });

        let mut slot = self.init_task.lock().expect("init task lock poisoned");
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    async fn run_initialize(state: &watch::Sender<SessionState>, client: &LandingClient) {
        state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match client.fetch_bundle().await {
            Ok(bundle) => {
                info!("Loaded language bundle with {} locale(s)", bundle.len());
                state.send_modify(|s| {
                    if !bundle.contains(&s.language) {
                        warn!("No locale document for active language '{}'", s.language);
                    }
                    s.bundle = Some(bundle);
                    s.loading = false;
                    s.error = None;
                });
            }
            Err(e) => {
                warn!("Failed to load language bundle: {}", e);
                state.send_modify(|s| {
                    s.error = Some(format!("Failed to load language data: {}", e));
                    s.loading = false;
                });
            }
        }
    }

    /// Switch the active language and persist the choice.
    ///
    /// A no-op when `code` is already active: no transition is published and
    /// no durable write happens. The bundle is left untouched; it already
    /// holds every language from the initial fetch. Switching to a code the
    /// bundle does not carry degrades silently: the current document reads as
    /// absent and a diagnostic is logged.
    pub fn change_language(&self, code: &str) {
        if code.is_empty() {
            warn!("Ignoring change to empty language code");
            return;
        }

        let unchanged = self.state.borrow().language == code;
        if unchanged {
            debug!("Language already '{}', nothing to do", code);
            return;
        }

        self.state.send_modify(|s| {
            if let Some(bundle) = &s.bundle {
                if !bundle.contains(code) {
                    warn!("No locale document for language '{}'", code);
                }
            }
            s.language = code.to_string();
        });

        if let Err(e) = self.store.set_language(code) {
            // The in-memory session stays usable even if the disk write fails
            warn!("Failed to persist language preference: {:#}", e);
        }
    }
}

impl Drop for LanguageSession {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.init_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
