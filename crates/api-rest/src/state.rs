use api_shared::ClientRegistry;
use drc_core::sync::EventPublisher;
use drc_core::validators::{
    Fetcher, HttpFetcher, ReferenceValidator, RequiredKeysShapeChecker, ShapeChecker,
};
use drc_core::{
    CoreConfig, DrcResult, InformatieObjectService, RelationService, Store, VerzendingService,
};
use std::sync::Arc;

/// Application state for the REST API server.
///
/// Holds the services shared by all request handlers and the client registry used by the
/// [`Caller`](crate::extract::Caller) extractor.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub clients: Arc<ClientRegistry>,
    pub documents: InformatieObjectService,
    pub verzendingen: VerzendingService,
    pub relations: RelationService,
}

impl AppState {
    /// Builds the services over one store with the given remote-resource capabilities.
    ///
    /// `events` is `None` when relation synchronisation is disabled.
    pub fn new(
        cfg: Arc<CoreConfig>,
        clients: ClientRegistry,
        fetcher: Arc<dyn Fetcher>,
        shapes: Arc<dyn ShapeChecker>,
        events: Option<EventPublisher>,
    ) -> DrcResult<Self> {
        let store = Arc::new(Store::new(cfg.clone())?);
        let references = Arc::new(ReferenceValidator::new(fetcher, shapes));

        Ok(Self {
            cfg,
            clients: Arc::new(clients),
            documents: InformatieObjectService::new(store.clone(), references.clone()),
            verzendingen: VerzendingService::new(store.clone()),
            relations: RelationService::new(store, references, events),
        })
    }

    /// State for a deployment: remote resources are fetched over HTTP.
    pub fn with_http_fetcher(
        cfg: Arc<CoreConfig>,
        clients: ClientRegistry,
        events: Option<EventPublisher>,
    ) -> DrcResult<Self> {
        let fetcher = Arc::new(HttpFetcher::new(cfg.fetch_timeout())?);
        Self::new(
            cfg,
            clients,
            fetcher,
            Arc::new(RequiredKeysShapeChecker),
            events,
        )
    }
}
