//! Shared application state for Axum routers.

use std::sync::Arc;

use toop_core::GatewayConfig;
use toop_directory::{
    build_http_client, CountryDirectory, DirectoryClient, OrganizationCache, RegistryClient,
};
use toop_gateway::{
    ActivityLog, InboundHandler, MessageTransport, PendingRequestTable, Reply, RequestCorrelator,
};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::transport::ConnectorTransport;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub countries: Arc<CountryDirectory>,
    pub organizations: Arc<OrganizationCache>,
    pub correlator: Arc<RequestCorrelator>,
    pub inbound: Arc<InboundHandler>,
    pub activity: Arc<ActivityLog>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Wire every gateway component around the given upstreams and transport.
    pub fn new(
        config: &GatewayConfig,
        countries: Arc<CountryDirectory>,
        organizations: Arc<OrganizationCache>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        let pending = Arc::new(PendingRequestTable::<Reply>::new());
        let activity = Arc::new(ActivityLog::default());
        let inbound = Arc::new(InboundHandler::new(
            pending.clone(),
            organizations.clone(),
            transport.clone(),
            activity.clone(),
        ));
        let correlator = Arc::new(RequestCorrelator::new(
            countries.clone(),
            transport,
            pending,
            activity.clone(),
            config,
        ));
        Self {
            countries,
            organizations,
            correlator,
            inbound,
            activity,
            start_time: std::time::Instant::now(),
        }
    }

    /// Production wiring: HTTP clients for the directory, the registry and
    /// the connector.
    pub fn from_config(config: &GatewayConfig, api_config: &ApiConfig) -> ApiResult<Self> {
        config.validate()?;
        let client = build_http_client(config.http_timeout)?;

        let directory = DirectoryClient::new(
            client.clone(),
            &config.directory_base_url,
            DirectoryClient::default_document_types(),
        );
        let countries = Arc::new(CountryDirectory::new(
            Arc::new(directory),
            config.reference_ttl,
        ));

        let registry = RegistryClient::new(client.clone(), &config.registry_base_url);
        let organizations = Arc::new(OrganizationCache::new(
            Arc::new(registry),
            config.organization_cache_capacity,
        ));

        let transport = Arc::new(ConnectorTransport::new(client, &api_config.connector_url));
        tracing::info!(
            connector = transport.endpoint(),
            directory = %config.directory_base_url,
            registry = %config.registry_base_url,
            "gateway components configured"
        );

        Ok(Self::new(config, countries, organizations, transport))
    }
}
