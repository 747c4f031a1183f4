// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::errors::{ConfigError, StoreError};
use crate::gateway::InvocationGateway;
use crate::mediator::{BindingTable, MediatorBridge, MediatorSettings};
use crate::registry::FunctionRegistry;
use crate::runtime::wasm::{WasmArtifactValidator, WasmResult, WasmRuntimeEngine};
use crate::store::{ArtifactStore, FunctionRecord};
use crate::traits::RuntimeEngine;
use crate::upload::UploadCoordinator;
use std::sync::Arc;

/// Every core component, wired over one shared artifact store.
#[derive(Clone, Debug)]
pub struct Host {
    pub store: Arc<ArtifactStore>,
    pub coordinator: UploadCoordinator,
    pub registry: FunctionRegistry,
    pub gateway: InvocationGateway,
    pub bridge: MediatorBridge,
}

impl Host {
    /// Remove a function and its invocation counters.
    pub async fn unload(&self, name: &str) -> Result<FunctionRecord, StoreError> {
        let record = self.coordinator.unload(name).await?;
        self.gateway.stats().forget(name).await;
        Ok(record)
    }
}

/// Host builder - wires store, upload coordinator, registry, gateway and
/// mediator bridge from configuration.
///
/// # Examples
/// ```
/// use fnhost::config::{Config, HostBuilder};
///
/// let config = Config::default();
/// let engine = HostBuilder::wasm_engine(&config).unwrap();
/// let host = HostBuilder::from_config(&config, std::sync::Arc::new(engine)).unwrap();
///
/// assert_eq!(host.gateway.default_deadline().as_secs(), 120);
/// ```
pub struct HostBuilder;

impl HostBuilder {
    /// Build the host around `engine`.
    ///
    /// # Errors
    /// `ConfigError::Invalid` when the topic bindings do not form a valid table.
    pub fn from_config(cfg: &Config, engine: Arc<dyn RuntimeEngine>) -> Result<Host, ConfigError> {
        let bindings = BindingTable::new(&cfg.mediator.bindings).map_err(ConfigError::Invalid)?;

        let store = Arc::new(ArtifactStore::new());
        let mut coordinator = UploadCoordinator::new(store.clone(), cfg.upload.get_max_chunk_bytes());
        if cfg.upload.get_require_wasm() {
            coordinator = coordinator.with_validator(Arc::new(WasmArtifactValidator));
        }

        let registry = FunctionRegistry::new(store.clone());
        let gateway = InvocationGateway::new(registry.clone(), engine, cfg.invocation.get_timeout());
        let bridge = MediatorBridge::new(
            gateway.clone(),
            bindings,
            MediatorSettings {
                reorder_window: cfg.mediator.get_reorder_window(),
                max_in_flight: cfg.mediator.get_max_in_flight(),
                invocation_timeout: None,
            },
        );

        Ok(Host {
            store,
            coordinator,
            registry,
            gateway,
            bridge,
        })
    }

    /// WASM engine configured from the `wasm` section.
    pub fn wasm_engine(cfg: &Config) -> WasmResult<WasmRuntimeEngine> {
        WasmRuntimeEngine::new(cfg.wasm.fuel.effective(), cfg.wasm.get_max_input_bytes())
    }
}
