// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::error::{WasmError, WasmResult};
use super::executor::{CStyleExecutor, GuestOutput};
use crate::errors::EngineError;
use crate::gateway::InvocationReply;
use crate::observability::messages::wasm::{
    EngineCreated, ExecutionCompleted, ExecutionFailed, ExecutionStarted, ModuleCompileFailed,
    ModuleCompiled,
};
use crate::store::Artifact;
use crate::traits::RuntimeEngine;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use wasmtime::{Config, Engine, Module};

/// Runtime engine for C-style core WebAssembly modules.
///
/// Compiled modules are cached by artifact digest, so re-uploading identical
/// bytes under another name reuses the compiled code. Every call runs in a
/// fresh store on the blocking pool with a fixed fuel budget; fuel is what
/// bounds a call whose future has already been dropped by a deadline.
#[derive(Clone)]
pub struct WasmRuntimeEngine {
    engine: Engine,
    // TODO: evict entries when the last function using a digest is unloaded.
    modules: Arc<RwLock<HashMap<String, Module>>>,
    fuel: u64,
    max_input_bytes: usize,
}

impl WasmRuntimeEngine {
    pub fn new(fuel: u64, max_input_bytes: usize) -> WasmResult<Self> {
        let engine = create_engine()?;
        tracing::info!(
            "{}",
            EngineCreated {
                fuel_level: fuel,
                max_input_bytes,
            }
        );
        Ok(Self {
            engine,
            modules: Arc::new(RwLock::new(HashMap::new())),
            fuel,
            max_input_bytes,
        })
    }

    pub fn fuel(&self) -> u64 {
        self.fuel
    }

    pub fn cached_modules(&self) -> usize {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Compiled module for `artifact`, from the cache when possible.
    pub fn compile(&self, artifact: &Artifact) -> WasmResult<Module> {
        if let Some(module) = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(artifact.digest())
        {
            return Ok(module.clone());
        }

        let start = Instant::now();
        let module = Module::new(&self.engine, artifact.bytes()).map_err(|e| {
            let error = WasmError::ModuleError(e.to_string());
            tracing::error!(
                "{}",
                ModuleCompileFailed {
                    digest: artifact.digest(),
                    error: &error,
                }
            );
            error
        })?;
        tracing::info!(
            "{}",
            ModuleCompiled {
                digest: artifact.digest(),
                size_bytes: artifact.len(),
                duration: start.elapsed(),
            }
        );

        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(artifact.digest().to_string(), module.clone());
        Ok(module)
    }

    /// Compile if needed and run one call synchronously.
    pub fn run(&self, artifact: &Artifact, input: &[u8]) -> WasmResult<GuestOutput> {
        if input.len() > self.max_input_bytes {
            return Err(WasmError::InputTooLarge {
                size: input.len(),
                max: self.max_input_bytes,
            });
        }
        let module = self.compile(artifact)?;
        tracing::debug!(
            "{}",
            ExecutionStarted {
                digest: artifact.digest(),
                input_size: input.len(),
                fuel_level: self.fuel,
            }
        );
        let output = CStyleExecutor::new(&self.engine, &module, self.fuel).execute(input)?;
        tracing::debug!(
            "{}",
            ExecutionCompleted {
                digest: artifact.digest(),
                input_size: input.len(),
                output_size: output.bytes.len(),
                fuel_consumed: output.fuel_consumed,
            }
        );
        Ok(output)
    }
}

fn create_engine() -> WasmResult<Engine> {
    let mut config = Config::new();
    config.wasm_threads(false);
    config.wasm_multi_memory(false);
    config.wasm_memory64(false);
    config.wasm_component_model(false);
    config.consume_fuel(true);
    // Epoch interruption would trap guests independently of fuel.
    config.epoch_interruption(false);

    Engine::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
}

#[async_trait]
impl RuntimeEngine for WasmRuntimeEngine {
    async fn execute(
        &self,
        artifact: &Artifact,
        payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        let engine = self.clone();
        let task_artifact = artifact.clone();
        let outcome = tokio::task::spawn_blocking(move || engine.run(&task_artifact, &payload))
            .await
            .map_err(|e| EngineError::new(format!("WASM worker failed: {}", e)))?;

        match outcome {
            Ok(output) => Ok(InvocationReply::ok(output.bytes)),
            Err(error) => match error.result_code() {
                Some(code) => {
                    tracing::error!(
                        "{}",
                        ExecutionFailed {
                            digest: artifact.digest(),
                            code,
                            error: &error,
                        }
                    );
                    Ok(InvocationReply::new(code, error.to_string().into_bytes()))
                }
                None => Err(EngineError::new(error.to_string())),
            },
        }
    }

    fn name(&self) -> &'static str {
        "wasm"
    }
}

impl std::fmt::Debug for WasmRuntimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmRuntimeEngine")
            .field("fuel", &self.fuel)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("cached_modules", &self.cached_modules())
            .finish()
    }
}
