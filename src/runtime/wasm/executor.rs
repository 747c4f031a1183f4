// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::error::{WasmError, WasmResult};
use wasmtime::{Engine, Instance, Memory, Module, Store, TypedFunc};

/// Bytes returned by a guest plus the fuel it burned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestOutput {
    pub bytes: Vec<u8>,
    pub fuel_consumed: u64,
}

struct Exports {
    memory: Memory,
    allocate: TypedFunc<i32, i32>,
    deallocate: TypedFunc<(i32, i32), ()>,
    process: TypedFunc<(i32, i32, i32), i32>,
}

/// Runs one call of a C-style core module in a fresh store.
///
/// ABI: the host calls `allocate(len)` for the input and for a 4-byte output
/// length slot, writes the input, then calls `process(in_ptr, in_len,
/// out_len_ptr)`. The guest returns the output pointer and stores the output
/// length little-endian at `out_len_ptr`. The host frees every buffer with
/// `deallocate(ptr, len)`.
pub struct CStyleExecutor<'a> {
    engine: &'a Engine,
    module: &'a Module,
    fuel: u64,
}

impl<'a> CStyleExecutor<'a> {
    pub fn new(engine: &'a Engine, module: &'a Module, fuel: u64) -> Self {
        Self {
            engine,
            module,
            fuel,
        }
    }

    pub fn execute(&self, input: &[u8]) -> WasmResult<GuestOutput> {
        let mut store = Store::new(self.engine, ());
        store
            .set_fuel(self.fuel)
            .map_err(|e| WasmError::EngineError(e.to_string()))?;

        let instance = Instance::new(&mut store, self.module, &[])
            .map_err(|e| WasmError::from_call(e, self.fuel))?;
        let exports = self.exports(&mut store, &instance)?;
        let bytes = self.call_process(&mut store, &exports, input)?;

        let remaining = store.get_fuel().unwrap_or(0);
        Ok(GuestOutput {
            bytes,
            fuel_consumed: self.fuel.saturating_sub(remaining),
        })
    }

    fn exports(&self, store: &mut Store<()>, instance: &Instance) -> WasmResult<Exports> {
        let memory = instance
            .get_memory(&mut *store, "memory")
            .ok_or(WasmError::MissingExport("'memory'"))?;
        let allocate = instance
            .get_typed_func::<i32, i32>(&mut *store, "allocate")
            .map_err(|_| WasmError::MissingExport("'allocate' with signature (i32) -> i32"))?;
        let deallocate = instance
            .get_typed_func::<(i32, i32), ()>(&mut *store, "deallocate")
            .map_err(|_| WasmError::MissingExport("'deallocate' with signature (i32, i32) -> ()"))?;
        let process = instance
            .get_typed_func::<(i32, i32, i32), i32>(&mut *store, "process")
            .map_err(|_| {
                WasmError::MissingExport("'process' with signature (i32, i32, i32) -> i32")
            })?;
        Ok(Exports {
            memory,
            allocate,
            deallocate,
            process,
        })
    }

    fn call_process(
        &self,
        store: &mut Store<()>,
        exports: &Exports,
        input: &[u8],
    ) -> WasmResult<Vec<u8>> {
        let input_len = to_guest_len(input.len())?;

        let input_ptr = self.allocate(store, exports, input_len)?;
        exports
            .memory
            .write(&mut *store, input_ptr as usize, input)
            .map_err(|e| WasmError::MemoryError(format!("failed to write input: {}", e)))?;

        let output_len_ptr = match self.allocate(store, exports, 4) {
            Ok(ptr) => ptr,
            Err(error) => {
                let _ = exports.deallocate.call(&mut *store, (input_ptr, input_len));
                return Err(error);
            }
        };

        let result_ptr = exports
            .process
            .call(&mut *store, (input_ptr, input_len, output_len_ptr))
            .map_err(|e| WasmError::from_call(e, self.fuel))?;
        self.deallocate(store, exports, input_ptr, input_len)?;

        let mut output_len_bytes = [0u8; 4];
        exports
            .memory
            .read(&mut *store, output_len_ptr as usize, &mut output_len_bytes)
            .map_err(|e| WasmError::MemoryError(format!("failed to read output length: {}", e)))?;
        self.deallocate(store, exports, output_len_ptr, 4)?;

        let output_len = i32::from_le_bytes(output_len_bytes);
        if output_len < 0 {
            return Err(WasmError::MemoryError(format!(
                "negative output length {}",
                output_len
            )));
        }
        if output_len == 0 {
            return Ok(Vec::new());
        }
        if result_ptr == 0 {
            return Err(WasmError::MemoryError(
                "process returned a null pointer".to_string(),
            ));
        }

        // The length comes from the guest; bound it by its memory before
        // allocating anything on the host.
        let memory_size = exports.memory.data_size(&*store);
        let in_bounds = (result_ptr as u32 as usize)
            .checked_add(output_len as usize)
            .is_some_and(|end| end <= memory_size);
        if !in_bounds {
            return Err(WasmError::MemoryError(format!(
                "output of {} bytes at {} exceeds guest memory of {} bytes",
                output_len, result_ptr as u32, memory_size
            )));
        }

        let mut output = vec![0u8; output_len as usize];
        exports
            .memory
            .read(&mut *store, result_ptr as usize, &mut output)
            .map_err(|e| WasmError::MemoryError(format!("failed to read output: {}", e)))?;
        self.deallocate(store, exports, result_ptr, output_len)?;

        Ok(output)
    }

    fn allocate(&self, store: &mut Store<()>, exports: &Exports, len: i32) -> WasmResult<i32> {
        let ptr = exports
            .allocate
            .call(&mut *store, len)
            .map_err(|e| WasmError::from_call(e, self.fuel))?;
        if ptr == 0 {
            return Err(WasmError::MemoryError(format!(
                "allocate({}) returned a null pointer",
                len
            )));
        }
        Ok(ptr)
    }

    fn deallocate(
        &self,
        store: &mut Store<()>,
        exports: &Exports,
        ptr: i32,
        len: i32,
    ) -> WasmResult<()> {
        exports
            .deallocate
            .call(&mut *store, (ptr, len))
            .map_err(|e| WasmError::from_call(e, self.fuel))
    }
}

fn to_guest_len(len: usize) -> WasmResult<i32> {
    i32::try_from(len).map_err(|_| WasmError::InputTooLarge {
        size: len,
        max: i32::MAX as usize,
    })
}
