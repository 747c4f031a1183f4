// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM binary encoding detection
//!
//! Spec-compliant detection of WASM binary formats using wasmparser. Used at
//! upload time so that only binaries the engine can run are ever committed.

use super::error::{WasmError, WASM_COMPONENT_UNSUPPORTED, WASM_UNSUPPORTED_ENCODING};
use crate::observability::messages::wasm::ComponentTypeDetected;
use crate::upload::ArtifactValidator;

use wasmparser::{Encoding, Parser, Payload};

/// Kinds of WebAssembly binary.
///
/// Legacy Preview 1 components (version 1 + "component" custom section) are
/// not represented here; they are rejected with an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryKind {
    /// Classic core module (binary version 1, no component section).
    CoreModule,
    /// Component Model binary (binary version 2+).
    Component,
}

impl BinaryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryKind::CoreModule => "core-module",
            BinaryKind::Component => "component",
        }
    }
}

/// Detect the kind of a WebAssembly binary by walking its payloads.
///
/// # Errors
/// * the input is empty, truncated, or otherwise invalid per the WASM spec
/// * a legacy Preview 1 component is detected
pub fn detect_binary_kind(bytes: &[u8]) -> Result<BinaryKind, WasmError> {
    let parser = Parser::new(0);
    let mut encoding = None;
    let mut has_component_section = false;

    for payload in parser.parse_all(bytes) {
        match payload? {
            Payload::Version { encoding: enc, .. } => {
                encoding = Some(enc);
            }
            Payload::CustomSection(reader) if reader.name() == "component" => {
                has_component_section = true;
            }
            _ => {}
        }
    }

    let encoding =
        encoding.ok_or_else(|| WasmError::InvalidWasmBinary("missing version header".to_string()))?;

    let kind = match encoding {
        Encoding::Component => BinaryKind::Component,
        Encoding::Module if has_component_section => {
            return Err(WasmError::UnsupportedEncoding(
                WASM_UNSUPPORTED_ENCODING.to_string(),
            ))
        }
        Encoding::Module => BinaryKind::CoreModule,
    };
    tracing::debug!(
        "{}",
        ComponentTypeDetected {
            component_type: kind.as_str(),
            size_bytes: bytes.len(),
        }
    );
    Ok(kind)
}

/// Upload validator admitting only core modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct WasmArtifactValidator;

impl ArtifactValidator for WasmArtifactValidator {
    fn validate(&self, bytes: &[u8]) -> Result<(), String> {
        match detect_binary_kind(bytes) {
            Ok(BinaryKind::CoreModule) => Ok(()),
            Ok(BinaryKind::Component) => Err(WASM_COMPONENT_UNSUPPORTED.to_string()),
            Err(error) => Err(error.to_string()),
        }
    }
}
