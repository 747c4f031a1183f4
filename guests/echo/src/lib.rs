// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sample function for the fnhost WASM engine.
//!
//! Build with `cargo build --release --target wasm32-unknown-unknown` and
//! upload `target/wasm32-unknown-unknown/release/fnhost_echo_guest.wasm`.
//! Invoking it returns the payload with `-echo` appended.

/// Transform the payload at `input_ptr` and report the output length.
///
/// # Safety
///
/// The host guarantees that `input_ptr..input_ptr + input_len` was returned
/// by [`allocate`] and holds the payload, and that `output_len_ptr` points at
/// a 4-byte slot from [`allocate`]. The returned buffer is owned by the host,
/// which hands it back through [`deallocate`].
#[no_mangle]
pub unsafe extern "C" fn process(input_ptr: *const u8, input_len: i32, output_len_ptr: *mut i32) -> *mut u8 {
    let input = std::slice::from_raw_parts(input_ptr, input_len as usize);

    let mut output = Vec::with_capacity(input.len() + 5);
    output.extend_from_slice(input);
    output.extend_from_slice(b"-echo");

    let mut boxed = output.into_boxed_slice();
    *output_len_ptr = boxed.len() as i32;
    let ptr = boxed.as_mut_ptr();
    std::mem::forget(boxed);
    ptr
}

/// Reserve `size` bytes of linear memory for the host.
#[no_mangle]
pub extern "C" fn allocate(size: i32) -> *mut u8 {
    let mut buf = Vec::<u8>::with_capacity(size as usize);
    let ptr = buf.as_mut_ptr();
    std::mem::forget(buf);
    ptr
}

/// Release a buffer from [`allocate`] or [`process`].
///
/// # Safety
///
/// `ptr` and `size` must describe a buffer this module handed out.
#[no_mangle]
pub unsafe extern "C" fn deallocate(ptr: *mut u8, size: i32) {
    drop(Vec::from_raw_parts(ptr, 0, size as usize));
}
