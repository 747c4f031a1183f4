// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

// Generated by tonic-build from proto/fnhost.proto
tonic::include_proto!("fnhost.v1");
