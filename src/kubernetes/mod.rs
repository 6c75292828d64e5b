// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for cluster binding, CRD discovery, server-side apply
//! and ingress address lookup.

pub mod apply;
pub mod client;
pub mod crd;
pub mod load_balancer;

pub use apply::apply_state;
pub use client::bind_cluster;
pub use crd::ensure_crds_served;
pub use load_balancer::ingress_ipv4;
