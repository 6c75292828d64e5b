// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types for the CRDs the deployment submits.

pub mod certificate;
pub mod ingress_route;

pub use certificate::{Certificate, CertificateSpec};
pub use ingress_route::{IngressRoute, IngressRouteSpec};
