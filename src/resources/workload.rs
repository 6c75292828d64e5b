// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The Paperless StatefulSet: web server plus a Redis broker sidecar, with
//! persistent data and media volumes.

use super::{app_labels, namespaced_meta};
use crate::config::ComponentConfig;
use crate::constants::{images, names};
use crate::error::Result;
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use serde_json::json;

const DATA_MOUNT_PATH: &str = "/usr/src/paperless/data";
const MEDIA_MOUNT_PATH: &str = "/usr/src/paperless/media";

pub fn statefulset(
    config: &ComponentConfig,
    config_map_name: &str,
    secret_name: &str,
) -> Result<StatefulSet> {
    let labels = app_labels();
    let paperless = &config.paperless;
    let redis = &config.redis;

    let spec: StatefulSetSpec = serde_json::from_value(json!({
        "replicas": 1,
        "selector": { "matchLabels": labels },
        // no headless service: the pod needs no stable network identity
        "serviceName": "",
        "template": {
            "metadata": { "labels": labels },
            "spec": {
                "containers": [
                    {
                        "name": "webserver",
                        "image": format!("{}:{}", images::PAPERLESS, paperless.version),
                        "ports": [{ "name": "http", "containerPort": paperless.port }],
                        "envFrom": [
                            { "configMapRef": { "name": config_map_name } },
                            { "secretRef": { "name": secret_name } },
                        ],
                        "volumeMounts": [
                            { "name": names::DATA_VOLUME, "mountPath": DATA_MOUNT_PATH },
                            { "name": names::MEDIA_VOLUME, "mountPath": MEDIA_MOUNT_PATH },
                        ],
                    },
                    {
                        "name": "broker",
                        "image": format!("{}:{}", images::REDIS, redis.version),
                        "ports": [{ "name": "redis", "containerPort": redis.port }],
                    },
                ],
            },
        },
        "volumeClaimTemplates": [
            volume_claim(names::DATA_VOLUME, &paperless.storage_class, paperless.data_size_gb),
            volume_claim(names::MEDIA_VOLUME, &paperless.storage_class, paperless.media_size_gb),
        ],
    }))?;

    Ok(StatefulSet {
        metadata: namespaced_meta(names::STATEFUL_SET, &config.service.namespace),
        spec: Some(spec),
        ..Default::default()
    })
}

fn volume_claim(name: &str, storage_class: &str, size_gb: u32) -> serde_json::Value {
    json!({
        "metadata": { "name": name },
        "spec": {
            "storageClassName": storage_class,
            "accessModes": ["ReadWriteOnce"],
            "resources": { "requests": { "storage": format!("{}Gi", size_gb) } },
        },
    })
}
