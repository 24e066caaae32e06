//! Bare distro image resolution for `create instance distro=...`.
//!
//! A query reads `owner[:distro[:variant[:arch[:virt[:store]]]]]`. Only the
//! owner is mandatory; empty segments take the platform or global default.
//! Resolved images are cached process-wide per canonical query string.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use crate::api::{DescribeImagesInput, Ec2Api, Filter};

pub const QUERY_FORMAT: &str = "owner:distro:variant:arch:virtualization:store";

const ARCHS: &[&str] = &["i386", "x86_64"];
const VIRTS: &[&str] = &["paravirtual", "hvm"];
const STORES: &[&str] = &["ebs", "instance-store"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub name: &'static str,
    pub owner_id: &'static str,
    pub distro: &'static str,
    pub latest_variant: &'static str,
}

pub const PLATFORMS: &[Platform] = &[
    Platform {
        name: "amazonlinux",
        owner_id: "137112412989",
        distro: "amzn",
        latest_variant: "hvm",
    },
    Platform {
        name: "canonical",
        owner_id: "099720109477",
        distro: "ubuntu",
        latest_variant: "xenial",
    },
    Platform {
        name: "centos",
        owner_id: "679593333241",
        distro: "centos",
        latest_variant: "7",
    },
    Platform {
        name: "debian",
        owner_id: "379101102735",
        distro: "debian",
        latest_variant: "stretch",
    },
    Platform {
        name: "redhat",
        owner_id: "309956199498",
        distro: "rhel",
        latest_variant: "7.5",
    },
];

pub fn supported_owners() -> Vec<&'static str> {
    PLATFORMS.iter().map(|p| p.name).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub platform: Platform,
    pub distro: String,
    pub variant: String,
    pub arch: String,
    pub virt: String,
    pub store: String,
}

impl fmt::Display for ImageQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.platform.name, self.distro, self.variant, self.arch, self.virt, self.store
        )
    }
}

impl ImageQuery {
    pub fn parse(s: &str) -> Result<ImageQuery, String> {
        let parts: Vec<String> = s.split(':').map(|p| p.trim().to_lowercase()).collect();
        if parts.len() > 6 {
            return Err(format!(
                "malformed image query '{}': too many tokens, expecting format: {}",
                s, QUERY_FORMAT
            ));
        }
        let platform = PLATFORMS
            .iter()
            .find(|p| p.name == parts[0])
            .copied()
            .ok_or_else(|| {
                format!(
                    "unsupported owner '{}'. Expecting: {}",
                    parts[0],
                    supported_owners().join(", ")
                )
            })?;

        let segment = |i: usize| parts.get(i).filter(|p| !p.is_empty()).cloned();
        let checked = |i: usize, what: &str, valid: &[&str], default: &str| match segment(i) {
            Some(v) if valid.contains(&v.as_str()) => Ok(v),
            Some(v) => Err(format!(
                "image query: invalid {} '{}' (expecting: {})",
                what,
                v,
                valid.join(", ")
            )),
            None => Ok(default.to_string()),
        };

        Ok(ImageQuery {
            platform,
            distro: segment(1).unwrap_or_else(|| platform.distro.to_string()),
            variant: segment(2).unwrap_or_else(|| platform.latest_variant.to_string()),
            arch: checked(3, "architecture", ARCHS, "x86_64")?,
            virt: checked(4, "virtualization", VIRTS, "hvm")?,
            store: checked(5, "store", STORES, "ebs")?,
        })
    }

    /// Whether a lower-cased image name belongs to this query's distro.
    pub fn matches(&self, name: &str) -> bool {
        let (d, v) = (&self.distro, &self.variant);
        match self.platform.name {
            "canonical" => name.starts_with(&format!("{d}/images/{}-ssd/{d}-{v}", self.virt)),
            "redhat" => name.contains(&format!("{d}-{v}")),
            "centos" => name.starts_with(&format!("{d} linux {v}")),
            "amazonlinux" => name.starts_with(&format!("{d}-ami-{v}")),
            _ => name.starts_with(&format!("{d}-{v}")),
        }
    }

    fn filters(&self) -> Vec<Filter> {
        vec![
            Filter::new("state", &["available"]),
            Filter::new("is-public", &["true"]),
            Filter::new("owner-id", &[self.platform.owner_id]),
            Filter::new("virtualization-type", &[&self.virt]),
            Filter::new("architecture", &[&self.arch]),
            Filter::new("root-device-type", &[&self.store]),
        ]
    }
}

// ──────────────────────────────────────────────
// Resolution
// ──────────────────────────────────────────────

fn cache() -> &'static Mutex<BTreeMap<String, Vec<String>>> {
    static CACHE: OnceLock<Mutex<BTreeMap<String, Vec<String>>>> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Pre-seed the cache for `query` with image ids, most recent first.
pub fn seed_cache(query: &ImageQuery, image_ids: &[&str]) {
    cache()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(
            query.to_string(),
            image_ids.iter().map(|s| s.to_string()).collect(),
        );
}

/// Image ids matching `query`, most recent first, and whether they came
/// from the cache.
pub async fn resolve(api: &dyn Ec2Api, query: &ImageQuery) -> Result<(Vec<String>, bool), String> {
    let key = query.to_string();
    if let Some(ids) = cache().lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
        return Ok((ids.clone(), true));
    }

    let out = api
        .describe_images(DescribeImagesInput {
            executable_users: vec!["all".to_string()],
            filters: query.filters(),
            ..Default::default()
        })
        .await
        .map_err(|e| e.to_string())?;

    let mut found: Vec<(Option<OffsetDateTime>, String)> = out
        .images
        .into_iter()
        .filter(|img| query.matches(&img.name.to_lowercase()))
        .map(|img| (OffsetDateTime::parse(&img.creation_date, &Rfc3339).ok(), img.image_id))
        .collect();
    found.sort_by(|a, b| b.0.cmp(&a.0));

    let ids: Vec<String> = found.into_iter().map(|(_, id)| id).collect();
    cache()
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(key, ids.clone());
    Ok((ids, false))
}

/// Resolve `distro` to a single image id.
pub async fn resolve_distro(api: &dyn Ec2Api, distro: &str) -> Result<String, String> {
    let query = ImageQuery::parse(distro).map_err(|e| format!("distro: {}", e))?;
    let (ids, cached) = resolve(api, &query)
        .await
        .map_err(|e| format!("distro: {}", e))?;
    let id = ids
        .into_iter()
        .next()
        .ok_or_else(|| format!("distro: no image id found for query '{}'", query))?;
    info!(image = %id, distro, query = %query, cached, "image resolved");
    Ok(id)
}
