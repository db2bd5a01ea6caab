//! Simulated photo catalog standing in for a slow database.

use async_trait::async_trait;
use cachet_core::{BackingStoreError, DataSource, Scalar};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize)]
struct Photo {
    id: i64,
    title: String,
    album: i64,
    likes: u64,
}

pub struct PhotoCatalog {
    photos: RwLock<HashMap<i64, Photo>>,
    latency: Duration,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl PhotoCatalog {
    pub fn new(count: i64, latency: Duration) -> Self {
        let photos = (1..=count)
            .map(|id| {
                let photo = Photo {
                    id,
                    title: format!("Photo #{}", id),
                    album: (id - 1) / 10 + 1,
                    likes: 0,
                };
                (id, photo)
            })
            .collect();

        Self {
            photos: RwLock::new(photos),
            latency,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn photo_id(operation_id: &str, args: &[Scalar]) -> Result<i64, BackingStoreError> {
        match args.first() {
            Some(Scalar::Int(id)) => Ok(*id),
            _ => Err(BackingStoreError::new(operation_id, "expected a photo id")),
        }
    }

    fn to_value(operation_id: &str, value: &impl Serialize) -> Result<Value, BackingStoreError> {
        serde_json::to_value(value).map_err(|e| BackingStoreError::new(operation_id, e.to_string()))
    }
}

#[async_trait]
impl DataSource for PhotoCatalog {
    async fn fetch(
        &self,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Option<Value>, BackingStoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.latency).await;

        match operation_id {
            "photoDetail" => {
                let id = Self::photo_id(operation_id, args)?;
                let photos = self.photos.read().await;
                photos
                    .get(&id)
                    .map(|photo| Self::to_value(operation_id, photo))
                    .transpose()
            }
            "albumPhotos" => {
                let album = Self::photo_id(operation_id, args)?;
                let photos = self.photos.read().await;
                let mut ids: Vec<i64> = photos
                    .values()
                    .filter(|photo| photo.album == album)
                    .map(|photo| photo.id)
                    .collect();
                if ids.is_empty() {
                    return Ok(None);
                }
                ids.sort_unstable();
                Self::to_value(operation_id, &ids).map(Some)
            }
            _ => Err(BackingStoreError::new(operation_id, "unknown operation")),
        }
    }

    async fn mutate(&self, operation_id: &str, args: &[Scalar]) -> Result<Value, BackingStoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.latency).await;

        match operation_id {
            "likePhoto" => {
                let id = Self::photo_id(operation_id, args)?;
                let mut photos = self.photos.write().await;
                let photo = photos
                    .get_mut(&id)
                    .ok_or_else(|| BackingStoreError::new(operation_id, "photo not found"))?;
                photo.likes += 1;
                Self::to_value(operation_id, photo)
            }
            _ => Err(BackingStoreError::new(operation_id, "unknown operation")),
        }
    }
}
