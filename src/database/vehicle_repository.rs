use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Pool, Sqlite};
use anyhow::Result;

use crate::models::{Vehicle, VehicleKind};

/// 已上传图片记录
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UploadedImage {
    pub id: String,
    pub storage_path: String,
    pub public_url: String,
    pub content_hash: String,
    pub original_name: Option<String>,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// 筛选选项（用于渲染筛选栏）
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub price_min: i64,
    pub price_max: i64,
    pub years: Vec<i32>,
    pub classes: Vec<String>,
}

/// 车辆仓库接口
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn list_vehicles(&self, kind: Option<VehicleKind>) -> Result<Vec<Vehicle>>;
    async fn get_vehicle(&self, id_or_slug: &str) -> Result<Option<Vehicle>>;
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<()>;
    async fn delete_vehicle(&self, id: &str) -> Result<bool>;
    async fn set_vehicle_image(&self, id: &str, image_url: &str) -> Result<bool>;
    async fn filter_options(&self, kind: Option<VehicleKind>) -> Result<FilterOptions>;

    // 图片上传记录
    async fn insert_image(&self, image: &UploadedImage) -> Result<()>;
    async fn get_image(&self, id: &str) -> Result<Option<UploadedImage>>;
    async fn find_image_by_hash(&self, content_hash: &str) -> Result<Option<UploadedImage>>;
}

/// SQLite 车辆仓库实现
#[derive(Clone)]
pub struct SqliteVehicleRepository {
    pool: Pool<Sqlite>,
}

impl SqliteVehicleRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for SqliteVehicleRepository {
    async fn list_vehicles(&self, kind: Option<VehicleKind>) -> Result<Vec<Vehicle>> {
        let vehicles = match kind {
            Some(kind) => {
                sqlx::query_as::<_, Vehicle>(
                    "SELECT * FROM vehicles WHERE kind = ? ORDER BY popularity DESC, created_at ASC"
                )
                .bind(kind.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Vehicle>(
                    "SELECT * FROM vehicles ORDER BY popularity DESC, created_at ASC"
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(vehicles)
    }

    async fn get_vehicle(&self, id_or_slug: &str) -> Result<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = ? OR slug = ? LIMIT 1"
        )
        .bind(id_or_slug)
        .bind(id_or_slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, slug, kind, brand, model, year, vehicle_class, price_per_day, seats,
                transmission, fuel, image_url, gallery, description, popularity,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&vehicle.id)
        .bind(&vehicle.slug)
        .bind(&vehicle.kind)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.vehicle_class)
        .bind(vehicle.price_per_day)
        .bind(vehicle.seats)
        .bind(&vehicle.transmission)
        .bind(&vehicle.fuel)
        .bind(&vehicle.image_url)
        .bind(&vehicle.gallery)
        .bind(&vehicle.description)
        .bind(vehicle.popularity)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_vehicle(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_vehicle_image(&self, id: &str, image_url: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE vehicles SET image_url = ?, updated_at = ? WHERE id = ?")
            .bind(image_url)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn filter_options(&self, kind: Option<VehicleKind>) -> Result<FilterOptions> {
        let kind = kind.map(|k| k.to_string());

        let (price_min, price_max): (Option<i64>, Option<i64>) = sqlx::query_as(
            "SELECT MIN(price_per_day), MAX(price_per_day) FROM vehicles WHERE (? IS NULL OR kind = ?)"
        )
        .bind(&kind)
        .bind(&kind)
        .fetch_one(&self.pool)
        .await?;

        let years: Vec<i32> = sqlx::query_scalar(
            "SELECT DISTINCT year FROM vehicles WHERE (? IS NULL OR kind = ?) ORDER BY year DESC"
        )
        .bind(&kind)
        .bind(&kind)
        .fetch_all(&self.pool)
        .await?;

        let classes: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT vehicle_class FROM vehicles WHERE (? IS NULL OR kind = ?) ORDER BY vehicle_class"
        )
        .bind(&kind)
        .bind(&kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(FilterOptions {
            price_min: price_min.unwrap_or(0),
            price_max: price_max.unwrap_or(0),
            years,
            classes,
        })
    }

    async fn insert_image(&self, image: &UploadedImage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO uploaded_images (id, storage_path, public_url, content_hash, original_name, size_bytes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&image.id)
        .bind(&image.storage_path)
        .bind(&image.public_url)
        .bind(&image.content_hash)
        .bind(&image.original_name)
        .bind(image.size_bytes)
        .bind(image.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_image(&self, id: &str) -> Result<Option<UploadedImage>> {
        let image = sqlx::query_as::<_, UploadedImage>("SELECT * FROM uploaded_images WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(image)
    }

    async fn find_image_by_hash(&self, content_hash: &str) -> Result<Option<UploadedImage>> {
        let image = sqlx::query_as::<_, UploadedImage>(
            "SELECT * FROM uploaded_images WHERE content_hash = ? LIMIT 1"
        )
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }
}
