use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use serde::Serialize;

use crate::catalog::{
    FilterCriteria, FilterState, PageToken, PaginationController, PriceRange, SortOption,
    PAGE_SIZE_OPTIONS,
};
use crate::database::vehicle_repository::FilterOptions;
use crate::database::VehicleRepository;
use crate::models::{Vehicle, VehicleKind, VehicleResponse};
use crate::services::storage::resolve_image;

/// 车队快照缓存时间
const SNAPSHOT_TTL: Duration = Duration::from_secs(60);

/// 列表查询条件（已完成解析）
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub kind: Option<VehicleKind>,
    pub search_text: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub year: Option<i32>,
    pub category: Option<String>,
    pub sort: SortOption,
    pub page: usize,
    pub per_page: usize,
}

/// 一页车辆数据
#[derive(Debug, Serialize)]
pub struct CatalogPage<T = VehicleResponse> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub page_window: Vec<PageToken>,
    pub active_filter_count: usize,
    pub page_size_options: Vec<usize>,
    pub filters: FilterCriteria,
}

impl<T> CatalogPage<T> {
    /// 转换条目，分页信息保持不变
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> CatalogPage<U> {
        CatalogPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
            page_window: self.page_window,
            active_filter_count: self.active_filter_count,
            page_size_options: self.page_size_options,
            filters: self.filters,
        }
    }
}

/// 筛选栏数据
#[derive(Debug, Serialize)]
pub struct CatalogFilterOptions {
    #[serde(flatten)]
    pub options: FilterOptions,
    pub sort_options: Vec<&'static str>,
    pub page_size_options: Vec<usize>,
}

/// 目录服务：车队快照缓存 + 筛选分页
pub struct CatalogService {
    repository: Arc<dyn VehicleRepository>,
    snapshots: Cache<String, Arc<Vec<Vehicle>>>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn VehicleRepository>) -> Self {
        Self {
            repository,
            snapshots: Cache::builder()
                .max_capacity(8)
                .time_to_live(SNAPSHOT_TTL)
                .build(),
        }
    }

    /// 指定类型的车队快照，按热度排序
    pub async fn fleet(&self, kind: Option<VehicleKind>) -> Result<Arc<Vec<Vehicle>>> {
        let key = kind.map(|k| k.to_string()).unwrap_or_else(|| "all".to_string());
        let repository = self.repository.clone();

        self.snapshots
            .try_get_with(key, async move {
                let vehicles = repository.list_vehicles(kind).await?;
                tracing::debug!("Loaded fleet snapshot with {} vehicles", vehicles.len());
                Ok::<_, anyhow::Error>(Arc::new(vehicles))
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load fleet: {}", e))
    }

    /// 筛选并分页
    pub async fn list_page(&self, query: &CatalogQuery) -> Result<CatalogPage> {
        let fleet = self.fleet(query.kind).await?;

        let mut filter = FilterState::new(PriceRange::observed(fleet.as_slice()));
        if let Some(ref text) = query.search_text {
            filter.set_search_text(text.trim());
        }
        if query.price_min.is_some() || query.price_max.is_some() {
            let defaults = filter.default_price_range();
            filter.set_price_range(
                query.price_min.unwrap_or(defaults.min),
                query.price_max.unwrap_or(defaults.max),
            );
        }
        filter.set_year(query.year);
        filter.set_category(query.category.clone());
        filter.set_sort(query.sort);

        let matched = filter.apply(fleet.as_slice());
        let pagination = PaginationController::with_options(matched.len(), query.per_page, query.page);

        let items = pagination
            .paginated_items(&matched)
            .iter()
            .cloned()
            .map(to_response)
            .collect();

        Ok(CatalogPage {
            items,
            total: pagination.total_items(),
            page: pagination.current_page(),
            per_page: pagination.items_per_page(),
            total_pages: pagination.total_pages(),
            has_next: pagination.can_go_next(),
            has_previous: pagination.can_go_previous(),
            page_window: pagination.page_window(),
            active_filter_count: filter.active_filter_count(),
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            filters: filter.criteria().clone(),
        })
    }

    pub async fn filter_options(&self, kind: Option<VehicleKind>) -> Result<CatalogFilterOptions> {
        let options = self.repository.filter_options(kind).await?;
        Ok(CatalogFilterOptions {
            options,
            sort_options: SortOption::ALL.iter().map(SortOption::as_str).collect(),
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
        })
    }

    pub async fn get_vehicle(&self, id_or_slug: &str) -> Result<Option<Vehicle>> {
        self.repository.get_vehicle(id_or_slug).await
    }

    pub async fn create_vehicle(&self, vehicle: Vehicle) -> Result<Vehicle> {
        self.repository.insert_vehicle(&vehicle).await?;
        self.snapshots.invalidate_all();
        tracing::info!("Created vehicle {} ({})", vehicle.display_name(), vehicle.id);
        Ok(vehicle)
    }

    pub async fn delete_vehicle(&self, id: &str) -> Result<bool> {
        let deleted = self.repository.delete_vehicle(id).await?;
        if deleted {
            self.snapshots.invalidate_all();
        }
        Ok(deleted)
    }

    pub async fn set_vehicle_image(&self, id: &str, image_url: &str) -> Result<bool> {
        let updated = self.repository.set_vehicle_image(id, image_url).await?;
        if updated {
            self.snapshots.invalidate_all();
        }
        Ok(updated)
    }
}

/// 转换为对外数据，图片按回退规则解析
pub fn to_response(vehicle: Vehicle) -> VehicleResponse {
    let gallery = vehicle.get_gallery().unwrap_or_default();
    let image = resolve_image(vehicle.image_url.as_deref(), &gallery);
    VehicleResponse::new(vehicle, image)
}
