// 图片上传任务
//
// 上传请求先做快速校验，然后在后台任务中完成转换和保存，
// 客户端按任务 ID 轮询状态。

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::database::vehicle_repository::UploadedImage;
use crate::models::OperationState;
use crate::services::storage::{StorageError, StorageService};

/// 任务状态保留时间（从最后一次写入算起）
const JOB_TTL: Duration = Duration::from_secs(30 * 60);
const MAX_TRACKED_JOBS: u64 = 10_000;

pub type UploadState = OperationState<UploadedImage>;

pub struct UploadJobs {
    storage: Arc<StorageService>,
    jobs: Cache<String, UploadState>,
}

impl UploadJobs {
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self::with_ttl(storage, JOB_TTL)
    }

    pub fn with_ttl(storage: Arc<StorageService>, ttl: Duration) -> Self {
        Self {
            storage,
            jobs: Cache::builder()
                .max_capacity(MAX_TRACKED_JOBS)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn storage(&self) -> &Arc<StorageService> {
        &self.storage
    }

    /// 启动上传任务，返回任务 ID
    ///
    /// 大小和格式错误在这里直接返回，不会创建任务。
    pub async fn start(
        self: &Arc<Self>,
        data: Vec<u8>,
        original_name: Option<String>,
    ) -> Result<String, StorageError> {
        self.storage.precheck(&data)?;

        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs.insert(job_id.clone(), OperationState::Loading).await;

        tracing::info!("Upload job {} started ({} bytes)", job_id, data.len());

        let this = Arc::clone(self);
        let id = job_id.clone();
        tokio::spawn(async move {
            let result = this.storage.store_image(data, original_name).await;
            if let Err(ref e) = result {
                tracing::error!("Upload job {} failed: {}", id, e);
            }
            this.jobs.insert(id, OperationState::from_result(result)).await;
        });

        Ok(job_id)
    }

    pub async fn status(&self, job_id: &str) -> Option<UploadState> {
        self.jobs.get(job_id).await
    }
}
