// 访客数与可用性指示
//
// 两个数值都由日期（和车辆 ID）派生的确定性种子计算，
// 同一天内多次请求结果一致。

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

const VISITOR_BASE: u64 = 120;
const VISITOR_SPREAD: u64 = 180;

/// 每辆车每天最多显示的可用数量
const MAX_AVAILABLE_UNITS: u64 = 4;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Availability {
    pub vehicle_id: String,
    pub date: NaiveDate,
    pub available: bool,
    pub units_left: u32,
}

/// 当天访客数
pub fn visitor_count(date: NaiveDate) -> u32 {
    let seed = day_seed(&format!("visitors:{}", date));
    (VISITOR_BASE + seed % VISITOR_SPREAD) as u32
}

/// 车辆在指定日期的可用性
pub fn availability(vehicle_id: &str, date: NaiveDate) -> Availability {
    let seed = day_seed(&format!("availability:{}:{}", vehicle_id, date));
    let units_left = (seed % (MAX_AVAILABLE_UNITS + 1)) as u32;

    Availability {
        vehicle_id: vehicle_id.to_string(),
        date,
        available: units_left > 0,
        units_left,
    }
}

fn day_seed(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
