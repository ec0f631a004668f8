// 租车目录后端库
//
// 本库提供车辆目录网站的后端功能，包括：
// - 筛选与分页核心
// - API 路由
// - 数据库与键值存储
// - 图片上传存储
// - 预订跳转与 SEO 元数据

pub mod api;
pub mod catalog;
pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod store;
