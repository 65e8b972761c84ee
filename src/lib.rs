//! Radar Review - 编程作业抄袭审阅后端服务
//!
//! 基于 Actix Web 构建，根据提交之间的相似度构建学生匹配图，
//! 并汇总人工审阅评分生成嫌疑学生名单。
//!
//! # 架构
//! - `cache`: 匹配图缓存（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 速率限制中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（匹配图构建、审阅状态机、嫌疑名单）
//! - `storage`: 比对存储层（SeaORM / 内存）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
