//! 匹配图缓存
//!
//! 以 (课程, 规范化阈值) 为键缓存匹配图，没有 TTL，只在显式失效或容量淘汰时移除。
//!
//! - 同一个键的并发未命中只会触发一次构建，其余请求等待并共享结果或错误
//! - 构建失败不会写入缓存，也不会覆盖已有条目
//! - 每个课程维护一个代数，失效时代数加一；失效前已经开始的构建只会写入旧代的键，
//!   之后不会再被读到
//! - 构建在独立任务中运行，等待超时只放弃本次等待，构建完成后照常写入缓存

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use moka::future::Cache;
use tracing::{debug, info, warn};

use crate::config::GraphCacheConfig;
use crate::errors::{RadarError, Result};
use crate::models::graph::{entities::MatchGraph, threshold::SimilarityThreshold};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GraphCacheKey {
    course_id: i64,
    generation: u64,
    threshold: SimilarityThreshold,
}

pub struct GraphCache {
    entries: Cache<GraphCacheKey, Arc<MatchGraph>>,
    generations: DashMap<i64, u64>,
    wait_timeout: Duration,
}

impl GraphCache {
    pub fn new(max_capacity: u64, wait_timeout: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .support_invalidation_closures()
            .build();

        debug!(
            "GraphCache initialized with max capacity: {}, build wait timeout: {:?}",
            max_capacity, wait_timeout
        );
        Self {
            entries,
            generations: DashMap::new(),
            wait_timeout,
        }
    }

    pub fn from_config(config: &GraphCacheConfig) -> Self {
        Self::new(
            config.max_capacity,
            Duration::from_millis(config.build_timeout_ms),
        )
    }

    /// 课程当前的缓存代数
    pub fn generation(&self, course_id: i64) -> u64 {
        self.generations
            .get(&course_id)
            .map(|g| *g)
            .unwrap_or(0)
    }

    /// 返回缓存的匹配图，未命中时调用 `build` 构建并缓存
    pub async fn get_or_build<F, Fut>(
        &self,
        course_id: i64,
        threshold: SimilarityThreshold,
        build: F,
    ) -> Result<Arc<MatchGraph>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MatchGraph>> + Send + 'static,
    {
        let key = GraphCacheKey {
            course_id,
            generation: self.generation(course_id),
            threshold,
        };

        let build = build();
        let init = async move {
            debug!(
                "Graph cache miss for course {} at threshold {}, building",
                course_id, threshold
            );
            build.await.map(Arc::new)
        };

        // 调用方被取消或超时不会中断构建
        let entries = self.entries.clone();
        let lookup = tokio::spawn(async move { entries.try_get_with(key, init).await });

        match tokio::time::timeout(self.wait_timeout, lookup).await {
            Ok(Ok(Ok(graph))) => Ok(graph),
            Ok(Ok(Err(err))) => {
                warn!(
                    "Graph build for course {} at threshold {} failed: {}",
                    course_id, threshold, err
                );
                Err((*err).clone())
            }
            Ok(Err(join_err)) => Err(RadarError::store_unavailable(format!(
                "匹配图构建任务异常退出: {join_err}"
            ))),
            Err(_) => Err(RadarError::concurrency_timeout(format!(
                "匹配图构建超过 {} ms 未完成",
                self.wait_timeout.as_millis()
            ))),
        }
    }

    /// 使课程的全部缓存图失效，不区分阈值
    pub fn invalidate(&self, course_id: i64) {
        let generation = {
            let mut entry = self.generations.entry(course_id).or_insert(0);
            *entry += 1;
            *entry
        };

        // 旧代的键已不可达，这里只是尽早释放内存
        if let Err(e) = self
            .entries
            .invalidate_entries_if(move |key, _| key.course_id == course_id)
        {
            warn!("Failed to evict stale graphs of course {}: {}", course_id, e);
        }

        info!(
            "Graph cache invalidated for course {} (generation {})",
            course_id, generation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> GraphCache {
        GraphCache::new(100, Duration::from_secs(5))
    }

    fn threshold(raw: &str) -> SimilarityThreshold {
        SimilarityThreshold::parse(raw).unwrap()
    }

    async fn counted_build(
        counter: Arc<AtomicUsize>,
        course_key: &'static str,
        t: SimilarityThreshold,
    ) -> Result<MatchGraph> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(MatchGraph::empty(course_key, t.value()))
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let cache = cache();
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let first = cache
            .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
            .await
            .unwrap();
        let second = cache
            .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
            .await
            .unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_equivalent_thresholds_share_entry() {
        let cache = cache();
        let builds = Arc::new(AtomicUsize::new(0));

        for raw in ["0.70", "0.7", "0.7000"] {
            let t = threshold(raw);
            cache
                .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
                .await
                .unwrap();
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild_for_every_threshold() {
        let cache = cache();
        let builds = Arc::new(AtomicUsize::new(0));
        let thresholds = [threshold("0.2"), threshold("0.5"), threshold("0.9")];

        for t in thresholds {
            cache
                .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
                .await
                .unwrap();
        }
        assert_eq!(builds.load(Ordering::SeqCst), 3);

        cache.invalidate(1);

        for t in thresholds {
            cache
                .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
                .await
                .unwrap();
        }
        assert_eq!(builds.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_invalidate_is_scoped_to_course() {
        let cache = cache();
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        cache
            .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
            .await
            .unwrap();
        cache
            .get_or_build(2, t, || counted_build(builds.clone(), "y", t))
            .await
            .unwrap();

        cache.invalidate(1);

        cache
            .get_or_build(2, t, || counted_build(builds.clone(), "y", t))
            .await
            .unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(cache.generation(1), 1);
        assert_eq!(cache.generation(2), 0);
    }

    #[tokio::test]
    async fn test_failed_build_is_not_cached() {
        let cache = cache();
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let err = cache
            .get_or_build(1, t, || async {
                Err(RadarError::store_unavailable("database is down"))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RadarError::StoreUnavailable(_)));

        cache
            .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
            .await
            .unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_good_entry() {
        let cache = cache();
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let good = cache
            .get_or_build(1, t, || counted_build(builds.clone(), "x", t))
            .await
            .unwrap();

        // 命中时构建不会执行，失败的构建没有机会覆盖已有条目
        let again = cache
            .get_or_build(1, t, || async {
                Err(RadarError::store_unavailable("database is down"))
            })
            .await
            .unwrap();
        assert_eq!(good, again);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_build_once() {
        let cache = Arc::new(cache());
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let builds = builds.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(1, t, || async move {
                        builds.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(MatchGraph::empty("x", t.value()))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiters_share_build_failure() {
        let cache = Arc::new(cache());
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let builds = builds.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(1, t, || async move {
                        builds.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(RadarError::store_unavailable("database is down"))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_build_times_out() {
        let cache = GraphCache::new(100, Duration::from_millis(20));
        let t = threshold("0.5");

        let err = cache
            .get_or_build(1, t, || async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(MatchGraph::empty("x", t.value()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RadarError::ConcurrencyTimeout(_)));
    }

    #[tokio::test]
    async fn test_timed_out_build_still_fills_cache() {
        let cache = GraphCache::new(100, Duration::from_millis(50));
        let builds = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let slow_build = || {
            let builds = builds.clone();
            let finished = finished.clone();
            async move {
                builds.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(80)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(MatchGraph::empty("x", t.value()))
            }
        };

        let err = cache.get_or_build(1, t, slow_build).await.unwrap_err();
        assert!(matches!(err, RadarError::ConcurrencyTimeout(_)));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);

        let graph = cache.get_or_build(1, t, slow_build).await.unwrap();
        assert_eq!(graph.course_key, "x");
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancelled_caller_does_not_abort_build() {
        let cache = Arc::new(cache());
        let builds = Arc::new(AtomicUsize::new(0));
        let t = threshold("0.5");

        let caller = {
            let cache = cache.clone();
            let builds = builds.clone();
            tokio::spawn(async move {
                cache
                    .get_or_build(1, t, || async move {
                        builds.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(60)).await;
                        Ok(MatchGraph::empty("first", t.value()))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        caller.abort();

        let graph = cache
            .get_or_build(1, t, || counted_build(builds.clone(), "second", t))
            .await
            .unwrap();
        assert_eq!(graph.course_key, "first");
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_build_in_flight_during_invalidate_is_not_served() {
        let cache = Arc::new(cache());
        let t = threshold("0.5");

        let in_flight = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_build(1, t, || async move {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(MatchGraph::empty("stale", t.value()))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.invalidate(1);
        assert_eq!(in_flight.await.unwrap().unwrap().course_key, "stale");

        let fresh = cache
            .get_or_build(1, t, || async move { Ok(MatchGraph::empty("fresh", t.value())) })
            .await
            .unwrap();
        assert_eq!(fresh.course_key, "fresh");
    }
}
