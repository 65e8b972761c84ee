//! 匹配图构建
//!
//! 纯函数：给定课程内的比对记录和阈值，生成以学生为节点的匹配图，不访问存储。

use std::collections::{BTreeMap, BTreeSet};

use crate::models::comparisons::entities::ComparisonRecord;
use crate::models::graph::entities::{EdgeMatch, MatchEdge, MatchGraph};
use crate::models::graph::threshold::SimilarityThreshold;

/// 把一条比对折叠为无序学生对 `(较小标识, 较大标识)`
///
/// 同一学生的两份提交之间的比对没有对应的边，返回 `None`。
pub fn student_pair(record: &ComparisonRecord) -> Option<(&str, &str)> {
    let a = record.student_a.as_str();
    let b = record.student_b.as_str();
    match a.cmp(b) {
        std::cmp::Ordering::Less => Some((a, b)),
        std::cmp::Ordering::Greater => Some((b, a)),
        std::cmp::Ordering::Equal => None,
    }
}

pub fn build_match_graph(
    course_key: &str,
    threshold: SimilarityThreshold,
    records: &[ComparisonRecord],
) -> MatchGraph {
    let min_similarity = threshold.value();
    let mut pairs: BTreeMap<(&str, &str), Vec<EdgeMatch>> = BTreeMap::new();

    for record in records.iter().filter(|r| r.similarity >= min_similarity) {
        let Some(pair) = student_pair(record) else {
            continue;
        };
        pairs.entry(pair).or_default().push(EdgeMatch {
            comparison_id: record.id,
            exercise_key: record.exercise_key.clone(),
            exercise_name: record.exercise_name.clone(),
            similarity: record.similarity,
        });
    }

    let mut nodes = BTreeSet::new();
    let edges = pairs
        .into_iter()
        .map(|((source, target), mut matches)| {
            matches.sort_by(|a, b| {
                b.similarity
                    .total_cmp(&a.similarity)
                    .then_with(|| a.comparison_id.cmp(&b.comparison_id))
            });
            nodes.insert(source);
            nodes.insert(target);
            MatchEdge {
                source: source.to_string(),
                target: target.to_string(),
                // matches 非空且已降序
                max_similarity: matches[0].similarity,
                matches_in_exercises: matches,
            }
        })
        .collect();

    MatchGraph {
        course_key: course_key.to_string(),
        min_similarity,
        nodes: nodes.into_iter().map(str::to_string).collect(),
        edges,
    }
}
