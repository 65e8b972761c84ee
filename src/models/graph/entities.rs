use serde::{Deserialize, Serialize};

/// 课程匹配图
///
/// 节点是学生标识（同一学生的多次提交合并为一个节点），边连接相似度达到阈值的学生对。
/// `nodes` 按字典序排列，`edges` 按 (source, target) 排列，且 `source < target`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchGraph {
    pub course_key: String,
    pub min_similarity: f64,
    pub nodes: Vec<String>,
    pub edges: Vec<MatchEdge>,
}

impl MatchGraph {
    pub fn empty(course_key: impl Into<String>, min_similarity: f64) -> Self {
        Self {
            course_key: course_key.into(),
            min_similarity,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&MatchEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }
}

/// 两名学生之间的匹配边，保留最大相似度
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEdge {
    pub source: String,
    pub target: String,
    pub max_similarity: f64,
    // 构成该边的全部比对，按相似度降序
    pub matches_in_exercises: Vec<EdgeMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMatch {
    pub comparison_id: i64,
    pub exercise_key: String,
    pub exercise_name: String,
    pub similarity: f64,
}
