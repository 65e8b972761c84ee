pub mod comparisons;
pub mod courses;
pub mod graph;
pub mod review;

pub use comparisons::ComparisonService;
pub use courses::CourseService;
pub use graph::GraphService;
pub use review::ReviewService;
