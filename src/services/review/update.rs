use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, info};

use super::ReviewService;
use super::state::{ReviewScale, ReviewTransition};
use crate::errors::{RadarError, Result};
use crate::models::comparisons::requests::UpdateReviewRequest;
use crate::models::comparisons::responses::ReviewUpdateResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::courses::{find_course, find_exercise};
use crate::storage::Storage;
use crate::utils::error_response::status_of;

/// 校验并持久化审阅评分
///
/// 校验失败时不修改存储；评分与当前值相同时不写入。
pub async fn apply_review(
    storage: &dyn Storage,
    scale: &ReviewScale,
    course_key: &str,
    exercise_key: &str,
    comparison_id: i64,
    raw_score: Option<&str>,
) -> Result<ReviewTransition> {
    let course = find_course(storage, course_key).await?;
    let exercise = find_exercise(storage, &course, exercise_key).await?;
    let comparison = storage
        .get_comparison(exercise.id, comparison_id)
        .await?
        .ok_or_else(|| RadarError::not_found(format!("比对 {comparison_id} 不存在")))?;

    let raw_score = raw_score.ok_or_else(|| {
        RadarError::invalid_argument("Review update must contain 'review' in the request body.")
    })?;
    let score = scale.parse_score(raw_score)?;

    let transition = scale.transition(comparison.review, score);
    if let ReviewTransition::Changed { from, to } = transition {
        if !storage.update_comparison_review(comparison.id, to).await? {
            return Err(RadarError::not_found(format!("比对 {comparison_id} 不存在")));
        }

        if transition.crosses(scale.flagged_cutoff) {
            info!(
                "Comparison {} in {}/{} review {} -> {} crossed flagged cutoff {}",
                comparison.id, course.key, exercise.key, from, to, scale.flagged_cutoff
            );
        } else {
            debug!(
                "Comparison {} review {} -> {}",
                comparison.id, from, to
            );
        }
    }

    Ok(transition)
}

pub async fn update_review(
    service: &ReviewService,
    request: &HttpRequest,
    course_key: &str,
    exercise_key: &str,
    comparison_id: i64,
    req: UpdateReviewRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let scale = match service.get_scale() {
        Ok(scale) => scale,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("审阅评分配置无效: {e}"),
                )),
            );
        }
    };

    let result = apply_review(
        storage.as_ref(),
        &scale,
        course_key,
        exercise_key,
        comparison_id,
        req.review.as_ref().map(|r| r.as_str()),
    )
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ReviewUpdateResponse { success: true },
            "评分已更新",
        ))),
        Err(e) => {
            let code = match e {
                RadarError::InvalidArgument(_) => ErrorCode::InvalidReviewScore,
                _ => ErrorCode::from(&e),
            };
            Ok(HttpResponse::build(status_of(&e)).json(ApiResponse::error(
                code,
                ReviewUpdateResponse { success: false },
                e.message(),
            )))
        }
    }
}
